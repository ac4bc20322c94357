//! Hexsettle - rules engine for a hex-grid settlement building board game
//!
//! This crate provides the core game logic, including:
//! - Hex coordinate system with canonical corner and side addressing
//! - Board topology generated from any set of hex coordinates
//! - Randomized terrain and probability marker layout
//! - Player supply, resource ledger and scoring
//! - Game state machine with setup, dice, robber, building and awards
//!
//! # Architecture
//!
//! The engine is a single-threaded state machine with no rendering or I/O.
//! Callers drive it with [`GameAction`] intents and read back the
//! [`GameEvent`] log and a serializable [`GameSummary`]. All randomness comes
//! from an injected RNG, so a fixed seed replays the same game.
//!
//! # Modules
//!
//! - [`hex`]: Coordinates for tiles, corners and sides
//! - [`topology`]: Tile, corner and side graph built from coordinates
//! - [`tokens`]: Terrain deck and probability markers
//! - [`pieces`]: Settlements, cities, roads and the robber
//! - [`board`]: Generated board and lookups
//! - [`rules`]: Placement legality, production, road length, robber moves
//! - [`player`]: Player state and resources
//! - [`events`]: Intents and log events
//! - [`config`]: Game configuration
//! - [`game`]: Game state machine

pub mod board;
pub mod config;
pub mod events;
pub mod game;
pub mod hex;
pub mod pieces;
pub mod player;
pub mod rules;
pub mod tokens;
pub mod topology;

// Re-export commonly used types
pub use board::{Board, BoardJson, Resource, Terrain};
pub use config::{ConfigError, GameConfig};
pub use events::{GameAction, GameEvent};
pub use game::{
    GameError, GamePhase, GameState, GameSummary, PlayerSummary, SetupPlacing, SetupRound,
    TurnState,
};
pub use hex::{CornerCoord, HexCoord, ParseCoordError, SideCoord};
pub use pieces::{Building, BuildingKind, PieceId, PieceKind, PlayerId, Road, Robber};
pub use player::{LedgerError, Player, PlayerColor, Purchase, ResourceHand};
pub use rules::PlacementError;
pub use tokens::ProbabilityMarker;
pub use topology::{Corner, CornerId, Side, SideId, Tile, TileId, Topology};
