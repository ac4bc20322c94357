//! Core game state machine.
//!
//! This module contains the main `GameState` struct and all turn logic:
//! registration, the snake-order setup, dice and production, the robber,
//! building, longest road and the win check.

use crate::board::{Board, Resource};
use crate::config::{ConfigError, GameConfig};
use crate::events::{GameAction, GameEvent};
use crate::hex::{CornerCoord, HexCoord, SideCoord};
use crate::pieces::{Building, PieceKind, PlayerId, Road};
use crate::player::{LedgerError, Player, PlayerColor, Purchase, ResourceHand};
use crate::rules::PlacementError;
use crate::topology::{CornerId, SideId, TileId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Registering players
    Waiting,

    /// Initial placement phase
    Setup {
        round: SetupRound,
        /// What we're currently placing
        placing: SetupPlacing,
    },

    /// Normal turns
    Playing,

    /// Game is over
    Finished { winner: PlayerId },
}

/// Setup rounds run forward through the seats, then backward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupRound {
    Forward,
    Backward,
}

/// What we're placing during setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupPlacing {
    Settlement,
    Road,
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid action for current phase")]
    InvalidPhase,

    #[error("Game is over")]
    GameOver,

    #[error("The game is full")]
    GameFull,

    #[error("Need at least {needed} players, have {have}")]
    NotEnoughPlayers { needed: usize, have: usize },

    #[error("Dice already rolled this turn")]
    AlreadyRolled,

    #[error("Roll the dice first")]
    MustRollFirst,

    #[error("The robber must be moved first")]
    RobberMoveRequired,

    #[error("No robber move pending")]
    NoRobberMovePending,

    #[error("Cannot steal from that player")]
    InvalidStealTarget,

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("No player {0}")]
    UnknownPlayer(PlayerId),

    #[error("No tile at {0}")]
    UnknownTile(HexCoord),

    #[error("No corner at {0}")]
    UnknownCorner(CornerCoord),

    #[error("No side at {0}")]
    UnknownSide(SideCoord),
}

impl GameError {
    /// Whether this is an ordinary rule violation the caller can re-prompt
    /// on, as opposed to a reference to something that does not exist.
    pub fn is_rule_violation(&self) -> bool {
        !matches!(
            self,
            GameError::UnknownPlayer(_)
                | GameError::UnknownTile(_)
                | GameError::UnknownCorner(_)
                | GameError::UnknownSide(_)
        )
    }
}

/// Per-turn flags, reset when the turn ends
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub rolled: bool,
    /// A 7 was rolled and the robber has not moved yet
    pub robber_pending: bool,
    /// Players the current player may still steal from
    pub steal_candidates: Vec<PlayerId>,
}

/// The complete game state
#[derive(Debug, Clone)]
pub struct GameState<R = StdRng> {
    config: GameConfig,
    board: Board,
    players: Vec<Player>,
    phase: GamePhase,
    current_player: PlayerId,
    /// Turn number (0 during setup, starts at 1)
    turn_number: u32,
    dice_roll: Option<(u8, u8)>,
    turn: TurnState,
    /// Setup phase tracking: which settlement was just placed
    setup_settlement: Option<CornerId>,
    log: Vec<GameEvent>,
    rng: R,
}

impl GameState<StdRng> {
    /// Create a game seeded from `config.seed`, or from entropy when unset
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> GameState<R> {
    /// Create a game drawing all randomness from `rng`
    pub fn with_rng(config: GameConfig, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::standard(&mut rng);

        Ok(Self {
            config,
            board,
            players: Vec::new(),
            phase: GamePhase::Waiting,
            current_player: 0,
            turn_number: 0,
            dice_roll: None,
            turn: TurnState::default(),
            setup_settlement: None,
            log: Vec::new(),
            rng,
        })
    }

    // ==================== Queries ====================

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Get the number of players
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by ID
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, GameError> {
        self.players
            .get_mut(id as usize)
            .ok_or(GameError::UnknownPlayer(id))
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// Last dice roll this turn
    pub fn dice_roll(&self) -> Option<(u8, u8)> {
        self.dice_roll
    }

    pub fn turn_state(&self) -> &TurnState {
        &self.turn
    }

    /// Check if the game is finished
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, GamePhase::Finished { .. })
    }

    /// Get the winner if the game is finished
    pub fn winner(&self) -> Option<PlayerId> {
        match self.phase {
            GamePhase::Finished { winner } => Some(winner),
            _ => None,
        }
    }

    /// Score of a player, 0 for an unknown seat
    pub fn score(&self, player: PlayerId) -> u32 {
        self.player(player).map_or(0, Player::score)
    }

    /// The append-only event log
    pub fn log(&self) -> &[GameEvent] {
        &self.log
    }

    /// The event log rendered as text
    pub fn log_lines(&self) -> Vec<String> {
        self.log.iter().map(ToString::to_string).collect()
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            phase: self.phase,
            current_player: self.current_player,
            turn_number: self.turn_number,
            dice_roll: self.dice_roll,
            robber_pending: self.turn.robber_pending,
            winner: self.winner(),
            players: self
                .players
                .iter()
                .map(|p| PlayerSummary {
                    id: p.id,
                    name: p.name.clone(),
                    color: p.color,
                    score: p.score(),
                    resources: p.resources.clone(),
                    longest_road: self.board.longest_road(p.id),
                    has_longest_road: p.has_longest_road,
                    settlements_remaining: p.settlements_remaining,
                    cities_remaining: p.cities_remaining,
                    roads_remaining: p.roads_remaining,
                })
                .collect(),
        }
    }

    pub fn summary_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.summary())
    }

    /// Get all currently valid actions for a player
    pub fn valid_actions(&self, player: PlayerId) -> Vec<GameAction> {
        let mut actions = Vec::new();
        if player != self.current_player || (player as usize) >= self.players.len() {
            return actions;
        }

        match self.phase {
            GamePhase::Waiting | GamePhase::Finished { .. } => {}

            GamePhase::Setup {
                placing: SetupPlacing::Settlement,
                ..
            } => {
                for corner in self.board.valid_settlement_corners() {
                    actions.push(GameAction::PlaceSettlement(self.board.corner(corner).coord));
                }
            }

            GamePhase::Setup {
                placing: SetupPlacing::Road,
                ..
            } => {
                if let Some(anchor) = self.setup_settlement {
                    for &side in self.board.corner(anchor).sides() {
                        if self.board.road(side).is_none() {
                            actions.push(GameAction::PlaceRoad(self.board.side(side).coord));
                        }
                    }
                }
            }

            GamePhase::Playing => {
                if !self.turn.rolled {
                    actions.push(GameAction::RollDice);
                    return actions;
                }
                if self.turn.robber_pending {
                    let current = self.board.robber_tile();
                    for tile in self.board.land_tiles() {
                        if Some(tile.id) != current {
                            actions.push(GameAction::MoveRobber(tile.coord));
                        }
                    }
                    return actions;
                }

                for &victim in &self.turn.steal_candidates {
                    actions.push(GameAction::StealFrom(victim));
                }

                let me = &self.players[player as usize];
                if me.check_purchase(PieceKind::Road, Purchase::Paid).is_ok() {
                    for side in self.board.valid_road_sides(player) {
                        actions.push(GameAction::PlaceRoad(self.board.side(side).coord));
                    }
                }
                if me.check_purchase(PieceKind::Settlement, Purchase::Paid).is_ok() {
                    for corner in self.board.valid_settlement_corners_for(player) {
                        actions.push(GameAction::PlaceSettlement(self.board.corner(corner).coord));
                    }
                }
                if me.check_purchase(PieceKind::City, Purchase::Paid).is_ok() {
                    for corner in self.board.valid_city_corners(player) {
                        actions.push(GameAction::PlaceCity(self.board.corner(corner).coord));
                    }
                }
                actions.push(GameAction::EndTurn);
            }
        }

        actions
    }

    // ==================== Lookups ====================

    fn tile_id(&self, coord: HexCoord) -> Result<TileId, GameError> {
        self.board.tile_at(&coord).ok_or(GameError::UnknownTile(coord))
    }

    fn corner_id(&self, coord: CornerCoord) -> Result<CornerId, GameError> {
        self.board
            .corner_at(&coord)
            .ok_or(GameError::UnknownCorner(coord))
    }

    fn side_id(&self, coord: SideCoord) -> Result<SideId, GameError> {
        self.board.side_at(&coord).ok_or(GameError::UnknownSide(coord))
    }

    fn emit(&mut self, event: GameEvent) {
        debug!(event = %event, "game event");
        self.log.push(event);
    }

    fn reject<T>(result: Result<T, GameError>) -> Result<T, GameError> {
        result.map_err(|err| {
            debug!(error = %err, "intent rejected");
            err
        })
    }

    /// Phase gate for normal-play actions
    fn require_playing(&self) -> Result<(), GameError> {
        match self.phase {
            GamePhase::Playing => Ok(()),
            GamePhase::Finished { .. } => Err(GameError::GameOver),
            _ => Err(GameError::InvalidPhase),
        }
    }

    /// Phase gate for building in normal play
    fn require_build_window(&self) -> Result<(), GameError> {
        self.require_playing()?;
        if !self.turn.rolled {
            return Err(GameError::MustRollFirst);
        }
        if self.turn.robber_pending {
            return Err(GameError::RobberMoveRequired);
        }
        Ok(())
    }

    // ==================== Lobby ====================

    /// Register a player. Only allowed before the game starts.
    pub fn add_player(&mut self, name: impl Into<String>) -> Result<PlayerId, GameError> {
        Self::reject(self.try_add_player(name.into()))
    }

    fn try_add_player(&mut self, name: String) -> Result<PlayerId, GameError> {
        match self.phase {
            GamePhase::Waiting => {}
            GamePhase::Finished { .. } => return Err(GameError::GameOver),
            _ => return Err(GameError::InvalidPhase),
        }
        if self.players.len() >= self.config.max_players {
            return Err(GameError::GameFull);
        }

        let id = self.players.len() as PlayerId;
        self.players.push(Player::new(id, name.clone()));
        self.emit(GameEvent::PlayerJoined { player: id, name });
        Ok(id)
    }

    /// Generate a fresh board and begin setup with seat 0
    pub fn start_game(&mut self) -> Result<(), GameError> {
        Self::reject(self.try_start_game())
    }

    fn try_start_game(&mut self) -> Result<(), GameError> {
        if self.phase != GamePhase::Waiting {
            return Err(GameError::InvalidPhase);
        }
        if self.players.len() < self.config.min_players {
            return Err(GameError::NotEnoughPlayers {
                needed: self.config.min_players,
                have: self.players.len(),
            });
        }

        self.board.regenerate(&mut self.rng);
        self.phase = GamePhase::Setup {
            round: SetupRound::Forward,
            placing: SetupPlacing::Settlement,
        };
        self.current_player = 0;
        self.turn_number = 0;

        info!(players = self.players.len(), "game started");
        self.emit(GameEvent::GameStarted {
            players: self.players.len(),
        });
        Ok(())
    }

    // ==================== Building ====================

    /// Place a settlement for the current player.
    ///
    /// Free during setup, where only the distance rule applies. In normal
    /// play it costs resources and must touch the player's road network.
    pub fn place_settlement(&mut self, coord: CornerCoord) -> Result<Building, GameError> {
        Self::reject(self.try_place_settlement(coord))
    }

    fn try_place_settlement(&mut self, coord: CornerCoord) -> Result<Building, GameError> {
        let corner = self.corner_id(coord)?;
        let player = self.current_player;

        let (purchase, round) = match self.phase {
            GamePhase::Setup {
                round,
                placing: SetupPlacing::Settlement,
            } => (Purchase::Free, Some(round)),
            GamePhase::Setup { .. } => return Err(GameError::InvalidPhase),
            _ => {
                self.require_build_window()?;
                (Purchase::Paid, None)
            }
        };

        self.board.check_settlement(corner, player, round.is_none())?;
        self.player_mut(player)?
            .check_purchase(PieceKind::Settlement, purchase)?;

        let building = self.board.place_settlement(corner, player, round.is_none())?;
        let owner = self.player_mut(player)?;
        owner.buy(PieceKind::Settlement, purchase)?;
        owner.record_settlement(corner);

        let location = self.board.corner(corner).coord;
        self.emit(GameEvent::SettlementBuilt { player, location });

        match round {
            Some(round) => {
                if round == SetupRound::Backward {
                    let resources = self.board.corner_yield(corner);
                    if !resources.is_empty() {
                        self.player_mut(player)?.add_resources(&resources);
                        self.emit(GameEvent::StartingResources { player, resources });
                    }
                }
                self.setup_settlement = Some(corner);
                self.phase = GamePhase::Setup {
                    round,
                    placing: SetupPlacing::Road,
                };
            }
            None => {
                // A new settlement can cut an opponent's road
                self.check_longest_road();
            }
        }

        self.check_win_condition();
        Ok(building)
    }

    /// Upgrade one of the current player's settlements. Returns the removed
    /// settlement; its piece goes back to the player's supply.
    pub fn place_city(&mut self, coord: CornerCoord) -> Result<Building, GameError> {
        Self::reject(self.try_place_city(coord))
    }

    fn try_place_city(&mut self, coord: CornerCoord) -> Result<Building, GameError> {
        let corner = self.corner_id(coord)?;
        let player = self.current_player;
        self.require_build_window()?;

        self.board.check_city(corner, player)?;
        self.player_mut(player)?
            .check_purchase(PieceKind::City, Purchase::Paid)?;

        let removed = self.board.place_city(corner, player)?;
        let owner = self.player_mut(player)?;
        owner.buy(PieceKind::City, Purchase::Paid)?;
        if !owner.record_city(corner) {
            warn!(player, corner = corner.0, "city built over an unrecorded settlement");
        }

        let location = self.board.corner(corner).coord;
        self.emit(GameEvent::CityBuilt { player, location });
        self.check_win_condition();
        Ok(removed)
    }

    /// Place a road for the current player.
    ///
    /// During setup it is free and must touch the settlement just placed.
    pub fn place_road(&mut self, coord: SideCoord) -> Result<Road, GameError> {
        Self::reject(self.try_place_road(coord))
    }

    fn try_place_road(&mut self, coord: SideCoord) -> Result<Road, GameError> {
        let side = self.side_id(coord)?;
        let player = self.current_player;

        let purchase = match self.phase {
            GamePhase::Setup {
                placing: SetupPlacing::Road,
                ..
            } => {
                let anchor = self.setup_settlement.ok_or(GameError::InvalidPhase)?;
                if !self.board.side(side).corners().contains(&anchor) {
                    return Err(PlacementError::NotConnected.into());
                }
                Purchase::Free
            }
            GamePhase::Setup { .. } => return Err(GameError::InvalidPhase),
            _ => {
                self.require_build_window()?;
                Purchase::Paid
            }
        };

        self.board.check_road(side, player)?;
        self.player_mut(player)?
            .check_purchase(PieceKind::Road, purchase)?;

        let road = self.board.place_road(side, player)?;
        let owner = self.player_mut(player)?;
        owner.buy(PieceKind::Road, purchase)?;
        owner.record_road(side);

        let location = self.board.side(side).coord;
        self.emit(GameEvent::RoadBuilt { player, location });

        if purchase == Purchase::Free {
            self.setup_settlement = None;
            self.advance_setup_phase();
        } else {
            self.check_longest_road();
        }

        self.check_win_condition();
        Ok(road)
    }

    /// Snake order: seats 0..n forward, then n-1..0 backward
    fn advance_setup_phase(&mut self) {
        let GamePhase::Setup { round, .. } = self.phase else {
            return;
        };
        let last = (self.players.len() as PlayerId).saturating_sub(1);

        let next_round = match round {
            SetupRound::Forward if self.current_player < last => {
                self.current_player += 1;
                SetupRound::Forward
            }
            // The last seat places twice in a row
            SetupRound::Forward => SetupRound::Backward,
            SetupRound::Backward if self.current_player > 0 => {
                self.current_player -= 1;
                SetupRound::Backward
            }
            SetupRound::Backward => {
                self.phase = GamePhase::Playing;
                self.current_player = 0;
                self.turn_number = 1;
                self.turn = TurnState::default();
                info!("setup complete");
                self.emit(GameEvent::SetupComplete);
                return;
            }
        };

        self.phase = GamePhase::Setup {
            round: next_round,
            placing: SetupPlacing::Settlement,
        };
    }

    // ==================== Dice ====================

    /// Roll two dice for the current player and resolve the total
    pub fn roll_dice(&mut self) -> Result<(u8, u8), GameError> {
        Self::reject(self.try_roll_dice())
    }

    fn try_roll_dice(&mut self) -> Result<(u8, u8), GameError> {
        self.require_playing()?;
        if self.turn.rolled {
            return Err(GameError::AlreadyRolled);
        }
        let die1 = self.rng.gen_range(1..=6);
        let die2 = self.rng.gen_range(1..=6);
        self.resolve_roll(die1, die2)?;
        Ok((die1, die2))
    }

    fn resolve_roll(&mut self, die1: u8, die2: u8) -> Result<(), GameError> {
        self.require_playing()?;
        if self.turn.rolled {
            return Err(GameError::AlreadyRolled);
        }

        let player = self.current_player;
        let total = die1 + die2;
        self.dice_roll = Some((die1, die2));
        self.turn.rolled = true;
        self.emit(GameEvent::DiceRolled {
            player,
            roll: (die1, die2),
            total,
        });

        if total == 7 {
            let threshold = self.config.discard_threshold;
            let mut discards = Vec::new();
            for p in &mut self.players {
                let held = p.resources.total();
                if held > threshold {
                    let discarded = p.resources.discard_evenly(held / 2);
                    discards.push(GameEvent::CardsDiscarded {
                        player: p.id,
                        discarded,
                    });
                }
            }
            for event in discards {
                self.emit(event);
            }
            self.turn.robber_pending = true;
        } else {
            let distribution = self.board.production(total);
            for (pid, hand) in &distribution {
                self.player_mut(*pid)?.add_resources(hand);
            }
            self.emit(GameEvent::ResourcesDistributed {
                distributions: distribution.into_iter().collect(),
            });
        }

        Ok(())
    }

    // ==================== Robber ====================

    /// Move the robber after a 7. Returns the players that can be robbed.
    pub fn move_robber(&mut self, coord: HexCoord) -> Result<Vec<PlayerId>, GameError> {
        Self::reject(self.try_move_robber(coord))
    }

    fn try_move_robber(&mut self, coord: HexCoord) -> Result<Vec<PlayerId>, GameError> {
        let tile = self.tile_id(coord)?;
        self.require_playing()?;
        if !self.turn.robber_pending {
            return Err(GameError::NoRobberMovePending);
        }

        let previous = self.board.move_robber(tile)?;
        let player = self.current_player;
        self.turn.robber_pending = false;
        self.turn.steal_candidates = self
            .board
            .adjacent_owners(tile)
            .into_iter()
            .filter(|&p| p != player && !self.players[p as usize].resources.is_empty())
            .collect();

        let from = previous.map(|id| self.board.tile(id).coord);
        self.emit(GameEvent::RobberMoved {
            player,
            from,
            to: coord,
        });
        Ok(self.turn.steal_candidates.clone())
    }

    /// Take one random card from a player next to the robber
    pub fn steal_from(&mut self, victim: PlayerId) -> Result<Option<Resource>, GameError> {
        Self::reject(self.try_steal_from(victim))
    }

    fn try_steal_from(&mut self, victim: PlayerId) -> Result<Option<Resource>, GameError> {
        if victim as usize >= self.players.len() {
            return Err(GameError::UnknownPlayer(victim));
        }
        self.require_playing()?;
        if !self.turn.steal_candidates.contains(&victim) {
            return Err(GameError::InvalidStealTarget);
        }

        let thief = self.current_player;
        let stolen = self.players[victim as usize]
            .resources
            .steal_random(&mut self.rng);
        if let Some(resource) = stolen {
            self.player_mut(thief)?.resources.add(resource, 1);
        }
        self.turn.steal_candidates.clear();

        self.emit(GameEvent::ResourceStolen {
            thief,
            victim,
            resource: stolen,
        });
        Ok(stolen)
    }

    // ==================== Turn ====================

    /// End the current turn. Returns the next player.
    pub fn end_turn(&mut self) -> Result<PlayerId, GameError> {
        Self::reject(self.try_end_turn())
    }

    fn try_end_turn(&mut self) -> Result<PlayerId, GameError> {
        self.require_playing()?;
        if !self.turn.rolled {
            return Err(GameError::MustRollFirst);
        }
        if self.turn.robber_pending {
            return Err(GameError::RobberMoveRequired);
        }

        let player = self.current_player;
        let next_player = ((player as usize + 1) % self.players.len()) as PlayerId;
        self.turn = TurnState::default();
        self.dice_roll = None;
        self.current_player = next_player;
        self.turn_number += 1;

        self.emit(GameEvent::TurnEnded {
            player,
            next_player,
            turn: self.turn_number,
        });
        self.check_win_condition();
        Ok(next_player)
    }

    // ==================== Intents ====================

    /// Apply an intent on behalf of `player`. Returns the events it produced.
    pub fn apply(&mut self, player: PlayerId, action: GameAction) -> Result<Vec<GameEvent>, GameError> {
        if player as usize >= self.players.len() {
            return Self::reject(Err(GameError::UnknownPlayer(player)));
        }
        if self.is_finished() {
            return Self::reject(Err(GameError::GameOver));
        }
        if player != self.current_player {
            return Self::reject(Err(GameError::NotYourTurn));
        }

        let mark = self.log.len();
        match action {
            GameAction::RollDice => self.roll_dice().map(drop),
            GameAction::PlaceSettlement(corner) => self.place_settlement(corner).map(drop),
            GameAction::PlaceCity(corner) => self.place_city(corner).map(drop),
            GameAction::PlaceRoad(side) => self.place_road(side).map(drop),
            GameAction::MoveRobber(tile) => self.move_robber(tile).map(drop),
            GameAction::StealFrom(victim) => self.steal_from(victim).map(drop),
            GameAction::EndTurn => self.end_turn().map(drop),
        }?;
        Ok(self.log[mark..].to_vec())
    }

    // ==================== Awards ====================

    /// Re-evaluate the longest road award.
    ///
    /// The holder keeps it on a tie. Otherwise a unique leader at or above
    /// the minimum takes it, and a tie between challengers leaves it unheld.
    fn check_longest_road(&mut self) {
        let minimum = self.config.longest_road_minimum;
        let lengths: Vec<(PlayerId, u32)> = self
            .players
            .iter()
            .map(|p| (p.id, self.board.longest_road(p.id)))
            .collect();

        let best = lengths.iter().map(|&(_, l)| l).max().unwrap_or(0);
        let leaders: Vec<PlayerId> = if best >= minimum {
            lengths
                .iter()
                .filter(|&&(_, l)| l == best)
                .map(|&(p, _)| p)
                .collect()
        } else {
            Vec::new()
        };

        let current_holder = self.players.iter().find(|p| p.has_longest_road).map(|p| p.id);
        let new_holder = match current_holder {
            Some(holder) if leaders.contains(&holder) => Some(holder),
            _ if leaders.len() == 1 => Some(leaders[0]),
            _ => None,
        };

        if new_holder != current_holder {
            for player in &mut self.players {
                player.has_longest_road = Some(player.id) == new_holder;
            }
            info!(?current_holder, ?new_holder, length = best, "longest road changed");
            self.emit(GameEvent::LongestRoadChanged {
                previous: current_holder,
                current: new_holder,
                length: best,
            });
        }
    }

    /// First player at or above the target, scanning from the current seat
    fn check_winner(&self) -> Option<PlayerId> {
        let count = self.players.len();
        (0..count)
            .map(|offset| ((self.current_player as usize + offset) % count) as PlayerId)
            .find(|&id| self.score(id) >= self.config.victory_points_to_win)
    }

    fn check_win_condition(&mut self) {
        if self.is_finished() {
            return;
        }
        if let Some(winner) = self.check_winner() {
            let victory_points = self.score(winner);
            self.phase = GamePhase::Finished { winner };
            info!(winner, victory_points, "game won");
            self.emit(GameEvent::GameWon {
                player: winner,
                victory_points,
            });
        }
    }
}

/// Snapshot of the game for UI binding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSummary {
    pub phase: GamePhase,
    pub current_player: PlayerId,
    pub turn_number: u32,
    pub dice_roll: Option<(u8, u8)>,
    pub robber_pending: bool,
    pub winner: Option<PlayerId>,
    pub players: Vec<PlayerSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub color: PlayerColor,
    pub score: u32,
    pub resources: ResourceHand,
    pub longest_road: u32,
    pub has_longest_road: bool,
    pub settlements_remaining: u32,
    pub cities_remaining: u32,
    pub roads_remaining: u32,
}
