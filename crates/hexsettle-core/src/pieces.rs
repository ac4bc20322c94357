//! Placeable pieces: settlements, cities, roads and the robber.
//!
//! Every piece carries a `PieceId` handed out by an `IdGenerator` owned by the
//! board, so separate games never share identity state.

use crate::topology::TileId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Player identifier (seat index, 0-5)
pub type PlayerId = u8;

/// Identity of a single piece on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u32);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic piece id source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdGenerator {
    next: u32,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next unused id
    pub fn next_id(&mut self) -> PieceId {
        let id = PieceId(self.next);
        self.next += 1;
        id
    }
}

/// The kinds of piece a player draws from their supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Settlement,
    City,
    Road,
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceKind::Settlement => "settlement",
            PieceKind::City => "city",
            PieceKind::Road => "road",
        };
        f.write_str(name)
    }
}

/// What stands on a corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildingKind {
    /// 1 VP, 1 resource per adjacent producing tile
    Settlement,
    /// 2 VP, 2 resources per adjacent producing tile
    City,
}

/// A settlement or city bound to one corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: PieceId,
    pub kind: BuildingKind,
    pub owner: PlayerId,
}

impl Building {
    pub fn settlement(id: PieceId, owner: PlayerId) -> Self {
        Self {
            id,
            kind: BuildingKind::Settlement,
            owner,
        }
    }

    pub fn city(id: PieceId, owner: PlayerId) -> Self {
        Self {
            id,
            kind: BuildingKind::City,
            owner,
        }
    }

    pub fn is_settlement(&self) -> bool {
        self.kind == BuildingKind::Settlement
    }

    /// Victory points provided by this building
    pub fn victory_points(&self) -> u32 {
        match self.kind {
            BuildingKind::Settlement => 1,
            BuildingKind::City => 2,
        }
    }

    /// Resource multiplier (how many resources per production)
    pub fn resource_multiplier(&self) -> u32 {
        match self.kind {
            BuildingKind::Settlement => 1,
            BuildingKind::City => 2,
        }
    }

    pub fn piece_kind(&self) -> PieceKind {
        match self.kind {
            BuildingKind::Settlement => PieceKind::Settlement,
            BuildingKind::City => PieceKind::City,
        }
    }
}

/// A road bound to one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Road {
    pub id: PieceId,
    pub owner: PlayerId,
}

/// The single robber. Unowned; bound to a tile once the board is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Robber {
    pub id: PieceId,
    pub tile: Option<TileId>,
}
