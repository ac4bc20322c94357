//! Player state and resource management.
//!
//! This module contains:
//! - Player struct with resources, piece supply, built locations and achievements
//! - ResourceHand for managing resource counts
//! - Building costs and the paid/free purchase mode

use crate::board::Resource;
use crate::pieces::{PieceKind, PlayerId};
use crate::topology::{CornerId, SideId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Supply of each piece a player starts with
pub const MAX_SETTLEMENTS: u32 = 5;
pub const MAX_CITIES: u32 = 4;
pub const MAX_ROADS: u32 = 15;

/// Player color for UI rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerColor {
    Red,
    Blue,
    Orange,
    White,
    Green,
    Brown,
}

impl PlayerColor {
    /// Get color for a seat index
    pub fn for_player(id: PlayerId) -> Self {
        match id % 6 {
            0 => PlayerColor::Red,
            1 => PlayerColor::Blue,
            2 => PlayerColor::Orange,
            3 => PlayerColor::White,
            4 => PlayerColor::Green,
            _ => PlayerColor::Brown,
        }
    }

    /// Get hex color code for rendering
    pub fn hex_code(&self) -> u32 {
        match self {
            PlayerColor::Red => 0xC0392B,
            PlayerColor::Blue => 0x2E86C1,
            PlayerColor::Orange => 0xE67E22,
            PlayerColor::White => 0xF4F6F7,
            PlayerColor::Green => 0x27AE60,
            PlayerColor::Brown => 0x8D6E63,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Not enough resources: need {needed}, have {available}")]
    InsufficientResources {
        needed: ResourceHand,
        available: ResourceHand,
    },

    #[error("No {0} pieces remaining")]
    NoPiecesRemaining(PieceKind),
}

/// A hand of resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub brick: u32,
    pub lumber: u32,
    pub ore: u32,
    pub grain: u32,
    pub wool: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(brick: u32, lumber: u32, ore: u32, grain: u32, wool: u32) -> Self {
        Self {
            brick,
            lumber,
            ore,
            grain,
            wool,
        }
    }

    /// Create a hand with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.brick + self.lumber + self.ore + self.grain + self.wool
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Brick => self.brick,
            Resource::Lumber => self.lumber,
            Resource::Ore => self.ore,
            Resource::Grain => self.grain,
            Resource::Wool => self.wool,
        }
    }

    fn slot(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Brick => &mut self.brick,
            Resource::Lumber => &mut self.lumber,
            Resource::Ore => &mut self.ore,
            Resource::Grain => &mut self.grain,
            Resource::Wool => &mut self.wool,
        }
    }

    pub fn set(&mut self, resource: Resource, count: u32) {
        *self.slot(resource) = count;
    }

    pub fn add(&mut self, resource: Resource, amount: u32) {
        *self.slot(resource) += amount;
    }

    /// Add another hand to this one
    pub fn add_hand(&mut self, other: &ResourceHand) {
        for resource in Resource::ALL {
            self.add(resource, other.get(resource));
        }
    }

    /// Check if can afford a cost
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        Resource::ALL.iter().all(|&r| self.get(r) >= cost.get(r))
    }

    /// Subtract a cost, leaving the hand untouched if it is short
    pub fn try_subtract(&mut self, cost: &ResourceHand) -> Result<(), LedgerError> {
        if !self.can_afford(cost) {
            return Err(LedgerError::InsufficientResources {
                needed: cost.clone(),
                available: self.clone(),
            });
        }
        for resource in Resource::ALL {
            *self.slot(resource) -= cost.get(resource);
        }
        Ok(())
    }

    /// Non-zero counts in `Resource::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::ALL
            .into_iter()
            .map(|r| (r, self.get(r)))
            .filter(|&(_, n)| n > 0)
    }

    /// Remove one uniformly chosen card (for robber stealing)
    pub fn steal_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Resource> {
        let total = self.total();
        if total == 0 {
            return None;
        }

        let mut pick = rng.gen_range(0..total);
        for resource in Resource::ALL {
            let count = self.get(resource);
            if pick < count {
                *self.slot(resource) -= 1;
                return Some(resource);
            }
            pick -= count;
        }
        None
    }

    /// Remove `count` cards spread across kinds: one card of each non-empty
    /// kind per pass, in `Resource::ALL` order. Returns what was removed.
    pub fn discard_evenly(&mut self, count: u32) -> ResourceHand {
        let mut removed = ResourceHand::new();
        let mut remaining = count.min(self.total());

        while remaining > 0 {
            for resource in Resource::ALL {
                if remaining == 0 {
                    break;
                }
                if self.get(resource) > 0 {
                    *self.slot(resource) -= 1;
                    removed.add(resource, 1);
                    remaining -= 1;
                }
            }
        }
        removed
    }
}

impl fmt::Display for ResourceHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("nothing");
        }
        let parts: Vec<String> = self.iter().map(|(r, n)| format!("{n} {r}")).collect();
        f.write_str(&parts.join(", "))
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;
    use crate::pieces::PieceKind;

    /// Cost to build a road: 1 brick, 1 lumber
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// Cost to build a settlement: 1 brick, 1 lumber, 1 grain, 1 wool
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 1, 1)
    }

    /// Cost to upgrade to city: 3 ore, 2 grain
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 3, 2, 0)
    }

    pub fn for_piece(kind: PieceKind) -> ResourceHand {
        match kind {
            PieceKind::Settlement => settlement(),
            PieceKind::City => city(),
            PieceKind::Road => road(),
        }
    }
}

/// Whether a purchase draws on the player's resources.
///
/// Setup placements are `Free`; everything in normal play is `Paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Purchase {
    Paid,
    Free,
}

/// A single player's state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Seat index
    pub id: PlayerId,
    /// Display name
    pub name: String,
    pub color: PlayerColor,
    /// Current resources
    pub resources: ResourceHand,
    /// Corners holding this player's settlements
    pub settlements: Vec<CornerId>,
    /// Corners holding this player's cities
    pub cities: Vec<CornerId>,
    /// Sides holding this player's roads
    pub roads: Vec<SideId>,
    /// Whether this player has the Longest Road card
    pub has_longest_road: bool,
    /// Whether this player has the Largest Army card
    pub has_largest_army: bool,
    /// Victory point cards held
    pub victory_cards: u32,
    pub settlements_remaining: u32,
    pub cities_remaining: u32,
    pub roads_remaining: u32,
}

impl Player {
    /// Create a new player
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            color: PlayerColor::for_player(id),
            resources: ResourceHand::new(),
            settlements: Vec::new(),
            cities: Vec::new(),
            roads: Vec::new(),
            has_longest_road: false,
            has_largest_army: false,
            victory_cards: 0,
            settlements_remaining: MAX_SETTLEMENTS,
            cities_remaining: MAX_CITIES,
            roads_remaining: MAX_ROADS,
        }
    }

    /// Calculate total victory points
    pub fn score(&self) -> u32 {
        let mut vp = self.settlements.len() as u32 + 2 * self.cities.len() as u32;

        if self.has_longest_road {
            vp += 2;
        }
        if self.has_largest_army {
            vp += 2;
        }

        vp + self.victory_cards
    }

    pub fn remaining(&self, kind: PieceKind) -> u32 {
        match kind {
            PieceKind::Settlement => self.settlements_remaining,
            PieceKind::City => self.cities_remaining,
            PieceKind::Road => self.roads_remaining,
        }
    }

    fn remaining_mut(&mut self, kind: PieceKind) -> &mut u32 {
        match kind {
            PieceKind::Settlement => &mut self.settlements_remaining,
            PieceKind::City => &mut self.cities_remaining,
            PieceKind::Road => &mut self.roads_remaining,
        }
    }

    /// Can this player afford a piece of this kind?
    pub fn can_afford(&self, kind: PieceKind) -> bool {
        self.resources.can_afford(&costs::for_piece(kind))
    }

    /// Check a purchase without performing it
    pub fn check_purchase(&self, kind: PieceKind, purchase: Purchase) -> Result<(), LedgerError> {
        if self.remaining(kind) == 0 {
            return Err(LedgerError::NoPiecesRemaining(kind));
        }
        if purchase == Purchase::Paid && !self.can_afford(kind) {
            return Err(LedgerError::InsufficientResources {
                needed: costs::for_piece(kind),
                available: self.resources.clone(),
            });
        }
        Ok(())
    }

    /// Take a piece from supply, paying its cost unless the purchase is free
    pub fn buy(&mut self, kind: PieceKind, purchase: Purchase) -> Result<(), LedgerError> {
        self.check_purchase(kind, purchase)?;
        if purchase == Purchase::Paid {
            self.resources.try_subtract(&costs::for_piece(kind))?;
        }
        *self.remaining_mut(kind) -= 1;
        Ok(())
    }

    pub fn add_resources(&mut self, hand: &ResourceHand) {
        self.resources.add_hand(hand);
    }

    pub fn record_settlement(&mut self, corner: CornerId) {
        self.settlements.push(corner);
    }

    /// Move a corner from the settlement list to the city list and return the
    /// settlement piece to supply. Returns false, changing nothing, when the
    /// player has no settlement on `corner`.
    pub fn record_city(&mut self, corner: CornerId) -> bool {
        let Some(pos) = self.settlements.iter().position(|&c| c == corner) else {
            return false;
        };
        self.settlements.remove(pos);
        self.settlements_remaining += 1;
        self.cities.push(corner);
        true
    }

    pub fn record_road(&mut self, side: SideId) {
        self.roads.push(side);
    }
}
