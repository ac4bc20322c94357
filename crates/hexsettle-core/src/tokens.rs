//! Terrain deck and probability markers.
//!
//! Terrain is shuffled and dealt one card per tile in layout order. Markers
//! are placed in two passes: the high-probability ones (6 and 8) first, each
//! on a tile with no high-probability neighbor, then the rest at random.
//! The adjacency constraint is soft; when it cannot be met the marker goes on
//! any free tile and a warning is logged.

use crate::board::Terrain;
use crate::topology::{TileId, Topology};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Weight of the most likely non-7 totals
pub const HIGH_PROBABILITY_WEIGHT: u8 = 5;

/// Marker values for the 18 producing tiles of the standard board
pub const STANDARD_MARKERS: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} is not a probability marker value")]
pub struct InvalidMarker(pub u8);

/// A number token in {2..=12} \ {7}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ProbabilityMarker(u8);

impl ProbabilityMarker {
    pub const fn new(value: u8) -> Option<Self> {
        if value >= 2 && value <= 12 && value != 7 {
            Some(Self(value))
        } else {
            None
        }
    }

    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Number of two-die combinations that roll this value (1 to 5)
    pub const fn weight(&self) -> u8 {
        6 - (7 - self.0 as i8).unsigned_abs()
    }

    pub const fn is_high_probability(&self) -> bool {
        self.weight() == HIGH_PROBABILITY_WEIGHT
    }
}

impl TryFrom<u8> for ProbabilityMarker {
    type Error = InvalidMarker;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidMarker(value))
    }
}

impl From<ProbabilityMarker> for u8 {
    fn from(marker: ProbabilityMarker) -> u8 {
        marker.0
    }
}

/// The standard markers as typed values
pub fn standard_markers() -> Vec<ProbabilityMarker> {
    STANDARD_MARKERS
        .iter()
        .filter_map(|&v| ProbabilityMarker::new(v))
        .collect()
}

/// Standard terrain distribution:
/// 4 Forest, 4 Pasture, 4 Fields, 3 Hills, 3 Mountains, 1 Desert
pub fn standard_terrain_deck() -> Vec<Terrain> {
    let mut deck = Vec::with_capacity(19);
    deck.extend(std::iter::repeat(Terrain::Forest).take(4));
    deck.extend(std::iter::repeat(Terrain::Pasture).take(4));
    deck.extend(std::iter::repeat(Terrain::Fields).take(4));
    deck.extend(std::iter::repeat(Terrain::Hills).take(3));
    deck.extend(std::iter::repeat(Terrain::Mountains).take(3));
    deck.push(Terrain::Desert);
    deck
}

/// Shuffle `deck` and deal it onto the tiles in layout order.
///
/// Tiles left over once the deck runs out become sea.
pub fn assign_terrain<R: Rng + ?Sized>(topology: &mut Topology, mut deck: Vec<Terrain>, rng: &mut R) {
    deck.shuffle(rng);
    let tile_count = topology.tiles().len();

    if deck.len() < tile_count {
        warn!(
            tiles = tile_count,
            terrain = deck.len(),
            "terrain deck too small for layout, extra tiles become sea"
        );
    } else if deck.len() > tile_count {
        warn!(unused = deck.len() - tile_count, "terrain cards left over after dealing");
    }

    let mut cards = deck.into_iter();
    for index in 0..tile_count {
        let tile = topology.tile_mut(TileId(index));
        tile.terrain = cards.next().unwrap_or(Terrain::Sea);
        tile.marker = None;
    }
}

/// Place `markers` on producing tiles. Returns the tiles that received one,
/// in placement order.
pub fn place_markers<R: Rng + ?Sized>(
    topology: &mut Topology,
    markers: &[ProbabilityMarker],
    rng: &mut R,
) -> Vec<TileId> {
    let mut free: Vec<TileId> = topology
        .tiles()
        .iter()
        .filter(|t| t.terrain.resource().is_some())
        .map(|t| t.id)
        .collect();

    let (mut high, mut other): (Vec<_>, Vec<_>) =
        markers.iter().copied().partition(|m| m.is_high_probability());
    high.shuffle(rng);
    other.shuffle(rng);

    let mut placed = Vec::with_capacity(markers.len());

    for marker in high {
        let candidates: Vec<TileId> = free
            .iter()
            .copied()
            .filter(|&id| {
                !topology.tile(id).neighbors().any(|n| {
                    topology
                        .tile(n)
                        .marker
                        .is_some_and(|m| m.is_high_probability())
                })
            })
            .collect();

        let target = match candidates.choose(rng) {
            Some(&id) => id,
            None => match free.choose(rng) {
                Some(&id) => {
                    warn!(
                        marker = marker.value(),
                        tile = %topology.tile(id).coord,
                        "no tile free of high-probability neighbors, placing anyway"
                    );
                    id
                }
                None => {
                    warn!(marker = marker.value(), "no producing tile left for marker");
                    continue;
                }
            },
        };

        free.retain(|&id| id != target);
        topology.tile_mut(target).marker = Some(marker);
        placed.push(target);
    }

    free.shuffle(rng);
    let leftover = other.len().saturating_sub(free.len());
    for (marker, id) in other.into_iter().zip(free) {
        topology.tile_mut(id).marker = Some(marker);
        placed.push(id);
    }
    if leftover > 0 {
        warn!(count = leftover, "markers left unplaced");
    }

    placed
}
