//! Hex coordinate system using axial coordinates (q, r).
//!
//! This module provides the foundational coordinate types for the board:
//! - `HexCoord`: identifies individual hex tiles
//! - `CornerCoord`: identifies corners, where settlements and cities are placed
//! - `SideCoord`: identifies sides, where roads are placed
//!
//! Tiles are flat-topped. Directions are numbered 0..6 and side `i` of a tile
//! faces the neighbor at `DIRECTIONS[i]`. Corner `i` sits between side `i - 1`
//! and side `i`, so side `i` runs from corner `i` to corner `i + 1`.
//!
//! Corners and sides are shared by adjacent tiles. Both coordinate types are
//! canonicalized on construction with an integer offset table, so every
//! physical corner or side has exactly one representation no matter which tile
//! it is described from.

use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Axial offsets of the six neighbors, indexed by side direction.
pub const DIRECTIONS: [(i32, i32); 6] = [(1, -1), (1, 0), (0, 1), (-1, 1), (-1, 0), (0, -1)];

/// Canonical direction of the corner at angle 0 (east).
pub const EAST_CORNER: u8 = 1;

/// Canonical direction of the corner at angle 180 (west).
pub const WEST_CORNER: u8 = 4;

/// Tile-relative corner direction -> (dq, dr, canonical direction).
///
/// Every corner of the grid is either the east corner or the west corner of
/// exactly one tile; this table names that tile relative to the describing one.
const CORNER_CANONICAL: [(i32, i32, u8); 6] = [
    (1, -1, WEST_CORNER),
    (0, 0, EAST_CORNER),
    (1, 0, WEST_CORNER),
    (-1, 1, EAST_CORNER),
    (0, 0, WEST_CORNER),
    (-1, 0, EAST_CORNER),
];

/// Axial coordinate for hex grid.
///
/// The third cube coordinate `s` is not stored; it satisfies q + r + s = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// The neighbor across side `direction` (taken mod 6)
    pub fn neighbor(&self, direction: usize) -> HexCoord {
        let (dq, dr) = DIRECTIONS[direction % 6];
        HexCoord::new(self.q + dq, self.r + dr)
    }

    /// The six neighboring hexes, indexed by side direction
    pub fn neighbors(&self) -> [HexCoord; 6] {
        std::array::from_fn(|i| self.neighbor(i))
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        ((dq.abs() + (dq + dr).abs() + dr.abs()) / 2) as u32
    }

    /// Canonical coordinates of the six corners, indexed by corner direction
    pub fn corners(&self) -> [CornerCoord; 6] {
        std::array::from_fn(|i| CornerCoord::new(*self, i as u8))
    }

    /// Canonical coordinates of the six sides, indexed by side direction
    pub fn sides(&self) -> [SideCoord; 6] {
        std::array::from_fn(|i| SideCoord::new(*self, i as u8))
    }

    /// Convert to pixel coordinates (center of hex) on the x/z ground plane
    pub fn to_pixel(&self, size: f64) -> (f64, f64) {
        let sqrt3 = 3.0_f64.sqrt();
        let x = size * (1.5 * self.q as f64);
        let z = size * (sqrt3 / 2.0 * self.q as f64 + sqrt3 * self.r as f64);
        (x, z)
    }

    /// Convert from pixel coordinates to the hex containing that point
    pub fn from_pixel(x: f64, z: f64, size: f64) -> Self {
        let q = (2.0 / 3.0 * x) / size;
        let r = (-1.0 / 3.0 * x + 3.0_f64.sqrt() / 3.0 * z) / size;
        Self::axial_round(q, r)
    }

    /// Round fractional axial coordinates to nearest hex
    fn axial_round(q: f64, r: f64) -> Self {
        let s = -q - r;

        let mut rq = q.round();
        let mut rr = r.round();
        let rs = s.round();

        let q_diff = (rq - q).abs();
        let r_diff = (rr - r).abs();
        let s_diff = (rs - s).abs();

        if q_diff > r_diff && q_diff > s_diff {
            rq = -rr - rs;
        } else if r_diff > s_diff {
            rr = -rq - rs;
        }

        Self::new(rq as i32, rr as i32)
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

/// Error parsing a canonical coordinate key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid coordinate key {0:?}")]
pub struct ParseCoordError(String);

fn parse_triple(s: &str) -> Result<(i32, i32, u8), ParseCoordError> {
    let err = || ParseCoordError(s.to_string());
    let mut parts = s.split(',').map(str::trim);
    let q = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
    let r = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
    let d = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
    if parts.next().is_some() || d >= 6 {
        return Err(err());
    }
    Ok((q, r, d))
}

/// Wire form of a corner or side coordinate, checked and canonicalized on the
/// way in.
#[derive(Deserialize)]
struct RawTriple {
    q: i32,
    r: i32,
    direction: u8,
}

impl RawTriple {
    fn checked(self) -> Result<(HexCoord, u8), ParseCoordError> {
        if self.direction >= 6 {
            return Err(ParseCoordError(format!("{},{},{}", self.q, self.r, self.direction)));
        }
        Ok((HexCoord::new(self.q, self.r), self.direction))
    }
}

/// Corner coordinate - identifies a point where up to three hexes meet.
///
/// Canonical form is always the east corner (`EAST_CORNER`) or the west corner
/// (`WEST_CORNER`) of some hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CornerCoord {
    pub q: i32,
    pub r: i32,
    pub direction: u8,
}

impl CornerCoord {
    /// Canonical coordinate of corner `direction` (mod 6) of `hex`
    pub fn new(hex: HexCoord, direction: u8) -> Self {
        let (dq, dr, canonical) = CORNER_CANONICAL[(direction % 6) as usize];
        Self {
            q: hex.q + dq,
            r: hex.r + dr,
            direction: canonical,
        }
    }

    /// The hex this corner is expressed against
    pub fn hex(&self) -> HexCoord {
        HexCoord::new(self.q, self.r)
    }

    /// The three hexes (present on the board or not) that touch this corner
    pub fn touching_hexes(&self) -> [HexCoord; 3] {
        let hex = self.hex();
        if self.direction == EAST_CORNER {
            [hex, hex.neighbor(0), hex.neighbor(1)]
        } else {
            [hex, hex.neighbor(3), hex.neighbor(4)]
        }
    }

    /// Convert to pixel coordinates
    pub fn to_pixel(&self, size: f64) -> (f64, f64) {
        let (x, z) = self.hex().to_pixel(size);
        if self.direction == EAST_CORNER {
            (x + size, z)
        } else {
            (x - size, z)
        }
    }
}

impl fmt::Display for CornerCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.q, self.r, self.direction)
    }
}

impl<'de> Deserialize<'de> for CornerCoord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (hex, direction) = RawTriple::deserialize(deserializer)?
            .checked()
            .map_err(de::Error::custom)?;
        Ok(CornerCoord::new(hex, direction))
    }
}

impl FromStr for CornerCoord {
    type Err = ParseCoordError;

    /// Parses any "q,r,d" triple and canonicalizes it
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (q, r, d) = parse_triple(s)?;
        Ok(CornerCoord::new(HexCoord::new(q, r), d))
    }
}

/// Side coordinate - identifies the border between two hexes.
///
/// Canonical form uses side directions 0, 1 and 2; the other three are
/// expressed from the neighbor across them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SideCoord {
    pub q: i32,
    pub r: i32,
    pub direction: u8,
}

impl SideCoord {
    /// Canonical coordinate of side `direction` (mod 6) of `hex`
    pub fn new(hex: HexCoord, direction: u8) -> Self {
        let direction = direction % 6;
        if direction < 3 {
            Self {
                q: hex.q,
                r: hex.r,
                direction,
            }
        } else {
            let other = hex.neighbor(direction as usize);
            Self {
                q: other.q,
                r: other.r,
                direction: direction - 3,
            }
        }
    }

    /// The hex this side is expressed against
    pub fn hex(&self) -> HexCoord {
        HexCoord::new(self.q, self.r)
    }

    /// The two hexes (present on the board or not) that share this side
    pub fn touching_hexes(&self) -> [HexCoord; 2] {
        [self.hex(), self.hex().neighbor(self.direction as usize)]
    }

    /// The two corners at the ends of this side
    pub fn endpoints(&self) -> [CornerCoord; 2] {
        [
            CornerCoord::new(self.hex(), self.direction),
            CornerCoord::new(self.hex(), self.direction + 1),
        ]
    }

    /// Convert to pixel coordinates (midpoint of side)
    pub fn to_pixel(&self, size: f64) -> (f64, f64) {
        let [a, b] = self.endpoints();
        let (x1, z1) = a.to_pixel(size);
        let (x2, z2) = b.to_pixel(size);
        ((x1 + x2) / 2.0, (z1 + z2) / 2.0)
    }
}

impl fmt::Display for SideCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.q, self.r, self.direction)
    }
}

impl<'de> Deserialize<'de> for SideCoord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (hex, direction) = RawTriple::deserialize(deserializer)?
            .checked()
            .map_err(de::Error::custom)?;
        Ok(SideCoord::new(hex, direction))
    }
}

impl FromStr for SideCoord {
    type Err = ParseCoordError;

    /// Parses any "q,r,d" triple and canonicalizes it
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (q, r, d) = parse_triple(s)?;
        Ok(SideCoord::new(HexCoord::new(q, r), d))
    }
}
