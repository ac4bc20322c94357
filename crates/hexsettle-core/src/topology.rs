//! The shared Tile/Corner/Side graph.
//!
//! Entities live in three arenas and refer to each other by index, so the
//! cyclic tile <-> corner <-> side references never turn into ownership
//! cycles. Each arena is also indexed by canonical coordinate; because
//! `CornerCoord` and `SideCoord` canonicalize on construction, two tiles that
//! share a physical corner or side always resolve to the same entity.
//!
//! The graph is built once from a list of tile coordinates. Afterwards only
//! the contents of the slots (terrain, marker, robber flag, buildings, roads)
//! change; reference counts never do.

use crate::board::{Resource, Terrain};
use crate::hex::{CornerCoord, HexCoord, SideCoord};
use crate::pieces::{Building, Road};
use crate::tokens::ProbabilityMarker;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Index of a tile in the topology arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub usize);

/// Index of a corner in the topology arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CornerId(pub usize);

/// Index of a side in the topology arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SideId(pub usize);

/// A single hex tile on the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub coord: HexCoord,
    pub terrain: Terrain,
    /// Probability marker bound to this tile (never on desert or sea)
    pub marker: Option<ProbabilityMarker>,
    /// Whether the robber is currently on this tile
    pub has_robber: bool,
    corners: [CornerId; 6],
    sides: [SideId; 6],
    neighbors: [Option<TileId>; 6],
}

impl Tile {
    /// Corners indexed by corner direction
    pub fn corners(&self) -> &[CornerId; 6] {
        &self.corners
    }

    /// Sides indexed by side direction
    pub fn sides(&self) -> &[SideId; 6] {
        &self.sides
    }

    /// Neighbor across side `direction`, if that tile is on the board
    pub fn neighbor(&self, direction: usize) -> Option<TileId> {
        self.neighbors[direction % 6]
    }

    /// All neighbors present on the board
    pub fn neighbors(&self) -> impl Iterator<Item = TileId> + '_ {
        self.neighbors.iter().flatten().copied()
    }

    /// The resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        self.terrain.resource()
    }

    /// Check if this tile produces resources right now
    pub fn is_productive(&self) -> bool {
        self.resource().is_some() && !self.has_robber
    }

    /// The dice value that triggers this tile
    pub fn dice_number(&self) -> Option<u8> {
        self.marker.map(|m| m.value())
    }
}

/// A corner, where settlements and cities are built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corner {
    pub id: CornerId,
    pub coord: CornerCoord,
    pub building: Option<Building>,
    tiles: Vec<TileId>,
    sides: Vec<SideId>,
    adjacent: Vec<CornerId>,
}

impl Corner {
    /// Tiles touching this corner (3 inside the board, fewer on the rim)
    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    /// Sides ending at this corner
    pub fn sides(&self) -> &[SideId] {
        &self.sides
    }

    /// Corners one side away
    pub fn adjacent_corners(&self) -> &[CornerId] {
        &self.adjacent
    }

    /// Owner of the building on this corner, if any
    pub fn owner(&self) -> Option<crate::pieces::PlayerId> {
        self.building.map(|b| b.owner)
    }
}

/// A side, where roads are built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Side {
    pub id: SideId,
    pub coord: SideCoord,
    pub road: Option<Road>,
    tiles: Vec<TileId>,
    corners: [CornerId; 2],
    adjacent: Vec<SideId>,
}

impl Side {
    /// Tiles sharing this side (2 inside the board, 1 on the rim)
    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    /// The two endpoint corners
    pub fn corners(&self) -> &[CornerId; 2] {
        &self.corners
    }

    /// Sides that share a corner with this one
    pub fn adjacent_sides(&self) -> &[SideId] {
        &self.adjacent
    }

    /// The endpoint opposite `corner`, or None if `corner` is not an endpoint
    pub fn other_end(&self, corner: CornerId) -> Option<CornerId> {
        match self.corners {
            [a, b] if a == corner => Some(b),
            [a, b] if b == corner => Some(a),
            _ => None,
        }
    }

    /// Owner of the road on this side, if any
    pub fn owner(&self) -> Option<crate::pieces::PlayerId> {
        self.road.map(|r| r.owner)
    }
}

/// Coordinates of a hexagon-shaped layout of the given radius.
///
/// Traversal goes column by column (increasing q), each column top to bottom,
/// which for radius 2 gives the 3/4/5/4/3 standard arrangement.
pub fn hexagon(radius: i32) -> Vec<HexCoord> {
    let mut coords = Vec::new();
    for q in -radius..=radius {
        let r_min = (-radius).max(-q - radius);
        let r_max = radius.min(-q + radius);
        for r in r_min..=r_max {
            coords.push(HexCoord::new(q, r));
        }
    }
    coords
}

/// Arena of tiles, corners and sides with lookup by canonical coordinate
#[derive(Debug, Clone, Default)]
pub struct Topology {
    tiles: Vec<Tile>,
    corners: Vec<Corner>,
    sides: Vec<Side>,
    tile_index: HashMap<HexCoord, TileId>,
    corner_index: HashMap<CornerCoord, CornerId>,
    side_index: HashMap<SideCoord, SideId>,
}

impl Topology {
    /// Build the graph for the given tile coordinates.
    ///
    /// Tiles are created in input order with `Terrain::Sea` until terrain is
    /// assigned. Duplicate coordinates are ignored.
    pub fn build(coords: &[HexCoord]) -> Self {
        let mut topology = Self::default();

        for &coord in coords {
            if topology.tile_index.contains_key(&coord) {
                warn!(%coord, "duplicate tile coordinate ignored");
                continue;
            }

            let id = TileId(topology.tiles.len());
            let corners = coord.corners().map(|c| topology.corner_entry(c));
            let side_coords = coord.sides();
            let sides: [SideId; 6] = std::array::from_fn(|i| {
                topology.side_entry(side_coords[i], [corners[i], corners[(i + 1) % 6]])
            });

            for i in 0..6 {
                let corner = &mut topology.corners[corners[i].0];
                corner.tiles.push(id);
                // Corner i sits between side i - 1 and side i
                for side in [sides[(i + 5) % 6], sides[i]] {
                    if !corner.sides.contains(&side) {
                        corner.sides.push(side);
                    }
                }
                topology.sides[sides[i].0].tiles.push(id);
            }

            topology.tiles.push(Tile {
                id,
                coord,
                terrain: Terrain::Sea,
                marker: None,
                has_robber: false,
                corners,
                sides,
                neighbors: [None; 6],
            });
            topology.tile_index.insert(coord, id);
        }

        topology.link();
        topology
    }

    fn corner_entry(&mut self, coord: CornerCoord) -> CornerId {
        if let Some(&id) = self.corner_index.get(&coord) {
            return id;
        }
        let id = CornerId(self.corners.len());
        self.corners.push(Corner {
            id,
            coord,
            building: None,
            tiles: Vec::with_capacity(3),
            sides: Vec::with_capacity(3),
            adjacent: Vec::with_capacity(3),
        });
        self.corner_index.insert(coord, id);
        id
    }

    fn side_entry(&mut self, coord: SideCoord, corners: [CornerId; 2]) -> SideId {
        if let Some(&id) = self.side_index.get(&coord) {
            return id;
        }
        let id = SideId(self.sides.len());
        self.sides.push(Side {
            id,
            coord,
            road: None,
            tiles: Vec::with_capacity(2),
            corners,
            adjacent: Vec::with_capacity(4),
        });
        self.side_index.insert(coord, id);
        id
    }

    /// Second pass: tile neighbors and the derived corner/side adjacency lists
    fn link(&mut self) {
        for tile in &mut self.tiles {
            for (direction, neighbor) in tile.coord.neighbors().iter().enumerate() {
                tile.neighbors[direction] = self.tile_index.get(neighbor).copied();
            }
        }

        let corner_adjacency: Vec<Vec<CornerId>> = self
            .corners
            .iter()
            .map(|corner| {
                corner
                    .sides
                    .iter()
                    .filter_map(|s| self.sides[s.0].other_end(corner.id))
                    .collect()
            })
            .collect();
        for (corner, adjacent) in self.corners.iter_mut().zip(corner_adjacency) {
            corner.adjacent = adjacent;
        }

        let side_adjacency: Vec<Vec<SideId>> = self
            .sides
            .iter()
            .map(|side| {
                side.corners
                    .iter()
                    .flat_map(|c| self.corners[c.0].sides.iter().copied())
                    .filter(|&s| s != side.id)
                    .collect()
            })
            .collect();
        for (side, adjacent) in self.sides.iter_mut().zip(side_adjacency) {
            side.adjacent = adjacent;
        }
    }

    // ==================== Lookups ====================

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn corners(&self) -> &[Corner] {
        &self.corners
    }

    pub fn sides(&self) -> &[Side] {
        &self.sides
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id.0]
    }

    pub fn corner(&self, id: CornerId) -> &Corner {
        &self.corners[id.0]
    }

    pub fn side(&self, id: SideId) -> &Side {
        &self.sides[id.0]
    }

    pub(crate) fn tile_mut(&mut self, id: TileId) -> &mut Tile {
        &mut self.tiles[id.0]
    }

    pub(crate) fn corner_mut(&mut self, id: CornerId) -> &mut Corner {
        &mut self.corners[id.0]
    }

    pub(crate) fn side_mut(&mut self, id: SideId) -> &mut Side {
        &mut self.sides[id.0]
    }

    pub fn tile_at(&self, coord: &HexCoord) -> Option<TileId> {
        self.tile_index.get(coord).copied()
    }

    /// Look up a corner, canonicalizing the coordinate first
    pub fn corner_at(&self, coord: &CornerCoord) -> Option<CornerId> {
        let canonical = CornerCoord::new(coord.hex(), coord.direction);
        self.corner_index.get(&canonical).copied()
    }

    /// Look up a side, canonicalizing the coordinate first
    pub fn side_at(&self, coord: &SideCoord) -> Option<SideId> {
        let canonical = SideCoord::new(coord.hex(), coord.direction);
        self.side_index.get(&canonical).copied()
    }

    /// Look up a corner by its "q,r,d" key
    pub fn corner_by_key(&self, key: &str) -> Option<CornerId> {
        key.parse().ok().and_then(|c: CornerCoord| self.corner_at(&c))
    }

    /// Look up a side by its "q,r,d" key
    pub fn side_by_key(&self, key: &str) -> Option<SideId> {
        key.parse().ok().and_then(|s: SideCoord| self.side_at(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn standard() -> Topology {
        Topology::build(&hexagon(2))
    }

    #[test]
    fn test_hexagon_layout_columns() {
        let coords = hexagon(2);
        assert_eq!(coords.len(), 19);

        let column_sizes: Vec<usize> = (-2..=2)
            .map(|q| coords.iter().filter(|c| c.q == q).count())
            .collect();
        assert_eq!(column_sizes, vec![3, 4, 5, 4, 3]);
    }

    #[test]
    fn test_standard_entity_counts() {
        let topology = standard();
        assert_eq!(topology.tiles().len(), 19);
        assert_eq!(topology.corners().len(), 54);
        assert_eq!(topology.sides().len(), 72);
    }

    #[test]
    fn test_corner_reference_counts() {
        let topology = standard();
        let mut by_tile_count = [0usize; 4];

        for corner in topology.corners() {
            let tiles = corner.tiles().len();
            by_tile_count[tiles] += 1;
            match tiles {
                3 | 2 => assert_eq!(corner.sides().len(), 3, "corner {}", corner.coord),
                1 => assert_eq!(corner.sides().len(), 2, "corner {}", corner.coord),
                n => panic!("corner {} touches {n} tiles", corner.coord),
            }
            assert_eq!(corner.adjacent_corners().len(), corner.sides().len());
        }

        assert_eq!(by_tile_count, [0, 18, 12, 24]);
    }

    #[test]
    fn test_side_reference_counts() {
        let topology = standard();
        let rim = topology.sides().iter().filter(|s| s.tiles().len() == 1).count();
        let inner = topology.sides().iter().filter(|s| s.tiles().len() == 2).count();
        assert_eq!(rim, 30);
        assert_eq!(inner, 42);

        for side in topology.sides() {
            let [a, b] = *side.corners();
            assert_ne!(a, b);
            assert!(topology.corner(a).sides().contains(&side.id));
            assert!(topology.corner(b).sides().contains(&side.id));
        }
    }

    #[test]
    fn test_neighbors_share_one_side_and_two_corners() {
        let topology = standard();
        for tile in topology.tiles() {
            for (direction, neighbor) in tile.neighbors.iter().enumerate() {
                let Some(neighbor) = neighbor else { continue };
                let other = topology.tile(*neighbor);

                assert_eq!(tile.sides()[direction], other.sides()[(direction + 3) % 6]);

                let mine: HashSet<_> = tile.corners().iter().collect();
                let shared = other.corners().iter().filter(|c| mine.contains(c)).count();
                assert_eq!(shared, 2);
            }
        }
    }

    #[test]
    fn test_center_tile_has_six_neighbors() {
        let topology = standard();
        let center = topology.tile_at(&HexCoord::new(0, 0)).unwrap();
        assert_eq!(topology.tile(center).neighbors().count(), 6);

        let rim = topology.tile_at(&HexCoord::new(2, -2)).unwrap();
        assert_eq!(topology.tile(rim).neighbors().count(), 3);
    }

    #[test]
    fn test_side_adjacency() {
        let topology = standard();
        let center = topology.tile(topology.tile_at(&HexCoord::new(0, 0)).unwrap());
        for side in center.sides() {
            // Interior side: two corners with three sides each
            assert_eq!(topology.side(*side).adjacent_sides().len(), 4);
        }
    }

    #[test]
    fn test_lookup_by_key() {
        let topology = standard();
        let corner = topology.corners()[7].coord;
        assert_eq!(topology.corner_by_key(&corner.to_string()), Some(CornerId(7)));

        // Non-canonical description of the same corner resolves too
        let tile = topology.tile(TileId(0));
        let side = topology.side(tile.sides()[4]).coord;
        assert_eq!(topology.side_by_key(&side.to_string()), Some(tile.sides()[4]));

        assert_eq!(topology.corner_by_key("40,40,1"), None);
        assert_eq!(topology.side_by_key("nonsense"), None);
    }

    #[test]
    fn test_duplicate_coordinates_ignored() {
        let coords = vec![HexCoord::new(0, 0), HexCoord::new(0, 0), HexCoord::new(1, 0)];
        let topology = Topology::build(&coords);
        assert_eq!(topology.tiles().len(), 2);
        assert_eq!(topology.corners().len(), 10);
        assert_eq!(topology.sides().len(), 11);
    }
}
