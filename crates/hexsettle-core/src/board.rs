//! Game board representation.
//!
//! This module contains:
//! - Resource and terrain types
//! - The Board, which owns the tile/corner/side graph, the robber and the
//!   piece id generator
//! - Board generation (layout, terrain deal, marker placement) and lookups
//!
//! Placement rules and production live in `rules`, as further `impl Board`.

use crate::hex::{CornerCoord, HexCoord, SideCoord};
use crate::pieces::{Building, IdGenerator, PieceId, Road, Robber};
use crate::tokens::{self, ProbabilityMarker};
use crate::topology::{self, Corner, CornerId, Side, SideId, Tile, TileId, Topology};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Radius of the standard hexagonal layout (19 tiles)
pub const STANDARD_RADIUS: i32 = 2;

/// Resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Brick,
    Lumber,
    Ore,
    Grain,
    Wool,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Brick,
        Resource::Lumber,
        Resource::Ore,
        Resource::Grain,
        Resource::Wool,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Resource::Brick => "brick",
            Resource::Lumber => "lumber",
            Resource::Ore => "ore",
            Resource::Grain => "grain",
            Resource::Wool => "wool",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Terrain of a hex tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// Produces lumber
    Forest,
    /// Produces brick
    Hills,
    /// Produces wool
    Pasture,
    /// Produces grain
    Fields,
    /// Produces ore
    Mountains,
    /// No production; the robber starts here
    Desert,
    /// Void tile, never produces and never holds a marker
    Sea,
}

impl Terrain {
    /// The resource this terrain produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Terrain::Forest => Some(Resource::Lumber),
            Terrain::Hills => Some(Resource::Brick),
            Terrain::Pasture => Some(Resource::Wool),
            Terrain::Fields => Some(Resource::Grain),
            Terrain::Mountains => Some(Resource::Ore),
            Terrain::Desert | Terrain::Sea => None,
        }
    }

    pub fn is_land(&self) -> bool {
        *self != Terrain::Sea
    }
}

/// The complete game board
#[derive(Debug, Clone)]
pub struct Board {
    layout: Vec<HexCoord>,
    topology: Topology,
    robber: Robber,
    piece_ids: IdGenerator,
}

impl Board {
    /// Generate the standard 19-tile board
    pub fn standard<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::generate(&topology::hexagon(STANDARD_RADIUS), rng)
    }

    /// Generate a board for any layout using the standard terrain deck and
    /// marker set
    pub fn generate<R: Rng + ?Sized>(layout: &[HexCoord], rng: &mut R) -> Self {
        Self::generate_with(
            layout,
            tokens::standard_terrain_deck(),
            &tokens::standard_markers(),
            rng,
        )
    }

    /// Generate a board with an explicit terrain deck and marker set
    pub fn generate_with<R: Rng + ?Sized>(
        layout: &[HexCoord],
        deck: Vec<Terrain>,
        markers: &[ProbabilityMarker],
        rng: &mut R,
    ) -> Self {
        let mut piece_ids = IdGenerator::new();
        let robber = Robber {
            id: piece_ids.next_id(),
            tile: None,
        };

        let mut board = Self {
            layout: layout.to_vec(),
            topology: Topology::build(layout),
            robber,
            piece_ids,
        };
        board.deal(deck, markers, rng);
        board
    }

    /// Rebuild the graph from the same layout with a fresh deal.
    ///
    /// All pieces are removed and piece ids start over.
    pub fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        *self = Self::generate(&self.layout, rng);
    }

    fn deal<R: Rng + ?Sized>(
        &mut self,
        deck: Vec<Terrain>,
        markers: &[ProbabilityMarker],
        rng: &mut R,
    ) {
        tokens::assign_terrain(&mut self.topology, deck, rng);
        let placed = tokens::place_markers(&mut self.topology, markers, rng);

        let desert = self
            .topology
            .tiles()
            .iter()
            .find(|t| t.terrain == Terrain::Desert)
            .map(|t| t.id);
        match desert {
            Some(id) => {
                self.topology.tile_mut(id).has_robber = true;
                self.robber.tile = Some(id);
            }
            None => warn!("no desert on the board, robber left unplaced"),
        }

        debug!(
            tiles = self.topology.tiles().len(),
            corners = self.topology.corners().len(),
            sides = self.topology.sides().len(),
            markers = placed.len(),
            "board generated"
        );
    }

    pub(crate) fn next_piece_id(&mut self) -> PieceId {
        self.piece_ids.next_id()
    }

    pub(crate) fn topology_mut(&mut self) -> &mut Topology {
        &mut self.topology
    }

    pub(crate) fn robber_mut(&mut self) -> &mut Robber {
        &mut self.robber
    }

    // ==================== Query Methods ====================

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Tile coordinates in generation order
    pub fn layout(&self) -> &[HexCoord] {
        &self.layout
    }

    pub fn tiles(&self) -> &[Tile] {
        self.topology.tiles()
    }

    pub fn corners(&self) -> &[Corner] {
        self.topology.corners()
    }

    pub fn sides(&self) -> &[Side] {
        self.topology.sides()
    }

    /// Land tiles (non-sea)
    pub fn land_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles().iter().filter(|t| t.terrain.is_land())
    }

    pub fn tile(&self, id: TileId) -> &Tile {
        self.topology.tile(id)
    }

    pub fn corner(&self, id: CornerId) -> &Corner {
        self.topology.corner(id)
    }

    pub fn side(&self, id: SideId) -> &Side {
        self.topology.side(id)
    }

    pub fn tile_at(&self, coord: &HexCoord) -> Option<TileId> {
        self.topology.tile_at(coord)
    }

    pub fn corner_at(&self, coord: &CornerCoord) -> Option<CornerId> {
        self.topology.corner_at(coord)
    }

    pub fn side_at(&self, coord: &SideCoord) -> Option<SideId> {
        self.topology.side_at(coord)
    }

    pub fn corner_by_key(&self, key: &str) -> Option<CornerId> {
        self.topology.corner_by_key(key)
    }

    pub fn side_by_key(&self, key: &str) -> Option<SideId> {
        self.topology.side_by_key(key)
    }

    /// Building at a corner, if any
    pub fn building(&self, id: CornerId) -> Option<Building> {
        self.corner(id).building
    }

    /// Road at a side, if any
    pub fn road(&self, id: SideId) -> Option<Road> {
        self.side(id).road
    }

    pub fn robber(&self) -> &Robber {
        &self.robber
    }

    /// The tile the robber currently occupies
    pub fn robber_tile(&self) -> Option<TileId> {
        self.robber.tile
    }

    /// Every bound marker with its tile
    pub fn markers(&self) -> Vec<(TileId, ProbabilityMarker)> {
        self.tiles()
            .iter()
            .filter_map(|t| t.marker.map(|m| (t.id, m)))
            .collect()
    }

    /// Convert to a JSON-friendly representation with arrays and string keys
    pub fn to_json_friendly(&self) -> BoardJson {
        BoardJson {
            tiles: self
                .tiles()
                .iter()
                .map(|tile| TileJson {
                    q: tile.coord.q,
                    r: tile.coord.r,
                    terrain: tile.terrain,
                    marker: tile.dice_number(),
                    has_robber: tile.has_robber,
                })
                .collect(),
            corners: self
                .corners()
                .iter()
                .filter_map(|corner| {
                    corner.building.map(|building| CornerJson {
                        key: corner.coord.to_string(),
                        building,
                    })
                })
                .collect(),
            sides: self
                .sides()
                .iter()
                .filter_map(|side| {
                    side.road.map(|road| SideJson {
                        key: side.coord.to_string(),
                        road,
                    })
                })
                .collect(),
            robber: self.robber.tile.map(|id| self.tile(id).coord),
        }
    }
}

/// JSON-friendly board representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardJson {
    pub tiles: Vec<TileJson>,
    /// Occupied corners only
    pub corners: Vec<CornerJson>,
    /// Occupied sides only
    pub sides: Vec<SideJson>,
    pub robber: Option<HexCoord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileJson {
    pub q: i32,
    pub r: i32,
    pub terrain: Terrain,
    pub marker: Option<u8>,
    pub has_robber: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CornerJson {
    /// Canonical "q,r,d" key
    pub key: String,
    pub building: Building,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideJson {
    pub key: String,
    pub road: Road,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn seeded(seed: u64) -> Board {
        Board::standard(&mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_standard_board_has_19_land_tiles() {
        let board = seeded(1);
        assert_eq!(board.land_tiles().count(), 19);
        assert_eq!(board.corners().len(), 54);
        assert_eq!(board.sides().len(), 72);
    }

    #[test]
    fn test_robber_starts_on_desert() {
        for seed in 0..10 {
            let board = seeded(seed);
            let deserts: Vec<_> = board
                .tiles()
                .iter()
                .filter(|t| t.terrain == Terrain::Desert)
                .collect();
            assert_eq!(deserts.len(), 1);
            assert!(deserts[0].marker.is_none(), "desert should have no marker");
            assert!(deserts[0].has_robber);
            assert_eq!(board.robber_tile(), Some(deserts[0].id));
        }
    }

    #[test]
    fn test_standard_board_has_18_markers() {
        let board = seeded(4);
        assert_eq!(board.markers().len(), 18);
    }

    #[test]
    fn test_standard_board_has_correct_resource_counts() {
        let board = seeded(2);
        let mut counts: HashMap<Resource, u32> = HashMap::new();
        for tile in board.tiles() {
            if let Some(resource) = tile.resource() {
                *counts.entry(resource).or_insert(0) += 1;
            }
        }

        assert_eq!(counts.get(&Resource::Lumber), Some(&4), "Should have 4 Lumber tiles");
        assert_eq!(counts.get(&Resource::Grain), Some(&4), "Should have 4 Grain tiles");
        assert_eq!(counts.get(&Resource::Wool), Some(&4), "Should have 4 Wool tiles");
        assert_eq!(counts.get(&Resource::Ore), Some(&3), "Should have 3 Ore tiles");
        assert_eq!(counts.get(&Resource::Brick), Some(&3), "Should have 3 Brick tiles");
    }

    #[test]
    fn test_standard_board_has_correct_number_distribution() {
        let board = seeded(3);
        let mut values: Vec<u8> = board.markers().iter().map(|(_, m)| m.value()).collect();
        values.sort_unstable();
        assert_eq!(values, tokens::STANDARD_MARKERS.to_vec());
    }

    #[test]
    fn test_same_seed_same_board() {
        let deal = |b: &Board| -> Vec<_> {
            b.tiles().iter().map(|t| (t.coord, t.terrain, t.marker)).collect()
        };
        assert_eq!(deal(&seeded(42)), deal(&seeded(42)));
    }

    #[test]
    fn test_board_randomization_produces_different_boards() {
        let deal = |b: &Board| -> Vec<_> { b.tiles().iter().map(|t| (t.terrain, t.marker)).collect() };
        let first = deal(&seeded(0));
        let found_different = (1..10).any(|seed| deal(&seeded(seed)) != first);
        assert!(found_different, "Board generation should produce different boards");
    }

    #[test]
    fn test_regenerate_clears_pieces() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut board = Board::standard(&mut rng);
        let corner = CornerId(10);
        let id = board.next_piece_id();
        board.topology_mut().corner_mut(corner).building = Some(Building::settlement(id, 0));

        board.regenerate(&mut rng);
        assert!(board.corners().iter().all(|c| c.building.is_none()));
        assert_eq!(board.tiles().len(), 19);
        assert!(board.robber_tile().is_some());
    }

    #[test]
    fn test_lookup_by_coordinate_and_key() {
        let board = seeded(5);
        let center = board.tile_at(&HexCoord::new(0, 0)).unwrap();
        let corner = board.tile(center).corners()[2];
        let coord = board.corner(corner).coord;

        assert_eq!(board.corner_at(&coord), Some(corner));
        assert_eq!(board.corner_by_key(&coord.to_string()), Some(corner));
        assert_eq!(board.tile_at(&HexCoord::new(3, 0)), None);
    }

    #[test]
    fn test_json_friendly_board() {
        let mut board = seeded(6);
        let id = board.next_piece_id();
        board.topology_mut().corner_mut(CornerId(0)).building = Some(Building::settlement(id, 1));

        let json = board.to_json_friendly();
        assert_eq!(json.tiles.len(), 19);
        assert_eq!(json.corners.len(), 1);
        assert_eq!(json.corners[0].key, board.corner(CornerId(0)).coord.to_string());
        assert!(json.sides.is_empty());
        assert!(json.robber.is_some());

        let text = serde_json::to_string(&json).unwrap();
        assert!(text.contains("\"terrain\""));
    }

    #[test]
    fn test_layout_without_desert_leaves_robber_unplaced() {
        let mut rng = StdRng::seed_from_u64(0);
        let board = Board::generate_with(
            &[HexCoord::new(0, 0)],
            vec![Terrain::Fields],
            &tokens::standard_markers(),
            &mut rng,
        );
        assert_eq!(board.robber_tile(), None);
        assert_eq!(board.markers().len(), 1);
    }
}
