//! Placement legality, production and road-network queries.
//!
//! Everything here is an `impl Board` block. Checks are pure; the `place_*`
//! methods run the matching check first and leave the board untouched when
//! it fails. None of them look at resources or turn order, that is the
//! game's job.

use crate::board::Board;
use crate::pieces::{Building, PlayerId, Road};
use crate::player::ResourceHand;
use crate::topology::{CornerId, SideId, TileId};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("Corner already has a building")]
    CornerOccupied,

    #[error("Too close to another building")]
    DistanceRule,

    #[error("Not connected to your road network")]
    NotConnected,

    #[error("Side already has a road")]
    SideOccupied,

    #[error("No settlement of yours to upgrade")]
    NotOwnSettlement,

    #[error("The robber cannot be placed on that tile")]
    NoRobberTile,

    #[error("The robber is already on that tile")]
    RobberAlreadyThere,
}

impl Board {
    // ==================== Settlements ====================

    /// Check whether `player` may put a settlement on `corner`.
    ///
    /// `require_road` adds the road-network condition of normal play; setup
    /// placements skip it.
    pub fn check_settlement(
        &self,
        corner: CornerId,
        player: PlayerId,
        require_road: bool,
    ) -> Result<(), PlacementError> {
        let target = self.corner(corner);
        if target.building.is_some() {
            return Err(PlacementError::CornerOccupied);
        }
        if target
            .adjacent_corners()
            .iter()
            .any(|&c| self.corner(c).building.is_some())
        {
            return Err(PlacementError::DistanceRule);
        }
        if require_road && !self.touches_own_road(corner, player) {
            return Err(PlacementError::NotConnected);
        }
        Ok(())
    }

    pub fn place_settlement(
        &mut self,
        corner: CornerId,
        player: PlayerId,
        require_road: bool,
    ) -> Result<Building, PlacementError> {
        self.check_settlement(corner, player, require_road)?;
        let building = Building::settlement(self.next_piece_id(), player);
        self.topology_mut().corner_mut(corner).building = Some(building);
        Ok(building)
    }

    fn touches_own_road(&self, corner: CornerId, player: PlayerId) -> bool {
        self.corner(corner)
            .sides()
            .iter()
            .any(|&s| self.side(s).owner() == Some(player))
    }

    // ==================== Cities ====================

    pub fn check_city(&self, corner: CornerId, player: PlayerId) -> Result<(), PlacementError> {
        match self.corner(corner).building {
            Some(b) if b.is_settlement() && b.owner == player => Ok(()),
            _ => Err(PlacementError::NotOwnSettlement),
        }
    }

    /// Upgrade `player`'s settlement on `corner`. Returns the settlement that
    /// was removed so its piece can go back to supply.
    pub fn place_city(
        &mut self,
        corner: CornerId,
        player: PlayerId,
    ) -> Result<Building, PlacementError> {
        self.check_city(corner, player)?;
        let city = Building::city(self.next_piece_id(), player);
        self.topology_mut()
            .corner_mut(corner)
            .building
            .replace(city)
            .ok_or(PlacementError::NotOwnSettlement)
    }

    // ==================== Roads ====================

    /// A road needs an empty side with one of the player's buildings on an
    /// endpoint, or one of the player's roads on a side sharing an endpoint.
    pub fn check_road(&self, side: SideId, player: PlayerId) -> Result<(), PlacementError> {
        let target = self.side(side);
        if target.road.is_some() {
            return Err(PlacementError::SideOccupied);
        }

        let at_own_building = target
            .corners()
            .iter()
            .any(|&c| self.corner(c).owner() == Some(player));
        let next_to_own_road = target
            .adjacent_sides()
            .iter()
            .any(|&s| self.side(s).owner() == Some(player));

        if at_own_building || next_to_own_road {
            Ok(())
        } else {
            Err(PlacementError::NotConnected)
        }
    }

    pub fn place_road(&mut self, side: SideId, player: PlayerId) -> Result<Road, PlacementError> {
        self.check_road(side, player)?;
        let road = Road {
            id: self.next_piece_id(),
            owner: player,
        };
        self.topology_mut().side_mut(side).road = Some(road);
        Ok(road)
    }

    // ==================== Valid spots ====================

    /// Corners where a settlement may go ignoring road connectivity
    pub fn valid_settlement_corners(&self) -> Vec<CornerId> {
        self.corners()
            .iter()
            .map(|c| c.id)
            .filter(|&c| self.check_settlement(c, 0, false).is_ok())
            .collect()
    }

    /// Corners where `player` may build a settlement in normal play
    pub fn valid_settlement_corners_for(&self, player: PlayerId) -> Vec<CornerId> {
        self.corners()
            .iter()
            .map(|c| c.id)
            .filter(|&c| self.check_settlement(c, player, true).is_ok())
            .collect()
    }

    pub fn valid_road_sides(&self, player: PlayerId) -> Vec<SideId> {
        self.sides()
            .iter()
            .map(|s| s.id)
            .filter(|&s| self.check_road(s, player).is_ok())
            .collect()
    }

    pub fn valid_city_corners(&self, player: PlayerId) -> Vec<CornerId> {
        self.corners()
            .iter()
            .filter(|c| c.building.is_some_and(|b| b.is_settlement() && b.owner == player))
            .map(|c| c.id)
            .collect()
    }

    // ==================== Production ====================

    /// Tiles that produce on `roll`: matching marker, producing terrain and
    /// no robber
    pub fn producing_tiles(&self, roll: u8) -> Vec<TileId> {
        self.tiles()
            .iter()
            .filter(|t| t.dice_number() == Some(roll) && t.is_productive())
            .map(|t| t.id)
            .collect()
    }

    /// Resources each player receives for `roll`
    pub fn production(&self, roll: u8) -> BTreeMap<PlayerId, ResourceHand> {
        let mut distribution: BTreeMap<PlayerId, ResourceHand> = BTreeMap::new();

        for tile_id in self.producing_tiles(roll) {
            let tile = self.tile(tile_id);
            let Some(resource) = tile.resource() else {
                continue;
            };
            for &corner in tile.corners() {
                if let Some(building) = self.corner(corner).building {
                    distribution
                        .entry(building.owner)
                        .or_default()
                        .add(resource, building.resource_multiplier());
                }
            }
        }

        distribution
    }

    /// One unit of every resource the tiles around `corner` produce, scaled
    /// by the building there. Used for the second setup settlement.
    pub fn corner_yield(&self, corner: CornerId) -> ResourceHand {
        let target = self.corner(corner);
        let multiplier = target.building.map_or(1, |b| b.resource_multiplier());
        let mut hand = ResourceHand::new();
        for &tile in target.tiles() {
            if let Some(resource) = self.tile(tile).resource() {
                hand.add(resource, multiplier);
            }
        }
        hand
    }

    // ==================== Longest Road ====================

    /// Longest trail of the owner's roads that starts with `side`.
    ///
    /// Sides are never reused; corners may be. A trail stops at a corner
    /// holding another player's building. Returns 0 for an empty side.
    pub fn road_length_from(&self, side: SideId) -> u32 {
        let Some(road) = self.road(side) else {
            return 0;
        };

        let mut visited = HashSet::from([side]);
        self.side(side)
            .corners()
            .iter()
            .map(|&from| 1 + self.extend_trail(road.owner, side, from, &mut visited))
            .max()
            .unwrap_or(0)
    }

    /// Length of the best continuation after walking `side` away from `from`
    fn extend_trail(
        &self,
        player: PlayerId,
        side: SideId,
        from: CornerId,
        visited: &mut HashSet<SideId>,
    ) -> u32 {
        let Some(at) = self.side(side).other_end(from) else {
            return 0;
        };
        // Cut by an opponent's building
        if self.corner(at).owner().is_some_and(|o| o != player) {
            return 0;
        }

        let mut best = 0;
        for &next in self.corner(at).sides() {
            if visited.contains(&next) || self.side(next).owner() != Some(player) {
                continue;
            }
            visited.insert(next);
            best = best.max(1 + self.extend_trail(player, next, at, visited));
            visited.remove(&next);
        }
        best
    }

    /// Calculate the longest road for a player
    pub fn longest_road(&self, player: PlayerId) -> u32 {
        self.sides()
            .iter()
            .filter(|s| s.owner() == Some(player))
            .map(|s| self.road_length_from(s.id))
            .max()
            .unwrap_or(0)
    }

    // ==================== Robber ====================

    /// Move the robber onto `tile`. Returns the tile it left.
    pub fn move_robber(&mut self, tile: TileId) -> Result<Option<TileId>, PlacementError> {
        if !self.tile(tile).terrain.is_land() {
            return Err(PlacementError::NoRobberTile);
        }
        let previous = self.robber_tile();
        if previous == Some(tile) {
            return Err(PlacementError::RobberAlreadyThere);
        }

        if let Some(old) = previous {
            self.topology_mut().tile_mut(old).has_robber = false;
        }
        self.topology_mut().tile_mut(tile).has_robber = true;
        self.robber_mut().tile = Some(tile);
        Ok(previous)
    }

    /// Distinct owners of buildings on the corners of `tile`
    pub fn adjacent_owners(&self, tile: TileId) -> BTreeSet<PlayerId> {
        self.tile(tile)
            .corners()
            .iter()
            .filter_map(|&c| self.corner(c).owner())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::HexCoord;
    use crate::pieces::BuildingKind;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn board() -> Board {
        Board::standard(&mut StdRng::seed_from_u64(17))
    }

    fn center(board: &Board) -> TileId {
        board.tile_at(&HexCoord::new(0, 0)).unwrap()
    }

    /// Corners and sides of the center tile, in direction order
    fn ring(board: &Board) -> ([CornerId; 6], [SideId; 6]) {
        let tile = board.tile(center(board));
        (*tile.corners(), *tile.sides())
    }

    fn producing_tile(board: &Board) -> TileId {
        board
            .tiles()
            .iter()
            .find(|t| t.dice_number().is_some() && t.is_productive())
            .map(|t| t.id)
            .unwrap()
    }

    #[test]
    fn test_distance_rule() {
        let mut board = board();
        let (corners, _) = ring(&board);
        board.place_settlement(corners[0], 0, false).unwrap();

        for adj in board.corner(corners[0]).adjacent_corners().to_vec() {
            assert_eq!(
                board.check_settlement(adj, 1, false),
                Err(PlacementError::DistanceRule),
                "Adjacent corner should fail distance rule"
            );
            assert_eq!(
                board.place_settlement(adj, 1, false),
                Err(PlacementError::DistanceRule)
            );
            assert!(board.building(adj).is_none());
        }

        assert_eq!(
            board.check_settlement(corners[0], 1, false),
            Err(PlacementError::CornerOccupied)
        );
        assert!(board.check_settlement(corners[2], 1, false).is_ok());
    }

    #[test]
    fn test_settlement_needs_road_in_normal_play() {
        let mut board = board();
        let (corners, sides) = ring(&board);
        board.place_settlement(corners[0], 0, false).unwrap();

        assert_eq!(
            board.check_settlement(corners[2], 0, true),
            Err(PlacementError::NotConnected)
        );

        board.place_road(sides[0], 0).unwrap();
        board.place_road(sides[1], 0).unwrap();
        assert!(board.check_settlement(corners[2], 0, true).is_ok());
        assert!(
            board.check_settlement(corners[2], 1, true).is_err(),
            "another player's road does not count"
        );
        assert!(board.valid_settlement_corners_for(0).contains(&corners[2]));
    }

    #[test]
    fn test_valid_settlement_corners_shrink() {
        let mut board = board();
        assert_eq!(board.valid_settlement_corners().len(), 54);

        let (corners, _) = ring(&board);
        board.place_settlement(corners[0], 0, false).unwrap();
        // The corner itself plus its three neighbors
        assert_eq!(board.valid_settlement_corners().len(), 50);
    }

    #[test]
    fn test_road_connectivity() {
        let mut board = board();
        let (corners, sides) = ring(&board);
        board.place_settlement(corners[0], 0, false).unwrap();

        let valid = board.valid_road_sides(0);
        for side in board.corner(corners[0]).sides() {
            assert!(valid.contains(side), "Should be able to build road adjacent to settlement");
        }
        assert_eq!(valid.len(), 3);
        assert_eq!(board.check_road(sides[2], 0), Err(PlacementError::NotConnected));

        board.place_road(sides[0], 0).unwrap();
        assert_eq!(board.check_road(sides[0], 0), Err(PlacementError::SideOccupied));
        assert!(board.check_road(sides[1], 0).is_ok(), "Should extend from own road");
        assert!(board.valid_road_sides(0).len() > valid.len() - 1);
    }

    #[test]
    fn test_road_may_extend_past_opponent_building() {
        let mut board = board();
        let (corners, sides) = ring(&board);
        board.place_settlement(corners[0], 0, false).unwrap();
        board.place_settlement(corners[2], 1, false).unwrap();
        board.place_road(sides[0], 0).unwrap();
        board.place_road(sides[1], 0).unwrap();

        // Adjacency to an own road is enough for placement
        assert!(board.check_road(sides[2], 0).is_ok());
    }

    #[test]
    fn test_city_upgrade() {
        let mut board = board();
        let (corners, _) = ring(&board);

        assert_eq!(board.check_city(corners[0], 0), Err(PlacementError::NotOwnSettlement));

        let settlement = board.place_settlement(corners[0], 0, false).unwrap();
        assert_eq!(board.check_city(corners[0], 1), Err(PlacementError::NotOwnSettlement));

        let removed = board.place_city(corners[0], 0).unwrap();
        assert_eq!(removed, settlement);
        let city = board.building(corners[0]).unwrap();
        assert_eq!(city.kind, BuildingKind::City);
        assert_ne!(city.id, settlement.id);

        assert_eq!(board.place_city(corners[0], 0), Err(PlacementError::NotOwnSettlement));
        assert!(board.valid_city_corners(0).is_empty());
    }

    #[test]
    fn test_resource_distribution() {
        let mut board = board();
        let tile_id = producing_tile(&board);
        let tile = board.tile(tile_id).clone();
        let roll = tile.dice_number().unwrap();
        let resource = tile.resource().unwrap();

        board.place_settlement(tile.corners()[0], 0, false).unwrap();
        board.place_settlement(tile.corners()[3], 1, false).unwrap();
        board.place_city(tile.corners()[3], 1).unwrap();

        let distribution = board.production(roll);
        assert!(distribution[&0].get(resource) >= 1);
        assert!(distribution[&1].get(resource) >= 2, "City should give double resources");
        assert!(board.producing_tiles(roll).contains(&tile_id));
    }

    /// Production worked out corner by corner, without `Board::production`
    fn production_by_corner(board: &Board, roll: u8) -> BTreeMap<PlayerId, ResourceHand> {
        let mut expected: BTreeMap<PlayerId, ResourceHand> = BTreeMap::new();
        for corner in board.corners() {
            let Some(building) = corner.building else {
                continue;
            };
            let amount = match building.kind {
                BuildingKind::Settlement => 1,
                BuildingKind::City => 2,
            };
            for &tile_id in corner.tiles() {
                let tile = board.tile(tile_id);
                if tile.marker.map(|m| m.value()) != Some(roll) || tile.has_robber {
                    continue;
                }
                if let Some(resource) = tile.terrain.resource() {
                    expected.entry(building.owner).or_default().add(resource, amount);
                }
            }
        }
        expected
    }

    #[test]
    fn test_production_matches_per_corner_count() {
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut board = Board::standard(&mut rng);

            for i in 0..8u8 {
                let options = board.valid_settlement_corners();
                let Some(&corner) = options.choose(&mut rng) else {
                    break;
                };
                let owner = i % 3;
                board.place_settlement(corner, owner, false).unwrap();
                if rng.gen_bool(0.4) {
                    board.place_city(corner, owner).unwrap();
                }
            }

            let land: Vec<TileId> = board.land_tiles().map(|t| t.id).collect();
            if let Some(&tile) = land.choose(&mut rng) {
                let _ = board.move_robber(tile);
            }

            for roll in 2..=12 {
                assert_eq!(
                    board.production(roll),
                    production_by_corner(&board, roll),
                    "seed {seed}, roll {roll}"
                );
            }
        }
    }

    #[test]
    fn test_robber_blocks_production() {
        let mut board = board();
        let tile_id = producing_tile(&board);
        let roll = board.tile(tile_id).dice_number().unwrap();
        let corner = board.tile(tile_id).corners()[0];
        board.place_settlement(corner, 0, false).unwrap();

        let before = board.production(roll);
        assert!(before.contains_key(&0));

        let previous = board.move_robber(tile_id).unwrap();
        assert!(previous.is_some());
        assert!(!board.tile(previous.unwrap()).has_robber);
        assert!(board.tile(tile_id).has_robber);

        assert!(!board.producing_tiles(roll).contains(&tile_id));
        let resource = board.tile(tile_id).resource().unwrap();
        let after = board.production(roll);
        let before_amount = before[&0].get(resource);
        let after_amount = after.get(&0).map_or(0, |h| h.get(resource));
        assert!(after_amount < before_amount, "Robber should block production");
    }

    #[test]
    fn test_seven_produces_nothing() {
        let mut board = board();
        let (corners, _) = ring(&board);
        board.place_settlement(corners[0], 0, false).unwrap();
        assert!(board.producing_tiles(7).is_empty());
        assert!(board.production(7).is_empty());
    }

    #[test]
    fn test_robber_rejects_same_tile() {
        let mut board = board();
        let current = board.robber_tile().unwrap();
        assert_eq!(board.move_robber(current), Err(PlacementError::RobberAlreadyThere));
    }

    #[test]
    fn test_adjacent_owners() {
        let mut board = board();
        let (corners, _) = ring(&board);
        board.place_settlement(corners[0], 0, false).unwrap();
        board.place_settlement(corners[2], 2, false).unwrap();
        board.place_settlement(corners[4], 2, false).unwrap();

        let owners: Vec<_> = board.adjacent_owners(center(&board)).into_iter().collect();
        assert_eq!(owners, vec![0, 2]);
    }

    #[test]
    fn test_corner_yield() {
        let board = board();
        let (corners, _) = ring(&board);
        let hand = board.corner_yield(corners[0]);
        let producing = board
            .corner(corners[0])
            .tiles()
            .iter()
            .filter(|&&t| board.tile(t).resource().is_some())
            .count();
        assert_eq!(hand.total() as usize, producing);
    }

    #[test]
    fn test_longest_road_chain() {
        let mut board = board();
        let (corners, sides) = ring(&board);
        board.place_settlement(corners[0], 0, false).unwrap();

        board.place_road(sides[0], 0).unwrap();
        assert_eq!(board.longest_road(0), 1);

        board.place_road(sides[1], 0).unwrap();
        board.place_road(sides[2], 0).unwrap();
        assert_eq!(board.road_length_from(sides[0]), 3);
        assert_eq!(board.road_length_from(sides[1]), 2);
        assert_eq!(board.longest_road(0), 3);
        assert_eq!(board.longest_road(1), 0);
    }

    #[test]
    fn test_longest_road_around_a_loop() {
        let mut board = board();
        let (corners, sides) = ring(&board);
        board.place_settlement(corners[0], 0, false).unwrap();
        for side in sides {
            board.place_road(side, 0).unwrap();
        }
        assert_eq!(board.longest_road(0), 6);
    }

    #[test]
    fn test_opponent_building_cuts_road() {
        let mut board = board();
        let (corners, sides) = ring(&board);
        board.place_settlement(corners[0], 0, false).unwrap();
        for side in &sides[..3] {
            board.place_road(*side, 0).unwrap();
        }
        assert_eq!(board.longest_road(0), 3);

        board.place_settlement(corners[2], 1, false).unwrap();
        assert_eq!(board.road_length_from(sides[0]), 2);
        assert_eq!(board.longest_road(0), 2);
    }

    #[test]
    fn test_road_between_opponent_buildings_adds_nothing() {
        let mut board = board();
        let (corners, sides) = ring(&board);
        board.place_settlement(corners[0], 0, false).unwrap();
        for side in &sides[..3] {
            board.place_road(*side, 0).unwrap();
        }

        // Both ends of the next side, out of reach of the distance rule
        for corner in [corners[3], corners[4]] {
            let id = board.next_piece_id();
            board.topology_mut().corner_mut(corner).building = Some(Building::settlement(id, 1));
        }
        assert_eq!(board.longest_road(0), 3);

        board.place_road(sides[3], 0).unwrap();
        assert_eq!(board.road_length_from(sides[3]), 1);
        assert_eq!(board.road_length_from(sides[0]), 3);
        assert_eq!(board.longest_road(0), 3);
    }

    #[test]
    fn test_own_building_does_not_cut_road() {
        let mut board = board();
        let (corners, sides) = ring(&board);
        board.place_settlement(corners[0], 0, false).unwrap();
        for side in &sides[..3] {
            board.place_road(*side, 0).unwrap();
        }
        board.place_settlement(corners[2], 0, false).unwrap();
        assert_eq!(board.longest_road(0), 3);
    }
}
