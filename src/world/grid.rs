//! # Grid
//!
//! The rectangular tile array for one level, stored row-major with
//! `index = x + width * y`.

use crate::world::{Position, Tile, TileKind};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The full tile grid for one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub width: u32,
    pub height: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates a grid filled with the given tile kind.
    pub fn filled(width: u32, height: u32, kind: TileKind) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::new(kind); (width * height) as usize],
        }
    }

    /// Row-major index of a position. Caller must ensure the position is in
    /// bounds.
    pub fn index(&self, pos: Position) -> usize {
        (pos.x + self.width as i32 * pos.y) as usize
    }

    /// Whether a position lies within the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    /// Gets the tile at a position, or None if out of bounds.
    pub fn get(&self, pos: Position) -> Option<&Tile> {
        if self.in_bounds(pos) {
            let idx = self.index(pos);
            self.tiles.get(idx)
        } else {
            None
        }
    }

    /// Gets the tile at a position mutably, or None if out of bounds.
    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        if self.in_bounds(pos) {
            let idx = self.index(pos);
            self.tiles.get_mut(idx)
        } else {
            None
        }
    }

    /// Replaces the tile kind at a position, preserving visibility state.
    /// Out-of-bounds positions are ignored.
    pub fn set_kind(&mut self, pos: Position, kind: TileKind) {
        if let Some(tile) = self.get_mut(pos) {
            tile.kind = kind;
        }
    }

    /// Whether the tile at a position blocks movement. Out-of-bounds counts
    /// as blocking.
    pub fn is_blocking(&self, pos: Position) -> bool {
        self.get(pos).map_or(true, |tile| tile.kind.blocking())
    }

    /// Iterates over all tiles.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Iterates over all tiles mutably.
    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    /// Iterates over `(Position, &Tile)` pairs.
    pub fn cells(&self) -> impl Iterator<Item = (Position, &Tile)> {
        let width = self.width as i32;
        self.tiles.iter().enumerate().map(move |(i, tile)| {
            (Position::new(i as i32 % width, i as i32 / width), tile)
        })
    }

    /// Forces the outer border to wall.
    pub fn seal_border(&mut self) {
        for x in 0..self.width as i32 {
            self.set_kind(Position::new(x, 0), TileKind::Wall);
            self.set_kind(Position::new(x, self.height as i32 - 1), TileKind::Wall);
        }
        for y in 0..self.height as i32 {
            self.set_kind(Position::new(0, y), TileKind::Wall);
            self.set_kind(Position::new(self.width as i32 - 1, y), TileKind::Wall);
        }
    }

    /// Scans the grid linearly for the first tile of the given kind.
    pub fn find_tile(&self, kind: TileKind) -> Option<Position> {
        self.cells()
            .find(|(_, tile)| tile.kind == kind)
            .map(|(pos, _)| pos)
    }

    /// Samples a random walkable interior cell (border excluded) by rejection
    /// sampling. Returns None if no walkable cell turns up within the attempt
    /// budget.
    pub fn random_walkable(&self, rng: &mut StdRng, max_attempts: u32) -> Option<Position> {
        for _ in 0..max_attempts {
            let pos = Position::new(
                rng.gen_range(1..self.width as i32 - 1),
                rng.gen_range(1..self.height as i32 - 1),
            );
            if !self.is_blocking(pos) {
                return Some(pos);
            }
        }
        None
    }

    /// Counts tiles of a given kind.
    pub fn count_kind(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|tile| tile.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_index_formula() {
        let grid = Grid::filled(110, 30, TileKind::Floor);
        assert_eq!(grid.index(Position::new(0, 0)), 0);
        assert_eq!(grid.index(Position::new(5, 2)), 5 + 110 * 2);
        assert_eq!(grid.index(Position::new(109, 29)), 110 * 30 - 1);
    }

    #[test]
    fn test_bounds() {
        let grid = Grid::filled(10, 5, TileKind::Floor);
        assert!(grid.in_bounds(Position::new(0, 0)));
        assert!(grid.in_bounds(Position::new(9, 4)));
        assert!(!grid.in_bounds(Position::new(10, 0)));
        assert!(!grid.in_bounds(Position::new(0, 5)));
        assert!(!grid.in_bounds(Position::new(-1, 0)));
        assert!(grid.get(Position::new(-1, 0)).is_none());
    }

    #[test]
    fn test_out_of_bounds_blocks() {
        let grid = Grid::filled(10, 5, TileKind::Floor);
        assert!(!grid.is_blocking(Position::new(5, 2)));
        assert!(grid.is_blocking(Position::new(-1, 2)));
        assert!(grid.is_blocking(Position::new(5, 5)));
    }

    #[test]
    fn test_set_kind_preserves_visibility() {
        let mut grid = Grid::filled(10, 5, TileKind::Floor);
        let pos = Position::new(3, 3);
        grid.get_mut(pos).unwrap().mark_seen();

        grid.set_kind(pos, TileKind::Wall);
        let tile = grid.get(pos).unwrap();
        assert_eq!(tile.kind, TileKind::Wall);
        assert!(tile.visible);
        assert!(tile.explored);
    }

    #[test]
    fn test_seal_border() {
        let mut grid = Grid::filled(10, 5, TileKind::Floor);
        grid.seal_border();

        for x in 0..10 {
            assert_eq!(grid.get(Position::new(x, 0)).unwrap().kind, TileKind::Wall);
            assert_eq!(grid.get(Position::new(x, 4)).unwrap().kind, TileKind::Wall);
        }
        for y in 0..5 {
            assert_eq!(grid.get(Position::new(0, y)).unwrap().kind, TileKind::Wall);
            assert_eq!(grid.get(Position::new(9, y)).unwrap().kind, TileKind::Wall);
        }
        assert_eq!(grid.get(Position::new(5, 2)).unwrap().kind, TileKind::Floor);
    }

    #[test]
    fn test_find_tile() {
        let mut grid = Grid::filled(10, 5, TileKind::Floor);
        assert!(grid.find_tile(TileKind::StairsDown).is_none());

        grid.set_kind(Position::new(7, 3), TileKind::StairsDown);
        assert_eq!(grid.find_tile(TileKind::StairsDown), Some(Position::new(7, 3)));
    }

    #[test]
    fn test_random_walkable_avoids_blocking() {
        let mut grid = Grid::filled(10, 10, TileKind::Wall);
        grid.set_kind(Position::new(4, 4), TileKind::Floor);

        let mut rng = StdRng::seed_from_u64(7);
        let pos = grid.random_walkable(&mut rng, 10_000).unwrap();
        assert_eq!(pos, Position::new(4, 4));
    }
}
