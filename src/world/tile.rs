//! # Tile Model
//!
//! Tile kinds with their fixed per-kind properties, and the per-cell mutable
//! visibility state. Static properties live on [`TileKind`] as a closed lookup
//! so a tile's behavior is never ambiguous; only `visible`/`explored` mutate
//! during play.

use serde::{Deserialize, Serialize};

/// The closed set of tile kinds in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Floor,
    Wall,
    Grass,
    Tree,
    Bush,
    Soil,
    StairsUp,
    StairsDown,
    Empty,
}

impl TileKind {
    /// Whether this kind is impassable to movement and pathfinding.
    ///
    /// Stairs are never blocking.
    pub fn blocking(self) -> bool {
        matches!(self, TileKind::Wall | TileKind::Tree | TileKind::Empty)
    }

    /// Whether this kind blocks line of sight.
    ///
    /// Bushes obscure without blocking movement; trees and walls do both.
    pub fn obscuring(self) -> bool {
        matches!(self, TileKind::Wall | TileKind::Tree | TileKind::Bush)
    }

    /// Whether this kind can be walked on.
    pub fn walkable(self) -> bool {
        !self.blocking()
    }

    /// The display glyph for this kind.
    pub fn glyph(self) -> char {
        match self {
            TileKind::Floor => '.',
            TileKind::Wall => '#',
            TileKind::Grass => ',',
            TileKind::Tree => 'T',
            TileKind::Bush => '"',
            TileKind::Soil => '.',
            TileKind::StairsUp => '<',
            TileKind::StairsDown => '>',
            TileKind::Empty => ' ',
        }
    }

    /// Foreground color for rendering, as a hex string.
    pub fn color(self) -> &'static str {
        match self {
            TileKind::Floor => "#8B4513",
            TileKind::Wall => "#808080",
            TileKind::Grass => "#008000",
            TileKind::Tree => "#006400",
            TileKind::Bush => "#008000",
            TileKind::Soil => "#008000",
            TileKind::StairsUp => "#FFFFFF",
            TileKind::StairsDown => "#FFFFFF",
            TileKind::Empty => "#000000",
        }
    }

    /// Background color for rendering, as a hex string.
    pub fn background(self) -> &'static str {
        match self {
            TileKind::Wall => "#404040",
            _ => "#000000",
        }
    }
}

/// One cell of the world: a kind plus per-level mutable visibility state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// What this cell is.
    pub kind: TileKind,
    /// Whether the player currently sees this cell. Recomputed every turn.
    pub visible: bool,
    /// Whether the player has ever seen this cell. Monotonic: once true,
    /// never reset.
    pub explored: bool,
}

impl Tile {
    /// Creates an unseen tile of the given kind.
    pub fn new(kind: TileKind) -> Self {
        Self {
            kind,
            visible: false,
            explored: false,
        }
    }

    /// Shorthand for a floor tile.
    pub fn floor() -> Self {
        Self::new(TileKind::Floor)
    }

    /// Shorthand for a wall tile.
    pub fn wall() -> Self {
        Self::new(TileKind::Wall)
    }

    /// Marks this tile as currently seen, which also marks it explored.
    pub fn mark_seen(&mut self) {
        self.visible = true;
        self.explored = true;
    }
}
