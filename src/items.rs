//! # Items
//!
//! Ground items and who carries them. An item on the floor has a position; a
//! carried item keeps its last floor position but is owned by a carrier and
//! not rendered on the grid.

use crate::world::{Grid, Position};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who is holding an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Carrier {
    Player,
    Actor(Uuid),
}

/// An item in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub glyph: char,
    pub color: String,
    pub pos: Position,
    pub carried_by: Option<Carrier>,
}

impl Item {
    pub fn new(name: impl Into<String>, glyph: char, color: impl Into<String>, pos: Position) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            glyph,
            color: color.into(),
            pos,
            carried_by: None,
        }
    }

    /// A small trinket, the one item template currently in rotation.
    pub fn trinket(pos: Position) -> Self {
        Self::new("trinket", '*', "#ffd700", pos)
    }

    pub fn on_ground(&self) -> bool {
        self.carried_by.is_none()
    }
}

/// Scatters `count` items over random walkable cells.
///
/// Cells are sampled independently, so two items may share a cell; that is
/// allowed, pickup takes the first match.
pub fn populate_items(grid: &Grid, count: u32, rng: &mut StdRng) -> Vec<Item> {
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        if let Some(pos) = grid.random_walkable(rng, 1000) {
            items.push(Item::trinket(pos));
        } else {
            log::warn!("no walkable cell found for item placement");
            break;
        }
    }
    items
}

/// Picks up the first ground item at `pos`, marking it carried.
///
/// Returns the name of the item taken, or `None` when the cell is bare.
pub fn pick_up_at(items: &mut [Item], pos: Position, carrier: Carrier) -> Option<String> {
    let item = items
        .iter_mut()
        .find(|item| item.on_ground() && item.pos == pos)?;
    item.carried_by = Some(carrier);
    Some(item.name.clone())
}

/// Drops the item held by `carrier` onto `pos`.
///
/// Returns the name of the item dropped, or `None` when the carrier holds
/// nothing.
pub fn drop_at(items: &mut [Item], pos: Position, carrier: Carrier) -> Option<String> {
    let item = items
        .iter_mut()
        .find(|item| item.carried_by == Some(carrier))?;
    item.carried_by = None;
    item.pos = pos;
    Some(item.name.clone())
}
