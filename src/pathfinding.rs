//! # Pathfinding
//!
//! A* routing over an occupancy grid that layers terrain blocking with the
//! cells currently taken by the player and actors. Movement is 8-directional
//! with unit step cost, so the heuristic is Chebyshev distance.

use crate::world::{Grid, Position};
use ::pathfinding::prelude::astar;
use std::collections::HashSet;

/// A snapshot of which cells cannot be entered right now.
///
/// Terrain blocking comes from the grid; dynamic blocking comes from whoever
/// is standing where. Rebuilt whenever an entity moves, because a stale grid
/// routes actors through each other.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    width: u32,
    height: u32,
    terrain_blocked: Vec<bool>,
    occupied: HashSet<Position>,
}

impl OccupancyGrid {
    /// Builds the occupancy view of `grid` with the given cells occupied.
    ///
    /// Occupied cells block regardless of the terrain under them.
    pub fn new<I>(grid: &Grid, occupied: I) -> Self
    where
        I: IntoIterator<Item = Position>,
    {
        let terrain_blocked = grid.tiles().map(|t| t.kind.blocking()).collect();
        Self {
            width: grid.width,
            height: grid.height,
            terrain_blocked,
            occupied: occupied.into_iter().collect(),
        }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    /// Whether `pos` cannot be entered, by terrain or by an entity standing
    /// there. Out-of-bounds counts as blocked.
    pub fn is_blocked(&self, pos: Position) -> bool {
        if !self.in_bounds(pos) {
            return true;
        }
        let index = (pos.x + self.width as i32 * pos.y) as usize;
        self.terrain_blocked[index] || self.occupied.contains(&pos)
    }

    /// Whether an entity currently stands on `pos`.
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.occupied.contains(&pos)
    }
}

/// Finds a shortest path from `start` to `goal`, inclusive of both endpoints.
///
/// The goal cell is treated as enterable even when an entity occupies it, so
/// a chaser can path all the way to its target and resolve the collision at
/// the final step. Returns `None` when no route exists.
pub fn find_path(occupancy: &OccupancyGrid, start: Position, goal: Position) -> Option<Vec<Position>> {
    if occupancy.is_blocked(goal) && !occupancy.is_occupied(goal) {
        return None;
    }

    let result = astar(
        &start,
        |pos| {
            pos.adjacent_positions()
                .into_iter()
                .filter(|&nb| nb == goal || !occupancy.is_blocked(nb))
                .map(|nb| (nb, 1u32))
                .collect::<Vec<_>>()
        },
        |pos| pos.chebyshev_distance(goal),
        |pos| *pos == goal,
    );

    result.map(|(path, _cost)| path)
}
