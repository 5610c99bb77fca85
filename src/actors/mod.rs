//! # Actors
//!
//! Non-player creatures: their data, behaviour states, and population rules.
//! Wanderers appear on every map; passers-by are a forest feature, entering
//! at one map edge and leaving by another.

pub mod behaviour;

pub use behaviour::{take_turn, ActorTurn};

use crate::world::{Grid, Position};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The behaviour state an actor is in.
///
/// A closed set: every variant carries exactly the state its behaviour needs,
/// and the turn pass matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Behaviour {
    /// Stands still.
    Idle,
    /// Walks to a random destination, picking a new one on arrival.
    Wander { destination: Option<Position> },
    /// Routes toward the player every turn.
    Chase,
    /// Crosses the map toward a fixed edge destination, then despawns.
    Passing { destination: Position },
}

/// A creature on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub race: String,
    pub glyph: char,
    pub color: String,
    pub hitpoints: i32,
    pub pos: Position,
    pub behaviour: Behaviour,
}

impl Actor {
    pub fn new(
        race: impl Into<String>,
        glyph: char,
        color: impl Into<String>,
        pos: Position,
        behaviour: Behaviour,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            race: race.into(),
            glyph,
            color: color.into(),
            hitpoints: 10,
            pos,
            behaviour,
        }
    }

    /// A wandering stranger, the stock creature of every map.
    pub fn stranger(pos: Position) -> Self {
        Self::new(
            "stranger",
            'p',
            "#d2b48c",
            pos,
            Behaviour::Wander { destination: None },
        )
    }

    /// A jogger crossing the forest from one edge to another.
    pub fn jogger(pos: Position, destination: Position) -> Self {
        Self::new(
            "jogger",
            'j',
            "#87ceeb",
            pos,
            Behaviour::Passing { destination },
        )
    }
}

/// How many of each population a freshly generated level gets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PopulationConfig {
    pub npc_count: u32,
    pub passer_count: u32,
    pub item_count: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            npc_count: crate::config::NPC_COUNT,
            passer_count: crate::config::PASSER_COUNT,
            item_count: crate::config::ITEM_COUNT,
        }
    }
}

/// The four map edges a passer-by can enter or leave through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    North,
    South,
    West,
    East,
}

impl Edge {
    const ALL: [Edge; 4] = [Edge::North, Edge::South, Edge::West, Edge::East];

    fn random(rng: &mut StdRng) -> Edge {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Picks a different edge than `self`.
    fn random_other(self, rng: &mut StdRng) -> Edge {
        loop {
            let edge = Self::random(rng);
            if edge != self {
                return edge;
            }
        }
    }

    /// A random position just inside this edge.
    fn random_position(self, grid: &Grid, rng: &mut StdRng) -> Position {
        let width = grid.width as i32;
        let height = grid.height as i32;
        match self {
            Edge::North => Position::new(rng.gen_range(2..width - 2), 1),
            Edge::South => Position::new(rng.gen_range(2..width - 2), height - 2),
            Edge::West => Position::new(1, rng.gen_range(2..height - 2)),
            Edge::East => Position::new(width - 2, rng.gen_range(2..height - 2)),
        }
    }
}

/// Scatters wandering strangers over random walkable cells, one per cell and
/// never on a cell in `avoid`.
pub fn spawn_wanderers(grid: &Grid, count: u32, avoid: &[Position], rng: &mut StdRng) -> Vec<Actor> {
    let mut taken: std::collections::HashSet<Position> = avoid.iter().copied().collect();
    let mut actors = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut placed = false;
        for _ in 0..50 {
            if let Some(pos) = grid.random_walkable(rng, 1000) {
                if taken.insert(pos) {
                    actors.push(Actor::stranger(pos));
                    placed = true;
                    break;
                }
            }
        }
        if !placed {
            log::warn!("no free walkable cell found for wanderer placement");
            break;
        }
    }
    actors
}

/// Spawns joggers on the map edges, each with a destination on a different
/// edge. A jogger whose entry cell never samples walkable is skipped.
pub fn spawn_passers(grid: &Grid, count: u32, rng: &mut StdRng) -> Vec<Actor> {
    let mut actors = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut placed = false;
        for _ in 0..50 {
            let entry_edge = Edge::random(rng);
            let spawn = entry_edge.random_position(grid, rng);
            let destination = entry_edge.random_other(rng).random_position(grid, rng);
            if !grid.is_blocking(spawn) && !grid.is_blocking(destination) {
                actors.push(Actor::jogger(spawn, destination));
                placed = true;
                break;
            }
        }
        if !placed {
            log::warn!("no open edge cell found for passer placement");
        }
    }
    actors
}
