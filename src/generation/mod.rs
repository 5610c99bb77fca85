//! # Generation Module
//!
//! Procedural map generation: cellular-automaton caves, room-and-corridor
//! tunnels, and noise-based forests. Every generator takes an injected RNG so
//! generation is reproducible under a fixed seed.

pub mod cave;
pub mod forest;
pub mod tunnels;

pub use cave::*;
pub use forest::*;
pub use tunnels::*;

use crate::world::{Grid, Position, TileKind};
use crate::{ThicketError, ThicketResult};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Which terrain algorithm to run for a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapKind {
    Cave,
    Tunnels,
    Forest,
}

/// Configuration for procedural map generation.
///
/// Controls the knobs of all three generators. Values are tuning data, not
/// algorithm: changing them reshapes maps without changing any invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Map width in tiles
    pub width: u32,
    /// Map height in tiles
    pub height: u32,
    /// Cave: automaton steps to run
    pub cave_steps: u32,
    /// Cave: a wall with fewer wall-neighbors than this becomes floor
    pub cave_death_limit: u32,
    /// Cave: a floor with more wall-neighbors than this becomes wall
    pub cave_birth_limit: u32,
    /// Tunnels: minimum room dimension
    pub min_room_size: u32,
    /// Tunnels: maximum room dimension
    pub max_room_size: u32,
    /// Tunnels: minimum number of rooms per level
    pub min_rooms: u32,
    /// Tunnels: maximum number of rooms per level
    pub max_rooms: u32,
    /// Tunnels: spacing margin kept between rooms
    pub room_spacing: u32,
    /// Tunnels: carved corridor width
    pub corridor_width: u32,
    /// Tunnels: longest straight corridor segment before the axis may switch
    pub max_straight_corridor: u32,
    /// Tunnels: placement attempts per room before giving up on it
    pub max_placement_attempts: u32,
    /// Forest: noise sample scale per tile
    pub noise_scale: f64,
    /// Forest: noise threshold above which a cell becomes grass
    pub grass_threshold: f64,
    /// Forest: noise threshold above which a cell becomes bush
    pub bush_threshold: f64,
    /// Forest: chance a grass cell upgrades to a tree
    pub tree_chance: f64,
    /// Minimum distance between the spawn point and placed down-stairs
    pub stairs_min_distance: u32,
}

impl GenerationConfig {
    /// Creates the default configuration for a given seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use thicket::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(12345);
    /// assert_eq!(config.seed, 12345);
    /// assert!(config.max_room_size >= config.min_room_size);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: crate::config::WORLD_WIDTH,
            height: crate::config::WORLD_HEIGHT,
            cave_steps: 2,
            cave_death_limit: 2,
            cave_birth_limit: 4,
            min_room_size: 3,
            max_room_size: 5,
            min_rooms: 4,
            max_rooms: 10,
            room_spacing: 1,
            corridor_width: 1,
            max_straight_corridor: 5,
            max_placement_attempts: 100,
            noise_scale: 0.1,
            grass_threshold: 0.2,
            bush_threshold: 0.6,
            tree_chance: 0.05,
            stairs_min_distance: 10,
        }
    }

    /// Creates a configuration for tests: a smaller map that keeps unit tests
    /// fast while exercising the same code paths.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            width: 40,
            height: 20,
            ..Self::new(seed)
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait implemented by every map generator.
pub trait MapGenerator {
    /// Generates a full grid using the provided configuration and RNG.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> ThicketResult<Grid>;

    /// Validates that a generated grid meets basic requirements.
    fn validate(&self, grid: &Grid) -> ThicketResult<()> {
        let walkable = grid.tiles().filter(|t| t.kind.walkable()).count();
        if walkable == 0 {
            return Err(ThicketError::GenerationFailed(
                "map has no walkable tiles".to_string(),
            ));
        }
        Ok(())
    }

    /// The generator name for logging and diagnostics.
    fn generator_type(&self) -> &'static str;
}

/// Generates a grid of the requested kind.
pub fn generate(kind: MapKind, config: &GenerationConfig, rng: &mut StdRng) -> ThicketResult<Grid> {
    match kind {
        MapKind::Cave => CaveGenerator.generate(config, rng),
        MapKind::Tunnels => TunnelsGenerator.generate(config, rng),
        MapKind::Forest => ForestGenerator.generate(config, rng),
    }
}

/// Places a down-stairs on a walkable cell at least `min_distance` away from
/// `spawn`, by rejection sampling.
///
/// If the budget runs out (tiny maps, unlucky terrain), degrades to the first
/// walkable cell found and warns rather than failing.
pub(crate) fn place_stairs_down(
    grid: &mut Grid,
    spawn: Position,
    min_distance: u32,
    rng: &mut StdRng,
) -> ThicketResult<Position> {
    for _ in 0..1000 {
        let pos = Position::new(
            rng.gen_range(1..grid.width as i32 - 1),
            rng.gen_range(1..grid.height as i32 - 1),
        );
        if !grid.is_blocking(pos)
            && grid.get(pos).map_or(false, |t| t.kind != TileKind::StairsUp)
            && spawn.euclidean_distance(pos) >= min_distance as f64
        {
            grid.set_kind(pos, TileKind::StairsDown);
            return Ok(pos);
        }
    }

    log::warn!("stairs placement budget exhausted, relaxing distance constraint");
    let fallback = grid
        .cells()
        .find(|(pos, tile)| tile.kind.walkable() && *pos != spawn)
        .map(|(pos, _)| pos)
        .ok_or_else(|| {
            ThicketError::GenerationFailed("no walkable cell for stairs".to_string())
        })?;
    grid.set_kind(fallback, TileKind::StairsDown);
    Ok(fallback)
}
