//! # Thicket
//!
//! A grid-world roguelike simulation engine.
//!
//! ## Architecture Overview
//!
//! Thicket is the world-simulation core of a tile-based roguelike. It owns
//! everything with algorithmic content and nothing presentational:
//!
//! - **World Model**: tile kinds, per-cell visibility state, the row-major grid
//! - **Map Generators**: cellular-automaton caves, room-and-corridor tunnels,
//!   noise-based forests
//! - **Field of View**: ray-cast visibility from the player's position
//! - **Actor Behaviour**: idle/wander/chase/passing state machine driven by
//!   A* pathfinding over a derived occupancy grid
//! - **Level Lifecycle**: generation, population, and persisted transitions
//!   between dungeon depths
//!
//! ## Renderer Boundary
//!
//! The engine is turn-based and synchronous. A renderer feeds it
//! [`PlayerIntent`] values and receives a read-only [`TurnSnapshot`] after each
//! turn; it never mutates engine state directly. Persistence is a key-value
//! interface storing JSON-encoded level snapshots.

pub mod actors;
pub mod fov;
pub mod game;
pub mod generation;
pub mod items;
pub mod pathfinding;
pub mod world;

pub use actors::{Actor, Behaviour, PopulationConfig};
pub use fov::compute_fov;
pub use game::{
    LevelSnapshot, LevelStorage, MemoryLevelStorage, MessageLog, Player, PlayerIntent,
    TurnSnapshot, WorldState,
};
pub use generation::{
    CaveGenerator, ForestGenerator, GenerationConfig, MapGenerator, MapKind, TunnelsGenerator,
};
pub use items::{Carrier, Item};
pub use pathfinding::{find_path, OccupancyGrid};
pub use world::{Direction, Grid, Position, Tile, TileKind};

/// Core error type for the Thicket engine.
///
/// Gameplay-level failures (bumping into a wall, an actor finding no path) are
/// not errors; they surface as log messages on the world state. These variants
/// cover genuine invariant violations and serialization faults.
#[derive(thiserror::Error, Debug)]
pub enum ThicketError {
    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Engine state is invalid
    #[error("Invalid engine state: {0}")]
    InvalidState(String),

    /// Map generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Thicket codebase.
pub type ThicketResult<T> = Result<T, ThicketError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation constants.
pub mod config {
    /// World width in tiles
    pub const WORLD_WIDTH: u32 = 110;

    /// World height in tiles
    pub const WORLD_HEIGHT: u32 = 30;

    /// Player sight radius in tiles
    pub const FOV_RADIUS: u32 = 5;

    /// Number of wandering NPCs placed per level
    pub const NPC_COUNT: u32 = 20;

    /// Number of edge-to-edge passers placed on forest levels
    pub const PASSER_COUNT: u32 = 20;

    /// Number of ground items placed per level
    pub const ITEM_COUNT: u32 = 10;

    /// Maximum turns of log history retained, most recent first
    pub const LOG_HISTORY_CAP: usize = 100;
}
