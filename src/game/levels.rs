//! # Level Lifecycle
//!
//! Descending, ascending, and persisting levels. Every level the player
//! leaves is snapshotted to storage as JSON and restored intact on return,
//! actors and dropped items included.

use crate::actors::{Actor, PopulationConfig};
use crate::game::WorldState;
use crate::generation::{self, GenerationConfig, MapKind};
use crate::items::Item;
use crate::world::{Grid, Position, TileKind};
use crate::{ThicketError, ThicketResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const DEPTH_KEY_PREFIX: &str = "depth-";
const SAVE_KEY_PREFIX: &str = "save-";

/// A level frozen for storage: terrain with its exploration state, plus the
/// populations as they stood when the player left.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub grid: Grid,
    pub actors: Vec<Actor>,
    pub items: Vec<Item>,
    pub player_position: Position,
    pub depth: u32,
    pub map_kind: MapKind,
}

/// Key-value persistence for level snapshots.
///
/// Implementations store JSON strings; the engine handles serialization, so a
/// backend only moves bytes.
pub trait LevelStorage {
    fn put(&mut self, key: &str, value: String) -> ThicketResult<()>;
    fn get(&self, key: &str) -> ThicketResult<Option<String>>;
    fn remove(&mut self, key: &str) -> ThicketResult<()>;
    fn keys(&self) -> ThicketResult<Vec<String>>;
    fn clear_all(&mut self) -> ThicketResult<()>;
}

/// In-memory storage, the default backend and the one tests use.
#[derive(Debug, Clone, Default)]
pub struct MemoryLevelStorage {
    entries: HashMap<String, String>,
}

impl MemoryLevelStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LevelStorage for MemoryLevelStorage {
    fn put(&mut self, key: &str, value: String) -> ThicketResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn get(&self, key: &str) -> ThicketResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn remove(&mut self, key: &str) -> ThicketResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> ThicketResult<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn clear_all(&mut self) -> ThicketResult<()> {
        self.entries.clear();
        Ok(())
    }
}

impl WorldState {
    fn current_snapshot(&self) -> LevelSnapshot {
        LevelSnapshot {
            grid: self.grid.clone(),
            actors: self.actors.clone(),
            items: self.items.clone(),
            player_position: self.player.pos,
            depth: self.depth,
            map_kind: self.map_kind,
        }
    }

    fn restore_snapshot(&mut self, snapshot: LevelSnapshot) {
        self.grid = snapshot.grid;
        self.actors = snapshot.actors;
        self.items = snapshot.items;
        self.player.pos = snapshot.player_position;
        self.depth = snapshot.depth;
        self.map_kind = snapshot.map_kind;
    }

    fn store_level(&mut self, key: &str) -> ThicketResult<()> {
        let json = serde_json::to_string(&self.current_snapshot())?;
        self.storage.put(key, json)
    }

    fn load_level(&self, key: &str) -> ThicketResult<Option<LevelSnapshot>> {
        match self.storage.get(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Takes the down-stairs underfoot.
    ///
    /// The current level is stored under its depth, then the level below is
    /// restored from storage or, on a first visit, freshly generated. Levels
    /// below the surface are always tunnels; each depth derives its own seed
    /// so revisits regenerate nothing.
    pub(crate) fn descend(&mut self) -> ThicketResult<()> {
        if self.tile_underfoot() != Some(TileKind::StairsDown) {
            self.log.push("There are no stairs down here.");
            return Ok(());
        }

        self.store_level(&depth_key(self.depth))?;
        let next_depth = self.depth + 1;

        match self.load_level(&depth_key(next_depth))? {
            Some(snapshot) => {
                self.restore_snapshot(snapshot);
                // Entering from above, so the player stands on the up-stairs.
                if let Some(pos) = self.grid.find_tile(TileKind::StairsUp) {
                    self.player.pos = pos;
                }
                log::info!("descended to stored level at depth {}", next_depth);
            }
            None => {
                self.generate_depth(next_depth)?;
                log::info!("descended to new level at depth {}", next_depth);
            }
        }

        self.log.push("You climb down the stairs.");
        Ok(())
    }

    /// Takes the up-stairs underfoot.
    ///
    /// At the surface this is a recoverable no-op. Below it, the level above
    /// must exist in storage: the player can only have arrived by descending
    /// through it, so a missing snapshot is a broken engine state.
    pub(crate) fn ascend(&mut self) -> ThicketResult<()> {
        if self.tile_underfoot() != Some(TileKind::StairsUp) {
            self.log.push("There are no stairs up here.");
            return Ok(());
        }
        if self.depth == 0 {
            self.log.push("You are already at the surface.");
            return Ok(());
        }

        self.store_level(&depth_key(self.depth))?;
        let above = self.depth - 1;

        let snapshot = self.load_level(&depth_key(above))?.ok_or_else(|| {
            ThicketError::InvalidState(format!("no stored level at depth {}", above))
        })?;
        self.restore_snapshot(snapshot);
        // Entering from below, so the player stands on the down-stairs.
        if let Some(pos) = self.grid.find_tile(TileKind::StairsDown) {
            self.player.pos = pos;
        }

        log::info!("ascended to depth {}", above);
        self.log.push("You climb up the stairs.");
        Ok(())
    }

    /// Generates the level for `depth` and moves the player into it.
    fn generate_depth(&mut self, depth: u32) -> ThicketResult<()> {
        let level_seed = self.seed.wrapping_add(depth as u64 * 1000);
        let mut rng = StdRng::seed_from_u64(level_seed);
        let config = GenerationConfig::new(level_seed);

        self.grid = generation::generate(MapKind::Tunnels, &config, &mut rng)?;
        self.depth = depth;
        self.map_kind = MapKind::Tunnels;
        self.rng = rng;
        self.player.pos = self
            .grid
            .find_tile(TileKind::StairsUp)
            .unwrap_or_else(|| Position::new(1, 1));
        self.populate(PopulationConfig::default());
        Ok(())
    }

    /// Drops every stored depth level. Named saves are kept; they belong to
    /// the player, not to the run being abandoned.
    pub(crate) fn clear_depth_levels(&mut self) -> ThicketResult<()> {
        for key in self.storage.keys()? {
            if key.starts_with(DEPTH_KEY_PREFIX) {
                self.storage.remove(&key)?;
            }
        }
        Ok(())
    }

    fn tile_underfoot(&self) -> Option<TileKind> {
        self.grid.get(self.player.pos).map(|t| t.kind)
    }

    /// Stores the current level under a player-chosen name.
    pub fn save_as(&mut self, name: &str) -> ThicketResult<()> {
        let json = serde_json::to_string(&self.current_snapshot())?;
        self.storage.put(&save_key(name), json)?;
        log::info!("saved level as {:?}", name);
        Ok(())
    }

    /// Restores a level stored with [`save_as`](Self::save_as).
    pub fn load_saved(&mut self, name: &str) -> ThicketResult<()> {
        let snapshot = self.load_level(&save_key(name))?.ok_or_else(|| {
            ThicketError::InvalidState(format!("no saved level named {:?}", name))
        })?;
        self.restore_snapshot(snapshot);
        self.refresh_fov();
        Ok(())
    }

    /// Names of all levels stored with [`save_as`](Self::save_as).
    pub fn saved_names(&self) -> ThicketResult<Vec<String>> {
        let mut names: Vec<String> = self
            .storage
            .keys()?
            .into_iter()
            .filter_map(|key| key.strip_prefix(SAVE_KEY_PREFIX).map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn delete_saved(&mut self, name: &str) -> ThicketResult<()> {
        self.storage.remove(&save_key(name))
    }
}

fn depth_key(depth: u32) -> String {
    format!("{}{}", DEPTH_KEY_PREFIX, depth)
}

fn save_key(name: &str) -> String {
    format!("{}{}", SAVE_KEY_PREFIX, name)
}
