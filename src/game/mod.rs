//! # Game Module
//!
//! The engine core: `WorldState` owns the level, its populations, and the
//! message log, and advances one turn per player intent. Callers never mutate
//! the world directly; they submit a `PlayerIntent` and read back the
//! `TurnSnapshot` the turn produced.

pub mod levels;

pub use levels::{LevelSnapshot, LevelStorage, MemoryLevelStorage};

use crate::actors::{self, take_turn, Actor, PopulationConfig};
use crate::fov::compute_fov;
use crate::generation::{self, GenerationConfig, MapKind};
use crate::items::{self, drop_at, pick_up_at, Carrier, Item};
use crate::pathfinding::OccupancyGrid;
use crate::world::{Direction, Grid, Position, TileKind};
use crate::ThicketResult;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;

/// The player's own state. Items the player holds live in the item list,
/// tagged with [`Carrier::Player`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Player {
    pub pos: Position,
    /// Set when a chasing actor collides with the player.
    pub is_caught: bool,
}

/// One action the player can take per turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerIntent {
    Move(Direction),
    Wait,
    Descend,
    Ascend,
    PickUp,
    Drop,
    ToggleRevealAll,
    NewMap(MapKind),
}

/// Turn-buffered message log.
///
/// Messages raised during a turn accumulate in a pending buffer and move into
/// the history when the turn ends, so a turn's messages land together.
/// History is ordered most recent first and capped.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    pending: Vec<String>,
    history: VecDeque<String>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a message for the current turn.
    pub fn push(&mut self, message: impl Into<String>) {
        self.pending.push(message.into());
    }

    /// Moves the pending buffer into history, newest first.
    pub fn flush(&mut self) {
        for message in self.pending.drain(..) {
            self.history.push_front(message);
        }
        self.history.truncate(crate::config::LOG_HISTORY_CAP);
    }

    /// The most recent `count` messages, newest first.
    pub fn recent(&self, count: usize) -> Vec<String> {
        self.history.iter().take(count).cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.history.is_empty()
    }
}

/// Everything a renderer needs after a turn, cloned out of the world.
///
/// The engine never pushes state at callers; they pull a snapshot per turn
/// and keep it as long as they like.
#[derive(Debug, Clone)]
pub struct TurnSnapshot {
    pub grid: Grid,
    pub actors: Vec<Actor>,
    pub items: Vec<Item>,
    pub player_position: Position,
    pub depth: u32,
    pub turn_count: u64,
    pub recent_messages: Vec<String>,
}

/// The live world: level terrain, populations, player, and log.
pub struct WorldState {
    pub grid: Grid,
    pub actors: Vec<Actor>,
    pub items: Vec<Item>,
    pub player: Player,
    pub depth: u32,
    pub turn: u64,
    pub map_kind: MapKind,
    pub reveal_all: bool,
    seed: u64,
    rng: StdRng,
    log: MessageLog,
    storage: Box<dyn LevelStorage>,
}

impl WorldState {
    /// Builds a fresh surface level of the given kind.
    pub fn new(kind: MapKind, seed: u64, storage: Box<dyn LevelStorage>) -> ThicketResult<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let config = GenerationConfig::new(seed);
        let grid = generation::generate(kind, &config, &mut rng)?;

        let mut state = Self {
            grid,
            actors: Vec::new(),
            items: Vec::new(),
            player: Player {
                pos: Position::new(1, 1),
                is_caught: false,
            },
            depth: 0,
            turn: 0,
            map_kind: kind,
            reveal_all: false,
            seed,
            rng,
            log: MessageLog::new(),
            storage,
        };

        state.player.pos = state.spawn_position();
        state.populate(PopulationConfig::default());
        state.refresh_fov();
        state.log.push("You step into the unknown.");
        state.log.flush();
        Ok(state)
    }

    /// Convenience constructor backed by in-memory storage.
    pub fn with_memory_storage(kind: MapKind, seed: u64) -> ThicketResult<Self> {
        Self::new(kind, seed, Box::new(MemoryLevelStorage::new()))
    }

    /// Where the player enters this level: the up-stairs when the level has
    /// one, the spawn corner otherwise.
    fn spawn_position(&self) -> Position {
        self.grid
            .find_tile(TileKind::StairsUp)
            .unwrap_or_else(|| Position::new(1, 1))
    }

    /// Fills the level with its populations. Passers-by only cross forests.
    fn populate(&mut self, config: PopulationConfig) {
        let avoid = [self.player.pos];
        self.actors = actors::spawn_wanderers(&self.grid, config.npc_count, &avoid, &mut self.rng);
        if self.map_kind == MapKind::Forest {
            self.actors.extend(actors::spawn_passers(
                &self.grid,
                config.passer_count,
                &mut self.rng,
            ));
        }
        self.items = items::populate_items(&self.grid, config.item_count, &mut self.rng);
    }

    fn refresh_fov(&mut self) {
        compute_fov(
            &mut self.grid,
            self.player.pos,
            crate::config::FOV_RADIUS,
            self.reveal_all,
        );
    }

    /// Advances the world one turn.
    ///
    /// Fixed order: the player's action resolves first, then visibility, then
    /// every actor in list order, then the log flushes and the snapshot is
    /// taken. Intents that fail (walking into a wall, stairs that are not
    /// there) still consume the turn and leave their message.
    pub fn apply_intent(&mut self, intent: PlayerIntent) -> ThicketResult<TurnSnapshot> {
        match intent {
            PlayerIntent::Move(direction) => self.move_player(direction),
            PlayerIntent::Wait => {}
            PlayerIntent::Descend => self.descend()?,
            PlayerIntent::Ascend => self.ascend()?,
            PlayerIntent::PickUp => self.pick_up(),
            PlayerIntent::Drop => self.drop_item(),
            PlayerIntent::ToggleRevealAll => {
                self.reveal_all = !self.reveal_all;
                log::debug!("reveal_all set to {}", self.reveal_all);
            }
            PlayerIntent::NewMap(kind) => self.new_map(kind)?,
        }

        self.refresh_fov();
        self.run_actor_turns();

        self.turn += 1;
        self.log.flush();
        Ok(self.snapshot())
    }

    fn move_player(&mut self, direction: Direction) {
        let target = self.player.pos + direction.to_delta();

        if !self.grid.in_bounds(target) {
            self.log.push("You can't move there.");
            return;
        }
        if self.grid.is_blocking(target) {
            self.log.push("You bump into a wall.");
            return;
        }
        if let Some(actor) = self.actors.iter().find(|a| a.pos == target) {
            self.log.push(format!("The {} is in your way.", actor.race));
            return;
        }

        self.player.pos = target;
        self.log.push(format!("You move {}.", direction.name()));
    }

    fn pick_up(&mut self) {
        if self
            .items
            .iter()
            .any(|item| item.carried_by == Some(Carrier::Player))
        {
            self.log.push("Your hands are full.");
            return;
        }
        match pick_up_at(&mut self.items, self.player.pos, Carrier::Player) {
            Some(name) => self.log.push(format!("You pick up the {}.", name)),
            None => self.log.push("There is nothing here to pick up."),
        }
    }

    fn drop_item(&mut self) {
        match drop_at(&mut self.items, self.player.pos, Carrier::Player) {
            Some(name) => self.log.push(format!("You drop the {}.", name)),
            None => self.log.push("You are not carrying anything."),
        }
    }

    /// Runs every actor's turn in list order. The occupancy grid is rebuilt
    /// per actor so each one routes around the moves made before it.
    fn run_actor_turns(&mut self) {
        let mut despawned = Vec::new();

        for index in 0..self.actors.len() {
            let occupied: Vec<Position> = std::iter::once(self.player.pos)
                .chain(
                    self.actors
                        .iter()
                        .enumerate()
                        .filter(|&(i, _)| i != index && !despawned.contains(&i))
                        .map(|(_, a)| a.pos),
                )
                .collect();
            let occupancy = OccupancyGrid::new(&self.grid, occupied);

            let turn = take_turn(
                &mut self.actors[index],
                &self.grid,
                &occupancy,
                self.player.pos,
                &mut self.rng,
            );

            if turn.caught_player {
                self.player.is_caught = true;
            }
            for message in turn.messages {
                self.log.push(message);
            }
            if turn.despawned {
                despawned.push(index);
            }
        }

        if !despawned.is_empty() {
            let mut index = 0;
            self.actors.retain(|_| {
                let keep = !despawned.contains(&index);
                index += 1;
                keep
            });
        }
    }

    fn snapshot(&self) -> TurnSnapshot {
        TurnSnapshot {
            grid: self.grid.clone(),
            actors: self.actors.clone(),
            items: self.items.clone(),
            player_position: self.player.pos,
            depth: self.depth,
            turn_count: self.turn,
            recent_messages: self.log.recent(10),
        }
    }

    /// Discards the run and starts over on a fresh map of `kind`.
    ///
    /// Depth levels belong to the abandoned run, so they are dropped from
    /// storage. Named saves survive.
    fn new_map(&mut self, kind: MapKind) -> ThicketResult<()> {
        self.clear_depth_levels()?;
        self.seed = self.seed.wrapping_add(self.turn + 1);
        self.rng = StdRng::seed_from_u64(self.seed);
        self.map_kind = kind;
        self.depth = 0;

        let config = GenerationConfig::new(self.seed);
        self.grid = generation::generate(kind, &config, &mut self.rng)?;
        self.player.pos = self.spawn_position();
        self.player.is_caught = false;
        self.populate(PopulationConfig::default());
        self.log.push("A new world takes shape around you.");
        Ok(())
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world(kind: MapKind, seed: u64) -> WorldState {
        WorldState::with_memory_storage(kind, seed).unwrap()
    }

    #[test]
    fn test_new_world_is_playable() {
        let state = world(MapKind::Tunnels, 42);
        assert!(!state.grid.is_blocking(state.player.pos));
        assert_eq!(state.actors.len() as u32, crate::config::NPC_COUNT);
        assert_eq!(state.items.len() as u32, crate::config::ITEM_COUNT);
        assert_eq!(state.depth, 0);
    }

    #[test]
    fn test_forest_gets_passers() {
        let state = world(MapKind::Forest, 42);
        let passers = state
            .actors
            .iter()
            .filter(|a| matches!(a.behaviour, crate::actors::Behaviour::Passing { .. }))
            .count();
        assert_eq!(passers as u32, crate::config::PASSER_COUNT);
    }

    #[test]
    fn test_wait_advances_turn_and_snapshots() {
        let mut state = world(MapKind::Cave, 7);
        let snapshot = state.apply_intent(PlayerIntent::Wait).unwrap();
        assert_eq!(snapshot.turn_count, 1);
        assert_eq!(snapshot.player_position, state.player.pos);
    }

    #[test]
    fn test_move_off_map_leaves_message() {
        let mut state = world(MapKind::Forest, 3);
        // Forests have open edges; walk the player onto the west rim first.
        state.player.pos = Position::new(0, 5);
        if state.grid.is_blocking(state.player.pos) {
            state.grid.set_kind(state.player.pos, TileKind::Soil);
        }

        let snapshot = state.apply_intent(PlayerIntent::Move(Direction::West)).unwrap();
        assert_eq!(snapshot.player_position, Position::new(0, 5));
        assert!(snapshot
            .recent_messages
            .iter()
            .any(|m| m == "You can't move there."));
    }

    #[test]
    fn test_move_into_wall_leaves_message() {
        let mut state = world(MapKind::Tunnels, 5);
        state.player.pos = Position::new(1, 1);
        state.actors.clear();

        let snapshot = state.apply_intent(PlayerIntent::Move(Direction::West)).unwrap();
        assert_eq!(snapshot.player_position, Position::new(1, 1));
        assert!(snapshot
            .recent_messages
            .iter()
            .any(|m| m == "You bump into a wall."));
    }

    #[test]
    fn test_toggle_reveal_all() {
        let mut state = world(MapKind::Cave, 9);
        let snapshot = state.apply_intent(PlayerIntent::ToggleRevealAll).unwrap();
        assert!(snapshot.grid.tiles().all(|t| t.visible));

        let snapshot = state.apply_intent(PlayerIntent::ToggleRevealAll).unwrap();
        assert!(snapshot.grid.tiles().any(|t| !t.visible));
    }

    #[test]
    fn test_pick_up_and_drop() {
        let mut state = world(MapKind::Tunnels, 11);
        state.actors.clear();
        let item_pos = state.items[0].pos;
        state.player.pos = item_pos;

        let snapshot = state.apply_intent(PlayerIntent::PickUp).unwrap();
        assert!(snapshot
            .recent_messages
            .iter()
            .any(|m| m == "You pick up the trinket."));

        let snapshot = state.apply_intent(PlayerIntent::PickUp).unwrap();
        assert!(snapshot.recent_messages.iter().any(|m| {
            m == "There is nothing here to pick up." || m == "Your hands are full."
        }));

        let snapshot = state.apply_intent(PlayerIntent::Drop).unwrap();
        assert!(snapshot
            .recent_messages
            .iter()
            .any(|m| m == "You drop the trinket."));
        assert!(state.items.iter().any(|i| i.pos == item_pos && i.on_ground()));
    }

    #[test]
    fn test_new_map_resets_run() {
        let mut state = world(MapKind::Cave, 13);
        state.apply_intent(PlayerIntent::Wait).unwrap();

        let snapshot = state
            .apply_intent(PlayerIntent::NewMap(MapKind::Forest))
            .unwrap();
        assert_eq!(state.map_kind, MapKind::Forest);
        assert_eq!(snapshot.depth, 0);
        assert!(!state.grid.is_blocking(state.player.pos));
    }

    #[test]
    fn test_message_log_orders_newest_first() {
        let mut log = MessageLog::new();
        log.push("first");
        log.push("second");
        log.flush();
        log.push("third");
        log.flush();

        assert_eq!(log.recent(3), vec!["third", "second", "first"]);
    }

    #[test]
    fn test_message_log_caps_history() {
        let mut log = MessageLog::new();
        for i in 0..(crate::config::LOG_HISTORY_CAP + 50) {
            log.push(format!("message {}", i));
        }
        log.flush();
        assert_eq!(
            log.recent(usize::MAX).len(),
            crate::config::LOG_HISTORY_CAP
        );
    }

    #[test]
    fn test_turn_count_monotonic() {
        let mut state = world(MapKind::Tunnels, 21);
        for expected in 1..=5 {
            let snapshot = state.apply_intent(PlayerIntent::Wait).unwrap();
            assert_eq!(snapshot.turn_count, expected);
        }
    }
}
