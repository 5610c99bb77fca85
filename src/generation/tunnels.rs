//! # Tunnels Generation
//!
//! Room-and-corridor dungeons: place non-overlapping rectangular rooms, carve
//! them to floor, then connect consecutive rooms with corridors that walk
//! toward the target in randomly-axis-switching straight segments.

use crate::generation::{GenerationConfig, MapGenerator};
use crate::world::{Grid, Position, TileKind};
use crate::ThicketResult;
use rand::rngs::StdRng;
use rand::Rng;

/// A rectangular room, tracked during generation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Room {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl Room {
    fn center(&self) -> Position {
        Position::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Whether two rooms come closer than `spacing` tiles to each other.
    fn overlaps(&self, other: &Room, spacing: i32) -> bool {
        self.x < other.x + other.width + spacing
            && self.x + self.width + spacing > other.x
            && self.y < other.y + other.height + spacing
            && self.y + self.height + spacing > other.y
    }

    fn floor_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();
        for x in self.x..self.x + self.width {
            for y in self.y..self.y + self.height {
                positions.push(Position::new(x, y));
            }
        }
        positions
    }
}

/// Room-and-corridor dungeon generator.
#[derive(Debug, Clone, Default)]
pub struct TunnelsGenerator;

impl TunnelsGenerator {
    fn random_room_dims(config: &GenerationConfig, rng: &mut StdRng) -> (i32, i32) {
        (
            rng.gen_range(config.min_room_size..=config.max_room_size) as i32,
            rng.gen_range(config.min_room_size..=config.max_room_size) as i32,
        )
    }

    /// Places the room list. The first room anchors at (1,1) so the spawn
    /// corner is always carved; the rest land at random interior positions
    /// rejected against overlap. A room that cannot be placed within the
    /// attempt budget is skipped with a warning.
    fn place_rooms(config: &GenerationConfig, rng: &mut StdRng) -> Vec<Room> {
        let room_count = rng.gen_range(config.min_rooms..=config.max_rooms);
        let mut rooms = Vec::with_capacity(room_count as usize);

        let (width, height) = Self::random_room_dims(config, rng);
        rooms.push(Room {
            x: 1,
            y: 1,
            width,
            height,
        });

        for placed in 1..room_count {
            let mut attempts = 0;
            let room = loop {
                let (width, height) = Self::random_room_dims(config, rng);
                let candidate = Room {
                    x: rng.gen_range(1..config.width as i32 - config.max_room_size as i32 - 1),
                    y: rng.gen_range(1..config.height as i32 - config.max_room_size as i32 - 1),
                    width,
                    height,
                };
                attempts += 1;
                let spacing = config.room_spacing as i32;
                if !rooms.iter().any(|r| r.overlaps(&candidate, spacing)) {
                    break Some(candidate);
                }
                if attempts >= config.max_placement_attempts {
                    break None;
                }
            };

            match room {
                Some(room) => rooms.push(room),
                None => {
                    log::warn!(
                        "could not place all rooms, continuing with {} of {}",
                        placed,
                        room_count
                    );
                    break;
                }
            }
        }

        rooms
    }

    /// Carves a corridor from one room center to another by walking straight
    /// segments of random length, switching axis after each segment. Each step
    /// moves one tile toward the target on the active axis, so the walk
    /// terminates.
    fn carve_corridor(
        grid: &mut Grid,
        start: Position,
        end: Position,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) {
        let mut x = start.x;
        let mut y = start.y;
        let mut horizontal = rng.gen_bool(0.5);
        let half_width = (config.corridor_width / 2) as i32;

        while x != end.x || y != end.y {
            let straight = rng.gen_range(1..=config.max_straight_corridor);

            for _ in 0..straight {
                if horizontal {
                    if x < end.x {
                        x += 1;
                    } else if x > end.x {
                        x -= 1;
                    } else {
                        break;
                    }
                } else if y < end.y {
                    y += 1;
                } else if y > end.y {
                    y -= 1;
                } else {
                    break;
                }

                for dx in -half_width..=half_width {
                    for dy in -half_width..=half_width {
                        grid.set_kind(Position::new(x + dx, y + dy), TileKind::Floor);
                    }
                }

                if x == end.x && y == end.y {
                    break;
                }
            }

            horizontal = !horizontal;
        }
    }

    /// Places up-stairs in the first room and down-stairs in the last. In the
    /// single-room degenerate case both stairs share the room, so the
    /// down-stairs must not land on the up-stairs cell.
    fn add_stairs(grid: &mut Grid, rooms: &[Room], rng: &mut StdRng) {
        let (Some(first), Some(last)) = (rooms.first(), rooms.last()) else {
            return;
        };

        let up_cells = first.floor_positions();
        let up = up_cells[rng.gen_range(0..up_cells.len())];
        grid.set_kind(up, TileKind::StairsUp);

        let mut down_cells = last.floor_positions();
        down_cells.retain(|&pos| pos != up);
        if down_cells.is_empty() {
            log::warn!("no free cell for down-stairs, level has no way down");
            return;
        }
        let down = down_cells[rng.gen_range(0..down_cells.len())];
        grid.set_kind(down, TileKind::StairsDown);
    }
}

impl MapGenerator for TunnelsGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> ThicketResult<Grid> {
        let mut grid = Grid::filled(config.width, config.height, TileKind::Wall);
        grid.seal_border();

        let rooms = Self::place_rooms(config, rng);

        for room in &rooms {
            for pos in room.floor_positions() {
                grid.set_kind(pos, TileKind::Floor);
            }
        }

        for pair in rooms.windows(2) {
            Self::carve_corridor(&mut grid, pair[0].center(), pair[1].center(), config, rng);
        }

        grid.seal_border();
        Self::add_stairs(&mut grid, &rooms, rng);

        self.validate(&grid)?;
        Ok(grid)
    }

    fn generator_type(&self) -> &'static str {
        "TunnelsGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::{HashSet, VecDeque};

    fn generate_tunnels(seed: u64) -> Grid {
        let config = GenerationConfig::for_testing(seed);
        let mut rng = StdRng::seed_from_u64(seed);
        TunnelsGenerator.generate(&config, &mut rng).unwrap()
    }

    /// Flood fill over walkable cells with 8-connectivity.
    fn reachable_from(grid: &Grid, start: Position) -> HashSet<Position> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(pos) = queue.pop_front() {
            for nb in pos.adjacent_positions() {
                if !visited.contains(&nb) && !grid.is_blocking(nb) {
                    visited.insert(nb);
                    queue.push_back(nb);
                }
            }
        }
        visited
    }

    #[test]
    fn test_border_is_wall() {
        let grid = generate_tunnels(17);
        for x in 0..grid.width as i32 {
            assert!(grid.is_blocking(Position::new(x, 0)));
            assert!(grid.is_blocking(Position::new(x, grid.height as i32 - 1)));
        }
        for y in 0..grid.height as i32 {
            assert!(grid.is_blocking(Position::new(0, y)));
            assert!(grid.is_blocking(Position::new(grid.width as i32 - 1, y)));
        }
    }

    #[test]
    fn test_all_floor_connected() {
        // Rooms are chained with corridors, so every walkable cell must be
        // reachable from the first room.
        for seed in [1, 2, 3, 4, 5] {
            let grid = generate_tunnels(seed);
            let start = grid
                .cells()
                .find(|(_, tile)| tile.kind.walkable())
                .map(|(pos, _)| pos)
                .unwrap();
            let reachable = reachable_from(&grid, start);

            let walkable_total = grid.tiles().filter(|t| t.kind.walkable()).count();
            assert_eq!(
                reachable.len(),
                walkable_total,
                "disconnected tunnels map for seed {}",
                seed
            );
        }
    }

    #[test]
    fn test_stairs_present() {
        let grid = generate_tunnels(99);
        assert!(grid.find_tile(TileKind::StairsUp).is_some());
        assert!(grid.find_tile(TileKind::StairsDown).is_some());
    }

    #[test]
    fn test_first_room_anchored_at_corner() {
        let grid = generate_tunnels(5);
        // The first room starts at (1,1), so that cell is always walkable
        // (floor or the up-stairs).
        assert!(!grid.is_blocking(Position::new(1, 1)));
    }

    #[test]
    fn test_room_overlap_spacing() {
        let a = Room {
            x: 1,
            y: 1,
            width: 4,
            height: 4,
        };
        // Touching with one tile between them violates spacing 1.
        let b = Room {
            x: 6,
            y: 1,
            width: 4,
            height: 4,
        };
        assert!(a.overlaps(&b, 1));
        let c = Room {
            x: 7,
            y: 1,
            width: 4,
            height: 4,
        };
        assert!(!a.overlaps(&c, 1));
    }

    #[test]
    fn test_single_room_keeps_both_stairs() {
        // With one room the stairs share it; the down-stairs must never
        // overwrite the up-stairs cell.
        let room = Room {
            x: 1,
            y: 1,
            width: 3,
            height: 3,
        };
        for seed in 0..50 {
            let mut grid = Grid::filled(10, 10, TileKind::Wall);
            for pos in room.floor_positions() {
                grid.set_kind(pos, TileKind::Floor);
            }
            let mut rng = StdRng::seed_from_u64(seed);
            TunnelsGenerator::add_stairs(&mut grid, &[room], &mut rng);

            assert_eq!(grid.count_kind(TileKind::StairsUp), 1, "seed {}", seed);
            assert_eq!(grid.count_kind(TileKind::StairsDown), 1, "seed {}", seed);
        }
    }

    #[test]
    fn test_corridor_walk_terminates_and_carves_endpoints() {
        let config = GenerationConfig::for_testing(12);
        let mut rng = StdRng::seed_from_u64(12);
        let mut grid = Grid::filled(config.width, config.height, TileKind::Wall);

        let start = Position::new(3, 3);
        let end = Position::new(30, 15);
        TunnelsGenerator::carve_corridor(&mut grid, start, end, &config, &mut rng);

        assert_eq!(grid.get(end).unwrap().kind, TileKind::Floor);
        // The walk leaves the start cell itself to the room carving.
        assert!(grid.tiles().filter(|t| t.kind == TileKind::Floor).count() > 20);
    }
}
