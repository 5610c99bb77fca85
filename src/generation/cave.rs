//! # Cave Generation
//!
//! Cellular-automaton caves: seed the grid with random walls, smooth it with a
//! birth/death rule, then guarantee a spawn pocket. Caves may come out
//! disconnected; the automaton makes no connectivity promise.

use crate::generation::{place_stairs_down, GenerationConfig, MapGenerator};
use crate::world::{Grid, Position, TileKind};
use crate::ThicketResult;
use rand::rngs::StdRng;
use rand::Rng;

/// Cave generator using a cellular automaton.
#[derive(Debug, Clone, Default)]
pub struct CaveGenerator;

impl CaveGenerator {
    /// Counts wall neighbors in the 8-neighborhood, treating off-grid cells
    /// as wall so the automaton leans solid toward the edges.
    fn count_wall_neighbours(grid: &Grid, pos: Position) -> u32 {
        let mut count = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nb = Position::new(pos.x + dx, pos.y + dy);
                match grid.get(nb) {
                    Some(tile) if tile.kind == TileKind::Wall => count += 1,
                    Some(_) => {}
                    None => count += 1,
                }
            }
        }
        count
    }

    /// One automaton step over a copy of the grid.
    fn simulation_step(grid: &Grid, config: &GenerationConfig) -> Grid {
        let mut next = grid.clone();
        for x in 0..grid.width as i32 {
            for y in 0..grid.height as i32 {
                let pos = Position::new(x, y);
                let neighbours = Self::count_wall_neighbours(grid, pos);
                let is_wall = grid.get(pos).map_or(true, |t| t.kind == TileKind::Wall);

                let new_kind = if is_wall {
                    if neighbours < config.cave_death_limit {
                        TileKind::Floor
                    } else {
                        TileKind::Wall
                    }
                } else if neighbours > config.cave_birth_limit {
                    TileKind::Wall
                } else {
                    TileKind::Floor
                };
                next.set_kind(pos, new_kind);
            }
        }
        next
    }
}

impl MapGenerator for CaveGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> ThicketResult<Grid> {
        // Seed: wall with probability 2/5.
        let mut grid = Grid::filled(config.width, config.height, TileKind::Floor);
        for tile in grid.tiles_mut() {
            if rng.gen_range(1..=5) > 3 {
                tile.kind = TileKind::Wall;
            }
        }
        grid.seal_border();

        for _ in 0..config.cave_steps {
            grid = Self::simulation_step(&grid, config);
        }
        grid.seal_border();

        // Spawn pocket: the player must never start inside rock.
        for x in 1..4 {
            for y in 1..4 {
                grid.set_kind(Position::new(x, y), TileKind::Floor);
            }
        }

        let spawn = Position::new(1, 1);
        grid.set_kind(spawn, TileKind::StairsUp);
        place_stairs_down(&mut grid, spawn, config.stairs_min_distance, rng)?;

        self.validate(&grid)?;
        Ok(grid)
    }

    fn generator_type(&self) -> &'static str {
        "CaveGenerator"
    }
}
