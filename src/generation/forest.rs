//! # Forest Generation
//!
//! Coherent-noise terrain: simplex noise classifies each cell as soil, grass,
//! or bush, then a sparse second pass grows trees on grass. Forest maps are
//! open at the edges, with no border wall.

use crate::generation::{place_stairs_down, GenerationConfig, MapGenerator};
use crate::world::{Grid, Position, TileKind};
use crate::ThicketResult;
use noise::{NoiseFn, Simplex};
use rand::rngs::StdRng;
use rand::Rng;

/// Noise-based forest generator.
#[derive(Debug, Clone, Default)]
pub struct ForestGenerator;

impl ForestGenerator {
    /// Classifies a noise sample into terrain.
    fn classify(value: f64, config: &GenerationConfig) -> TileKind {
        if value > config.bush_threshold {
            TileKind::Bush
        } else if value > config.grass_threshold {
            TileKind::Grass
        } else {
            TileKind::Soil
        }
    }

    /// Upgrades scattered grass cells to trees. A cell is skipped when any of
    /// its 8 neighbors already holds a tree, which keeps trees from clumping.
    fn grow_trees(grid: &mut Grid, config: &GenerationConfig, rng: &mut StdRng) {
        for y in 0..grid.height as i32 {
            for x in 0..grid.width as i32 {
                let pos = Position::new(x, y);
                if grid.get(pos).map_or(true, |t| t.kind != TileKind::Grass) {
                    continue;
                }
                if !rng.gen_bool(config.tree_chance) {
                    continue;
                }
                let has_tree_neighbour = pos
                    .adjacent_positions()
                    .iter()
                    .any(|&nb| grid.get(nb).map_or(false, |t| t.kind == TileKind::Tree));
                if !has_tree_neighbour {
                    grid.set_kind(pos, TileKind::Tree);
                }
            }
        }
    }
}

impl MapGenerator for ForestGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> ThicketResult<Grid> {
        let simplex = Simplex::new(rng.gen::<u32>());
        let mut grid = Grid::filled(config.width, config.height, TileKind::Soil);

        for y in 0..config.height as i32 {
            for x in 0..config.width as i32 {
                let value = simplex.get([
                    x as f64 * config.noise_scale,
                    y as f64 * config.noise_scale,
                ]);
                grid.set_kind(Position::new(x, y), Self::classify(value, config));
            }
        }

        Self::grow_trees(&mut grid, config, rng);

        // Playability guard: the spawn corner must stay walkable.
        let spawn = Position::new(1, 1);
        if grid.is_blocking(spawn) {
            grid.set_kind(spawn, TileKind::Soil);
        }

        place_stairs_down(&mut grid, spawn, config.stairs_min_distance, rng)?;

        self.validate(&grid)?;
        Ok(grid)
    }

    fn generator_type(&self) -> &'static str {
        "ForestGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn generate_forest(seed: u64) -> Grid {
        let config = GenerationConfig::for_testing(seed);
        let mut rng = StdRng::seed_from_u64(seed);
        ForestGenerator.generate(&config, &mut rng).unwrap()
    }

    #[test]
    fn test_terrain_vocabulary() {
        let grid = generate_forest(42);
        for tile in grid.tiles() {
            assert!(matches!(
                tile.kind,
                TileKind::Soil
                    | TileKind::Grass
                    | TileKind::Bush
                    | TileKind::Tree
                    | TileKind::StairsDown
            ));
        }
    }

    #[test]
    fn test_classify_thresholds() {
        let config = GenerationConfig::new(0);
        assert_eq!(ForestGenerator::classify(0.7, &config), TileKind::Bush);
        assert_eq!(ForestGenerator::classify(0.4, &config), TileKind::Grass);
        assert_eq!(ForestGenerator::classify(0.0, &config), TileKind::Soil);
        assert_eq!(ForestGenerator::classify(-0.5, &config), TileKind::Soil);
    }

    #[test]
    fn test_exactly_one_stairs_down_no_stairs_up() {
        let grid = generate_forest(7);
        assert_eq!(grid.count_kind(TileKind::StairsDown), 1);
        assert_eq!(grid.count_kind(TileKind::StairsUp), 0);
    }

    #[test]
    fn test_stairs_far_from_spawn() {
        let grid = generate_forest(19);
        let stairs = grid.find_tile(TileKind::StairsDown).unwrap();
        // Test maps are large enough that the distance constraint holds.
        assert!(Position::new(1, 1).euclidean_distance(stairs) >= 10.0);
    }

    #[test]
    fn test_trees_never_adjacent() {
        let grid = generate_forest(23);
        for (pos, tile) in grid.cells() {
            if tile.kind != TileKind::Tree {
                continue;
            }
            for nb in pos.adjacent_positions() {
                if let Some(t) = grid.get(nb) {
                    assert_ne!(t.kind, TileKind::Tree, "adjacent trees at {:?}", pos);
                }
            }
        }
    }

    #[test]
    fn test_spawn_walkable() {
        for seed in [1, 2, 3] {
            let grid = generate_forest(seed);
            assert!(!grid.is_blocking(Position::new(1, 1)));
        }
    }

    #[test]
    fn test_open_edges() {
        // Forests do not force a border wall; at least some edge cells are
        // open terrain on any reasonable seed.
        let grid = generate_forest(31);
        let open_edge_cells = (0..grid.width as i32)
            .filter(|&x| !grid.is_blocking(Position::new(x, 0)))
            .count();
        assert!(open_edge_cells > 0);
    }
}
