//! # Field of View
//!
//! Ray-cast visibility from the player's position: 360 one-degree rays walked
//! outward in Euclidean steps. Rays can double-visit or skip cells at larger
//! radii, but two invariants always hold: `explored` is monotonic, and no
//! cell beyond an obscuring cell along a ray becomes visible from that ray.

use crate::world::{Grid, Position};

/// Recomputes visibility from `origin` out to `radius`, in place.
///
/// Clears `visible` on every tile, then casts rays. Each stepped cell is
/// marked visible and explored; a ray stops after marking the first cell that
/// obscures or blocks sight (the blocking cell itself is seen).
///
/// When `reveal_all` is set the cast is skipped entirely and every tile is
/// forced visible. That is the debug switch, not part of normal play.
pub fn compute_fov(grid: &mut Grid, origin: Position, radius: u32, reveal_all: bool) {
    if reveal_all {
        for tile in grid.tiles_mut() {
            tile.visible = true;
        }
        return;
    }

    for tile in grid.tiles_mut() {
        if tile.visible {
            tile.visible = false;
        }
    }

    let max_x = grid.width as i32 - 1;
    let max_y = grid.height as i32 - 1;

    for angle in 0..360 {
        let theta = (angle as f64).to_radians();
        let (sin, cos) = theta.sin_cos();

        for r in 0..=radius {
            let x = (origin.x as f64 + r as f64 * cos).round() as i32;
            let y = (origin.y as f64 + r as f64 * sin).round() as i32;
            let pos = Position::new(x.clamp(0, max_x), y.clamp(0, max_y));

            let mut stop = false;
            if let Some(tile) = grid.get_mut(pos) {
                tile.mark_seen();
                // Sight stops at the first obscuring cell, which is itself seen.
                stop = tile.kind.obscuring() || tile.kind.blocking();
            }
            if stop {
                break;
            }
        }
    }
}
