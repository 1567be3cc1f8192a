//! Chunk enumeration around a point.
//!
//! Chunks are visited in expanding square rings around the chunk nearest the
//! center, so the closest terrain is always requested first. Visit order for
//! the first ring (+x right, +z up):
//!
//! ```text
//!   6  3  7
//!   2  0  1
//!   8  4  5
//! ```
//!
//! A ring that contributes nothing ends the search. Distances are Euclidean
//! on a disk and the grid is uniform, so every larger ring is also outside.

use bevy::prelude::*;

use super::coords::ChunkCoord;

/// Fill `out` with every chunk whose footprint-center lies within `radius` of `center`.
///
/// `out` is cleared first; its allocation is reused across calls.
pub fn chunks_in_radius(center: Vec2, radius: f32, chunk_size: f32, out: &mut Vec<ChunkCoord>) {
    out.clear();

    if !center.is_finite() || !radius.is_finite() || radius <= 0.0 || !chunk_size.is_finite() || chunk_size <= 0.0 {
        return;
    }

    let radius_squared = radius * radius;
    let origin = ChunkCoord::nearest(center, chunk_size);

    let emit_if_in_radius = |dx: i32, dz: i32, out: &mut Vec<ChunkCoord>| -> bool {
        let coord = origin.offset(dx, dz);
        if coord.distance_squared_to(center, chunk_size) <= radius_squared {
            out.push(coord);
            true
        } else {
            false
        }
    };

    if !emit_if_in_radius(0, 0, out) {
        return;
    }

    for r in 1.. {
        let emitted_before = out.len();

        // Walk the four arms outward from their axis. `o` covers one side of
        // each arm, `o + 1` the other, so corners are visited exactly once.
        let mut o = 0;
        while o < r {
            let mut any = false;
            any |= emit_if_in_radius(r, o, out);
            any |= emit_if_in_radius(-r, -o, out);
            any |= emit_if_in_radius(-o, r, out);
            any |= emit_if_in_radius(o, -r, out);

            o += 1;

            any |= emit_if_in_radius(r, -o, out);
            any |= emit_if_in_radius(-r, o, out);
            any |= emit_if_in_radius(o, r, out);
            any |= emit_if_in_radius(-o, -r, out);

            // Each half-arm only gets farther from here on
            if !any {
                break;
            }
        }

        if out.len() == emitted_before {
            break;
        }
    }
}

/// Allocating convenience wrapper around [`chunks_in_radius`].
pub fn enumerate(center: Vec2, radius: f32, chunk_size: f32) -> Vec<ChunkCoord> {
    let mut out = Vec::new();
    chunks_in_radius(center, radius, chunk_size, &mut out);
    out
}
