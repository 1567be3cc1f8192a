//! Height-field mesh synthesis.
//!
//! Runs on the background worker, so everything here is pure: the only inputs
//! are the request and the noise function, and the only outputs are the
//! buffers handed in.

use bevy::prelude::*;
use noise::NoiseFn;

use super::coords::ChunkCoord;
use crate::core::constants::mesh::{PLACEHOLDER_TANGENT, UV_UNITS_PER_WORLD_UNIT, VERTEX_COLOR};

/// Coherent 2D noise in roughly [-1, 1], deterministic for identical inputs.
pub trait NoiseSampler: Send + Sync {
    fn sample_2d(&self, x: f32, y: f32) -> f32;
}

impl<T> NoiseSampler for T
where
    T: NoiseFn<f64, 2> + Send + Sync,
{
    fn sample_2d(&self, x: f32, y: f32) -> f32 {
        self.get([x as f64, y as f64]) as f32
    }
}

/// Everything the worker needs to build one chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationRequest {
    pub coord: ChunkCoord,
    /// Quads per chunk edge
    pub resolution: u32,
    pub chunk_size: f32,
    pub horizontal_noise_scale: f32,
    pub vertical_scale: f32,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            coord: ChunkCoord::new(0, 0),
            resolution: 1,
            chunk_size: 1.0,
            horizontal_noise_scale: 1.0,
            vertical_scale: 1.0,
        }
    }
}

/// Generated geometry for one chunk, in chunk-local space.
///
/// All vertex attribute vectors are indexed identically.
#[derive(Clone, Debug, Default)]
pub struct ChunkMeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub colors: Vec<[f32; 4]>,
    pub tangents: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

impl ChunkMeshData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty every buffer but keep the allocations.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.uvs.clear();
        self.colors.clear();
        self.tangents.clear();
        self.indices.clear();
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn reserve_exact_for(&mut self, vertex_count: usize, index_count: usize) {
        self.positions.reserve_exact(vertex_count);
        self.normals.reserve_exact(vertex_count);
        self.uvs.reserve_exact(vertex_count);
        self.colors.reserve_exact(vertex_count);
        self.tangents.reserve_exact(vertex_count);
        self.indices.reserve_exact(index_count);
    }
}

/// Elevation samples for a chunk plus a one-sample border on every side.
///
/// The border lets edge vertices use central differences for their normals,
/// so neighbouring chunks agree on shading along shared edges.
#[derive(Debug, Default)]
pub struct HeightScratch {
    heights: Vec<f32>,
    width: usize,
}

impl HeightScratch {
    pub fn new() -> Self {
        Self::default()
    }

    fn fill<N: NoiseSampler + ?Sized>(&mut self, request: &GenerationRequest, noise: &N) {
        let resolution = request.resolution as i32;
        let step = request.chunk_size / request.resolution as f32;
        let inverse_noise_scale = 1.0 / request.horizontal_noise_scale;
        let min_corner = request.coord.min_corner(request.chunk_size);

        self.width = request.resolution as usize + 3;
        self.heights.clear();
        self.heights.reserve(self.width * self.width);

        for z in -1..=resolution + 1 {
            let noise_z = (min_corner.y + z as f32 * step) * inverse_noise_scale;
            for x in -1..=resolution + 1 {
                let noise_x = (min_corner.x + x as f32 * step) * inverse_noise_scale;
                self.heights.push(request.vertical_scale * noise.sample_2d(noise_x, noise_z));
            }
        }
    }

    /// Height at lattice point `(x, z)`, where `-1 ..= resolution + 1` is valid.
    fn at(&self, x: i32, z: i32) -> f32 {
        self.heights[(x + 1) as usize + (z + 1) as usize * self.width]
    }
}

/// Build a chunk mesh into fresh buffers.
pub fn synthesize<N: NoiseSampler + ?Sized>(request: &GenerationRequest, noise: &N) -> ChunkMeshData {
    let mut mesh = ChunkMeshData::new();
    synthesize_into(request, noise, &mut HeightScratch::new(), &mut mesh);
    mesh
}

/// Build a chunk mesh, reusing `scratch` and `mesh` allocations.
pub fn synthesize_into<N: NoiseSampler + ?Sized>(
    request: &GenerationRequest,
    noise: &N,
    scratch: &mut HeightScratch,
    mesh: &mut ChunkMeshData,
) {
    debug_assert!(request.resolution >= 1, "resolution 0 must be rejected by settings validation");

    let resolution = request.resolution;
    let chunk_size = request.chunk_size;
    let step = chunk_size / resolution as f32;
    let inverse_step = resolution as f32 / chunk_size;
    let min_corner = request.coord.min_corner(chunk_size);
    let min_corner_uv = min_corner * UV_UNITS_PER_WORLD_UNIT;
    let uv_step = UV_UNITS_PER_WORLD_UNIT * step;

    scratch.fill(request, noise);

    let row = resolution as usize + 1;
    mesh.clear();
    mesh.reserve_exact_for(row * row, resolution as usize * resolution as usize * 6);

    let res = resolution as i32;
    for z in 0..=res {
        let v = min_corner_uv.y + z as f32 * uv_step;
        for x in 0..=res {
            let u = min_corner_uv.x + x as f32 * uv_step;
            let height = scratch.at(x, z);

            // Cheap finite-difference normal; the 2.0 is the span of the central difference
            let normal = Vec3::new(
                (scratch.at(x - 1, z) - scratch.at(x + 1, z)) * inverse_step,
                2.0,
                (scratch.at(x, z - 1) - scratch.at(x, z + 1)) * inverse_step,
            )
            .normalize();

            mesh.positions.push([x as f32 * step, height, z as f32 * step]);
            mesh.normals.push(normal.to_array());
            mesh.uvs.push([u, v]);
            mesh.colors.push(VERTEX_COLOR);
            mesh.tangents.push(PLACEHOLDER_TANGENT);
        }
    }

    let row = row as u32;
    for z in 0..resolution {
        for x in 0..resolution {
            let i = z * row + x;
            let i_next_row = i + row;

            // Counter-clockwise seen from above
            mesh.indices.extend_from_slice(&[
                i, i_next_row, i + 1,
                i + 1, i_next_row, i_next_row + 1,
            ]);
        }
    }
}
