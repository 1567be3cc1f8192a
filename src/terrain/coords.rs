use bevy::prelude::*;

/// Integer position of a chunk on the uniform landscape grid (X/Z plane).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Footprint-center used for every radius and distance test.
    pub fn center(self, chunk_size: f32) -> Vec2 {
        Vec2::new(self.x as f32, self.z as f32) * chunk_size
    }

    /// Corner of the footprint with the smallest coordinates.
    ///
    /// Chunk geometry is generated in local space from this corner; the
    /// half-cell offset applies to noise sampling, UVs and placement alike.
    pub fn min_corner(self, chunk_size: f32) -> Vec2 {
        Vec2::new(self.x as f32 - 0.5, self.z as f32 - 0.5) * chunk_size
    }

    /// Chunk whose footprint-center is nearest to `point`.
    pub fn nearest(point: Vec2, chunk_size: f32) -> Self {
        Self {
            x: ((point.x + 0.5 * chunk_size) / chunk_size).floor() as i32,
            z: ((point.y + 0.5 * chunk_size) / chunk_size).floor() as i32,
        }
    }

    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// Squared distance from the footprint-center to `point`.
    pub fn distance_squared_to(self, point: Vec2, chunk_size: f32) -> f32 {
        self.center(chunk_size).distance_squared(point)
    }

    pub fn is_within(self, point: Vec2, radius: f32, chunk_size: f32) -> bool {
        self.distance_squared_to(point, chunk_size) <= radius * radius
    }
}

/// Project a world position onto the landscape plane.
pub fn ground_position(world: Vec3) -> Vec2 {
    Vec2::new(world.x, world.z)
}
