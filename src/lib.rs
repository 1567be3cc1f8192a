//! Streams procedurally generated heightfield terrain around a moving
//! viewpoint. Chunk meshes are synthesized from 2D noise on a background
//! thread and materialized by the host as the viewpoint moves.

pub mod core;
pub mod terrain;
pub mod world;

pub use crate::core::LandscapeSettings;
pub use terrain::{ChunkCoord, Landscape};
pub use world::LandscapePlugin;
