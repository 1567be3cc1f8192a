/// Chunk streaming core: grid math, mesh synthesis, the background worker
/// and the per-tick reconciliation that ties them together.
pub mod collaborators;
pub mod coords;
pub mod enumerate;
pub mod landscape;
pub mod lifecycle;
pub mod mesh;
pub mod pool;
pub mod worker;

// Re-export commonly used items
pub use collaborators::{ChunkMaterializer, ReferenceSource};
pub use coords::ChunkCoord;
pub use landscape::{Landscape, TickReport};
pub use mesh::{ChunkMeshData, GenerationRequest, NoiseSampler};
