/// Bevy integration: the streaming plugin and the entity-backed materializer
pub mod materializer;
pub mod plugin;

// Re-export commonly used items
pub use materializer::TerrainChunk;
pub use plugin::{LandscapePlugin, LandscapeRoot, LandscapeSet, LandscapeViewer};
