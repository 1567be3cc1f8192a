//! Seams between the streaming core and the host engine.

use bevy::prelude::*;

use super::coords::ChunkCoord;
use super::mesh::ChunkMeshData;

/// Where the terrain should be streamed around this tick.
pub trait ReferenceSource {
    /// `None` means no viewpoint is available and the tick is skipped.
    fn reference_location(&self) -> Option<Vec3>;
}

impl ReferenceSource for Option<Vec3> {
    fn reference_location(&self) -> Option<Vec3> {
        *self
    }
}

impl ReferenceSource for Vec3 {
    fn reference_location(&self) -> Option<Vec3> {
        Some(*self)
    }
}

/// Turns generated geometry into live, renderable chunk objects.
///
/// Materializing happens in two phases so the host can finish configuring an
/// object before it is first shown. The streaming core only decides
/// placement; surface parameters such as the material are owned by the
/// materializer and applied in whichever phase suits it.
pub trait ChunkMaterializer {
    type Handle;

    /// Create a provisional object for `mesh`. The mesh buffers are borrowed
    /// and recycled after this call returns.
    fn begin_materialize(&mut self, coord: ChunkCoord, mesh: &ChunkMeshData) -> Self::Handle;

    /// Place the object at `transform` and make it ready for display.
    fn finish_materialize(&mut self, handle: Self::Handle, transform: Transform) -> Self::Handle;

    /// Tear down an object previously returned by [`Self::finish_materialize`].
    fn destroy(&mut self, handle: Self::Handle);
}
