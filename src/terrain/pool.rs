use super::mesh::{ChunkMeshData, GenerationRequest};

/// One chunk's request together with the buffers its mesh is written into.
///
/// Units travel to the worker and back whole, so the mesh buffers can be
/// recycled instead of reallocated for every chunk.
#[derive(Debug, Default)]
pub struct WorkUnit {
    pub request: GenerationRequest,
    pub mesh: ChunkMeshData,
}

impl WorkUnit {
    pub fn new(request: GenerationRequest) -> Self {
        Self {
            request,
            mesh: ChunkMeshData::new(),
        }
    }
}

/// Stack of idle work units.
#[derive(Debug, Default)]
pub struct WorkUnitPool {
    idle: Vec<WorkUnit>,
    created: usize,
}

impl WorkUnitPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an idle unit if there is one, otherwise allocate.
    pub fn take(&mut self, request: GenerationRequest) -> WorkUnit {
        match self.idle.pop() {
            Some(mut unit) => {
                unit.request = request;
                unit
            }
            None => {
                self.created += 1;
                WorkUnit::new(request)
            }
        }
    }

    /// Hand a unit back. Its mesh is cleared; capacity is kept.
    pub fn put(&mut self, mut unit: WorkUnit) {
        unit.mesh.clear();
        self.idle.push(unit);
    }

    pub fn idle_len(&self) -> usize {
        self.idle.len()
    }

    /// Total units ever allocated by this pool.
    pub fn created(&self) -> usize {
        self.created
    }
}
