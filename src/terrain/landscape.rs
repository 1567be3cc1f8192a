//! Per-tick reconciliation of loaded terrain with the viewpoint.
//!
//! The steps run in a fixed order every tick:
//!
//! 1. resolve the reference point (no point, no work)
//! 2. evict loaded chunks beyond the unload radius
//! 3. enumerate chunks within the load radius
//! 4. request every enumerated chunk that is not already tracked
//! 5. drain finished meshes, discarding those now beyond the unload radius
//! 6. submit this tick's requests to the worker
//! 7. materialize and install the surviving meshes
//!
//! Evicting first keeps memory bounded and avoids generating chunks that are
//! about to be dropped. Draining before submitting means a result is always
//! checked against the newest reference point before it is installed.

use bevy::prelude::*;
use noise::Perlin;

use super::collaborators::{ChunkMaterializer, ReferenceSource};
use super::coords::{ground_position, ChunkCoord};
use super::enumerate::chunks_in_radius;
use super::lifecycle::ChunkStore;
use super::mesh::{GenerationRequest, NoiseSampler};
use super::pool::{WorkUnit, WorkUnitPool};
use super::worker::MeshWorker;
use crate::core::error::WorkerError;
use crate::core::settings::LandscapeSettings;

/// What a single tick changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub evicted: usize,
    pub requested: usize,
    pub drained: usize,
    pub discarded: usize,
    pub installed: usize,
    /// Installs refused by the lifecycle store
    pub rejected: usize,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Streams terrain chunks around a moving viewpoint.
///
/// `H` is the handle type of whatever the host materializes chunks into.
/// Must only be driven from one thread; the background worker is owned and
/// stopped with it.
pub struct Landscape<H> {
    settings: LandscapeSettings,
    store: ChunkStore<H>,
    worker: MeshWorker,
    pool: WorkUnitPool,
    // Reused every tick
    in_radius: Vec<ChunkCoord>,
    to_generate: Vec<WorkUnit>,
    generated: Vec<WorkUnit>,
    to_install: Vec<WorkUnit>,
}

impl<H> Landscape<H> {
    /// Start streaming with Perlin noise seeded from the settings.
    pub fn new(settings: LandscapeSettings) -> Result<Self, WorkerError> {
        let noise = Perlin::new(settings.noise_seed);
        Self::with_noise(settings, noise)
    }

    pub fn with_noise<N>(settings: LandscapeSettings, noise: N) -> Result<Self, WorkerError>
    where
        N: NoiseSampler + 'static,
    {
        let worker = MeshWorker::spawn(noise)?;
        info!(
            "Landscape streaming started: chunk size {:.1}, {} steps, load radius {:.1}, unload radius {:.1}",
            settings.chunk_size, settings.steps_per_chunk, settings.load_radius, settings.unload_radius
        );

        Ok(Self {
            settings,
            store: ChunkStore::new(),
            worker,
            pool: WorkUnitPool::new(),
            in_radius: Vec::new(),
            to_generate: Vec::new(),
            generated: Vec::new(),
            to_install: Vec::new(),
        })
    }

    pub fn settings(&self) -> &LandscapeSettings {
        &self.settings
    }

    pub fn store(&self) -> &ChunkStore<H> {
        &self.store
    }

    pub fn pool(&self) -> &WorkUnitPool {
        &self.pool
    }

    /// Requests submitted to the worker but not yet started.
    pub fn pending_requests(&self) -> usize {
        self.worker.pending_len()
    }

    /// Run one reconciliation pass.
    ///
    /// Only a dead worker is an error; lifecycle violations are logged and the
    /// offending chunk skipped.
    pub fn tick<S, M>(&mut self, source: &S, materializer: &mut M) -> Result<TickReport, WorkerError>
    where
        S: ReferenceSource + ?Sized,
        M: ChunkMaterializer<Handle = H>,
    {
        let mut report = TickReport::default();

        let Some(reference) = source.reference_location() else {
            return Ok(report);
        };
        let center = ground_position(reference);
        let chunk_size = self.settings.chunk_size;
        let unload_radius = self.settings.unload_radius;

        for (coord, handle) in self.store.evict_outside(center, unload_radius, chunk_size) {
            debug!("Unloading chunk ({}, {})", coord.x, coord.z);
            materializer.destroy(handle);
            report.evicted += 1;
        }

        chunks_in_radius(center, self.settings.load_radius, chunk_size, &mut self.in_radius);

        // A stopped worker never completes new requests
        let accepting_requests = !self.worker.is_stopped();

        if accepting_requests {
            for &coord in &self.in_radius {
                if self.store.is_tracked(coord) {
                    continue;
                }
                if let Err(err) = self.store.mark_loading(coord) {
                    error!("Skipping chunk request: {}", err);
                    continue;
                }
                let request = generation_request(&self.settings, coord);
                self.to_generate.push(self.pool.take(request));
                report.requested += 1;
            }
        }

        report.drained = self.worker.drain_completed(&mut self.generated)?;

        for unit in self.generated.drain(..) {
            let coord = unit.request.coord;
            if !self.store.unmark_loading(coord) {
                warn!("Generated chunk ({}, {}) was not marked as loading", coord.x, coord.z);
            }

            if coord.is_within(center, unload_radius, chunk_size) {
                self.to_install.push(unit);
            } else {
                debug!("Discarding chunk ({}, {}) generated out of range", coord.x, coord.z);
                self.pool.put(unit);
                report.discarded += 1;
            }
        }

        if accepting_requests {
            self.worker.submit(&mut self.to_generate);
        }

        for unit in self.to_install.drain(..) {
            let coord = unit.request.coord;
            let min_corner = coord.min_corner(chunk_size);

            let provisional = materializer.begin_materialize(coord, &unit.mesh);
            let handle = materializer.finish_materialize(
                provisional,
                Transform::from_xyz(min_corner.x, 0.0, min_corner.y),
            );

            match self.store.install(coord, handle) {
                Ok(()) => report.installed += 1,
                Err(err) => {
                    error!("Trying to add a chunk that is already tracked: {}", err);
                    report.rejected += 1;
                    if let Some(handle) = err.into_handle() {
                        materializer.destroy(handle);
                    }
                }
            }

            self.pool.put(unit);
        }

        if !report.is_empty() {
            debug!(
                "Landscape tick - evicted: {}, requested: {}, drained: {}, discarded: {}, installed: {}, loaded: {}, loading: {}",
                report.evicted,
                report.requested,
                report.drained,
                report.discarded,
                report.installed,
                self.store.loaded_len(),
                self.store.loading_len(),
            );
        }

        Ok(report)
    }

    /// Destroy every loaded chunk. Requests in flight are left alone.
    pub fn clear<M>(&mut self, materializer: &mut M) -> usize
    where
        M: ChunkMaterializer<Handle = H>,
    {
        let evicted = self.store.evict_all();
        let count = evicted.len();
        for (_, handle) in evicted {
            materializer.destroy(handle);
        }
        count
    }

    /// Stop the background worker. Further ticks still evict and install
    /// already-finished chunks but request nothing new.
    ///
    /// Requests the worker never started are released, so their chunks are
    /// untracked again.
    pub fn shutdown(&mut self) {
        for unit in self.worker.stop() {
            self.store.unmark_loading(unit.request.coord);
            self.pool.put(unit);
        }
    }

    #[cfg(test)]
    fn store_mut(&mut self) -> &mut ChunkStore<H> {
        &mut self.store
    }
}

fn generation_request(settings: &LandscapeSettings, coord: ChunkCoord) -> GenerationRequest {
    GenerationRequest {
        coord,
        resolution: settings.steps_per_chunk,
        chunk_size: settings.chunk_size,
        horizontal_noise_scale: settings.horizontal_noise_scale,
        vertical_scale: settings.vertical_scale,
    }
}
