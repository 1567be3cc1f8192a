//! Background mesh generation.
//!
//! One long-lived thread pulls [`WorkUnit`]s off a FIFO queue, synthesizes
//! their meshes and publishes them to a completed list. The pending queue and
//! the completed list have separate locks, so the simulation thread submitting
//! work never waits on the worker publishing a result. A single condvar on the
//! pending lock wakes the worker for new work or for shutdown.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use bevy::prelude::*;

use super::mesh::{synthesize_into, HeightScratch, NoiseSampler};
use super::pool::WorkUnit;
use crate::core::constants::worker::THREAD_NAME;
use crate::core::error::WorkerError;

#[derive(Default)]
struct PendingState {
    queue: VecDeque<WorkUnit>,
    stop: bool,
}

#[derive(Default)]
struct WorkQueue {
    pending: Mutex<PendingState>,
    wake: Condvar,
    completed: Mutex<Vec<WorkUnit>>,
}

// Every critical section is a single push, pop or append, so a panic on the
// other side cannot leave the data half-updated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to the background mesh worker. Stops and joins the thread on drop.
pub struct MeshWorker {
    queue: Arc<WorkQueue>,
    thread: Option<JoinHandle<()>>,
}

impl MeshWorker {
    /// Start the worker thread. `noise` moves to the worker for its lifetime.
    pub fn spawn<N>(noise: N) -> Result<Self, WorkerError>
    where
        N: NoiseSampler + 'static,
    {
        let queue = Arc::new(WorkQueue::default());
        let worker_queue = Arc::clone(&queue);

        let thread = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || worker_loop(&worker_queue, &noise))
            .map_err(WorkerError::Spawn)?;

        Ok(Self {
            queue,
            thread: Some(thread),
        })
    }

    /// Queue every unit in `batch`, preserving order. `batch` is left empty
    /// with its capacity intact.
    pub fn submit(&self, batch: &mut Vec<WorkUnit>) {
        if batch.is_empty() {
            return;
        }

        {
            let mut pending = lock(&self.queue.pending);
            if pending.stop {
                warn!("Mesh worker is stopped; dropping {} submitted chunk requests", batch.len());
                batch.clear();
                return;
            }
            pending.queue.extend(batch.drain(..));
        }
        self.queue.wake.notify_one();
    }

    /// Move every unit completed since the last drain into `out`. Never waits
    /// for the worker.
    ///
    /// Fails if the worker thread died without being asked to stop; results
    /// can no longer be trusted to arrive and streaming must not continue.
    pub fn drain_completed(&self, out: &mut Vec<WorkUnit>) -> Result<usize, WorkerError> {
        let drained = {
            let mut completed = lock(&self.queue.completed);
            let drained = completed.len();
            out.append(&mut completed);
            drained
        };

        if drained == 0 && self.has_terminated_unexpectedly() {
            return Err(WorkerError::Terminated);
        }
        Ok(drained)
    }

    /// Number of units waiting to be started.
    pub fn pending_len(&self) -> usize {
        lock(&self.queue.pending).queue.len()
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|thread| !thread.is_finished())
    }

    /// Signal the worker and wait for it to exit. Safe to call more than once.
    ///
    /// A unit being synthesized when the signal arrives is finished and
    /// published. Units still queued are never started and are handed back.
    pub fn stop(&mut self) -> Vec<WorkUnit> {
        let Some(thread) = self.thread.take() else {
            return Vec::new();
        };

        lock(&self.queue.pending).stop = true;
        self.queue.wake.notify_all();

        if thread.join().is_err() {
            error!("Mesh worker thread panicked before shutdown");
        }
        let abandoned: Vec<WorkUnit> = lock(&self.queue.pending).queue.drain(..).collect();

        info!("Mesh worker stopped ({} queued requests abandoned)", abandoned.len());
        abandoned
    }

    /// True once [`Self::stop`] has been called.
    pub fn is_stopped(&self) -> bool {
        self.thread.is_none()
    }

    fn has_terminated_unexpectedly(&self) -> bool {
        let stop_requested = lock(&self.queue.pending).stop;
        !stop_requested && self.thread.as_ref().is_some_and(|thread| thread.is_finished())
    }
}

impl Drop for MeshWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop<N: NoiseSampler + ?Sized>(queue: &WorkQueue, noise: &N) {
    info!("Mesh worker starting");

    let mut scratch = HeightScratch::new();

    loop {
        let mut unit = {
            let pending = lock(&queue.pending);
            let mut pending = queue
                .wake
                .wait_while(pending, |state| !state.stop && state.queue.is_empty())
                .unwrap_or_else(PoisonError::into_inner);

            if pending.stop {
                break;
            }
            match pending.queue.pop_front() {
                Some(unit) => unit,
                None => continue,
            }
        };

        synthesize_into(&unit.request, noise, &mut scratch, &mut unit.mesh);
        debug!(
            "Generated chunk ({}, {}) with {} vertices",
            unit.request.coord.x,
            unit.request.coord.z,
            unit.mesh.vertex_count()
        );

        lock(&queue.completed).push(unit);
    }

    info!("Mesh worker stopping");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::coords::ChunkCoord;
    use crate::terrain::mesh::GenerationRequest;
    use noise::Perlin;
    use std::time::{Duration, Instant};

    fn unit(x: i32, resolution: u32) -> WorkUnit {
        WorkUnit::new(GenerationRequest {
            coord: ChunkCoord::new(x, 0),
            resolution,
            chunk_size: 100.0,
            horizontal_noise_scale: 400.0,
            vertical_scale: 30.0,
        })
    }

    fn drain_until(worker: &MeshWorker, expected: usize) -> Vec<WorkUnit> {
        let deadline = Instant::now() + Duration::from_secs(30);
        let mut done = Vec::new();
        while done.len() < expected && Instant::now() < deadline {
            worker.drain_completed(&mut done).unwrap();
            thread::sleep(Duration::from_millis(1));
        }
        done
    }

    #[test]
    fn submit_leaves_the_batch_empty() {
        let worker = MeshWorker::spawn(Perlin::new(1)).unwrap();
        let mut batch = vec![unit(0, 2), unit(1, 2)];
        let capacity = batch.capacity();
        worker.submit(&mut batch);
        assert!(batch.is_empty());
        assert_eq!(batch.capacity(), capacity);
    }

    #[test]
    fn results_are_published_in_submission_order() {
        let worker = MeshWorker::spawn(Perlin::new(1)).unwrap();
        let mut batch: Vec<_> = (0..8).map(|x| unit(x, 4)).collect();
        worker.submit(&mut batch);

        let done = drain_until(&worker, 8);
        let coords: Vec<_> = done.iter().map(|u| u.request.coord.x).collect();
        assert_eq!(coords, (0..8).collect::<Vec<_>>());
        assert!(done.iter().all(|u| u.mesh.vertex_count() == 25));
    }

    #[test]
    fn drain_without_work_is_empty() {
        let worker = MeshWorker::spawn(Perlin::new(1)).unwrap();
        let mut out = Vec::new();
        assert_eq!(worker.drain_completed(&mut out).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn stop_is_idempotent() {
        let mut worker = MeshWorker::spawn(Perlin::new(1)).unwrap();
        assert!(worker.is_running());
        assert!(!worker.is_stopped());
        worker.stop();
        assert!(worker.stop().is_empty());
        assert!(!worker.is_running());
        assert!(worker.is_stopped());
    }

    #[test]
    fn submissions_after_stop_are_dropped() {
        let mut worker = MeshWorker::spawn(Perlin::new(1)).unwrap();
        worker.stop();
        let mut batch = vec![unit(0, 1)];
        worker.submit(&mut batch);
        assert!(batch.is_empty());
        assert_eq!(worker.pending_len(), 0);

        let mut out = Vec::new();
        assert_eq!(worker.drain_completed(&mut out).unwrap(), 0);
    }

    #[test]
    fn panicking_worker_is_reported_as_terminated() {
        struct Exploding;
        impl noise::NoiseFn<f64, 2> for Exploding {
            fn get(&self, _point: [f64; 2]) -> f64 {
                panic!("noise failure");
            }
        }

        let worker = MeshWorker::spawn(Exploding).unwrap();
        worker.submit(&mut vec![unit(0, 1)]);

        let deadline = Instant::now() + Duration::from_secs(30);
        while worker.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }

        let mut out = Vec::new();
        assert!(matches!(worker.drain_completed(&mut out), Err(WorkerError::Terminated)));
    }
}
