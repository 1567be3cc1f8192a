//! Per-chunk lifecycle bookkeeping.
//!
//! A coordinate is either loading (a request is in flight), loaded (with a
//! handle to its installed geometry), or not tracked at all. The loading set
//! and the loaded map never share a coordinate; every transition that would
//! break that is refused and reported instead of applied.

use bevy::prelude::*;
use hashbrown::{HashMap, HashSet};

use super::coords::ChunkCoord;
use crate::core::error::LifecycleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    Loading,
    Loaded,
}

pub struct ChunkStore<H> {
    loading: HashSet<ChunkCoord>,
    loaded: HashMap<ChunkCoord, H>,
}

impl<H> Default for ChunkStore<H> {
    fn default() -> Self {
        Self {
            loading: HashSet::new(),
            loaded: HashMap::new(),
        }
    }
}

impl<H> ChunkStore<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loading or loaded.
    pub fn is_tracked(&self, coord: ChunkCoord) -> bool {
        self.loading.contains(&coord) || self.loaded.contains_key(&coord)
    }

    pub fn is_loading(&self, coord: ChunkCoord) -> bool {
        self.loading.contains(&coord)
    }

    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.loaded.contains_key(&coord)
    }

    pub fn state(&self, coord: ChunkCoord) -> Option<ChunkState> {
        if self.loading.contains(&coord) {
            Some(ChunkState::Loading)
        } else if self.loaded.contains_key(&coord) {
            Some(ChunkState::Loaded)
        } else {
            None
        }
    }

    pub fn mark_loading(&mut self, coord: ChunkCoord) -> Result<(), LifecycleError<H>> {
        if self.is_tracked(coord) {
            return Err(LifecycleError::AlreadyTracked(coord));
        }
        self.loading.insert(coord);
        Ok(())
    }

    /// Returns whether the coordinate was loading.
    pub fn unmark_loading(&mut self, coord: ChunkCoord) -> bool {
        self.loading.remove(&coord)
    }

    /// Record a freshly materialized chunk. Never overwrites: an existing
    /// entry or an outstanding request refuses the install and hands the new
    /// handle back inside the error.
    pub fn install(&mut self, coord: ChunkCoord, handle: H) -> Result<(), LifecycleError<H>> {
        if self.loaded.contains_key(&coord) {
            return Err(LifecycleError::AlreadyLoaded { coord, handle });
        }
        if self.loading.contains(&coord) {
            return Err(LifecycleError::StillLoading { coord, handle });
        }
        self.loaded.insert(coord, handle);
        Ok(())
    }

    /// Forget a loaded chunk and return its handle for teardown.
    pub fn evict(&mut self, coord: ChunkCoord) -> Option<H> {
        self.loaded.remove(&coord)
    }

    /// Evict every loaded chunk whose center lies beyond `radius` of `center`.
    pub fn evict_outside(&mut self, center: Vec2, radius: f32, chunk_size: f32) -> Vec<(ChunkCoord, H)> {
        let outside: Vec<ChunkCoord> = self
            .loaded
            .keys()
            .filter(|coord| !coord.is_within(center, radius, chunk_size))
            .copied()
            .collect();

        outside
            .into_iter()
            .filter_map(|coord| self.loaded.remove(&coord).map(|handle| (coord, handle)))
            .collect()
    }

    /// Remove every loaded chunk, returning the handles.
    pub fn evict_all(&mut self) -> Vec<(ChunkCoord, H)> {
        self.loaded.drain().collect()
    }

    pub fn loaded(&self) -> impl Iterator<Item = (ChunkCoord, &H)> {
        self.loaded.iter().map(|(coord, handle)| (*coord, handle))
    }

    pub fn loading(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.loading.iter().copied()
    }

    pub fn loaded_len(&self) -> usize {
        self.loaded.len()
    }

    pub fn loading_len(&self) -> usize {
        self.loading.len()
    }

    /// True when no coordinate is both loading and loaded.
    pub fn is_consistent(&self) -> bool {
        self.loading.iter().all(|coord| !self.loaded.contains_key(coord))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ChunkCoord = ChunkCoord::new(0, 0);
    const B: ChunkCoord = ChunkCoord::new(5, -2);

    #[test]
    fn loading_then_loaded() {
        let mut store = ChunkStore::new();
        store.mark_loading(A).unwrap();
        assert_eq!(store.state(A), Some(ChunkState::Loading));
        assert!(store.is_tracked(A));

        assert!(store.unmark_loading(A));
        assert_eq!(store.state(A), None);

        store.install(A, "a").unwrap();
        assert_eq!(store.state(A), Some(ChunkState::Loaded));
        assert!(store.is_consistent());
    }

    #[test]
    fn double_install_is_refused_without_overwriting() {
        let mut store = ChunkStore::new();
        store.install(A, 1).unwrap();
        let err = store.install(A, 2).unwrap_err();
        assert!(matches!(err, LifecycleError::AlreadyLoaded { handle: 2, .. }));
        assert_eq!(err.into_handle(), Some(2));
        assert_eq!(store.loaded().collect::<Vec<_>>(), vec![(A, &1)]);
    }

    #[test]
    fn install_while_loading_is_refused() {
        let mut store = ChunkStore::new();
        store.mark_loading(A).unwrap();
        assert!(matches!(store.install(A, 1), Err(LifecycleError::StillLoading { .. })));
        assert!(!store.is_loaded(A));
        assert!(store.is_consistent());
    }

    #[test]
    fn tracked_coordinates_cannot_be_marked_again() {
        let mut store = ChunkStore::new();
        store.mark_loading(A).unwrap();
        assert!(matches!(store.mark_loading(A), Err(LifecycleError::AlreadyTracked(_))));

        store.install(B, ()).unwrap();
        assert!(matches!(store.mark_loading(B), Err(LifecycleError::AlreadyTracked(_))));
        assert_eq!(store.loading_len(), 1);
    }

    #[test]
    fn evict_returns_the_handle() {
        let mut store = ChunkStore::new();
        store.install(B, "b").unwrap();
        assert_eq!(store.evict(B), Some("b"));
        assert_eq!(store.evict(B), None);
        assert!(!store.is_tracked(B));
    }

    #[test]
    fn evict_outside_keeps_chunks_in_range() {
        let mut store = ChunkStore::new();
        store.install(A, 'a').unwrap();
        store.install(B, 'b').unwrap();

        let evicted = store.evict_outside(Vec2::ZERO, 150.0, 100.0);
        assert_eq!(evicted, vec![(B, 'b')]);
        assert!(store.is_loaded(A));
        assert_eq!(store.loaded_len(), 1);
    }
}
