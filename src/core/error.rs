//! Error types shared by the landscape core.

use std::path::PathBuf;

use thiserror::Error;

use crate::terrain::coords::ChunkCoord;

/// A configuration value was rejected at load time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} = {value} is outside the valid range {min} ..= {max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("failed to read landscape settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse landscape settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A chunk lifecycle transition that would break the loading/loaded invariant.
///
/// Installing carries the refused handle back so the caller can tear it down.
#[derive(Debug, Error)]
pub enum LifecycleError<H> {
    #[error("chunk {coord:?} is already loaded")]
    AlreadyLoaded { coord: ChunkCoord, handle: H },
    #[error("chunk {coord:?} is still marked as loading")]
    StillLoading { coord: ChunkCoord, handle: H },
    #[error("chunk {0:?} is already tracked")]
    AlreadyTracked(ChunkCoord),
}

impl<H> LifecycleError<H> {
    /// Gives back the handle a refused install was carrying, if any.
    pub fn into_handle(self) -> Option<H> {
        match self {
            Self::AlreadyLoaded { handle, .. } | Self::StillLoading { handle, .. } => Some(handle),
            Self::AlreadyTracked(_) => None,
        }
    }
}

/// Failures of the background mesh worker. Both are fatal to streaming.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to spawn the mesh worker thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("the mesh worker thread terminated without being stopped")]
    Terminated,
}
