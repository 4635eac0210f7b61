//! Error type shared by the pipeline stages.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SignalError>;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid lane geometry: {0}")]
    InvalidGeometry(String),

    /// The 4x4 innovation covariance of a Kalman correction could not be inverted.
    #[error("innovation covariance is singular")]
    SingularInnovation,

    #[error("detector failed: {0}")]
    Detector(String),

    #[error("frame source failed: {0}")]
    FrameSource(String),

    #[error("failed to spawn pipeline worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("pipeline worker panicked")]
    WorkerPanicked,
}

impl SignalError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
