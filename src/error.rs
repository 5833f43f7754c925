//! Error types shared by every asset.
//!
//! Nothing in the pipeline catches or retries these; they propagate to
//! `main`, which reports them and exits with status 1.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the pipeline modules.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Everything that can go wrong while materializing an asset.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote endpoint answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// A JSON document could not be decoded or encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A CSV artifact could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem failure on an artifact path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The chart could not be encoded as PNG.
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    /// The chart could not be drawn.
    #[error("chart rendering failed: {0}")]
    Chart(String),

    /// The item endpoint returned `null` for this id.
    #[error("item {0} does not exist")]
    MissingItem(u64),

    /// An upstream artifact has not been materialized yet.
    #[error("artifact not found: {} (materialize its upstream asset first)", .0.display())]
    MissingArtifact(PathBuf),
}

impl PipelineError {
    /// Wrap an `std::io::Error` with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
