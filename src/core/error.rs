//! Error types for scoring.

use thiserror::Error;

/// Errors raised by the registry, input validation and batch execution.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("Cannot register duplicate metric ({0})")]
    DuplicateMetric(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A metric function failed inside a batch task. The whole call is aborted.
    #[error("Batch {batch} failed: {source}")]
    WorkerExecution {
        batch: usize,
        #[source]
        source: Box<ScoreError>,
    },

    #[error("Metric function panicked: {0}")]
    Panicked(String),

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScoreError {
    /// Wraps a failure observed inside batch `batch`.
    pub fn in_batch(batch: usize, source: ScoreError) -> Self {
        ScoreError::WorkerExecution {
            batch,
            source: Box::new(source),
        }
    }
}

/// Result type for scoring operations.
pub type Result<T> = std::result::Result<T, ScoreError>;
