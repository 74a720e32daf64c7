//! Parallel evaluation of generated text against references.
//!
//! Every metric is reached through [`Scorer`]: build one from the
//! [`builtin_registry`] (or [`Metric::scorer`]), then call
//! [`Scorer::score`] with hypotheses, reference sources and optional tags.

pub mod cli;
pub mod core;
pub mod metrics;

#[cfg(feature = "python")]
pub mod python;

// Re-export main types
pub use crate::core::{
    builtin_registry, ExtraArgs, Metric, MetricRegistry, MetricScorer, Score, ScoreError,
    Scorer, ScorerConfig, ScorerConfigBuilder, Tokenization,
};
pub use metrics::{EmbeddingScorer, SentenceEncoder};

/// Convenient alias for a result with a boxed error.
pub type Result<T> = anyhow::Result<T>;

// Python module entry point
#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn seqscore(_py: Python, m: &PyModule) -> PyResult<()> {
    python::_rust(_py, m)
}
