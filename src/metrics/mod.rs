//! Metric implementations. Each exposes a `score_*` function taking a
//! configuration and a validated corpus.

pub mod bleu;
pub mod chrf;
pub mod cider;
pub mod embedding;
pub mod gleu;
pub mod meteor;
pub mod nist;
pub mod ribes;
pub mod rouge;
pub mod ter;
pub mod wer;

pub use embedding::{EmbeddingScorer, SentenceEncoder};
