pub mod aggregate;
pub mod cider;
pub mod config;
pub mod corpus;
pub mod edit_distance;
pub mod error;
pub mod executor;
pub mod lru;
pub mod ngrams;
pub mod registry;
pub mod score;
pub mod scorer;
pub mod ter;
pub mod tokenizer;

pub use aggregate::{CorpusStatistics, SentenceMetric, StatisticMetric};
pub use config::{ExtraArgs, ScorerConfig, ScorerConfigBuilder};
pub use corpus::{Corpus, CorpusSlice};
pub use edit_distance::WerStats;
pub use error::{Result, ScoreError};
pub use executor::{Batch, BatchExecutor};
pub use registry::{builtin_registry, Metric, MetricRegistry};
pub use score::Score;
pub use scorer::{MetricScorer, Scorer};
pub use ter::ShiftSearchEngine;
pub use tokenizer::Tokenization;
