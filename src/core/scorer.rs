//! The uniform scoring interface.

use super::config::ScorerConfig;
use super::corpus::Corpus;
use super::error::Result;
use super::registry::Metric;
use super::score::Score;

/// Implemented by every metric.
///
/// `score` validates shapes before any work is dispatched. Sentence and
/// corpus scores do not depend on the number of workers.
pub trait Scorer: Send + Sync {
    fn config(&self) -> &ScorerConfig;

    /// Scores a corpus.
    ///
    /// # Arguments
    /// * `hypothesis` - N system outputs
    /// * `references` - Reference sources, each holding N strings
    /// * `tags` - Optional N tag lists; each distinct tag gets a group score
    fn score(
        &self,
        hypothesis: &[String],
        references: &[Vec<String>],
        tags: Option<&[Vec<String>]>,
    ) -> Result<Score>;
}

/// A built-in metric bound to a configuration.
#[derive(Debug, Clone)]
pub struct MetricScorer {
    metric: Metric,
    config: ScorerConfig,
}

impl MetricScorer {
    pub fn new(metric: Metric, config: ScorerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { metric, config })
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }
}

impl Scorer for MetricScorer {
    fn config(&self) -> &ScorerConfig {
        &self.config
    }

    fn score(
        &self,
        hypothesis: &[String],
        references: &[Vec<String>],
        tags: Option<&[Vec<String>]>,
    ) -> Result<Score> {
        self.config.validate()?;
        let corpus = Corpus::new(hypothesis, references, tags)?;
        if self.metric.requires_nonempty_references() {
            corpus.require_nonempty_references()?;
        }

        let start = std::time::Instant::now();
        let score = self.metric.run(&self.config, &corpus)?;
        tracing::info!(
            metric = self.metric.id(),
            n_samples = corpus.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "scored corpus"
        );
        Ok(score)
    }
}
