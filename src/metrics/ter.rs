//! Translation edit rate scorer.

use crate::core::aggregate::{score_averaged, SentenceMetric};
use crate::core::config::ScorerConfig;
use crate::core::corpus::Corpus;
use crate::core::error::Result;
use crate::core::score::Score;
use crate::core::ter::ShiftSearchEngine;

/// Sentence TER; the worst score across references.
#[derive(Debug, Default)]
pub struct Ter {
    engine: ShiftSearchEngine,
}

impl SentenceMetric for Ter {
    fn score_sentence(&mut self, hypothesis: &str, references: &[&str]) -> f64 {
        self.engine.sentence_ter(hypothesis, references)
    }
}

pub fn score_ter(config: &ScorerConfig, corpus: &Corpus<'_>) -> Result<Score> {
    score_averaged(config, corpus, |_| Ok(Ter::default()))
}
