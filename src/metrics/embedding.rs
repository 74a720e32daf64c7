//! Scorers backed by a caller-supplied sentence encoder.

use crate::core::aggregate::averaged_score;
use crate::core::config::ScorerConfig;
use crate::core::corpus::Corpus;
use crate::core::error::{Result, ScoreError};
use crate::core::executor::BatchExecutor;
use crate::core::score::Score;
use crate::core::scorer::Scorer;

/// Maps sentences to fixed-size vectors.
pub trait SentenceEncoder: Send + Sync {
    fn encode(&self, sentences: &[&str]) -> Result<Vec<Vec<f32>>>;
}

/// Cosine similarity; 0 when either vector is zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Cosine similarity between encoded hypotheses and first references,
/// aggregated like any mean-family metric.
pub struct EmbeddingScorer<E: SentenceEncoder> {
    config: ScorerConfig,
    encoder: E,
}

impl<E: SentenceEncoder> EmbeddingScorer<E> {
    pub fn new(config: ScorerConfig, encoder: E) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, encoder })
    }
}

impl<E: SentenceEncoder> Scorer for EmbeddingScorer<E> {
    fn config(&self) -> &ScorerConfig {
        &self.config
    }

    fn score(
        &self,
        hypothesis: &[String],
        references: &[Vec<String>],
        tags: Option<&[Vec<String>]>,
    ) -> Result<Score> {
        let corpus = Corpus::new(hypothesis, references, tags)?;
        let executor = BatchExecutor::new(&self.config, corpus.len());
        let sent_scores = executor.map_sentences(&corpus, &self.config.extra_args, |_, slice, _| {
            let hyp: Vec<&str> = slice.hypothesis().iter().map(String::as_str).collect();
            let refs: Vec<&str> = slice.first_references().iter().map(String::as_str).collect();
            let hyp_vectors = self.encoder.encode(&hyp)?;
            let ref_vectors = self.encoder.encode(&refs)?;
            if hyp_vectors.len() != hyp.len() || ref_vectors.len() != refs.len() {
                return Err(ScoreError::Encoder(format!(
                    "expected {} vectors, got {} and {}",
                    hyp.len(),
                    hyp_vectors.len(),
                    ref_vectors.len()
                )));
            }
            Ok(hyp_vectors
                .iter()
                .zip(&ref_vectors)
                .map(|(h, r)| cosine_similarity(h, r))
                .collect())
        })?;
        Ok(averaged_score(&self.config, &corpus, sent_scores))
    }
}
