//! chrF: character n-gram F-score.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::aggregate::{score_by_statistics, CorpusStatistics, StatisticMetric};
use crate::core::config::ScorerConfig;
use crate::core::corpus::Corpus;
use crate::core::error::Result;
use crate::core::ngrams::{clipped_overlap, count_ngrams, total};
use crate::core::score::Score;

pub const CHRF_ORDER: usize = 6;
pub const CHRF_BETA: f64 = 2.0;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Per order: hypothesis n-grams, reference n-grams, common n-grams.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChrfStatistics {
    pub counts: [[u64; 3]; CHRF_ORDER],
}

impl CorpusStatistics for ChrfStatistics {
    fn merge(&mut self, other: &Self) {
        for (mine, theirs) in self.counts.iter_mut().zip(&other.counts) {
            for k in 0..3 {
                mine[k] += theirs[k];
            }
        }
    }
}

impl ChrfStatistics {
    /// Precision and recall averaged over orders where both sides have n-grams.
    pub fn avg_precision_and_recall(&self) -> (f64, f64) {
        let mut precision = 0.0;
        let mut recall = 0.0;
        let mut effective_order = 0;
        for &[hyp, reference, common] in &self.counts {
            if hyp > 0 && reference > 0 {
                precision += common as f64 / hyp as f64;
                recall += common as f64 / reference as f64;
                effective_order += 1;
            }
        }
        if effective_order == 0 {
            return (0.0, 0.0);
        }
        (
            precision / effective_order as f64,
            recall / effective_order as f64,
        )
    }

    pub fn f_score(&self, beta: f64) -> f64 {
        let (p, r) = self.avg_precision_and_recall();
        if p + r == 0.0 {
            return 0.0;
        }
        let beta_sq = beta * beta;
        (1.0 + beta_sq) * p * r / (beta_sq * p + r)
    }
}

/// chrF against the first reference source, on a 0–1 scale.
#[derive(Debug, Clone, Copy, Default)]
pub struct Chrf;

impl StatisticMetric for Chrf {
    type Stats = ChrfStatistics;

    fn sentence_statistics(&self, hypothesis: &str, references: &[&str]) -> ChrfStatistics {
        let hyp: Vec<char> = WHITESPACE.replace_all(hypothesis, "").chars().collect();
        let reference: Vec<char> = references
            .first()
            .map(|r| WHITESPACE.replace_all(r, "").chars().collect())
            .unwrap_or_default();

        let mut stats = ChrfStatistics::default();
        for (i, slot) in stats.counts.iter_mut().enumerate() {
            let hyp_ngrams = count_ngrams(&hyp, i + 1);
            let ref_ngrams = count_ngrams(&reference, i + 1);
            *slot = [
                total(&hyp_ngrams) as u64,
                total(&ref_ngrams) as u64,
                clipped_overlap(&hyp_ngrams, &ref_ngrams) as u64,
            ];
        }
        stats
    }

    fn sentence_score(&self, stats: &ChrfStatistics) -> f64 {
        stats.f_score(CHRF_BETA)
    }

    fn corpus_score(&self, stats: &ChrfStatistics) -> f64 {
        stats.f_score(CHRF_BETA)
    }
}

pub fn score_chrf(config: &ScorerConfig, corpus: &Corpus<'_>) -> Result<Score> {
    score_by_statistics(config, corpus, &Chrf)
}
