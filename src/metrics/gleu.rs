//! Google-BLEU, sentence level.

use crate::core::aggregate::{score_averaged, SentenceMetric};
use crate::core::config::ScorerConfig;
use crate::core::corpus::Corpus;
use crate::core::error::Result;
use crate::core::ngrams::{clipped_overlap, count_ngrams_range, total};
use crate::core::score::Score;

pub const GLEU_MIN_LEN: usize = 1;
pub const GLEU_MAX_LEN: usize = 4;

/// `min(precision, recall)` over n-grams of order 1 to 4, best reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gleu;

impl SentenceMetric for Gleu {
    fn score_sentence(&mut self, hypothesis: &str, references: &[&str]) -> f64 {
        let hyp: Vec<&str> = hypothesis.split_whitespace().collect();
        let hyp_ngrams = count_ngrams_range(&hyp, GLEU_MIN_LEN, GLEU_MAX_LEN);
        let tpfp = total(&hyp_ngrams);

        let mut best: Option<(usize, usize)> = None;
        for reference in references {
            let tokens: Vec<&str> = reference.split_whitespace().collect();
            let ref_ngrams = count_ngrams_range(&tokens, GLEU_MIN_LEN, GLEU_MAX_LEN);
            let tp = clipped_overlap(&hyp_ngrams, &ref_ngrams);
            let n_all = tpfp.max(total(&ref_ngrams));
            if n_all == 0 {
                continue;
            }
            // first maximum wins
            let better = best.map_or(true, |(b_tp, b_all)| {
                tp as f64 / n_all as f64 > b_tp as f64 / b_all as f64
            });
            if better {
                best = Some((tp, n_all));
            }
        }

        best.map_or(0.0, |(tp, n_all)| tp as f64 / n_all as f64)
    }
}

pub fn score_gleu(config: &ScorerConfig, corpus: &Corpus<'_>) -> Result<Score> {
    score_averaged(config, corpus, |_| Ok(Gleu))
}
