//! ROUGE-N and ROUGE-L F-measures against the first reference source.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::aggregate::{score_averaged, SentenceMetric};
use crate::core::config::ScorerConfig;
use crate::core::corpus::Corpus;
use crate::core::error::Result;
use crate::core::ngrams::{clipped_overlap, count_ngrams, total};
use crate::core::score::Score;

/// Weight of recall in the F-measure.
pub const ROUGE_ALPHA: f64 = 0.5;

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid alphanumeric pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RougeVariant {
    /// N-gram overlap of the given order
    N(usize),
    /// Longest common subsequence
    L,
}

#[derive(Debug, Clone, Copy)]
pub struct Rouge {
    pub variant: RougeVariant,
}

/// Lowercases and keeps alphanumeric runs as tokens.
pub fn rouge_tokens(text: &str) -> Vec<String> {
    NON_ALPHANUMERIC
        .replace_all(&text.to_lowercase(), " ")
        .split_whitespace()
        .map(String::from)
        .collect()
}

fn f_score(evaluated: usize, reference: usize, overlapping: usize) -> f64 {
    let precision = if evaluated > 0 {
        overlapping as f64 / evaluated as f64
    } else {
        0.0
    };
    let recall = if reference > 0 {
        overlapping as f64 / reference as f64
    } else {
        0.0
    };
    let denominator = (1.0 - ROUGE_ALPHA) * precision + ROUGE_ALPHA * recall;
    if denominator > 0.0 {
        precision * recall / denominator
    } else {
        0.0
    }
}

/// Length of the longest common subsequence.
pub fn lcs_length<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            cur[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

impl SentenceMetric for Rouge {
    fn score_sentence(&mut self, hypothesis: &str, references: &[&str]) -> f64 {
        let hyp = rouge_tokens(hypothesis);
        let reference = rouge_tokens(references.first().copied().unwrap_or(""));
        match self.variant {
            RougeVariant::N(n) => {
                let hyp_ngrams = count_ngrams(&hyp, n);
                let ref_ngrams = count_ngrams(&reference, n);
                f_score(
                    total(&hyp_ngrams),
                    total(&ref_ngrams),
                    clipped_overlap(&hyp_ngrams, &ref_ngrams),
                )
            }
            RougeVariant::L => f_score(hyp.len(), reference.len(), lcs_length(&hyp, &reference)),
        }
    }
}

pub fn score_rouge(config: &ScorerConfig, corpus: &Corpus<'_>, variant: RougeVariant) -> Result<Score> {
    score_averaged(config, corpus, |_| Ok(Rouge { variant }))
}
