//! NIST: information-weighted n-gram precision with a length penalty.

use std::collections::BTreeMap;

use crate::core::aggregate::{score_averaged, SentenceMetric};
use crate::core::config::ScorerConfig;
use crate::core::corpus::Corpus;
use crate::core::error::Result;
use crate::core::ngrams::{count_ngrams, total};
use crate::core::score::Score;

pub const NIST_ORDER: usize = 5;

/// Sentence NIST with information weights estimated from that example's references.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nist;

/// Penalizes hypotheses shorter than the reference, 0.5 at 2/3 of its length.
pub fn nist_length_penalty(ref_len: usize, hyp_len: usize) -> f64 {
    if ref_len == 0 {
        return 0.0;
    }
    let ratio = hyp_len as f64 / ref_len as f64;
    if 0.0 < ratio && ratio < 1.0 {
        let (ratio_x, score_x) = (1.5f64, 0.5f64);
        let beta = score_x.ln() / ratio_x.ln().powi(2);
        (beta * ratio.ln().powi(2)).exp()
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// Per-reference contribution at one order: `(precision, numerator, denominator, ref_len)`.
type OrderStats = (f64, f64, usize, usize);

impl SentenceMetric for Nist {
    fn score_sentence(&mut self, hypothesis: &str, references: &[&str]) -> f64 {
        let hyp: Vec<&str> = hypothesis.split_whitespace().collect();
        let refs: Vec<Vec<&str>> = references
            .iter()
            .map(|r| r.split_whitespace().collect())
            .collect();

        // n-gram frequencies over all references of this example
        let mut ngram_freq: BTreeMap<&[&str], usize> = BTreeMap::new();
        let mut total_reference_words = 0usize;
        for r in &refs {
            for n in 1..=NIST_ORDER {
                for (ngram, count) in count_ngrams(r, n) {
                    *ngram_freq.entry(ngram).or_insert(0) += count;
                }
            }
            total_reference_words += r.len();
        }

        let information_weight = |ngram: &[&str]| -> f64 {
            let freq = ngram_freq.get(ngram).copied().unwrap_or(0);
            if freq == 0 {
                return 0.0;
            }
            let prefix = &ngram[..ngram.len() - 1];
            let numerator = match ngram_freq.get(prefix) {
                Some(&f) if !prefix.is_empty() => f,
                _ => total_reference_words,
            };
            (numerator as f64 / freq as f64).log2()
        };

        let mut nist_precision = 0.0;
        let (mut l_ref, mut l_sys) = (0usize, 0usize);
        for n in 1..=NIST_ORDER {
            let hyp_ngrams = count_ngrams(&hyp, n);
            let best: Option<OrderStats> = refs
                .iter()
                .map(|r| {
                    let ref_ngrams = count_ngrams(r, n);
                    let numerator: f64 = hyp_ngrams
                        .iter()
                        .filter_map(|(ngram, &count)| {
                            let overlap = count.min(ref_ngrams.get(ngram).copied().unwrap_or(0));
                            (overlap > 0).then(|| information_weight(*ngram) * overlap as f64)
                        })
                        .sum();
                    let denominator = total(&hyp_ngrams);
                    let precision = if denominator == 0 {
                        0.0
                    } else {
                        numerator / denominator as f64
                    };
                    (precision, numerator, denominator, r.len())
                })
                .reduce(|a, b| if lexicographic_gt(&b, &a) { b } else { a });

            if let Some((_, numerator, denominator, ref_len)) = best {
                if denominator > 0 {
                    nist_precision += numerator / denominator as f64;
                }
                l_ref += ref_len;
                l_sys += hyp.len();
            }
        }

        nist_precision * nist_length_penalty(l_ref, l_sys)
    }
}

/// Tuple ordering: first differing field decides.
fn lexicographic_gt(a: &OrderStats, b: &OrderStats) -> bool {
    a.0.partial_cmp(&b.0)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .then_with(|| a.2.cmp(&b.2))
        .then_with(|| a.3.cmp(&b.3))
        .is_gt()
}

pub fn score_nist(config: &ScorerConfig, corpus: &Corpus<'_>) -> Result<Score> {
    score_averaged(config, corpus, |_| Ok(Nist))
}
