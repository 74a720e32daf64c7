//! BLEU and its brevity penalty, aggregated from corpus statistics.

use std::collections::BTreeMap;

use crate::core::aggregate::{score_by_statistics, CorpusStatistics, StatisticMetric};
use crate::core::config::ScorerConfig;
use crate::core::corpus::Corpus;
use crate::core::error::Result;
use crate::core::ngrams::{count_ngrams, total};
use crate::core::score::Score;
use crate::core::tokenizer::Tokenization;

/// Highest n-gram order.
pub const NGRAM_ORDER: usize = 4;
/// Floor applied to zero matches in sentence-level BLEU.
pub const FLOOR_SMOOTH_VALUE: f64 = 0.1;

/// Sufficient statistics of BLEU.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BleuStatistics {
    /// Clipped n-gram matches per order
    pub correct: [u64; NGRAM_ORDER],
    /// Hypothesis n-grams per order
    pub total: [u64; NGRAM_ORDER],
    pub sys_len: u64,
    pub ref_len: u64,
}

impl CorpusStatistics for BleuStatistics {
    fn merge(&mut self, other: &Self) {
        for n in 0..NGRAM_ORDER {
            self.correct[n] += other.correct[n];
            self.total[n] += other.total[n];
        }
        self.sys_len += other.sys_len;
        self.ref_len += other.ref_len;
    }
}

/// How zero n-gram matches are handled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Smoothing {
    None,
    /// Halves the pseudo-count at every zero-match order
    Exp,
    /// Replaces zero matches with a fixed pseudo-count
    Floor(f64),
}

/// A BLEU value and its components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BleuResult {
    pub score: f64,
    pub bp: f64,
    pub precisions: [f64; NGRAM_ORDER],
}

fn my_log(x: f64) -> f64 {
    if x == 0.0 {
        -9999999999.0
    } else {
        x.ln()
    }
}

/// Closed-form BLEU over summed statistics.
///
/// # Arguments
/// * `stats` - Summed statistics
/// * `smoothing` - Zero-match smoothing
/// * `use_effective_order` - Only average over orders the hypothesis has n-grams for
///
/// # Returns
/// Score and brevity penalty, both on BLEU's 0–100 and 0–1 scales
pub fn compute_bleu(stats: &BleuStatistics, smoothing: Smoothing, use_effective_order: bool) -> BleuResult {
    let mut precisions = [0.0; NGRAM_ORDER];
    let mut smooth_mteval = 1.0;
    let mut effective_order = NGRAM_ORDER;

    for n in 0..NGRAM_ORDER {
        let (correct, total) = (stats.correct[n], stats.total[n]);
        if total == 0 {
            break;
        }
        if use_effective_order {
            effective_order = n + 1;
        }
        precisions[n] = if correct == 0 {
            match smoothing {
                Smoothing::Exp => {
                    smooth_mteval *= 2.0;
                    100.0 / (smooth_mteval * total as f64)
                }
                Smoothing::Floor(value) => 100.0 * value / total as f64,
                Smoothing::None => 0.0,
            }
        } else {
            100.0 * correct as f64 / total as f64
        };
    }

    let bp = if stats.sys_len < stats.ref_len {
        if stats.sys_len > 0 {
            (1.0 - stats.ref_len as f64 / stats.sys_len as f64).exp()
        } else {
            0.0
        }
    } else {
        1.0
    };

    let log_sum: f64 = precisions[..effective_order].iter().map(|&p| my_log(p)).sum();
    BleuResult {
        score: bp * (log_sum / effective_order as f64).exp(),
        bp,
        precisions,
    }
}

/// Which component of BLEU is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BleuOutput {
    Score,
    BrevityPenalty,
}

/// BLEU (or BP) with a fixed tokenization.
#[derive(Debug, Clone, Copy)]
pub struct Bleu {
    tokenization: Tokenization,
    output: BleuOutput,
}

impl Bleu {
    pub fn new(tokenization: Tokenization, output: BleuOutput) -> Self {
        Self {
            tokenization,
            output,
        }
    }

    fn project(&self, result: BleuResult) -> f64 {
        match self.output {
            BleuOutput::Score => result.score,
            BleuOutput::BrevityPenalty => result.bp,
        }
    }
}

impl StatisticMetric for Bleu {
    type Stats = BleuStatistics;

    fn sentence_statistics(&self, hypothesis: &str, references: &[&str]) -> BleuStatistics {
        let hyp = self.tokenization.tokens(hypothesis.trim_end());
        let refs: Vec<Vec<String>> = references
            .iter()
            .map(|r| self.tokenization.tokens(r.trim_end()))
            .collect();

        let mut stats = BleuStatistics {
            sys_len: hyp.len() as u64,
            ref_len: closest_ref_len(hyp.len(), &refs) as u64,
            ..BleuStatistics::default()
        };

        for n in 1..=NGRAM_ORDER {
            let hyp_counts = count_ngrams(&hyp, n);
            // element-wise maximum of the reference counts
            let mut max_ref: BTreeMap<&[String], usize> = BTreeMap::new();
            for r in &refs {
                for (ngram, count) in count_ngrams(r, n) {
                    let slot = max_ref.entry(ngram).or_insert(0);
                    *slot = (*slot).max(count);
                }
            }
            let correct: usize = hyp_counts
                .iter()
                .map(|(ngram, &count)| count.min(max_ref.get(ngram).copied().unwrap_or(0)))
                .sum();
            stats.correct[n - 1] = correct as u64;
            stats.total[n - 1] = total(&hyp_counts) as u64;
        }
        stats
    }

    fn sentence_score(&self, stats: &BleuStatistics) -> f64 {
        self.project(compute_bleu(
            stats,
            Smoothing::Floor(FLOOR_SMOOTH_VALUE),
            true,
        ))
    }

    fn corpus_score(&self, stats: &BleuStatistics) -> f64 {
        self.project(compute_bleu(stats, Smoothing::Exp, false))
    }
}

/// Length of the reference closest to `hyp_len`; ties go to the shorter one.
fn closest_ref_len(hyp_len: usize, refs: &[Vec<String>]) -> usize {
    let mut closest: Option<(usize, usize)> = None;
    for r in refs {
        let diff = hyp_len.abs_diff(r.len());
        closest = match closest {
            Some((best_diff, best_len)) if diff > best_diff || (diff == best_diff && r.len() >= best_len) => {
                Some((best_diff, best_len))
            }
            _ => Some((diff, r.len())),
        };
    }
    closest.map_or(0, |(_, len)| len)
}

/// BLEU using the `tokenizer` option.
pub fn score_bleu(config: &ScorerConfig, corpus: &Corpus<'_>) -> Result<Score> {
    let tokenization = config.extra_args.tokenization("tokenizer")?;
    score_by_statistics(config, corpus, &Bleu::new(tokenization, BleuOutput::Score))
}

/// Brevity penalty using the `bp_tokenizer` option.
pub fn score_bp(config: &ScorerConfig, corpus: &Corpus<'_>) -> Result<Score> {
    let tokenization = config.extra_args.tokenization("bp_tokenizer")?;
    score_by_statistics(
        config,
        corpus,
        &Bleu::new(tokenization, BleuOutput::BrevityPenalty),
    )
}
