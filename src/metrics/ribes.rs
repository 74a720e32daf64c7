//! RIBES: rank correlation of aligned word positions.

use crate::core::aggregate::{score_averaged, SentenceMetric};
use crate::core::config::ScorerConfig;
use crate::core::corpus::Corpus;
use crate::core::error::Result;
use crate::core::score::Score;

pub const RIBES_ALPHA: f64 = 0.25;
pub const RIBES_BETA: f64 = 0.10;

#[derive(Debug, Clone, Copy)]
pub struct Ribes {
    pub alpha: f64,
    pub beta: f64,
}

impl Default for Ribes {
    fn default() -> Self {
        Self {
            alpha: RIBES_ALPHA,
            beta: RIBES_BETA,
        }
    }
}

fn occurrences(sentence: &[&str], ngram: &[&str]) -> usize {
    if ngram.is_empty() || ngram.len() > sentence.len() {
        return 0;
    }
    sentence.windows(ngram.len()).filter(|w| *w == ngram).count()
}

fn position_of(sentence: &[&str], ngram: &[&str]) -> Option<usize> {
    if ngram.len() > sentence.len() {
        return None;
    }
    sentence.windows(ngram.len()).position(|w| w == ngram)
}

/// Reference positions of hypothesis words that can be aligned unambiguously.
///
/// A word occurring exactly once on both sides aligns directly. Otherwise the
/// context is widened to the right, then the left, until an n-gram occurs
/// exactly once in both sentences.
pub fn word_rank_alignment(reference: &[&str], hypothesis: &[&str]) -> Vec<usize> {
    let hyp_len = hypothesis.len();
    let mut worder = Vec::new();

    for (i, h_word) in hypothesis.iter().enumerate() {
        if !reference.contains(h_word) {
            continue;
        }
        let in_hyp = hypothesis.iter().filter(|w| *w == h_word).count();
        let in_ref = reference.iter().filter(|w| *w == h_word).count();
        if in_hyp == 1 && in_ref == 1 {
            if let Some(pos) = reference.iter().position(|w| w == h_word) {
                worder.push(pos);
            }
            continue;
        }

        let max_window_size = i.max(hyp_len - i + 1);
        for window in 1..max_window_size {
            if i + window < hyp_len {
                let right = &hypothesis[i..=i + window];
                if occurrences(reference, right) == 1 && occurrences(hypothesis, right) == 1 {
                    if let Some(pos) = position_of(reference, right) {
                        worder.push(pos);
                        break;
                    }
                }
            }
            if window <= i {
                let left = &hypothesis[i - window..=i];
                if occurrences(reference, left) == 1 && occurrences(hypothesis, left) == 1 {
                    if let Some(pos) = position_of(reference, left) {
                        worder.push(pos + left.len() - 1);
                        break;
                    }
                }
            }
        }
    }
    worder
}

/// Lengths of maximal runs where each position is one more than the last.
fn increasing_runs(worder: &[usize]) -> Vec<usize> {
    let mut runs = Vec::new();
    let mut current = 1;
    for pair in worder.windows(2) {
        if pair[0] + 1 == pair[1] {
            current += 1;
        } else {
            if current > 1 {
                runs.push(current);
            }
            current = 1;
        }
    }
    if current > 1 {
        runs.push(current);
    }
    runs
}

fn choose2(n: usize) -> f64 {
    (n * n.saturating_sub(1)) as f64 / 2.0
}

/// Normalized Kendall's tau in `[0, 1]`; fewer than two aligned words give 0.
pub fn kendall_tau(worder: &[usize]) -> f64 {
    let tau = if worder.len() < 2 {
        -1.0
    } else {
        let increasing: f64 = increasing_runs(worder).into_iter().map(choose2).sum();
        2.0 * increasing / choose2(worder.len()) - 1.0
    };
    (tau + 1.0) / 2.0
}

impl SentenceMetric for Ribes {
    fn score_sentence(&mut self, hypothesis: &str, references: &[&str]) -> f64 {
        let hyp: Vec<&str> = hypothesis.split_whitespace().collect();
        if hyp.is_empty() {
            return 0.0;
        }
        let mut best = -1.0f64;
        for reference in references {
            let reference: Vec<&str> = reference.split_whitespace().collect();
            let worder = word_rank_alignment(&reference, &hyp);
            let nkt = kendall_tau(&worder);
            let bp = (1.0 - reference.len() as f64 / hyp.len() as f64).exp().min(1.0);
            let p1 = worder.len() as f64 / hyp.len() as f64;
            let ribes = nkt * p1.powf(self.alpha) * bp.powf(self.beta);
            if ribes > best {
                best = ribes;
            }
        }
        best.max(0.0)
    }
}

pub fn score_ribes(config: &ScorerConfig, corpus: &Corpus<'_>) -> Result<Score> {
    score_averaged(config, corpus, |_| Ok(Ribes::default()))
}
