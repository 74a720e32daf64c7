//! METEOR with exact word matching.

use crate::core::aggregate::{score_averaged, SentenceMetric};
use crate::core::config::ScorerConfig;
use crate::core::corpus::Corpus;
use crate::core::error::Result;
use crate::core::score::Score;

#[derive(Debug, Clone, Copy)]
pub struct Meteor {
    /// Precision/recall balance of the harmonic mean
    pub alpha: f64,
    /// Fragmentation exponent
    pub beta: f64,
    /// Maximum fragmentation penalty
    pub gamma: f64,
}

impl Default for Meteor {
    fn default() -> Self {
        Self {
            alpha: 0.9,
            beta: 3.0,
            gamma: 0.5,
        }
    }
}

/// Aligns lowercased words exactly, scanning both sequences from the end.
///
/// Returns `(hyp_index, ref_index)` pairs sorted by hypothesis index.
pub fn align_exact(hypothesis: &[String], reference: &[String]) -> Vec<(usize, usize)> {
    let mut hyp: Vec<(usize, &str)> = hypothesis.iter().map(String::as_str).enumerate().collect();
    let mut reference: Vec<(usize, &str)> = reference.iter().map(String::as_str).enumerate().collect();
    let mut matches = Vec::new();

    for i in (0..hyp.len()).rev() {
        if let Some(j) = (0..reference.len()).rev().find(|&j| hyp[i].1 == reference[j].1) {
            matches.push((hyp[i].0, reference[j].0));
            hyp.remove(i);
            reference.remove(j);
        }
    }
    matches.sort_by_key(|&(h, _)| h);
    matches
}

/// Number of runs of matches that are contiguous on both sides.
pub fn count_chunks(matches: &[(usize, usize)]) -> usize {
    if matches.is_empty() {
        return 0;
    }
    1 + matches
        .windows(2)
        .filter(|w| !(w[1].0 == w[0].0 + 1 && w[1].1 == w[0].1 + 1))
        .count()
}

impl Meteor {
    pub fn single_reference(&self, hypothesis: &str, reference: &str) -> f64 {
        let hyp: Vec<String> = hypothesis.to_lowercase().split_whitespace().map(String::from).collect();
        let reference: Vec<String> = reference.to_lowercase().split_whitespace().map(String::from).collect();

        let matches = align_exact(&hyp, &reference);
        let matches_count = matches.len() as f64;
        if matches_count == 0.0 || hyp.is_empty() || reference.is_empty() {
            return 0.0;
        }

        let precision = matches_count / hyp.len() as f64;
        let recall = matches_count / reference.len() as f64;
        let denominator = self.alpha * precision + (1.0 - self.alpha) * recall;
        if denominator == 0.0 {
            return 0.0;
        }
        let fmean = precision * recall / denominator;
        let frag_frac = count_chunks(&matches) as f64 / matches_count;
        let penalty = self.gamma * frag_frac.powf(self.beta);
        (1.0 - penalty) * fmean
    }
}

impl SentenceMetric for Meteor {
    fn score_sentence(&mut self, hypothesis: &str, references: &[&str]) -> f64 {
        references
            .iter()
            .map(|r| self.single_reference(hypothesis, r))
            .fold(0.0, f64::max)
    }
}

pub fn score_meteor(config: &ScorerConfig, corpus: &Corpus<'_>) -> Result<Score> {
    score_averaged(config, corpus, |_| Ok(Meteor::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_alignment_from_the_end() {
        let matches = align_exact(&toks("a b a"), &toks("a c a"));
        assert_eq!(matches, vec![(0, 0), (2, 2)]);
    }

    #[test]
    fn test_count_chunks() {
        assert_eq!(count_chunks(&[]), 0);
        assert_eq!(count_chunks(&[(0, 0), (1, 1), (2, 2)]), 1);
        assert_eq!(count_chunks(&[(0, 2), (1, 0), (2, 1)]), 2);
    }

    #[test]
    fn test_identical_sentence() {
        let meteor = Meteor::default();
        // one chunk over 4 matches: penalty 0.5 * (1/4)^3
        let expected = 1.0 - 0.5 * 0.25f64.powi(3);
        assert_relative_eq!(meteor.single_reference("The cat sat down", "the cat sat down"), expected);
    }

    #[test]
    fn test_no_match_is_zero() {
        let mut meteor = Meteor::default();
        assert_eq!(meteor.score_sentence("x y", &["a b"]), 0.0);
        assert_eq!(meteor.score_sentence("", &["a b"]), 0.0);
    }

    #[test]
    fn test_best_reference() {
        let mut meteor = Meteor::default();
        let best = meteor.score_sentence("a b c", &["x y z", "a b c"]);
        assert_relative_eq!(best, meteor.single_reference("a b c", "a b c"));
    }
}
