//! Score results returned by every metric.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Number of decimal digits kept in every returned number.
pub const PRECISION: i32 = 3;

/// Rounds half-to-even at [`PRECISION`] decimal digits.
pub fn round_score(x: f64) -> f64 {
    let scale = 10f64.powi(PRECISION);
    (x * scale).round_ties_even() / scale
}

/// Result of scoring one corpus with one metric.
///
/// All numbers are rounded on construction. `sent_scores`, when present, is
/// index-aligned with the corpus; `group_scores` has one entry per distinct tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    corpus_score: Option<f64>,
    sent_scores: Option<Vec<f64>>,
    group_scores: Option<BTreeMap<String, f64>>,
}

impl Score {
    /// Builds a score, rounding every component.
    ///
    /// # Arguments
    /// * `corpus_score` - Corpus-level value, if requested
    /// * `sent_scores` - Per-example values in corpus order, if requested
    /// * `group_scores` - Per-tag values, if tags were supplied
    pub fn new(
        corpus_score: Option<f64>,
        sent_scores: Option<Vec<f64>>,
        group_scores: Option<BTreeMap<String, f64>>,
    ) -> Self {
        Self {
            corpus_score: corpus_score.map(round_score),
            sent_scores: sent_scores.map(|s| s.into_iter().map(round_score).collect()),
            group_scores: group_scores
                .map(|g| g.into_iter().map(|(k, v)| (k, round_score(v))).collect()),
        }
    }

    pub fn corpus_score(&self) -> Option<f64> {
        self.corpus_score
    }

    pub fn sent_scores(&self) -> Option<&[f64]> {
        self.sent_scores.as_deref()
    }

    pub fn group_scores(&self) -> Option<&BTreeMap<String, f64>> {
        self.group_scores.as_ref()
    }

    /// Serializes the score as a JSON object.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_score(4.0 / 13.0), 0.308);
        assert_eq!(round_score(0.0), 0.0);
        assert_eq!(round_score(12.3456), 12.346);
        assert_eq!(round_score(-1.0004), -1.0);
        // exact ties go to the even neighbour
        assert_eq!(round_score(1.0625), 1.062);
        assert_eq!(round_score(1.1875), 1.188);
    }

    #[test]
    fn test_score_rounds_every_component() {
        let mut groups = BTreeMap::new();
        groups.insert("news".to_string(), 1.0 / 3.0);
        let score = Score::new(Some(2.0 / 3.0), Some(vec![0.12345, 0.9999]), Some(groups));

        assert_eq!(score.corpus_score(), Some(0.667));
        assert_eq!(score.sent_scores(), Some(&[0.123, 1.0][..]));
        assert_eq!(score.group_scores().unwrap()["news"], 0.333);
    }

    #[test]
    fn test_empty_score_serializes_nulls() {
        let score = Score::new(None, None, None);
        let json = score.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"corpus_score":null,"sent_scores":null,"group_scores":null}"#
        );
    }
}
