//! Translation edit rate: edit distance plus greedy block shifts.

use super::edit_distance::levenshtein;
use super::lru::{LruCache, DEFAULT_CAPACITY};

type TokenPair = (Vec<String>, Vec<String>);

/// Greedy shift search with a memoized edit distance.
///
/// One engine is created per batch task, so the memo is never shared between
/// threads and lives no longer than a single `score` call.
#[derive(Debug)]
pub struct ShiftSearchEngine {
    cache: LruCache<TokenPair, usize>,
}

impl Default for ShiftSearchEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ShiftSearchEngine {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache: LruCache::new(cache_capacity),
        }
    }

    /// Memoized token-level edit distance.
    pub fn edit_distance(&mut self, hypothesis: &[String], reference: &[String]) -> usize {
        let key = (hypothesis.to_vec(), reference.to_vec());
        self.cache
            .get_or_insert_with(key, || levenshtein(hypothesis, reference))
    }

    /// Tries every matching block move once and returns the best one.
    ///
    /// Among candidates sharing the minimal distance the last one generated
    /// wins. Without candidates the current distance and hypothesis are
    /// returned unchanged.
    fn best_shift(&mut self, hypothesis: &[String], reference: &[String]) -> (usize, Vec<String>) {
        let mut best: Option<(usize, Vec<String>)> = None;
        for (h_ofs, r_ofs, length) in matching_runs(hypothesis, reference) {
            let block = &hypothesis[h_ofs..h_ofs + length];
            let mut shifted: Vec<String> = hypothesis[..h_ofs]
                .iter()
                .chain(&hypothesis[h_ofs + length..])
                .cloned()
                .collect();
            let at = r_ofs.min(shifted.len());
            shifted.splice(at..at, block.iter().cloned());

            let n_edits = self.edit_distance(&shifted, reference);
            if best.as_ref().map_or(true, |(best_edits, _)| n_edits <= *best_edits) {
                best = Some((n_edits, shifted));
            }
        }
        match best {
            Some(found) => found,
            None => (
                self.edit_distance(hypothesis, reference),
                hypothesis.to_vec(),
            ),
        }
    }

    /// TER of a hypothesis against one reference.
    ///
    /// Shifts are accepted while they strictly reduce the edit distance. The
    /// result is `(shifts + edits) / len(reference)`.
    pub fn sentence_ter_one_ref(&mut self, hypothesis: &str, reference: &str) -> f64 {
        let mut hyp_tokens: Vec<String> = hypothesis.split_whitespace().map(String::from).collect();
        let ref_tokens: Vec<String> = reference.split_whitespace().map(String::from).collect();

        let mut n_shifts = 0usize;
        let mut prev_edits = self.edit_distance(&hyp_tokens, &ref_tokens);
        loop {
            let (new_edits, new_tokens) = self.best_shift(&hyp_tokens, &ref_tokens);
            if new_edits >= prev_edits {
                break;
            }
            n_shifts += 1;
            prev_edits = new_edits;
            hyp_tokens = new_tokens;
        }
        (n_shifts + prev_edits) as f64 / ref_tokens.len().max(1) as f64
    }

    /// TER against several references: the worst (maximum) score.
    pub fn sentence_ter(&mut self, hypothesis: &str, references: &[&str]) -> f64 {
        references
            .iter()
            .map(|r| self.sentence_ter_one_ref(hypothesis, r))
            .fold(f64::NEG_INFINITY, f64::max)
            .max(0.0)
    }
}

/// Enumerates `(hyp_offset, ref_offset, length)` of maximal common runs that
/// start at a matching token pair on different offsets.
fn matching_runs<'a>(
    hypothesis: &'a [String],
    reference: &'a [String],
) -> impl Iterator<Item = (usize, usize, usize)> + 'a {
    (0..hypothesis.len()).flat_map(move |i1| {
        (0..reference.len()).filter_map(move |i2| {
            if i1 == i2 || hypothesis[i1] != reference[i2] {
                return None;
            }
            let mut length = 1;
            while i1 + length < hypothesis.len()
                && i2 + length < reference.len()
                && hypothesis[i1 + length] == reference[i2 + length]
            {
                length += 1;
            }
            Some((i1, i2, length))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::score::round_score;

    const REF: &str =
        "SAUDI ARABIA denied THIS WEEK information published in the AMERICAN new york times";
    const HYP: &str = "THIS WEEK THE SAUDIS denied information published in the new york times";

    #[test]
    fn test_worked_example() {
        let mut engine = ShiftSearchEngine::default();
        let ter = engine.sentence_ter_one_ref(HYP, REF);
        assert_eq!(round_score(ter), round_score(4.0 / 13.0));
        assert_eq!(round_score(ter), 0.308);
    }

    #[test]
    fn test_identical_is_zero() {
        let mut engine = ShiftSearchEngine::default();
        assert_eq!(engine.sentence_ter_one_ref("a b c", "a b c"), 0.0);
    }

    #[test]
    fn test_shift_counts_once() {
        // moving "a" to the end fixes both positions at the cost of one shift
        let mut engine = ShiftSearchEngine::default();
        let ter = engine.sentence_ter_one_ref("a b c d", "b c d a");
        assert_eq!(ter, 0.25);
    }

    #[test]
    fn test_multi_reference_takes_worst() {
        let mut engine = ShiftSearchEngine::default();
        let ter = engine.sentence_ter("a b c", &["a b c", "x y z"]);
        assert_eq!(ter, 1.0);
    }

    #[test]
    fn test_small_cache_gives_same_result() {
        let mut small = ShiftSearchEngine::new(1);
        let mut large = ShiftSearchEngine::default();
        assert_eq!(
            small.sentence_ter_one_ref(HYP, REF),
            large.sentence_ter_one_ref(HYP, REF)
        );
    }

    #[test]
    fn test_matching_runs_skip_same_offset() {
        let h: Vec<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let r: Vec<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(matching_runs(&h, &r).count(), 0);

        let r: Vec<String> = ["x", "a", "b"].iter().map(|s| s.to_string()).collect();
        let runs: Vec<_> = matching_runs(&h, &r).collect();
        assert_eq!(runs, vec![(0, 1, 2), (1, 2, 1)]);
    }
}
