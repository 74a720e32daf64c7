//! N-gram counting shared by the n-gram based metrics.

use std::collections::BTreeMap;

/// Counts of n-grams borrowed from a token slice.
pub type NGramCounts<'a, T> = BTreeMap<&'a [T], usize>;

/// Counts all n-grams of exactly order `n`.
pub fn count_ngrams<T: Ord>(tokens: &[T], n: usize) -> NGramCounts<'_, T> {
    let mut counts = BTreeMap::new();
    if n == 0 || tokens.len() < n {
        return counts;
    }
    for window in tokens.windows(n) {
        *counts.entry(window).or_insert(0) += 1;
    }
    counts
}

/// Counts all n-grams with order in `min_n..=max_n`.
pub fn count_ngrams_range<T: Ord>(tokens: &[T], min_n: usize, max_n: usize) -> NGramCounts<'_, T> {
    let mut counts = BTreeMap::new();
    for n in min_n.max(1)..=max_n.min(tokens.len()) {
        for window in tokens.windows(n) {
            *counts.entry(window).or_insert(0) += 1;
        }
    }
    counts
}

/// Number of n-grams of `hyp` also found in `reference`, clipped by the
/// reference counts.
pub fn clipped_overlap<T: Ord>(hyp: &NGramCounts<'_, T>, reference: &NGramCounts<'_, T>) -> usize {
    hyp.iter()
        .map(|(ngram, &count)| count.min(reference.get(ngram).copied().unwrap_or(0)))
        .sum()
}

/// Total number of n-grams in a count table.
pub fn total<T>(counts: &NGramCounts<'_, T>) -> usize {
    counts.values().sum()
}
