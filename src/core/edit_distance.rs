//! Word-level Levenshtein alignment with backtrace.

/// Edit operation recorded at one DP cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Correct,
    Substitution,
    Insertion,
    Deletion,
}

/// Word error statistics of a hypothesis against a reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WerStats {
    /// Word error rate in percent
    pub wer: f64,
    pub insertions: usize,
    pub deletions: usize,
    pub substitutions: usize,
    /// Number of reference tokens
    pub ref_len: usize,
}

/// Aligns `hypothesis` to `reference` with unit costs and counts edits.
///
/// At every cell the diagonal move (match or substitution) is taken first and
/// is only replaced by an insertion, then a deletion, when strictly cheaper.
///
/// # Arguments
/// * `reference` - Reference tokens
/// * `hypothesis` - Hypothesis tokens
///
/// # Returns
/// Substitution, insertion and deletion counts recovered by backtrace
pub fn word_error_stats<S: AsRef<str>>(reference: &[S], hypothesis: &[S]) -> WerStats {
    let len_r = reference.len();
    let len_h = hypothesis.len();

    let mut edits = vec![vec![0usize; len_h + 1]; len_r + 1];
    let mut ops = vec![vec![Operation::Correct; len_h + 1]; len_r + 1];
    for i in 1..=len_r {
        edits[i][0] = i;
        ops[i][0] = Operation::Deletion;
    }
    for j in 1..=len_h {
        edits[0][j] = j;
        ops[0][j] = Operation::Insertion;
    }

    for i in 1..=len_r {
        for j in 1..=len_h {
            if reference[i - 1].as_ref() == hypothesis[j - 1].as_ref() {
                edits[i][j] = edits[i - 1][j - 1];
                ops[i][j] = Operation::Correct;
            } else {
                edits[i][j] = edits[i - 1][j - 1] + 1;
                ops[i][j] = Operation::Substitution;
            }
            if edits[i][j - 1] + 1 < edits[i][j] {
                edits[i][j] = edits[i][j - 1] + 1;
                ops[i][j] = Operation::Insertion;
            }
            if edits[i - 1][j] + 1 < edits[i][j] {
                edits[i][j] = edits[i - 1][j] + 1;
                ops[i][j] = Operation::Deletion;
            }
        }
    }

    let (mut i, mut j) = (len_r, len_h);
    let (mut n_sub, mut n_ins, mut n_del) = (0, 0, 0);
    while i > 0 || j > 0 {
        match ops[i][j] {
            Operation::Correct => {
                i -= 1;
                j -= 1;
            }
            Operation::Substitution => {
                n_sub += 1;
                i -= 1;
                j -= 1;
            }
            Operation::Insertion => {
                n_ins += 1;
                j -= 1;
            }
            Operation::Deletion => {
                n_del += 1;
                i -= 1;
            }
        }
    }

    WerStats {
        wer: 100.0 * (n_sub + n_del + n_ins) as f64 / len_r.max(1) as f64,
        insertions: n_ins,
        deletions: n_del,
        substitutions: n_sub,
        ref_len: len_r,
    }
}

/// Scores one hypothesis against several references.
///
/// Each statistic (including the reference length) is the minimum across
/// references, taken independently of the others.
pub fn multi_reference_wer(references: &[&str], hypothesis: &str) -> WerStats {
    let hyp: Vec<&str> = hypothesis.split_whitespace().collect();
    references
        .iter()
        .map(|r| {
            let r: Vec<&str> = r.split_whitespace().collect();
            word_error_stats(&r, &hyp)
        })
        .reduce(|a, b| WerStats {
            wer: a.wer.min(b.wer),
            insertions: a.insertions.min(b.insertions),
            deletions: a.deletions.min(b.deletions),
            substitutions: a.substitutions.min(b.substitutions),
            ref_len: a.ref_len.min(b.ref_len),
        })
        .unwrap_or_else(|| word_error_stats::<&str>(&[], &hyp))
}

/// Plain Levenshtein distance over tokens, two-row DP.
pub fn levenshtein<T: PartialEq>(s: &[T], t: &[T]) -> usize {
    let mut prev: Vec<usize> = (0..=t.len()).collect();
    let mut cur = vec![0usize; t.len() + 1];
    for i in 1..=s.len() {
        cur[0] = i;
        for j in 1..=t.len() {
            let sub = usize::from(s[i - 1] != t[j - 1]);
            cur[j] = (prev[j] + 1).min(cur[j - 1] + 1).min(prev[j - 1] + sub);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[t.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }

    #[test]
    fn test_identical_sentences() {
        let stats = word_error_stats(&toks("A B C"), &toks("A B C"));
        assert_eq!(stats.wer, 0.0);
        assert_eq!(stats.insertions, 0);
        assert_eq!(stats.deletions, 0);
        assert_eq!(stats.substitutions, 0);
        assert_eq!(stats.ref_len, 3);
    }

    #[test]
    fn test_counts_each_operation() {
        let stats = word_error_stats(&toks("A B C D"), &toks("A X C D E"));
        assert_eq!(stats.substitutions, 1);
        assert_eq!(stats.insertions, 1);
        assert_eq!(stats.deletions, 0);
        assert_eq!(stats.wer, 50.0);

        let stats = word_error_stats(&toks("A B C"), &toks("A C"));
        assert_eq!(stats.deletions, 1);
        assert_eq!(stats.substitutions, 0);
        assert!((stats.wer - 100.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_diagonal_wins_ties() {
        // two substitutions and insertion+deletion cost the same
        let stats = word_error_stats(&toks("a b"), &toks("b a"));
        assert_eq!(stats.substitutions, 2);
        assert_eq!(stats.insertions, 0);
        assert_eq!(stats.deletions, 0);
        assert_eq!(stats.wer, 100.0);
    }

    #[test]
    fn test_insertion_wins_over_deletion() {
        // preferring deletion here would attribute 2 insertions + 1 deletion
        let stats = word_error_stats(&toks("a b a"), &toks("b c a b"));
        assert_eq!(stats.substitutions, 2);
        assert_eq!(stats.insertions, 1);
        assert_eq!(stats.deletions, 0);
        assert_eq!(stats.wer, 100.0);
    }

    #[test]
    fn test_empty_hypothesis_is_all_deletions() {
        let stats = word_error_stats(&toks("A B"), &toks(""));
        assert_eq!(stats.deletions, 2);
        assert_eq!(stats.wer, 100.0);
    }

    #[test]
    fn test_multi_reference_takes_independent_minimum() {
        // ref 1: one substitution, ref 2: two insertions
        let stats = multi_reference_wer(&["A B X", "A"], "A B C");
        assert_eq!(stats.substitutions, 0);
        assert_eq!(stats.insertions, 0);
        assert_eq!(stats.ref_len, 1);
        assert!((stats.wer - 100.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein(&toks("a b c"), &toks("a b c")), 0);
        assert_eq!(levenshtein(&toks("a b c"), &toks("c b a")), 2);
        assert_eq!(levenshtein(&toks(""), &toks("x y")), 2);
        assert_eq!(levenshtein(&toks("x y z"), &toks("")), 3);
    }
}
