//! Word error rate and its insertion, deletion and substitution counts.

use crate::core::aggregate::{score_averaged, weighted_score, SentenceMetric};
use crate::core::config::ScorerConfig;
use crate::core::corpus::Corpus;
use crate::core::edit_distance::{multi_reference_wer, WerStats};
use crate::core::error::Result;
use crate::core::executor::BatchExecutor;
use crate::core::score::Score;

/// Which count of the alignment is reported per sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WerComponent {
    Insertions,
    Deletions,
    Substitutions,
}

impl SentenceMetric for WerComponent {
    fn score_sentence(&mut self, hypothesis: &str, references: &[&str]) -> f64 {
        let stats = multi_reference_wer(references, hypothesis);
        let count = match self {
            WerComponent::Insertions => stats.insertions,
            WerComponent::Deletions => stats.deletions,
            WerComponent::Substitutions => stats.substitutions,
        };
        count as f64
    }
}

/// Mean of one edit count per sentence.
pub fn score_wer_component(
    config: &ScorerConfig,
    corpus: &Corpus<'_>,
    component: WerComponent,
) -> Result<Score> {
    score_averaged(config, corpus, |_| Ok(component))
}

/// WER per sentence; the corpus and group scores weight each sentence by its
/// reference length.
pub fn score_wer(config: &ScorerConfig, corpus: &Corpus<'_>) -> Result<Score> {
    let executor = BatchExecutor::new(config, corpus.len());
    let stats: Vec<WerStats> = executor
        .map_batches(corpus, &config.extra_args, |_, slice, _| {
            Ok(slice
                .examples()
                .map(|(h, refs)| multi_reference_wer(&refs, h))
                .collect::<Vec<_>>())
        })?
        .into_iter()
        .flatten()
        .collect();

    let sent_scores: Vec<f64> = stats.iter().map(|s| s.wer).collect();
    let lengths: Vec<f64> = stats.iter().map(|s| s.ref_len as f64).collect();
    Ok(weighted_score(config, corpus, sent_scores, &lengths))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identical_corpus_is_zero() {
        let hyp = strings(&["A B C"]);
        let refs = vec![strings(&["A B C"])];
        let corpus = Corpus::new(&hyp, &refs, None).unwrap();
        let config = ScorerConfig {
            sent_level: true,
            ..ScorerConfig::default()
        };

        assert_eq!(score_wer(&config, &corpus).unwrap().corpus_score(), Some(0.0));
        for component in [
            WerComponent::Insertions,
            WerComponent::Deletions,
            WerComponent::Substitutions,
        ] {
            let score = score_wer_component(&config, &corpus, component).unwrap();
            assert_eq!(score.corpus_score(), Some(0.0));
            assert_eq!(score.sent_scores(), Some(&[0.0][..]));
        }
    }

    #[test]
    fn test_corpus_wer_is_length_weighted() {
        // 1 error over 1 word and 0 errors over 3 words: 100 * 1 / 4
        let hyp = strings(&["x", "a b c"]);
        let refs = vec![strings(&["y", "a b c"])];
        let tags = vec![strings(&["short"]), strings(&["long"])];
        let corpus = Corpus::new(&hyp, &refs, Some(&tags)).unwrap();
        let config = ScorerConfig {
            sent_level: true,
            ..ScorerConfig::default()
        };

        let score = score_wer(&config, &corpus).unwrap();
        assert_eq!(score.corpus_score(), Some(25.0));
        assert_eq!(score.sent_scores(), Some(&[100.0, 0.0][..]));
        let groups = score.group_scores().unwrap();
        assert_eq!(groups["short"], 100.0);
        assert_eq!(groups["long"], 0.0);
    }

    #[test]
    fn test_component_counts() {
        let hyp = strings(&["a x c d e"]);
        let refs = vec![strings(&["a b c d"])];
        let corpus = Corpus::new(&hyp, &refs, None).unwrap();
        let config = ScorerConfig::default();

        let ins = score_wer_component(&config, &corpus, WerComponent::Insertions).unwrap();
        let sub = score_wer_component(&config, &corpus, WerComponent::Substitutions).unwrap();
        let del = score_wer_component(&config, &corpus, WerComponent::Deletions).unwrap();
        assert_eq!(ins.corpus_score(), Some(1.0));
        assert_eq!(sub.corpus_score(), Some(1.0));
        assert_eq!(del.corpus_score(), Some(0.0));
    }
}
