//! CIDEr scorer: parallel n-gram extraction, corpus-wide document
//! frequencies, then parallel sentence scoring.

use crate::core::aggregate::averaged_score;
use crate::core::cider::{CiderEngine, ExampleNGrams, CIDER_ORDER};
use crate::core::config::ScorerConfig;
use crate::core::corpus::Corpus;
use crate::core::error::Result;
use crate::core::executor::BatchExecutor;
use crate::core::score::Score;

/// Scores every example against document frequencies of the whole corpus.
///
/// Group scores are means of the sentence scores, which depend on the
/// document frequencies of the full corpus.
pub fn score_cider(config: &ScorerConfig, corpus: &Corpus<'_>) -> Result<Score> {
    let executor = BatchExecutor::new(config, corpus.len());

    let examples: Vec<ExampleNGrams> = executor
        .map_batches(corpus, &config.extra_args, |_, slice, _| {
            Ok(slice
                .examples()
                .map(|(h, refs)| ExampleNGrams::extract(h, &refs, CIDER_ORDER))
                .collect::<Vec<_>>())
        })?
        .into_iter()
        .flatten()
        .collect();

    let engine = CiderEngine::fit(&examples);

    let sent_scores = executor.map_sentences(corpus, &config.extra_args, |_, slice, _| {
        let start = slice.offset();
        Ok(examples[start..start + slice.len()]
            .iter()
            .map(|example| engine.score_example(example))
            .collect())
    })?;

    Ok(averaged_score(config, corpus, sent_scores))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identical_references_score_ten() {
        let sentences = strings(&[
            "the cat sat on the mat",
            "a dog ran in the park",
            "birds fly over the sea today",
            "rain fell all night long",
        ]);
        let refs = vec![sentences.clone()];
        let corpus = Corpus::new(&sentences, &refs, None).unwrap();
        let config = ScorerConfig {
            sent_level: true,
            ..ScorerConfig::default()
        };

        let score = score_cider(&config, &corpus).unwrap();
        assert_eq!(score.corpus_score(), Some(10.0));
        assert_eq!(score.sent_scores(), Some(&[10.0, 10.0, 10.0, 10.0][..]));
    }

    #[test]
    fn test_groups_average_sentence_scores() {
        let hyp = strings(&["the cat sat on the mat", "completely different words here"]);
        let refs = vec![strings(&["the cat sat on the mat", "a dog ran in the park"])];
        let tags = vec![strings(&["good"]), strings(&["bad"])];
        let corpus = Corpus::new(&hyp, &refs, Some(&tags)).unwrap();
        let config = ScorerConfig {
            sent_level: true,
            ..ScorerConfig::default()
        };

        let score = score_cider(&config, &corpus).unwrap();
        let sent = score.sent_scores().unwrap();
        let groups = score.group_scores().unwrap();
        assert_eq!(groups["good"], sent[0]);
        assert_eq!(groups["bad"], 0.0);
    }
}
