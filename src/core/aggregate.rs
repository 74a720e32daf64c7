//! Turning per-example and per-batch results into corpus and group scores.

use std::collections::BTreeMap;

use super::config::{ExtraArgs, ScorerConfig};
use super::corpus::Corpus;
use super::error::Result;
use super::executor::BatchExecutor;
use super::score::Score;

/// A metric scored one example at a time. Built fresh inside every batch
/// task, so per-task state such as memo tables needs no synchronization.
pub trait SentenceMetric {
    fn score_sentence(&mut self, hypothesis: &str, references: &[&str]) -> f64;
}

/// Additive sufficient statistics.
pub trait CorpusStatistics: Default + Clone + Send {
    /// Adds `other` element-wise into `self`.
    fn merge(&mut self, other: &Self);
}

/// A metric whose corpus score is a closed form over summed statistics.
pub trait StatisticMetric: Sync {
    type Stats: CorpusStatistics;

    fn sentence_statistics(&self, hypothesis: &str, references: &[&str]) -> Self::Stats;

    /// Score of a single example from its own statistics.
    fn sentence_score(&self, stats: &Self::Stats) -> f64;

    /// Score of a corpus from its summed statistics.
    fn corpus_score(&self, stats: &Self::Stats) -> f64;
}

/// Arithmetic mean summed in index order. Empty input gives 0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// `Σ value·weight / Σ weight`, summed in index order. Zero total weight gives 0.
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    values.iter().zip(weights).map(|(v, w)| v * w).sum::<f64>() / total
}

/// Group means over `values` for every distinct tag.
pub fn group_means(corpus: &Corpus<'_>, values: &[f64]) -> Option<BTreeMap<String, f64>> {
    group_by_tag(corpus, |indices| {
        let selected: Vec<f64> = indices.iter().map(|&i| values[i]).collect();
        Ok(mean(&selected))
    })
    .ok()
    .flatten()
}

/// Applies `f` to the ascending index list of every distinct tag.
pub fn group_by_tag<F>(corpus: &Corpus<'_>, mut f: F) -> Result<Option<BTreeMap<String, f64>>>
where
    F: FnMut(&[usize]) -> Result<f64>,
{
    let Some(tag_set) = corpus.tag_set() else {
        return Ok(None);
    };
    let mut groups = BTreeMap::new();
    for tag in tag_set {
        let indices = corpus.indices_with_tag(tag);
        groups.insert(tag.to_string(), f(&indices)?);
    }
    Ok(Some(groups))
}

/// Assembles a mean-family [`Score`] from index-aligned sentence scores.
pub fn averaged_score(config: &ScorerConfig, corpus: &Corpus<'_>, sent_scores: Vec<f64>) -> Score {
    let corpus_score = config.corpus_level.then(|| mean(&sent_scores));
    let group_scores = group_means(corpus, &sent_scores);
    let sent_scores = config.sent_level.then_some(sent_scores);
    Score::new(corpus_score, sent_scores, group_scores)
}

/// Assembles a length-weighted [`Score`]; each group is weighted by its own
/// examples only.
pub fn weighted_score(
    config: &ScorerConfig,
    corpus: &Corpus<'_>,
    sent_scores: Vec<f64>,
    weights: &[f64],
) -> Score {
    let corpus_score = config
        .corpus_level
        .then(|| weighted_mean(&sent_scores, weights));
    let group_scores = group_by_tag(corpus, |indices| {
        let values: Vec<f64> = indices.iter().map(|&i| sent_scores[i]).collect();
        let w: Vec<f64> = indices.iter().map(|&i| weights[i]).collect();
        Ok(weighted_mean(&values, &w))
    })
    .ok()
    .flatten();
    let sent_scores = config.sent_level.then_some(sent_scores);
    Score::new(corpus_score, sent_scores, group_scores)
}

/// Scores a mean-family metric: one fresh metric per batch, then averaged.
///
/// # Arguments
/// * `config` - Scorer configuration
/// * `corpus` - Validated corpus
/// * `build` - Creates the metric inside a task from its copy of the options
pub fn score_averaged<M, B>(config: &ScorerConfig, corpus: &Corpus<'_>, build: B) -> Result<Score>
where
    M: SentenceMetric,
    B: Fn(&ExtraArgs) -> Result<M> + Sync,
{
    let sent_scores = sentence_scores(config, corpus, build)?;
    Ok(averaged_score(config, corpus, sent_scores))
}

/// Index-aligned per-example scores of a [`SentenceMetric`].
pub fn sentence_scores<M, B>(config: &ScorerConfig, corpus: &Corpus<'_>, build: B) -> Result<Vec<f64>>
where
    M: SentenceMetric,
    B: Fn(&ExtraArgs) -> Result<M> + Sync,
{
    let executor = BatchExecutor::new(config, corpus.len());
    executor.map_sentences(corpus, &config.extra_args, |_, slice, args| {
        let mut metric = build(args)?;
        Ok(slice
            .examples()
            .map(|(h, refs)| metric.score_sentence(h, &refs))
            .collect())
    })
}

/// Sums the statistics of every example, batch by batch, in batch order.
pub fn accumulate_statistics<M: StatisticMetric>(
    config: &ScorerConfig,
    corpus: &Corpus<'_>,
    metric: &M,
) -> Result<M::Stats> {
    let executor = BatchExecutor::new(config, corpus.len());
    let partials = executor.map_batches(corpus, &config.extra_args, |_, slice, _| {
        let mut acc = M::Stats::default();
        for (h, refs) in slice.examples() {
            acc.merge(&metric.sentence_statistics(h, &refs));
        }
        Ok(acc)
    })?;
    let mut total = M::Stats::default();
    for partial in &partials {
        total.merge(partial);
    }
    Ok(total)
}

/// Scores a sufficient-statistic metric.
///
/// The closed form is applied once to the summed statistics. Each tag group
/// re-runs the accumulation from scratch over its own examples.
pub fn score_by_statistics<M: StatisticMetric>(
    config: &ScorerConfig,
    corpus: &Corpus<'_>,
    metric: &M,
) -> Result<Score> {
    let sent_scores = if config.sent_level {
        let executor = BatchExecutor::new(config, corpus.len());
        Some(executor.map_sentences(corpus, &config.extra_args, |_, slice, _| {
            Ok(slice
                .examples()
                .map(|(h, refs)| metric.sentence_score(&metric.sentence_statistics(h, &refs)))
                .collect())
        })?)
    } else {
        None
    };

    let corpus_score = if config.corpus_level {
        let stats = accumulate_statistics(config, corpus, metric)?;
        Some(metric.corpus_score(&stats))
    } else {
        None
    };

    let group_scores = group_by_tag(corpus, |indices| {
        let subset = corpus.select(indices);
        let stats = accumulate_statistics(config, &subset.as_corpus()?, metric)?;
        Ok(metric.corpus_score(&stats))
    })?;

    Ok(Score::new(corpus_score, sent_scores, group_scores))
}
