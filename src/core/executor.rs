//! Ordered batch execution over a worker pool.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;

use indicatif::{ProgressBar, ProgressStyle};

use super::config::{ExtraArgs, ScorerConfig};
use super::corpus::{Corpus, CorpusSlice};
use super::error::{Result, ScoreError};

/// Examples assigned to one worker when the pool size is derived from the corpus.
pub const SAMPLES_PER_WORKER: usize = 1000;

/// A contiguous range of examples `[start, end)` and its position in the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Resolves the worker count.
///
/// An explicit request wins, otherwise one worker per [`SAMPLES_PER_WORKER`]
/// examples (or 2 when the corpus size is unknown). The result is clamped to
/// `[1, cpus - 1]`.
pub fn resolve_workers(requested: Option<usize>, n_samples: Option<usize>, cpus: usize) -> usize {
    let wanted = match (requested, n_samples) {
        (Some(n), _) => n,
        (None, Some(n)) => n.div_ceil(SAMPLES_PER_WORKER),
        (None, None) => 2,
    };
    wanted.min(cpus.saturating_sub(1)).max(1)
}

/// Splits `n_samples` into contiguous `ceil(n / n_batches)`-sized batches.
pub fn plan_batches(n_samples: usize, n_batches: usize) -> Vec<Batch> {
    let size = n_samples.div_ceil(n_batches.max(1));
    if size == 0 {
        return Vec::new();
    }
    (0..n_samples)
        .step_by(size)
        .enumerate()
        .map(|(index, start)| Batch {
            index,
            start,
            end: (start + size).min(n_samples),
        })
        .collect()
}

/// Runs a metric function over ordered batches, serially or on a thread pool.
#[derive(Debug, Clone)]
pub struct BatchExecutor {
    n_workers: usize,
    verbose: bool,
}

impl BatchExecutor {
    /// Sizes the pool from the configuration and the corpus size.
    pub fn new(config: &ScorerConfig, n_samples: usize) -> Self {
        let cpus = config.available_cpus.unwrap_or_else(num_cpus::get);
        let n_workers = resolve_workers(config.n_workers, Some(n_samples), cpus);
        tracing::debug!(
            n_samples,
            cpus,
            requested = ?config.n_workers,
            n_workers,
            "resolved worker count"
        );
        Self {
            n_workers,
            verbose: config.verbose,
        }
    }

    /// Uses exactly `n_workers` workers, bypassing the CPU clamp.
    pub fn with_workers(n_workers: usize, verbose: bool) -> Self {
        Self {
            n_workers: n_workers.max(1),
            verbose,
        }
    }

    pub fn n_workers(&self) -> usize {
        self.n_workers
    }

    /// Applies `f` to every batch and returns the results in batch order.
    ///
    /// With a single worker `f` runs synchronously on the whole corpus.
    /// Otherwise each batch becomes one pool task receiving its own slice and
    /// a copy of `extra_args`. All tasks run to completion; if any failed, the
    /// failure of the lowest batch index is returned and no result is.
    ///
    /// # Arguments
    /// * `corpus` - Validated corpus
    /// * `extra_args` - Metric options copied into each task
    /// * `f` - Metric function for one batch
    pub fn map_batches<T, F>(
        &self,
        corpus: &Corpus<'_>,
        extra_args: &ExtraArgs,
        f: F,
    ) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(&Batch, CorpusSlice<'_>, &ExtraArgs) -> Result<T> + Sync,
    {
        let n_samples = corpus.len();
        if self.n_workers == 1 {
            let batch = Batch {
                index: 0,
                start: 0,
                end: n_samples,
            };
            let result = guarded(|| f(&batch, corpus.full(), extra_args))
                .map_err(|e| ScoreError::in_batch(batch.index, e))?;
            return Ok(vec![result]);
        }

        let batches = plan_batches(n_samples, self.n_workers);
        tracing::debug!(
            n_workers = self.n_workers,
            n_batches = batches.len(),
            "dispatching batches"
        );

        let progress = self.progress_bar(batches.len());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.n_workers)
            .build()?;

        let (tx, rx) = mpsc::channel();
        pool.scope(|s| {
            for batch in &batches {
                let tx = tx.clone();
                let f = &f;
                let progress = &progress;
                let slice = corpus.slice(batch);
                let args = extra_args.clone();
                s.spawn(move |_| {
                    let result = guarded(|| f(batch, slice, &args));
                    progress.inc(1);
                    // the receiver outlives the scope
                    let _ = tx.send((batch.index, result));
                });
            }
        });
        drop(tx);
        progress.finish_and_clear();

        let finished: BTreeMap<usize, Result<T>> = rx.into_iter().collect();
        let mut results = Vec::with_capacity(finished.len());
        for (index, result) in finished {
            match result {
                Ok(value) => results.push(value),
                Err(e) => {
                    tracing::warn!(batch = index, error = %e, "batch failed");
                    return Err(ScoreError::in_batch(index, e));
                }
            }
        }
        Ok(results)
    }

    /// Like [`map_batches`](Self::map_batches) for per-example scores,
    /// concatenated into one index-aligned vector.
    pub fn map_sentences<F>(
        &self,
        corpus: &Corpus<'_>,
        extra_args: &ExtraArgs,
        f: F,
    ) -> Result<Vec<f64>>
    where
        F: Fn(&Batch, CorpusSlice<'_>, &ExtraArgs) -> Result<Vec<f64>> + Sync,
    {
        let scores: Vec<f64> = self
            .map_batches(corpus, extra_args, f)?
            .into_iter()
            .flatten()
            .collect();
        if scores.len() != corpus.len() {
            return Err(ScoreError::InvalidInput(format!(
                "metric returned {} scores for {} examples",
                scores.len(),
                corpus.len()
            )));
        }
        Ok(scores)
    }

    fn progress_bar(&self, n_batches: usize) -> ProgressBar {
        if !self.verbose {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(n_batches as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb.set_message("batches");
        pb
    }
}

/// Runs `f`, turning a panic into [`ScoreError::Panicked`].
fn guarded<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(ScoreError::Panicked(panic_message(payload))))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ScorerConfigBuilder;
    use std::time::Duration;

    fn corpus_of(n: usize) -> (Vec<String>, Vec<Vec<String>>) {
        let hyp: Vec<String> = (0..n).map(|i| i.to_string()).collect();
        let refs = vec![hyp.clone()];
        (hyp, refs)
    }

    #[test]
    fn test_resolve_workers() {
        assert_eq!(resolve_workers(None, Some(2500), 16), 3);
        assert_eq!(resolve_workers(None, Some(10), 16), 1);
        assert_eq!(resolve_workers(None, None, 16), 2);
        assert_eq!(resolve_workers(Some(8), Some(10), 4), 3);
        assert_eq!(resolve_workers(Some(8), None, 1), 1);
        assert_eq!(resolve_workers(Some(4), None, 0), 1);
    }

    #[test]
    fn test_cpu_override_sizes_pool() {
        let config = ScorerConfigBuilder::new()
            .n_workers(4)
            .available_cpus(16)
            .build()
            .unwrap();
        assert_eq!(BatchExecutor::new(&config, 57).n_workers(), 4);

        let config = ScorerConfigBuilder::new()
            .n_workers(4)
            .available_cpus(2)
            .build()
            .unwrap();
        assert_eq!(BatchExecutor::new(&config, 57).n_workers(), 1);
    }

    #[test]
    fn test_plan_batches() {
        let plan = plan_batches(10, 3);
        assert_eq!(plan.len(), 3);
        assert_eq!((plan[0].start, plan[0].end), (0, 4));
        assert_eq!((plan[1].start, plan[1].end), (4, 8));
        assert_eq!((plan[2].start, plan[2].end), (8, 10));
        assert_eq!(plan.iter().map(Batch::len).sum::<usize>(), 10);

        // fewer batches than workers when the corpus is small
        let plan = plan_batches(5, 4);
        assert_eq!(plan.len(), 3);
        assert!(plan_batches(0, 4).is_empty());
    }

    #[test]
    fn test_serial_runs_whole_corpus_once() {
        let (hyp, refs) = corpus_of(7);
        let corpus = Corpus::new(&hyp, &refs, None).unwrap();
        let executor = BatchExecutor::with_workers(1, false);

        let batches = executor
            .map_batches(&corpus, &ExtraArgs::new(), |batch, slice, _| Ok((*batch, slice.len())))
            .unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].0.index, 0);
        assert_eq!(batches[0].1, 7);
    }

    #[test]
    fn test_reassembles_in_batch_order() {
        let (hyp, refs) = corpus_of(12);
        let corpus = Corpus::new(&hyp, &refs, None).unwrap();
        let executor = BatchExecutor::with_workers(4, false);

        // early batches finish last
        let scores = executor
            .map_sentences(&corpus, &ExtraArgs::new(), |batch, slice, _| {
                std::thread::sleep(Duration::from_millis(10 * (4 - batch.index as u64)));
                Ok(slice
                    .hypothesis()
                    .iter()
                    .map(|h| h.parse::<f64>().unwrap_or(-1.0))
                    .collect())
            })
            .unwrap();
        let expected: Vec<f64> = (0..12).map(|i| i as f64).collect();
        assert_eq!(scores, expected);
    }

    #[test]
    fn test_tasks_receive_extra_args() {
        let (hyp, refs) = corpus_of(6);
        let corpus = Corpus::new(&hyp, &refs, None).unwrap();
        let args: ExtraArgs = [("tokenizer", "13a")].into_iter().collect();
        let executor = BatchExecutor::with_workers(3, false);

        let seen = executor
            .map_batches(&corpus, &args, |_, _, args| Ok(args.get_or("tokenizer", "none").to_string()))
            .unwrap();
        assert_eq!(seen, vec!["13a"; 3]);
    }

    #[test]
    fn test_failure_reports_lowest_batch() {
        let (hyp, refs) = corpus_of(8);
        let corpus = Corpus::new(&hyp, &refs, None).unwrap();
        let executor = BatchExecutor::with_workers(4, false);

        let err = executor
            .map_batches(&corpus, &ExtraArgs::new(), |batch, _, _| {
                if batch.index >= 2 {
                    Err(ScoreError::InvalidInput(format!("bad batch {}", batch.index)))
                } else {
                    Ok(batch.index)
                }
            })
            .unwrap_err();
        match err {
            ScoreError::WorkerExecution { batch, source } => {
                assert_eq!(batch, 2);
                assert!(format!("{}", source).contains("bad batch 2"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_panic_becomes_error() {
        let (hyp, refs) = corpus_of(4);
        let corpus = Corpus::new(&hyp, &refs, None).unwrap();

        for n_workers in [1, 2] {
            let executor = BatchExecutor::with_workers(n_workers, false);
            let err = executor
                .map_batches(&corpus, &ExtraArgs::new(), |_, _, _| -> Result<()> {
                    panic!("metric exploded")
                })
                .unwrap_err();
            match err {
                ScoreError::WorkerExecution { batch, source } => {
                    assert_eq!(batch, 0);
                    assert!(matches!(*source, ScoreError::Panicked(ref m) if m.contains("exploded")));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_sentence_count_mismatch() {
        let (hyp, refs) = corpus_of(3);
        let corpus = Corpus::new(&hyp, &refs, None).unwrap();
        let executor = BatchExecutor::with_workers(1, false);
        let result = executor.map_sentences(&corpus, &ExtraArgs::new(), |_, _, _| Ok(vec![0.0]));
        assert!(matches!(result, Err(ScoreError::InvalidInput(_))));
    }
}
