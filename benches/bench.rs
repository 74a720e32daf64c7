//! Benchmarks for seqscore components.

use seqscore::core::cider::{CiderEngine, ExampleNGrams, CIDER_ORDER};
use seqscore::core::edit_distance::word_error_stats;
use seqscore::core::{builtin_registry, Scorer, ScorerConfig, ShiftSearchEngine};

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

const WORDS: [&str; 12] = [
    "the", "cat", "sat", "on", "mat", "a", "dog", "ran", "in", "park", "today", "quickly",
];

/// Deterministic pseudo-random sentence of `len` words.
fn sentence(seed: usize, len: usize) -> String {
    (0..len)
        .map(|i| WORDS[(seed * 7 + i * 13 + i * i) % WORDS.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

fn corpus(n: usize) -> (Vec<String>, Vec<Vec<String>>) {
    let hyp = (0..n).map(|i| sentence(i, 20)).collect();
    let refs = vec![(0..n).map(|i| sentence(i + 1, 22)).collect()];
    (hyp, refs)
}

/// Benchmark the word-level Levenshtein alignment.
fn bench_edit_distance(c: &mut Criterion) {
    let reference: Vec<String> = sentence(1, 40).split(' ').map(String::from).collect();
    let hypothesis: Vec<String> = sentence(2, 40).split(' ').map(String::from).collect();

    c.bench_function("word_error_stats_40", |b| {
        b.iter(|| word_error_stats(black_box(&reference), black_box(&hypothesis)))
    });
}

/// Benchmark the greedy shift search; a fresh engine per iteration so the
/// cache starts cold.
fn bench_ter(c: &mut Criterion) {
    let reference = sentence(3, 25);
    let hypothesis = sentence(4, 25);

    c.bench_function("sentence_ter_25", |b| {
        b.iter(|| {
            let mut engine = ShiftSearchEngine::default();
            engine.sentence_ter(black_box(&hypothesis), &[reference.as_str()])
        })
    });
}

fn bench_cider(c: &mut Criterion) {
    let (hyp, refs) = corpus(200);
    let examples: Vec<ExampleNGrams> = hyp
        .iter()
        .zip(&refs[0])
        .map(|(h, r)| ExampleNGrams::extract(h, &[r.as_str()], CIDER_ORDER))
        .collect();

    c.bench_function("cider_fit_and_score_200", |b| {
        b.iter(|| {
            let engine = CiderEngine::fit(&examples);
            examples.iter().map(|e| engine.score_example(e)).sum::<f64>()
        })
    });
}

/// Benchmark a full corpus score, serial against four workers.
fn bench_executor(c: &mut Criterion) {
    let (hyp, refs) = corpus(2000);
    let registry = builtin_registry().unwrap();

    for n_workers in [1, 4] {
        let config = ScorerConfig {
            n_workers: Some(n_workers),
            ..ScorerConfig::default()
        };
        let scorer = registry.scorer("wer", config).unwrap();
        c.bench_function(&format!("wer_2000_workers_{}", n_workers), |b| {
            b.iter(|| scorer.score(black_box(&hyp), &refs, None).unwrap())
        });
    }
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(10);
    targets =
        bench_edit_distance,
        bench_ter,
        bench_cider,
        bench_executor,
);
criterion_main!(benches);
