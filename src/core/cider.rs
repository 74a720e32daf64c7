//! CIDEr: TF-IDF weighted n-gram cosine similarity.

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Highest n-gram order.
pub const CIDER_ORDER: usize = 4;
/// Standard deviation of the Gaussian length penalty.
pub const CIDER_SIGMA: f64 = 6.0;

/// Owned n-gram counts of one sentence, all orders mixed.
pub type NGramTable = BTreeMap<Vec<String>, usize>;

/// N-gram tables of one example: hypothesis and every reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleNGrams {
    pub hypothesis: SentenceNGrams,
    pub references: Vec<SentenceNGrams>,
}

/// N-gram counts and token length of one sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceNGrams {
    pub counts: NGramTable,
    pub length: usize,
}

impl SentenceNGrams {
    /// Counts all n-grams of order `1..=n` over whitespace tokens.
    pub fn extract(sentence: &str, n: usize) -> Self {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        let mut counts = BTreeMap::new();
        for k in 1..=n.min(words.len()) {
            for window in words.windows(k) {
                let ngram: Vec<String> = window.iter().map(|w| w.to_string()).collect();
                *counts.entry(ngram).or_insert(0) += 1;
            }
        }
        Self {
            counts,
            length: words.len(),
        }
    }
}

impl ExampleNGrams {
    pub fn extract(hypothesis: &str, references: &[&str], n: usize) -> Self {
        Self {
            hypothesis: SentenceNGrams::extract(hypothesis, n),
            references: references
                .iter()
                .map(|r| SentenceNGrams::extract(r, n))
                .collect(),
        }
    }
}

/// Per-order TF-IDF vectors and their L2 norms.
struct TfIdfVector<'a> {
    orders: Vec<BTreeMap<&'a [String], f64>>,
    norms: Vec<f64>,
    length: usize,
}

/// Document frequencies and the length normalizer of one corpus.
///
/// Built once per `score` call from that call's references and discarded
/// afterwards.
#[derive(Debug, Clone)]
pub struct CiderEngine {
    n: usize,
    sigma: f64,
    /// Number of examples whose references contain the n-gram
    doc_freq: HashMap<Vec<String>, f64>,
    /// `ln(number of examples)`
    ref_len: f64,
}

impl CiderEngine {
    /// Computes document frequencies over all examples.
    ///
    /// # Arguments
    /// * `examples` - N-gram tables of every example in the corpus
    ///
    /// # Returns
    /// An engine ready to score any example of the same corpus
    pub fn fit(examples: &[ExampleNGrams]) -> Self {
        Self::fit_with(examples, CIDER_ORDER, CIDER_SIGMA)
    }

    pub fn fit_with(examples: &[ExampleNGrams], n: usize, sigma: f64) -> Self {
        let mut doc_freq: HashMap<Vec<String>, f64> = HashMap::new();
        for example in examples {
            // An n-gram counts once per example, however many references hold it
            let unique: BTreeSet<&Vec<String>> = example
                .references
                .iter()
                .flat_map(|r| r.counts.keys())
                .collect();
            for ngram in unique {
                *doc_freq.entry(ngram.clone()).or_insert(0.0) += 1.0;
            }
        }

        let ref_len = (examples.len().max(1) as f64).ln();
        tracing::debug!(
            n_examples = examples.len(),
            n_ngrams = doc_freq.len(),
            "computed CIDEr document frequencies"
        );

        Self {
            n,
            sigma,
            doc_freq,
            ref_len,
        }
    }

    pub fn document_frequency(&self, ngram: &[String]) -> f64 {
        self.doc_freq.get(ngram).copied().unwrap_or(0.0)
    }

    /// Maps counts to TF-IDF weights grouped by order.
    fn to_vector<'a>(&self, sentence: &'a SentenceNGrams) -> TfIdfVector<'a> {
        let mut orders = vec![BTreeMap::new(); self.n];
        let mut norms = vec![0.0; self.n];
        for (ngram, &term_freq) in &sentence.counts {
            let order = ngram.len() - 1;
            // Unseen n-grams behave as if seen in one example
            let df = self.document_frequency(ngram).max(1.0);
            let weight = term_freq as f64 * (self.ref_len - df.ln());
            norms[order] += weight * weight;
            orders[order].insert(ngram.as_slice(), weight);
        }
        TfIdfVector {
            orders,
            norms: norms.into_iter().map(f64::sqrt).collect(),
            length: sentence.length,
        }
    }

    /// Per-order cosine similarity attenuated by the length penalty.
    fn similarity(&self, hyp: &TfIdfVector<'_>, reference: &TfIdfVector<'_>) -> Vec<f64> {
        let delta = hyp.length as f64 - reference.length as f64;
        let penalty = (-(delta * delta) / (2.0 * self.sigma * self.sigma)).exp();
        (0..self.n)
            .map(|order| {
                let (norm_h, norm_r) = (hyp.norms[order], reference.norms[order]);
                if norm_h == 0.0 || norm_r == 0.0 {
                    return 0.0;
                }
                let dot: f64 = hyp.orders[order]
                    .iter()
                    .map(|(ngram, w)| w * reference.orders[order].get(ngram).copied().unwrap_or(0.0))
                    .sum();
                dot / (norm_h * norm_r) * penalty
            })
            .collect()
    }

    /// Sentence score: mean over orders, averaged over references, times 10.
    pub fn score_example(&self, example: &ExampleNGrams) -> f64 {
        if example.references.is_empty() {
            return 0.0;
        }
        let hyp = self.to_vector(&example.hypothesis);
        let mut per_order = vec![0.0; self.n];
        for reference in &example.references {
            let reference = self.to_vector(reference);
            for (acc, sim) in per_order.iter_mut().zip(self.similarity(&hyp, &reference)) {
                *acc += sim;
            }
        }
        let mean = per_order.iter().sum::<f64>() / self.n as f64;
        mean / example.references.len() as f64 * 10.0
    }
}
