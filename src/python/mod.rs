//! Python bindings for seqscore.

use numpy::PyArray1;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::collections::{BTreeMap, HashMap};

use crate::core::{builtin_registry, Score, Scorer, ScorerConfig};

/// Python wrapper for Score
#[pyclass(name = "Score")]
#[derive(Clone)]
pub struct PyScore {
    inner: Score,
}

impl From<Score> for PyScore {
    fn from(inner: Score) -> Self {
        Self { inner }
    }
}

#[pymethods]
impl PyScore {
    #[getter]
    fn corpus_score(&self) -> Option<f64> {
        self.inner.corpus_score()
    }

    /// Sentence scores as a numpy array, or None.
    #[getter]
    fn sent_scores<'py>(&self, py: Python<'py>) -> Option<&'py PyArray1<f64>> {
        self.inner
            .sent_scores()
            .map(|scores| PyArray1::from_slice(py, scores))
    }

    #[getter]
    fn group_scores(&self) -> Option<BTreeMap<String, f64>> {
        self.inner.group_scores().cloned()
    }

    fn to_json(&self) -> PyResult<String> {
        self.inner
            .to_json()
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn __repr__(&self) -> String {
        format!(
            "Score(corpus_score={:?}, sentences={}, groups={})",
            self.inner.corpus_score(),
            self.inner.sent_scores().map_or(0, <[f64]>::len),
            self.inner.group_scores().map_or(0, BTreeMap::len),
        )
    }
}

/// Score hypotheses against references with a registered metric.
#[pyfunction]
#[pyo3(signature = (
    metric,
    hypothesis,
    references,
    tags=None,
    corpus_level=true,
    sent_level=false,
    n_workers=None,
    extra_args=None,
))]
#[allow(clippy::too_many_arguments)]
fn score(
    py: Python<'_>,
    metric: &str,
    hypothesis: Vec<String>,
    references: Vec<Vec<String>>,
    tags: Option<Vec<Vec<String>>>,
    corpus_level: bool,
    sent_level: bool,
    n_workers: Option<usize>,
    extra_args: Option<HashMap<String, String>>,
) -> PyResult<PyScore> {
    let config = ScorerConfig {
        corpus_level,
        sent_level,
        n_workers,
        extra_args: extra_args.unwrap_or_default().into_iter().collect(),
        ..ScorerConfig::default()
    };
    let to_py = |e: crate::core::ScoreError| PyValueError::new_err(e.to_string());

    let scorer = builtin_registry()
        .and_then(|registry| registry.scorer(metric, config))
        .map_err(to_py)?;
    let result = py
        .allow_threads(|| scorer.score(&hypothesis, &references, tags.as_deref()))
        .map_err(to_py)?;
    Ok(result.into())
}

/// Registered `(id, display name)` pairs in registration order.
#[pyfunction]
fn list_scorers() -> PyResult<Vec<(String, String)>> {
    let registry = builtin_registry().map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(registry
        .list_ids_and_names()
        .into_iter()
        .map(|(id, name)| (id.to_string(), name.to_string()))
        .collect())
}

/// Python module definition
pub fn _rust(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyScore>()?;
    m.add_function(wrap_pyfunction!(score, m)?)?;
    m.add_function(wrap_pyfunction!(list_scorers, m)?)?;
    Ok(())
}
