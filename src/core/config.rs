//! Scorer configuration and builder.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{Result, ScoreError};
use super::tokenizer::Tokenization;

/// Metric-specific string options (tokenizer choice, target language, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtraArgs(BTreeMap<String, String>);

impl ExtraArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns the value for `key`, or `default` when unset.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Parses the tokenization stored under `key` (defaults to `none`).
    pub fn tokenization(&self, key: &str) -> Result<Tokenization> {
        self.get_or(key, "none").parse()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ExtraArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Configuration shared by every scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Whether to compute the corpus-level score
    pub corpus_level: bool,
    /// Whether to return per-example scores
    pub sent_level: bool,
    /// Number of workers; `None` sizes the pool from the corpus size
    pub n_workers: Option<usize>,
    /// Whether to render a progress bar over batches
    pub verbose: bool,
    /// Metric-specific options
    pub extra_args: ExtraArgs,
    /// CPU count bounding the pool; `None` detects it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_cpus: Option<usize>,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            corpus_level: true,
            sent_level: false,
            n_workers: None,
            verbose: false,
            extra_args: ExtraArgs::default(),
            available_cpus: None,
        }
    }
}

impl ScorerConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ScorerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_workers == Some(0) {
            return Err(ScoreError::InvalidInput(
                "n_workers must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for creating a [`ScorerConfig`].
pub struct ScorerConfigBuilder {
    pub config: ScorerConfig,
}

impl ScorerConfigBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: ScorerConfig::default(),
        }
    }

    /// Enables or disables the corpus-level score.
    pub fn corpus_level(mut self, enabled: bool) -> Self {
        self.config.corpus_level = enabled;
        self
    }

    /// Enables or disables per-example scores.
    pub fn sent_level(mut self, enabled: bool) -> Self {
        self.config.sent_level = enabled;
        self
    }

    /// Sets the number of workers.
    pub fn n_workers(mut self, n: usize) -> Self {
        self.config.n_workers = Some(n);
        self
    }

    /// Enables progress reporting.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Overrides the detected CPU count used to bound the pool.
    pub fn available_cpus(mut self, cpus: usize) -> Self {
        self.config.available_cpus = Some(cpus);
        self
    }

    /// Adds one metric-specific option.
    pub fn extra_arg(mut self, key: &str, value: &str) -> Self {
        self.config.extra_args.insert(key, value);
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<ScorerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ScorerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
