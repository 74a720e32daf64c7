//! Metric ids, display names and the registry mapping one to the other.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::OnceCell;

use super::config::ScorerConfig;
use super::corpus::Corpus;
use super::error::{Result, ScoreError};
use super::score::Score;
use super::scorer::MetricScorer;
use crate::metrics::{bleu, chrf, cider, gleu, meteor, nist, ribes, rouge, ter, wer};

/// The built-in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Bleu,
    BrevityPenalty,
    Chrf,
    Cider,
    Gleu,
    Meteor,
    Nist,
    Ribes,
    Rouge1,
    Rouge2,
    RougeL,
    Ter,
    WerInsertion,
    WerDeletion,
    WerSubstitution,
    Wer,
}

impl Metric {
    /// Every built-in metric in registration order.
    pub const ALL: [Metric; 16] = [
        Metric::Bleu,
        Metric::BrevityPenalty,
        Metric::Chrf,
        Metric::Cider,
        Metric::Gleu,
        Metric::Meteor,
        Metric::Nist,
        Metric::Ribes,
        Metric::Rouge1,
        Metric::Rouge2,
        Metric::RougeL,
        Metric::Ter,
        Metric::WerInsertion,
        Metric::WerDeletion,
        Metric::WerSubstitution,
        Metric::Wer,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Metric::Bleu => "bleu",
            Metric::BrevityPenalty => "bp",
            Metric::Chrf => "chrf",
            Metric::Cider => "cider",
            Metric::Gleu => "gleu",
            Metric::Meteor => "meteor",
            Metric::Nist => "nist",
            Metric::Ribes => "ribes",
            Metric::Rouge1 => "rouge_1",
            Metric::Rouge2 => "rouge_2",
            Metric::RougeL => "rouge_l",
            Metric::Ter => "ter",
            Metric::WerInsertion => "wer_ins",
            Metric::WerDeletion => "wer_del",
            Metric::WerSubstitution => "wer_sub",
            Metric::Wer => "wer",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Metric::Bleu => "BLEU",
            Metric::BrevityPenalty => "BP",
            Metric::Chrf => "chrF",
            Metric::Cider => "CIDEr",
            Metric::Gleu => "GLEU",
            Metric::Meteor => "METEOR",
            Metric::Nist => "NIST",
            Metric::Ribes => "RIBES",
            Metric::Rouge1 => "ROUGE-1",
            Metric::Rouge2 => "ROUGE-2",
            Metric::RougeL => "ROUGE-L",
            Metric::Ter => "TER",
            Metric::WerInsertion => "WER-Insertion",
            Metric::WerDeletion => "WER-Deletion",
            Metric::WerSubstitution => "WER-Substitution",
            Metric::Wer => "WER",
        }
    }

    /// Edit-distance metrics divide by the reference length.
    pub fn requires_nonempty_references(&self) -> bool {
        matches!(
            self,
            Metric::Ter
                | Metric::Wer
                | Metric::WerInsertion
                | Metric::WerDeletion
                | Metric::WerSubstitution
        )
    }

    /// Whether the corpus score is computed from summed statistics rather
    /// than from sentence scores.
    pub fn is_sufficient_statistic(&self) -> bool {
        matches!(self, Metric::Bleu | Metric::BrevityPenalty | Metric::Chrf)
    }

    /// Binds this metric to a configuration.
    pub fn scorer(&self, config: ScorerConfig) -> Result<MetricScorer> {
        MetricScorer::new(*self, config)
    }

    pub(crate) fn run(&self, config: &ScorerConfig, corpus: &Corpus<'_>) -> Result<Score> {
        tracing::debug!(
            metric = self.id(),
            sufficient_statistic = self.is_sufficient_statistic(),
            "dispatching metric"
        );
        match self {
            Metric::Bleu => bleu::score_bleu(config, corpus),
            Metric::BrevityPenalty => bleu::score_bp(config, corpus),
            Metric::Chrf => chrf::score_chrf(config, corpus),
            Metric::Cider => cider::score_cider(config, corpus),
            Metric::Gleu => gleu::score_gleu(config, corpus),
            Metric::Meteor => meteor::score_meteor(config, corpus),
            Metric::Nist => nist::score_nist(config, corpus),
            Metric::Ribes => ribes::score_ribes(config, corpus),
            Metric::Rouge1 => rouge::score_rouge(config, corpus, rouge::RougeVariant::N(1)),
            Metric::Rouge2 => rouge::score_rouge(config, corpus, rouge::RougeVariant::N(2)),
            Metric::RougeL => rouge::score_rouge(config, corpus, rouge::RougeVariant::L),
            Metric::Ter => ter::score_ter(config, corpus),
            Metric::WerInsertion => {
                wer::score_wer_component(config, corpus, wer::WerComponent::Insertions)
            }
            Metric::WerDeletion => {
                wer::score_wer_component(config, corpus, wer::WerComponent::Deletions)
            }
            Metric::WerSubstitution => {
                wer::score_wer_component(config, corpus, wer::WerComponent::Substitutions)
            }
            Metric::Wer => wer::score_wer(config, corpus),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Metric {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.id() == s)
            .ok_or_else(|| ScoreError::UnknownMetric(s.to_string()))
    }
}

#[derive(Debug, Clone)]
struct Entry {
    id: String,
    name: String,
    metric: Metric,
}

/// Maps metric ids to implementations and display names.
///
/// Filled once at startup, then only read.
#[derive(Debug, Clone, Default)]
pub struct MetricRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in metric.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        for metric in Metric::ALL {
            registry.register(metric.id(), metric.display_name(), metric)?;
        }
        Ok(registry)
    }

    /// Adds a metric under `id`.
    ///
    /// # Errors
    /// [`ScoreError::DuplicateMetric`] if `id` is already registered
    pub fn register(&mut self, id: &str, name: &str, metric: Metric) -> Result<()> {
        if self.index.contains_key(id) {
            return Err(ScoreError::DuplicateMetric(id.to_string()));
        }
        self.index.insert(id.to_string(), self.entries.len());
        self.entries.push(Entry {
            id: id.to_string(),
            name: name.to_string(),
            metric,
        });
        Ok(())
    }

    /// Looks up the metric registered under `id`.
    pub fn get(&self, id: &str) -> Result<Metric> {
        self.index
            .get(id)
            .map(|&i| self.entries[i].metric)
            .ok_or_else(|| ScoreError::UnknownMetric(id.to_string()))
    }

    /// Display name of `id`.
    pub fn name(&self, id: &str) -> Result<&str> {
        self.index
            .get(id)
            .map(|&i| self.entries[i].name.as_str())
            .ok_or_else(|| ScoreError::UnknownMetric(id.to_string()))
    }

    /// Registered ids in registration order.
    pub fn list_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.id.as_str()).collect()
    }

    /// `(id, display name)` pairs in registration order.
    pub fn list_ids_and_names(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.id.as_str(), e.name.as_str()))
            .collect()
    }

    /// Builds a scorer for `id`.
    pub fn scorer(&self, id: &str, config: ScorerConfig) -> Result<MetricScorer> {
        self.get(id)?.scorer(config)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static BUILTIN: OnceCell<MetricRegistry> = OnceCell::new();

/// The process-wide built-in registry, built on first use.
pub fn builtin_registry() -> Result<&'static MetricRegistry> {
    BUILTIN.get_or_try_init(MetricRegistry::builtin)
}
