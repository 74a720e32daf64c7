use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io;

use crate::cli::{OutputFormat, ScoreArgs};
use crate::core::{builtin_registry, Score, Scorer, ScorerConfig};

#[derive(Serialize)]
struct MetricOutput<'a> {
    metric: &'a str,
    name: &'a str,
    #[serde(flatten)]
    score: Score,
}

/// One CSV row: `level` is `corpus`, `sentence` or `group`.
#[derive(Serialize)]
struct CsvRow<'a> {
    metric: &'a str,
    level: &'static str,
    key: String,
    score: f64,
}

/// Command to score hypothesis lines against one or more reference files
/// with each requested metric.
///
/// # Arguments
/// `args` - The CLI arguments structure containing:
///  - `metrics`: Metric ids, looked up in the built-in registry.
///  - `hypothesis`: Path to the hypothesis file.
///  - `references`: Paths to the reference files.
///  - `tags`: Optional path to a file of comma-separated tags.
///  - `config`: Optional JSON configuration that flags override.
pub fn cmd_score(args: ScoreArgs) -> Result<()> {
    let config = build_config(&args)?;
    let registry = builtin_registry()?;

    let hypothesis = read_lines(&args.hypothesis)?;
    let references = args
        .references
        .iter()
        .map(|path| read_lines(path))
        .collect::<Result<Vec<_>>>()?;
    let tags = match &args.tags {
        Some(path) => Some(read_tags(path)?),
        None => None,
    };

    let mut outputs = Vec::with_capacity(args.metrics.len());
    for id in &args.metrics {
        let scorer = registry.scorer(id, config.clone())?;
        let score = scorer
            .score(&hypothesis, &references, tags.as_deref())
            .with_context(|| format!("scoring `{}` failed", id))?;
        outputs.push(MetricOutput {
            metric: id,
            name: registry.name(id)?,
            score,
        });
    }

    match args.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(io::stdout().lock(), &outputs)?;
            println!();
        }
        OutputFormat::Csv => write_csv(&outputs)?,
    }
    Ok(())
}

fn build_config(args: &ScoreArgs) -> Result<ScorerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config `{}`", path))?;
            ScorerConfig::from_json(&json)?
        }
        None => ScorerConfig::default(),
    };
    if args.sent_level {
        config.sent_level = true;
    }
    if args.no_corpus_level {
        config.corpus_level = false;
    }
    if args.n_workers.is_some() {
        config.n_workers = args.n_workers;
    }
    if args.verbose {
        config.verbose = true;
    }
    for (key, value) in &args.extra {
        config.extra_args.insert(key.as_str(), value.as_str());
    }
    config.validate()?;
    Ok(config)
}

fn write_csv(outputs: &[MetricOutput<'_>]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout().lock());
    for output in outputs {
        let score = &output.score;
        if let Some(value) = score.corpus_score() {
            writer.serialize(CsvRow {
                metric: output.metric,
                level: "corpus",
                key: String::new(),
                score: value,
            })?;
        }
        for (i, value) in score.sent_scores().unwrap_or_default().iter().enumerate() {
            writer.serialize(CsvRow {
                metric: output.metric,
                level: "sentence",
                key: i.to_string(),
                score: *value,
            })?;
        }
        for (tag, value) in score.group_scores().into_iter().flatten() {
            writer.serialize(CsvRow {
                metric: output.metric,
                level: "group",
                key: tag.clone(),
                score: *value,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[inline(always)]
fn read_lines(filename: &str) -> Result<Vec<String>> {
    let content =
        fs::read_to_string(filename).with_context(|| format!("reading `{}`", filename))?;
    Ok(content.lines().map(String::from).collect())
}

fn read_tags(filename: &str) -> Result<Vec<Vec<String>>> {
    Ok(read_lines(filename)?
        .iter()
        .map(|line| parse_tag_line(line))
        .collect())
}

fn parse_tag_line(line: &str) -> Vec<String> {
    line.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}
