//! Command-line interface for seqscore.
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "seqscore", about = "Score generated text against references")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

#[derive(Debug, Args)]
pub struct ScoreArgs {
    /// Metric ids to compute (see `seqscore list`)
    #[arg(short, long = "metric", required = true, num_args = 1..)]
    pub metrics: Vec<String>,

    /// File containing one hypothesis per line
    #[arg(long)]
    pub hypothesis: String,

    /// Reference files, one reference source per file
    #[arg(short, long, required = true, num_args = 1..)]
    pub references: Vec<String>,

    /// File with comma-separated tags per line
    #[arg(long)]
    pub tags: Option<String>,

    /// Also report sentence scores
    #[arg(long)]
    pub sent_level: bool,

    /// Skip the corpus score
    #[arg(long)]
    pub no_corpus_level: bool,

    #[arg(long)]
    pub n_workers: Option<usize>,

    /// Show a progress bar over batches
    #[arg(short, long)]
    pub verbose: bool,

    /// Metric-specific options such as `tokenizer=13a`
    #[arg(long = "extra", value_parser = parse_key_value)]
    pub extra: Vec<(String, String)>,

    /// JSON file holding a scorer configuration; flags override it
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Print display names next to ids
    #[arg(long)]
    pub names: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Score hypotheses against references
    Score(ScoreArgs),

    /// List registered metrics
    List(ListArgs),
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{}`", s))?;
    if key.is_empty() {
        return Err(format!("empty key in `{}`", s));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("tokenizer=13a").unwrap(),
            ("tokenizer".to_string(), "13a".to_string())
        );
        assert_eq!(parse_key_value("k=").unwrap().1, "");
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_parse_score_command() {
        let cli = Cli::try_parse_from([
            "seqscore",
            "score",
            "--metric",
            "bleu",
            "wer",
            "--hypothesis",
            "hyp.txt",
            "--references",
            "ref1.txt",
            "ref2.txt",
            "--sent-level",
            "--extra",
            "tokenizer=13a",
            "--format",
            "csv",
        ])
        .unwrap();
        match cli.command {
            Command::Score(args) => {
                assert_eq!(args.metrics, vec!["bleu", "wer"]);
                assert_eq!(args.references.len(), 2);
                assert!(args.sent_level);
                assert!(!args.no_corpus_level);
                assert_eq!(args.format, OutputFormat::Csv);
                assert_eq!(args.extra[0].1, "13a");
            }
            Command::List(_) => panic!("expected score command"),
        }
    }
}
