//! Command-line interface for seqscore.

use anyhow::Result;
use clap::Parser;
use seqscore::cli::{cmd_list, cmd_score, Cli, Command};

fn main() -> Result<()> {
    // Logs go to stderr so stdout only carries scores
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Score(args) => cmd_score(args),
        Command::List(args) => cmd_list(args),
    }
}
