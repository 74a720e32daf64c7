pub mod types;
mod list;
mod score;

pub use types::{Cli, Command, ListArgs, OutputFormat, ScoreArgs};
pub use list::cmd_list;
pub use score::cmd_score;
