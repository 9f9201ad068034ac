use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "fixcode", about = "Run a file and ask an LLM to fix failures", version)]
pub struct Cli {
    /// The file to run (and, on failure, to fix).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Large language model to use. When given explicitly the choice is
    /// persisted and reused by later runs.
    #[arg(long)]
    pub model: Option<String>,

    /// Apply the suggested fix and re-run without asking for confirmation.
    #[arg(long)]
    pub apply: bool,

    /// Maximum number of run attempts before giving up.
    #[arg(long = "max-attempts")]
    pub max_attempts: Option<usize>,

    /// Keep retrying even when the error output did not change between
    /// attempts.
    #[arg(long = "retry-same-error")]
    pub retry_same_error: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
