use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::config::{DEFAULT_API_URL, DEFAULT_NOTICE_SECS, DEFAULT_TIMEOUT_SECS};

/// Task board client for a REST task API.
/// Runs the interactive board by default; subcommands script the same API.
#[derive(Parser)]
#[command(name = "tb", version, about = "Three-column task board for a REST task API")]
pub struct Cli {
    /// Base URL of the task API.
    #[arg(long, global = true, env = "TASKBOARD_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Request timeout in seconds.
    #[arg(long, global = true, env = "TASKBOARD_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Seconds an error notice stays on the board.
    #[arg(long, global = true, env = "TASKBOARD_NOTICE_SECS", default_value_t = DEFAULT_NOTICE_SECS)]
    pub notice_secs: u64,

    /// Log file used while the board is on screen.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
