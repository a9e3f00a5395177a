//! # taskboard - terminal task board for a REST task API
//!
//! A three-column board (pending, in progress, done) backed by a remote task
//! service, with a scriptable command line over the same operations.
//!
//! ## Key Features
//!
//! - **Keyboard drag and drop**: pick a card up, carry it across columns, drop it
//! - **One-way completion**: a finished task stays finished; start and finish times are stamped on the way
//! - **Always in sync**: every change is sent to the API and followed by a full reload
//! - **Users panel**: everyone a task can be assigned to, with initials and details
//! - **Scriptable**: `list`, `add`, `edit`, `move`, `delete` and user commands for automation
//!
//! ## Quick Start
//!
//! ```bash
//! # Open the board against a local backend
//! tb
//!
//! # Point at another backend
//! TASKBOARD_API_URL=https://tasks.example.com tb ui
//!
//! # Add a task for user 2 and start it
//! tb add "Write release notes" --user 2
//! tb move 14 in-progress
//!
//! # Print the board
//! tb list
//! ```
//!
//! ## Key Commands
//!
//! - `tb ui` - Interactive board (the default)
//! - `tb list [--status S]` - Tasks grouped by column
//! - `tb add <title> --user <id>` - Create a task
//! - `tb move <id> <status>` - Move a task between columns
//! - `tb users` / `tb add-user <name> <email>` - Manage assignees
//!
//! Logs go to stderr for commands and to a file while the board is open
//! (`--log-file`, default `taskboard.log` in the temp directory). Set
//! `RUST_LOG` to change the filter.

use anyhow::Context;
use clap::Parser;

pub mod board;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod fields;
pub mod logging;
pub mod task;
pub mod transition;
pub mod validation;
pub mod api {
    pub mod client;
    #[cfg(test)]
    pub mod fake;
    pub mod http;
}
pub mod tui {
    pub mod app;
    pub mod board_view;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod user_form;
}

use api::http::HttpApi;
use cli::Cli;
use cmd::*;
use config::Config;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_cli(&cli)?;
    let command = cli.command.unwrap_or(Commands::Ui);

    // Completions need neither logging nor the network
    let command = match command {
        Commands::Completions { shell } => {
            cmd_completions(shell);
            return Ok(());
        }
        other => other,
    };

    if matches!(command, Commands::Ui) {
        logging::init_file(&config.log_file)
            .with_context(|| format!("Could not open log file {}", config.log_file.display()))?;
    } else {
        logging::init_stderr();
    }

    let api = HttpApi::new(config.api_url.as_str(), config.request_timeout)?;
    tracing::debug!(api_url = api.base_url(), "using task API");
    dispatch(command, &api, &config)
}

fn dispatch(command: Commands, api: &HttpApi, config: &Config) -> anyhow::Result<()> {
    match command {
        Commands::Ui => cmd_ui(api, config),
        Commands::List { status } => cmd_list(api, status),
        Commands::Show { id } => cmd_show(api, id),
        Commands::Add { title, user, desc, status } => cmd_add(api, title, user, desc, status),
        Commands::Edit { id, title, desc, clear_desc, user, status } =>
            cmd_edit(api, id, title, desc, clear_desc, user, status),
        Commands::Move { id, status } => cmd_move(api, id, status),
        Commands::Delete { id } => cmd_delete(api, id),
        Commands::Users => cmd_users(api),
        Commands::User { id } => cmd_user(api, id),
        Commands::AddUser { name, email, birthday, working } =>
            cmd_add_user(api, name, email, birthday, working),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}
