//! Command implementations for the CLI interface.
//!
//! Each subcommand talks to the task API through a [`TaskApi`] and goes
//! through the same [`Board`] operations as the interactive board, so the
//! validation rules and the transition policy apply identically.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{Local, Utc};
use clap::Subcommand;
use clap_complete::{generate, Shell};
use tracing::debug;

use crate::api::client::TaskApi;
use crate::board::{format_long_date, format_short_date, initials, truncate, Board};
use crate::config::Config;
use crate::fields::Status;
use crate::task::{Task, User};
use crate::validation::{TaskDraft, UserDraft};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive task board (default).
    Ui,

    /// List tasks grouped by status column.
    List {
        /// Only show one column.
        #[arg(long, value_enum)]
        status: Option<Status>,
    },

    /// Show a single task.
    Show {
        /// Task ID
        id: u64,
    },

    /// Create a task.
    Add {
        /// Short title for the task.
        title: String,
        /// ID of the user the task is assigned to.
        #[arg(long)]
        user: u64,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Initial status: not-started | in-progress | done.
        #[arg(long, value_enum, default_value_t = Status::NotStarted)]
        status: Status,
    },

    /// Update fields on a task.
    Edit {
        /// Task ID
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "clear_desc")]
        desc: Option<String>,
        /// Remove the description.
        #[arg(long)]
        clear_desc: bool,
        /// Reassign to another user ID.
        #[arg(long)]
        user: Option<u64>,
        #[arg(long, value_enum)]
        status: Option<Status>,
    },

    /// Move a task to another column.
    Move {
        /// Task ID
        id: u64,
        /// Target status: not-started | in-progress | done.
        #[arg(value_enum)]
        status: Status,
    },

    /// Delete a task.
    Delete {
        /// Task ID
        id: u64,
    },

    /// List users.
    Users,

    /// Show a single user.
    User {
        /// User ID
        id: u64,
    },

    /// Create a user.
    AddUser {
        name: String,
        email: String,
        /// Birth date as YYYY-MM-DD.
        #[arg(long)]
        birthday: Option<String>,
        /// Role or occupation.
        #[arg(long)]
        working: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Load a board for a one-shot command. Notices are never shown here.
fn load_board(api: &dyn TaskApi) -> Result<Board> {
    let mut board = Board::new(Duration::ZERO);
    board.try_refresh(api).context("Could not load the board")?;
    Ok(board)
}

/// Launch the interactive board.
pub fn cmd_ui(api: &dyn TaskApi, config: &Config) -> Result<()> {
    crate::tui::run::run_board(api, config)
}

/// Print tasks grouped by column.
pub fn cmd_list(api: &dyn TaskApi, status: Option<Status>) -> Result<()> {
    let board = load_board(api)?;
    let columns: Vec<Status> = match status {
        Some(s) => vec![s],
        None => Status::ALL.to_vec(),
    };
    write_columns(&mut io::stdout().lock(), &board, &columns)?;
    Ok(())
}

/// Print one task with its assignee.
pub fn cmd_show(api: &dyn TaskApi, id: u64) -> Result<()> {
    let mut task = api.get_task(id).with_context(|| format!("Task {id} not found"))?;
    task.user = api.get_user(task.user_id).ok();
    write_task(&mut io::stdout().lock(), &task)?;
    Ok(())
}

/// Create a task.
pub fn cmd_add(api: &dyn TaskApi, title: String, user: u64, desc: Option<String>, status: Status) -> Result<()> {
    let mut board = load_board(api)?;
    let draft = TaskDraft {
        title,
        description: desc.unwrap_or_default(),
        status,
        user_id: user,
    };
    board.add_task(api, &draft, Utc::now())?;
    debug!(title = %draft.title.trim(), "task created");
    println!("Created task \"{}\".", draft.title.trim());
    Ok(())
}

/// Update fields on a task. A status change follows the move rules.
pub fn cmd_edit(
    api: &dyn TaskApi,
    id: u64,
    title: Option<String>,
    desc: Option<String>,
    clear_desc: bool,
    user: Option<u64>,
    status: Option<Status>,
) -> Result<()> {
    let mut board = load_board(api)?;
    let Some(task) = board.task(id) else {
        bail!("Task {id} not found");
    };

    let description = if clear_desc {
        String::new()
    } else {
        desc.unwrap_or_else(|| task.description.clone().unwrap_or_default())
    };
    let draft = TaskDraft {
        title: title.unwrap_or_else(|| task.title.clone()),
        description,
        status: status.unwrap_or(task.status),
        user_id: user.unwrap_or(task.user_id),
    };
    board.edit_task(api, id, &draft, Utc::now())?;
    println!("Updated task {id}.");
    Ok(())
}

/// Move a task to another column.
pub fn cmd_move(api: &dyn TaskApi, id: u64, status: Status) -> Result<()> {
    let mut board = load_board(api)?;
    if board.drop_task(api, id, status, Utc::now())? {
        println!("Moved task {id} to {status}.");
    } else {
        println!("Task {id} is already {status}.");
    }
    Ok(())
}

/// Delete a task.
pub fn cmd_delete(api: &dyn TaskApi, id: u64) -> Result<()> {
    let mut board = load_board(api)?;
    board.delete_task(api, id)?;
    println!("Deleted task {id}.");
    Ok(())
}

/// Print all users.
pub fn cmd_users(api: &dyn TaskApi) -> Result<()> {
    let users = api.list_users().context("Could not load users")?;
    write_users(&mut io::stdout().lock(), &users)?;
    Ok(())
}

/// Print one user.
pub fn cmd_user(api: &dyn TaskApi, id: u64) -> Result<()> {
    let user = api.get_user(id).with_context(|| format!("User {id} not found"))?;
    let mut out = io::stdout().lock();
    writeln!(out, "ID:        {}", user.id)?;
    writeln!(out, "Name:      {}", user.name)?;
    writeln!(out, "Email:     {}", user.email)?;
    writeln!(out, "Role:      {}", user.working.as_deref().unwrap_or("-"))?;
    writeln!(out, "Birthday:  {}", format_long_date(user.birthday_date))?;
    Ok(())
}

/// Create a user.
pub fn cmd_add_user(
    api: &dyn TaskApi,
    name: String,
    email: String,
    birthday: Option<String>,
    working: Option<String>,
) -> Result<()> {
    let mut board = Board::new(Duration::ZERO);
    let draft = UserDraft {
        name,
        email,
        birthday_date: birthday.unwrap_or_default(),
        working: working.unwrap_or_default(),
    };
    board.add_user(api, &draft, Local::now().date_naive())?;
    println!("Created user \"{}\".", draft.name.trim());
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut io::stdout());
}

/// Write the requested columns as plain tables.
fn write_columns(out: &mut impl Write, board: &Board, columns: &[Status]) -> io::Result<()> {
    let stats = board.stats();
    writeln!(
        out,
        "{} tasks, {} in progress, {} done",
        stats.total, stats.in_progress, stats.done
    )?;
    for status in columns {
        let tasks = board.tasks_by_status(*status);
        writeln!(out)?;
        writeln!(out, "{} ({})", status.column_title(), tasks.len())?;
        if tasks.is_empty() {
            writeln!(out, "  -")?;
            continue;
        }
        for t in tasks {
            writeln!(
                out,
                "  #{:<5} {:<40} {:<3} {}",
                t.id,
                truncate(&t.title, 40),
                t.assignee_name().map(initials).unwrap_or_else(|| "--".into()),
                format_short_date(t.initial_date),
            )?;
        }
    }
    Ok(())
}

fn write_task(out: &mut impl Write, task: &Task) -> io::Result<()> {
    let assignee = match task.assignee_name() {
        Some(name) => format!("{name} (#{})", task.user_id),
        None => format!("#{}", task.user_id),
    };
    writeln!(out, "ID:          {}", task.id)?;
    writeln!(out, "Title:       {}", task.title)?;
    writeln!(out, "Status:      {}", task.status)?;
    writeln!(out, "Assignee:    {assignee}")?;
    writeln!(out, "Started:     {}", stamp(task.initial_date))?;
    writeln!(out, "Finished:    {}", stamp(task.finished_date))?;
    writeln!(out, "Description:\n{}", task.description.as_deref().unwrap_or("-"))?;
    Ok(())
}

fn stamp(ts: Option<chrono::DateTime<Utc>>) -> String {
    ts.map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into())
}

fn write_users(out: &mut impl Write, users: &[User]) -> io::Result<()> {
    writeln!(out, "{:<5} {:<3} {:<24} {:<30} {:<20} {}", "ID", "", "Name", "Email", "Role", "Birthday")?;
    for u in users {
        writeln!(
            out,
            "{:<5} {:<3} {:<24} {:<30} {:<20} {}",
            u.id,
            initials(&u.name),
            truncate(&u.name, 24),
            truncate(&u.email, 30),
            truncate(u.working.as_deref().unwrap_or("-"), 20),
            format_long_date(u.birthday_date),
        )?;
    }
    Ok(())
}
