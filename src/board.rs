//! Board state and synchronisation with the task API.
//!
//! This module provides the `Board` struct, the client-side cache of tasks
//! and users. The cache is never merged locally: every mutation is sent to
//! the API and followed by a full refresh. It also holds the single error
//! notice shown to the user, along with display helpers shared by the board
//! view and the command line.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::client::{ApiError, TaskApi};
use crate::fields::Status;
use crate::task::{NewTask, Task, TaskEdits, User};
use crate::transition::{self, TransitionError};
use crate::validation::{self, TaskDraft, UserDraft, ValidationError};

pub const LOAD_TASKS_FAILED: &str = "Failed to load tasks";
pub const LOAD_USERS_FAILED: &str = "Failed to load users";
pub const CREATE_TASK_FAILED: &str = "Error creating task";
pub const CREATE_USER_FAILED: &str = "Error creating user";
pub const UPDATE_TASK_FAILED: &str = "Error updating task";
pub const DELETE_TASK_FAILED: &str = "Error deleting task";

/// Why a board operation did not go through.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Task {0} not found")]
    NotFound(u64),

    #[error("{message}")]
    Api {
        message: &'static str,
        #[source]
        source: ApiError,
    },
}

/// The error message currently on screen.
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub raised_at: Instant,
}

/// Task counts for the statistics bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub in_progress: usize,
    pub done: usize,
}

/// Cached tasks and users plus the current notice.
#[derive(Debug)]
pub struct Board {
    pub tasks: Vec<Task>,
    pub users: Vec<User>,
    loaded: bool,
    notice: Option<Notice>,
    notice_ttl: Duration,
}

impl Board {
    /// Create an empty board whose notices last `notice_ttl`.
    pub fn new(notice_ttl: Duration) -> Self {
        Self {
            tasks: Vec::new(),
            users: Vec::new(),
            loaded: false,
            notice: None,
            notice_ttl,
        }
    }

    /// Whether at least one refresh has completed.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Refetch tasks, each task's user, then the user list.
    ///
    /// The cache is replaced only when the task and user lists both load;
    /// otherwise the previous contents stay and a notice is raised. Returns
    /// whether the refresh succeeded.
    pub fn refresh(&mut self, api: &dyn TaskApi) -> bool {
        match self.try_refresh(api) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "refresh failed");
                self.raise(e.to_string());
                false
            }
        }
    }

    /// Like [`Board::refresh`] but hands the failure back instead of raising
    /// a notice.
    pub fn try_refresh(&mut self, api: &dyn TaskApi) -> Result<(), BoardError> {
        let (tasks, users) = Self::fetch(api)?;
        debug!(tasks = tasks.len(), users = users.len(), "board refreshed");
        self.tasks = tasks;
        self.users = users;
        self.loaded = true;
        Ok(())
    }

    fn fetch(api: &dyn TaskApi) -> Result<(Vec<Task>, Vec<User>), BoardError> {
        let mut tasks = api.list_tasks().map_err(|source| BoardError::Api {
            message: LOAD_TASKS_FAILED,
            source,
        })?;

        let mut resolved: HashMap<u64, Option<User>> = HashMap::new();
        for task in &mut tasks {
            let user = resolved.entry(task.user_id).or_insert_with(|| {
                match api.get_user(task.user_id) {
                    Ok(user) => Some(user),
                    Err(e) => {
                        warn!(task = task.id, user = task.user_id, error = %e, "could not resolve assignee");
                        None
                    }
                }
            });
            task.user = user.clone();
        }

        let users = api.list_users().map_err(|source| BoardError::Api {
            message: LOAD_USERS_FAILED,
            source,
        })?;
        Ok((tasks, users))
    }

    /// Get a task by ID.
    pub fn task(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks in one column, in server order.
    pub fn tasks_by_status(&self, status: Status) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    /// Counts for the statistics bar.
    pub fn stats(&self) -> Stats {
        Stats {
            total: self.tasks.len(),
            in_progress: self.tasks.iter().filter(|t| t.status == Status::InProgress).count(),
            done: self.tasks.iter().filter(|t| t.status == Status::Done).count(),
        }
    }

    /// Validate and create a task, stamping it for its initial status.
    pub fn add_task(&mut self, api: &dyn TaskApi, draft: &TaskDraft, now: DateTime<Utc>) -> Result<(), BoardError> {
        let valid = validation::validate_task(draft, &self.users)?;
        let stamps = transition::stamps_for_new(valid.status, now);
        let body = NewTask {
            title: valid.title,
            description: valid.description.unwrap_or_default(),
            status: valid.status,
            user_id: valid.user_id,
            initial_date: stamps.initial_date,
            finished_date: stamps.finished_date,
        };
        self.mutate(api.create_task(&body), CREATE_TASK_FAILED, api)
    }

    /// Validate and create a user.
    pub fn add_user(&mut self, api: &dyn TaskApi, draft: &UserDraft, today: NaiveDate) -> Result<(), BoardError> {
        let body = validation::validate_user(draft, today)?;
        self.mutate(api.create_user(&body), CREATE_USER_FAILED, api)
    }

    /// Drop a task on the column for `target`.
    ///
    /// Dropping on the task's own column does nothing and returns `Ok(false)`.
    /// Moving a completed task elsewhere is refused with a notice.
    pub fn drop_task(
        &mut self,
        api: &dyn TaskApi,
        id: u64,
        target: Status,
        now: DateTime<Utc>,
    ) -> Result<bool, BoardError> {
        let mut task = self.task(id).cloned().ok_or(BoardError::NotFound(id))?;
        let change = match transition::plan_for(&task, target, now) {
            Ok(change) => change,
            Err(TransitionError::Unchanged(_)) => return Ok(false),
            Err(e) => {
                self.raise(e.to_string());
                return Err(e.into());
            }
        };
        debug!(task = id, from = ?task.status, to = ?target, "moving task");
        change.apply(&mut task);
        self.mutate(api.update_task(&task), UPDATE_TASK_FAILED, api)?;
        Ok(true)
    }

    /// Apply the edit form to a task. A status change goes through the
    /// transition policy like a drop does.
    pub fn edit_task(
        &mut self,
        api: &dyn TaskApi,
        id: u64,
        draft: &TaskDraft,
        now: DateTime<Utc>,
    ) -> Result<(), BoardError> {
        let mut task = self.task(id).cloned().ok_or(BoardError::NotFound(id))?;
        let valid = validation::validate_task(draft, &self.users)?;

        if valid.status != task.status {
            match transition::plan_for(&task, valid.status, now) {
                Ok(change) => change.apply(&mut task),
                Err(e) => {
                    self.raise(e.to_string());
                    return Err(e.into());
                }
            }
        }
        task.apply_edits(&TaskEdits {
            title: Some(valid.title),
            description: Some(valid.description),
            user_id: Some(valid.user_id),
        });
        self.mutate(api.update_task(&task), UPDATE_TASK_FAILED, api)
    }

    /// Delete a task.
    pub fn delete_task(&mut self, api: &dyn TaskApi, id: u64) -> Result<(), BoardError> {
        if self.task(id).is_none() {
            return Err(BoardError::NotFound(id));
        }
        self.mutate(api.delete_task(id), DELETE_TASK_FAILED, api)
    }

    /// Finish a mutation: refresh on success, raise the fixed message on
    /// failure.
    fn mutate(
        &mut self,
        result: Result<(), ApiError>,
        message: &'static str,
        api: &dyn TaskApi,
    ) -> Result<(), BoardError> {
        match result {
            Ok(()) => {
                self.refresh(api);
                Ok(())
            }
            Err(source) => {
                warn!(error = %source, "{message}");
                self.raise(message.to_string());
                Err(BoardError::Api { message, source })
            }
        }
    }

    /// Show an error notice, replacing any current one.
    pub fn raise(&mut self, message: String) {
        self.notice = Some(Notice {
            message,
            raised_at: Instant::now(),
        });
    }

    /// The notice currently shown, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|n| n.message.as_str())
    }

    /// Drop the notice once it has been shown for the configured time.
    pub fn expire_notice(&mut self, now: Instant) {
        if let Some(notice) = &self.notice {
            if now.saturating_duration_since(notice.raised_at) >= self.notice_ttl {
                self.notice = None;
            }
        }
    }
}

/// Up to two upper-case initials from a name ("ana maria lima" -> "AM").
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Format a timestamp as a short local date ("05 Mar").
pub fn format_short_date(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.with_timezone(&Local).format("%d %b").to_string(),
        None => "-".into(),
    }
}

/// Format a birth date ("12 Apr 1990"), or `N/A`.
pub fn format_long_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%d %b %Y").to_string(),
        None => "N/A".into(),
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}
