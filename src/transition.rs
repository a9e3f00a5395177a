//! Status transition policy.
//!
//! Decides whether a task may move to a requested status and which
//! timestamps the move writes. A completed task is locked: nothing moves it
//! out of "done". Entering "in progress" stamps the start time
//! when missing; entering "done" stamps the finish time and backfills the
//! start time.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::fields::Status;
use crate::task::Task;

/// Why a requested move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Cannot move a completed task back")]
    LeavingDone,
    #[error("Task is already {0}")]
    Unchanged(Status),
}

/// A permitted move and the stamps it writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub status: Status,
    pub initial_date: Option<DateTime<Utc>>,
    pub finished_date: Option<DateTime<Utc>>,
}

/// Decide a move from `current` to `target` for a task whose start stamp is
/// `started`.
pub fn plan(
    current: Status,
    started: Option<DateTime<Utc>>,
    target: Status,
    now: DateTime<Utc>,
) -> Result<StatusChange, TransitionError> {
    if current == Status::Done && target != Status::Done {
        return Err(TransitionError::LeavingDone);
    }
    if current == target {
        return Err(TransitionError::Unchanged(current));
    }

    let change = match target {
        Status::InProgress => StatusChange {
            status: target,
            initial_date: if started.is_none() { Some(now) } else { None },
            finished_date: None,
        },
        Status::Done => StatusChange {
            status: target,
            initial_date: if started.is_none() { Some(now) } else { None },
            finished_date: Some(now),
        },
        Status::NotStarted => StatusChange {
            status: target,
            initial_date: None,
            finished_date: None,
        },
    };
    Ok(change)
}

/// Decide a move for an existing task.
pub fn plan_for(task: &Task, target: Status, now: DateTime<Utc>) -> Result<StatusChange, TransitionError> {
    plan(task.status, task.initial_date, target, now)
}

/// Stamps for a task created directly in `status`.
///
/// Creation counts as leaving "not started", so a new task in progress gets
/// a start time and a new completed task gets both.
pub fn stamps_for_new(status: Status, now: DateTime<Utc>) -> StatusChange {
    plan(Status::NotStarted, None, status, now).unwrap_or(StatusChange {
        status,
        initial_date: None,
        finished_date: None,
    })
}

impl StatusChange {
    /// Write the new status and any stamps this change carries.
    pub fn apply(&self, task: &mut Task) {
        task.status = self.status;
        if let Some(start) = self.initial_date {
            task.initial_date = Some(start);
        }
        if let Some(finish) = self.finished_date {
            task.finished_date = Some(finish);
        }
    }
}
