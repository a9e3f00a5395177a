//! The REST API seen from the board.
//!
//! `TaskApi` is the seam between the sync layer and the network: the board
//! only ever talks to this trait, so tests can swap in an in-memory backend.

use thiserror::Error;

use crate::task::{NewTask, NewUser, Task, User};

/// A failed API call. `action` names the request for the logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{action} failed: {source}")]
    Transport {
        action: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{action} failed: HTTP {status}")]
    Status { action: String, status: u16 },

    #[error("{action} returned an unreadable body: {source}")]
    Decode {
        action: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Endpoints of the task backend.
pub trait TaskApi {
    /// `GET /api/tasks`
    fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;
    /// `GET /api/tasks/{id}`
    fn get_task(&self, id: u64) -> Result<Task, ApiError>;
    /// `POST /api/tasks`
    fn create_task(&self, task: &NewTask) -> Result<(), ApiError>;
    /// `PUT /api/tasks/{id}` with the full task.
    fn update_task(&self, task: &Task) -> Result<(), ApiError>;
    /// `DELETE /api/tasks/{id}`
    fn delete_task(&self, id: u64) -> Result<(), ApiError>;
    /// `GET /api/users`
    fn list_users(&self) -> Result<Vec<User>, ApiError>;
    /// `GET /api/users/{id}`
    fn get_user(&self, id: u64) -> Result<User, ApiError>;
    /// `POST /api/users`
    fn create_user(&self, user: &NewUser) -> Result<(), ApiError>;
}
