//! In-memory [`TaskApi`] used by the board tests.

use std::cell::RefCell;
use std::collections::HashSet;

use crate::api::client::{ApiError, TaskApi};
use crate::task::{NewTask, NewUser, Task, User};

#[derive(Default)]
pub struct FakeApi {
    pub tasks: RefCell<Vec<Task>>,
    pub users: RefCell<Vec<User>>,
    /// Request descriptions in the order they were made.
    pub calls: RefCell<Vec<String>>,
    /// Requests (by description) that answer HTTP 500.
    pub failing: RefCell<HashSet<String>>,
}

impl FakeApi {
    pub fn with(tasks: Vec<Task>, users: Vec<User>) -> Self {
        Self {
            tasks: RefCell::new(tasks),
            users: RefCell::new(users),
            ..Self::default()
        }
    }

    pub fn fail(&self, action: &str) {
        self.failing.borrow_mut().insert(action.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, action: String) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(action.clone());
        if self.failing.borrow().contains(&action) {
            return Err(ApiError::Status { action, status: 500 });
        }
        Ok(())
    }

    fn not_found(action: String) -> ApiError {
        ApiError::Status { action, status: 404 }
    }
}

impl TaskApi for FakeApi {
    fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.record("GET /api/tasks".into())?;
        Ok(self.tasks.borrow().clone())
    }

    fn get_task(&self, id: u64) -> Result<Task, ApiError> {
        let action = format!("GET /api/tasks/{id}");
        self.record(action.clone())?;
        self.tasks
            .borrow()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(action))
    }

    fn create_task(&self, task: &NewTask) -> Result<(), ApiError> {
        self.record("POST /api/tasks".into())?;
        let mut tasks = self.tasks.borrow_mut();
        let id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        tasks.push(Task {
            id,
            title: task.title.clone(),
            description: Some(task.description.clone()).filter(|d| !d.is_empty()),
            status: task.status,
            user_id: task.user_id,
            user: None,
            initial_date: task.initial_date,
            finished_date: task.finished_date,
        });
        Ok(())
    }

    fn update_task(&self, task: &Task) -> Result<(), ApiError> {
        let action = format!("PUT /api/tasks/{}", task.id);
        self.record(action.clone())?;
        let mut tasks = self.tasks.borrow_mut();
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| Self::not_found(action))?;
        *slot = Task { user: None, ..task.clone() };
        Ok(())
    }

    fn delete_task(&self, id: u64) -> Result<(), ApiError> {
        let action = format!("DELETE /api/tasks/{id}");
        self.record(action.clone())?;
        let mut tasks = self.tasks.borrow_mut();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(Self::not_found(action));
        }
        Ok(())
    }

    fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.record("GET /api/users".into())?;
        Ok(self.users.borrow().clone())
    }

    fn get_user(&self, id: u64) -> Result<User, ApiError> {
        let action = format!("GET /api/users/{id}");
        self.record(action.clone())?;
        self.users
            .borrow()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(action))
    }

    fn create_user(&self, user: &NewUser) -> Result<(), ApiError> {
        self.record("POST /api/users".into())?;
        let mut users = self.users.borrow_mut();
        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        users.push(User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            birthday_date: user.birthday_date,
            working: user.working.clone(),
        });
        Ok(())
    }
}
