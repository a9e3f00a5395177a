//! Task form handling for the terminal user interface.
//!
//! This module provides the `TaskForm` structure used by both the "new task"
//! and "edit task" screens: two text fields plus status and assignee
//! selectors, navigated in a fixed field order.

use crate::{
    fields::Status,
    task::{Task, User},
    tui::input::InputField,
    validation::TaskDraft,
};

/// Global order constants for task form fields.
pub const TITLE_GLOBAL_ORDER: usize = 0;
pub const DESCRIPTION_GLOBAL_ORDER: usize = 1;
pub const STATUS_GLOBAL_ORDER: usize = 2;
pub const USER_GLOBAL_ORDER: usize = 3;

/// Task form for creating and editing tasks
pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub status: usize,
    /// Index into `users`; 0 is the "no user selected" entry
    pub user: usize,
    pub current_field: usize,
    pub users: Vec<(u64, String)>,
    /// Validation or request error shown under the form
    pub error: Option<String>,
}

impl TaskForm {
    /// Create an empty form offering the given users.
    pub fn new(users: &[User]) -> Self {
        let mut form = Self {
            title: InputField::new(),
            description: InputField::new(),
            status: 0,
            user: 0,
            current_field: TITLE_GLOBAL_ORDER,
            users: users.iter().map(|u| (u.id, u.name.clone())).collect(),
            error: None,
        };
        form.update_active_field();
        form
    }

    /// Create a form populated from an existing task.
    pub fn from_task(task: &Task, users: &[User]) -> Self {
        let mut form = Self::new(users);
        form.title = InputField::with_value(&task.title);
        form.description = InputField::with_value(task.description.as_deref().unwrap_or_default());
        form.status = task.status.column();
        form.user = form
            .users
            .iter()
            .position(|(id, _)| *id == task.user_id)
            .map(|i| i + 1)
            .unwrap_or(0);
        form.update_active_field();
        form
    }

    /// Get the total number of fields (input fields + selectors).
    pub fn field_count(&self) -> usize {
        4
    }

    /// Move to the next field in the form.
    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % self.field_count();
        self.update_active_field();
    }

    /// Move to the previous field in the form.
    pub fn prev_field(&mut self) {
        self.current_field = if self.current_field == 0 {
            self.field_count() - 1
        } else {
            self.current_field - 1
        };
        self.update_active_field();
    }

    /// Update which field is currently active for editing.
    pub fn update_active_field(&mut self) {
        self.title.active = self.current_field == TITLE_GLOBAL_ORDER;
        self.description.active = self.current_field == DESCRIPTION_GLOBAL_ORDER;
    }

    /// The text field under the cursor, if the current field is one.
    pub fn active_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE_GLOBAL_ORDER => Some(&mut self.title),
            DESCRIPTION_GLOBAL_ORDER => Some(&mut self.description),
            _ => None,
        }
    }

    /// Handle character input for the currently active field.
    pub fn handle_char(&mut self, c: char) {
        if let Some(field) = self.active_input() {
            field.handle_char(c);
        }
    }

    /// Handle backspace input for the currently active field.
    pub fn handle_backspace(&mut self) {
        if let Some(field) = self.active_input() {
            field.handle_backspace();
        }
    }

    /// Handle delete input for the currently active field.
    pub fn handle_delete(&mut self) {
        if let Some(field) = self.active_input() {
            field.handle_delete();
        }
    }

    /// Handle left/right arrow keys for cursor movement or selector changes.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.current_field {
            TITLE_GLOBAL_ORDER | DESCRIPTION_GLOBAL_ORDER => {
                if let Some(field) = self.active_input() {
                    if right { field.move_cursor_right() } else { field.move_cursor_left() }
                }
            }
            STATUS_GLOBAL_ORDER => {
                self.status = cycle(self.status, Status::ALL.len(), right);
            }
            USER_GLOBAL_ORDER => {
                self.user = cycle(self.user, self.users.len() + 1, right);
            }
            _ => {}
        }
    }

    /// Currently selected status.
    pub fn selected_status(&self) -> Status {
        Status::from_column(self.status).unwrap_or(Status::NotStarted)
    }

    /// Label of the selected assignee.
    pub fn selected_user_label(&self) -> &str {
        match self.user.checked_sub(1).and_then(|i| self.users.get(i)) {
            Some((_, name)) => name,
            None => "Select a user",
        }
    }

    /// The form contents as a draft for validation. No selection maps to
    /// user id 0.
    pub fn draft(&self) -> TaskDraft {
        let user_id = self
            .user
            .checked_sub(1)
            .and_then(|i| self.users.get(i))
            .map(|(id, _)| *id)
            .unwrap_or(0);
        TaskDraft {
            title: self.title.value.clone(),
            description: self.description.value.clone(),
            status: self.selected_status(),
            user_id,
        }
    }
}

fn cycle(current: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (current + 1) % len
    } else if current == 0 {
        len - 1
    } else {
        current - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Vec<User> {
        vec![
            User { id: 4, name: "Ana".into(), email: "a@x.io".into(), birthday_date: None, working: None },
            User { id: 9, name: "Bruno".into(), email: "b@x.io".into(), birthday_date: None, working: None },
        ]
    }

    #[test]
    fn test_new_form_has_no_user() {
        let form = TaskForm::new(&users());
        assert_eq!(form.selected_user_label(), "Select a user");
        assert_eq!(form.draft().user_id, 0);
        assert_eq!(form.draft().status, Status::NotStarted);
        assert!(form.title.active);
    }

    #[test]
    fn test_selectors_wrap_around() {
        let mut form = TaskForm::new(&users());
        form.current_field = USER_GLOBAL_ORDER;
        form.handle_left_right(false);
        assert_eq!(form.selected_user_label(), "Bruno");
        assert_eq!(form.draft().user_id, 9);
        form.handle_left_right(true);
        assert_eq!(form.draft().user_id, 0);

        form.current_field = STATUS_GLOBAL_ORDER;
        form.handle_left_right(false);
        assert_eq!(form.selected_status(), Status::Done);
    }

    #[test]
    fn test_typing_only_reaches_text_fields() {
        let mut form = TaskForm::new(&users());
        form.handle_char('a');
        form.next_field();
        form.handle_char('b');
        form.next_field();
        form.handle_char('c');
        assert_eq!(form.title.value, "a");
        assert_eq!(form.description.value, "b");
        assert!(!form.title.active);

        form.prev_field();
        form.prev_field();
        form.prev_field();
        assert_eq!(form.current_field, USER_GLOBAL_ORDER);
    }

    #[test]
    fn test_from_task_selects_assignee() {
        let task = Task {
            id: 1,
            title: "Deploy".into(),
            description: None,
            status: Status::InProgress,
            user_id: 9,
            user: None,
            initial_date: None,
            finished_date: None,
        };
        let form = TaskForm::from_task(&task, &users());
        assert_eq!(form.selected_user_label(), "Bruno");
        assert_eq!(form.selected_status(), Status::InProgress);
        assert_eq!(form.title.cursor, 6);
    }
}
