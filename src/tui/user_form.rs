//! New-user form for the terminal user interface.

use crate::{tui::input::InputField, validation::UserDraft};

/// Global order constants for user form fields.
pub const NAME_GLOBAL_ORDER: usize = 0;
pub const EMAIL_GLOBAL_ORDER: usize = 1;
pub const BIRTHDAY_GLOBAL_ORDER: usize = 2;
pub const WORKING_GLOBAL_ORDER: usize = 3;

/// Form for registering a user
pub struct UserForm {
    pub name: InputField,
    pub email: InputField,
    pub birthday_date: InputField,
    pub working: InputField,
    pub current_field: usize,
    pub error: Option<String>,
}

impl UserForm {
    pub fn new() -> Self {
        let mut form = Self {
            name: InputField::new(),
            email: InputField::new(),
            birthday_date: InputField::new(),
            working: InputField::new(),
            current_field: NAME_GLOBAL_ORDER,
            error: None,
        };
        form.update_active_field();
        form
    }

    /// Get mutable references to all input fields in visual order.
    pub fn fields_mut(&mut self) -> [&mut InputField; 4] {
        [&mut self.name, &mut self.email, &mut self.birthday_date, &mut self.working]
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % 4;
        self.update_active_field();
    }

    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + 3) % 4;
        self.update_active_field();
    }

    pub fn update_active_field(&mut self) {
        let current = self.current_field;
        for (i, field) in self.fields_mut().into_iter().enumerate() {
            field.active = i == current;
        }
    }

    /// The field under the cursor.
    pub fn active_input(&mut self) -> &mut InputField {
        match self.current_field {
            EMAIL_GLOBAL_ORDER => &mut self.email,
            BIRTHDAY_GLOBAL_ORDER => &mut self.birthday_date,
            WORKING_GLOBAL_ORDER => &mut self.working,
            _ => &mut self.name,
        }
    }

    pub fn draft(&self) -> UserDraft {
        UserDraft {
            name: self.name.value.clone(),
            email: self.email.value.clone(),
            birthday_date: self.birthday_date.value.clone(),
            working: self.working.value.clone(),
        }
    }
}

impl Default for UserForm {
    fn default() -> Self {
        Self::new()
    }
}
