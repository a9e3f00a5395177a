//! Client-side form validation.
//!
//! Every form is checked here before anything is sent to the API. The first
//! failing rule is reported; its message is what the form shows.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

use crate::fields::Status;
use crate::task::{NewUser, User};

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 1000;
pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 100;
pub const EMAIL_MAX: usize = 254;
pub const WORKING_MAX: usize = 100;

static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

/// A form value that breaks one of the rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("Select a user for the task")]
    UserNotSelected,
    #[error("User {0} does not exist")]
    UnknownUser(u64),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("'{0}' is not a valid date (use YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("Birth date must be between {min} and {max}")]
    DateOutOfRange { min: NaiveDate, max: NaiveDate },
}

/// Raw task form input.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: Status,
    /// Selected user id; `0` means nothing is selected.
    pub user_id: u64,
}

/// A task form that passed validation, with whitespace trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub user_id: u64,
}

/// Raw user form input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub birthday_date: String,
    pub working: String,
}

fn check_length(field: &'static str, value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len == 0 && min > 0 {
        return Err(ValidationError::Required(field));
    }
    if len < min {
        return Err(ValidationError::TooShort { field, min });
    }
    if len > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

/// Validate a task title.
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    check_length("Title", title, TITLE_MIN, TITLE_MAX)?;
    Ok(title.to_string())
}

/// Validate an optional description. Blank input means no description.
pub fn validate_description(description: &str) -> Result<Option<String>, ValidationError> {
    let description = description.trim();
    if description.is_empty() {
        return Ok(None);
    }
    check_length("Description", description, 0, DESCRIPTION_MAX)?;
    Ok(Some(description.to_string()))
}

/// Validate a user selection against the known users.
///
/// An empty `users` slice means the list is not known and only the
/// "something selected" rule applies.
pub fn validate_assignee(user_id: u64, users: &[User]) -> Result<u64, ValidationError> {
    if user_id == 0 {
        return Err(ValidationError::UserNotSelected);
    }
    if !users.is_empty() && !users.iter().any(|u| u.id == user_id) {
        return Err(ValidationError::UnknownUser(user_id));
    }
    Ok(user_id)
}

/// Validate the task form.
pub fn validate_task(draft: &TaskDraft, users: &[User]) -> Result<ValidTask, ValidationError> {
    let title = validate_title(&draft.title)?;
    let description = validate_description(&draft.description)?;
    let user_id = validate_assignee(draft.user_id, users)?;
    Ok(ValidTask {
        title,
        description,
        status: draft.status,
        user_id,
    })
}

/// Check an email address has the `local@domain.tld` shape.
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required("Email"));
    }
    if email.chars().count() > EMAIL_MAX {
        return Err(ValidationError::TooLong { field: "Email", max: EMAIL_MAX });
    }
    if !EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email)) {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    Ok(email.to_string())
}

/// Parse and bound-check an optional birth date. `today` is the upper bound.
pub fn validate_birth_date(input: &str, today: NaiveDate) -> Result<Option<NaiveDate>, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(input.to_string()))?;
    let min = earliest_birth_date();
    if date < min || date > today {
        return Err(ValidationError::DateOutOfRange { min, max: today });
    }
    Ok(Some(date))
}

fn earliest_birth_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Validate the user form into a request body.
pub fn validate_user(draft: &UserDraft, today: NaiveDate) -> Result<NewUser, ValidationError> {
    let name = draft.name.trim();
    check_length("Name", name, NAME_MIN, NAME_MAX)?;
    let email = validate_email(&draft.email)?;
    let birthday_date = validate_birth_date(&draft.birthday_date, today)?;
    let working = draft.working.trim();
    check_length("Role", working, 0, WORKING_MAX)?;
    Ok(NewUser {
        name: name.to_string(),
        email,
        birthday_date,
        working: if working.is_empty() { None } else { Some(working.to_string()) },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn users() -> Vec<User> {
        vec![User {
            id: 4,
            name: "Bruno Dias".into(),
            email: "bruno@example.com".into(),
            birthday_date: None,
            working: None,
        }]
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn draft(title: &str, user_id: u64) -> TaskDraft {
        TaskDraft {
            title: title.into(),
            description: String::new(),
            status: Status::NotStarted,
            user_id,
        }
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("ab")]
    #[case("  ab  ")]
    fn test_short_titles_rejected(#[case] title: &str) {
        assert!(validate_task(&draft(title, 4), &users()).is_err());
    }

    #[test]
    fn test_title_bounds() {
        assert!(validate_title("abc").is_ok());
        assert!(validate_title(&"x".repeat(100)).is_ok());
        assert_eq!(
            validate_title(&"x".repeat(101)),
            Err(ValidationError::TooLong { field: "Title", max: 100 })
        );
        assert_eq!(validate_title("ab"), Err(ValidationError::TooShort { field: "Title", min: 3 }));
        // Bounds count characters, not bytes.
        assert!(validate_title(&"é".repeat(100)).is_ok());
    }

    #[test]
    fn test_task_without_user_rejected() {
        let result = validate_task(&draft("Ship release", 0), &users());
        assert_eq!(result, Err(ValidationError::UserNotSelected));
    }

    #[test]
    fn test_task_with_unknown_user_rejected() {
        assert_eq!(
            validate_task(&draft("Ship release", 9), &users()),
            Err(ValidationError::UnknownUser(9))
        );
        // Unknown user list: only the selection rule applies.
        assert!(validate_task(&draft("Ship release", 9), &[]).is_ok());
    }

    #[test]
    fn test_valid_task_is_trimmed() {
        let mut d = draft("  Ship release  ", 4);
        d.description = "   ".into();
        let valid = validate_task(&d, &users()).unwrap();
        assert_eq!(valid.title, "Ship release");
        assert_eq!(valid.description, None);
        assert_eq!(valid.user_id, 4);
    }

    #[test]
    fn test_description_too_long() {
        let mut d = draft("Ship release", 4);
        d.description = "d".repeat(DESCRIPTION_MAX + 1);
        assert!(matches!(
            validate_task(&d, &users()),
            Err(ValidationError::TooLong { field: "Description", .. })
        ));
    }

    #[rstest]
    #[case("plainaddress")]
    #[case("missing-at.example.com")]
    #[case("@example.com")]
    #[case("user@")]
    #[case("user@domain")]
    #[case("user name@example.com")]
    #[case("user@@example.com")]
    fn test_invalid_emails(#[case] email: &str) {
        assert!(matches!(validate_email(email), Err(ValidationError::InvalidEmail(_))));
    }

    #[rstest]
    #[case("ana@example.com")]
    #[case("first.last+tag@sub.example.co")]
    #[case("  ana@example.com  ")]
    fn test_valid_emails(#[case] email: &str) {
        assert_eq!(validate_email(email).unwrap(), email.trim());
    }

    #[rstest]
    #[case("1899-12-31")]
    #[case("2025-06-02")]
    fn test_birth_date_out_of_range(#[case] input: &str) {
        assert!(matches!(
            validate_birth_date(input, today()),
            Err(ValidationError::DateOutOfRange { .. })
        ));
    }

    #[test]
    fn test_birth_date_parsing() {
        assert_eq!(validate_birth_date("", today()), Ok(None));
        assert_eq!(
            validate_birth_date("1990-04-12", today()),
            Ok(NaiveDate::from_ymd_opt(1990, 4, 12))
        );
        assert_eq!(validate_birth_date("2025-06-01", today()), Ok(Some(today())));
        assert!(matches!(
            validate_birth_date("12/04/1990", today()),
            Err(ValidationError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_user_form() {
        let user = validate_user(
            &UserDraft {
                name: " Ana Lima ".into(),
                email: "ana@example.com".into(),
                birthday_date: String::new(),
                working: "  ".into(),
            },
            today(),
        )
        .unwrap();
        assert_eq!(user.name, "Ana Lima");
        assert_eq!(user.working, None);
        assert_eq!(user.birthday_date, None);

        let missing_name = validate_user(
            &UserDraft {
                email: "ana@example.com".into(),
                ..UserDraft::default()
            },
            today(),
        );
        assert_eq!(missing_name, Err(ValidationError::Required("Name")));

        let bad_email = validate_user(
            &UserDraft {
                name: "Ana".into(),
                email: "ana.example.com".into(),
                ..UserDraft::default()
            },
            today(),
        );
        assert!(matches!(bad_email, Err(ValidationError::InvalidEmail(_))));
    }
}
