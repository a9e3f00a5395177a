//! Task and user data structures.
//!
//! These mirror the JSON documents the REST backend exchanges. Field names
//! follow the wire format exactly; the denormalised `user` on a task is
//! filled in by the client during a refresh and never sent back.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::{birth_date, timestamp, Status};

/// A card on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: Status,
    #[serde(rename = "userId")]
    pub user_id: u64,
    #[serde(default, skip_serializing)]
    pub user: Option<User>,
    #[serde(default, with = "timestamp")]
    pub initial_date: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    pub finished_date: Option<DateTime<Utc>>,
}

/// A person tasks can be assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default, with = "birth_date")]
    pub birthday_date: Option<NaiveDate>,
    #[serde(default)]
    pub working: Option<String>,
}

/// Body of `POST /api/tasks`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: Status,
    #[serde(rename = "userId")]
    pub user_id: u64,
    #[serde(skip_serializing_if = "Option::is_none", with = "timestamp")]
    pub initial_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", with = "timestamp")]
    pub finished_date: Option<DateTime<Utc>>,
}

/// Body of `POST /api/users`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none", with = "birth_date")]
    pub birthday_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working: Option<String>,
}

/// Field changes coming from the task edit form or `tb edit`.
///
/// `None` leaves a field as it is. Status changes are not carried here; they
/// go through the transition policy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskEdits {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub user_id: Option<u64>,
}

impl Task {
    /// Apply form edits in place.
    pub fn apply_edits(&mut self, edits: &TaskEdits) {
        if let Some(title) = &edits.title {
            self.title = title.clone();
        }
        if let Some(description) = &edits.description {
            self.description = description.clone();
        }
        if let Some(user_id) = edits.user_id {
            if user_id != self.user_id {
                self.user_id = user_id;
                self.user = None;
            }
        }
    }

    /// Name of the assignee when the user has been resolved.
    pub fn assignee_name(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_task_wire_format() {
        let json = r#"{
            "id": 7,
            "title": "Write docs",
            "description": null,
            "status": "em_progresso",
            "userId": 3,
            "initial_date": "2024-05-02T09:00:00",
            "finished_date": null
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, 7);
        assert_eq!(task.user_id, 3);
        assert_eq!(task.status, Status::InProgress);
        assert_eq!(
            task.initial_date,
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap())
        );
        assert!(task.finished_date.is_none());

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["userId"], 3);
        assert_eq!(value["status"], "em_progresso");
        assert_eq!(value["initial_date"], "2024-05-02T09:00:00.000Z");
        assert!(value.get("user").is_none());
    }

    #[test]
    fn test_task_missing_optional_fields() {
        let task: Task =
            serde_json::from_str(r#"{"id":1,"title":"abc","status":"nao_iniciada","userId":1}"#).unwrap();
        assert!(task.description.is_none());
        assert!(task.initial_date.is_none());
        assert!(task.user.is_none());
    }

    #[test]
    fn test_user_birthday_accepts_datetime() {
        let user: User = serde_json::from_str(
            r#"{"id":2,"name":"Ana Lima","email":"ana@example.com","birthday_date":"1990-04-12T00:00:00","working":"Dev"}"#,
        )
        .unwrap();
        assert_eq!(user.birthday_date, NaiveDate::from_ymd_opt(1990, 4, 12));
        assert_eq!(user.working.as_deref(), Some("Dev"));
    }

    #[test]
    fn test_new_user_omits_empty_optionals() {
        let user = NewUser {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            birthday_date: None,
            working: None,
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("birthday_date").is_none());
        assert!(value.get("working").is_none());
    }

    #[test]
    fn test_apply_edits_resets_user_on_reassign() {
        let mut task = Task {
            id: 1,
            title: "Old".into(),
            description: Some("desc".into()),
            status: Status::NotStarted,
            user_id: 1,
            user: Some(User {
                id: 1,
                name: "A".into(),
                email: "a@b.co".into(),
                birthday_date: None,
                working: None,
            }),
            initial_date: None,
            finished_date: None,
        };
        task.apply_edits(&TaskEdits {
            title: Some("New".into()),
            description: Some(None),
            user_id: Some(2),
        });
        assert_eq!(task.title, "New");
        assert!(task.description.is_none());
        assert_eq!(task.user_id, 2);
        assert!(task.user.is_none());
    }
}
