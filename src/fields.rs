//! Enumerations and field types for the task board.
//!
//! This module defines the task status enumeration shared by the board,
//! the transition policy, the REST payloads and the command line, along with
//! the serde helpers for the timestamp and date formats the API exchanges.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task progress status, ordered `NotStarted -> InProgress -> Done`.
///
/// The serde names are the values the REST backend stores; the clap names
/// are what users type on the command line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    #[serde(rename = "nao_iniciada", alias = "not-started")]
    #[value(name = "not-started", alias = "todo")]
    NotStarted,
    #[serde(rename = "em_progresso", alias = "in-progress")]
    #[value(name = "in-progress", alias = "doing")]
    InProgress,
    #[serde(rename = "concluida", alias = "done")]
    #[value(name = "done")]
    Done,
}

impl Status {
    /// All statuses in column order.
    pub const ALL: [Status; 3] = [Status::NotStarted, Status::InProgress, Status::Done];

    /// Column index of this status on the board.
    pub fn column(self) -> usize {
        match self {
            Status::NotStarted => 0,
            Status::InProgress => 1,
            Status::Done => 2,
        }
    }

    /// Status shown in the given board column, if the column exists.
    pub fn from_column(index: usize) -> Option<Status> {
        Self::ALL.get(index).copied()
    }

    /// Column heading used on the board.
    pub fn column_title(self) -> &'static str {
        match self {
            Status::NotStarted => "PENDING",
            Status::InProgress => "IN PROGRESS",
            Status::Done => "DONE",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::NotStarted => "Not started",
            Status::InProgress => "In progress",
            Status::Done => "Done",
        })
    }
}

/// Serde adapter for optional UTC timestamps.
///
/// Writes RFC 3339 with millisecond precision and a `Z` suffix. Reads either
/// RFC 3339 or a naive `YYYY-MM-DDTHH:MM:SS[.fff]` string, taken as UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{s}'"))),
        }
    }

    /// Parse a timestamp in any of the accepted formats.
    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// Serde adapter for optional calendar dates.
///
/// Writes `YYYY-MM-DD`. Reads a date, or a date-time whose date part is kept.
pub mod birth_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => {
                let date_part = s.split('T').next().unwrap_or(s);
                NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                    .map(Some)
                    .map_err(|e| serde::de::Error::custom(format!("invalid date '{s}': {e}")))
            }
        }
    }
}
