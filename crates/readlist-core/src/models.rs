//! Data models for readlist
//!
//! Defines the reading-list record and its status. Records serialize with
//! their fields in a fixed order followed by any extra fields carried over
//! from an import.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ReadingListError;

/// Title used when a record has none
pub const PLACEHOLDER_TITLE: &str = "(untitled)";

/// Field names owned by [`Record`]; anything else lands in `extra`
pub const RECORD_FIELDS: &[&str] = &["id", "url", "title", "status", "comment", "added_at"];

/// Reading progress of a saved page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Unread,
    Reading,
    Read,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Unread, Status::Reading, Status::Read];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Unread => "unread",
            Status::Reading => "reading",
            Status::Read => "read",
        }
    }

    /// Parse a status, falling back to `Unread` for anything unknown
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ReadingListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ReadingListError::InvalidStatus(s.to_string()))
    }
}

/// A saved page in the reading list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// Opaque unique identifier
    pub id: String,
    /// The page URL (never empty)
    pub url: String,
    /// Page title
    pub title: String,
    /// Reading status
    pub status: Status,
    /// Free-text comment, stored trimmed
    pub comment: String,
    /// When the page was saved (ISO-8601)
    pub added_at: String,
    /// Fields carried over from an import that readlist does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Create a new unread record for the given URL
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            id: new_id(),
            url: url.into(),
            title: if title.is_empty() {
                PLACEHOLDER_TITLE.to_string()
            } else {
                title
            },
            status: Status::Unread,
            comment: String::new(),
            added_at: now_timestamp(),
            extra: Map::new(),
        }
    }

    /// Update the status
    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// Update the comment (surrounding whitespace is dropped)
    pub fn set_comment(&mut self, comment: &str) {
        self.comment = comment.trim().to_string();
    }

    /// The `added_at` timestamp, if it parses as RFC 3339
    pub fn added_at_time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.added_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// All fields as an ordered JSON object
    ///
    /// Record fields come first, then extra fields in insertion order.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("id".into(), Value::String(self.id.clone()));
        fields.insert("url".into(), Value::String(self.url.clone()));
        fields.insert("title".into(), Value::String(self.title.clone()));
        fields.insert("status".into(), Value::String(self.status.to_string()));
        fields.insert("comment".into(), Value::String(self.comment.clone()));
        fields.insert("added_at".into(), Value::String(self.added_at.clone()));
        for (key, value) in &self.extra {
            fields
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        fields
    }

    /// Copy every field of `incoming` onto this record, keeping this id
    pub fn absorb(&mut self, incoming: Record) {
        let Record {
            id: _,
            url,
            title,
            status,
            comment,
            added_at,
            extra,
        } = incoming;
        self.url = url;
        self.title = title;
        self.status = status;
        self.comment = comment;
        self.added_at = added_at;
        self.extra.extend(extra);
    }
}

/// Generate a fresh record id
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// The current instant as an ISO-8601 string (UTC, millisecond precision)
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
