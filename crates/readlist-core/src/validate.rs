//! Record normalization
//!
//! Turns a loosely-typed candidate object (a JSON array element or a CSV
//! row) into a well-formed [`Record`], or rejects it. Rejection is a
//! per-row decision: a batch is never aborted by a bad row.

use std::fmt;

use serde_json::{Map, Value};
use tracing::warn;

use crate::codec::Candidate;
use crate::models::{new_id, now_timestamp, Record, Status, PLACEHOLDER_TITLE, RECORD_FIELDS};

/// Why a row was dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The JSON element is not an object
    NotAnObject,
    /// `url` is missing or blank
    MissingUrl,
    /// The CSV row has a different number of fields than the header
    ColumnCount { expected: usize, found: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotAnObject => write!(f, "not an object"),
            SkipReason::MissingUrl => write!(f, "missing url"),
            SkipReason::ColumnCount { expected, found } => {
                write!(f, "expected {} fields, found {}", expected, found)
            }
        }
    }
}

/// A dropped row and where it came from
///
/// `row` is the 1-based line number for CSV input and the 1-based array
/// position for JSON input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSkipped {
    pub row: usize,
    pub reason: SkipReason,
}

impl fmt::Display for RowSkipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.reason)
    }
}

/// Normalize one candidate object into a record
///
/// Unknown fields are kept in [`Record::extra`]. Missing or invalid
/// fields get defaults; only a missing url rejects the candidate.
pub fn normalize(raw: &Value) -> Result<Record, SkipReason> {
    let Value::Object(fields) = raw else {
        return Err(SkipReason::NotAnObject);
    };

    let url = text_field(fields, "url")
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or(SkipReason::MissingUrl)?;

    let id = text_field(fields, "id")
        .filter(|id| !id.is_empty())
        .map_or_else(new_id, str::to_string);

    let title = text_field(fields, "title")
        .filter(|title| !title.is_empty())
        .unwrap_or(PLACEHOLDER_TITLE);

    let status = text_field(fields, "status")
        .map(|status| Status::parse_lenient(status.trim()))
        .unwrap_or_default();

    let comment = text_field(fields, "comment").map_or("", str::trim);

    let added_at = text_field(fields, "added_at")
        .map(str::trim)
        .filter(|added_at| !added_at.is_empty())
        .map_or_else(now_timestamp, str::to_string);

    let extra = fields
        .iter()
        .filter(|(key, _)| !RECORD_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(Record {
        id,
        url: url.to_string(),
        title: title.to_string(),
        status,
        comment: comment.to_string(),
        added_at,
        extra,
    })
}

/// Normalize a decoded batch, collecting the rows that were dropped
pub fn normalize_all(candidates: Vec<Candidate>) -> (Vec<Record>, Vec<RowSkipped>) {
    let mut records = Vec::with_capacity(candidates.len());
    let mut skipped = Vec::new();

    for candidate in candidates {
        match normalize(&candidate.value) {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!(row = candidate.row, %reason, "Skipping import row");
                skipped.push(RowSkipped {
                    row: candidate.row,
                    reason,
                });
            }
        }
    }

    (records, skipped)
}

fn text_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_complete_record() {
        let raw = json!({
            "id": "abc",
            "url": "https://example.com",
            "title": "Example",
            "status": "reading",
            "comment": "  halfway  ",
            "added_at": "2024-01-01T00:00:00Z"
        });

        let record = normalize(&raw).unwrap();
        assert_eq!(record.id, "abc");
        assert_eq!(record.url, "https://example.com");
        assert_eq!(record.title, "Example");
        assert_eq!(record.status, Status::Reading);
        assert_eq!(record.comment, "halfway");
        assert_eq!(record.added_at, "2024-01-01T00:00:00Z");
        assert!(record.extra.is_empty());
    }

    #[test]
    fn test_normalize_fills_defaults() {
        let record = normalize(&json!({"url": "https://example.com"})).unwrap();
        assert!(!record.id.is_empty());
        assert_eq!(record.title, PLACEHOLDER_TITLE);
        assert_eq!(record.status, Status::Unread);
        assert_eq!(record.comment, "");
        assert!(record.added_at_time().is_some());
    }

    #[test]
    fn test_normalize_rejects_missing_url() {
        assert_eq!(
            normalize(&json!({"title": "No url"})),
            Err(SkipReason::MissingUrl)
        );
        assert_eq!(
            normalize(&json!({"url": "   "})),
            Err(SkipReason::MissingUrl)
        );
        assert_eq!(normalize(&json!({"url": 42})), Err(SkipReason::MissingUrl));
    }

    #[test]
    fn test_normalize_rejects_non_object() {
        assert_eq!(normalize(&json!("https://example.com")), Err(SkipReason::NotAnObject));
        assert_eq!(normalize(&Value::Null), Err(SkipReason::NotAnObject));
    }

    #[test]
    fn test_normalize_coerces_invalid_values() {
        let raw = json!({
            "id": 17,
            "url": " https://example.com ",
            "title": "",
            "status": "done",
            "comment": null,
            "added_at": ""
        });

        let record = normalize(&raw).unwrap();
        assert_ne!(record.id, "17");
        assert_eq!(record.url, "https://example.com");
        assert_eq!(record.title, PLACEHOLDER_TITLE);
        assert_eq!(record.status, Status::Unread);
        assert_eq!(record.comment, "");
        assert!(!record.added_at.is_empty());
    }

    #[test]
    fn test_normalize_trims_padded_csv_cells() {
        let text = "url, status, added_at, comment\n\
                    https://a.example, read, 2024-01-01T00:00:00Z, kept as is";
        let decoded = crate::codec::decode(text, crate::codec::Format::Csv).unwrap();

        let (records, skipped) = normalize_all(decoded.candidates);
        assert!(skipped.is_empty());
        let record = &records[0];
        assert_eq!(record.url, "https://a.example");
        assert_eq!(record.status, Status::Read);
        assert_eq!(record.added_at, "2024-01-01T00:00:00Z");
        assert!(record.added_at_time().is_some());
        assert_eq!(record.comment, "kept as is");
    }

    #[test]
    fn test_normalize_preserves_extra_fields() {
        let raw = json!({
            "url": "https://example.com",
            "tags": ["rust"],
            "source": "newsletter"
        });

        let record = normalize(&raw).unwrap();
        assert_eq!(record.extra.get("tags"), Some(&json!(["rust"])));
        assert_eq!(record.extra.get("source"), Some(&json!("newsletter")));
        let keys: Vec<&String> = record.extra.keys().collect();
        assert_eq!(keys, vec!["tags", "source"]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raws = [
            json!({"url": "https://a.example"}),
            json!({"url": " https://b.example ", "status": "bogus", "comment": " x "}),
            json!({"id": "k", "url": "https://c.example", "title": "C", "extra": 1}),
        ];

        for raw in raws {
            let once = normalize(&raw).unwrap();
            let twice = normalize(&serde_json::to_value(&once).unwrap()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_normalize_all_collects_skips() {
        let candidates = vec![
            Candidate {
                row: 1,
                value: json!({"url": "https://a.example"}),
            },
            Candidate {
                row: 2,
                value: json!({"title": "no url"}),
            },
            Candidate {
                row: 3,
                value: json!([1, 2]),
            },
        ];

        let (records, skipped) = normalize_all(candidates);
        assert_eq!(records.len(), 1);
        assert_eq!(
            skipped,
            vec![
                RowSkipped {
                    row: 2,
                    reason: SkipReason::MissingUrl
                },
                RowSkipped {
                    row: 3,
                    reason: SkipReason::NotAnObject
                },
            ]
        );
        assert_eq!(skipped[0].to_string(), "row 2: missing url");
    }
}
