//! Text format codec
//!
//! Encodes records to JSON or CSV text and decodes JSON or CSV text into
//! raw candidate objects. Decoding does not validate records; that is
//! [`validate::normalize`](crate::validate::normalize)'s job. Only
//! whole-file problems fail a decode; bad rows are reported as
//! [`RowSkipped`] diagnostics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::ReadingListError;
use crate::models::Record;
use crate::validate::{RowSkipped, SkipReason};

/// UTF-8 byte order mark, accepted (and ignored) at the start of any input
pub const BOM: char = '\u{feff}';

/// Headers a CSV import must contain
pub const REQUIRED_CSV_HEADERS: &[&str] = &["url", "status", "added_at"];

/// Errors that fail a whole decode or encode
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("the file is empty")]
    Empty,

    #[error("JSON could not be parsed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON file must contain an array of records")]
    NotAnArray,

    #[error("CSV file is missing required headers: {}", .missing.join(", "))]
    MissingHeaders { missing: Vec<String> },

    #[error("CSV could not be parsed: {0}")]
    Csv(#[from] csv::Error),
}

/// Supported text formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Csv,
}

impl Format {
    /// File extension (without the dot)
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Csv => "csv",
        }
    }

    /// MIME type used when offering the text as a download
    pub fn mime_type(&self) -> &'static str {
        match self {
            Format::Json => "application/json;charset=utf-8",
            Format::Csv => "text/csv;charset=utf-8",
        }
    }

    /// Pick the format of an import file from its MIME type or name
    ///
    /// JSON is checked first: a JSON MIME type or a `.json` name wins over
    /// any CSV hint. Extensions match case-insensitively.
    pub fn detect(mime_type: Option<&str>, filename: &str) -> Result<Self, ReadingListError> {
        let essence = mime_type
            .and_then(|mime| mime.split(';').next())
            .map(|mime| mime.trim().to_ascii_lowercase());
        let lower = filename.to_ascii_lowercase();

        let hinted = |format: Format| {
            essence.as_deref() == Some(format.mime_essence())
                || lower.ends_with(&format!(".{}", format.extension()))
        };

        if hinted(Format::Json) {
            Ok(Format::Json)
        } else if hinted(Format::Csv) {
            Ok(Format::Csv)
        } else {
            Err(ReadingListError::UnsupportedFormat {
                name: filename.to_string(),
            })
        }
    }

    fn mime_essence(&self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Csv => "text/csv",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = ReadingListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "csv" => Ok(Format::Csv),
            _ => Err(ReadingListError::UnsupportedFormat {
                name: s.to_string(),
            }),
        }
    }
}

/// A raw object read from an import file, with its position
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// 1-based line (CSV) or array position (JSON)
    pub row: usize,
    pub value: Value,
}

/// Result of decoding an import file
#[derive(Debug, Default)]
pub struct Decoded {
    pub candidates: Vec<Candidate>,
    /// Rows dropped while decoding (CSV column-count mismatches)
    pub skipped: Vec<RowSkipped>,
}

/// Encode records as text
///
/// JSON is a pretty-printed array. CSV uses the first record's keys as the
/// header; the caller adds a byte order mark if the consumer wants one.
pub fn encode(records: &[Record], format: Format) -> Result<String, FormatError> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(records)?),
        Format::Csv => Ok(encode_csv(records)),
    }
}

/// Decode text into candidate objects
pub fn decode(text: &str, format: Format) -> Result<Decoded, FormatError> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    if text.trim().is_empty() {
        return Err(FormatError::Empty);
    }

    let decoded = match format {
        Format::Json => decode_json(text)?,
        Format::Csv => decode_csv(text)?,
    };

    debug!(
        format = %format,
        candidates = decoded.candidates.len(),
        skipped = decoded.skipped.len(),
        "Decoded import file"
    );
    Ok(decoded)
}

/// Escape a CSV field value
///
/// Wraps in double quotes if the value contains commas, quotes, or line
/// breaks, doubling any quotes inside.
pub fn escape_field(value: &str) -> String {
    let needs_quoting = value.contains(',')
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r');

    if needs_quoting {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn encode_csv(records: &[Record]) -> String {
    let rows: Vec<Map<String, Value>> = records.iter().map(Record::to_fields).collect();
    let Some(first) = rows.first() else {
        return String::new();
    };

    let header: Vec<&String> = first.keys().collect();
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        header
            .iter()
            .map(|key| escape_field(key))
            .collect::<Vec<_>>()
            .join(","),
    );

    for row in &rows {
        let line = header
            .iter()
            .map(|key| escape_field(&cell_text(row.get(key.as_str()))))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    lines.join("\n")
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn decode_json(text: &str) -> Result<Decoded, FormatError> {
    let Value::Array(items) = serde_json::from_str::<Value>(text)? else {
        return Err(FormatError::NotAnArray);
    };

    let candidates = items
        .into_iter()
        .enumerate()
        .map(|(index, value)| Candidate {
            row: index + 1,
            value,
        })
        .collect();

    Ok(Decoded {
        candidates,
        skipped: Vec::new(),
    })
}

fn decode_csv(text: &str) -> Result<Decoded, FormatError> {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let missing: Vec<String> = REQUIRED_CSV_HEADERS
        .iter()
        .filter(|required| !headers.iter().any(|header| header == *required))
        .map(|required| required.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(FormatError::MissingHeaders { missing });
    }

    let mut decoded = Decoded::default();
    for result in reader.records() {
        let row = result?;
        let line = row.position().map_or(0, |pos| pos.line() as usize);

        if row.iter().all(|field| field.trim().is_empty()) && row.len() <= 1 {
            continue;
        }

        if row.len() != headers.len() {
            warn!(
                line,
                expected = headers.len(),
                found = row.len(),
                "CSV row does not match the header, skipping"
            );
            decoded.skipped.push(RowSkipped {
                row: line,
                reason: SkipReason::ColumnCount {
                    expected: headers.len(),
                    found: row.len(),
                },
            });
            continue;
        }

        let fields: Map<String, Value> = headers
            .iter()
            .zip(row.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, value)| (header.clone(), Value::String(value.to_string())))
            .collect();

        decoded.candidates.push(Candidate {
            row: line,
            value: Value::Object(fields),
        });
    }

    Ok(decoded)
}
