//! Error types for reading-list operations
//!
//! Each operation ends in either a success summary or exactly one of these
//! errors. Row-level problems during import are not errors; they are
//! collected as [`RowSkipped`](crate::validate::RowSkipped) diagnostics.

use thiserror::Error;

use crate::codec::FormatError;
use crate::storage::StoreError;

/// Errors that can occur during reading-list operations
#[derive(Error, Debug)]
pub enum ReadingListError {
    /// The import file is structurally invalid
    #[error("Invalid import file: {0}")]
    Format(#[from] FormatError),

    /// The file is neither JSON nor CSV
    #[error("Unsupported file format '{name}'. Choose a JSON or CSV file.")]
    UnsupportedFormat { name: String },

    #[error("Unknown import mode '{0}'. Use 'append' or 'overwrite'.")]
    InvalidMergeMode(String),

    #[error("Unknown status '{0}'. Use 'unread', 'reading' or 'read'.")]
    InvalidStatus(String),

    /// Nothing usable was left after validation
    #[error("No valid records could be read from the file")]
    EmptyResult,

    #[error("There is nothing to export")]
    NothingToExport,

    #[error("No record found matching '{0}'")]
    NotFound(String),

    #[error("Ambiguous id '{prefix}' matches {matches} records. Please provide more characters.")]
    AmbiguousId { prefix: String, matches: usize },

    #[error("A URL is required")]
    EmptyUrl,

    /// Reading or writing the collection failed
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// Result type for reading-list operations
pub type Result<T> = std::result::Result<T, ReadingListError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReadingListError::UnsupportedFormat {
            name: "notes.txt".to_string(),
        };
        assert!(err.to_string().contains("notes.txt"));

        let err = ReadingListError::AmbiguousId {
            prefix: "ab".to_string(),
            matches: 3,
        };
        assert!(err.to_string().contains("3 records"));
    }

    #[test]
    fn test_format_error_conversion() {
        let err: ReadingListError = FormatError::NotAnArray.into();
        assert!(matches!(err, ReadingListError::Format(_)));
    }

    #[test]
    fn test_persistence_conversion() {
        let err: ReadingListError = StoreError::Unavailable("offline".to_string()).into();
        assert!(matches!(err, ReadingListError::Persistence(_)));
        assert!(err.to_string().contains("offline"));
    }
}
