//! Reading-list operations
//!
//! `ReadingList` is the main entry point. It owns a [`CollectionStore`]
//! and implements every user-facing operation as read-modify-write:
//!
//! 1. read the full collection from the store
//! 2. compute the new collection in memory
//! 3. write it back with a single `set`
//!
//! Nothing is cached between operations, so a failed write never leaves a
//! stale view behind: the next operation starts from what is persisted.
//!
//! ## Usage
//!
//! ```ignore
//! let list = ReadingList::new(JsonFileStore::from_config(&config));
//!
//! list.save("https://example.com", None, Status::Unread, "")?;
//! let file = list.export(Format::Csv, Utc::now())?;
//! std::fs::write(&file.filename, &file.bytes)?;
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::codec::{self, Format, BOM};
use crate::error::{ReadingListError, Result};
use crate::merge::{self, MergeMode};
use crate::models::{now_timestamp, Record, Status, PLACEHOLDER_TITLE};
use crate::storage::CollectionStore;
use crate::validate::{self, RowSkipped};

/// What `save` did with the page
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The URL was new and a record was appended
    Added(Record),
    /// The URL was already saved and that record was refreshed
    Updated(Record),
}

impl SaveOutcome {
    pub fn record(&self) -> &Record {
        match self {
            SaveOutcome::Added(record) | SaveOutcome::Updated(record) => record,
        }
    }
}

/// A serialized export ready to be written or downloaded
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    /// `reading_list_<YYYY-MM-DD-HH-mm-ss>.<ext>`
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
    /// Number of records written
    pub records: usize,
}

/// Result of a completed import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub mode: MergeMode,
    pub added: usize,
    pub updated: usize,
    /// Rows dropped while decoding or validating
    pub skipped: Vec<RowSkipped>,
}

impl ImportSummary {
    /// The one message shown to the user
    pub fn message(&self) -> String {
        match self.mode {
            MergeMode::Overwrite => {
                format!("Imported {} record(s), replacing the list.", self.added)
            }
            MergeMode::Append => format!(
                "Added {} record(s) and updated {} record(s).",
                self.added, self.updated
            ),
        }
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// The reading list over a collection store
pub struct ReadingList<S> {
    store: S,
}

impl<S: CollectionStore> ReadingList<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Get the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    fn load(&self) -> Result<Vec<Record>> {
        Ok(self.store.get()?)
    }

    fn persist(&self, records: &[Record]) -> Result<()> {
        Ok(self.store.set(records)?)
    }

    // ==================== Queries ====================

    /// All records, newest first, optionally filtered by status
    ///
    /// Records whose `added_at` does not parse sort last; ties keep the
    /// stored order.
    pub fn list(&self, status: Option<Status>) -> Result<Vec<Record>> {
        let mut records = self.load()?;
        if let Some(status) = status {
            records.retain(|record| record.status == status);
        }
        records.sort_by_key(|record| std::cmp::Reverse(record.added_at_time()));
        Ok(records)
    }

    /// Number of stored records
    pub fn count(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }

    /// Get a record by exact id
    pub fn get(&self, id: &str) -> Result<Record> {
        self.load()?
            .into_iter()
            .find(|record| record.id == id)
            .ok_or_else(|| ReadingListError::NotFound(id.to_string()))
    }

    /// The saved record for a URL, if any
    pub fn find_by_url(&self, url: &str) -> Result<Option<Record>> {
        let url = url.trim();
        Ok(self.load()?.into_iter().find(|record| record.url == url))
    }

    /// Resolve a full id or a unique id prefix to a stored id
    pub fn resolve_id(&self, id_or_prefix: &str) -> Result<String> {
        let records = self.load()?;

        if records.iter().any(|record| record.id == id_or_prefix) {
            return Ok(id_or_prefix.to_string());
        }

        let matches: Vec<&Record> = records
            .iter()
            .filter(|record| !id_or_prefix.is_empty() && record.id.starts_with(id_or_prefix))
            .collect();

        match matches.as_slice() {
            [] => Err(ReadingListError::NotFound(id_or_prefix.to_string())),
            [only] => Ok(only.id.clone()),
            _ => Err(ReadingListError::AmbiguousId {
                prefix: id_or_prefix.to_string(),
                matches: matches.len(),
            }),
        }
    }

    // ==================== Edits ====================

    /// Save a page
    ///
    /// If the URL is already in the list, that record takes the new title,
    /// status, comment and timestamp but keeps its id.
    pub fn save(
        &self,
        url: &str,
        title: Option<&str>,
        status: Status,
        comment: &str,
    ) -> Result<SaveOutcome> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ReadingListError::EmptyUrl);
        }
        let title = title
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or(PLACEHOLDER_TITLE);

        let mut records = self.load()?;

        let outcome = match records.iter_mut().find(|record| record.url == url) {
            Some(existing) => {
                existing.title = title.to_string();
                existing.set_status(status);
                existing.set_comment(comment);
                existing.added_at = now_timestamp();
                SaveOutcome::Updated(existing.clone())
            }
            None => {
                let mut record = Record::new(url, title);
                record.set_status(status);
                record.set_comment(comment);
                records.push(record.clone());
                SaveOutcome::Added(record)
            }
        };

        self.persist(&records)?;
        info!(id = %outcome.record().id, url, "Saved page");
        Ok(outcome)
    }

    /// Change the status of a record
    pub fn update_status(&self, id: &str, status: Status) -> Result<Record> {
        self.update(id, |record| record.set_status(status))
    }

    /// Replace the comment of a record (trimmed)
    pub fn update_comment(&self, id: &str, comment: &str) -> Result<Record> {
        self.update(id, |record| record.set_comment(comment))
    }

    fn update(&self, id: &str, change: impl FnOnce(&mut Record)) -> Result<Record> {
        let mut records = self.load()?;
        let record = records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| ReadingListError::NotFound(id.to_string()))?;

        change(record);
        let updated = record.clone();

        self.persist(&records)?;
        info!(id, "Updated record");
        Ok(updated)
    }

    /// Delete a record, returning it
    pub fn delete(&self, id: &str) -> Result<Record> {
        let mut records = self.load()?;
        let index = records
            .iter()
            .position(|record| record.id == id)
            .ok_or_else(|| ReadingListError::NotFound(id.to_string()))?;

        let removed = records.remove(index);
        self.persist(&records)?;
        info!(id, "Deleted record");
        Ok(removed)
    }

    // ==================== Export / Import ====================

    /// Serialize the whole list
    ///
    /// CSV output starts with a UTF-8 byte order mark so spreadsheet
    /// applications detect the encoding; JSON output does not.
    pub fn export(&self, format: Format, now: DateTime<Utc>) -> Result<ExportFile> {
        let records = self.load()?;
        if records.is_empty() {
            return Err(ReadingListError::NothingToExport);
        }

        let text = codec::encode(&records, format)?;
        let bytes = match format {
            Format::Csv => format!("{}{}", BOM, text).into_bytes(),
            Format::Json => text.into_bytes(),
        };

        debug!(format = %format, records = records.len(), "Exported reading list");
        Ok(ExportFile {
            filename: export_filename(format, now),
            mime_type: format.mime_type(),
            bytes,
            records: records.len(),
        })
    }

    /// Import records from text
    ///
    /// Decodes, validates and merges in memory, then writes the collection
    /// once. A structurally invalid file, an empty result, or a failed read
    /// leaves the stored collection untouched.
    pub fn import(&self, text: &str, format: Format, mode: MergeMode) -> Result<ImportSummary> {
        let decoded = codec::decode(text, format)?;
        let mut skipped = decoded.skipped;

        let (incoming, invalid) = validate::normalize_all(decoded.candidates);
        skipped.extend(invalid);
        skipped.sort_by_key(|skip| skip.row);

        if incoming.is_empty() {
            return Err(ReadingListError::EmptyResult);
        }

        let current = self.load()?;
        let outcome = merge::reconcile(&current, incoming, mode);
        self.persist(&outcome.records)?;

        let summary = ImportSummary {
            mode,
            added: outcome.added,
            updated: outcome.updated,
            skipped,
        };
        info!(
            mode = %mode,
            added = summary.added,
            updated = summary.updated,
            skipped = summary.skipped.len(),
            "Import complete"
        );
        Ok(summary)
    }
}

/// `reading_list_<YYYY-MM-DD-HH-mm-ss>.<ext>` for the given instant
pub fn export_filename(format: Format, now: DateTime<Utc>) -> String {
    format!(
        "reading_list_{}.{}",
        now.format("%Y-%m-%d-%H-%M-%S"),
        format.extension()
    )
}
