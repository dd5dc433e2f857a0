//! readlist Core Library
//!
//! This crate provides the core functionality for readlist, a personal
//! reading list: pages saved with a status (unread/reading/read) and a
//! free-text comment, exportable to and importable from JSON or CSV.
//!
//! # Architecture
//!
//! - **Collection store**: whole-collection get/set persistence
//! - **Codec**: JSON/CSV text to raw candidate objects and back
//! - **Validator**: raw candidate objects to well-formed records
//! - **Merge engine**: reconciles imported records with the stored list
//!
//! Every operation re-reads the store when it starts and finishes with at
//! most one whole-collection write.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let list = ReadingList::new(JsonFileStore::from_config(&config));
//!
//! // Save a page
//! list.save("https://example.com", Some("Example"), Status::Unread, "")?;
//!
//! // Import a CSV export, merging by URL
//! let summary = list.import(&text, Format::Csv, MergeMode::Append)?;
//! println!("{}", summary);
//! ```
//!
//! # Modules
//!
//! - `reading_list`: Operations over the stored list (main entry point)
//! - `models`: The record type and its status
//! - `validate`: Record normalization
//! - `codec`: JSON/CSV encoding and decoding
//! - `merge`: Import reconciliation
//! - `storage`: Collection store trait and implementations
//! - `config`: Application configuration

pub mod codec;
pub mod config;
pub mod error;
pub mod merge;
pub mod models;
pub mod reading_list;
pub mod storage;
pub mod validate;

pub use codec::{Candidate, Decoded, Format, FormatError};
pub use config::Config;
pub use error::{ReadingListError, Result};
pub use merge::{MergeMode, MergeOutcome};
pub use models::{Record, Status};
pub use reading_list::{ExportFile, ImportSummary, ReadingList, SaveOutcome};
pub use storage::{CollectionStore, JsonFileStore, MemoryStore, StoreError};
pub use validate::{RowSkipped, SkipReason};
