//! JSON file persistence
//!
//! Stores the reading list as a pretty-printed JSON array. Uses atomic
//! writes (write to temp file, then rename) so a failed write leaves the
//! previous collection in place.
//!
//! Storage location: `~/.local/share/readlist/reading_list.json`
//! (configurable via `Config`)

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::models::Record;
use crate::storage::{CollectionStore, StoreError, StoreResult};

/// Collection store backed by a single JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store for the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store at the configured collection path
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.collection_path())
    }

    /// Path of the collection file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CollectionStore for JsonFileStore {
    fn get(&self) -> StoreResult<Vec<Record>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "No reading list on disk yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::from_read_io(e, self.path.clone())),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| StoreError::CorruptCollection {
            path: self.path.clone(),
            details: e.to_string(),
        })
    }

    fn set(&self, records: &[Record]) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(records)?;
        atomic_write(&self.path, json.as_bytes())?;
        info!(path = ?self.path, records = records.len(), "Saved reading list");
        Ok(())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// This ensures the target file is never left in a partially-written state.
fn atomic_write(path: &Path, data: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = path.with_extension("json.tmp");

    if let Err(e) = write_synced(&temp_path, data) {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::from_io(e, temp_path));
    }

    fs::rename(&temp_path, path).map_err(|source| {
        let _ = fs::remove_file(&temp_path);
        StoreError::AtomicWriteFailed {
            from: temp_path.clone(),
            to: path.to_path_buf(),
            source,
        }
    })
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use tempfile::TempDir;

    fn test_store(temp_dir: &TempDir) -> JsonFileStore {
        JsonFileStore::new(temp_dir.path().join("reading_list.json"))
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        assert!(!store.path().exists());
        assert!(store.get().unwrap().is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let mut record = Record::new("https://example.com", "Example");
        record.set_status(Status::Reading);
        record.set_comment("chapter 3");
        store.set(&[record.clone()]).unwrap();
        assert!(store.path().exists());

        let loaded = store.get().unwrap();
        assert_eq!(loaded, vec![record]);
    }

    #[test]
    fn test_set_replaces_whole_collection() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let records: Vec<Record> = (0..10)
            .map(|i| Record::new(format!("https://example{}.com", i), ""))
            .collect();
        store.set(&records).unwrap();
        assert_eq!(store.get().unwrap().len(), 10);

        store.set(&records[..3]).unwrap();
        assert_eq!(store.get().unwrap(), records[..3].to_vec());
    }

    #[test]
    fn test_file_is_pretty_json_array() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.set(&[Record::new("https://example.com", "Example")]).unwrap();
        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.starts_with("[\n  {"));
        assert!(!temp_dir.path().join("reading_list.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        fs::write(store.path(), "{ not a list").unwrap();

        let err = store.get().unwrap_err();
        assert!(matches!(err, StoreError::CorruptCollection { .. }));
    }

    #[test]
    fn test_failed_write_keeps_previous_collection() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let original = vec![Record::new("https://example.com", "Example")];
        store.set(&original).unwrap();

        // A directory where the temp file should go makes the write fail
        fs::create_dir(temp_dir.path().join("reading_list.json.tmp")).unwrap();
        let result = store.set(&[Record::new("https://other.example", "Other")]);
        assert!(result.is_err());

        assert_eq!(store.get().unwrap(), original);
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir
            .path()
            .join("a")
            .join("b")
            .join("c")
            .join("list.json");

        atomic_write(&nested_path, b"[]").unwrap();

        assert!(nested_path.exists());
        let content = fs::read_to_string(&nested_path).unwrap();
        assert_eq!(content, "[]");
    }
}
