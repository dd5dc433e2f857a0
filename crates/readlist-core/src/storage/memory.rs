//! In-memory collection store
//!
//! Useful for tests and for embedding the reading list without touching
//! the filesystem. Writes can be made to fail on demand.

use std::cell::{Cell, RefCell};

use crate::models::Record;
use crate::storage::{CollectionStore, StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<Vec<Record>>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `records`
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: RefCell::new(records),
            ..Self::default()
        }
    }

    /// Make every following `set` fail (or succeed again)
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Copy of the stored collection
    pub fn snapshot(&self) -> Vec<Record> {
        self.records.borrow().clone()
    }
}

impl CollectionStore for MemoryStore {
    fn get(&self) -> StoreResult<Vec<Record>> {
        Ok(self.snapshot())
    }

    fn set(&self, records: &[Record]) -> StoreResult<()> {
        if self.fail_writes.get() {
            return Err(StoreError::Unavailable("writes are disabled".to_string()));
        }
        *self.records.borrow_mut() = records.to_vec();
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
