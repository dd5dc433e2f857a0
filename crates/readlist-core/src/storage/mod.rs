//! Storage layer
//!
//! The collection store persists the whole reading list as one unit.
//!
//! ## Contract
//!
//! - `get` returns the full collection (empty when nothing is stored yet)
//! - `set` replaces the full collection; there are no partial updates,
//!   transactions, or versions
//!
//! A failed `set` must leave the previously stored collection intact.

pub mod error;
pub mod memory;
pub mod persistence;

use crate::models::Record;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use persistence::JsonFileStore;

/// Whole-collection persistence for reading-list records
pub trait CollectionStore {
    /// Read the full collection
    fn get(&self) -> StoreResult<Vec<Record>>;

    /// Replace the full collection
    fn set(&self, records: &[Record]) -> StoreResult<()>;
}

impl<S: CollectionStore + ?Sized> CollectionStore for &S {
    fn get(&self) -> StoreResult<Vec<Record>> {
        (**self).get()
    }

    fn set(&self, records: &[Record]) -> StoreResult<()> {
        (**self).set(records)
    }
}
