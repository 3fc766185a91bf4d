//! Storage trait definitions

use crate::record::Record;
use crate::storage::error::StoreResult;

/// Collection-scoped operations an engine backend provides for one record type.
///
/// A value implementing this trait is bound to a single open transaction on a
/// single collection; callers decide the transaction's permission (read-only
/// or read-write) before constructing it.
pub trait RecordStore<R: Record> {
    /// Store a record, replacing any existing row with the same key entirely.
    fn put(&mut self, record: &R) -> StoreResult<()>;

    /// Retrieve a record by primary key.
    ///
    /// Returns `None` if not found.
    fn get(&self, key: &str) -> StoreResult<Option<R>>;

    /// Check if a record exists.
    fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Every record in the collection, in engine-defined order.
    fn all(&self) -> StoreResult<Vec<R>>;

    /// Records whose indexed field equals `value`.
    ///
    /// Fails if `index` is not declared on the collection.
    fn by_index(&self, index: &str, value: &str) -> StoreResult<Vec<R>>;

    /// Delete a record by key.
    ///
    /// Returns `true` if a row was removed, `false` if none existed.
    fn delete(&mut self, key: &str) -> StoreResult<bool>;

    /// Number of records in the collection.
    fn count(&self) -> StoreResult<usize> {
        Ok(self.all()?.len())
    }

    /// Remove every record from the collection.
    fn clear(&mut self) -> StoreResult<()>;
}
