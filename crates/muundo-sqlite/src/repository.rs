//! Async record repository
//!
//! Every operation is self-contained: it opens its own connection on a
//! blocking worker, runs exactly one request inside a transaction scoped to
//! the record type's collection, and closes the connection before the future
//! resolves. No connection outlives the call that opened it.

use std::marker::PhantomData;

use muundo_core::{Record, RecordStore, StoreError, StoreResult};
use tracing::debug;

use crate::engine::{Access, StorageEngine};
use crate::store::SqliteStore;
use crate::LOG_PREFIX;

/// Typed CRUD over one collection.
pub struct Repository<R> {
    engine: StorageEngine,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for Repository<R> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            _record: PhantomData,
        }
    }
}

impl<R> std::fmt::Debug for Repository<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("collection", &std::any::type_name::<R>())
            .field("engine", &self.engine)
            .finish()
    }
}

impl<R: Record> Repository<R> {
    pub fn new(engine: StorageEngine) -> Self {
        Self {
            engine,
            _record: PhantomData,
        }
    }

    /// Store a record, replacing any existing record with the same key.
    ///
    /// Resolves `true` on success.
    ///
    /// # Errors
    ///
    /// `StorageUnavailable` if the store cannot be opened, `WriteFailed` on
    /// engine error.
    pub async fn store(&self, record: R) -> StoreResult<bool> {
        debug!(
            "{} Attempting to store {} record: {}",
            LOG_PREFIX,
            R::SCHEMA.name,
            record.key()
        );
        self.run(Access::Write, move |store| {
            store.put(&record)?;
            debug!("{} Stored {} record: {}", LOG_PREFIX, R::SCHEMA.name, record.key());
            Ok(true)
        })
        .await
    }

    /// Fetch the record with this primary key.
    ///
    /// # Errors
    ///
    /// `NotFound` carrying the key if no such record exists, `ReadFailed` on
    /// engine error.
    pub async fn fetch_by_key(&self, key: &str) -> StoreResult<R> {
        debug!("{} Attempting to retrieve {} record: {}", LOG_PREFIX, R::SCHEMA.name, key);
        let key = key.to_string();
        self.run(Access::Read, move |store| {
            store
                .get(&key)?
                .ok_or_else(|| StoreError::not_found(R::SCHEMA.name, &key))
        })
        .await
    }

    /// Fetch every record in the collection, ordered by primary key.
    ///
    /// An empty collection resolves an empty vector.
    pub async fn fetch_all(&self) -> StoreResult<Vec<R>> {
        let records = self.run(Access::Read, |store| store.all()).await?;
        debug!("{} Retrieved {} {} records", LOG_PREFIX, records.len(), R::SCHEMA.name);
        Ok(records)
    }

    /// Fetch records through a declared secondary index (e.g. `CategoryIndex`).
    pub async fn fetch_by_index(&self, index: &str, value: &str) -> StoreResult<Vec<R>> {
        let (index, value) = (index.to_string(), value.to_string());
        self.run(Access::Read, move |store| store.by_index(&index, &value))
            .await
    }

    /// Delete the record with this key.
    ///
    /// Resolves `true` whether or not the record existed.
    ///
    /// # Errors
    ///
    /// `DeleteFailed` only on engine error.
    pub async fn delete(&self, key: &str) -> StoreResult<bool> {
        debug!("{} Attempting to delete {} record: {}", LOG_PREFIX, R::SCHEMA.name, key);
        let key = key.to_string();
        self.run(Access::Delete, move |store| {
            let existed = store.delete(&key)?;
            debug!(
                "{} Delete {} record {}: existed={}",
                LOG_PREFIX,
                R::SCHEMA.name,
                key,
                existed
            );
            Ok(true)
        })
        .await
    }

    /// Number of records in the collection.
    pub async fn count(&self) -> StoreResult<usize> {
        self.run(Access::Read, |store| store.count()).await
    }

    /// Remove every record from the collection.
    pub async fn clear(&self) -> StoreResult<()> {
        self.run(Access::Delete, |store| store.clear()).await
    }

    /// Run one collection-scoped operation on a blocking worker.
    async fn run<T, F>(&self, access: Access, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteStore<'_, R>) -> StoreResult<T> + Send + 'static,
    {
        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || {
            engine.with_transaction(access, |conn| op(&mut SqliteStore::new(conn)))
        })
        .await
        .map_err(|e| access.fail(format!("worker error: {}", e)))?
    }
}
