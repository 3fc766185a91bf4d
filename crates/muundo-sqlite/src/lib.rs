//! SQLite storage backend for the Muundo configurator
//!
//! This crate provides the persistence layer behind the configurator: an
//! embedded SQLite store holding the product catalog and user configuration
//! collections, an async record repository over it, and the export/import
//! protocol used for backup and restore.
//!
//! # Layers
//!
//! - [`engine`] - opens the store file and provisions collections and indexes
//! - [`store`] - transaction-scoped `RecordStore` implementation
//! - [`repository`] - async CRUD, one connection and one transaction per call
//! - [`transfer`] - whole-store export to a bundle and import back
//!
//! # Example
//!
//! ```rust,no_run
//! use muundo_core::{ProductRecord, Record};
//! use muundo_sqlite::MuundoDb;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let db = MuundoDb::open_path("MuundoConfigurator.sqlite3")?;
//!
//! let chair = ProductRecord::from_json(
//!     r#"{"Article":"A1","Name":"Chair","Category":"Seating"}"#,
//! )?;
//! db.products().store(chair).await?;
//!
//! let seating = db.products().fetch_by_index("CategoryIndex", "Seating").await?;
//! assert_eq!(seating.len(), 1);
//!
//! let bundle = db.transfer().export_all().await?;
//! db.transfer().import_all(bundle).await?;
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod provision;
pub mod repository;
pub mod store;
pub mod transfer;

use std::path::PathBuf;

use muundo_core::{ProductRecord, StoreError, StoreResult, UserConfigRecord};

// Re-export main types
pub use engine::{Access, EngineConfig, IndexInfo, StorageEngine, StoreInfo};
pub use error::{Result, SqliteError};
pub use repository::Repository;
pub use store::SqliteStore;
pub use transfer::BulkTransfer;

/// Log prefix for store operations.
pub const LOG_PREFIX: &str = "[MuundoDB]";

/// Entry point bundling the engine with both repositories and the transfer protocol.
#[derive(Debug, Clone)]
pub struct MuundoDb {
    engine: StorageEngine,
    products: Repository<ProductRecord>,
    user_configs: Repository<UserConfigRecord>,
    transfer: BulkTransfer,
}

impl MuundoDb {
    /// Wrap an engine. Nothing is opened until the first operation.
    pub fn new(engine: StorageEngine) -> Self {
        Self {
            products: Repository::new(engine.clone()),
            user_configs: Repository::new(engine.clone()),
            transfer: BulkTransfer::new(engine.clone()),
            engine,
        }
    }

    /// Open the store at `path` with default settings, provisioning it if new.
    pub fn open_path(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let engine = StorageEngine::new(path);
        engine.check()?;
        Ok(Self::new(engine))
    }

    /// [`MuundoDb::open_path`] on a blocking worker, for async callers.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        tokio::task::spawn_blocking(move || Self::open_path(path))
            .await
            .map_err(|e| StoreError::StorageUnavailable(format!("worker error: {}", e)))?
    }

    /// Describe the store (version, collections, indexes) from a blocking
    /// worker.
    pub async fn check(&self) -> StoreResult<StoreInfo> {
        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || engine.check())
            .await
            .map_err(|e| Access::Read.fail(format!("worker error: {}", e)))?
    }

    pub fn engine(&self) -> &StorageEngine {
        &self.engine
    }

    pub fn products(&self) -> &Repository<ProductRecord> {
        &self.products
    }

    pub fn user_configs(&self) -> &Repository<UserConfigRecord> {
        &self.user_configs
    }

    pub fn transfer(&self) -> &BulkTransfer {
        &self.transfer
    }
}
