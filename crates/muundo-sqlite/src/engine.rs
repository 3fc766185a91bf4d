//! Storage engine adapter
//!
//! `StorageEngine` is a cheap, cloneable handle naming the store file. Every
//! call to [`StorageEngine::open`] opens a fresh connection, provisions the
//! schema if the file is new or older than the declared version, and hands the
//! connection back. Callers own the connection and close it when their single
//! operation is done; [`StorageEngine::with_transaction`] does that for them.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use muundo_core::{StoreError, StoreResult, DB_NAME, SCHEMA_VERSION};
use rusqlite::{Connection, TransactionBehavior};
use tracing::{debug, warn};

use crate::error::{Result, SqliteError};
use crate::provision;
use crate::LOG_PREFIX;

/// Engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Store file location
    pub path: PathBuf,
    /// Declared schema version
    pub version: u32,
    /// How long a connection waits on a locked store before failing
    pub busy_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(format!("{}.sqlite3", DB_NAME)),
            version: SCHEMA_VERSION,
            busy_timeout: Duration::from_secs(30),
        }
    }
}

/// Permission a transaction is opened with.
///
/// Also decides which `StoreError` an engine failure inside the transaction
/// becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    Delete,
}

impl Access {
    fn behavior(self) -> TransactionBehavior {
        match self {
            Access::Read => TransactionBehavior::Deferred,
            Access::Write | Access::Delete => TransactionBehavior::Immediate,
        }
    }

    /// Wrap an engine failure in the error matching this access.
    pub fn fail(self, msg: impl std::fmt::Display) -> StoreError {
        match self {
            Access::Read => StoreError::ReadFailed(msg.to_string()),
            Access::Write => StoreError::WriteFailed(msg.to_string()),
            Access::Delete => StoreError::DeleteFailed(msg.to_string()),
        }
    }
}

/// Index as reported by [`StorageEngine::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    pub name: String,
    pub collection: String,
}

/// Snapshot of what a store file contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreInfo {
    pub path: PathBuf,
    pub version: u32,
    pub collections: Vec<String>,
    pub indexes: Vec<IndexInfo>,
}

/// Handle to the embedded store.
#[derive(Debug, Clone)]
pub struct StorageEngine {
    config: Arc<EngineConfig>,
}

impl StorageEngine {
    /// Engine for the store file at `path` with default settings.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_config(EngineConfig {
            path: path.into(),
            ..EngineConfig::default()
        })
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Open a connection, creating and provisioning the store on first use.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::StorageUnavailable` carrying the engine's error
    /// description if the file cannot be opened or provisioned.
    pub fn open(&self) -> StoreResult<Connection> {
        debug!("{} Opening {}", LOG_PREFIX, self.config.path.display());
        self.open_connection().map_err(|e| {
            warn!("{} Error opening database: {}", LOG_PREFIX, e);
            StoreError::StorageUnavailable(e.to_string())
        })
    }

    fn open_connection(&self) -> Result<Connection> {
        let conn = Connection::open(&self.config.path)?;
        conn.busy_timeout(self.config.busy_timeout)?;
        // Readers must not block the writers of overlapping transactions
        conn.pragma_update_and_check(None, "journal_mode", "wal", |row| row.get::<_, String>(0))?;
        provision::provision(&conn, self.config.version)?;
        Ok(conn)
    }

    /// Run `op` inside one transaction on a fresh connection.
    ///
    /// The transaction commits when `op` succeeds and rolls back when it
    /// fails. The connection is closed on both paths before returning. Read
    /// access additionally puts the connection in `query_only` mode.
    pub fn with_transaction<T>(
        &self,
        access: Access,
        op: impl FnOnce(&Connection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut conn = self.open()?;

        let result = run_in_transaction(&mut conn, access, op);

        if let Err((_, e)) = conn.close() {
            warn!("{} Error closing connection: {}", LOG_PREFIX, e);
            if result.is_ok() {
                return Err(access.fail(e));
            }
        }
        result
    }

    /// Open the store and report its version, collections and indexes.
    pub fn check(&self) -> StoreResult<StoreInfo> {
        self.with_transaction(Access::Read, |conn| {
            self.describe(conn).map_err(|e| Access::Read.fail(e))
        })
    }

    fn describe(&self, conn: &Connection) -> Result<StoreInfo> {
        let version = provision::user_version(conn)?;

        let collections = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )?
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let indexes = conn
            .prepare(
                "SELECT name, tbl_name FROM sqlite_master
                 WHERE type = 'index' AND sql IS NOT NULL
                 ORDER BY name",
            )?
            .query_map([], |row| {
                Ok(IndexInfo {
                    name: row.get(0)?,
                    collection: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(StoreInfo {
            path: self.config.path.clone(),
            version,
            collections,
            indexes,
        })
    }

    /// Delete a store file together with its WAL and shared-memory files.
    ///
    /// Missing files are not an error.
    pub fn destroy(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        for suffix in ["", "-wal", "-shm"] {
            let mut file = path.as_os_str().to_owned();
            file.push(suffix);
            match std::fs::remove_file(&file) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(SqliteError::Io(e)),
            }
        }
        Ok(())
    }
}

fn run_in_transaction<T>(
    conn: &mut Connection,
    access: Access,
    op: impl FnOnce(&Connection) -> StoreResult<T>,
) -> StoreResult<T> {
    if access == Access::Read {
        conn.pragma_update(None, "query_only", true)
            .map_err(|e| access.fail(e))?;
    }

    let tx = conn
        .transaction_with_behavior(access.behavior())
        .map_err(|e| access.fail(e))?;

    // Dropping an uncommitted transaction rolls it back
    let value = op(&tx)?;
    tx.commit().map_err(|e| access.fail(e))?;
    Ok(value)
}
