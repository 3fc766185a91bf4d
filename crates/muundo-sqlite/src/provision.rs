//! Schema provisioning
//!
//! Creates the collections and secondary indexes declared in
//! `muundo_core::schema` and records the schema version in
//! `PRAGMA user_version`. Provisioning only runs when the declared version is
//! higher than the on-disk one, and every table and index is checked for
//! existence before it is created, so reopening a store never duplicates or
//! drops anything.

use muundo_core::schema::{CollectionSchema, IndexSchema, COLLECTIONS};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{debug, info};

use crate::error::{Result, SqliteError};
use crate::LOG_PREFIX;

/// Column holding the serialized record document.
pub const DOCUMENT_COLUMN: &str = "document";

/// Bring the store up to `version`.
///
/// Returns `true` if provisioning ran, `false` if the store was already at
/// `version`.
///
/// # Errors
///
/// Returns `SqliteError::Version` if the store on disk is newer than
/// `version`, or a database error if any statement fails.
pub fn provision(conn: &Connection, version: u32) -> Result<bool> {
    let existing = user_version(conn)?;
    if existing > version {
        return Err(SqliteError::Version {
            requested: version,
            existing,
        });
    }
    if existing == version {
        return Ok(false);
    }

    // Write-lock before re-reading so concurrent first opens provision once
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let existing = user_version(&tx)?;
    if existing >= version {
        tx.commit()?;
        return if existing > version {
            Err(SqliteError::Version {
                requested: version,
                existing,
            })
        } else {
            Ok(false)
        };
    }

    info!(
        "{} Upgrade needed ({} -> {}), creating collections",
        LOG_PREFIX, existing, version
    );

    for schema in COLLECTIONS {
        if !object_exists(&tx, "table", schema.name)? {
            tx.execute_batch(&create_table_sql(schema))?;
            info!("{} Created {} collection", LOG_PREFIX, schema.name);
        }
        for index in schema.indexes {
            if !object_exists(&tx, "index", index.name)? {
                tx.execute_batch(&create_index_sql(schema, index))?;
                debug!("{} Created index {} on {}", LOG_PREFIX, index.name, schema.name);
            }
        }
    }

    tx.pragma_update(None, "user_version", version)?;
    tx.commit()?;

    Ok(true)
}

/// Schema version recorded in the store file.
pub fn user_version(conn: &Connection) -> Result<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Check whether a table or index with this name exists.
pub fn object_exists(conn: &Connection, kind: &str, name: &str) -> Result<bool> {
    let exists = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type = ?1 AND name = ?2")?
        .exists([kind, name])?;
    Ok(exists)
}

/// Quote an identifier for use in SQL.
pub fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// `CREATE TABLE` for a collection: primary key column, one column per
/// indexed field, and the document column.
pub fn create_table_sql(schema: &CollectionSchema) -> String {
    let mut columns = vec![format!("{} TEXT PRIMARY KEY NOT NULL", quote(schema.key_path))];
    for index in schema.indexes {
        columns.push(format!("{} TEXT", quote(index.key_path)));
    }
    columns.push(format!("{} TEXT NOT NULL", DOCUMENT_COLUMN));

    format!(
        "CREATE TABLE {} ({})",
        quote(schema.name),
        columns.join(", ")
    )
}

/// `CREATE INDEX` for a declared secondary index.
pub fn create_index_sql(schema: &CollectionSchema, index: &IndexSchema) -> String {
    format!(
        "CREATE {}INDEX {} ON {} ({})",
        if index.unique { "UNIQUE " } else { "" },
        quote(index.name),
        quote(schema.name),
        quote(index.key_path)
    )
}
