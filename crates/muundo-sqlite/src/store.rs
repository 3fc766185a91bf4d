//! SQLite-backed `RecordStore` bound to one open transaction

use std::marker::PhantomData;

use muundo_core::{Record, RecordStore, StoreError, StoreResult};
use rusqlite::{Connection, OptionalExtension};

use crate::engine::Access;
use crate::provision::{quote, DOCUMENT_COLUMN};

/// Record store over one collection, borrowing an open connection or
/// transaction.
///
/// Each row keeps the record's primary key, a copy of every indexed field and
/// the full JSON document. Reads decode the document only.
pub struct SqliteStore<'c, R> {
    conn: &'c Connection,
    _record: PhantomData<fn() -> R>,
}

impl<'c, R: Record> SqliteStore<'c, R> {
    /// Wrap a connection (or a transaction, which derefs to one).
    ///
    /// The connection must already be provisioned; use
    /// [`crate::engine::StorageEngine::open`] to get one.
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            _record: PhantomData,
        }
    }

    fn table() -> String {
        quote(R::SCHEMA.name)
    }

    fn key_column() -> String {
        quote(R::SCHEMA.key_path)
    }

    fn select_documents(&self, sql: &str, params: impl rusqlite::Params) -> StoreResult<Vec<R>> {
        let mut stmt = self.conn.prepare(sql).map_err(|e| Access::Read.fail(e))?;
        let documents = stmt
            .query_map(params, |row| row.get::<_, String>(0))
            .map_err(|e| Access::Read.fail(e))?
            .collect::<Result<Vec<String>, rusqlite::Error>>()
            .map_err(|e| Access::Read.fail(e))?;

        documents.iter().map(|doc| R::from_json(doc)).collect()
    }
}

impl<R: Record> RecordStore<R> for SqliteStore<'_, R> {
    fn put(&mut self, record: &R) -> StoreResult<()> {
        let schema = R::SCHEMA;
        let document = record.to_json()?;

        let mut columns = vec![Self::key_column()];
        let mut values: Vec<&str> = vec![record.key()];
        for index in schema.indexes {
            columns.push(quote(index.key_path));
            values.push(record.index_value(index).unwrap_or_default());
        }
        columns.push(DOCUMENT_COLUMN.to_string());
        values.push(&document);

        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
            Self::table(),
            columns.join(", "),
            placeholders
        );

        self.conn
            .execute(&sql, rusqlite::params_from_iter(values))
            .map_err(|e| Access::Write.fail(e))?;
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<Option<R>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            DOCUMENT_COLUMN,
            Self::table(),
            Self::key_column()
        );

        let document: Option<String> = self
            .conn
            .query_row(&sql, [key], |row| row.get(0))
            .optional()
            .map_err(|e| Access::Read.fail(e))?;

        document.map(|doc| R::from_json(&doc)).transpose()
    }

    fn all(&self) -> StoreResult<Vec<R>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {}",
            DOCUMENT_COLUMN,
            Self::table(),
            Self::key_column()
        );
        self.select_documents(&sql, [])
    }

    fn by_index(&self, index: &str, value: &str) -> StoreResult<Vec<R>> {
        let schema = R::SCHEMA;
        let index = schema.index(index).ok_or_else(|| {
            StoreError::ReadFailed(format!("no index named {} on {}", index, schema.name))
        })?;

        // INDEXED BY makes SQLite fail loudly if the index went missing
        let sql = format!(
            "SELECT {} FROM {} INDEXED BY {} WHERE {} = ? ORDER BY {}",
            DOCUMENT_COLUMN,
            Self::table(),
            quote(index.name),
            quote(index.key_path),
            Self::key_column()
        );
        self.select_documents(&sql, [value])
    }

    fn delete(&mut self, key: &str) -> StoreResult<bool> {
        let sql = format!("DELETE FROM {} WHERE {} = ?", Self::table(), Self::key_column());
        let rows = self
            .conn
            .execute(&sql, [key])
            .map_err(|e| Access::Delete.fail(e))?;
        Ok(rows > 0)
    }

    fn count(&self) -> StoreResult<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", Self::table());
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| Access::Read.fail(e))?;
        Ok(count as usize)
    }

    fn clear(&mut self) -> StoreResult<()> {
        let sql = format!("DELETE FROM {}", Self::table());
        self.conn
            .execute(&sql, [])
            .map_err(|e| Access::Delete.fail(e))?;
        Ok(())
    }
}
