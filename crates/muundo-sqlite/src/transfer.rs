//! Bulk export/import of the whole store
//!
//! Export reads both collections concurrently and assembles an
//! [`ExportBundle`]. Import writes every record of a bundle back through the
//! record repository, one overwrite per record, with all writes in flight at
//! once.
//!
//! Import is not atomic across records: if one write fails the import fails
//! with `StoreError::ImportFailed`, and every record that was written stays
//! committed.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use muundo_core::{
    export_file_name, ExportBundle, ImportSummary, ProductRecord, Record, StoreError,
    StoreResult, UserConfigRecord,
};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::engine::StorageEngine;
use crate::repository::Repository;
use crate::LOG_PREFIX;

/// Export/import over both collections.
#[derive(Debug, Clone)]
pub struct BulkTransfer {
    products: Repository<ProductRecord>,
    user_configs: Repository<UserConfigRecord>,
}

impl BulkTransfer {
    pub fn new(engine: StorageEngine) -> Self {
        Self {
            products: Repository::new(engine.clone()),
            user_configs: Repository::new(engine),
        }
    }

    /// Snapshot both collections into a bundle stamped with the current time.
    ///
    /// Never mutates the store; an empty store exports empty collections.
    pub async fn export_all(&self) -> StoreResult<ExportBundle> {
        self.export_at(Utc::now()).await
    }

    async fn export_at(&self, exported_at: DateTime<Utc>) -> StoreResult<ExportBundle> {
        debug!("{} Exporting all database data", LOG_PREFIX);

        let (products, user_configs) =
            tokio::try_join!(self.products.fetch_all(), self.user_configs.fetch_all())?;

        info!(
            "{} Exported {} products and {} user configurations",
            LOG_PREFIX,
            products.len(),
            user_configs.len()
        );
        Ok(ExportBundle::at(products, user_configs, exported_at))
    }

    /// Export and serialize with two-space indentation.
    pub async fn export_json(&self) -> StoreResult<String> {
        self.export_all().await?.to_json_pretty()
    }

    /// Export into `dir` as `muundo_database_export_<YYYY-MM-DD>.json`.
    ///
    /// Returns the path written. An existing file for the same day is
    /// overwritten.
    pub async fn write_export_file(&self, dir: impl AsRef<Path>) -> StoreResult<PathBuf> {
        let now = Utc::now();
        let json = self.export_at(now).await?.to_json_pretty()?;
        let path = dir.as_ref().join(export_file_name(now.date_naive()));

        tokio::fs::write(&path, json)
            .await
            .map_err(|e| StoreError::WriteFailed(format!("{}: {}", path.display(), e)))?;

        info!("{} Database export written to {}", LOG_PREFIX, path.display());
        Ok(path)
    }

    /// Write every record of `bundle` back into the store.
    ///
    /// One store call is issued per record, all with overwrite semantics and
    /// all in flight together. The call waits for every write to finish
    /// before reporting.
    ///
    /// # Errors
    ///
    /// `ImportFailed` carrying the first failure observed. Records whose
    /// writes succeeded remain in the store.
    pub async fn import_all(&self, bundle: ExportBundle) -> StoreResult<ImportSummary> {
        let summary = ImportSummary {
            products_imported: bundle.products.len(),
            configurations_imported: bundle.user_configurations.len(),
        };
        info!(
            "{} Found {} products and {} user configurations to import",
            LOG_PREFIX, summary.products_imported, summary.configurations_imported
        );

        let mut writes = JoinSet::new();
        for product in bundle.products {
            spawn_store(&mut writes, &self.products, product);
        }
        for config in bundle.user_configurations {
            spawn_store(&mut writes, &self.user_configs, config);
        }

        let mut first_error: Option<StoreError> = None;
        while let Some(joined) = writes.join_next().await {
            let outcome = joined
                .map_err(|e| StoreError::WriteFailed(format!("import worker: {}", e)))
                .and_then(|stored| stored);
            if let Err(e) = outcome {
                warn!("{} Error during import: {}", LOG_PREFIX, e);
                first_error.get_or_insert(e);
            }
        }

        if let Some(e) = first_error {
            return Err(StoreError::ImportFailed(Box::new(e)));
        }

        info!("{} Successfully imported all data", LOG_PREFIX);
        Ok(summary)
    }

    /// Parse a serialized bundle and import it.
    ///
    /// A malformed bundle fails with `InvalidBundleFormat` before anything is
    /// written.
    pub async fn import_json(&self, json: &str) -> StoreResult<ImportSummary> {
        let bundle = ExportBundle::from_json(json)?;
        self.import_all(bundle).await
    }
}

fn spawn_store<R: Record>(
    writes: &mut JoinSet<StoreResult<bool>>,
    repository: &Repository<R>,
    record: R,
) {
    let repository = repository.clone();
    writes.spawn(async move { repository.store(record).await });
}
