//! Export/import bundle document
//!
//! A bundle carries the full contents of both collections plus a schema tag
//! and the export timestamp:
//!
//! ```json
//! { "products": [...], "userConfigurations": [...], "version": "1.0", "exportDate": "..." }
//! ```
//!
//! `products` and `userConfigurations` must both be present for a bundle to be
//! accepted; `version` and `exportDate` are informational.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{ProductRecord, UserConfigRecord};
use crate::schema::BUNDLE_VERSION;
use crate::storage::{StoreError, StoreResult};

/// Required top-level fields of a bundle document.
const REQUIRED_FIELDS: [&str; 2] = ["products", "userConfigurations"];

/// Serialized snapshot of the whole store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub products: Vec<ProductRecord>,
    pub user_configurations: Vec<UserConfigRecord>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub export_date: String,
}

impl ExportBundle {
    /// Assemble a bundle stamped with the current schema tag and time.
    pub fn new(products: Vec<ProductRecord>, user_configurations: Vec<UserConfigRecord>) -> Self {
        Self::at(products, user_configurations, Utc::now())
    }

    /// Assemble a bundle stamped with the given export time.
    pub fn at(
        products: Vec<ProductRecord>,
        user_configurations: Vec<UserConfigRecord>,
        exported_at: DateTime<Utc>,
    ) -> Self {
        Self {
            products,
            user_configurations,
            version: BUNDLE_VERSION.to_string(),
            export_date: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Parse a serialized bundle.
    ///
    /// Fails with `StoreError::InvalidBundleFormat` if the text is not a JSON
    /// object, lacks `products` or `userConfigurations`, or contains records
    /// that don't decode.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| StoreError::InvalidBundleFormat(format!("not valid JSON: {}", e)))?;

        let object = value.as_object().ok_or_else(|| {
            StoreError::InvalidBundleFormat("bundle is not a JSON object".into())
        })?;

        for field in REQUIRED_FIELDS {
            match object.get(field) {
                None | Some(Value::Null) => {
                    return Err(StoreError::InvalidBundleFormat(format!(
                        "missing `{}`",
                        field
                    )))
                }
                Some(_) => {}
            }
        }

        serde_json::from_value(value).map_err(|e| StoreError::InvalidBundleFormat(e.to_string()))
    }

    /// Serialize with two-space indentation.
    pub fn to_json_pretty(&self) -> StoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Total number of records in the bundle.
    pub fn len(&self) -> usize {
        self.products.len() + self.user_configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Counts of records attempted per collection by a successful import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub products_imported: usize,
    pub configurations_imported: usize,
}

/// File name an export is downloaded as: `muundo_database_export_<YYYY-MM-DD>.json`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("muundo_database_export_{}.json", date.format("%Y-%m-%d"))
}
