//! Record types stored in the two collections
//!
//! Field names on the wire match the documents the configurator front end
//! writes (`Article`, `MaterialOptions`, `userId`, `lastLogin`, ...), so an
//! export produced by either side imports cleanly into the other.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{CollectionSchema, IndexSchema, PRODUCT_CATALOG, USER_CONFIGURATIONS};
use crate::storage::{StoreError, StoreResult};

/// A row in one of the store's collections.
///
/// Implementors name their collection, expose their primary key and the
/// value of each secondary index, and round-trip through a JSON document.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection this record type lives in.
    const SCHEMA: &'static CollectionSchema;

    /// Primary key value.
    fn key(&self) -> &str;

    /// Value of the field an index is built on, if this record type has it.
    fn index_value(&self, index: &IndexSchema) -> Option<&str>;

    /// Serialize to the stored JSON document.
    fn to_json(&self) -> StoreResult<String> {
        serde_json::to_string(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Parse a JSON document into a record.
    fn from_json(json: &str) -> StoreResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| StoreError::Serialization(format!("{}: {}", Self::SCHEMA.name, e)))
    }
}

/// Product catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductRecord {
    /// Article number, primary key
    pub article: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub depth: f64,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub material_options: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl Record for ProductRecord {
    const SCHEMA: &'static CollectionSchema = &PRODUCT_CATALOG;

    fn key(&self) -> &str {
        &self.article
    }

    fn index_value(&self, index: &IndexSchema) -> Option<&str> {
        match index.key_path {
            "Category" => Some(&self.category),
            "Name" => Some(&self.name),
            _ => None,
        }
    }
}

/// Per-user preference snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfigRecord {
    /// Primary key
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub language: String,
    /// Articles the user saved. Not checked against the catalog.
    #[serde(default)]
    pub saved_product_ids: Vec<String>,
    #[serde(default)]
    pub custom_settings: BTreeMap<String, Value>,
    /// ISO-8601 timestamp, kept verbatim
    #[serde(default)]
    pub last_login: String,
}

impl Record for UserConfigRecord {
    const SCHEMA: &'static CollectionSchema = &USER_CONFIGURATIONS;

    fn key(&self) -> &str {
        &self.user_id
    }

    fn index_value(&self, _index: &IndexSchema) -> Option<&str> {
        None
    }
}
