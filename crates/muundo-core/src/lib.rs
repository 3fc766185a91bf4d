//! Muundo Core
//!
//! Shared types for the Muundo product configurator's local persistence:
//! the two record collections (product catalog, user configurations), their
//! schema descriptors, the export/import bundle document and the storage
//! contract that engine backends implement.
//!
//! # Example
//!
//! ```rust
//! use muundo_core::{ProductRecord, Record};
//!
//! let chair = ProductRecord {
//!     article: "A1".into(),
//!     name: "Chair".into(),
//!     category: "Seating".into(),
//!     width: 40.0,
//!     height: 90.0,
//!     depth: 40.0,
//!     weight: 5.0,
//!     price: 120.0,
//!     material_options: vec!["Wood".into()],
//!     description: "x".into(),
//! };
//!
//! let json = chair.to_json().unwrap();
//! let back = ProductRecord::from_json(&json).unwrap();
//! assert_eq!(back, chair);
//! assert_eq!(back.key(), "A1");
//! ```

pub mod bootstrap;
pub mod bundle;
pub mod record;
pub mod schema;
pub mod storage;

// Re-export main types at crate root
pub use bootstrap::LoaderState;
pub use bundle::{export_file_name, ExportBundle, ImportSummary};
pub use record::{ProductRecord, Record, UserConfigRecord};
pub use schema::{
    CollectionSchema, IndexSchema, BUNDLE_VERSION, DB_NAME, PRODUCT_CATALOG, SCHEMA_VERSION,
    USER_CONFIGURATIONS,
};
pub use storage::{RecordStore, StoreError, StoreResult};
