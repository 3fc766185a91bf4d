//! Storage contract for record collections
//!
//! This module defines the `RecordStore` trait that engine backends implement
//! for each record type, plus the error taxonomy shared by every layer above
//! the engine. The SQLite backend lives in the `muundo-sqlite` crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use muundo_core::{ProductRecord, RecordStore};
//!
//! fn restock(store: &mut impl RecordStore<ProductRecord>, product: ProductRecord) {
//!     store.put(&product).unwrap();
//!     assert!(store.get(&product.article).unwrap().is_some());
//! }
//! ```

mod error;
mod traits;

pub use error::{StoreError, StoreResult};
pub use traits::RecordStore;
