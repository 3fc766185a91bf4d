//! Collection schema descriptors
//!
//! The store holds exactly two collections. Each one declares its primary key
//! path and its secondary indexes here, and engine backends provision from
//! these descriptors rather than from hand-written DDL.

/// Name of the embedded store.
pub const DB_NAME: &str = "MuundoConfigurator";

/// Declared schema version of the embedded store.
pub const SCHEMA_VERSION: u32 = 1;

/// Schema tag written into export bundles.
pub const BUNDLE_VERSION: &str = "1.0";

/// A secondary lookup index on a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSchema {
    /// Index name (e.g. `CategoryIndex`)
    pub name: &'static str,
    /// Record field the index is built on
    pub key_path: &'static str,
    pub unique: bool,
}

/// A named record collection with one primary key and zero or more indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSchema {
    pub name: &'static str,
    /// Record field holding the primary key
    pub key_path: &'static str,
    pub indexes: &'static [IndexSchema],
}

impl CollectionSchema {
    /// Look up a declared index by name.
    pub fn index(&self, name: &str) -> Option<&'static IndexSchema> {
        self.indexes.iter().find(|idx| idx.name == name)
    }
}

/// Product catalog, keyed by `Article`.
pub const PRODUCT_CATALOG: CollectionSchema = CollectionSchema {
    name: "ProductCatalog",
    key_path: "Article",
    indexes: &[
        IndexSchema {
            name: "CategoryIndex",
            key_path: "Category",
            unique: false,
        },
        IndexSchema {
            name: "NameIndex",
            key_path: "Name",
            unique: false,
        },
    ],
};

/// Per-user preference snapshots, keyed by `userId`.
pub const USER_CONFIGURATIONS: CollectionSchema = CollectionSchema {
    name: "UserConfigurations",
    key_path: "userId",
    indexes: &[],
};

/// Every collection the store provisions, in creation order.
pub const COLLECTIONS: &[CollectionSchema] = &[PRODUCT_CATALOG, USER_CONFIGURATIONS];
