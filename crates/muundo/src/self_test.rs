//! Storage and export/import self-checks
//!
//! Three checks run in order against a live store:
//!
//! 1. product storage: store the `TEST001` probe, read it back, compare
//! 2. user configuration storage: same with the `user123` probe
//! 3. export/import: make sure the `EXPORT_TEST` product and
//!    `export_test_user` configuration exist, export, delete whichever of
//!    the two this run created, import the export, and check both are back
//!
//! The probes from checks 1 and 2 stay in the store afterwards.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use muundo_core::{ImportSummary, ProductRecord, StoreError, UserConfigRecord};
use muundo_sqlite::MuundoDb;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use crate::tracing::prefix;

#[derive(Debug, Error)]
pub enum SelfTestError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{check} check failed: {detail}")]
    Mismatch { check: &'static str, detail: String },
}

/// Outcome of a passing run.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfTestReport {
    /// Products in the store after the product check
    pub products_after_storage_check: usize,
    pub import: ImportSummary,
}

pub async fn run(db: &MuundoDb) -> Result<SelfTestReport, SelfTestError> {
    let products_after_storage_check = check_product_storage(db).await?;
    info!("{} Product storage test passed", prefix::DB);

    check_user_config_storage(db).await?;
    info!("{} User configuration storage test passed", prefix::DB);

    let import = check_export_import(db).await?;
    info!("{} Export/Import test passed", prefix::DB);

    Ok(SelfTestReport {
        products_after_storage_check,
        import,
    })
}

fn probe_product(article: &str, name: &str, description: &str) -> ProductRecord {
    ProductRecord {
        article: article.into(),
        name: name.into(),
        category: "Test".into(),
        width: 100.0,
        height: 75.0,
        depth: 50.0,
        weight: 25.0,
        price: 199.99,
        material_options: vec!["Wood".into(), "Metal".into(), "Glass".into()],
        description: description.into(),
    }
}

fn probe_user(user_id: &str, display_name: &str, saved: &[&str]) -> UserConfigRecord {
    let custom_settings = BTreeMap::from([
        ("showPrices".to_string(), json!(true)),
        ("enableNotifications".to_string(), json!(false)),
        ("zoomLevel".to_string(), json!(1.2)),
    ]);
    UserConfigRecord {
        user_id: user_id.into(),
        display_name: display_name.into(),
        theme: "dark".into(),
        language: "en".into(),
        saved_product_ids: saved.iter().map(|s| s.to_string()).collect(),
        custom_settings,
        last_login: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

fn expect_eq(check: &'static str, what: &str, expected: &str, actual: &str) -> Result<(), SelfTestError> {
    if expected == actual {
        Ok(())
    } else {
        Err(SelfTestError::Mismatch {
            check,
            detail: format!("{} is {:?}, expected {:?}", what, actual, expected),
        })
    }
}

async fn check_product_storage(db: &MuundoDb) -> Result<usize, SelfTestError> {
    debug!("{} Testing product storage", prefix::DB);
    db.products()
        .store(probe_product("TEST001", "Test Product", "This is a test product"))
        .await?;

    let retrieved = db.products().fetch_by_key("TEST001").await?;
    expect_eq("product storage", "Name", "Test Product", &retrieved.name)?;

    let total = db.products().count().await?;
    debug!("{} Total products in database: {}", prefix::DB, total);
    Ok(total)
}

async fn check_user_config_storage(db: &MuundoDb) -> Result<(), SelfTestError> {
    debug!("{} Testing user configuration storage", prefix::DB);
    db.user_configs()
        .store(probe_user("user123", "Test User", &["TEST001", "UNITY001"]))
        .await?;

    let retrieved = db.user_configs().fetch_by_key("user123").await?;
    expect_eq("user configuration storage", "displayName", "Test User", &retrieved.display_name)
}

/// Store `record` unless its key is already present. Returns whether it was
/// created.
async fn ensure_product(db: &MuundoDb, record: ProductRecord) -> Result<bool, StoreError> {
    match db.products().fetch_by_key(&record.article).await {
        Ok(_) => Ok(false),
        Err(e) if e.is_not_found() => db.products().store(record).await,
        Err(e) => Err(e),
    }
}

async fn ensure_user(db: &MuundoDb, record: UserConfigRecord) -> Result<bool, StoreError> {
    match db.user_configs().fetch_by_key(&record.user_id).await {
        Ok(_) => Ok(false),
        Err(e) if e.is_not_found() => db.user_configs().store(record).await,
        Err(e) => Err(e),
    }
}

async fn check_export_import(db: &MuundoDb) -> Result<ImportSummary, SelfTestError> {
    debug!("{} Testing export/import functionality", prefix::DB);

    let product_created = ensure_product(
        db,
        probe_product(
            "EXPORT_TEST",
            "Export Test Product",
            "This is a test product for export/import",
        ),
    )
    .await?;
    let user_created = ensure_user(
        db,
        probe_user("export_test_user", "Export Test User", &["EXPORT_TEST"]),
    )
    .await?;

    let bundle = db.transfer().export_all().await?;
    debug!("{} Database exported, now clearing and reimporting", prefix::DB);

    if product_created {
        db.products().delete("EXPORT_TEST").await?;
    }
    if user_created {
        db.user_configs().delete("export_test_user").await?;
    }

    let summary = db.transfer().import_all(bundle).await?;
    debug!(
        "{} Import completed: {} products, {} configurations",
        prefix::DB,
        summary.products_imported,
        summary.configurations_imported
    );

    let product = db.products().fetch_by_key("EXPORT_TEST").await?;
    expect_eq("export/import", "product Name", "Export Test Product", &product.name)?;

    let user = db.user_configs().fetch_by_key("export_test_user").await?;
    expect_eq("export/import", "user displayName", "Export Test User", &user.display_name)?;

    Ok(summary)
}
