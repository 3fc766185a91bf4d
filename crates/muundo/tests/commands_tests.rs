//! End-to-end command tests against a temporary store

use std::path::{Path, PathBuf};

use clap::Parser;
use muundo::cli::Cli;
use muundo::commands;
use muundo::self_test;
use muundo_core::{ExportBundle, StoreError};
use muundo_sqlite::MuundoDb;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("MuundoConfigurator.sqlite3")
}

/// Parse `args` as a command line and run it, returning stdout.
async fn muundo(db: &Path, args: &[&str]) -> Result<String, muundo::CliError> {
    let db = db.to_string_lossy().to_string();
    let mut argv = vec!["muundo", "--db", db.as_str()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv)?;

    let mut out = Vec::new();
    commands::run(cli.command, &cli.db, &mut out).await?;
    Ok(String::from_utf8(out)?)
}

#[tokio::test]
async fn test_check_provisions_new_store() {
    let dir = TempDir::new().unwrap();

    let out = muundo(&db_path(&dir), &["check"]).await.unwrap();

    assert!(out.contains("version: 1"));
    assert!(out.contains("collection ProductCatalog"));
    assert!(out.contains("collection UserConfigurations"));
    assert!(out.contains("index CategoryIndex on ProductCatalog"));
    assert!(out.contains("index NameIndex on ProductCatalog"));
}

#[tokio::test]
async fn test_product_put_get_list_delete() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir);

    let chair = r#"{"Article":"A1","Name":"Chair","Category":"Seating","Width":45,"Price":129.5}"#;
    let out = muundo(&db, &["product", "put", chair]).await.unwrap();
    assert_eq!(out, "stored product A1\n");

    let out = muundo(&db, &["product", "get", "A1"]).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["Name"], "Chair");
    assert_eq!(value["Price"], 129.5);

    let out = muundo(&db, &["product", "list", "--category", "Seating"]).await.unwrap();
    let listed: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
    assert_eq!(listed.len(), 1);

    let out = muundo(&db, &["product", "list", "--name", "Sofa"]).await.unwrap();
    let listed: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
    assert!(listed.is_empty());

    muundo(&db, &["product", "delete", "A1"]).await.unwrap();
    let err = muundo(&db, &["product", "get", "A1"]).await.unwrap_err();
    let err = err.downcast::<StoreError>().unwrap();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_user_put_from_file() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir);
    let record = dir.path().join("user.json");
    std::fs::write(&record, r#"{"userId":"u1","displayName":"Ana","theme":"dark"}"#).unwrap();

    let arg = format!("@{}", record.display());
    muundo(&db, &["user", "put", &arg]).await.unwrap();

    let out = muundo(&db, &["user", "list"]).await.unwrap();
    let listed: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["displayName"], "Ana");
}

#[tokio::test]
async fn test_put_rejects_record_without_key() {
    let dir = TempDir::new().unwrap();

    let err = muundo(&db_path(&dir), &["product", "put", r#"{"Name":"Chair"}"#])
        .await
        .unwrap_err();

    let err = err.downcast::<StoreError>().unwrap();
    assert!(matches!(*err, StoreError::Serialization(_)));
}

#[tokio::test]
async fn test_export_then_import_into_fresh_store() {
    let source = TempDir::new().unwrap();
    let chair = r#"{"Article":"A1","Name":"Chair","Category":"Seating"}"#;
    muundo(&db_path(&source), &["product", "put", chair]).await.unwrap();

    let out = muundo(&db_path(&source), &["export", "--stdout"]).await.unwrap();
    let bundle = ExportBundle::from_json(&out).unwrap();
    assert_eq!(bundle.products.len(), 1);

    let out_dir = source.path().to_string_lossy().to_string();
    let out = muundo(&db_path(&source), &["export", "--out-dir", &out_dir]).await.unwrap();
    let file = out.trim().strip_prefix("exported to ").unwrap().to_string();

    let target = TempDir::new().unwrap();
    let out = muundo(&db_path(&target), &["import", &file]).await.unwrap();
    assert_eq!(out, "imported 1 products, 0 user configurations\n");

    let db = MuundoDb::open_path(db_path(&target)).unwrap();
    assert_eq!(db.products().fetch_by_key("A1").await.unwrap().name, "Chair");
}

#[tokio::test]
async fn test_reset_deletes_store() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir);
    muundo(&db, &["check"]).await.unwrap();
    assert!(db.exists());

    muundo(&db, &["reset"]).await.unwrap();
    assert!(!db.exists());
}

#[tokio::test]
async fn test_self_test_passes_and_cleans_up_export_probes() {
    let dir = TempDir::new().unwrap();
    let db = MuundoDb::open_path(db_path(&dir)).unwrap();

    let report = self_test::run(&db).await.unwrap();

    assert_eq!(report.products_after_storage_check, 1);
    assert_eq!(report.import.products_imported, 2);
    assert_eq!(report.import.configurations_imported, 2);
    assert_eq!(db.products().count().await.unwrap(), 2);
    assert_eq!(db.user_configs().count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_self_test_keeps_existing_probe_records() {
    let dir = TempDir::new().unwrap();
    let db_file = db_path(&dir);
    let existing =
        r#"{"Article":"EXPORT_TEST","Name":"Export Test Product","Category":"Mine","Price":1.0}"#;
    muundo(&db_file, &["product", "put", existing]).await.unwrap();

    let out = muundo(&db_file, &["self-test"]).await.unwrap();
    assert!(out.starts_with("self-test passed"));

    let db = MuundoDb::open_path(&db_file).unwrap();
    let kept = db.products().fetch_by_key("EXPORT_TEST").await.unwrap();
    assert_eq!(kept.category, "Mine");
}

#[tokio::test]
async fn test_serve_refuses_origin_on_listen_address() {
    let dir = TempDir::new().unwrap();

    let err = muundo(
        &db_path(&dir),
        &[
            "serve",
            "--listen",
            "127.0.0.1:18080",
            "--origin",
            "http://localhost:18080/",
        ],
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("listen address"), "{err}");
}
