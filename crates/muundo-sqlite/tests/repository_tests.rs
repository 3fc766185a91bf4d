//! Record repository tests

use muundo_core::{ProductRecord, Record, StoreError, UserConfigRecord};
use muundo_sqlite::MuundoDb;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn open(dir: &TempDir) -> MuundoDb {
    MuundoDb::open_path(dir.path().join("MuundoConfigurator.sqlite3")).unwrap()
}

/// Helper to create a test product
fn product(article: &str, name: &str, category: &str) -> ProductRecord {
    ProductRecord::from_json(&format!(
        r#"{{"Article":"{}","Name":"{}","Category":"{}","Width":45,"Height":90,"Depth":50,"Weight":7.5,"Price":129.0,"MaterialOptions":["Oak","Walnut"],"Description":"test"}}"#,
        article, name, category
    ))
    .unwrap()
}

fn user(user_id: &str, theme: &str) -> UserConfigRecord {
    UserConfigRecord::from_json(&format!(
        r#"{{"userId":"{}","displayName":"Test","theme":"{}","language":"en","savedProductIds":["A1"],"customSettings":{{"units":"cm","grid":true}},"lastLogin":"2024-01-01T00:00:00.000Z"}}"#,
        user_id, theme
    ))
    .unwrap()
}

#[tokio::test]
async fn test_store_and_fetch_product() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);
    let chair = product("A1", "Chair", "Seating");

    assert!(db.products().store(chair.clone()).await.unwrap());

    let fetched = db.products().fetch_by_key("A1").await.unwrap();
    assert_eq!(fetched, chair);
}

#[tokio::test]
async fn test_store_overwrites_existing_key() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    db.user_configs().store(user("u1", "light")).await.unwrap();
    db.user_configs().store(user("u1", "dark")).await.unwrap();

    assert_eq!(db.user_configs().count().await.unwrap(), 1);
    let fetched = db.user_configs().fetch_by_key("u1").await.unwrap();
    assert_eq!(fetched.theme, "dark");
}

#[tokio::test]
async fn test_fetch_missing_key_is_not_found() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    let err = db.products().fetch_by_key("NOPE").await.unwrap_err();

    assert!(err.is_not_found());
    match err {
        StoreError::NotFound { collection, key } => {
            assert_eq!(collection, "ProductCatalog");
            assert_eq!(key, "NOPE");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_all_on_empty_collection() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    assert!(db.products().fetch_all().await.unwrap().is_empty());
    assert!(db.user_configs().fetch_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);
    db.products().store(product("A1", "Chair", "Seating")).await.unwrap();

    assert!(db.products().delete("A1").await.unwrap());
    assert!(db.products().delete("A1").await.unwrap());
    assert!(db.products().delete("never-existed").await.unwrap());

    assert!(db.products().fetch_by_key("A1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_fetch_by_index() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);
    db.products().store(product("A1", "Chair", "Seating")).await.unwrap();
    db.products().store(product("A2", "Sofa", "Seating")).await.unwrap();
    db.products().store(product("B1", "Table", "Tables")).await.unwrap();

    let seating = db
        .products()
        .fetch_by_index("CategoryIndex", "Seating")
        .await
        .unwrap();
    let articles: Vec<&str> = seating.iter().map(|p| p.article.as_str()).collect();
    assert_eq!(articles, vec!["A1", "A2"]);

    let tables = db.products().fetch_by_index("NameIndex", "Table").await.unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].article, "B1");

    let err = db
        .products()
        .fetch_by_index("PriceIndex", "1")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ReadFailed(_)));
}

#[tokio::test]
async fn test_collections_are_independent() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);
    db.products().store(product("shared", "Chair", "Seating")).await.unwrap();
    db.user_configs().store(user("shared", "dark")).await.unwrap();

    db.user_configs().clear().await.unwrap();

    assert_eq!(db.user_configs().count().await.unwrap(), 0);
    assert_eq!(db.products().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let config = user("u1", "dark");
    {
        let db = open(&dir);
        db.user_configs().store(config.clone()).await.unwrap();
    }

    let db = open(&dir);
    assert_eq!(db.user_configs().fetch_by_key("u1").await.unwrap(), config);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_stores_all_land() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    let mut handles = Vec::new();
    for i in 0..50 {
        let repo = db.products().clone();
        handles.push(tokio::spawn(async move {
            repo.store(product(&format!("P{:03}", i), "Chair", "Seating"))
                .await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().unwrap());
    }

    assert_eq!(db.products().count().await.unwrap(), 50);
}

#[tokio::test]
async fn test_async_open_and_check() {
    let dir = TempDir::new().unwrap();

    let db = MuundoDb::open(dir.path().join("MuundoConfigurator.sqlite3"))
        .await
        .unwrap();
    let info = db.check().await.unwrap();

    assert_eq!(info.version, 1);
    assert_eq!(info.collections, vec!["ProductCatalog", "UserConfigurations"]);
}

#[tokio::test]
async fn test_async_open_unavailable_path() {
    let dir = TempDir::new().unwrap();

    let err = MuundoDb::open(dir.path().join("missing").join("store.sqlite3"))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::StorageUnavailable(_)));
}
