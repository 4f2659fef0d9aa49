//! Integration tests for a full synchronization run
//!
//! These tests use wiremock to stand in for the Epicollect5 export endpoint
//! and a temporary SQLite file for the database.

use epicollect_sync::config::{Config, DatabaseConfig, HttpConfig, SourceConfig};
use epicollect_sync::fetcher::FetchError;
use epicollect_sync::storage::{SqliteStorage, Storage};
use epicollect_sync::{run_sync, Entry, SyncError};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: String, db_path: &Path) -> Config {
    Config {
        source: SourceConfig { base_url },
        database: DatabaseConfig {
            path: db_path.to_string_lossy().into_owned(),
        },
        http: HttpConfig::default(),
    }
}

fn entry_json(numero_acta: i64, monto: &str) -> String {
    format!(
        r#"{{
            "ec5_uuid": "uuid-{n}",
            "title": "Acta {n}",
            "partida": {partida},
            "titular": "Titular {n}",
            "fecha_visita": "2023-03-0{d}",
            "latitud": -31.42{n},
            "longitud": -64.18{n},
            "numero_acta": {n},
            "monto_notificado": "{monto}"
        }}"#,
        n = numero_acta,
        partida = 5000 + numero_acta,
        d = numero_acta % 9 + 1,
        monto = monto
    )
}

fn body(entries: &[String]) -> String {
    format!(
        r#"{{"meta": {{"total": {}}}, "data": {{"entries": [{}]}}}}"#,
        entries.len(),
        entries.join(",")
    )
}

async fn serve(server: &MockServer, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path("/api/export/entries/catastro"))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "application/json"),
        )
        .mount(server)
        .await;
}

fn stored(db_path: &Path) -> Vec<Entry> {
    let storage = SqliteStorage::open(db_path).expect("Failed to open DB");
    storage.list_entries().expect("Failed to list entries")
}

#[tokio::test]
async fn test_full_sync_then_resync() {
    let server = MockServer::start().await;
    serve(
        &server,
        200,
        body(&[entry_json(1, "1000"), entry_json(2, "2000"), entry_json(3, "3000")]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("prueba.db");
    let config = test_config(
        format!("{}/api/export/entries/catastro", server.uri()),
        &db_path,
    );

    let first = run_sync(&config).await.expect("First run failed");
    assert_eq!(first.fetched, 3);
    assert_eq!(first.inserted, 3);

    let second = run_sync(&config).await.expect("Second run failed");
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 3);

    let rows = stored(&db_path);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].title.as_deref(), Some("Acta 1"));
    assert_eq!(rows[2].monto_notificado.as_deref(), Some("3000"));
}

#[tokio::test]
async fn test_renotified_amount_accumulates() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("prueba.db");

    let server = MockServer::start().await;
    serve(&server, 200, body(&[entry_json(1, "1000")])).await;
    let config = test_config(
        format!("{}/api/export/entries/catastro", server.uri()),
        &db_path,
    );
    run_sync(&config).await.unwrap();

    let server = MockServer::start().await;
    serve(&server, 200, body(&[entry_json(1, "1250")])).await;
    let config = test_config(
        format!("{}/api/export/entries/catastro", server.uri()),
        &db_path,
    );
    let report = run_sync(&config).await.unwrap();

    assert_eq!(report.inserted, 1);
    let amounts: Vec<String> = stored(&db_path)
        .into_iter()
        .filter_map(|e| e.monto_notificado)
        .collect();
    assert_eq!(amounts, vec!["1000".to_string(), "1250".to_string()]);
}

#[tokio::test]
async fn test_empty_fetch_succeeds_without_changes() {
    let server = MockServer::start().await;
    serve(&server, 200, body(&[])).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("prueba.db");
    let config = test_config(
        format!("{}/api/export/entries/catastro", server.uri()),
        &db_path,
    );

    let report = run_sync(&config).await.expect("Empty run failed");

    assert_eq!(report.fetched, 0);
    assert_eq!(report.inserted, 0);
    assert!(stored(&db_path).is_empty());
}

#[tokio::test]
async fn test_fetch_failure_leaves_database_untouched() {
    let server = MockServer::start().await;
    serve(&server, 500, "internal error".to_string()).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("prueba.db");
    let config = test_config(
        format!("{}/api/export/entries/catastro", server.uri()),
        &db_path,
    );

    let result = run_sync(&config).await;

    assert!(matches!(
        result,
        Err(SyncError::Fetch(FetchError::Status { .. }))
    ));
    assert!(!db_path.exists(), "database must not be created on fetch failure");
}

#[tokio::test]
async fn test_malformed_response_is_a_fetch_failure() {
    let server = MockServer::start().await;
    serve(&server, 200, r#"{"data": {"entries": {"title": "sin lista"}}}"#.to_string()).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("prueba.db");
    let config = test_config(
        format!("{}/api/export/entries/catastro", server.uri()),
        &db_path,
    );

    let result = run_sync(&config).await;

    assert!(matches!(
        result,
        Err(SyncError::Fetch(FetchError::Parse { .. }))
    ));
    assert!(!db_path.exists());
}

#[tokio::test]
async fn test_unanswered_fields_sync_once() {
    let unanswered = r#"{
        "title": "Acta 7",
        "partida": "",
        "titular": null,
        "fecha_visita": "2023-03-08",
        "latitud": "",
        "longitud": null,
        "numero_acta": 7,
        "monto_notificado": ""
    }"#;
    let server = MockServer::start().await;
    serve(
        &server,
        200,
        body(&[unanswered.to_string(), entry_json(8, "800")]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("prueba.db");
    let config = test_config(
        format!("{}/api/export/entries/catastro", server.uri()),
        &db_path,
    );

    let first = run_sync(&config).await.expect("First run failed");
    assert_eq!(first.inserted, 2);

    let second = run_sync(&config).await.expect("Second run failed");
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 2);

    let rows = stored(&db_path);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].partida, Value::Text(String::new()));
    assert_eq!(rows[0].titular, None);
    assert_eq!(rows[0].longitud, Value::Null);
}

#[tokio::test]
async fn test_insert_failure_rolls_back_run() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("prueba.db");

    // Seed one row and a trigger that rejects record number 3
    {
        let mut storage = SqliteStorage::open(&db_path).unwrap();
        storage.ensure_schema().unwrap();
        storage
            .sync_entries(&[serde_json::from_str(&entry_json(9, "900")).unwrap()])
            .unwrap();
        storage.close().unwrap();

        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_acta_3 BEFORE INSERT ON entries
             WHEN NEW.numero_acta = 3
             BEGIN SELECT RAISE(ABORT, 'induced failure'); END;",
        )
        .unwrap();
    }

    let server = MockServer::start().await;
    serve(
        &server,
        200,
        body(&[entry_json(1, "100"), entry_json(2, "200"), entry_json(3, "300")]),
    )
    .await;
    let config = test_config(
        format!("{}/api/export/entries/catastro", server.uri()),
        &db_path,
    );

    let result = run_sync(&config).await;

    assert!(matches!(result, Err(SyncError::Storage(_))));
    let rows = stored(&db_path);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].numero_acta, Value::Integer(9));
}

#[tokio::test]
async fn test_one_new_one_existing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("prueba.db");
    {
        let mut storage = SqliteStorage::open(&db_path).unwrap();
        storage
            .sync_entries(&[serde_json::from_str(&entry_json(4, "400")).unwrap()])
            .unwrap();
    }

    let server = MockServer::start().await;
    serve(&server, 200, body(&[entry_json(5, "500"), entry_json(4, "400")])).await;
    let config = test_config(
        format!("{}/api/export/entries/catastro", server.uri()),
        &db_path,
    );

    let report = run_sync(&config).await.unwrap();

    assert_eq!(report.inserted, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(stored(&db_path).len(), 2);
}
