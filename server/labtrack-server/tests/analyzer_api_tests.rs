//! HTTP-level tests for the analyzer endpoints and their audit history
//!
//! The router runs against the in-memory stores. Every check on history
//! flushes the audit queue first, since entries are written asynchronously.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use config_engine::{AppConfig, StorageBackend};
use database_layer::{
    Analyzer, AnalyzerFilter, AnalyzerPatch, AnalyzerStore, DatabaseError, DatabaseResult,
    HistoryEntry, HistoryStore, MemoryAnalyzerStore, MemoryHistoryStore, MemoryTableRegistry,
    NewAnalyzer, NewHistoryEntry,
};
use labtrack_server::{create_app, middleware::USER_EMAIL_HEADER, LabTrackServer, Stores};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

const USER: &str = "tech@lab.example";

struct TestApp<S = MemoryAnalyzerStore> {
    router: Router,
    server: LabTrackServer,
    analyzers: Arc<S>,
    history: Arc<MemoryHistoryStore>,
}

struct FailingHistoryStore;

#[async_trait]
impl HistoryStore for FailingHistoryStore {
    async fn append(&self, _entry: NewHistoryEntry) -> DatabaseResult<HistoryEntry> {
        Err(DatabaseError::ConnectionFailed("history store offline".to_string()))
    }

    async fn list_for_analyzer(&self, _analyzer_id: Uuid) -> DatabaseResult<Vec<HistoryEntry>> {
        Ok(Vec::new())
    }
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.backend = StorageBackend::Memory;
    config
}

/// Delegates to an in-memory store; writes fail while `offline` is set
#[derive(Default)]
struct OfflineWritesStore {
    inner: MemoryAnalyzerStore,
    offline: AtomicBool,
}

impl OfflineWritesStore {
    fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    fn check_online(&self) -> DatabaseResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DatabaseError::ConnectionFailed("analyzer store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AnalyzerStore for OfflineWritesStore {
    async fn create(&self, analyzer: NewAnalyzer) -> DatabaseResult<Analyzer> {
        self.check_online()?;
        self.inner.create(analyzer).await
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Analyzer>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> DatabaseResult<Vec<Analyzer>> {
        self.inner.find_by_ids(ids).await
    }

    async fn find_all(&self, filter: AnalyzerFilter) -> DatabaseResult<Vec<Analyzer>> {
        self.inner.find_all(filter).await
    }

    async fn update_by_id(&self, id: Uuid, patch: &AnalyzerPatch) -> DatabaseResult<Option<Analyzer>> {
        self.check_online()?;
        self.inner.update_by_id(id, patch).await
    }

    async fn update_by_ids(&self, ids: &[Uuid], patch: &AnalyzerPatch) -> DatabaseResult<u64> {
        self.check_online()?;
        self.inner.update_by_ids(ids, patch).await
    }

    async fn delete_by_id(&self, id: Uuid) -> DatabaseResult<Option<Analyzer>> {
        self.check_online()?;
        self.inner.delete_by_id(id).await
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

fn build(
    analyzers: Arc<dyn AnalyzerStore>,
    history: Arc<dyn HistoryStore>,
) -> (Router, LabTrackServer) {
    let config = test_config();
    let stores = Stores {
        analyzers,
        tables: Arc::new(MemoryTableRegistry::with_tables(&[config.audit.table_name.as_str()])),
        history,
        pool: None,
    };

    let (server, _worker) = LabTrackServer::new(config, &stores);
    (create_app(server.clone()), server)
}

fn app_with<S: AnalyzerStore + 'static>(analyzers: Arc<S>) -> TestApp<S> {
    let history = Arc::new(MemoryHistoryStore::new());
    let (router, server) = build(analyzers.clone(), history.clone());
    TestApp {
        router,
        server,
        analyzers,
        history,
    }
}

fn test_app() -> TestApp {
    app_with(Arc::new(MemoryAnalyzerStore::new()))
}

impl<S> TestApp<S> {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        user: Option<&str>,
    ) -> (StatusCode, Value) {
        send(&self.router, method, uri, body, user).await
    }

    async fn create(&self, body: Value) -> Analyzer {
        let (status, created) = self
            .send(Method::POST, "/api/v1/analyzers", Some(body), Some(USER))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        serde_json::from_value(created).unwrap()
    }

    async fn history(&self) -> Vec<HistoryEntry> {
        self.server.analyzers.audit().flush().await.unwrap();
        self.history.entries()
    }
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    user: Option<&str>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        request = request.header(USER_EMAIL_HEADER, user);
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

fn analyzer_uri(id: Uuid) -> String {
    format!("/api/v1/analyzers/{id}")
}

#[tokio::test]
async fn test_create_records_one_history_entry() {
    let app = test_app();
    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/analyzers",
            Some(json!({"name": "A1", "actived": true, "serialNumber": "SN-7"})),
            Some(USER),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "A1");
    assert_eq!(body["serialNumber"], "SN-7");
    assert!(body.get("revision").is_none());

    let created: Analyzer = serde_json::from_value(body).unwrap();
    let history = app.history().await;
    assert_eq!(history.len(), 1);

    let entry = &history[0];
    assert_eq!(entry.action, "Create analyzer");
    assert_eq!(entry.analyzer_id, created.id);
    assert_eq!(entry.user_email, USER);
    assert_eq!(entry.brief.as_deref(), Some("Create new analyzer: A1"));

    let recorded: Analyzer = serde_json::from_str(&entry.data).unwrap();
    assert_eq!(recorded, created);
}

#[tokio::test]
async fn test_find_by_id_matches_create_response() {
    let app = test_app();
    let (_, created) = app
        .send(Method::POST, "/api/v1/analyzers", Some(json!({"name": "A1"})), Some(USER))
        .await;
    let id: Uuid = serde_json::from_value(created["id"].clone()).unwrap();

    let (status, found) = app.send(Method::GET, &analyzer_uri(id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found, created);
}

#[tokio::test]
async fn test_find_by_id_missing_is_not_found() {
    let app = test_app();
    let (status, body) = app
        .send(Method::GET, &analyzer_uri(Uuid::new_v4()), None, None)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_type"], "not_found");
    assert_eq!(body["message"], "Resource not found: analyzer");
    assert!(body["error_id"].is_string());
}

#[tokio::test]
async fn test_invalid_id_is_bad_request() {
    let app = test_app();
    let (status, body) = app
        .send(Method::GET, "/api/v1/analyzers/not-a-uuid", None, None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");
}

#[tokio::test]
async fn test_update_without_tracked_change_records_nothing() {
    let app = test_app();
    let analyzer = app.create(json!({"name": "A1", "actived": true})).await;

    let (status, body) = app
        .send(
            Method::PUT,
            &analyzer_uri(analyzer.id),
            Some(json!({"actived": true, "name": "A1 renamed", "room": "B2"})),
            Some(USER),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error_code": 0}));

    let history = app.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, "Create analyzer");

    let (_, current) = app.send(Method::GET, &analyzer_uri(analyzer.id), None, None).await;
    assert_eq!(current["name"], "A1 renamed");
    assert_eq!(current["room"], "B2");
}

#[tokio::test]
async fn test_assign_then_unassign_briefs() {
    let app = test_app();
    let analyzer = app.create(json!({"name": "A1"})).await;

    let (status, _) = app
        .send(
            Method::PUT,
            &analyzer_uri(analyzer.id),
            Some(json!({"performedBy": "bob"})),
            Some(USER),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Method::PUT,
            &analyzer_uri(analyzer.id),
            Some(json!({"performedBy": ""})),
            Some(USER),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let history = app.history().await;
    assert_eq!(history.len(), 3);

    assert_eq!(history[1].action, "Update analyzer");
    assert_eq!(history[1].brief.as_deref(), Some("Assign A1 to bob"));
    assert_eq!(history[1].data, r#"{"performedBy":"bob"}"#);

    assert_eq!(history[2].brief.as_deref(), Some("Unassign A1"));
}

#[tokio::test]
async fn test_status_and_assignment_change_concatenates_briefs() {
    let app = test_app();
    let analyzer = app
        .create(json!({"name": "A1", "actived": true, "performedBy": ""}))
        .await;

    let (status, _) = app
        .send(
            Method::PUT,
            &analyzer_uri(analyzer.id),
            Some(json!({"actived": false, "performedBy": "bob"})),
            Some(USER),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let history = app.history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(
        history[1].brief.as_deref(),
        Some("Updated analyzer: A1\n Changed status from true to false\nAssign A1 to bob")
    );
}

#[tokio::test]
async fn test_update_missing_is_not_found_without_history() {
    let app = test_app();
    let (status, body) = app
        .send(
            Method::PUT,
            &analyzer_uri(Uuid::new_v4()),
            Some(json!({"actived": true})),
            Some(USER),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_type"], "not_found");
    assert!(app.history().await.is_empty());
}

#[tokio::test]
async fn test_delete_missing_is_not_found_without_history() {
    let app = test_app();
    let (status, body) = app
        .send(Method::DELETE, &analyzer_uri(Uuid::new_v4()), None, Some(USER))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Resource not found: analyzer");
    assert!(app.history().await.is_empty());
}

#[tokio::test]
async fn test_delete_returns_entity_and_records_history() {
    let app = test_app();
    let analyzer = app.create(json!({"name": "A1"})).await;

    let (status, body) = app
        .send(Method::DELETE, &analyzer_uri(analyzer.id), None, Some(USER))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("revision").is_none());
    let deleted: Analyzer = serde_json::from_value(body).unwrap();
    assert_eq!(deleted, analyzer);

    let history = app.history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].action, "Delete analyzer");
    assert_eq!(history[1].brief.as_deref(), Some("Deleted analyzer: A1"));

    let (status, _) = app.send(Method::GET, &analyzer_uri(analyzer.id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(app.analyzers.is_empty());
}

#[tokio::test]
async fn test_bulk_update_with_empty_ids_writes_nothing() {
    let app = test_app();
    let analyzer = app.create(json!({"name": "A1"})).await;

    let (status, body) = app
        .send(
            Method::PATCH,
            "/api/v1/analyzers",
            Some(json!({"ids": [], "properties": {"actived": true}})),
            Some(USER),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "bad_request");

    let (_, current) = app.send(Method::GET, &analyzer_uri(analyzer.id), None, None).await;
    assert_eq!(current["actived"], false);
    assert_eq!(app.history().await.len(), 1);
}

#[tokio::test]
async fn test_bulk_update_with_empty_properties_is_bad_request() {
    let app = test_app();
    let analyzer = app.create(json!({"name": "A1"})).await;

    let (status, _) = app
        .send(
            Method::PATCH,
            "/api/v1/analyzers",
            Some(json!({"ids": [analyzer.id]})),
            Some(USER),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.history().await.len(), 1);
}

#[tokio::test]
async fn test_bulk_update_records_one_entry_per_matched_analyzer() {
    let app = test_app();
    let first = app.create(json!({"name": "A1"})).await;
    let second = app.create(json!({"name": "A2"})).await;

    let (status, body) = app
        .send(
            Method::PATCH,
            "/api/v1/analyzers",
            Some(json!({
                "ids": [first.id, second.id, Uuid::new_v4()],
                "properties": {"actived": true}
            })),
            Some(USER),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error_code": 0}));

    let history = app.history().await;
    let updates: Vec<&HistoryEntry> = history
        .iter()
        .filter(|entry| entry.action == "Update analyzer")
        .collect();
    assert_eq!(updates.len(), 2);

    let first_entry = updates
        .iter()
        .find(|entry| entry.analyzer_id == first.id)
        .unwrap();
    assert_eq!(
        first_entry.brief.as_deref(),
        Some("Updated analyzer: A1\n Changed status from false to true")
    );
    let snapshot: Analyzer = serde_json::from_str(&first_entry.data).unwrap();
    assert!(!snapshot.actived);

    let (_, current) = app.send(Method::GET, &analyzer_uri(second.id), None, None).await;
    assert_eq!(current["actived"], true);
}

#[tokio::test]
async fn test_find_all_hides_disabled_analyzers() {
    let app = test_app();
    let visible = app.create(json!({"name": "visible"})).await;
    let hidden = app.create(json!({"name": "hidden", "enabled": false})).await;

    let (status, body) = app.send(Method::GET, "/api/v1/analyzers", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let listed: Vec<Analyzer> = serde_json::from_value(body).unwrap();
    assert_eq!(listed, vec![visible]);

    // Disabled analyzers stay reachable by id
    let (status, _) = app.send(Method::GET, &analyzer_uri(hidden.id), None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_mutations_require_acting_user() {
    let app = test_app();
    let (status, body) = app
        .send(Method::POST, "/api/v1/analyzers", Some(json!({"name": "A1"})), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_type"], "authentication_error");
    assert!(app.analyzers.is_empty());
    assert!(app.history().await.is_empty());
}

#[tokio::test]
async fn test_create_rejects_blank_name() {
    let app = test_app();
    let (status, body) = app
        .send(Method::POST, "/api/v1/analyzers", Some(json!({"name": " "})), Some(USER))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");
    assert!(app.analyzers.is_empty());
}

#[tokio::test]
async fn test_history_failure_does_not_fail_request() {
    let analyzers = Arc::new(MemoryAnalyzerStore::new());
    let (router, server) = build(analyzers.clone(), Arc::new(FailingHistoryStore));

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/analyzers",
        Some(json!({"name": "A1"})),
        Some(USER),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "A1");
    server.analyzers.audit().flush().await.unwrap();
    assert_eq!(analyzers.len(), 1);
}

#[tokio::test]
async fn test_health_reports_memory_backend() {
    let app = test_app();
    let (status, body) = app.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["storage_backend"], "memory");
}

#[tokio::test]
async fn test_update_history_omits_reserved_keys() {
    let app = test_app();
    let analyzer = app.create(json!({"name": "A1"})).await;

    let (status, _) = app
        .send(
            Method::PUT,
            &analyzer_uri(analyzer.id),
            Some(json!({"performedBy": "bob", "id": "other", "__v": 3, "room": "B2"})),
            Some(USER),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let history = app.history().await;
    assert_eq!(history.len(), 2);
    let recorded: Value = serde_json::from_str(&history[1].data).unwrap();
    assert_eq!(recorded, json!({"performedBy": "bob", "room": "B2"}));
}

#[tokio::test]
async fn test_store_failure_is_database_error_without_history() {
    let app = app_with(Arc::new(OfflineWritesStore::default()));
    let analyzer = app.create(json!({"name": "A1"})).await;
    app.analyzers.go_offline();

    let requests = [
        (Method::POST, "/api/v1/analyzers".to_string(), Some(json!({"name": "A2"}))),
        (Method::PUT, analyzer_uri(analyzer.id), Some(json!({"actived": true}))),
        (Method::DELETE, analyzer_uri(analyzer.id), None),
    ];
    for (method, uri, body) in requests {
        let (status, body) = app.send(method.clone(), &uri, body, Some(USER)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
        assert_eq!(body["error_type"], "database_error");
        assert_eq!(body["code"], "DB_4001");
        assert!(body["error_id"].is_string());
    }

    let history = app.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, "Create analyzer");

    let (status, _) = app.send(Method::GET, &analyzer_uri(analyzer.id), None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_failed_bulk_update_records_no_history() {
    let app = app_with(Arc::new(OfflineWritesStore::default()));
    let first = app.create(json!({"name": "A1"})).await;
    let second = app.create(json!({"name": "A2"})).await;
    app.analyzers.go_offline();

    let (status, body) = app
        .send(
            Method::PATCH,
            "/api/v1/analyzers",
            Some(json!({"ids": [first.id, second.id], "properties": {"actived": true}})),
            Some(USER),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_type"], "database_error");

    let history = app.history().await;
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|entry| entry.action == "Create analyzer"));
}

#[tokio::test]
async fn test_bulk_update_with_repeated_id_records_one_entry() {
    let app = test_app();
    let analyzer = app.create(json!({"name": "A1"})).await;

    let (status, _) = app
        .send(
            Method::PATCH,
            "/api/v1/analyzers",
            Some(json!({"ids": [analyzer.id, analyzer.id], "properties": {"actived": true}})),
            Some(USER),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let history = app.history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].action, "Update analyzer");
}
