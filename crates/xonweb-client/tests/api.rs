//! Client behaviour against a local mock of the REST API

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use rstest::rstest;
use serde_json::{json, Value};
use tempfile::TempDir;
use xonweb_client::{clear_all, ApiClient, AuthService, ClientError, ItemStatusSync, SessionStore};
use xonweb_config::ApiConfig;
use xonweb_core::models::RegisterRequest;
use xonweb_core::{ItemStatus, TaskStatus, TransactionForm, WorkReportInput};

const GOOD_TOKEN: &str = "good-token";

#[derive(Default)]
struct MockState {
    me_calls: AtomicUsize,
    logout_calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
    item_status: Mutex<Option<(String, String, String)>>,
    bodies: Mutex<Vec<Value>>,
}

impl MockState {
    fn record(&self, line: String) {
        self.seen.lock().unwrap().push(line);
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Not authenticated" })))
}

fn transaction(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "project_id": "p1",
        "category": "bahan",
        "description": "Semen",
        "amount": 650000.0,
        "items": [{"description": "Semen", "quantity": 10, "unit": "sak", "unit_price": 65000, "total": 650000, "status": status}],
        "transaction_date": "2024-05-01T09:30:00+07:00"
    })
}

async fn me(State(state): State<Arc<MockState>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    state.me_calls.fetch_add(1, Ordering::SeqCst);
    match bearer(&headers).as_deref() {
        Some(GOOD_TOKEN) => (
            StatusCode::OK,
            Json(json!({"id": "u1", "email": "ani@xon.id", "name": "Ani", "role": "accounting", "picture": null})),
        ),
        _ => unauthorized(),
    }
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == "ani" && body["password"] == "rahasia" {
        (
            StatusCode::OK,
            Json(json!({
                "message": "Login successful",
                "user": {"id": "u1", "email": "ani@xon.id", "name": "Ani", "role": "accounting"},
                "session_token": GOOD_TOKEN,
                "token": GOOD_TOKEN
            })),
        )
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Invalid credentials" })))
    }
}

async fn logout(State(state): State<Arc<MockState>>) -> (StatusCode, Json<Value>) {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "boom" })))
}

async fn register() -> (StatusCode, Json<Value>) {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "detail": "Public registration is disabled. Contact an administrator." })),
    )
}

async fn list_transactions(State(state): State<Arc<MockState>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if bearer(&headers).as_deref() != Some(GOOD_TOKEN) {
        return unauthorized();
    }
    state.record("GET /transactions".to_string());
    let status = match state.item_status.lock().unwrap().as_ref() {
        Some((_, _, status)) => status.clone(),
        None => "receiving".to_string(),
    };
    let deleted = state.deleted.lock().unwrap().clone();
    let list: Vec<Value> = ["t1", "t/2"]
        .iter()
        .filter(|id| !deleted.contains(&id.to_string()))
        .map(|id| transaction(id, &status))
        .collect();
    (StatusCode::OK, Json(Value::Array(list)))
}

async fn create_transaction(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Json<Value> {
    state.bodies.lock().unwrap().push(body);
    Json(json!({ "message": "Transaction created", "id": "t9" }))
}

async fn delete_transaction(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    if id == "t1" {
        state.deleted.lock().unwrap().push(id);
        (StatusCode::OK, Json(json!({ "message": "Transaction deleted" })))
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "detail": "Transaction not found" })))
    }
}

async fn item_status(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let index = query.get("item_index").cloned().unwrap_or_default();
    if index != "0" {
        return (StatusCode::BAD_REQUEST, Json(json!({ "detail": "Invalid item index" })));
    }
    let status = query.get("new_status").cloned().unwrap_or_default();
    *state.item_status.lock().unwrap() = Some((id, index, status));
    (StatusCode::OK, Json(json!({ "message": "Item status updated" })))
}

async fn tasks(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let assigned = query.get("assigned_to").cloned().unwrap_or_default();
    Json(json!([
        {"id": "k1", "title": "Cek pondasi", "assigned_to": assigned, "status": "in_progress", "priority": "high"}
    ]))
}

async fn task_report(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record(format!("POST /tasks/{}/report", id));
    state.bodies.lock().unwrap().push(body);
    Json(json!({ "message": "Report submitted", "id": "r1" }))
}

async fn task_update(State(state): State<Arc<MockState>>, Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    state.record(format!("PATCH /tasks/{}", id));
    state.bodies.lock().unwrap().push(body);
    Json(json!({ "message": "Task updated" }))
}

async fn item_names(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let mut names = vec!["Semen Gresik", "Pasir Beton"];
    if query.get("project_type").map(String::as_str) == Some("interior") {
        names.push("HPL Taco");
    }
    Json(json!({ "item_names": names }))
}

async fn suppliers() -> Json<Value> {
    Json(json!({ "suppliers": ["TB Maju", "TB Jaya"] }))
}

async fn spawn_mock() -> (String, Arc<MockState>) {
    let state = Arc::new(MockState::default());
    let router = Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/register", post(register))
        .route("/api/transactions", get(list_transactions).post(create_transaction))
        .route("/api/transactions/:id", delete(delete_transaction))
        .route("/api/transactions/:id/item-status", put(item_status))
        .route("/api/tasks", get(tasks))
        .route("/api/tasks/:id", axum::routing::patch(task_update))
        .route("/api/tasks/:id/report", post(task_report))
        .route("/api/inventory/item-names", get(item_names))
        .route("/api/inventory/suppliers", get(suppliers))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{}/api", addr), state)
}

/// Serve `GET /api/transactions` with a fixed status and body
async fn spawn_fixed(status: u16, body: &'static str) -> String {
    let status = StatusCode::from_u16(status).unwrap();
    let router = Router::new().route("/api/transactions", get(move || async move { (status, body) }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/api", addr)
}

fn client(base_url: &str, session: Arc<SessionStore>) -> ApiClient {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
    };
    ApiClient::new(&config, session).unwrap()
}

#[tokio::test]
async fn test_restore_without_token_makes_no_request() {
    let (base, state) = spawn_mock().await;
    let auth = AuthService::new(client(&base, Arc::new(SessionStore::in_memory())));

    assert!(auth.restore().await.unwrap().is_none());
    assert_eq!(state.me_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_restore_with_rejected_token_clears_it() {
    let (base, state) = spawn_mock().await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    let session = Arc::new(SessionStore::open(&path).await.unwrap());
    session.set_token("stale").await.unwrap();

    let auth = AuthService::new(client(&base, session.clone()));
    assert!(auth.restore().await.unwrap().is_none());
    assert_eq!(state.me_calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.token().await, None);
    assert_eq!(SessionStore::open(&path).await.unwrap().token().await, None);
}

#[tokio::test]
async fn test_login_stores_token_and_restores() {
    let (base, _state) = spawn_mock().await;
    let session = Arc::new(SessionStore::in_memory());
    let auth = AuthService::new(client(&base, session.clone()));

    let user = auth.login(" ani ", "rahasia").await.unwrap();
    assert_eq!(user.email, "ani@xon.id");
    assert_eq!(session.token().await.as_deref(), Some(GOOD_TOKEN));

    let restored = auth.restore().await.unwrap().unwrap();
    assert!(restored.role_set().contains(xonweb_core::Role::Accounting));
}

#[tokio::test]
async fn test_bad_credentials_surface_detail() {
    let (base, _state) = spawn_mock().await;
    let auth = AuthService::new(client(&base, Arc::new(SessionStore::in_memory())));

    let err = auth.login("ani", "salah").await.unwrap_err();
    assert_eq!(err.user_message(), "Invalid credentials");
}

#[tokio::test]
async fn test_logout_clears_token_when_server_fails() {
    let (base, state) = spawn_mock().await;
    let session = Arc::new(SessionStore::in_memory());
    session.set_token(GOOD_TOKEN).await.unwrap();
    let auth = AuthService::new(client(&base, session.clone()));

    auth.logout().await.unwrap();
    assert_eq!(state.logout_calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.token().await, None);
}

#[tokio::test]
async fn test_register_refusal_is_reported() {
    let (base, _state) = spawn_mock().await;
    let auth = AuthService::new(client(&base, Arc::new(SessionStore::in_memory())));
    let request = RegisterRequest {
        email: "budi@xon.id".to_string(),
        username: "budi".to_string(),
        password: "rahasia".to_string(),
        name: "Budi".to_string(),
        role: "employee".to_string(),
        roles: vec![],
    };

    match auth.register(&request).await {
        Err(ClientError::Api { status, detail }) => {
            assert_eq!(status, 403);
            assert!(detail.starts_with("Public registration is disabled"));
        }
        other => panic!("unexpected result: {:?}", other.map(|m| m.message)),
    }
}

#[tokio::test]
async fn test_unauthorized_request_clears_token() {
    let (base, _state) = spawn_mock().await;
    let session = Arc::new(SessionStore::in_memory());
    session.set_token("expired").await.unwrap();
    let api = client(&base, session.clone());

    let err = api.transactions().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
    assert_eq!(session.token().await, None);
}

#[tokio::test]
async fn test_item_status_sync_round_trip() {
    let (base, state) = spawn_mock().await;
    let session = Arc::new(SessionStore::in_memory());
    session.set_token(GOOD_TOKEN).await.unwrap();
    let sync = ItemStatusSync::new(Arc::new(client(&base, session)));
    sync.reload().await.unwrap();

    let list = sync
        .update_item_status("t/2", 0, ItemStatus::OutWarehouse)
        .await
        .unwrap();

    assert_eq!(
        state.item_status.lock().unwrap().clone(),
        Some(("t/2".to_string(), "0".to_string(), "out_warehouse".to_string()))
    );
    assert_eq!(list[1].items()[0].status(), ItemStatus::OutWarehouse);

    let err = sync
        .update_item_status("t1", 4, ItemStatus::Receiving)
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Invalid item index");
}

#[tokio::test]
async fn test_clear_all_reports_generic_failure() {
    let (base, state) = spawn_mock().await;
    let session = Arc::new(SessionStore::in_memory());
    session.set_token(GOOD_TOKEN).await.unwrap();
    let api = client(&base, session);

    let transactions = api.transactions().await.unwrap();
    let err = clear_all(&api, &transactions).await.unwrap_err();

    assert!(matches!(err, ClientError::PartialFailure { failed: 1, total: 2 }));
    assert_eq!(state.deleted.lock().unwrap().clone(), vec!["t1".to_string()]);
}

#[tokio::test]
async fn test_create_transaction_from_form() {
    let (base, state) = spawn_mock().await;
    let session = Arc::new(SessionStore::in_memory());
    session.set_token(GOOD_TOKEN).await.unwrap();
    let api = client(&base, session);

    let form = TransactionForm::default()
        .apply(xonweb_core::FormAction::SetProject("p1".to_string()))
        .set_category(xonweb_core::Category::Bahan)
        .set_line_item(0, xonweb_core::LineItemField::Description, "Semen")
        .set_line_item(0, xonweb_core::LineItemField::UnitPrice, "65000")
        .set_line_item(0, xonweb_core::LineItemField::Quantity, "10")
        .apply(xonweb_core::FormAction::SetSupplier("TB Maju".to_string()));

    let response = api
        .create_transaction(&form.build_submission().unwrap())
        .await
        .unwrap();
    assert_eq!(response.id.as_deref(), Some("t9"));

    let body = state.bodies.lock().unwrap()[0].clone();
    assert_eq!(body["category"], "bahan");
    assert_eq!(body["amount"], 650000.0);
    assert_eq!(body["items"][0]["supplier"], "TB Maju");
    assert_eq!(body["items"][0]["status"], "receiving");
}

#[tokio::test]
async fn test_tasks_and_reports() {
    let (base, state) = spawn_mock().await;
    let api = client(&base, Arc::new(SessionStore::in_memory()));

    let tasks = api.tasks(Some("u1")).await.unwrap();
    assert_eq!(tasks[0].assigned_to.as_deref(), Some("u1"));
    assert_eq!(tasks[0].status, TaskStatus::InProgress);

    api.update_task_status("k1", TaskStatus::Completed).await.unwrap();
    let report = WorkReportInput::new("k1", "Pondasi selesai dicor", "100").unwrap();
    api.submit_report(&report).await.unwrap();

    let seen = state.seen.lock().unwrap().clone();
    assert_eq!(seen, vec!["PATCH /tasks/k1".to_string(), "POST /tasks/k1/report".to_string()]);
    let bodies = state.bodies.lock().unwrap().clone();
    assert_eq!(bodies[0], json!({ "status": "completed" }));
    assert_eq!(bodies[1]["progress"], 100);
    assert_eq!(bodies[1]["photos"], json!([]));
}

#[tokio::test]
async fn test_autocomplete_sources() {
    let (base, _state) = spawn_mock().await;
    let api = client(&base, Arc::new(SessionStore::in_memory()));

    let names = api
        .item_names(Some(&xonweb_core::Category::Bahan), Some("interior"))
        .await
        .unwrap();
    assert_eq!(xonweb_core::suggestions(&names, "taco"), vec!["HPL Taco"]);
    assert_eq!(api.suppliers().await.unwrap(), vec!["TB Maju", "TB Jaya"]);
}

#[rstest]
#[case::expired_session(401, r#"{"detail":"Not authenticated"}"#, true, "Your session has expired, please log in again", false)]
#[case::anonymous_401(401, r#"{"detail":"Not authenticated"}"#, false, "Not authenticated", false)]
#[case::not_found(404, r#"{"detail":"Transaction not found"}"#, true, "Transaction not found", true)]
#[case::plain_text_body(502, "Bad Gateway", true, "Bad Gateway", true)]
#[case::empty_body(500, "", true, "Request failed with status 500", true)]
#[case::undecodable_success(200, "not json", true, "The server sent an unexpected response", true)]
#[tokio::test]
async fn test_failed_response_mapping(
    #[case] status: u16,
    #[case] body: &'static str,
    #[case] with_token: bool,
    #[case] message: &'static str,
    #[case] token_kept: bool,
) {
    let base = spawn_fixed(status, body).await;
    let session = Arc::new(SessionStore::in_memory());
    if with_token {
        session.set_token(GOOD_TOKEN).await.unwrap();
    }
    let api = client(&base, session.clone());

    let err = api.transactions().await.unwrap_err();

    assert_eq!(err.user_message(), message);
    assert_eq!(session.token().await.is_some(), with_token && token_kept);
}
