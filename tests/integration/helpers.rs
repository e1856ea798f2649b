//! Shared test helpers: a scripted fake backend and a client wired to it.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};

use hrms_auth::{MemoryTokenStore, TokenStore};
use hrms_client::HrmsClient;
use hrms_core::ConsoleEvent;
use hrms_core::config::AppConfig;
use hrms_core::events::EventPayload;
use hrms_entity::{Role, Session};

/// Password the fake backend accepts.
pub const PASSWORD: &str = "correct-horse";
/// Login email used across tests.
pub const EMAIL: &str = "admin@example.com";

const SIGNING_SECRET: &[u8] = b"integration-secret";

/// Mint a signed token expiring `ttl_seconds` from now (negative for past).
pub fn mint_token(role: Role, ttl_seconds: i64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_secs() as i64;
    let claims = json!({
        "sub": "7",
        "role": role.code(),
        "iat": now,
        "exp": now + ttl_seconds,
        "jti": next_jti(),
    });
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SIGNING_SECRET),
    )
    .expect("encode token")
}

fn next_jti() -> String {
    static SEQ: AtomicU32 = AtomicU32::new(0);
    format!("t-{}", SEQ.fetch_add(1, Ordering::SeqCst))
}

/// A request the fake backend received.
#[derive(Debug, Clone)]
pub struct Hit {
    /// Route name, e.g. `"GET /api/clients"`.
    pub route: String,
    /// Raw `Authorization` header.
    pub authorization: Option<String>,
}

/// Scripted backend state.
#[derive(Debug)]
pub struct Backend {
    hits: Mutex<Vec<Hit>>,
    /// Protected endpoints answer 401 while this is above zero.
    unauthorized_remaining: AtomicU32,
    /// Whether `/api/renew-token` hands out a new token.
    renew_ok: AtomicBool,
    /// Delay applied by the renewal endpoint.
    renew_delay_ms: AtomicU32,
    /// Role reported by the login endpoints.
    login_role: Mutex<Role>,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            hits: Mutex::new(Vec::new()),
            unauthorized_remaining: AtomicU32::new(0),
            renew_ok: AtomicBool::new(true),
            renew_delay_ms: AtomicU32::new(0),
            login_role: Mutex::new(Role::Admin),
        }
    }
}

impl Backend {
    /// Answer the next `n` protected requests with 401.
    pub fn reject_next(&self, n: u32) {
        self.unauthorized_remaining.store(n, Ordering::SeqCst);
    }

    /// Answer every protected request with 401.
    pub fn reject_all(&self) {
        self.reject_next(u32::MAX);
    }

    /// Make the renewal endpoint fail.
    pub fn fail_renewals(&self) {
        self.renew_ok.store(false, Ordering::SeqCst);
    }

    /// Slow down the renewal endpoint.
    pub fn delay_renewals(&self, ms: u32) {
        self.renew_delay_ms.store(ms, Ordering::SeqCst);
    }

    /// Role returned by the next login.
    pub fn set_login_role(&self, role: Role) {
        *self.login_role.lock().expect("lock") = role;
    }

    /// Number of requests received on `route`.
    pub fn count(&self, route: &str) -> usize {
        self.hits
            .lock()
            .expect("lock")
            .iter()
            .filter(|h| h.route == route)
            .count()
    }

    /// Every request received on `route`, oldest first.
    pub fn hits(&self, route: &str) -> Vec<Hit> {
        self.hits
            .lock()
            .expect("lock")
            .iter()
            .filter(|h| h.route == route)
            .cloned()
            .collect()
    }

    fn record(&self, route: &str, headers: &HeaderMap) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.hits.lock().expect("lock").push(Hit {
            route: route.to_string(),
            authorization,
        });
    }

    /// Record the hit and decide whether a protected route answers 401.
    fn guard(&self, route: &str, headers: &HeaderMap) -> Option<Response> {
        self.record(route, headers);
        if !headers.contains_key(header::AUTHORIZATION) {
            return Some(unauthorized("Missing bearer token"));
        }
        let rejected = self
            .unauthorized_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                if n == u32::MAX {
                    Some(n)
                } else {
                    n.checked_sub(1)
                }
            })
            .is_ok();
        rejected.then(|| unauthorized("Token expired"))
    }
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": message }))).into_response()
}

type Shared = State<Arc<Backend>>;

async fn admin_login(State(b): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("POST /api/admin-login", &headers);
    if body["password"] != PASSWORD {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Invalid email or password" })),
        )
            .into_response();
    }
    let role = *b.login_role.lock().expect("lock");
    Json(json!({
        "token": mint_token(role, 3600),
        "refreshToken": "refresh-1",
        "role": role.code(),
        "userId": 7,
        "email": body["email"],
        "username": "Ada Admin",
    }))
    .into_response()
}

async fn admin_logout(State(b): Shared, headers: HeaderMap) -> Response {
    if let Some(rejection) = b.guard("POST /api/admin-logout", &headers) {
        return rejection;
    }
    Json(json!({ "message": "Logged out" })).into_response()
}

async fn renew_token(State(b): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("POST /api/renew-token", &headers);
    let delay = b.renew_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(u64::from(delay))).await;
    }
    if !b.renew_ok.load(Ordering::SeqCst) || body["refreshToken"].is_null() {
        return unauthorized("Refresh token expired");
    }
    let role = *b.login_role.lock().expect("lock");
    Json(json!({ "accessToken": mint_token(role, 3600) })).into_response()
}

async fn list_clients(State(b): Shared, headers: HeaderMap) -> Response {
    if let Some(rejection) = b.guard("GET /api/clients", &headers) {
        return rejection;
    }
    Json(json!({
        "data": [
            { "id": 1, "name": "Acme", "status": "active" },
            { "id": "2", "name": "Globex", "email": "ops@globex.test" },
        ]
    }))
    .into_response()
}

async fn create_client(State(b): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Some(rejection) = b.guard("POST /api/clients/create", &headers) {
        return rejection;
    }
    if body["name"] == "Acme" {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "Client already exists" })),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Client created successfully" })),
    )
        .into_response()
}

async fn update_client(State(b): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Some(rejection) = b.guard("PUT /api/clients/update", &headers) {
        return rejection;
    }
    Json(json!({ "message": format!("Client {id} updated") })).into_response()
}

async fn delete_client(State(b): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Some(rejection) = b.guard("DELETE /api/clients/delete", &headers) {
        return rejection;
    }
    Json(json!({ "message": format!("Client {id} deleted") })).into_response()
}

async fn assigned(State(b): Shared, headers: HeaderMap) -> Response {
    if let Some(rejection) = b.guard("GET /api/employee-role/assigned", &headers) {
        return rejection;
    }
    Json(json!([
        { "employeeId": 1, "name": "Ann", "roleId": 10, "roleName": "Engineer" },
        { "employeeId": 3, "name": "Cid", "roleId": 11, "roleName": "Designer" },
    ]))
    .into_response()
}

async fn unassigned(State(b): Shared, headers: HeaderMap) -> Response {
    if let Some(rejection) = b.guard("GET /api/employee-role/unassigned", &headers) {
        return rejection;
    }
    Json(json!({
        "data": [
            { "employeeId": 2, "name": "Bob" },
            { "employeeId": "3", "name": "Cid" },
        ]
    }))
    .into_response()
}

async fn assign(State(b): Shared, headers: HeaderMap) -> Response {
    if let Some(rejection) = b.guard("POST /api/employee-role/create", &headers) {
        return rejection;
    }
    Json(json!({ "message": "Role assigned" })).into_response()
}

fn router(backend: Arc<Backend>) -> Router {
    Router::new()
        .route("/api/admin-login", post(admin_login))
        .route("/api/admin-logout", post(admin_logout))
        .route("/api/renew-token", post(renew_token))
        .route("/api/clients", get(list_clients))
        .route("/api/clients/create", post(create_client))
        .route("/api/clients/update/{id}", put(update_client))
        .route("/api/clients/delete/{id}", delete(delete_client))
        .route("/api/employee-role/assigned", get(assigned))
        .route("/api/employee-role/unassigned", get(unassigned))
        .route("/api/employee-role/create", post(assign))
        .with_state(backend)
}

/// A running fake backend plus a client and store pointed at it.
pub struct TestApp {
    /// The scripted backend.
    pub backend: Arc<Backend>,
    /// Client under test.
    pub client: HrmsClient,
    /// The client's token store.
    pub store: Arc<MemoryTokenStore>,
    /// Events published while the test ran.
    pub events: broadcast::Receiver<ConsoleEvent>,
    /// Backend address.
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestApp {
    /// Start a backend on an ephemeral port and build a client for it.
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let backend = Arc::new(Backend::default());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = router(Arc::clone(&backend));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        let store = Arc::new(MemoryTokenStore::new());
        let client = HrmsClient::with_store(&test_config(&format!("http://{addr}")), store.clone())
            .expect("build client");
        let events = client.events().subscribe();

        Self {
            backend,
            client,
            store,
            events,
            addr,
            shutdown: Some(shutdown_tx),
        }
    }

    /// Log in through the real endpoint.
    pub async fn login(&self) -> Session {
        self.client
            .auth()
            .login(&hrms_client::dto::LoginRequest {
                email: EMAIL.to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .expect("login")
    }

    /// Log in with `role` without touching the backend.
    pub fn establish(&self, role: Role) {
        self.client
            .session()
            .establish(Session {
                access_token: Some(mint_token(role, 3600)),
                refresh_token: Some("refresh-1".to_string()),
                role: Some(role),
                user_id: Some("7".to_string()),
                email: Some(EMAIL.to_string()),
                username: None,
            })
            .expect("establish session");
    }

    /// Store a session verbatim, bypassing the expiry check.
    pub fn store_raw(&self, session: &Session) {
        self.store.save_session(session).expect("save session");
    }

    /// Drain the events published so far.
    pub fn drain_events(&mut self) -> Vec<EventPayload> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event.payload);
        }
        out
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Configuration for tests: memory store, tiny backoff, short timeout.
pub fn test_config(base_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.api.base_url = base_url.to_string();
    config.api.timeout_seconds = 5;
    config.api.retry_backoff_ms = 1;
    config
}

/// `Authorization` header value carrying `token`.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Whether `expected` was published.
pub fn contains(events: &[EventPayload], expected: &EventPayload) -> bool {
    events.iter().any(|e| e == expected)
}

/// Number of times `expected` was published.
pub fn occurrences(events: &[EventPayload], expected: &EventPayload) -> usize {
    events.iter().filter(|e| *e == expected).count()
}

/// Reserve then release a port so nothing listens on it.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    listener.local_addr().expect("local addr")
}
