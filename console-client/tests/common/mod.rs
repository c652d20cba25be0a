//! Common test utilities: an in-process mock of the console backend plus a
//! wired client against it.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use console_client::auth::{MemoryTokenStore, Navigator, TokenStore};
use console_client::config::Settings;
use console_client::ConsoleClient;

/// Scripted backend behaviour, shared with the test body.
#[derive(Debug)]
pub struct BackendState {
    pub valid_access: Mutex<String>,
    pub valid_refresh: Mutex<String>,
    pub profile_name: Mutex<String>,
    pub rotations: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub me_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub fail_refresh: AtomicBool,
    pub fail_logout: AtomicBool,
    /// When set, every bearer token is rejected, fresh ones included.
    pub reject_all_bearers: AtomicBool,
}

impl BackendState {
    fn new(access: &str, refresh: &str) -> Self {
        Self {
            valid_access: Mutex::new(access.to_string()),
            valid_refresh: Mutex::new(refresh.to_string()),
            profile_name: Mutex::new("Ada Admin".to_string()),
            rotations: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            me_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            fail_refresh: AtomicBool::new(false),
            fail_logout: AtomicBool::new(false),
            reject_all_bearers: AtomicBool::new(false),
        }
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        if self.reject_all_bearers.load(Ordering::SeqCst) {
            return false;
        }
        let valid = self.valid_access.lock().unwrap().clone();
        bearer(headers).as_deref() == Some(valid.as_str())
    }

    fn user_json(&self) -> Value {
        json!({
            "id": "usr_1",
            "name": self.profile_name.lock().unwrap().clone(),
            "email": "ada@example.com",
            "avatarUrl": "https://cdn.example.com/a/ada.png",
            "role": "admin",
            "oauthProvider": "github",
            "oauthId": "gh_123",
            "subscriptionTier": "pro",
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2025-06-15T08:30:00Z",
            "lastLoginAt": "2025-08-20T12:00:00Z"
        })
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Invalid token" })),
    )
        .into_response()
}

async fn me(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.me_calls.fetch_add(1, Ordering::SeqCst);
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "user": state.user_json() })).into_response()
}

async fn refresh(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if state.fail_refresh.load(Ordering::SeqCst) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Refresh token revoked" })),
        )
            .into_response();
    }

    let valid = state.valid_refresh.lock().unwrap().clone();
    if body.get("refreshToken").and_then(Value::as_str) != Some(valid.as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid refresh token" })),
        )
            .into_response();
    }

    let n = state.rotations.fetch_add(1, Ordering::SeqCst) + 1;
    let access = format!("access-{n}");
    let refresh = format!("refresh-{n}");
    *state.valid_access.lock().unwrap() = access.clone();
    *state.valid_refresh.lock().unwrap() = refresh.clone();

    Json(json!({
        "accessToken": access,
        "refreshToken": refresh,
        "expiresIn": "900s",
        "tokenType": "Bearer"
    }))
    .into_response()
}

async fn logout(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);
    if state.fail_logout.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Session store unavailable" })),
        )
            .into_response();
    }
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "message": "Logged out" })).into_response()
}

async fn users(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "users": [state.user_json()] })).into_response()
}

async fn user_by_id(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    if id != "usr_1" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "User not found" })),
        )
            .into_response();
    }
    Json(json!({
        "user": state.user_json(),
        "stats": {
            "userId": "usr_1",
            "formCount": 12,
            "fieldCount": 96,
            "totalApiCalls": 4301,
            "lastUpdated": "2025-08-20T12:00:00Z"
        }
    }))
    .into_response()
}

async fn policies(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "policies": [
        {
            "id": "pol_1",
            "name": "Admin full access",
            "subjects": ["admin"],
            "actions": ["*"],
            "resources": ["*"],
            "effect": "Allow"
        },
        {
            "id": "pol_2",
            "name": "Editor content",
            "resource": "/api/content/*",
            "action": "write",
            "effect": "allow",
            "priority": 5,
            "enabled": false
        }
    ]}))
    .into_response()
}

async fn create_policy(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    body["id"] = json!("pol_new");
    (StatusCode::CREATED, Json(json!({ "policy": body }))).into_response()
}

async fn subscription_me(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "subscription": {
        "id": "sub_1",
        "userId": "usr_1",
        "tier": "pro",
        "billingCycle": "monthly",
        "status": "active",
        "limits": { "forms": 50, "fields": 500, "apiCalls": 10000 },
        "startDate": "2025-01-01T00:00:00Z",
        "createdAt": "2025-01-01T00:00:00Z",
        "updatedAt": "2025-01-01T00:00:00Z"
    }}))
    .into_response()
}

async fn subscription_limits(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "formsAllowed": true,
        "fieldsAllowed": true,
        "apiCallsAllowed": false,
        "limits": { "forms": 50, "fields": 500, "apiCalls": 10000 },
        "usage": { "forms": 12, "fields": 96, "apiCalls": 10000 }
    }))
    .into_response()
}

async fn usage_me(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "usage": usage_record("2025-08", 4301) })).into_response()
}

async fn usage_history(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "history": [
        usage_record("2025-08", 4301),
        usage_record("2025-07", 3890)
    ]}))
    .into_response()
}

fn usage_record(month: &str, api_calls: u64) -> Value {
    json!({
        "id": format!("use_{month}"),
        "userId": "usr_1",
        "month": month,
        "formsCreated": 12,
        "fieldsGenerated": 96,
        "apiCallsMade": api_calls,
        "totalCharges": 12.5,
        "createdAt": "2025-08-01T00:00:00Z",
        "updatedAt": "2025-08-20T12:00:00Z"
    })
}

async fn sessions(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "sessions": [
        {
            "id": "ses_1",
            "userId": "usr_1",
            "device": "desktop",
            "browser": "Firefox",
            "os": "Linux",
            "isActive": true,
            "lastActivityAt": "2025-08-20T12:00:00Z",
            "expiresAt": "2025-08-27T12:00:00Z",
            "createdAt": "2025-08-20T12:00:00Z"
        },
        {
            "id": "ses_2",
            "userId": "usr_1",
            "isActive": false,
            "lastActivityAt": "2025-08-01T09:00:00Z",
            "expiresAt": "2025-08-08T09:00:00Z",
            "createdAt": "2025-08-01T09:00:00Z"
        }
    ]}))
    .into_response()
}

async fn active_sessions(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "sessions": [
        {
            "id": "ses_1",
            "userId": "usr_1",
            "device": "desktop",
            "browser": "Firefox",
            "os": "Linux",
            "isActive": true,
            "lastActivityAt": "2025-08-20T12:00:00Z",
            "expiresAt": "2025-08-27T12:00:00Z",
            "createdAt": "2025-08-20T12:00:00Z"
        }
    ]}))
    .into_response()
}

async fn revoke_session(
    State(state): State<Arc<BackendState>>,
    Path(_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "message": "Session revoked" })).into_response()
}

async fn revoke_all_sessions(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "message": "Sessions revoked" })).into_response()
}

/// Mock console backend bound to an ephemeral local port.
pub struct MockBackend {
    pub state: Arc<BackendState>,
    pub addr: SocketAddr,
}

impl MockBackend {
    /// Start the mock with `access-0`/`refresh-0` as the valid pair.
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::new("access-0", "refresh-0"));

        let api = Router::new()
            .route("/auth/me", get(me))
            .route("/auth/refresh", post(refresh))
            .route("/auth/logout", post(logout))
            .route("/auth/sessions", get(sessions))
            .route("/auth/sessions/active", get(active_sessions))
            .route("/auth/sessions/revoke-all", post(revoke_all_sessions))
            .route("/auth/sessions/:id", delete(revoke_session))
            .route("/users", get(users))
            .route("/users/:id", get(user_by_id))
            .route("/policies", get(policies).post(create_policy))
            .route("/subscriptions/me", get(subscription_me))
            .route("/subscriptions/me/limits", get(subscription_limits))
            .route("/usage/me", get(usage_me))
            .route("/usage/me/history", get(usage_history))
            .with_state(state.clone());
        let app = Router::new().nest("/api", api);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock backend");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { state, addr }
    }

    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        settings.api.base_url = format!("http://{}/api", self.addr);
        settings
    }
}

/// Navigator that records every redirect instead of performing it.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    locations: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn locations(&self) -> Vec<String> {
        self.locations.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, location: &str) {
        self.locations.lock().unwrap().push(location.to_string());
    }
}

/// A full client wired against a fresh mock backend.
pub struct TestHarness {
    pub backend: MockBackend,
    pub client: ConsoleClient,
    pub store: Arc<MemoryTokenStore>,
    pub navigator: Arc<RecordingNavigator>,
}

pub async fn harness() -> TestHarness {
    let backend = MockBackend::start().await;
    let store = Arc::new(MemoryTokenStore::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let client = ConsoleClient::new(
        &backend.settings(),
        store.clone() as Arc<dyn TokenStore>,
        navigator.clone() as Arc<dyn Navigator>,
    );
    TestHarness {
        backend,
        client,
        store,
        navigator,
    }
}

/// Store the backend's currently valid pair, as a completed login would.
pub fn login(store: &dyn TokenStore) {
    store.set_tokens("access-0", "refresh-0").unwrap();
}
