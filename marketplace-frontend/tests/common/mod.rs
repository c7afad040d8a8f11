//! Shared helpers for marketplace-frontend integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use marketplace_frontend::config::BackendSettings;
use marketplace_frontend::middleware::route_guard::RouteRules;
use marketplace_frontend::session::{BridgeError, CookieBridge};
use marketplace_frontend::startup::build_router;
use marketplace_frontend::AppState;
use secrecy::Secret;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_COOKIE_MAX_AGE: i64 = 604_800;
pub const INDEX_MARKER: &str = "marketplace-test-shell";

/// Directory standing in for the compiled web client.
pub fn public_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create public dir");
    std::fs::write(
        dir.path().join("index.html"),
        format!("<html><body>{}</body></html>", INDEX_MARKER),
    )
    .expect("Failed to write index.html");
    dir
}

pub fn test_state() -> AppState {
    AppState::new(Arc::new(RouteRules::default()), TEST_COOKIE_MAX_AGE)
}

pub fn test_router(public: &TempDir) -> Router {
    build_router(test_state(), public.path())
}

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let address = listener.local_addr().expect("Failed to read local address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server error");
    });

    address
}

/// Front server running on a random local port.
pub struct TestApp {
    pub address: String,
    _public: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let public = public_dir();
        let address = serve(test_router(&public)).await;
        Self {
            address: format!("http://{}", address),
            _public: public,
        }
    }
}

/// Cookie bridge that only records what it was asked to do.
#[derive(Default)]
pub struct RecordingBridge {
    pub writes: Mutex<Vec<String>>,
    pub deletes: Mutex<usize>,
}

impl RecordingBridge {
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> usize {
        *self.deletes.lock().unwrap()
    }
}

#[async_trait]
impl CookieBridge for RecordingBridge {
    async fn write(&self, access_token: &str) -> Result<(), BridgeError> {
        self.writes.lock().unwrap().push(access_token.to_string());
        Ok(())
    }

    async fn delete(&self) -> Result<(), BridgeError> {
        *self.deletes.lock().unwrap() += 1;
        Ok(())
    }
}

pub const VALID_PASSWORD: &str = "correct-horse";
pub const VALID_REFRESH_TOKEN: &str = "refresh-1";
pub const REVOKED_REFRESH_TOKEN: &str = "refresh-revoked";
pub const REVOKED_EMAIL: &str = "revoked@buyorsell.test";

/// In-process stand-in for the BuyOrSell REST API.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub requests: Arc<Mutex<Vec<(String, HeaderMap)>>>,
}

impl FakeBackend {
    pub async fn spawn(&self) -> BackendSettings {
        let router = Router::new()
            .route("/auth/login", post(fake_login))
            .route("/auth/signup", post(fake_signup))
            .route("/auth/social-login", post(fake_social_login))
            .route("/auth/refresh-token", post(fake_refresh))
            .route("/auth/logout", post(fake_logout))
            .route("/ads", get(fake_ads))
            .with_state(self.clone());
        let address = serve(router).await;

        BackendSettings {
            url: format!("http://{}", address),
            api_key: Some(Secret::new(TEST_API_KEY.to_string())),
            timeout_seconds: 5,
        }
    }

    pub fn requests_to(&self, path: &str) -> Vec<HeaderMap> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, headers)| headers.clone())
            .collect()
    }

    fn record(&self, path: &str, headers: &HeaderMap) {
        self.requests
            .lock()
            .unwrap()
            .push((path.to_string(), headers.clone()));
    }
}

fn envelope(data: Value) -> Json<Value> {
    Json(json!({
        "statusCode": 200,
        "timestamp": "2026-10-18T09:00:00.000Z",
        "data": data,
    }))
}

fn rejection(status: StatusCode, message: &str) -> axum::response::Response {
    (
        status,
        Json(json!({
            "statusCode": status.as_u16(),
            "timestamp": "2026-10-18T09:00:00.000Z",
            "message": message,
        })),
    )
        .into_response()
}

async fn fake_login(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    backend.record("/auth/login", &headers);

    if body["password"] != VALID_PASSWORD {
        return rejection(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    let refresh_token = if body["email"] == REVOKED_EMAIL {
        REVOKED_REFRESH_TOKEN
    } else {
        VALID_REFRESH_TOKEN
    };

    envelope(json!({
        "accessToken": "access-1",
        "refreshToken": refresh_token,
        "user": {
            "id": "u-1",
            "firstName": "Mariam",
            "lastName": "Haddad",
            "email": body["email"],
            "verifyEmail": true,
        }
    }))
    .into_response()
}

async fn fake_signup(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    backend.record("/auth/signup", &headers);

    if body["email"] == REVOKED_EMAIL {
        return rejection(StatusCode::CONFLICT, "Email already registered");
    }

    envelope(json!({
        "accessToken": "access-signup",
        "user": {
            "id": "u-2",
            "firstName": body["firstName"],
            "lastName": body["lastName"],
            "email": body["email"],
        }
    }))
    .into_response()
}

async fn fake_social_login(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    backend.record("/auth/social-login", &headers);

    if body["provider"] != "google" {
        return rejection(StatusCode::BAD_REQUEST, "Unsupported provider");
    }

    envelope(json!({
        "accessToken": "access-social",
        "refreshToken": VALID_REFRESH_TOKEN,
        "user": {
            "id": "u-3",
            "firstName": "Layla",
            "lastName": "",
            "email": "layla@buyorsell.test",
        }
    }))
    .into_response()
}

async fn fake_refresh(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    backend.record("/auth/refresh-token", &headers);

    if body["refreshToken"] == VALID_REFRESH_TOKEN {
        envelope(json!({ "accessToken": "access-2" })).into_response()
    } else {
        rejection(StatusCode::UNAUTHORIZED, "Refresh token revoked")
    }
}

async fn fake_logout(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
) -> axum::response::Response {
    backend.record("/auth/logout", &headers);
    envelope(Value::Null).into_response()
}

/// Echoes the emirate header so callers can tell which region a cached
/// response was fetched for.
async fn fake_ads(State(backend): State<FakeBackend>, headers: HeaderMap) -> Json<Value> {
    backend.record("/ads", &headers);

    let emirate = headers
        .get("x-emirate")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    envelope(json!([{ "id": "ad-1", "emirate": emirate }]))
}
