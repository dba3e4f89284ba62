// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    extract::Query,
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use vibe_check::config::Config;
use vibe_check::db::{FirestoreDb, MemoryStore};
use vibe_check::routes::create_router;
use vibe_check::services::quick_auth::QUICK_AUTH_ISSUER;
use vibe_check::services::QuickAuthVerifier;
use vibe_check::AppState;

/// Audience the test config resolves to when a request carries no Origin/Host.
#[allow(dead_code)]
pub const TEST_DOMAIN: &str = "localhost:3000";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by an in-memory store and no Neynar key.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    build_app(Config::test_default())
}

/// Create a test app whose Neynar client points at `neynar_url`.
#[allow(dead_code)]
pub fn create_test_app_with_neynar(neynar_url: &str) -> (Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.neynar_api_url = neynar_url.to_string();
    config.neynar_api_key = Some("test-neynar-key".to_string());
    build_app(config)
}

fn build_app(config: Config) -> (Router, Arc<AppState>) {
    let secret = config
        .quick_auth_shared_secret
        .clone()
        .expect("test config has a shared secret");
    let quick_auth = Arc::new(QuickAuthVerifier::new_with_shared_secret(&secret).unwrap());

    let state = Arc::new(AppState::new(
        config,
        Arc::new(MemoryStore::new()),
        quick_auth,
    ));

    (create_router(state.clone()), state)
}

/// Mint a Quick Auth token for `fid` accepted by the test app.
#[allow(dead_code)]
pub fn create_test_jwt(fid: u64) -> String {
    create_test_jwt_for(fid, TEST_DOMAIN)
}

/// Mint a Quick Auth token for `fid` with an explicit audience.
#[allow(dead_code)]
pub fn create_test_jwt_for(fid: u64, audience: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();

    let claims = json!({
        "iss": QUICK_AUTH_ISSUER,
        "aud": audience,
        "sub": fid,
        "iat": now,
        "exp": now + 3600,
    });

    let secret = Config::test_default().quick_auth_shared_secret.unwrap();
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&secret),
    )
    .unwrap()
}

/// Fake upstream server bound to an ephemeral local port.
#[allow(dead_code)]
pub struct FakeServer {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl FakeServer {
    /// Number of requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Spawn a fake Neynar returning `users` (a JSON array) for any fid.
#[allow(dead_code)]
pub async fn spawn_fake_neynar(users: Value) -> FakeServer {
    spawn_fake_neynar_with_status(StatusCode::OK, json!({ "users": users })).await
}

/// Spawn a fake Neynar returning `body` with `status`.
#[allow(dead_code)]
pub async fn spawn_fake_neynar_with_status(status: StatusCode, body: Value) -> FakeServer {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let app = Router::new().route(
        "/v2/farcaster/user/bulk",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let counter = counter.clone();
            let body = body.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                if !params.contains_key("fids") {
                    return (StatusCode::BAD_REQUEST, Json(json!({ "message": "fids required" })));
                }
                (status, Json(body))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeServer {
        url: format!("http://{}", addr),
        hits,
    }
}

/// Spawn a fake Quick Auth JWKS endpoint at `/.well-known/jwks.json`.
#[allow(dead_code)]
pub async fn spawn_fake_jwks(jwks: Value) -> FakeServer {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let app = Router::new().route(
        "/.well-known/jwks.json",
        get(move || {
            let counter = counter.clone();
            let jwks = jwks.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                ([(header::CACHE_CONTROL, "public, max-age=300")], Json(jwks))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeServer {
        url: format!("http://{}/.well-known/jwks.json", addr),
        hits,
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
