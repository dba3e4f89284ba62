// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mini-app manifest endpoint tests.

use axum::{body::Body, http::Request, http::StatusCode};
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app};

#[tokio::test]
async fn test_manifest_served_from_config() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/.well-known/farcaster.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["accountAssociation"]["header"], "test-header");
    assert_eq!(body["accountAssociation"]["payload"], "test-payload");
    assert_eq!(body["accountAssociation"]["signature"], "test-signature");
    assert_eq!(body["miniapp"]["version"], "1");
    assert_eq!(body["miniapp"]["name"], "Vibe Check");
    assert_eq!(body["miniapp"]["homeUrl"], "http://localhost:3000");
    assert!(body.get("baseBuilder").is_none());
}
