// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Farcaster mini-app manifest.

use crate::models::MiniAppManifest;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/.well-known/farcaster.json", get(get_manifest))
}

async fn get_manifest(State(state): State<Arc<AppState>>) -> Json<MiniAppManifest> {
    Json(MiniAppManifest::from_config(&state.config))
}
