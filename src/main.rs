// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vibe Check API Server
//!
//! Serves normalized Neynar reputation scores and daily check-in streaks to
//! the Farcaster mini-app.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vibe_check::{
    config::Config,
    db::{FirestoreDb, MemoryStore, StateStore},
    services::QuickAuthVerifier,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, public_url = %config.public_url, "Starting Vibe Check API");

    // Firestore when a project is configured, otherwise process-local state
    let store: Arc<dyn StateStore> = match &config.gcp_project_id {
        Some(project_id) => Arc::new(FirestoreDb::new(project_id).await?),
        None => {
            tracing::warn!("GCP_PROJECT_ID not set; using in-memory state store");
            Arc::new(MemoryStore::new())
        }
    };

    let quick_auth = Arc::new(
        QuickAuthVerifier::from_config(&config)
            .map_err(|e| format!("Failed to initialize Quick Auth verifier: {e}"))?,
    );

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store, quick_auth));
    if !state.neynar.is_configured() {
        tracing::warn!("NEYNAR_API_KEY not set; profile lookups will be unavailable");
    }

    // Build router
    let app = vibe_check::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vibe_check=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
