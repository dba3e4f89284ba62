// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Streaks (daily check-in state)
//! - Score snapshots (last observed score, for deltas)

use crate::db::{collections, StateStore};
use crate::error::AppError;
use crate::models::{ScoreSnapshot, StreakState};
use async_trait::async_trait;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator accepts unauthenticated connections; skip local credentials.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }
}

#[async_trait]
impl StateStore for FirestoreDb {
    async fn get_streak(&self, fid: u64) -> Result<Option<StreakState>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::STREAKS)
            .obj()
            .one(&fid.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn put_streak(&self, fid: u64, streak: &StreakState) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::STREAKS)
            .document_id(fid.to_string())
            .object(streak)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_score_snapshot(&self, fid: u64) -> Result<Option<ScoreSnapshot>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SCORE_SNAPSHOTS)
            .obj()
            .one(&fid.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn put_score_snapshot(
        &self,
        fid: u64,
        snapshot: &ScoreSnapshot,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SCORE_SNAPSHOTS)
            .document_id(fid.to_string())
            .object(snapshot)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete_user_state(&self, fid: u64) -> Result<(), AppError> {
        let client = self.get_client()?;

        for collection in [collections::STREAKS, collections::SCORE_SNAPSHOTS] {
            client
                .fluent()
                .delete()
                .from(collection)
                .document_id(fid.to_string())
                .execute()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        tracing::info!(fid, "Deleted stored user state");
        Ok(())
    }
}
