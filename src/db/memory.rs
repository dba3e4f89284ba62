// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory state store for local development and tests.

use crate::db::StateStore;
use crate::error::AppError;
use crate::models::{ScoreSnapshot, StreakState};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// Process-local store. State is lost on restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    streaks: Arc<DashMap<u64, StreakState>>,
    snapshots: Arc<DashMap<u64, ScoreSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get_streak(&self, fid: u64) -> Result<Option<StreakState>, AppError> {
        Ok(self.streaks.get(&fid).map(|s| *s))
    }

    async fn put_streak(&self, fid: u64, streak: &StreakState) -> Result<(), AppError> {
        self.streaks.insert(fid, *streak);
        Ok(())
    }

    async fn get_score_snapshot(&self, fid: u64) -> Result<Option<ScoreSnapshot>, AppError> {
        Ok(self.snapshots.get(&fid).map(|s| s.clone()))
    }

    async fn put_score_snapshot(
        &self,
        fid: u64,
        snapshot: &ScoreSnapshot,
    ) -> Result<(), AppError> {
        self.snapshots.insert(fid, snapshot.clone());
        Ok(())
    }

    async fn delete_user_state(&self, fid: u64) -> Result<(), AppError> {
        self.streaks.remove(&fid);
        self.snapshots.remove(&fid);
        Ok(())
    }
}
