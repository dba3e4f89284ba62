//! Persistence layer for per-user client state.
//!
//! Streaks and last-seen scores are kept behind [`StateStore`] so the service
//! can run against Firestore in production and an in-memory map locally.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{ScoreSnapshot, StreakState};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    /// Check-in streaks (keyed by fid)
    pub const STREAKS: &str = "streaks";
    /// Last observed score per user (keyed by fid)
    pub const SCORE_SNAPSHOTS: &str = "score_snapshots";
}

/// Key-value storage scoped per user identity.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get_streak(&self, fid: u64) -> Result<Option<StreakState>, AppError>;

    async fn put_streak(&self, fid: u64, streak: &StreakState) -> Result<(), AppError>;

    async fn get_score_snapshot(&self, fid: u64) -> Result<Option<ScoreSnapshot>, AppError>;

    async fn put_score_snapshot(
        &self,
        fid: u64,
        snapshot: &ScoreSnapshot,
    ) -> Result<(), AppError>;

    /// Remove everything stored for a user.
    async fn delete_user_state(&self, fid: u64) -> Result<(), AppError>;
}
