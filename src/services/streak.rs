// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Check-in streak tracking over an injected state store.

use crate::db::StateStore;
use crate::error::AppError;
use crate::models::{CheckInOutcome, StreakState};
use chrono::NaiveDate;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Per-user locks serializing check-in read-modify-writes.
pub type CheckInLocks = Arc<DashMap<u64, Arc<Mutex<()>>>>;

/// Result of a check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckIn {
    pub state: StreakState,
    pub outcome: CheckInOutcome,
}

/// Reads and advances per-user streaks.
#[derive(Clone)]
pub struct StreakTracker {
    store: Arc<dyn StateStore>,
    locks: CheckInLocks,
}

impl StreakTracker {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self {
            store,
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Stored state, or the never-checked-in default.
    pub async fn state(&self, fid: u64) -> Result<StreakState, AppError> {
        Ok(self.store.get_streak(fid).await?.unwrap_or_default())
    }

    /// Streak for display. Read-only; at least 1.
    pub async fn current(&self, fid: u64) -> Result<u32, AppError> {
        Ok(self.state(fid).await?.peek())
    }

    /// Record a check-in for `today` and persist the new state.
    pub async fn check_in(&self, fid: u64, today: NaiveDate) -> Result<CheckIn, AppError> {
        let lock = self.lock_for(fid);
        let guard = lock.lock().await;
        let result = self.check_in_locked(fid, today).await;
        drop(guard);
        self.release(fid, &lock);
        result
    }

    async fn check_in_locked(&self, fid: u64, today: NaiveDate) -> Result<CheckIn, AppError> {
        let previous = self.state(fid).await?;
        let (state, outcome) = previous.check_in(today);

        if state != previous {
            self.store.put_streak(fid, &state).await?;
        }

        tracing::info!(
            fid,
            streak = state.count,
            previous = previous.count,
            outcome = ?outcome,
            day = %today,
            "Check-in recorded"
        );

        Ok(CheckIn { state, outcome })
    }

    /// Remove all stored state for `fid`.
    ///
    /// Serialized with check-ins so an in-flight check-in cannot write the
    /// streak back after it has been deleted.
    pub async fn delete(&self, fid: u64) -> Result<(), AppError> {
        let lock = self.lock_for(fid);
        let guard = lock.lock().await;
        let result = self.store.delete_user_state(fid).await;
        drop(guard);
        self.release(fid, &lock);

        if result.is_ok() {
            tracing::info!(fid, "User state deleted");
        }
        result
    }

    fn lock_for(&self, fid: u64) -> Arc<Mutex<()>> {
        self.locks
            .entry(fid)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the map entry once no other task holds or waits on it.
    fn release(&self, fid: u64, lock: &Arc<Mutex<()>>) {
        self.locks.remove_if(&fid, |_, held| {
            Arc::ptr_eq(held, lock) && Arc::strong_count(held) == 2
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::ScoreSnapshot;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Store whose streak reads stall, widening the read-modify-write window.
    struct SlowReadStore {
        inner: MemoryStore,
        delay: Duration,
    }

    #[async_trait]
    impl StateStore for SlowReadStore {
        async fn get_streak(&self, fid: u64) -> Result<Option<StreakState>, AppError> {
            let streak = self.inner.get_streak(fid).await;
            tokio::time::sleep(self.delay).await;
            streak
        }

        async fn put_streak(&self, fid: u64, streak: &StreakState) -> Result<(), AppError> {
            self.inner.put_streak(fid, streak).await
        }

        async fn get_score_snapshot(&self, fid: u64) -> Result<Option<ScoreSnapshot>, AppError> {
            self.inner.get_score_snapshot(fid).await
        }

        async fn put_score_snapshot(
            &self,
            fid: u64,
            snapshot: &ScoreSnapshot,
        ) -> Result<(), AppError> {
            self.inner.put_score_snapshot(fid, snapshot).await
        }

        async fn delete_user_state(&self, fid: u64) -> Result<(), AppError> {
            self.inner.delete_user_state(fid).await
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_current_without_state_is_one() {
        let tracker = StreakTracker::new(Arc::new(MemoryStore::new()));
        assert_eq!(tracker.current(3).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_check_in_persists() {
        let store = Arc::new(MemoryStore::new());
        let tracker = StreakTracker::new(store.clone());

        tracker.check_in(3, day("2024-01-10")).await.unwrap();
        let result = tracker.check_in(3, day("2024-01-11")).await.unwrap();

        assert_eq!(result.state.count, 2);
        assert_eq!(result.outcome, CheckInOutcome::Continued);
        assert_eq!(store.get_streak(3).await.unwrap(), Some(result.state));
        assert_eq!(tracker.current(3).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_same_day_check_ins_agree() {
        let tracker = StreakTracker::new(Arc::new(MemoryStore::new()));
        let today = day("2024-01-10");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = tracker.clone();
                tokio::spawn(async move { tracker.check_in(9, today).await })
            })
            .collect();

        for handle in handles {
            let result = handle.await.unwrap().unwrap();
            assert_eq!(result.state.count, 1);
        }
    }

    #[tokio::test]
    async fn test_delete_waits_for_in_flight_check_in() {
        let store = Arc::new(SlowReadStore {
            inner: MemoryStore::new(),
            delay: Duration::from_millis(100),
        });
        let tracker = StreakTracker::new(store.clone());

        let pending = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.check_in(7, day("2024-01-10")).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        tracker.delete(7).await.unwrap();
        pending.await.unwrap().unwrap();

        assert_eq!(store.inner.get_streak(7).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_resets_streak() {
        let tracker = StreakTracker::new(Arc::new(MemoryStore::new()));
        tracker.check_in(3, day("2024-01-10")).await.unwrap();
        tracker.check_in(3, day("2024-01-11")).await.unwrap();

        tracker.delete(3).await.unwrap();

        assert_eq!(tracker.state(3).await.unwrap(), StreakState::default());
    }

    #[tokio::test]
    async fn test_locks_released_after_use() {
        let tracker = StreakTracker::new(Arc::new(MemoryStore::new()));
        let today = day("2024-01-10");

        let handles: Vec<_> = (0..8u64)
            .map(|fid| {
                let tracker = tracker.clone();
                tokio::spawn(async move { tracker.check_in(fid % 3, today).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        tracker.delete(1).await.unwrap();

        assert!(tracker.locks.is_empty());
    }
}
