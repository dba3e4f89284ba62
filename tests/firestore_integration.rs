// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running and
//! FIRESTORE_EMULATOR_HOST to point at it; otherwise they are skipped.

use chrono::NaiveDate;
use std::sync::Arc;
use vibe_check::db::StateStore;
use vibe_check::models::{CheckInOutcome, ScoreSnapshot, StreakState};
use vibe_check::services::StreakTracker;

mod common;
use common::test_db;

/// Generate a unique fid for test isolation.
fn unique_fid() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos() as u64
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[tokio::test]
async fn test_streak_round_trip() {
    require_emulator!();

    let db = test_db().await;
    let fid = unique_fid();

    assert!(db.get_streak(fid).await.unwrap().is_none());

    let streak = StreakState {
        count: 4,
        last_check_in_date: Some(day("2024-01-10")),
    };
    db.put_streak(fid, &streak).await.unwrap();

    assert_eq!(db.get_streak(fid).await.unwrap(), Some(streak));
}

#[tokio::test]
async fn test_tracker_over_firestore() {
    require_emulator!();

    let tracker = StreakTracker::new(Arc::new(test_db().await));
    let fid = unique_fid();

    let first = tracker.check_in(fid, day("2024-02-28")).await.unwrap();
    assert_eq!(first.outcome, CheckInOutcome::Started);

    let second = tracker.check_in(fid, day("2024-02-29")).await.unwrap();
    assert_eq!(second.state.count, 2);

    assert_eq!(tracker.current(fid).await.unwrap(), 2);
}

#[tokio::test]
async fn test_delete_user_state() {
    require_emulator!();

    let db = test_db().await;
    let fid = unique_fid();

    db.put_streak(
        fid,
        &StreakState {
            count: 1,
            last_check_in_date: Some(day("2024-01-10")),
        },
    )
    .await
    .unwrap();
    db.put_score_snapshot(
        fid,
        &ScoreSnapshot {
            score: 0.42,
            previous_score: Some(0.4),
            recorded_at: "2024-01-10T00:00:00Z".to_string(),
        },
    )
    .await
    .unwrap();

    assert!(db.get_score_snapshot(fid).await.unwrap().is_some());

    db.delete_user_state(fid).await.unwrap();

    assert!(db.get_streak(fid).await.unwrap().is_none());
    assert!(db.get_score_snapshot(fid).await.unwrap().is_none());

    // Deleting again is not an error
    db.delete_user_state(fid).await.unwrap();
}
