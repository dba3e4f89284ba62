// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{CheckInOutcome, NormalizedProfile, ScoreSnapshot, ScoreSource};
use crate::services::{compose_share_text, RejectionReason};
use crate::time_utils::{format_utc_rfc3339, utc_day};
use crate::AppState;
use axum::{
    extract::State,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require a Quick Auth token).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user-stats", get(get_user_stats))
        .route("/api/streak", get(get_streak))
        .route("/api/checkin", post(check_in))
        .route("/api/share", get(get_share))
        .route("/api/account", delete(delete_account))
}

/// Cached profile for `fid`, or a fresh, validated one from Neynar.
///
/// Upstream failures are treated as "no record" so that every failure mode
/// surfaces as a normalizer rejection instead of a partial profile.
async fn load_profile(state: &AppState, fid: u64) -> Result<NormalizedProfile> {
    if let Some(profile) = state.profile_cache.get(fid) {
        tracing::debug!(fid, "Profile cache hit");
        return Ok(profile);
    }

    let raw = match state.neynar.fetch_user(fid).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(
                fid,
                error = %e,
                rate_limited = e.is_rate_limited(),
                "Neynar fetch failed"
            );
            None
        }
    };

    let profile = state.normalizer.normalize(raw.as_ref()).map_err(|reason| {
        tracing::warn!(fid, reason = reason.code(), "Rejected upstream profile");
        AppError::from(reason)
    })?;

    if profile.fid != fid {
        tracing::warn!(
            fid,
            returned_fid = profile.fid,
            "Upstream returned a different user"
        );
        return Err(RejectionReason::MissingIdentity.into());
    }

    if profile.score_source == ScoreSource::Fallback {
        tracing::info!(fid, "Score taken from a fallback field");
    }

    record_score(state, &profile).await;
    state.profile_cache.insert(profile.clone());

    Ok(profile)
}

/// Fold a fresh score into the stored snapshot. Failures only cost the delta.
async fn record_score(state: &AppState, profile: &NormalizedProfile) {
    let previous = match state.store.get_score_snapshot(profile.fid).await {
        Ok(previous) => previous,
        Err(e) => {
            tracing::warn!(fid = profile.fid, error = %e, "Failed to read score snapshot");
            return;
        }
    };

    let next = ScoreSnapshot::advance(
        previous.as_ref(),
        profile.score,
        format_utc_rfc3339(Utc::now()),
    );
    if previous.as_ref() == Some(&next) {
        return;
    }

    if let Err(e) = state.store.put_score_snapshot(profile.fid, &next).await {
        tracing::warn!(fid = profile.fid, error = %e, "Failed to store score snapshot");
    }
}

/// Score movement for a profile; 0 unless the snapshot matches the current score.
async fn score_delta(state: &AppState, profile: &NormalizedProfile) -> f64 {
    match state.store.get_score_snapshot(profile.fid).await {
        Ok(Some(snapshot)) if snapshot.score == profile.score => snapshot.delta(),
        Ok(_) => 0.0,
        Err(e) => {
            tracing::warn!(fid = profile.fid, error = %e, "Failed to read score snapshot");
            0.0
        }
    }
}

// ─── User Stats ──────────────────────────────────────────────

/// Stats shown on the mini-app home screen.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserStats {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub fid: u64,
    pub username: String,
    pub streak: u32,
    pub neynar_score: f64,
    pub score_delta: f64,
    pub rank: String,
    pub score_source: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_followers: u64,
    pub account_age_days: u32,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserStatsResponse {
    pub success: bool,
    pub user: UserStats,
}

/// Get the caller's normalized score, tier and streak.
async fn get_user_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserStatsResponse>> {
    let profile = load_profile(&state, user.fid).await?;
    let streak = state.streaks.current(user.fid).await?;
    let score_delta = score_delta(&state, &profile).await;

    let score_source = match profile.score_source {
        ScoreSource::Trusted => "trusted",
        ScoreSource::Fallback => "fallback",
    };

    Ok(Json(UserStatsResponse {
        success: true,
        user: UserStats {
            fid: profile.fid,
            username: profile.display_name,
            streak,
            neynar_score: profile.score,
            score_delta,
            rank: profile.tier.label().to_string(),
            score_source: score_source.to_string(),
            total_followers: profile.follower_count,
            account_age_days: profile.account_age_days,
        },
    }))
}

// ─── Streaks ─────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StreakResponse {
    pub streak: u32,
    /// Calendar day (YYYY-MM-DD) of the last check-in
    pub last_check_in_date: Option<String>,
}

/// Get the caller's streak without changing it.
async fn get_streak(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StreakResponse>> {
    let streak = state.streaks.state(user.fid).await?;

    Ok(Json(StreakResponse {
        streak: streak.peek(),
        last_check_in_date: streak.last_check_in_date.map(|d| d.to_string()),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CheckInResponse {
    pub streak: u32,
    pub last_check_in_date: String,
    pub outcome: CheckInOutcome,
}

/// Record today's check-in (UTC calendar day).
async fn check_in(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CheckInResponse>> {
    let today = utc_day(Utc::now());
    let result = state.streaks.check_in(user.fid, today).await?;

    Ok(Json(CheckInResponse {
        streak: result.state.count,
        last_check_in_date: today.to_string(),
        outcome: result.outcome,
    }))
}

// ─── Sharing ─────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ShareResponse {
    pub text: String,
    pub fallback_text: String,
}

/// Compose the cast text for sharing the caller's score.
async fn get_share(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ShareResponse>> {
    let profile = load_profile(&state, user.fid).await?;
    let streak = state.streaks.current(user.fid).await?;
    let share = compose_share_text(&profile, streak, &state.config.public_url);

    Ok(Json(ShareResponse {
        text: share.text,
        fallback_text: share.fallback_text,
    }))
}

// ─── Account Deletion ────────────────────────────────────────

/// Response for account deletion.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteAccountResponse {
    pub success: bool,
    pub message: String,
}

/// Delete the caller's streak and score history.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DeleteAccountResponse>> {
    tracing::info!(fid = user.fid, "User-initiated account deletion");

    state.streaks.delete(user.fid).await?;
    state.profile_cache.invalidate(user.fid);

    Ok(Json(DeleteAccountResponse {
        success: true,
        message: "Streak and score history deleted.".to_string(),
    }))
}
