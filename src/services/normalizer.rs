// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Score normalization: untrusted upstream payload to validated profile.
//!
//! The normalizer fails closed. Every rejection is explicit and no path ever
//! fabricates a score; callers must treat a rejection as "no data", not as a
//! score of zero.

use crate::models::profile::{CREATED_AT_FIELDS, FOLLOWER_FIELDS, ID_FIELDS, NAME_FIELDS};
use crate::models::{NormalizedProfile, RawProfileRecord, ScoreSource, Tier};
use crate::time_utils::whole_days_between;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

/// Scores above this are rejected unless they came from the trusted field.
pub const PLAUSIBILITY_THRESHOLD: f64 = 0.95;

/// Numeric timestamps above this are milliseconds, otherwise seconds.
const MILLIS_THRESHOLD: f64 = 1e12;

/// Maximum presumed account age per fid range, lowest ids first.
const AGE_BUCKETS: [(u64, u32); 5] = [
    (10_000, 1_200),
    (100_000, 900),
    (300_000, 600),
    (700_000, 365),
    (1_000_000, 180),
];
const NEWEST_BUCKET_DAYS: u32 = 90;

/// Why a raw record could not be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    #[error("no score present in profile")]
    MissingScore,

    #[error("score is not a finite number")]
    InvalidScoreType,

    #[error("score outside the 0-100 range")]
    ScoreOutOfRange,

    #[error("score above plausibility threshold from an untrusted field")]
    ImplausibleHighScore,

    #[error("profile has no user id")]
    MissingIdentity,
}

impl RejectionReason {
    /// Stable machine-readable code for API responses.
    pub fn code(self) -> &'static str {
        match self {
            RejectionReason::MissingScore => "missing_score",
            RejectionReason::InvalidScoreType => "invalid_score_type",
            RejectionReason::ScoreOutOfRange => "score_out_of_range",
            RejectionReason::ImplausibleHighScore => "implausible_high_score",
            RejectionReason::MissingIdentity => "missing_identity",
        }
    }
}

/// Converts raw upstream profiles into [`NormalizedProfile`]s.
#[derive(Debug, Clone)]
pub struct ScoreNormalizer {
    plausibility_threshold: f64,
    age_anchor: NaiveDate,
}

impl Default for ScoreNormalizer {
    fn default() -> Self {
        Self {
            plausibility_threshold: PLAUSIBILITY_THRESHOLD,
            // Farcaster epoch
            age_anchor: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or_default(),
        }
    }
}

impl ScoreNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize against the current wall-clock time.
    pub fn normalize(
        &self,
        raw: Option<&RawProfileRecord>,
    ) -> Result<NormalizedProfile, RejectionReason> {
        self.normalize_at(raw, Utc::now())
    }

    /// Normalize with an explicit "now" (used for account age).
    ///
    /// An absent record (upstream failure) is treated as a missing score.
    pub fn normalize_at(
        &self,
        raw: Option<&RawProfileRecord>,
        now: DateTime<Utc>,
    ) -> Result<NormalizedProfile, RejectionReason> {
        let raw = raw.ok_or(RejectionReason::MissingScore)?;

        let fid = raw
            .first_of(ID_FIELDS)
            .and_then(parse_fid)
            .ok_or(RejectionReason::MissingIdentity)?;

        let follower_count = raw.first_of(FOLLOWER_FIELDS).map(parse_count).unwrap_or(0);

        let (value, score_source) = raw.score_field().ok_or(RejectionReason::MissingScore)?;
        let score = self.validate_score(value, score_source)?;

        let display_name = raw
            .first_of(NAME_FIELDS)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("fid-{}", fid));

        let account_age_days = raw
            .first_of(CREATED_AT_FIELDS)
            .and_then(parse_created_at)
            .filter(|created| *created <= now)
            .map(|created| clamp_days(whole_days_between(created, now)))
            .unwrap_or_else(|| self.estimate_account_age(fid, now));

        Ok(NormalizedProfile {
            fid,
            display_name,
            score,
            tier: Tier::from_score(score),
            score_source,
            follower_count,
            account_age_days,
        })
    }

    /// Scale, bound and plausibility-check a raw score value.
    fn validate_score(&self, value: &Value, source: ScoreSource) -> Result<f64, RejectionReason> {
        let raw = value
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or(RejectionReason::InvalidScoreType)?;

        if !(0.0..=100.0).contains(&raw) {
            return Err(RejectionReason::ScoreOutOfRange);
        }

        let scaled = if raw > 1.0 { raw / 100.0 } else { raw };
        let score = scaled.clamp(0.0, 1.0);

        if score > self.plausibility_threshold && source != ScoreSource::Trusted {
            return Err(RejectionReason::ImplausibleHighScore);
        }

        Ok(score)
    }

    /// Presumed account age when the payload carries no usable creation time.
    ///
    /// Lower fids registered earlier, so they get a larger cap. The cap never
    /// exceeds the days elapsed since the anchor date.
    pub fn estimate_account_age(&self, fid: u64, now: DateTime<Utc>) -> u32 {
        let cap = AGE_BUCKETS
            .iter()
            .find(|(max_fid, _)| fid <= *max_fid)
            .map(|(_, days)| *days)
            .unwrap_or(NEWEST_BUCKET_DAYS);

        let anchor = self.age_anchor.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        let since_anchor = anchor
            .map(|a| clamp_days(whole_days_between(a, now)))
            .unwrap_or(0);

        cap.min(since_anchor)
    }
}

fn parse_fid(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
    .filter(|fid| *fid > 0)
}

fn parse_count(value: &Value) -> u64 {
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v as u64)
        })
        .unwrap_or(0)
}

fn parse_created_at(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let ts = n.as_f64().filter(|t| t.is_finite() && *t > 0.0)?;
            if ts > MILLIS_THRESHOLD {
                DateTime::from_timestamp_millis(ts as i64)
            } else {
                DateTime::from_timestamp(ts as i64, 0)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(|dt| dt.and_utc())
                })
        }
        _ => None,
    }
}

fn clamp_days(days: i64) -> u32 {
    days.clamp(0, u32::MAX as i64) as u32
}
