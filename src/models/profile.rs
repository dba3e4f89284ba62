// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Upstream profile records and their normalized form.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Where a raw score was found in the upstream payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// The authoritative score location.
    Trusted,
    /// A looser, legacy or alternate location.
    Fallback,
}

/// JSON pointers tried for the user id, in priority order.
pub const ID_FIELDS: &[&str] = &["/fid", "/user_id", "/id"];

/// JSON pointers tried for the display name, in priority order.
pub const NAME_FIELDS: &[&str] = &["/username", "/display_name", "/displayName"];

/// JSON pointers tried for the follower count, in priority order.
pub const FOLLOWER_FIELDS: &[&str] = &[
    "/follower_count",
    "/followers_count",
    "/followerCount",
    "/followers",
];

/// JSON pointers tried for the reputation score, most-trusted first.
pub const SCORE_FIELDS: &[(&str, ScoreSource)] = &[
    ("/score", ScoreSource::Trusted),
    ("/experimental/neynar_user_score", ScoreSource::Fallback),
    ("/neynar_score", ScoreSource::Fallback),
    ("/neynarScore", ScoreSource::Fallback),
];

/// JSON pointers tried for the account creation time, in priority order.
pub const CREATED_AT_FIELDS: &[&str] =
    &["/registered_at", "/created_at", "/createdAt", "/timestamp"];

/// Untrusted profile payload as returned by the upstream API.
///
/// The shape varies between payload versions, so logical fields are resolved
/// by walking the accessor tables above; the first non-null value wins.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProfileRecord {
    body: Value,
}

impl RawProfileRecord {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    /// First non-null value among `pointers`.
    pub fn first_of<'a>(&'a self, pointers: &[&str]) -> Option<&'a Value> {
        pointers
            .iter()
            .filter_map(|p| self.body.pointer(p))
            .find(|v| !v.is_null())
    }

    /// First non-null score value, tagged with the location it came from.
    pub fn score_field(&self) -> Option<(&Value, ScoreSource)> {
        SCORE_FIELDS.iter().find_map(|(pointer, source)| {
            self.body
                .pointer(pointer)
                .filter(|v| !v.is_null())
                .map(|v| (v, *source))
        })
    }
}

/// Discrete score bands, declared from lowest to highest so that the derived
/// ordering is rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Dormant,
    Newcomer,
    Emerging,
    Active,
    Rising,
    Solid,
    Strong,
    Elite,
    Master,
    Legendary,
}

/// Lower bounds (inclusive), highest first.
const TIER_THRESHOLDS: [(f64, Tier); 9] = [
    (0.90, Tier::Legendary),
    (0.80, Tier::Master),
    (0.70, Tier::Elite),
    (0.60, Tier::Strong),
    (0.50, Tier::Solid),
    (0.40, Tier::Rising),
    (0.30, Tier::Active),
    (0.20, Tier::Emerging),
    (0.10, Tier::Newcomer),
];

impl Tier {
    /// Map a normalized score in [0, 1] to its band.
    pub fn from_score(score: f64) -> Self {
        TIER_THRESHOLDS
            .iter()
            .find(|(lower, _)| score >= *lower)
            .map(|(_, tier)| *tier)
            .unwrap_or(Tier::Dormant)
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Dormant => "DORMANT",
            Tier::Newcomer => "NEWCOMER",
            Tier::Emerging => "EMERGING",
            Tier::Active => "ACTIVE",
            Tier::Rising => "RISING",
            Tier::Solid => "SOLID",
            Tier::Strong => "STRONG",
            Tier::Elite => "ELITE",
            Tier::Master => "MASTER",
            Tier::Legendary => "LEGENDARY",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Validated profile. `score` is always within [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedProfile {
    pub fid: u64,
    pub display_name: String,
    pub score: f64,
    pub tier: Tier,
    pub score_source: ScoreSource,
    pub follower_count: u64,
    pub account_age_days: u32,
}

/// Last score seen for a user and the score before it changed.
///
/// Stored at: `score_snapshots/{fid}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub score: f64,
    /// Score before the most recent change, if any
    #[serde(default)]
    pub previous_score: Option<f64>,
    /// RFC3339 timestamp of when `score` was first observed
    pub recorded_at: String,
}

impl ScoreSnapshot {
    /// Fold a newly observed score into the stored snapshot.
    ///
    /// An unchanged score keeps the existing snapshot so the reported delta
    /// survives repeated fetches.
    pub fn advance(previous: Option<&ScoreSnapshot>, score: f64, recorded_at: String) -> Self {
        match previous {
            Some(prev) if prev.score == score => prev.clone(),
            Some(prev) => ScoreSnapshot {
                score,
                previous_score: Some(prev.score),
                recorded_at,
            },
            None => ScoreSnapshot {
                score,
                previous_score: None,
                recorded_at,
            },
        }
    }

    /// Movement since the previous score; 0 when there is none.
    pub fn delta(&self) -> f64 {
        self.previous_score.map(|p| self.score - p).unwrap_or(0.0)
    }
}
