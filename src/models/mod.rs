// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod manifest;
pub mod profile;
pub mod streak;

pub use manifest::MiniAppManifest;
pub use profile::{NormalizedProfile, RawProfileRecord, ScoreSnapshot, ScoreSource, Tier};
pub use streak::{CheckInOutcome, StreakState};
