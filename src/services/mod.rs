// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod neynar;
pub mod normalizer;
pub mod profile_cache;
pub mod quick_auth;
pub mod share;
pub mod streak;

pub use neynar::NeynarClient;
pub use normalizer::{RejectionReason, ScoreNormalizer};
pub use profile_cache::ProfileCache;
pub use quick_auth::{QuickAuthError, QuickAuthVerifier, VerifiedUser};
pub use share::{compose_share_text, ShareText};
pub use streak::{CheckIn, StreakTracker};
