// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Vibe Check: reputation score and daily streak backend for a Farcaster
//! mini-app.
//!
//! This crate validates untrusted profile payloads from Neynar into a
//! normalized score and tier, and tracks per-user daily check-in streaks.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::StateStore;
use services::{NeynarClient, ProfileCache, QuickAuthVerifier, ScoreNormalizer, StreakTracker};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn StateStore>,
    pub neynar: NeynarClient,
    pub normalizer: ScoreNormalizer,
    pub profile_cache: ProfileCache,
    pub streaks: StreakTracker,
    pub quick_auth: Arc<QuickAuthVerifier>,
}

impl AppState {
    /// Wire up services around a store and a token verifier.
    pub fn new(
        config: Config,
        store: Arc<dyn StateStore>,
        quick_auth: Arc<QuickAuthVerifier>,
    ) -> Self {
        let neynar = NeynarClient::new(
            config.neynar_api_url.clone(),
            config.neynar_api_key.clone(),
        );
        let profile_cache = ProfileCache::new(config.profile_cache_ttl);
        let streaks = StreakTracker::new(store.clone());

        Self {
            config,
            store,
            neynar,
            normalizer: ScoreNormalizer::new(),
            profile_cache,
            streaks,
            quick_auth,
        }
    }
}
