// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory freshness cache for normalized profiles.

use crate::models::NormalizedProfile;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Entry count above which inserts sweep out expired entries.
const SWEEP_THRESHOLD: usize = 1024;

/// Cached profile with the time it was stored.
#[derive(Clone)]
struct CachedProfile {
    profile: NormalizedProfile,
    stored_at: Instant,
}

/// Per-fid cache of successfully normalized profiles.
///
/// Only successes go in; rejections must be re-fetched every time.
#[derive(Clone)]
pub struct ProfileCache {
    entries: Arc<DashMap<u64, CachedProfile>>,
    ttl: Duration,
}

impl ProfileCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Get a fresh cached profile, dropping it if it has expired.
    pub fn get(&self, fid: u64) -> Option<NormalizedProfile> {
        self.get_at(fid, Instant::now())
    }

    fn get_at(&self, fid: u64, now: Instant) -> Option<NormalizedProfile> {
        if let Some(cached) = self.entries.get(&fid) {
            let age = now.saturating_duration_since(cached.stored_at);
            if age < self.ttl {
                tracing::debug!(fid, age_secs = age.as_secs(), "Profile cache hit");
                return Some(cached.profile.clone());
            }
        }

        // Expired entries are removed lazily
        self.entries
            .remove_if(&fid, |_, cached| now.saturating_duration_since(cached.stored_at) >= self.ttl);
        None
    }

    pub fn insert(&self, profile: NormalizedProfile) {
        self.insert_at(profile, Instant::now());
    }

    fn insert_at(&self, profile: NormalizedProfile, now: Instant) {
        if self.entries.len() >= SWEEP_THRESHOLD {
            self.purge_expired_at(now);
        }

        self.entries.insert(
            profile.fid,
            CachedProfile {
                profile,
                stored_at: now,
            },
        );
    }

    /// Drop every expired entry, not just the ones looked up again.
    pub fn purge_expired(&self) {
        self.purge_expired_at(Instant::now());
    }

    fn purge_expired_at(&self, now: Instant) {
        let before = self.entries.len();
        self.entries
            .retain(|_, cached| now.saturating_duration_since(cached.stored_at) < self.ttl);

        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            tracing::debug!(purged, remaining = self.entries.len(), "Purged expired profiles");
        }
    }

    pub fn invalidate(&self, fid: u64) {
        self.entries.remove(&fid);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
