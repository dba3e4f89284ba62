// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Neynar API client for fetching raw Farcaster profiles.
//!
//! The client only transports data. It never interprets scores; payloads are
//! handed to the normalizer as [`RawProfileRecord`]s.

use crate::error::AppError;
use crate::models::RawProfileRecord;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Neynar API client.
#[derive(Clone)]
pub struct NeynarClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

/// Response of `GET /v2/farcaster/user/bulk`.
#[derive(Debug, Deserialize)]
struct BulkUsersResponse {
    #[serde(default)]
    users: Vec<Value>,
}

impl NeynarClient {
    /// Create a new client. Without an API key every fetch yields no record.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to build HTTP client with timeout; using defaults");
                reqwest::Client::new()
            });

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Whether upstream fetches are enabled at all.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetch the raw profile for a fid.
    ///
    /// Returns `Ok(None)` when the API key is not configured or the user does
    /// not exist upstream.
    pub async fn fetch_user(&self, fid: u64) -> Result<Option<RawProfileRecord>, AppError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!(fid, "NEYNAR_API_KEY not set; no profile data available");
            return Ok(None);
        };

        let url = format!("{}/v2/farcaster/user/bulk", self.base_url);

        let response = self
            .http
            .get(&url)
            .header("api_key", api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("fids", fid.to_string())])
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        let body: BulkUsersResponse = self.check_response_json(response).await?;

        Ok(body.users.into_iter().next().map(RawProfileRecord::new))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Neynar rate limit hit (429)");
                return Err(AppError::Upstream(AppError::UPSTREAM_RATE_LIMIT.to_string()));
            }

            return Err(AppError::Upstream(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("JSON parse error: {}", e)))
    }
}
