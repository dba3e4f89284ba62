// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Quick Auth authentication middleware.

use crate::config::Config;
use crate::services::quick_auth::QuickAuthError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated user extracted from the Quick Auth token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub fid: u64,
}

/// Middleware that requires a valid Quick Auth token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let domain = request_domain(request.headers(), &state.config).ok_or_else(|| {
        tracing::error!("Unable to determine request domain for Quick Auth");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let verified = state
        .quick_auth
        .verify(request.headers().get(header::AUTHORIZATION), &domain)
        .await
        .map_err(|err| match err {
            QuickAuthError::Unauthorized(reason) => {
                tracing::debug!(reason = %reason, domain = %domain, "Rejected Quick Auth token");
                StatusCode::UNAUTHORIZED
            }
            QuickAuthError::Transient(reason) => {
                tracing::error!(reason = %reason, "Quick Auth verification transient failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })?;

    request
        .extensions_mut()
        .insert(AuthUser { fid: verified.fid });

    Ok(next.run(request).await)
}

/// Domain the mini-app is served from: the `Origin` host, then `Host`,
/// then the configured public URL.
pub fn request_domain(headers: &HeaderMap, config: &Config) -> Option<String> {
    let from_origin = headers
        .get(header::ORIGIN)
        .and_then(|h| h.to_str().ok())
        .and_then(|origin| match reqwest::Url::parse(origin) {
            Ok(url) => url.host_str().map(|host| match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            }),
            Err(e) => {
                tracing::warn!(origin, error = %e, "Invalid Origin header");
                None
            }
        });

    from_origin
        .or_else(|| {
            headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        })
        .or_else(|| config.public_host())
}
