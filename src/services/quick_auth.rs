// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Farcaster Quick Auth token verification.
//!
//! Mini-app clients send a JWT issued by the Quick Auth server. The token's
//! audience is the domain the mini-app runs on and its subject is the fid.

use crate::config::Config;
use anyhow::Context;
use axum::http::HeaderValue;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, RwLock};

pub const QUICK_AUTH_ISSUER: &str = "https://auth.farcaster.xyz";
const JWKS_URL: &str = "https://auth.farcaster.xyz/.well-known/jwks.json";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
const CLOCK_SKEW_SECS: u64 = 60;

/// Identity extracted from a valid Quick Auth token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedUser {
    pub fid: u64,
}

/// Verification error categories.
#[derive(Debug, Clone)]
pub enum QuickAuthError {
    /// The token is missing/invalid or claims do not match expectations.
    Unauthorized(String),
    /// Keys could not be fetched.
    Transient(String),
}

#[derive(Clone)]
enum VerifierMode {
    Jwks { url: String },
    SharedSecret { decoding_key: Arc<DecodingKey> },
}

#[derive(Clone)]
struct VerificationKey {
    algorithm: Algorithm,
    decoding_key: Arc<DecodingKey>,
}

#[derive(Clone)]
struct JwksCacheEntry {
    keys_by_kid: HashMap<String, VerificationKey>,
    expires_at: Instant,
}

/// Verifier for Quick Auth bearer tokens.
pub struct QuickAuthVerifier {
    http_client: reqwest::Client,
    mode: VerifierMode,
    jwks_cache: RwLock<Option<JwksCacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl QuickAuthVerifier {
    /// Build the verifier the config asks for.
    ///
    /// A configured shared secret selects HS256 verification of locally
    /// minted tokens; otherwise keys come from the Quick Auth JWKS.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        match &config.quick_auth_shared_secret {
            Some(secret) => {
                tracing::warn!("Quick Auth using shared-secret verification (development mode)");
                Self::new_with_shared_secret(secret)
            }
            None => Self::new(),
        }
    }

    /// Create a production verifier that fetches and caches Quick Auth JWKS keys.
    pub fn new() -> anyhow::Result<Self> {
        Self::new_with_jwks_url(JWKS_URL)
    }

    /// Create a verifier that fetches keys from `jwks_url`.
    pub fn new_with_jwks_url(jwks_url: impl Into<String>) -> anyhow::Result<Self> {
        let url = jwks_url.into();
        reqwest::Url::parse(&url).with_context(|| format!("invalid JWKS URL: {url}"))?;

        Ok(Self {
            http_client: build_http_client()?,
            mode: VerifierMode::Jwks { url },
            jwks_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Create a verifier accepting HS256 tokens signed with `secret`.
    ///
    /// This is intended for local development and tests.
    pub fn new_with_shared_secret(secret: &[u8]) -> anyhow::Result<Self> {
        if secret.is_empty() {
            anyhow::bail!("Quick Auth shared secret must not be empty");
        }

        Ok(Self {
            http_client: build_http_client()?,
            mode: VerifierMode::SharedSecret {
                decoding_key: Arc::new(DecodingKey::from_secret(secret)),
            },
            jwks_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Verify a bearer token from an Authorization header for `domain`.
    pub async fn verify(
        &self,
        auth_header: Option<&HeaderValue>,
        domain: &str,
    ) -> Result<VerifiedUser, QuickAuthError> {
        let token = extract_bearer_token(auth_header)?;

        let header = decode_header(token)
            .map_err(|e| QuickAuthError::Unauthorized(format!("invalid JWT header: {e}")))?;

        let key = match &self.mode {
            VerifierMode::SharedSecret { decoding_key } => VerificationKey {
                algorithm: Algorithm::HS256,
                decoding_key: decoding_key.clone(),
            },
            VerifierMode::Jwks { .. } => {
                let kid = header
                    .kid
                    .as_deref()
                    .ok_or_else(|| QuickAuthError::Unauthorized("missing JWT kid".to_string()))?;
                self.key_for_kid(kid).await?
            }
        };

        if header.alg != key.algorithm {
            return Err(QuickAuthError::Unauthorized(format!(
                "unexpected JWT alg: {:?}",
                header.alg
            )));
        }

        let mut validation = Validation::new(key.algorithm);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.set_issuer(&[QUICK_AUTH_ISSUER]);
        validation.set_audience(&[domain]);
        validation.leeway = CLOCK_SKEW_SECS;

        let claims = decode::<QuickAuthClaims>(token, key.decoding_key.as_ref(), &validation)
            .map_err(|e| QuickAuthError::Unauthorized(format!("JWT validation failed: {e}")))?
            .claims;

        validate_iat(claims.iat)?;

        let fid = parse_subject(&claims.sub)
            .ok_or_else(|| QuickAuthError::Unauthorized("invalid sub claim".to_string()))?;

        tracing::debug!(fid, domain, issuer = %claims.iss, "Quick Auth token verified");

        Ok(VerifiedUser { fid })
    }

    async fn key_for_kid(&self, kid: &str) -> Result<VerificationKey, QuickAuthError> {
        if let Some(key) = self.lookup_cached_key(kid).await {
            return Ok(key);
        }

        for force_refresh in [false, true] {
            self.refresh_jwks(force_refresh).await?;
            if let Some(key) = self.lookup_cached_key(kid).await {
                return Ok(key);
            }
        }

        Err(QuickAuthError::Unauthorized(format!(
            "JWT kid not found in JWKS after refresh: {kid}"
        )))
    }

    async fn lookup_cached_key(&self, kid: &str) -> Option<VerificationKey> {
        let cache = self.jwks_cache.read().await;
        let now = Instant::now();
        cache
            .as_ref()
            .filter(|entry| entry.expires_at > now)
            .and_then(|entry| entry.keys_by_kid.get(kid))
            .cloned()
    }

    async fn refresh_jwks(&self, force_refresh: bool) -> Result<(), QuickAuthError> {
        let _guard = self.refresh_lock.lock().await;

        if !force_refresh {
            let cache = self.jwks_cache.read().await;
            if cache
                .as_ref()
                .is_some_and(|entry| entry.expires_at > Instant::now())
            {
                return Ok(());
            }
        }

        let VerifierMode::Jwks { url } = &self.mode else {
            return Ok(());
        };

        tracing::debug!(jwks_uri = %url, "Refreshing Quick Auth JWKS cache");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| QuickAuthError::Transient(format!("JWKS request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(QuickAuthError::Transient(format!(
                "JWKS request returned status {}",
                response.status()
            )));
        }

        let ttl = cache_ttl_from_headers(response.headers(), DEFAULT_CACHE_TTL);

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| QuickAuthError::Transient(format!("invalid JWKS JSON: {e}")))?;

        let keys_by_kid: HashMap<String, VerificationKey> = jwks
            .keys
            .into_iter()
            .filter(|jwk| !jwk.kid.trim().is_empty())
            .filter(|jwk| jwk.use_.as_deref().map_or(true, |u| u == "sig"))
            .filter_map(|jwk| {
                let key = verification_key(&jwk)?;
                Some((jwk.kid, key))
            })
            .collect();

        if keys_by_kid.is_empty() {
            return Err(QuickAuthError::Transient(
                "JWKS response did not include any usable keys".to_string(),
            ));
        }

        *self.jwks_cache.write().await = Some(JwksCacheEntry {
            keys_by_kid,
            expires_at: Instant::now() + ttl,
        });

        tracing::debug!(ttl_secs = ttl.as_secs(), "Quick Auth JWKS cache refreshed");
        Ok(())
    }
}

fn build_http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(DEFAULT_HTTP_TIMEOUT)
        .build()
        .context("failed building Quick Auth HTTP client")
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    alg: Option<String>,
    crv: Option<String>,
    n: Option<String>,
    e: Option<String>,
    x: Option<String>,
    #[serde(rename = "use")]
    use_: Option<String>,
}

/// RSA (RS256) and Ed25519 (EdDSA) keys are supported.
fn verification_key(jwk: &Jwk) -> Option<VerificationKey> {
    let (algorithm, result) = match (jwk.kty.as_str(), jwk.alg.as_deref()) {
        ("RSA", None | Some("RS256")) => (
            Algorithm::RS256,
            DecodingKey::from_rsa_components(jwk.n.as_deref()?, jwk.e.as_deref()?),
        ),
        ("OKP", None | Some("EdDSA")) if jwk.crv.as_deref() == Some("Ed25519") => (
            Algorithm::EdDSA,
            DecodingKey::from_ed_components(jwk.x.as_deref()?),
        ),
        _ => return None,
    };

    match result {
        Ok(key) => Some(VerificationKey {
            algorithm,
            decoding_key: Arc::new(key),
        }),
        Err(e) => {
            tracing::warn!(error = %e, kid = %jwk.kid, "Skipping invalid JWKS key");
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct QuickAuthClaims {
    iss: String,
    /// The fid; issued as a number but tolerated as a numeric string.
    sub: Value,
    iat: Option<usize>,
}

fn parse_subject(sub: &Value) -> Option<u64> {
    match sub {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|fid| *fid > 0)
}

fn extract_bearer_token(auth_header: Option<&HeaderValue>) -> Result<&str, QuickAuthError> {
    let value = auth_header
        .ok_or_else(|| QuickAuthError::Unauthorized("missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| QuickAuthError::Unauthorized("invalid Authorization header".to_string()))?;

    let token = value.strip_prefix("Bearer ").ok_or_else(|| {
        QuickAuthError::Unauthorized("Authorization header must be Bearer token".to_string())
    })?;

    if token.is_empty() {
        return Err(QuickAuthError::Unauthorized(
            "Bearer token is empty".to_string(),
        ));
    }

    Ok(token)
}

fn validate_iat(iat: Option<usize>) -> Result<(), QuickAuthError> {
    let Some(iat) = iat else {
        return Ok(());
    };

    if iat as u64 > now_unix_secs() + CLOCK_SKEW_SECS {
        return Err(QuickAuthError::Unauthorized(
            "iat claim is in the future".to_string(),
        ));
    }

    Ok(())
}

fn cache_ttl_from_headers(headers: &reqwest::header::HeaderMap, fallback: Duration) -> Duration {
    headers
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_cache_control_max_age)
        .map(Duration::from_secs)
        .unwrap_or(fallback)
}

fn parse_cache_control_max_age(value: &str) -> Option<u64> {
    value
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|raw| raw.trim_matches('"').parse::<u64>().ok())
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
