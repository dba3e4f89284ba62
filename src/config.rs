//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup. Secrets for local development can live in
//! a `.env` file; in production they are injected as environment variables.

use std::env;
use std::time::Duration;

const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";
const DEFAULT_NEYNAR_API_URL: &str = "https://api.neynar.com";
const DEFAULT_PROFILE_CACHE_TTL_SECS: u64 = 5 * 60;

/// Farcaster account association proving domain ownership in the manifest.
#[derive(Debug, Clone, Default)]
pub struct AccountAssociation {
    pub header: String,
    pub payload: String,
    pub signature: String,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Public URL of the mini-app (manifest URLs, CORS, Quick Auth domain)
    pub public_url: String,
    /// Neynar API base URL
    pub neynar_api_url: String,
    /// GCP project ID; streaks go to Firestore when set, memory otherwise
    pub gcp_project_id: Option<String>,
    /// Server port
    pub port: u16,
    /// Freshness window for normalized profiles
    pub profile_cache_ttl: Duration,
    /// Manifest account association
    pub account_association: AccountAssociation,
    /// Base builder owner address for the manifest
    pub base_builder_owner: Option<String>,

    // --- Secrets ---
    /// Neynar API key; upstream fetches are disabled without it
    pub neynar_api_key: Option<String>,
    /// HS256 secret for locally minted Quick Auth tokens (dev/test only)
    pub quick_auth_shared_secret: Option<Vec<u8>>,
}

impl Config {
    /// Deterministic config for tests.
    pub fn test_default() -> Self {
        Self {
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            neynar_api_url: "http://127.0.0.1:9".to_string(),
            gcp_project_id: None,
            port: 8080,
            profile_cache_ttl: Duration::from_secs(DEFAULT_PROFILE_CACHE_TTL_SECS),
            account_association: AccountAssociation {
                header: "test-header".to_string(),
                payload: "test-payload".to_string(),
                signature: "test-signature".to_string(),
            },
            base_builder_owner: None,
            neynar_api_key: None,
            quick_auth_shared_secret: Some(b"test_quick_auth_secret_32_bytes!".to_vec()),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let public_url = env::var("PUBLIC_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_PUBLIC_URL.to_string());
        if reqwest::Url::parse(&public_url).is_err() {
            return Err(ConfigError::Invalid("PUBLIC_URL", public_url));
        }

        let profile_cache_ttl = match env::var("PROFILE_CACHE_TTL_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid("PROFILE_CACHE_TTL_SECS", raw))?,
            Err(_) => Duration::from_secs(DEFAULT_PROFILE_CACHE_TTL_SECS),
        };

        Ok(Self {
            public_url,
            neynar_api_url: env::var("NEYNAR_API_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_NEYNAR_API_URL.to_string()),
            gcp_project_id: non_empty_var("GCP_PROJECT_ID"),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            profile_cache_ttl,
            account_association: AccountAssociation {
                header: non_empty_var("ACCOUNT_ASSOCIATION_HEADER").unwrap_or_default(),
                payload: non_empty_var("ACCOUNT_ASSOCIATION_PAYLOAD").unwrap_or_default(),
                signature: non_empty_var("ACCOUNT_ASSOCIATION_SIGNATURE").unwrap_or_default(),
            },
            base_builder_owner: non_empty_var("BASE_BUILDER_OWNER_ADDRESS"),
            neynar_api_key: non_empty_var("NEYNAR_API_KEY"),
            quick_auth_shared_secret: non_empty_var("QUICK_AUTH_SHARED_SECRET")
                .map(String::into_bytes),
        })
    }

    /// Host (with port, if any) of the public URL.
    pub fn public_host(&self) -> Option<String> {
        let url = reqwest::Url::parse(&self.public_url).ok()?;
        let host = url.host_str()?;
        Some(match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
