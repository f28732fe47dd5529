use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use url::Url;

/// Fixed diagnostic surfaced whenever a data call is attempted against an
/// unconfigured backend handle.
pub const NOT_CONFIGURED: &str = "Backend client is not configured. Set WATCHDESK_BACKEND_URL and \
     WATCHDESK_ANON_KEY to enable data access.";

/// Account id served in degraded mode (no backend configured). Deliberately
/// not a UUID so it can never collide with a real row.
pub const MOCK_ACCOUNT_ID: &str = "acct-b6-mock";

/// Connection settings for the hosted backend.
///
/// Both values are optional on purpose: an unconfigured handle still
/// constructs, and every data call through it fails with [`NOT_CONFIGURED`]
/// before any network I/O. The account resolver is the one component that
/// short-circuits instead (mock account, manager role).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    pub url: Option<String>,
    pub anon_key: Option<String>,
}

impl BackendSettings {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            anon_key: Some(anon_key.into()),
        }
    }

    /// Read settings from `WATCHDESK_BACKEND_URL` / `WATCHDESK_ANON_KEY`.
    /// A malformed URL counts as absent; a warning is logged so the
    /// misconfiguration is visible instead of silently degrading.
    pub fn from_env() -> Self {
        let url = match env::var("WATCHDESK_BACKEND_URL") {
            Ok(raw) if !raw.trim().is_empty() => match Url::parse(raw.trim()) {
                Ok(parsed) => Some(parsed.to_string().trim_end_matches('/').to_string()),
                Err(e) => {
                    tracing::warn!("WATCHDESK_BACKEND_URL is not a valid URL ({}), ignoring", e);
                    None
                }
            },
            _ => None,
        };
        let anon_key = env::var("WATCHDESK_ANON_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty());

        if url.is_none() || anon_key.is_none() {
            tracing::warn!(
                "backend environment variables are missing; data queries will fail until \
                 WATCHDESK_BACKEND_URL and WATCHDESK_ANON_KEY are configured"
            );
        }

        Self { url, anon_key }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.anon_key.is_some()
    }
}

/// Tuning knobs for the query layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Attempt ceiling for transient faults. Permission denials always stop
    /// at one attempt regardless of this value.
    pub max_attempts: u32,
    /// Base delay between retries; attempt N sleeps N * base.
    pub retry_backoff_ms: u64,
    /// How long a cached read stays fresh.
    pub cache_ttl_secs: u64,
    /// Request timeout applied to every backend call.
    pub request_timeout_secs: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff_ms: 250,
            cache_ttl_secs: 30,
            request_timeout_secs: 10,
        }
    }
}

impl QueryConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = env::var("WATCHDESK_MAX_ATTEMPTS") {
            cfg.max_attempts = v.parse().unwrap_or(cfg.max_attempts);
        }
        if let Ok(v) = env::var("WATCHDESK_RETRY_BACKOFF_MS") {
            cfg.retry_backoff_ms = v.parse().unwrap_or(cfg.retry_backoff_ms);
        }
        if let Ok(v) = env::var("WATCHDESK_CACHE_TTL_SECS") {
            cfg.cache_ttl_secs = v.parse().unwrap_or(cfg.cache_ttl_secs);
        }
        if let Ok(v) = env::var("WATCHDESK_REQUEST_TIMEOUT_SECS") {
            cfg.request_timeout_secs = v.parse().unwrap_or(cfg.request_timeout_secs);
        }
        cfg
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// Process-wide defaults, read once. Components still take settings
// explicitly; this is a convenience for the CLI entry point.
pub static SETTINGS: Lazy<BackendSettings> = Lazy::new(BackendSettings::from_env);
pub static QUERY: Lazy<QueryConfig> = Lazy::new(QueryConfig::from_env);

pub fn settings() -> &'static BackendSettings {
    &SETTINGS
}

pub fn query_config() -> &'static QueryConfig {
    &QUERY
}
