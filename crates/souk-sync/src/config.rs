//! # Remote Backend Configuration
//!
//! Where the hosted data service lives and the key it expects.
//!
//! ## Environment Variables
//! ```text
//! SOUK_BACKEND_URL            required   e.g. https://xyz.example.co
//! SOUK_BACKEND_KEY            required   public (anon) API key
//! SOUK_BACKEND_TIMEOUT_SECS   optional   request timeout, default 30
//! ```
//!
//! Both required variables are checked up front so a misconfigured build
//! fails at startup, not on the first request.

use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{SyncError, SyncResult};

pub const ENV_BACKEND_URL: &str = "SOUK_BACKEND_URL";
pub const ENV_BACKEND_KEY: &str = "SOUK_BACKEND_KEY";
pub const ENV_BACKEND_TIMEOUT: &str = "SOUK_BACKEND_TIMEOUT_SECS";

/// Default request timeout (seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Service root. Always ends with `/` so relative paths join under it.
    pub base_url: Url,

    /// Sent as the `apikey` header and as the bearer token when signed out.
    pub api_key: String,

    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> SyncResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SyncError::MissingConfig(ENV_BACKEND_KEY));
        }

        Ok(RemoteConfig {
            base_url: normalize_base_url(base_url)?,
            api_key,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads the `SOUK_BACKEND_*` environment variables.
    pub fn from_env() -> SyncResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a caller-supplied lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SyncResult<Self> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(SyncError::MissingConfig(key))
        };

        let url = required(ENV_BACKEND_URL)?;
        let key = required(ENV_BACKEND_KEY)?;

        let mut config = Self::new(&url, key)?;

        if let Some(secs) = lookup(ENV_BACKEND_TIMEOUT) {
            let secs: u64 = secs.parse().map_err(|_| {
                SyncError::InvalidConfig(format!("{} must be a whole number of seconds", ENV_BACKEND_TIMEOUT))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        debug!(url = %config.base_url, timeout = ?config.timeout, "Remote backend configured");
        Ok(config)
    }

    /// `base_url` joined with `path` (no leading slash).
    pub fn endpoint(&self, path: &str) -> SyncResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

fn normalize_base_url(raw: &str) -> SyncResult<Url> {
    let mut url = Url::parse(raw.trim())?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(SyncError::InvalidConfig(format!(
            "{} must start with http:// or https://, got: {}",
            ENV_BACKEND_URL, raw
        )));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
