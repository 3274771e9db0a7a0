//! Connection settings for [`HttpTransport`](crate::HttpTransport).
//!
//! Values come from [`ApiConfig::default`], then from the environment
//! ([`ApiConfig::from_env`]), and finally from command line flags.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

/// Base URL every resource-relative URL is resolved against.
pub const DEFAULT_API_BASE: &str = "https://api.aweber.com/1.0";

pub const API_BASE_ENV: &str = "REMOTE_COLLECTION_API_BASE";
pub const TIMEOUT_ENV: &str = "REMOTE_COLLECTION_TIMEOUT_SECS";
pub const MAX_RETRY_ENV: &str = "REMOTE_COLLECTION_MAX_RETRY";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRY: u32 = 3;
const USER_AGENT: &str = concat!("remote-collection/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub api_base: String,
    pub timeout: Duration,
    /// Attempts made for connect and timeout failures before giving up
    pub max_retry: u32,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retry: DEFAULT_MAX_RETRY,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl ApiConfig {
    /// Defaults overridden by any `REMOTE_COLLECTION_*` variables that are set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base) = lookup(API_BASE_ENV) {
            config.api_base = base;
        }
        if let Some(secs) = lookup(TIMEOUT_ENV) {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("{TIMEOUT_ENV} must be a number of seconds"))?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(retry) = lookup(MAX_RETRY_ENV) {
            config.max_retry = retry
                .parse()
                .with_context(|| format!("{MAX_RETRY_ENV} must be a non-negative integer"))?;
        }

        config.api_base = config.api_base.trim_end_matches('/').to_string();
        Ok(config)
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }
}
