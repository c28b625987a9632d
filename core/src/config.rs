//! Client configuration.
//!
//! `ClientConfig` can be built in code, deserialized with serde from any
//! format, or read from `ADMITAD_*` environment variables. TLS certificates
//! are verified unless `verify_tls` is explicitly turned off.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{BASE_URL, DEFAULT_REQUEST_TIMEOUT, TOKEN_PATH};
use crate::error::ApiError;
use crate::template;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: Option<String>,
    /// Log each resolved request URL at debug level.
    pub debug: bool,
    pub timeout_secs: u64,
    pub verify_tls: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            user_agent: None,
            debug: false,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT,
            verify_tls: true,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `ADMITAD_BASE_URL`, `ADMITAD_USER_AGENT`,
    /// `ADMITAD_DEBUG`, `ADMITAD_TIMEOUT_SECS` and `ADMITAD_VERIFY_TLS`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup("ADMITAD_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(user_agent) = lookup("ADMITAD_USER_AGENT") {
            config.user_agent = Some(user_agent);
        }
        if let Some(debug) = lookup("ADMITAD_DEBUG") {
            config.debug = parse_flag("ADMITAD_DEBUG", &debug)?;
        }
        if let Some(timeout) = lookup("ADMITAD_TIMEOUT_SECS") {
            config.timeout_secs = timeout.trim().parse().map_err(|_| {
                ApiError::Configuration(format!("ADMITAD_TIMEOUT_SECS: invalid number {timeout:?}"))
            })?;
        }
        if let Some(verify) = lookup("ADMITAD_VERIFY_TLS") {
            config.verify_tls = parse_flag("ADMITAD_VERIFY_TLS", &verify)?;
        }
        Ok(config)
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Rounded up to whole seconds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
        self
    }

    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    /// Never shorter than one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn token_url(&self) -> String {
        template::resolve(&self.base_url, TOKEN_PATH)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ApiError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ApiError::Configuration(format!("{key}: invalid flag {value:?}"))),
    }
}
