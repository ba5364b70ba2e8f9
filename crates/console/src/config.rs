//! Console configuration (environment with defaults).

use core::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use shopdesk_observability::LogFormat;

pub const DEFAULT_API_URL: &str = "https://dummyjson.com";

pub const ENV_API_URL: &str = "SHOPDESK_API_URL";
pub const ENV_UPDATE_MODE: &str = "SHOPDESK_UPDATE_MODE";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "SHOPDESK_REQUEST_TIMEOUT_SECS";
pub const ENV_LOG_FORMAT: &str = "SHOPDESK_LOG_FORMAT";

/// Whether edits made through `update` are sent to the remote catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateMode {
    /// Replace the entry locally only; nothing is sent.
    #[default]
    LocalOnly,
    /// `PUT` the full record first and replace locally only on success.
    Remote,
}

impl FromStr for UpdateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "local-only" => Ok(Self::LocalOnly),
            "remote" => Ok(Self::Remote),
            other => Err(format!("unknown update mode {other:?} (expected local or remote)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub api_url: String,
    pub update_mode: UpdateMode,
    /// `None` leaves request duration bounded only by the transport.
    pub request_timeout: Option<Duration>,
    pub log_format: LogFormat,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            update_mode: UpdateMode::default(),
            request_timeout: None,
            log_format: LogFormat::default(),
        }
    }
}

impl ConsoleConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config.api_url = url.trim().to_string();
        }

        if let Some(mode) = lookup(ENV_UPDATE_MODE) {
            config.update_mode = mode
                .parse()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("invalid {ENV_UPDATE_MODE}"))?;
        }

        if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("invalid {ENV_REQUEST_TIMEOUT_SECS}: {secs:?}"))?;
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            config.log_format = format
                .parse()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("invalid {ENV_LOG_FORMAT}"))?;
        }

        Ok(config)
    }
}
