//! Environment-driven configuration.

use crate::ai::gemini::client::DEFAULT_BASE_URL;
use crate::relay::RelayMode;
use crate::weather;
use crate::{Error, Result};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone)]
pub struct Config {
    /// Credential passed with each live request. Optional because degraded
    /// mode never uses it.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub mode: RelayMode,
    pub http_timeout: Option<Duration>,
    /// OpenWeatherMap key. Without one the CLI falls back to demo data.
    pub weather_api_key: Option<String>,
    pub weather_base_url: String,
}

impl Config {
    /// Load `.env` if present, then read the process environment. A missing
    /// `.env` is fine; a malformed one is an error.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e.into());
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mode = match get("RELAY_MODE") {
            Some(raw) => raw.parse()?,
            None => RelayMode::Degraded,
        };

        let http_timeout = match get("RELAY_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::Config(format!(
                        "RELAY_HTTP_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                        raw
                    ))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            api_key: get("GEMINI_API_KEY"),
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            mode,
            http_timeout,
            weather_api_key: get("OPENWEATHER_API_KEY"),
            weather_base_url: get("OPENWEATHER_BASE_URL")
                .unwrap_or_else(|| weather::DEFAULT_BASE_URL.to_string()),
        })
    }

    /// The credential to send with requests.
    ///
    /// Live mode needs a key; degraded mode gets an empty string since the
    /// relay ignores it.
    pub fn credential(&self) -> Result<String> {
        match (&self.api_key, self.mode) {
            (Some(key), _) => Ok(key.clone()),
            (None, RelayMode::Degraded) => Ok(String::new()),
            (None, RelayMode::Live) => Err(Error::Config(
                "GEMINI_API_KEY not set (required in live mode)".to_string(),
            )),
        }
    }
}
