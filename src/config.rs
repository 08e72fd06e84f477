use std::time::Duration;

use crate::errors::ConfigError;

const DEFAULT_OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// OpenWeatherMap API key. `None` when unset or blank.
    pub openweather_api_key: Option<String>,
    /// Base URL of the OpenWeatherMap 2.5 API (no trailing slash).
    pub openweather_base_url: String,
    /// Timeout applied to every outbound OpenWeatherMap request.
    pub request_timeout: Duration,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openweather_api_key = lookup("OPENWEATHER_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let openweather_base_url = lookup("OPENWEATHER_BASE_URL")
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_OPENWEATHER_BASE_URL.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", raw))?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match lookup("OPENWEATHER_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().ok().filter(|s| *s > 0);
                secs.ok_or(ConfigError::Invalid("OPENWEATHER_TIMEOUT_SECS", raw))?
            }
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            openweather_api_key,
            openweather_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            port,
        })
    }
}
