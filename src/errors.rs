use reqwest::StatusCode;

/// Failure while talking to OpenWeatherMap.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("OpenWeatherMap rejected the API key")]
    Unauthorized,

    #[error("OpenWeatherMap returned HTTP {0}")]
    Upstream(StatusCode),

    #[error("OpenWeatherMap unreachable: {0}")]
    Unreachable(String),

    #[error("OpenWeatherMap request timed out")]
    Timeout,

    #[error("OpenWeatherMap response structure error: {0}")]
    Decode(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WeatherError::Timeout
        } else if err.is_connect() {
            WeatherError::Unreachable(err.to_string())
        } else if err.is_decode() {
            WeatherError::Decode(err.to_string())
        } else {
            WeatherError::Client(err.to_string())
        }
    }
}

/// Startup configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} has an invalid value: {1:?}")]
    Invalid(&'static str, String),
}

/// The requested forecast date could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid date: {0:?}")]
pub struct InvalidDate(pub String);
