//! OpenWeatherMap 2.5 client.
//!
//! Current conditions (`/weather`) and the 5-day / 3-hour forecast
//! (`/forecast`), both looked up by city name in metric units.
//! See: https://openweathermap.org/current and https://openweathermap.org/forecast5

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::WeatherError;

/// Client for the OpenWeatherMap API.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

/// A single set of weather conditions, either observed or forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub description: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_ms: f64,
    pub pressure_hpa: f64,
    /// Visibility in metres, when reported.
    pub visibility_m: Option<f64>,
}

/// One 3-hour forecast slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSlot {
    /// Slot timestamp as sent by the API, e.g. "2025-11-03 12:00:00" (UTC).
    pub dt_txt: String,
    pub observation: Observation,
}

// --- OpenWeatherMap JSON response types ---

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    weather: Vec<OwWeather>,
    main: OwMain,
    wind: OwWind,
    visibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default)]
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    #[serde(default)]
    weather: Vec<OwWeather>,
    main: OwMain,
    wind: OwWind,
    visibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

fn build_observation(
    weather: Vec<OwWeather>,
    main: OwMain,
    wind: OwWind,
    visibility: Option<f64>,
) -> Observation {
    let description = weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .unwrap_or_else(|| "unknown".to_string());

    Observation {
        description,
        temperature_c: main.temp,
        feels_like_c: main.feels_like,
        humidity_pct: main.humidity,
        wind_speed_ms: wind.speed,
        pressure_hpa: main.pressure,
        visibility_m: visibility,
    }
}

impl From<OwCurrentResponse> for Observation {
    fn from(r: OwCurrentResponse) -> Self {
        build_observation(r.weather, r.main, r.wind, r.visibility)
    }
}

impl From<OwForecastEntry> for ForecastSlot {
    fn from(e: OwForecastEntry) -> Self {
        Self {
            dt_txt: e.dt_txt,
            observation: build_observation(e.weather, e.main, e.wind, e.visibility),
        }
    }
}

impl OpenWeatherClient {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Client(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch current conditions for a city.
    pub async fn fetch_current(&self, city: &str) -> Result<Observation, WeatherError> {
        let response: OwCurrentResponse = self.get_json("weather", city).await?;
        Ok(response.into())
    }

    /// Fetch the 5-day forecast (up to 40 slots, 3 hours apart) for a city.
    pub async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastSlot>, WeatherError> {
        let response: OwForecastResponse = self.get_json("forecast", city).await?;
        Ok(response.list.into_iter().map(ForecastSlot::from).collect())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        city: &str,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::NOT_FOUND => WeatherError::CityNotFound(city.to_string()),
                StatusCode::UNAUTHORIZED => WeatherError::Unauthorized,
                other => WeatherError::Upstream(other),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| WeatherError::Decode(e.to_string()))
    }
}
