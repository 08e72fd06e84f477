//! Dialogflow fulfillment webhook.
//!
//! POST /webhook: answers every request with HTTP 200 and a
//! `fulfillmentText`, including when the lookup fails.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::config::AppConfig;
use crate::errors::WeatherError;
use crate::services::forecast::{parse_target_date, select_slot};
use crate::services::formatter::{compose_current, compose_forecast, date_label};
use crate::services::intent::IntentParameters;
use crate::services::openweather::OpenWeatherClient;

const MSG_UNPARSEABLE_REQUEST: &str = "I couldn't understand your request. Please try again.";
const MSG_NOT_CONFIGURED: &str = "Weather service is not configured. Please contact support.";
const MSG_MISSING_CITY: &str = "Please tell me which city you'd like the weather for. 🌍";
const MSG_INVALID_DATE: &str = "I couldn't understand the date you provided. \
    Please try another date (e.g., 'tomorrow' or '2025-11-03').";
const MSG_AUTH_FAILED: &str = "Weather service authentication failed. Please contact support.";
const MSG_UNREACHABLE: &str =
    "Cannot connect to weather service. Please check your internet connection.";

/// Shared application state for the webhook.
#[derive(Clone)]
pub(crate) struct AppState {
    /// `None` when no API key is configured.
    pub(crate) weather: Option<OpenWeatherClient>,
}

impl AppState {
    pub(crate) fn from_config(config: &AppConfig) -> Result<Self, WeatherError> {
        let weather = match &config.openweather_api_key {
            Some(key) => Some(OpenWeatherClient::new(
                key,
                &config.openweather_base_url,
                config.request_timeout,
            )?),
            None => None,
        };
        Ok(Self { weather })
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Dialogflow webhook request (only the fields this service reads).
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    #[serde(default)]
    pub query_result: Option<QueryResult>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryResult {
    /// Intent parameters: `city` / `geo-city`, `date-time` / `datetime`
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub parameters: Option<Value>,
}

/// Webhook response consumed by the chat agent.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentResponse {
    /// Text the agent speaks or displays to the user
    pub fulfillment_text: String,
}

/// Which upstream lookup a failure came from; the not-found wording differs.
#[derive(Debug, Clone, Copy)]
enum Lookup {
    Current,
    Forecast,
}

/// Weather fulfillment webhook.
///
/// Current conditions when the intent carries no date, otherwise the first
/// forecast slot on the requested day.
#[utoipa::path(
    post,
    path = "/webhook",
    tag = "Webhook",
    request_body = WebhookRequest,
    responses(
        (status = 200, description = "Fulfillment text (also used for failures)", body = FulfillmentResponse),
    )
)]
pub async fn webhook(
    State(state): State<AppState>,
    payload: Result<Json<WebhookRequest>, JsonRejection>,
) -> Json<FulfillmentResponse> {
    let parameters = match &payload {
        Ok(Json(req)) => req
            .query_result
            .as_ref()
            .and_then(|q| q.parameters.as_ref())
            .and_then(Value::as_object),
        Err(rejection) => {
            tracing::warn!("Rejected webhook body: {}", rejection);
            None
        }
    };

    let today = Local::now().date_naive();
    let fulfillment_text = fulfill(&state, parameters, today).await;
    Json(FulfillmentResponse { fulfillment_text })
}

/// Produce the reply for one intent.
pub(crate) async fn fulfill(
    state: &AppState,
    parameters: Option<&Map<String, Value>>,
    today: NaiveDate,
) -> String {
    let Some(parameters) = parameters else {
        return MSG_UNPARSEABLE_REQUEST.to_string();
    };
    let intent = IntentParameters::from_parameters(parameters);

    let Some(client) = &state.weather else {
        tracing::error!("OPENWEATHER_API_KEY not configured");
        return MSG_NOT_CONFIGURED.to_string();
    };

    let Some(city) = intent.city.as_deref() else {
        return MSG_MISSING_CITY.to_string();
    };

    match intent.date.as_deref() {
        Some(date) => forecast_reply(client, city, date, today).await,
        None => current_reply(client, city).await,
    }
}

async fn current_reply(client: &OpenWeatherClient, city: &str) -> String {
    match client.fetch_current(city).await {
        Ok(obs) => {
            tracing::debug!("Current weather for '{}': {}", city, obs.description);
            compose_current(city, &obs)
        }
        Err(e) => failure_message(&e, city, Lookup::Current),
    }
}

async fn forecast_reply(
    client: &OpenWeatherClient,
    city: &str,
    raw_date: &str,
    today: NaiveDate,
) -> String {
    let slots = match client.fetch_forecast(city).await {
        Ok(slots) => slots,
        Err(e) => return failure_message(&e, city, Lookup::Forecast),
    };

    let target = match parse_target_date(raw_date, today) {
        Ok(d) => d,
        Err(e) => {
            tracing::debug!("{}", e);
            return MSG_INVALID_DATE.to_string();
        }
    };

    match select_slot(&slots, target) {
        Some(slot) => {
            tracing::debug!(
                "Forecast for '{}' on {}: slot {} of {}",
                city,
                target,
                slot.dt_txt,
                slots.len()
            );
            compose_forecast(city, &date_label(target, today), &slot.observation)
        }
        None => format!(
            "I don't have forecast data for {} on that date. \
             I can only provide forecasts up to 5 days ahead.",
            city
        ),
    }
}

fn failure_message(err: &WeatherError, city: &str, lookup: Lookup) -> String {
    match err {
        WeatherError::CityNotFound(_) => {
            tracing::debug!("OpenWeatherMap has no city '{}'", city);
            match lookup {
                Lookup::Current => format!(
                    "I couldn't find \"{}\". Please check the spelling or try a different city name.",
                    city
                ),
                Lookup::Forecast => format!(
                    "I couldn't find weather data for \"{}\". Please check the city name and try again.",
                    city
                ),
            }
        }
        WeatherError::Unauthorized => {
            tracing::error!("Invalid OpenWeatherMap API key");
            MSG_AUTH_FAILED.to_string()
        }
        WeatherError::Unreachable(detail) => {
            tracing::error!("Error fetching weather for '{}': {}", city, detail);
            MSG_UNREACHABLE.to_string()
        }
        other => {
            tracing::error!("Error fetching weather for '{}': {}", city, other);
            format!(
                "Sorry, I encountered an error while fetching weather for {}. Please try again later.",
                city
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::openweather::tests::{current_body, forecast_entry};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
    }

    fn state_for(server: &MockServer) -> AppState {
        AppState {
            weather: Some(
                OpenWeatherClient::new("test-key", &server.uri(), Duration::from_secs(5)).unwrap(),
            ),
        }
    }

    fn forecast_body() -> Value {
        json!({
            "list": [
                forecast_entry("2025-11-03 12:00:00", 9.4, "overcast clouds"),
                forecast_entry("2025-11-04 00:00:00", 3.2, "clear sky"),
                forecast_entry("2025-11-04 03:00:00", 1.0, "clear sky"),
                forecast_entry("2025-11-07 12:00:00", 27.0, "few clouds"),
            ]
        })
    }

    async fn run(state: &AppState, params: Value) -> String {
        fulfill(state, params.as_object(), today()).await
    }

    #[tokio::test]
    async fn test_missing_parameters() {
        let server = MockServer::start().await;
        let state = state_for(&server);
        assert_eq!(fulfill(&state, None, today()).await, MSG_UNPARSEABLE_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_city_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .expect(0)
            .mount(&server)
            .await;

        let reply = run(&state_for(&server), json!({ "date-time": "2025-11-04" })).await;
        assert_eq!(reply, MSG_MISSING_CITY);
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let state = AppState { weather: None };
        let reply = run(&state, json!({ "city": "Zurich" })).await;
        assert_eq!(reply, MSG_NOT_CONFIGURED);
    }

    #[tokio::test]
    async fn test_current_weather() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Zurich"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .expect(0)
            .mount(&server)
            .await;

        let reply = run(&state_for(&server), json!({ "city": "Zurich" })).await;
        assert!(reply.starts_with("🌧️ Current weather in Zurich:\n\n"));
        assert!(reply.contains("Temperature: 12°C\n"));
        assert!(reply.contains("Visibility: 8.0 km"));
        assert!(reply.ends_with("Don't forget your umbrella! ☔"));
    }

    #[tokio::test]
    async fn test_forecast_tomorrow() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("q", "Davos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .expect(1)
            .mount(&server)
            .await;

        let reply = run(
            &state_for(&server),
            json!({ "geo-city": "Davos", "date-time": ["2025-11-04T10:00:00+01:00"] }),
        )
        .await;
        assert_eq!(
            reply,
            "☀️ Forecast for Davos tomorrow:\n\n\
             Weather: clear sky\n\
             Temperature: 3°C\n\
             Humidity: 60%\n\
             Wind: 2.5 m/s (light breeze)\n\n\
             Bundle up warm - it's quite cold! 🧥"
        );
    }

    #[tokio::test]
    async fn test_forecast_weekday_label() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&server)
            .await;

        let reply = run(
            &state_for(&server),
            json!({ "city": "Lugano", "datetime": "{\"date_time\":\"2025-11-07T12:00:00\"}" }),
        )
        .await;
        assert!(reply.starts_with("☁️ Forecast for Lugano Friday, Nov 7:"));
        assert!(reply.ends_with("Light clothing recommended. 👕"));
    }

    #[tokio::test]
    async fn test_forecast_outside_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&server)
            .await;

        let reply = run(
            &state_for(&server),
            json!({ "city": "Bern", "date-time": "2025-11-09" }),
        )
        .await;
        assert_eq!(
            reply,
            "I don't have forecast data for Bern on that date. \
             I can only provide forecasts up to 5 days ahead."
        );
    }

    #[tokio::test]
    async fn test_forecast_invalid_date() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&server)
            .await;

        let reply = run(
            &state_for(&server),
            json!({ "city": "Bern", "date-time": "sometime next week" }),
        )
        .await;
        assert_eq!(reply, MSG_INVALID_DATE);
    }

    #[tokio::test]
    async fn test_current_city_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let reply = run(&state_for(&server), json!({ "city": "Atlantis" })).await;
        assert_eq!(
            reply,
            "I couldn't find \"Atlantis\". Please check the spelling or try a different city name."
        );
    }

    #[tokio::test]
    async fn test_forecast_city_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let reply = run(
            &state_for(&server),
            json!({ "city": "Atlantis", "date-time": "2025-11-04" }),
        )
        .await;
        assert!(reply.starts_with("I couldn't find weather data for \"Atlantis\"."));
    }

    #[tokio::test]
    async fn test_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let reply = run(&state_for(&server), json!({ "city": "Zurich" })).await;
        assert_eq!(reply, MSG_AUTH_FAILED);
    }

    #[tokio::test]
    async fn test_generic_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let reply = run(&state_for(&server), json!({ "city": "Zurich" })).await;
        assert_eq!(
            reply,
            "Sorry, I encountered an error while fetching weather for Zurich. Please try again later."
        );
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        let state = AppState {
            weather: Some(
                OpenWeatherClient::new("test-key", "http://127.0.0.1:1", Duration::from_secs(2))
                    .unwrap(),
            ),
        };
        let reply = run(&state, json!({ "city": "Zurich" })).await;
        assert_eq!(reply, MSG_UNREACHABLE);
    }
}
