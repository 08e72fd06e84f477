use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const SERVICE_NAME: &str = "weather-webhook";

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok" while the process is serving requests
    pub status: String,
    /// Server time in RFC 3339 (UTC)
    pub timestamp: String,
    /// Service name
    pub service: String,
    /// Crate version
    pub version: String,
}

/// Endpoint directory returned by `GET /`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceEndpoints {
    pub webhook: String,
    pub health: String,
}

/// Service description.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    pub message: String,
    pub endpoints: ServiceEndpoints,
}

/// Health check endpoint.
///
/// Does not contact OpenWeatherMap.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse),
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses(
        (status = 200, description = "Service description", body = ServiceInfo),
    )
)]
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Weather Webhook Service".to_string(),
        endpoints: ServiceEndpoints {
            webhook: "POST /webhook".to_string(),
            health: "GET /health".to_string(),
        },
    })
}
