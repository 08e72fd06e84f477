// Weather Webhook v0.1
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod errors;
mod routes;
mod services;

use config::AppConfig;
use routes::webhook::AppState;

/// Weather Webhook OpenAPI document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weather Webhook",
        version = "0.1.0",
        description = "Dialogflow fulfillment webhook for weather questions. \
            Looks up current conditions or the 5-day forecast on OpenWeatherMap \
            for the requested city and date and answers with a natural-language \
            reply.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health and description"),
        (name = "Webhook", description = "Chat agent fulfillment"),
    ),
    paths(
        routes::health::health_check,
        routes::health::service_info,
        routes::webhook::webhook,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::health::ServiceInfo,
            routes::health::ServiceEndpoints,
            routes::webhook::WebhookRequest,
            routes::webhook::QueryResult,
            routes::webhook::FulfillmentResponse,
        )
    )
)]
struct ApiDoc;

fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any);

    let webhook_routes = Router::new()
        .route("/webhook", post(routes::webhook::webhook))
        .with_state(state);

    let health_routes = Router::new()
        .route("/", get(routes::health::service_info))
        .route("/health", get(routes::health::health_check));

    Router::new()
        .merge(health_routes)
        .merge(webhook_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() {
    // A missing .env file is fine; variables may come from the environment.
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_webhook=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if config.openweather_api_key.is_none() {
        tracing::error!(
            "OPENWEATHER_API_KEY not configured; webhook will answer with a configuration error"
        );
    }

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to create OpenWeatherMap client: {}", e);
            std::process::exit(1);
        }
    };

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Weather webhook server listening on {}", addr);
    tracing::info!("Webhook endpoint: http://localhost:{}/webhook", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server terminated unexpectedly: {}", e);
        std::process::exit(1);
    }
}
