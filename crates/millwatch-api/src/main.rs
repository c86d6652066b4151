// Millwatch API server
// Decision: One Postgres-backed store injected into every route module; no per-call configuration lookups
// Decision: Required fields are validated in services before any store call and surface as 400

mod alerts;
mod common;
mod config;
mod error;
mod extract;
mod rules;
mod sensors;
mod services;
mod vision;

use anyhow::{Context, Result};
use axum::http::{header, Method};
use axum::{routing::get, Json, Router};
use millwatch_core::{
    Alert, AlertStatus, Binding, IngestConfig, IngestionPipeline, MachineStatus, Priority, Rule,
    RuleOperator, Sensor, StatusSnapshot, TelemetryStore, UptimeReport, VisionAnalytics,
    VisionEvent,
};
use millwatch_storage::Database;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ServerConfig;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        sensors::list_sensors,
        sensors::create_sensor,
        sensors::bind_sensor,
        sensors::ingest_reading,
        rules::list_rules,
        rules::create_rule,
        alerts::list_alerts,
        alerts::acknowledge_alert,
        vision::get_status,
        vision::get_uptime,
        vision::record_mock_event,
    ),
    components(
        schemas(
            Sensor, Binding, Rule, RuleOperator, Priority,
            Alert, AlertStatus,
            VisionEvent, MachineStatus, StatusSnapshot, UptimeReport,
            sensors::CreateSensorRequest,
            sensors::BindSensorRequest,
            sensors::IngestRequest,
            sensors::IngestResponse,
            rules::CreateRuleRequest,
            vision::MockEventRequest,
            common::IdResponse,
            common::OkResponse,
            error::ErrorBody,
        )
    ),
    tags(
        (name = "sensors", description = "Sensor registry, bindings and reading ingestion"),
        (name = "rules", description = "Threshold rule management"),
        (name = "alerts", description = "Alert listing and acknowledgement"),
        (name = "vision", description = "Vision status and uptime")
    ),
    info(
        title = "Millwatch API",
        version = "0.1.0",
        description = "Factory telemetry: calibrated sensor readings, threshold alerts and vision-based machine uptime",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "millwatch_api=debug,millwatch_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("millwatch-api starting...");

    let config = ServerConfig::from_env()?;

    // Initialize database
    let db = Database::from_url(&config.database_url, config.max_connections)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    if config.run_migrations {
        db.migrate().await.context("Failed to run migrations")?;
        tracing::info!("Migrations applied");
    }

    if let Some(cooldown) = config.ingest.alert_cooldown {
        tracing::info!(cooldown_secs = cooldown.as_secs(), "Alert cool-down enabled");
    }

    if !config.api_prefix.is_empty() {
        tracing::info!(prefix = %config.api_prefix, "API prefix configured");
    }

    if config.cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS origins configured");
    }

    let api_routes = telemetry_routes(
        Arc::new(db),
        config.ingest.clone(),
        config.uptime_window,
    );

    // Health stays unprefixed
    let app = Router::new()
        .route("/health", get(health))
        .merge(build_router_with_prefix(api_routes, &config.api_prefix));

    // Add Swagger UI
    let app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Add CORS layer only if origins are configured
    let app = if !config.cors_origins.is_empty() {
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.cors_origins.clone()))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
                .allow_credentials(true),
        )
    } else {
        app
    };

    // Add tracing
    let app = app.layer(TraceLayer::new_for_http());

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// All telemetry routes over one store
fn telemetry_routes<S: TelemetryStore + 'static>(
    store: Arc<S>,
    ingest: IngestConfig,
    uptime_window: chrono::Duration,
) -> Router {
    let pipeline = IngestionPipeline::new(store.clone(), store.clone(), store.clone(), ingest);
    let analytics = VisionAnalytics::new(store.clone());

    Router::new()
        .merge(sensors::routes(sensors::AppState::new(store.clone(), pipeline)))
        .merge(rules::routes(rules::AppState::new(store.clone())))
        .merge(alerts::routes(alerts::AppState::new(store)))
        .merge(vision::routes(vision::AppState::new(analytics, uptime_window)))
}

/// Build router with optional API prefix (extracted for testing)
fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}
