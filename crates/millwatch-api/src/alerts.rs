// Alert listing and acknowledgement HTTP routes

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use millwatch_core::{Alert, AlertStore};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::common::OkResponse;
use crate::error::{ApiError, ErrorBody};
use crate::extract::ApiQuery;
use crate::services::AlertService;

/// App state for alert routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AlertService>,
}

impl AppState {
    pub fn new(alerts: Arc<dyn AlertStore>) -> Self {
        Self {
            service: Arc::new(AlertService::new(alerts)),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListAlertsQuery {
    /// active or acknowledged
    pub status: Option<String>,
}

/// Create alert routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/alerts", get(list_alerts))
        .route("/alerts/:id/ack", post(acknowledge_alert))
        .with_state(state)
}

/// GET /alerts - List alerts, newest first
#[utoipa::path(
    get,
    path = "/alerts",
    params(ListAlertsQuery),
    responses(
        (status = 200, description = "Alerts, newest first", body = Vec<Alert>),
        (status = 400, description = "Unknown status filter", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "alerts"
)]
pub async fn list_alerts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListAlertsQuery>,
) -> Result<Json<Vec<Alert>>, ApiError> {
    let alerts = state.service.list(query.status.as_deref()).await?;
    Ok(Json(alerts))
}

/// POST /alerts/{id}/ack - Acknowledge an alert
#[utoipa::path(
    post,
    path = "/alerts/{id}/ack",
    params(
        ("id" = String, Path, description = "Alert ID")
    ),
    responses(
        (status = 200, description = "Alert acknowledged", body = OkResponse),
        (status = 404, description = "Alert not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "alerts"
)]
pub async fn acknowledge_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiError> {
    state.service.acknowledge(&id).await?;
    Ok(Json(OkResponse::ok()))
}
