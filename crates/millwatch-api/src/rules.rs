// Threshold rule HTTP routes

use axum::{extract::State, routing::post, Json, Router};
use millwatch_core::{Rule, RuleStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::common::IdResponse;
use crate::error::{ApiError, ErrorBody};
use crate::extract::ApiJson;
use crate::services::RuleService;

/// App state for rule routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RuleService>,
}

impl AppState {
    pub fn new(rules: Arc<dyn RuleStore>) -> Self {
        Self {
            service: Arc::new(RuleService::new(rules)),
        }
    }
}

/// Request to create or overwrite a threshold rule
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRuleRequest {
    pub id: Option<String>,
    pub machine_id: Option<String>,
    /// Restrict the rule to one sensor; any sensor reporting the metric when absent.
    pub sensor_id: Option<String>,
    pub metric: Option<String>,
    /// One of range, gt, lt, eq.
    #[schema(example = "range")]
    pub operator: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    /// Required for gt, lt and eq.
    pub threshold_value: Option<f64>,
    /// One of low, medium, high, critical. Defaults to medium.
    pub priority: Option<String>,
    pub message: Option<String>,
    /// Defaults to true.
    pub enabled: Option<bool>,
}

/// Create rule routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/rules", post(create_rule).get(list_rules))
        .with_state(state)
}

/// GET /rules - List enabled rules, newest first
#[utoipa::path(
    get,
    path = "/rules",
    responses(
        (status = 200, description = "Enabled rules", body = Vec<Rule>),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "rules"
)]
pub async fn list_rules(State(state): State<AppState>) -> Result<Json<Vec<Rule>>, ApiError> {
    let rules = state.service.list_enabled().await?;
    Ok(Json(rules))
}

/// POST /rules - Create or overwrite a rule
#[utoipa::path(
    post,
    path = "/rules",
    request_body = CreateRuleRequest,
    responses(
        (status = 200, description = "Rule stored", body = IdResponse),
        (status = 400, description = "Invalid rule", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "rules"
)]
pub async fn create_rule(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateRuleRequest>,
) -> Result<Json<IdResponse>, ApiError> {
    let rule = state.service.create(req).await?;
    Ok(Json(IdResponse { id: rule.id }))
}
