// Sensor registry, binding and ingestion HTTP routes

use axum::{extract::State, routing::post, Json, Router};
use millwatch_core::{Binding, IngestionPipeline, Sensor, TelemetryStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::common::IdResponse;
use crate::error::{ApiError, ErrorBody};
use crate::extract::ApiJson;
use crate::services::SensorService;

/// App state for sensor routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SensorService>,
}

impl AppState {
    pub fn new<S: TelemetryStore + 'static>(store: Arc<S>, pipeline: IngestionPipeline) -> Self {
        Self {
            service: Arc::new(SensorService::new(store.clone(), store, pipeline)),
        }
    }
}

/// Request to register or overwrite a sensor
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSensorRequest {
    /// Generated as "sensor-..." when absent.
    pub id: Option<String>,
    #[schema(example = "Spindle current clamp")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    #[schema(example = "current")]
    pub sensor_type: Option<String>,
    #[schema(example = "MQTT")]
    pub protocol: Option<String>,
    pub address: Option<String>,
    #[schema(value_type = Object)]
    pub metadata: Option<serde_json::Value>,
}

/// Request to bind a sensor metric to a machine
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BindSensorRequest {
    pub id: Option<String>,
    pub sensor_id: Option<String>,
    pub machine_id: Option<String>,
    #[schema(example = "current")]
    pub metric: Option<String>,
    pub unit: Option<String>,
    /// Defaults to 1.
    pub scale: Option<f64>,
    /// Defaults to 0.
    pub offset: Option<f64>,
}

/// A raw reading pushed by a gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest {
    pub sensor_id: Option<String>,
    pub metric: Option<String>,
    pub value: Option<f64>,
    /// ISO-8601; alerts are stamped with ingestion time when absent.
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub ok: bool,
    pub alerts_created: usize,
}

/// Create sensor routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/sensors", post(create_sensor).get(list_sensors))
        .route("/sensors/bind", post(bind_sensor))
        .route("/sensors/ingest", post(ingest_reading))
        .with_state(state)
}

/// GET /sensors - List all sensors, newest first
#[utoipa::path(
    get,
    path = "/sensors",
    responses(
        (status = 200, description = "List of sensors", body = Vec<Sensor>),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "sensors"
)]
pub async fn list_sensors(State(state): State<AppState>) -> Result<Json<Vec<Sensor>>, ApiError> {
    let sensors = state.service.list().await?;
    Ok(Json(sensors))
}

/// POST /sensors - Register or overwrite a sensor
#[utoipa::path(
    post,
    path = "/sensors",
    request_body = CreateSensorRequest,
    responses(
        (status = 200, description = "Sensor stored", body = IdResponse),
        (status = 400, description = "Missing name, type or protocol", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "sensors"
)]
pub async fn create_sensor(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateSensorRequest>,
) -> Result<Json<IdResponse>, ApiError> {
    let sensor = state.service.create(req).await?;
    Ok(Json(IdResponse { id: sensor.id }))
}

/// POST /sensors/bind - Bind a sensor metric to a machine with calibration
#[utoipa::path(
    post,
    path = "/sensors/bind",
    request_body = BindSensorRequest,
    responses(
        (status = 200, description = "Binding stored", body = IdResponse),
        (status = 400, description = "Missing sensorId, machineId or metric", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "sensors"
)]
pub async fn bind_sensor(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BindSensorRequest>,
) -> Result<Json<IdResponse>, ApiError> {
    let binding: Binding = state.service.bind(req).await?;
    Ok(Json(IdResponse { id: binding.id }))
}

/// POST /sensors/ingest - Calibrate a reading and raise alerts for violated rules
#[utoipa::path(
    post,
    path = "/sensors/ingest",
    request_body = IngestRequest,
    responses(
        (status = 200, description = "Reading processed", body = IngestResponse),
        (status = 400, description = "Missing sensorId, metric or value", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "sensors"
)]
pub async fn ingest_reading(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
    let outcome = state.service.ingest(req).await?;
    Ok(Json(IngestResponse {
        ok: true,
        alerts_created: outcome.alerts_created,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use millwatch_core::{
        memory::InMemoryTelemetryStore, IngestConfig, Priority, Rule, RuleOperator, RuleStore,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app(store: Arc<InMemoryTelemetryStore>) -> Router {
        let pipeline =
            IngestionPipeline::new(store.clone(), store.clone(), store.clone(), IngestConfig::new());
        routes(AppState::new(store, pipeline))
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (u16, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status().as_u16();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_create_and_list_sensors() {
        let store = Arc::new(InMemoryTelemetryStore::new());
        let app = test_app(store);

        let (status, body) = post_json(
            &app,
            "/sensors",
            json!({"name": "Clamp", "type": "current", "protocol": "MQTT"}),
        )
        .await;
        assert_eq!(status, 200);
        let id = body["id"].as_str().unwrap().to_string();
        assert!(id.starts_with("sensor-"));

        let response = app
            .oneshot(Request::builder().uri("/sensors").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let sensors: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(sensors[0]["id"], id);
        assert_eq!(sensors[0]["type"], "current");
        assert_eq!(sensors[0]["metadata"], json!({}));
    }

    #[tokio::test]
    async fn test_create_sensor_missing_protocol() {
        let app = test_app(Arc::new(InMemoryTelemetryStore::new()));
        let (status, body) =
            post_json(&app, "/sensors", json!({"name": "Clamp", "type": "current"})).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "protocol is required");
    }

    #[tokio::test]
    async fn test_bind_requires_machine() {
        let app = test_app(Arc::new(InMemoryTelemetryStore::new()));
        let (status, body) =
            post_json(&app, "/sensors/bind", json!({"sensorId": "s1", "metric": "temp"})).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "machineId is required");
    }

    #[tokio::test]
    async fn test_ingest_unbound_reading() {
        let app = test_app(Arc::new(InMemoryTelemetryStore::new()));
        let (status, body) = post_json(
            &app,
            "/sensors/ingest",
            json!({"sensorId": "s1", "metric": "temp", "value": 999.0}),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body, json!({"ok": true, "alertsCreated": 0}));
    }

    #[tokio::test]
    async fn test_ingest_bound_reading_creates_alert() {
        let store = Arc::new(InMemoryTelemetryStore::new());
        let app = test_app(store.clone());

        let (status, _) = post_json(
            &app,
            "/sensors/bind",
            json!({"sensorId": "s1", "machineId": "m1", "metric": "temp", "scale": 2, "offset": 1}),
        )
        .await;
        assert_eq!(status, 200);

        store
            .upsert_rule(Rule {
                id: "r1".into(),
                machine_id: "m1".into(),
                sensor_id: None,
                metric: "temp".into(),
                operator: RuleOperator::Gt,
                min_value: None,
                max_value: None,
                threshold_value: Some(10.0),
                priority: Priority::High,
                message: Some("Too hot".into()),
                enabled: true,
                created_at: chrono::Utc::now(),
            })
            .await
            .unwrap();

        let (status, body) = post_json(
            &app,
            "/sensors/ingest",
            json!({"sensorId": "s1", "metric": "temp", "value": 5.0}),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["alertsCreated"], 1);

        let alerts = store.alerts().await;
        assert_eq!(alerts[0].value, 11.0);
        assert_eq!(alerts[0].priority, Priority::High);
    }

    #[tokio::test]
    async fn test_ingest_validation() {
        let app = test_app(Arc::new(InMemoryTelemetryStore::new()));

        let (status, body) =
            post_json(&app, "/sensors/ingest", json!({"sensorId": "s1", "metric": "temp"})).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "value is required");

        let (status, _) = post_json(
            &app,
            "/sensors/ingest",
            json!({"sensorId": "s1", "metric": "temp", "value": 1.0, "timestamp": "noon"}),
        )
        .await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn test_ingest_rejected_body_renders_error() {
        let app = test_app(Arc::new(InMemoryTelemetryStore::new()));

        // Wrong type for value
        let (status, body) = post_json(
            &app,
            "/sensors/ingest",
            json!({"sensorId": "s1", "metric": "temp", "value": "abc"}),
        )
        .await;
        assert_eq!(status, 400);
        assert!(body["error"].as_str().unwrap().contains("value"));

        let send_raw = |request: Request<Body>| {
            let app = app.clone();
            async move {
                let response = app.oneshot(request).await.unwrap();
                let status = response.status().as_u16();
                let body = response.into_body().collect().await.unwrap().to_bytes();
                (status, serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null))
            }
        };

        let (status, body) = send_raw(
            Request::builder()
                .method("POST")
                .uri("/sensors/ingest")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
        assert_eq!(status, 400);
        assert!(body["error"].is_string());

        // Missing content type
        let (status, body) = send_raw(
            Request::builder()
                .method("POST")
                .uri("/sensors/ingest")
                .body(Body::from(r#"{"sensorId":"s1","metric":"temp","value":1.0}"#))
                .unwrap(),
        )
        .await;
        assert_eq!(status, 400);
        assert!(body["error"].is_string());
    }
}
