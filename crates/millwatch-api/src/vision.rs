// Vision status, uptime and mock event HTTP routes

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use millwatch_core::{StatusSnapshot, UptimeReport, VisionAnalytics, VisionEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ErrorBody};
use crate::extract::{ApiJson, ApiQuery};
use crate::services::VisionService;

/// App state for vision routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<VisionService>,
}

impl AppState {
    pub fn new(analytics: VisionAnalytics, default_window: chrono::Duration) -> Self {
        Self {
            service: Arc::new(VisionService::new(analytics, default_window)),
        }
    }
}

/// Scope selector; roiId wins over machineId, which wins over cameraId
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ScopeQuery {
    pub roi_id: Option<String>,
    pub machine_id: Option<String>,
    pub camera_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UptimeQuery {
    pub roi_id: Option<String>,
    pub machine_id: Option<String>,
    pub camera_id: Option<String>,
    /// ISO-8601; defaults to `to` minus the configured window.
    pub from: Option<String>,
    /// ISO-8601; defaults to now.
    pub to: Option<String>,
}

/// A vision observation pushed manually or by a test harness
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MockEventRequest {
    pub id: Option<String>,
    pub machine_id: Option<String>,
    pub camera_id: Option<String>,
    pub roi_id: Option<String>,
    /// Anything other than "active" is recorded as inactive.
    #[schema(example = "active")]
    pub status: Option<String>,
    pub confidence: Option<f64>,
    /// ISO-8601 event time; defaults to now.
    pub created_at: Option<String>,
    /// ISO-8601; defaults to the event time.
    pub frame_time: Option<String>,
}

/// Create vision routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/vision/status", get(get_status))
        .route("/vision/uptime", get(get_uptime))
        .route("/vision/mock-event", post(record_mock_event))
        .with_state(state)
}

/// GET /vision/status - Latest observed status for a scope
#[utoipa::path(
    get,
    path = "/vision/status",
    params(ScopeQuery),
    responses(
        (status = 200, description = "Latest status, inactive when nothing was observed", body = StatusSnapshot),
        (status = 400, description = "No scope supplied", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "vision"
)]
pub async fn get_status(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ScopeQuery>,
) -> Result<Json<StatusSnapshot>, ApiError> {
    let snapshot = state.service.status(query).await?;
    Ok(Json(snapshot))
}

/// GET /vision/uptime - Active time over a window
#[utoipa::path(
    get,
    path = "/vision/uptime",
    params(UptimeQuery),
    responses(
        (status = 200, description = "Uptime report", body = UptimeReport),
        (status = 400, description = "No scope supplied or invalid window", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "vision"
)]
pub async fn get_uptime(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UptimeQuery>,
) -> Result<Json<UptimeReport>, ApiError> {
    let report = state.service.uptime(query).await?;
    Ok(Json(report))
}

/// POST /vision/mock-event - Record a vision observation
#[utoipa::path(
    post,
    path = "/vision/mock-event",
    request_body = MockEventRequest,
    responses(
        (status = 200, description = "Recorded event", body = VisionEvent),
        (status = 400, description = "Missing machineId or invalid timestamp", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "vision"
)]
pub async fn record_mock_event(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<MockEventRequest>,
) -> Result<Json<VisionEvent>, ApiError> {
    let event = state.service.record(req).await?;
    Ok(Json(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use millwatch_core::memory::InMemoryTelemetryStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let store = Arc::new(InMemoryTelemetryStore::new());
        routes(AppState::new(
            VisionAnalytics::new(store),
            chrono::Duration::hours(24),
        ))
    }

    async fn send(app: &Router, request: Request<Body>) -> (u16, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status().as_u16();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_event(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/vision/mock-event")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_status_requires_scope() {
        let app = test_app();
        let (status, body) = send(&app, get("/vision/status")).await;
        assert_eq!(status, 400);
        assert!(body["error"].as_str().unwrap().contains("machineId"));

        let (status, _) = send(&app, get("/vision/uptime?machineId=")).await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn test_status_unknown_scope_defaults_inactive() {
        let app = test_app();
        let (status, body) = send(&app, get("/vision/status?cameraId=cam-9")).await;
        assert_eq!(status, 200);
        assert_eq!(body["scope"], "camera");
        assert_eq!(body["id"], "cam-9");
        assert_eq!(body["status"], "inactive");
        assert_eq!(body["confidence"], 0.0);
        assert!(body["updatedAt"].is_null());
    }

    #[tokio::test]
    async fn test_mock_event_then_status() {
        let app = test_app();
        let (status, event) = send(
            &app,
            post_event(json!({
                "machineId": "press-1",
                "cameraId": "cam-1",
                "roiId": "roi-a",
                "status": "active",
                "confidence": 0.91,
                "createdAt": "2024-03-01T08:00:00Z"
            })),
        )
        .await;
        assert_eq!(status, 200);
        assert!(event["id"].as_str().unwrap().starts_with("vision-"));
        assert_eq!(event["frameTime"], event["createdAt"]);

        // roi wins over machine and camera
        let (_, body) = send(
            &app,
            get("/vision/status?machineId=press-2&cameraId=cam-2&roiId=roi-a"),
        )
        .await;
        assert_eq!(body["scope"], "roi");
        assert_eq!(body["status"], "active");
        assert_eq!(body["confidence"], 0.91);

        let (_, body) = send(&app, get("/vision/status?machineId=press-1")).await;
        assert_eq!(body["scope"], "machine");
        assert_eq!(body["status"], "active");
    }

    #[tokio::test]
    async fn test_mock_event_status_defaults_inactive() {
        let app = test_app();
        let (status, event) = send(
            &app,
            post_event(json!({"machineId": "press-1", "status": "ACTIVE"})),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(event["status"], "inactive");

        let (status, body) = send(&app, post_event(json!({"status": "active"}))).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "machineId is required");
    }

    #[tokio::test]
    async fn test_uptime_window() {
        let app = test_app();
        for (at, status) in [
            ("2024-03-01T07:50:00Z", "inactive"),
            ("2024-03-01T08:30:00Z", "active"),
        ] {
            let (code, _) = send(
                &app,
                post_event(json!({"machineId": "press-1", "status": status, "createdAt": at})),
            )
            .await;
            assert_eq!(code, 200);
        }

        let (status, body) = send(
            &app,
            get("/vision/uptime?machineId=press-1&from=2024-03-01T08:00:00Z&to=2024-03-01T09:00:00Z"),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["scope"], "machine");
        assert_eq!(body["activeMs"], 1_800_000);
        assert_eq!(body["totalMs"], 3_600_000);
        assert_eq!(body["percentActive"], 50.0);
    }

    #[tokio::test]
    async fn test_uptime_defaults_to_last_day() {
        let app = test_app();
        let (status, body) = send(&app, get("/vision/uptime?cameraId=cam-1")).await;
        assert_eq!(status, 200);
        assert_eq!(body["totalMs"], 86_400_000);
        assert_eq!(body["percentActive"], 0.0);
    }

    #[tokio::test]
    async fn test_uptime_default_window_out_of_range() {
        let app = routes(AppState::new(
            VisionAnalytics::new(Arc::new(InMemoryTelemetryStore::new())),
            chrono::Duration::MAX,
        ));
        let (status, body) = send(&app, get("/vision/uptime?machineId=m1")).await;
        assert_eq!(status, 400);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_uptime_bad_window() {
        let app = test_app();
        let (status, _) = send(&app, get("/vision/uptime?machineId=m1&from=last-week")).await;
        assert_eq!(status, 400);

        let (status, _) = send(
            &app,
            get("/vision/uptime?machineId=m1&from=2024-03-02T00:00:00Z&to=2024-03-01T00:00:00Z"),
        )
        .await;
        assert_eq!(status, 400);
    }
}
