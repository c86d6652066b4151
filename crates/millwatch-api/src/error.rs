// HTTP error mapping

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use millwatch_core::TelemetryError;
use serde::Serialize;
use utoipa::ToSchema;

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Handler error, rendered as `{ "error": <message> }`
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

// Store failures pass the raw database message through; this is an internal tool.
impl From<TelemetryError> for ApiError {
    fn from(err: TelemetryError) -> Self {
        match err {
            TelemetryError::Validation(msg) => ApiError::BadRequest(msg),
            TelemetryError::NotFound(msg) => ApiError::NotFound(msg),
            TelemetryError::Store(msg) => {
                tracing::error!("Store error: {}", msg);
                ApiError::Internal(msg)
            }
            TelemetryError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                ApiError::Internal(e.to_string())
            }
        }
    }
}

// Malformed body, wrong field type or missing content type
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::bad_request("machineId is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "machineId is required");
    }

    #[test]
    fn test_telemetry_error_mapping() {
        let err: ApiError = TelemetryError::validation("bad").into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = TelemetryError::not_found("alert x").into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err: ApiError = TelemetryError::store("relation \"alerts\" does not exist").into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "relation \"alerts\" does not exist");
    }
}
