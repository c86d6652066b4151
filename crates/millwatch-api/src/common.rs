// Common DTOs for the telemetry API
//
// These types are shared across multiple API endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;

/// Returned by create/upsert endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IdResponse {
    /// Id of the stored record, generated when not supplied.
    #[schema(example = "sensor-loyw3v28-a1b2c3")]
    pub id: String,
}

/// Returned by command endpoints without a payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Treat a blank string like an absent one
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Require a non-blank field, naming it in the 400 message
pub fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    non_blank(value).ok_or_else(|| ApiError::bad_request(format!("{field} is required")))
}

/// Parse an optional ISO-8601 timestamp
pub fn parse_timestamp(value: Option<&str>, field: &str) -> Result<Option<DateTime<Utc>>, ApiError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| ApiError::bad_request(format!("invalid {field} '{raw}': {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_required() {
        assert_eq!(required(Some("press-1".into()), "machineId").unwrap(), "press-1");
        let err = required(Some("  ".into()), "machineId").unwrap_err();
        assert_eq!(err.to_string(), "machineId is required");
        assert!(required(None, "metric").is_err());
    }

    #[test]
    fn test_parse_timestamp() {
        let parsed = parse_timestamp(Some("2024-03-01T08:00:00.000Z"), "from").unwrap();
        assert_eq!(parsed, Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()));

        let offset = parse_timestamp(Some("2024-03-01T10:00:00+02:00"), "from").unwrap();
        assert_eq!(offset, parsed);

        assert_eq!(parse_timestamp(None, "from").unwrap(), None);
        assert_eq!(parse_timestamp(Some(""), "from").unwrap(), None);
        assert!(parse_timestamp(Some("yesterday"), "from").is_err());
    }
}
