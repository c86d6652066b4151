// Database models (internal, may differ from domain types)

use chrono::{DateTime, Utc};
use sqlx::FromRow;

// ============================================
// Sensor registry
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct SensorRow {
    pub id: String,
    pub name: String,
    #[sqlx(rename = "type")]
    pub sensor_type: String,
    pub protocol: String,
    pub address: Option<String>,
    pub metadata: sqlx::types::JsonValue,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UpsertSensor {
    pub id: String,
    pub name: String,
    pub sensor_type: String,
    pub protocol: String,
    pub address: Option<String>,
    pub metadata: serde_json::Value,
}

// ============================================
// Sensor bindings
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct BindingRow {
    pub id: String,
    pub sensor_id: String,
    pub machine_id: String,
    pub metric: String,
    pub unit: Option<String>,
    pub scale: f64,
    pub offset: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UpsertBinding {
    pub id: String,
    pub sensor_id: String,
    pub machine_id: String,
    pub metric: String,
    pub unit: Option<String>,
    pub scale: f64,
    pub offset: f64,
}

// ============================================
// Threshold rules
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct RuleRow {
    pub id: String,
    pub machine_id: String,
    pub sensor_id: Option<String>,
    pub metric: String,
    pub operator: String,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub threshold_value: Option<f64>,
    pub priority: String,
    pub message: Option<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UpsertRule {
    pub id: String,
    pub machine_id: String,
    pub sensor_id: Option<String>,
    pub metric: String,
    pub operator: String,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub threshold_value: Option<f64>,
    pub priority: String,
    pub message: Option<String>,
    pub enabled: bool,
}

// ============================================
// Alerts
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct AlertRow {
    pub id: String,
    pub machine_id: String,
    pub rule_id: String,
    pub sensor_id: String,
    pub metric: String,
    pub value: f64,
    pub status: String,
    pub priority: String,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CreateAlertRow {
    pub id: String,
    pub machine_id: String,
    pub rule_id: String,
    pub sensor_id: String,
    pub metric: String,
    pub value: f64,
    pub priority: String,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================
// Vision events
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct VisionEventRow {
    pub id: String,
    pub camera_id: Option<String>,
    pub machine_id: String,
    pub roi_id: Option<String>,
    pub status: String,
    pub confidence: Option<f64>,
    pub frame_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateVisionEventRow {
    pub id: String,
    pub camera_id: Option<String>,
    pub machine_id: String,
    pub roi_id: Option<String>,
    pub status: String,
    pub confidence: Option<f64>,
    pub frame_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
