// Sensor and binding domain types
//
// A Sensor is registered hardware (motor current clamp, thermocouple, ...).
// A Binding wires one of its metric streams to a machine with a linear
// calibration. The same (sensor, metric) pair may be bound to several
// machines, each with its own scale/offset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Registered sensor. `sensor_type` and `protocol` are free text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub sensor_type: String,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Association of a sensor metric stream to a machine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub id: String,
    pub sensor_id: String,
    pub machine_id: String,
    pub metric: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub offset: f64,
    pub created_at: DateTime<Utc>,
}

pub fn default_scale() -> f64 {
    1.0
}

impl Binding {
    /// Convert a raw sensor value into the unit rules are expressed in.
    pub fn calibrate(&self, raw: f64) -> f64 {
        raw * self.scale + self.offset
    }
}
