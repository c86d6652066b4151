// Alert domain types
//
// Alerts are materialized rule violations. Lifecycle is active -> acknowledged,
// driven only by an operator. `resolved_at` exists for schema parity and is
// never set here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::rule::{Priority, Rule};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Alert status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Acknowledged,
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertStatus::Active => write!(f, "active"),
            AlertStatus::Acknowledged => write!(f, "acknowledged"),
        }
    }
}

impl FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AlertStatus::Active),
            "acknowledged" => Ok(AlertStatus::Acknowledged),
            _ => Err(format!("unknown alert status: {s}")),
        }
    }
}

/// Persisted alert
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub machine_id: String,
    pub rule_id: String,
    pub sensor_id: String,
    pub metric: String,
    /// Calibrated value that triggered the rule
    pub value: f64,
    pub status: AlertStatus,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Alert {
    /// Build a fresh active alert for a violated rule.
    pub fn from_violation(
        id: String,
        rule: &Rule,
        machine_id: &str,
        sensor_id: &str,
        value: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            machine_id: machine_id.to_string(),
            rule_id: rule.id.clone(),
            sensor_id: sensor_id.to_string(),
            metric: rule.metric.clone(),
            value,
            status: AlertStatus::Active,
            priority: rule.priority,
            message: rule.message.clone(),
            created_at,
            resolved_at: None,
        }
    }
}
