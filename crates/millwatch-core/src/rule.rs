// Threshold rule domain types and evaluation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Comparison applied to a calibrated value
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum RuleOperator {
    /// Violated outside `[min_value, max_value]`; either bound may be absent
    Range,
    Gt,
    Lt,
    Eq,
}

impl FromStr for RuleOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "range" => Ok(Self::Range),
            "gt" => Ok(Self::Gt),
            "lt" => Ok(Self::Lt),
            "eq" => Ok(Self::Eq),
            _ => Err(format!("unknown rule operator: {s}")),
        }
    }
}

impl std::fmt::Display for RuleOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Range => write!(f, "range"),
            Self::Gt => write!(f, "gt"),
            Self::Lt => write!(f, "lt"),
            Self::Eq => write!(f, "eq"),
        }
    }
}

/// Alert priority, copied from rule to alert
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("unknown priority: {s}")),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Threshold rule scoped to a machine and optionally to one sensor.
///
/// `sensor_id = None` applies to any sensor reporting `metric` on the machine.
/// Rules are soft-disabled via `enabled`, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub machine_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_id: Option<String>,
    pub metric: String,
    pub operator: RuleOperator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_value: Option<f64>,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl Rule {
    /// Whether this rule is consulted for a reading of `metric` from `sensor_id`
    /// bound to `machine_id`. Disabled rules never apply.
    pub fn applies_to(&self, machine_id: &str, sensor_id: &str, metric: &str) -> bool {
        self.enabled
            && self.machine_id == machine_id
            && self.metric == metric
            && self.sensor_id.as_deref().map_or(true, |s| s == sensor_id)
    }

    /// Evaluate a calibrated value against this rule.
    ///
    /// Range bounds belong to the safe range. A comparison operator without a
    /// threshold never fires. `eq` is exact floating-point equality.
    pub fn is_violated(&self, value: f64) -> bool {
        match self.operator {
            RuleOperator::Range => {
                self.min_value.is_some_and(|min| value < min)
                    || self.max_value.is_some_and(|max| value > max)
            }
            RuleOperator::Gt => self.threshold_value.is_some_and(|t| value > t),
            RuleOperator::Lt => self.threshold_value.is_some_and(|t| value < t),
            RuleOperator::Eq => self.threshold_value.is_some_and(|t| value == t),
        }
    }
}
