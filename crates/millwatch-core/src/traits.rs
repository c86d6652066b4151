// Store traits for pluggable backends
//
// These traits keep ingestion and uptime logic independent of the database:
// - In-memory implementations for examples and testing
// - Postgres implementations for production (millwatch-storage)

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::alert::{Alert, AlertStatus};
use crate::error::Result;
use crate::rule::Rule;
use crate::sensor::{Binding, Sensor};
use crate::vision::{VisionEvent, VisionScope};

// ============================================================================
// SensorStore - Sensor registry
// ============================================================================

#[async_trait]
pub trait SensorStore: Send + Sync {
    /// Insert or fully overwrite a sensor by id
    async fn upsert_sensor(&self, sensor: Sensor) -> Result<Sensor>;

    /// All sensors, most recently created first
    async fn list_sensors(&self) -> Result<Vec<Sensor>>;
}

// ============================================================================
// BindingStore - (sensor, metric) -> machine calibration table
// ============================================================================

#[async_trait]
pub trait BindingStore: Send + Sync {
    /// Insert or overwrite a binding by id
    async fn upsert_binding(&self, binding: Binding) -> Result<Binding>;

    /// All bindings for a sensor metric stream, in creation order
    async fn find_bindings(&self, sensor_id: &str, metric: &str) -> Result<Vec<Binding>>;
}

// ============================================================================
// RuleStore - Threshold rules
// ============================================================================

#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Insert or overwrite a rule by id
    async fn upsert_rule(&self, rule: Rule) -> Result<Rule>;

    /// Enabled rules for the machine and metric whose sensor is unset or equal
    /// to `sensor_id`, in creation order
    async fn find_active_rules(
        &self,
        machine_id: &str,
        sensor_id: &str,
        metric: &str,
    ) -> Result<Vec<Rule>>;

    /// All enabled rules, newest first
    async fn list_enabled_rules(&self) -> Result<Vec<Rule>>;
}

// ============================================================================
// AlertStore - Materialized violations
// ============================================================================

#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn create_alert(&self, alert: Alert) -> Result<Alert>;

    /// Mark an alert acknowledged. Returns false when no alert has this id.
    /// Acknowledging twice is not an error.
    async fn acknowledge_alert(&self, alert_id: &str) -> Result<bool>;

    /// Alerts newest first, optionally filtered by status
    async fn list_alerts(&self, status: Option<AlertStatus>) -> Result<Vec<Alert>>;

    /// Most recent alert raised by a rule for a machine/sensor pair
    async fn latest_alert_for_rule(
        &self,
        rule_id: &str,
        machine_id: &str,
        sensor_id: &str,
    ) -> Result<Option<Alert>>;
}

// ============================================================================
// VisionEventStore - Append-only observation log
// ============================================================================

#[async_trait]
pub trait VisionEventStore: Send + Sync {
    async fn record_event(&self, event: VisionEvent) -> Result<VisionEvent>;

    /// Most recent event for the scope
    async fn latest_event(&self, scope: &VisionScope) -> Result<Option<VisionEvent>>;

    /// Most recent event for the scope strictly before `before`
    async fn latest_event_before(
        &self,
        scope: &VisionScope,
        before: DateTime<Utc>,
    ) -> Result<Option<VisionEvent>>;

    /// Events for the scope with `from <= time <= to`, ascending
    async fn events_between(
        &self,
        scope: &VisionScope,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<VisionEvent>>;
}

/// Everything the telemetry subsystem persists
pub trait TelemetryStore:
    SensorStore + BindingStore + RuleStore + AlertStore + VisionEventStore
{
}

impl<T> TelemetryStore for T where
    T: SensorStore + BindingStore + RuleStore + AlertStore + VisionEventStore
{
}
