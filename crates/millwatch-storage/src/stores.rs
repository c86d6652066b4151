// Database-backed store implementations
//
// Implements the millwatch-core store traits on top of the Database
// repositories, converting rows to domain types. Repository errors surface as
// TelemetryError::Store with the raw database message.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use millwatch_core::{
    traits::{AlertStore, BindingStore, RuleStore, SensorStore, VisionEventStore},
    Alert, AlertStatus, Binding, MachineStatus, Result, Rule, Sensor, TelemetryError,
    VisionEvent, VisionScope,
};

use crate::models::*;
use crate::repositories::{Database, ScopeColumn};

fn store_err(e: anyhow::Error) -> TelemetryError {
    tracing::warn!("Database operation failed: {}", e);
    TelemetryError::store(e.to_string())
}

fn scope_column(scope: &VisionScope) -> (ScopeColumn, &str) {
    match scope {
        VisionScope::Roi(id) => (ScopeColumn::Roi, id),
        VisionScope::Machine(id) => (ScopeColumn::Machine, id),
        VisionScope::Camera(id) => (ScopeColumn::Camera, id),
    }
}

// ============================================================================
// Row -> domain conversion
// ============================================================================

impl From<SensorRow> for Sensor {
    fn from(row: SensorRow) -> Self {
        Sensor {
            id: row.id,
            name: row.name,
            sensor_type: row.sensor_type,
            protocol: row.protocol,
            address: row.address,
            metadata: row.metadata,
            created_at: row.created_at,
        }
    }
}

impl From<BindingRow> for Binding {
    fn from(row: BindingRow) -> Self {
        Binding {
            id: row.id,
            sensor_id: row.sensor_id,
            machine_id: row.machine_id,
            metric: row.metric,
            unit: row.unit,
            scale: row.scale,
            offset: row.offset,
            created_at: row.created_at,
        }
    }
}

impl TryFrom<RuleRow> for Rule {
    type Error = TelemetryError;

    fn try_from(row: RuleRow) -> Result<Self> {
        Ok(Rule {
            operator: row.operator.parse().map_err(TelemetryError::store)?,
            priority: row.priority.parse().map_err(TelemetryError::store)?,
            id: row.id,
            machine_id: row.machine_id,
            sensor_id: row.sensor_id,
            metric: row.metric,
            min_value: row.min_value,
            max_value: row.max_value,
            threshold_value: row.threshold_value,
            message: row.message,
            enabled: row.enabled,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<AlertRow> for Alert {
    type Error = TelemetryError;

    fn try_from(row: AlertRow) -> Result<Self> {
        Ok(Alert {
            status: row.status.parse().map_err(TelemetryError::store)?,
            priority: row.priority.parse().map_err(TelemetryError::store)?,
            id: row.id,
            machine_id: row.machine_id,
            rule_id: row.rule_id,
            sensor_id: row.sensor_id,
            metric: row.metric,
            value: row.value,
            message: row.message,
            created_at: row.created_at,
            resolved_at: row.resolved_at,
        })
    }
}

impl From<VisionEventRow> for VisionEvent {
    fn from(row: VisionEventRow) -> Self {
        VisionEvent {
            id: row.id,
            camera_id: row.camera_id,
            machine_id: row.machine_id,
            roi_id: row.roi_id,
            status: MachineStatus::from(row.status.as_str()),
            confidence: row.confidence,
            frame_time: row.frame_time,
            created_at: row.created_at,
        }
    }
}

// ============================================================================
// Trait implementations
// ============================================================================

#[async_trait]
impl SensorStore for Database {
    async fn upsert_sensor(&self, sensor: Sensor) -> Result<Sensor> {
        let row = Database::upsert_sensor(
            self,
            UpsertSensor {
                id: sensor.id,
                name: sensor.name,
                sensor_type: sensor.sensor_type,
                protocol: sensor.protocol,
                address: sensor.address,
                metadata: sensor.metadata,
            },
        )
        .await
        .map_err(store_err)?;
        Ok(row.into())
    }

    async fn list_sensors(&self) -> Result<Vec<Sensor>> {
        let rows = Database::list_sensors(self).await.map_err(store_err)?;
        Ok(rows.into_iter().map(Sensor::from).collect())
    }
}

#[async_trait]
impl BindingStore for Database {
    async fn upsert_binding(&self, binding: Binding) -> Result<Binding> {
        let row = Database::upsert_binding(
            self,
            UpsertBinding {
                id: binding.id,
                sensor_id: binding.sensor_id,
                machine_id: binding.machine_id,
                metric: binding.metric,
                unit: binding.unit,
                scale: binding.scale,
                offset: binding.offset,
            },
        )
        .await
        .map_err(store_err)?;
        Ok(row.into())
    }

    async fn find_bindings(&self, sensor_id: &str, metric: &str) -> Result<Vec<Binding>> {
        let rows = Database::find_bindings(self, sensor_id, metric)
            .await
            .map_err(store_err)?;
        Ok(rows.into_iter().map(Binding::from).collect())
    }
}

#[async_trait]
impl RuleStore for Database {
    async fn upsert_rule(&self, rule: Rule) -> Result<Rule> {
        let row = Database::upsert_rule(
            self,
            UpsertRule {
                id: rule.id,
                machine_id: rule.machine_id,
                sensor_id: rule.sensor_id,
                metric: rule.metric,
                operator: rule.operator.to_string(),
                min_value: rule.min_value,
                max_value: rule.max_value,
                threshold_value: rule.threshold_value,
                priority: rule.priority.to_string(),
                message: rule.message,
                enabled: rule.enabled,
            },
        )
        .await
        .map_err(store_err)?;
        row.try_into()
    }

    async fn find_active_rules(
        &self,
        machine_id: &str,
        sensor_id: &str,
        metric: &str,
    ) -> Result<Vec<Rule>> {
        Database::find_active_rules(self, machine_id, sensor_id, metric)
            .await
            .map_err(store_err)?
            .into_iter()
            .map(Rule::try_from)
            .collect()
    }

    async fn list_enabled_rules(&self) -> Result<Vec<Rule>> {
        Database::list_enabled_rules(self)
            .await
            .map_err(store_err)?
            .into_iter()
            .map(Rule::try_from)
            .collect()
    }
}

#[async_trait]
impl AlertStore for Database {
    async fn create_alert(&self, alert: Alert) -> Result<Alert> {
        let row = Database::create_alert(
            self,
            CreateAlertRow {
                id: alert.id,
                machine_id: alert.machine_id,
                rule_id: alert.rule_id,
                sensor_id: alert.sensor_id,
                metric: alert.metric,
                value: alert.value,
                priority: alert.priority.to_string(),
                message: alert.message,
                created_at: alert.created_at,
            },
        )
        .await
        .map_err(store_err)?;
        row.try_into()
    }

    async fn acknowledge_alert(&self, alert_id: &str) -> Result<bool> {
        Database::acknowledge_alert(self, alert_id)
            .await
            .map_err(store_err)
    }

    async fn list_alerts(&self, status: Option<AlertStatus>) -> Result<Vec<Alert>> {
        let status = status.map(|s| s.to_string());
        Database::list_alerts(self, status.as_deref())
            .await
            .map_err(store_err)?
            .into_iter()
            .map(Alert::try_from)
            .collect()
    }

    async fn latest_alert_for_rule(
        &self,
        rule_id: &str,
        machine_id: &str,
        sensor_id: &str,
    ) -> Result<Option<Alert>> {
        Database::latest_alert_for_rule(self, rule_id, machine_id, sensor_id)
            .await
            .map_err(store_err)?
            .map(Alert::try_from)
            .transpose()
    }
}

#[async_trait]
impl VisionEventStore for Database {
    async fn record_event(&self, event: VisionEvent) -> Result<VisionEvent> {
        let row = self
            .create_vision_event(CreateVisionEventRow {
                id: event.id,
                camera_id: event.camera_id,
                machine_id: event.machine_id,
                roi_id: event.roi_id,
                status: event.status.to_string(),
                confidence: event.confidence,
                frame_time: event.frame_time,
                created_at: event.created_at,
            })
            .await
            .map_err(store_err)?;
        Ok(row.into())
    }

    async fn latest_event(&self, scope: &VisionScope) -> Result<Option<VisionEvent>> {
        let (column, id) = scope_column(scope);
        let row = self
            .latest_vision_event(column, id)
            .await
            .map_err(store_err)?;
        Ok(row.map(VisionEvent::from))
    }

    async fn latest_event_before(
        &self,
        scope: &VisionScope,
        before: DateTime<Utc>,
    ) -> Result<Option<VisionEvent>> {
        let (column, id) = scope_column(scope);
        let row = self
            .latest_vision_event_before(column, id, before)
            .await
            .map_err(store_err)?;
        Ok(row.map(VisionEvent::from))
    }

    async fn events_between(
        &self,
        scope: &VisionScope,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<VisionEvent>> {
        let (column, id) = scope_column(scope);
        let rows = self
            .list_vision_events_between(column, id, from, to)
            .await
            .map_err(store_err)?;
        Ok(rows.into_iter().map(VisionEvent::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_err_keeps_raw_message() {
        let err = store_err(anyhow::anyhow!("duplicate key value violates unique constraint"));
        match err {
            TelemetryError::Store(msg) => {
                assert_eq!(msg, "duplicate key value violates unique constraint")
            }
            other => panic!("expected store error, got {other:?}"),
        }
    }

    #[test]
    fn test_rule_row_with_unknown_operator_is_store_error() {
        let row = RuleRow {
            id: "rule-1".into(),
            machine_id: "press-1".into(),
            sensor_id: None,
            metric: "current".into(),
            operator: "between".into(),
            min_value: None,
            max_value: None,
            threshold_value: None,
            priority: "medium".into(),
            message: None,
            enabled: true,
            created_at: Utc::now(),
        };
        assert!(matches!(Rule::try_from(row), Err(TelemetryError::Store(_))));
    }
}
