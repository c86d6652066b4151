// In-memory implementations for examples and testing
//
// InMemoryTelemetryStore keeps every table in memory, making it suitable for:
// - Standalone examples that don't need a database
// - Unit tests and HTTP route tests
// - Quick prototyping

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::alert::{Alert, AlertStatus};
use crate::error::{Result, TelemetryError};
use crate::rule::Rule;
use crate::sensor::{Binding, Sensor};
use crate::traits::{AlertStore, BindingStore, RuleStore, SensorStore, VisionEventStore};
use crate::vision::{VisionEvent, VisionScope};

#[derive(Debug, Default)]
struct Tables {
    sensors: Vec<Sensor>,
    bindings: Vec<Binding>,
    rules: Vec<Rule>,
    alerts: Vec<Alert>,
    vision_events: Vec<VisionEvent>,
}

/// In-memory telemetry store
///
/// Rows are kept in insertion order; upserts replace in place.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTelemetryStore {
    tables: Arc<RwLock<Tables>>,
    alert_write_budget: Arc<RwLock<Option<usize>>>,
}

impl InMemoryTelemetryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make alert inserts fail once `n` more alerts have been written
    pub async fn fail_alert_writes_after(&self, n: usize) {
        *self.alert_write_budget.write().await = Some(n);
    }

    /// Snapshot of all alerts in insertion order
    pub async fn alerts(&self) -> Vec<Alert> {
        self.tables.read().await.alerts.clone()
    }
}

fn upsert_by<T: Clone>(rows: &mut Vec<T>, row: T, same: impl Fn(&T) -> bool) {
    match rows.iter_mut().find(|r| same(r)) {
        Some(existing) => *existing = row,
        None => rows.push(row),
    }
}

#[async_trait]
impl SensorStore for InMemoryTelemetryStore {
    async fn upsert_sensor(&self, mut sensor: Sensor) -> Result<Sensor> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.sensors.iter().find(|s| s.id == sensor.id) {
            sensor.created_at = existing.created_at;
        }
        let id = sensor.id.clone();
        upsert_by(&mut tables.sensors, sensor.clone(), |s| s.id == id);
        Ok(sensor)
    }

    async fn list_sensors(&self) -> Result<Vec<Sensor>> {
        let mut sensors: Vec<Sensor> =
            self.tables.read().await.sensors.iter().rev().cloned().collect();
        sensors.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sensors)
    }
}

#[async_trait]
impl BindingStore for InMemoryTelemetryStore {
    async fn upsert_binding(&self, mut binding: Binding) -> Result<Binding> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.bindings.iter().find(|b| b.id == binding.id) {
            binding.created_at = existing.created_at;
        }
        let id = binding.id.clone();
        upsert_by(&mut tables.bindings, binding.clone(), |b| b.id == id);
        Ok(binding)
    }

    async fn find_bindings(&self, sensor_id: &str, metric: &str) -> Result<Vec<Binding>> {
        Ok(self
            .tables
            .read()
            .await
            .bindings
            .iter()
            .filter(|b| b.sensor_id == sensor_id && b.metric == metric)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RuleStore for InMemoryTelemetryStore {
    async fn upsert_rule(&self, mut rule: Rule) -> Result<Rule> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.rules.iter().find(|r| r.id == rule.id) {
            rule.created_at = existing.created_at;
        }
        let id = rule.id.clone();
        upsert_by(&mut tables.rules, rule.clone(), |r| r.id == id);
        Ok(rule)
    }

    async fn find_active_rules(
        &self,
        machine_id: &str,
        sensor_id: &str,
        metric: &str,
    ) -> Result<Vec<Rule>> {
        Ok(self
            .tables
            .read()
            .await
            .rules
            .iter()
            .filter(|r| r.applies_to(machine_id, sensor_id, metric))
            .cloned()
            .collect())
    }

    async fn list_enabled_rules(&self) -> Result<Vec<Rule>> {
        let mut rules: Vec<Rule> = self
            .tables
            .read()
            .await
            .rules
            .iter()
            .rev()
            .filter(|r| r.enabled)
            .cloned()
            .collect();
        rules.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rules)
    }
}

#[async_trait]
impl AlertStore for InMemoryTelemetryStore {
    async fn create_alert(&self, alert: Alert) -> Result<Alert> {
        {
            let mut budget = self.alert_write_budget.write().await;
            if let Some(remaining) = budget.as_mut() {
                if *remaining == 0 {
                    return Err(TelemetryError::store("alert insert rejected"));
                }
                *remaining -= 1;
            }
        }
        self.tables.write().await.alerts.push(alert.clone());
        Ok(alert)
    }

    async fn acknowledge_alert(&self, alert_id: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.alerts.iter_mut().find(|a| a.id == alert_id) {
            Some(alert) => {
                alert.status = AlertStatus::Acknowledged;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_alerts(&self, status: Option<AlertStatus>) -> Result<Vec<Alert>> {
        let mut alerts: Vec<Alert> = self
            .tables
            .read()
            .await
            .alerts
            .iter()
            .rev()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(alerts)
    }

    async fn latest_alert_for_rule(
        &self,
        rule_id: &str,
        machine_id: &str,
        sensor_id: &str,
    ) -> Result<Option<Alert>> {
        Ok(self
            .tables
            .read()
            .await
            .alerts
            .iter()
            .filter(|a| {
                a.rule_id == rule_id && a.machine_id == machine_id && a.sensor_id == sensor_id
            })
            .max_by_key(|a| a.created_at)
            .cloned())
    }
}

#[async_trait]
impl VisionEventStore for InMemoryTelemetryStore {
    async fn record_event(&self, event: VisionEvent) -> Result<VisionEvent> {
        self.tables.write().await.vision_events.push(event.clone());
        Ok(event)
    }

    async fn latest_event(&self, scope: &VisionScope) -> Result<Option<VisionEvent>> {
        Ok(self
            .tables
            .read()
            .await
            .vision_events
            .iter()
            .filter(|e| scope.matches(e))
            .max_by_key(|e| e.created_at)
            .cloned())
    }

    async fn latest_event_before(
        &self,
        scope: &VisionScope,
        before: DateTime<Utc>,
    ) -> Result<Option<VisionEvent>> {
        Ok(self
            .tables
            .read()
            .await
            .vision_events
            .iter()
            .filter(|e| scope.matches(e) && e.created_at < before)
            .max_by_key(|e| e.created_at)
            .cloned())
    }

    async fn events_between(
        &self,
        scope: &VisionScope,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<VisionEvent>> {
        let mut events: Vec<VisionEvent> = self
            .tables
            .read()
            .await
            .vision_events
            .iter()
            .filter(|e| scope.matches(e) && e.created_at >= from && e.created_at <= to)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.created_at);
        Ok(events)
    }
}
