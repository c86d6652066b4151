// Ingestion pipeline
//
// raw reading -> bindings -> calibrated value per machine -> applicable rules
// -> one alert per violated rule.
//
// Every step is a sequential store round-trip. There is no transaction around
// the fan-out: alerts written before a failure stay written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::alert::Alert;
use crate::config::IngestConfig;
use crate::error::Result;
use crate::id::{next_id, ALERT_PREFIX};
use crate::rule::Rule;
use crate::traits::{AlertStore, BindingStore, RuleStore};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A raw sensor reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub sensor_id: String,
    pub metric: String,
    pub value: f64,
    /// Reading time; alerts use ingestion time when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Result of ingesting one reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct IngestOutcome {
    pub alerts_created: usize,
    #[serde(skip)]
    pub alerts: Vec<Alert>,
}

/// Turns readings into alerts
#[derive(Clone)]
pub struct IngestionPipeline {
    bindings: Arc<dyn BindingStore>,
    rules: Arc<dyn RuleStore>,
    alerts: Arc<dyn AlertStore>,
    config: IngestConfig,
}

impl IngestionPipeline {
    pub fn new(
        bindings: Arc<dyn BindingStore>,
        rules: Arc<dyn RuleStore>,
        alerts: Arc<dyn AlertStore>,
        config: IngestConfig,
    ) -> Self {
        Self {
            bindings,
            rules,
            alerts,
            config,
        }
    }

    /// Ingest one reading. An unbound (sensor, metric) pair is a no-op.
    ///
    /// Alerts are created in binding order, then rule order.
    pub async fn ingest(&self, reading: Reading) -> Result<IngestOutcome> {
        let bindings = self
            .bindings
            .find_bindings(&reading.sensor_id, &reading.metric)
            .await?;

        if bindings.is_empty() {
            tracing::debug!(
                sensor_id = %reading.sensor_id,
                metric = %reading.metric,
                "Reading has no binding, ignoring"
            );
            return Ok(IngestOutcome {
                alerts_created: 0,
                alerts: Vec::new(),
            });
        }

        let created_at = reading.timestamp.unwrap_or_else(Utc::now);
        let mut created = Vec::new();

        for binding in &bindings {
            let adjusted = binding.calibrate(reading.value);
            let rules = self
                .rules
                .find_active_rules(&binding.machine_id, &reading.sensor_id, &reading.metric)
                .await?;

            for rule in rules.iter().filter(|r| r.is_violated(adjusted)) {
                if self
                    .suppressed(rule, &binding.machine_id, &reading.sensor_id, created_at)
                    .await?
                {
                    tracing::debug!(
                        rule_id = %rule.id,
                        machine_id = %binding.machine_id,
                        value = adjusted,
                        "Violation suppressed by cool-down"
                    );
                    continue;
                }

                let alert = Alert::from_violation(
                    next_id(ALERT_PREFIX),
                    rule,
                    &binding.machine_id,
                    &reading.sensor_id,
                    adjusted,
                    created_at,
                );
                let alert = self.alerts.create_alert(alert).await?;
                tracing::info!(
                    alert_id = %alert.id,
                    rule_id = %rule.id,
                    machine_id = %alert.machine_id,
                    priority = %alert.priority,
                    value = adjusted,
                    "Alert created"
                );
                created.push(alert);
            }
        }

        tracing::debug!(
            sensor_id = %reading.sensor_id,
            metric = %reading.metric,
            bindings = bindings.len(),
            alerts_created = created.len(),
            "Reading ingested"
        );

        Ok(IngestOutcome {
            alerts_created: created.len(),
            alerts: created,
        })
    }

    async fn suppressed(
        &self,
        rule: &Rule,
        machine_id: &str,
        sensor_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let Some(cooldown) = self.config.alert_cooldown else {
            return Ok(false);
        };
        let Ok(cooldown) = chrono::Duration::from_std(cooldown) else {
            return Ok(false);
        };
        let last = self
            .alerts
            .latest_alert_for_rule(&rule.id, machine_id, sensor_id)
            .await?;
        Ok(last.is_some_and(|a| at >= a.created_at && at - a.created_at < cooldown))
    }
}
