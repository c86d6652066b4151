// Vision analytics: latest status and uptime over a window

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{Result, TelemetryError};
use crate::traits::VisionEventStore;
use crate::uptime::StatusTimeline;
use crate::vision::{StatusSnapshot, VisionEvent, VisionScope};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Uptime over `[from, to]` for one scope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UptimeReport {
    pub scope: String,
    pub id: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub active_ms: i64,
    pub total_ms: i64,
    pub percent_active: f64,
}

/// Read side over the vision event log
#[derive(Clone)]
pub struct VisionAnalytics {
    events: Arc<dyn VisionEventStore>,
}

impl VisionAnalytics {
    pub fn new(events: Arc<dyn VisionEventStore>) -> Self {
        Self { events }
    }

    /// Append an observation
    pub async fn record(&self, event: VisionEvent) -> Result<VisionEvent> {
        if event.machine_id.trim().is_empty() {
            return Err(TelemetryError::validation("machineId is required"));
        }
        let event = self.events.record_event(event).await?;
        tracing::debug!(
            event_id = %event.id,
            machine_id = %event.machine_id,
            status = %event.status,
            "Vision event recorded"
        );
        Ok(event)
    }

    /// Latest status for a scope; inactive with zero confidence when unknown
    pub async fn status(&self, scope: &VisionScope) -> Result<StatusSnapshot> {
        let latest = self.events.latest_event(scope).await?;
        Ok(StatusSnapshot::from_latest(scope, latest.as_ref()))
    }

    /// Reconstruct the status timeline around `[from, to]` and measure active time.
    ///
    /// The status at `from` is seeded from the latest event strictly before it.
    pub async fn uptime(
        &self,
        scope: &VisionScope,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<UptimeReport> {
        if from > to {
            return Err(TelemetryError::validation("from must not be after to"));
        }

        let seed = self.events.latest_event_before(scope, from).await?;
        let window = self.events.events_between(scope, from, to).await?;
        let summary = StatusTimeline::from_events(seed.as_ref(), &window).uptime(from, to);

        tracing::debug!(
            scope = scope.kind(),
            id = scope.id(),
            events = window.len(),
            percent_active = summary.percent_active,
            "Uptime computed"
        );

        Ok(UptimeReport {
            scope: scope.kind().to_string(),
            id: scope.id().to_string(),
            from,
            to,
            active_ms: summary.active_ms,
            total_ms: summary.total_ms,
            percent_active: summary.percent_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryTelemetryStore;
    use crate::vision::MachineStatus;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn event(machine: &str, at: DateTime<Utc>, status: MachineStatus) -> VisionEvent {
        VisionEvent {
            id: format!("vision-{}-{}", machine, at.timestamp_millis()),
            camera_id: None,
            machine_id: machine.into(),
            roi_id: None,
            status,
            confidence: Some(0.8),
            frame_time: at,
            created_at: at,
        }
    }

    fn analytics() -> (Arc<InMemoryTelemetryStore>, VisionAnalytics) {
        let store = Arc::new(InMemoryTelemetryStore::new());
        let analytics = VisionAnalytics::new(store.clone());
        (store, analytics)
    }

    #[tokio::test]
    async fn test_uptime_with_empty_log() {
        let (_, analytics) = analytics();
        let scope = VisionScope::Machine("m1".into());
        let report = analytics
            .uptime(&scope, t0(), t0() + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(report.percent_active, 0.0);
        assert_eq!(report.active_ms, 0);
        assert_eq!(report.total_ms, 3_600_000);
    }

    #[tokio::test]
    async fn test_uptime_single_transition() {
        let (_, analytics) = analytics();
        analytics
            .record(event("m1", t0() - Duration::minutes(1), MachineStatus::Inactive))
            .await
            .unwrap();
        analytics
            .record(event("m1", t0() + Duration::hours(1), MachineStatus::Active))
            .await
            .unwrap();

        let scope = VisionScope::Machine("m1".into());
        let report = analytics
            .uptime(&scope, t0(), t0() + Duration::hours(2))
            .await
            .unwrap();
        assert_eq!(report.active_ms, 3_600_000);
        assert_eq!(report.percent_active, 50.0);
        assert_eq!(report.scope, "machine");
        assert_eq!(report.id, "m1");
    }

    #[tokio::test]
    async fn test_uptime_seeded_from_history() {
        let (_, analytics) = analytics();
        analytics
            .record(event("m1", t0() - Duration::minutes(10), MachineStatus::Active))
            .await
            .unwrap();
        let scope = VisionScope::Machine("m1".into());
        let report = analytics
            .uptime(&scope, t0(), t0() + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(report.percent_active, 100.0);
    }

    #[tokio::test]
    async fn test_uptime_zero_window() {
        let (_, analytics) = analytics();
        analytics
            .record(event("m1", t0() - Duration::minutes(10), MachineStatus::Active))
            .await
            .unwrap();
        let scope = VisionScope::Machine("m1".into());
        let report = analytics.uptime(&scope, t0(), t0()).await.unwrap();
        assert_eq!(report.total_ms, 0);
        assert_eq!(report.percent_active, 0.0);
    }

    #[tokio::test]
    async fn test_uptime_ignores_other_scopes() {
        let (_, analytics) = analytics();
        analytics
            .record(event("m2", t0() - Duration::minutes(10), MachineStatus::Active))
            .await
            .unwrap();
        let scope = VisionScope::Machine("m1".into());
        let report = analytics
            .uptime(&scope, t0(), t0() + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(report.percent_active, 0.0);
    }

    #[tokio::test]
    async fn test_uptime_rejects_inverted_window() {
        let (_, analytics) = analytics();
        let scope = VisionScope::Machine("m1".into());
        let err = analytics
            .uptime(&scope, t0(), t0() - Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, TelemetryError::Validation(_)));
    }

    #[tokio::test]
    async fn test_status_latest_and_default() {
        let (_, analytics) = analytics();
        let scope = VisionScope::Machine("m1".into());
        assert_eq!(
            analytics.status(&scope).await.unwrap().status,
            MachineStatus::Inactive
        );

        analytics
            .record(event("m1", t0(), MachineStatus::Active))
            .await
            .unwrap();
        let snapshot = analytics.status(&scope).await.unwrap();
        assert_eq!(snapshot.status, MachineStatus::Active);
        assert_eq!(snapshot.confidence, 0.8);
        assert_eq!(snapshot.updated_at, Some(t0()));
    }

    #[tokio::test]
    async fn test_record_requires_machine() {
        let (store, analytics) = analytics();
        let err = analytics
            .record(event(" ", t0(), MachineStatus::Active))
            .await
            .unwrap_err();
        assert!(matches!(err, TelemetryError::Validation(_)));
        let scope = VisionScope::Machine(" ".into());
        assert!(store.latest_event(&scope).await.unwrap().is_none());
    }
}
