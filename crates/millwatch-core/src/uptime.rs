// Status step-function reconstruction
//
// A scope's status is a right-continuous step function of time: an observation
// at `t` with status `s` means the status became `s` at `t` and holds until the
// next observation. Before the first observation the timeline's initial status
// applies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::vision::{MachineStatus, VisionEvent};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A single boundary of the step function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub at: DateTime<Utc>,
    pub status: MachineStatus,
}

impl From<&VisionEvent> for StatusTransition {
    fn from(event: &VisionEvent) -> Self {
        Self {
            at: event.created_at,
            status: event.status,
        }
    }
}

/// Active duration over a window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UptimeSummary {
    pub active_ms: i64,
    pub total_ms: i64,
    /// Percentage rounded to two decimals; 0 for an empty window
    pub percent_active: f64,
}

/// Ordered list of status transitions plus the status before the first one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusTimeline {
    initial: MachineStatus,
    transitions: Vec<StatusTransition>,
}

impl StatusTimeline {
    pub fn new(initial: MachineStatus) -> Self {
        Self {
            initial,
            transitions: Vec::new(),
        }
    }

    /// Build a timeline from a seed observation (the latest one before the
    /// window of interest) and observations ordered by time.
    pub fn from_events(seed: Option<&VisionEvent>, events: &[VisionEvent]) -> Self {
        let initial = seed.map(|e| e.status).unwrap_or_default();
        Self {
            initial,
            transitions: events.iter().map(StatusTransition::from).collect(),
        }
    }

    /// Append a transition. Callers push in time order; an out-of-order
    /// transition is inserted after any transition at the same instant.
    pub fn push(&mut self, at: DateTime<Utc>, status: MachineStatus) {
        let idx = self.transitions.partition_point(|t| t.at <= at);
        self.transitions.insert(idx, StatusTransition { at, status });
    }

    pub fn transitions(&self) -> &[StatusTransition] {
        &self.transitions
    }

    /// Status holding at instant `t`
    pub fn status_at(&self, t: DateTime<Utc>) -> MachineStatus {
        let idx = self.transitions.partition_point(|tr| tr.at <= t);
        if idx == 0 {
            self.initial
        } else {
            self.transitions[idx - 1].status
        }
    }

    /// Active duration within `[from, to]`
    pub fn uptime(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> UptimeSummary {
        let start = self.transitions.partition_point(|tr| tr.at < from);
        let end = self.transitions.partition_point(|tr| tr.at <= to);
        let seed = if start == 0 {
            self.initial
        } else {
            self.transitions[start - 1].status
        };
        let window = if start <= end {
            &self.transitions[start..end]
        } else {
            &[]
        };
        compute_uptime(window, from, to, seed)
    }
}

/// Single left-to-right sweep over transitions sorted ascending and restricted
/// to `[from, to]`. Accumulates time only where the previous status was active,
/// then folds in the open tail up to `to`.
pub fn compute_uptime(
    transitions: &[StatusTransition],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    initial: MachineStatus,
) -> UptimeSummary {
    let mut last_ts = from;
    let mut status = initial;
    let mut active_ms: i64 = 0;

    for tr in transitions {
        let window_end = tr.at.min(to);
        if window_end > last_ts && status.is_active() {
            active_ms += (window_end - last_ts).num_milliseconds();
        }
        last_ts = last_ts.max(tr.at);
        status = tr.status;
        if last_ts >= to {
            break;
        }
    }

    if to > last_ts && status.is_active() {
        active_ms += (to - last_ts).num_milliseconds();
    }

    let total_ms = (to - from).num_milliseconds();
    let percent_active = if total_ms > 0 {
        round2(active_ms as f64 / total_ms as f64 * 100.0)
    } else {
        0.0
    };

    UptimeSummary {
        active_ms,
        total_ms,
        percent_active,
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use MachineStatus::{Active, Inactive};

    const HOUR_MS: i64 = 3_600_000;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn tr(at: DateTime<Utc>, status: MachineStatus) -> StatusTransition {
        StatusTransition { at, status }
    }

    #[test]
    fn test_no_events_is_zero() {
        let summary = compute_uptime(&[], t0(), t0() + Duration::hours(1), Inactive);
        assert_eq!(summary.active_ms, 0);
        assert_eq!(summary.total_ms, HOUR_MS);
        assert_eq!(summary.percent_active, 0.0);
    }

    #[test]
    fn test_single_transition_half_window() {
        let events = [tr(t0() + Duration::hours(1), Active)];
        let summary = compute_uptime(&events, t0(), t0() + Duration::hours(2), Inactive);
        assert_eq!(summary.active_ms, HOUR_MS);
        assert_eq!(summary.total_ms, 2 * HOUR_MS);
        assert_eq!(summary.percent_active, 50.0);
    }

    #[test]
    fn test_zero_length_window() {
        let summary = compute_uptime(&[], t0(), t0(), Active);
        assert_eq!(summary.total_ms, 0);
        assert_eq!(summary.active_ms, 0);
        assert_eq!(summary.percent_active, 0.0);
    }

    #[test]
    fn test_seed_carries_whole_window() {
        let summary = compute_uptime(&[], t0(), t0() + Duration::hours(1), Active);
        assert_eq!(summary.active_ms, HOUR_MS);
        assert_eq!(summary.percent_active, 100.0);
    }

    #[test]
    fn test_event_at_window_start_takes_effect_immediately() {
        let events = [tr(t0(), Active)];
        let summary = compute_uptime(&events, t0(), t0() + Duration::minutes(30), Inactive);
        assert_eq!(summary.percent_active, 100.0);
    }

    #[test]
    fn test_multiple_toggles() {
        // active 08:00-08:15, inactive 08:15-08:40, active 08:40-09:00
        let events = [
            tr(t0(), Active),
            tr(t0() + Duration::minutes(15), Inactive),
            tr(t0() + Duration::minutes(40), Active),
        ];
        let summary = compute_uptime(&events, t0(), t0() + Duration::hours(1), Inactive);
        assert_eq!(summary.active_ms, 35 * 60_000);
        assert_eq!(summary.percent_active, 58.33);
    }

    #[test]
    fn test_repeated_same_status_does_not_double_count() {
        let events = [
            tr(t0() + Duration::minutes(10), Active),
            tr(t0() + Duration::minutes(20), Active),
            tr(t0() + Duration::minutes(30), Active),
        ];
        let summary = compute_uptime(&events, t0(), t0() + Duration::minutes(40), Inactive);
        assert_eq!(summary.active_ms, 30 * 60_000);
        assert_eq!(summary.percent_active, 75.0);
    }

    #[test]
    fn test_event_at_window_end() {
        let events = [tr(t0() + Duration::hours(1), Inactive)];
        let summary = compute_uptime(&events, t0(), t0() + Duration::hours(1), Active);
        assert_eq!(summary.active_ms, HOUR_MS);
        assert_eq!(summary.percent_active, 100.0);
    }

    #[test]
    fn test_timeline_seeds_from_history() {
        let mut timeline = StatusTimeline::new(Inactive);
        timeline.push(t0() - Duration::minutes(10), Active);
        let summary = timeline.uptime(t0(), t0() + Duration::hours(1));
        assert_eq!(summary.percent_active, 100.0);
    }

    #[test]
    fn test_timeline_ignores_transitions_after_window() {
        let mut timeline = StatusTimeline::new(Inactive);
        timeline.push(t0() + Duration::minutes(30), Active);
        timeline.push(t0() + Duration::hours(3), Inactive);
        let summary = timeline.uptime(t0(), t0() + Duration::hours(1));
        assert_eq!(summary.active_ms, 30 * 60_000);
        assert_eq!(summary.percent_active, 50.0);
    }

    #[test]
    fn test_timeline_push_keeps_order() {
        let mut timeline = StatusTimeline::new(Inactive);
        timeline.push(t0() + Duration::minutes(20), Inactive);
        timeline.push(t0(), Active);
        let ats: Vec<_> = timeline.transitions().iter().map(|t| t.at).collect();
        assert_eq!(ats, vec![t0(), t0() + Duration::minutes(20)]);
    }

    #[test]
    fn test_status_at() {
        let mut timeline = StatusTimeline::new(Inactive);
        timeline.push(t0(), Active);
        timeline.push(t0() + Duration::minutes(5), Inactive);

        assert_eq!(timeline.status_at(t0() - Duration::seconds(1)), Inactive);
        assert_eq!(timeline.status_at(t0()), Active);
        assert_eq!(timeline.status_at(t0() + Duration::minutes(4)), Active);
        assert_eq!(timeline.status_at(t0() + Duration::minutes(5)), Inactive);
    }
}
