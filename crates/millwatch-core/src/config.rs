// Ingestion configuration
//
// IngestConfig is a DB-agnostic configuration struct. The default reproduces
// "one alert per violating reading" with no suppression.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the ingestion pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestConfig {
    /// When set, a violation is not materialized if the same rule already
    /// raised an alert for the same machine and sensor within this period.
    #[serde(default)]
    pub alert_cooldown: Option<Duration>,
}

impl IngestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable per-rule cool-down
    pub fn with_alert_cooldown(mut self, cooldown: Duration) -> Self {
        self.alert_cooldown = Some(cooldown);
        self
    }

    /// Read `ALERT_COOLDOWN_SECS`; unset, empty, zero or unparseable disables it
    pub fn from_env() -> Self {
        let alert_cooldown = std::env::var("ALERT_COOLDOWN_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        Self { alert_cooldown }
    }
}
