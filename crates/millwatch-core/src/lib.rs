// Telemetry Processing Core
//
// This crate provides a DB-agnostic implementation of the factory telemetry
// pipeline: raw sensor readings are calibrated per machine binding and checked
// against threshold rules to materialize alerts, and discrete vision
// observations are reconstructed into a status timeline for uptime reporting.
//
// Key design decisions:
// - Uses store traits (SensorStore, BindingStore, RuleStore, AlertStore,
//   VisionEventStore) for pluggable backends
// - Rule evaluation and uptime reconstruction are pure functions over values
// - No alert deduplication by default; an optional per-rule cool-down is
//   configured via IngestConfig
// - Ids are text "<prefix>-<base36 millis>-<random>" and may be client-supplied

// Domain entity types
pub mod alert;
pub mod rule;
pub mod sensor;
pub mod vision;

pub mod analytics;
pub mod config;
pub mod error;
pub mod id;
pub mod ingest;
pub mod traits;
pub mod uptime;

// In-memory implementations for examples and testing
pub mod memory;

// Re-exports for convenience
pub use alert::{Alert, AlertStatus};
pub use analytics::{UptimeReport, VisionAnalytics};
pub use config::IngestConfig;
pub use error::{Result, TelemetryError};
pub use ingest::{IngestOutcome, IngestionPipeline, Reading};
pub use rule::{Priority, Rule, RuleOperator};
pub use sensor::{Binding, Sensor};
pub use traits::{
    AlertStore, BindingStore, RuleStore, SensorStore, TelemetryStore, VisionEventStore,
};
pub use uptime::{compute_uptime, StatusTimeline, StatusTransition, UptimeSummary};
pub use vision::{MachineStatus, StatusSnapshot, VisionEvent, VisionScope};
