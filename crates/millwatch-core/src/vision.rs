// Vision event domain types
//
// A VisionEvent is a point-in-time observation produced by an external
// inference process. Scope is a ROI, a machine or a camera.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Observed machine status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    Active,
    #[default]
    Inactive,
}

impl MachineStatus {
    pub fn is_active(self) -> bool {
        self == MachineStatus::Active
    }
}

impl std::fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MachineStatus::Active => write!(f, "active"),
            MachineStatus::Inactive => write!(f, "inactive"),
        }
    }
}

/// Anything other than exactly "active" is inactive.
impl From<&str> for MachineStatus {
    fn from(s: &str) -> Self {
        match s {
            "active" => MachineStatus::Active,
            _ => MachineStatus::Inactive,
        }
    }
}

/// Append-only vision observation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct VisionEvent {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_id: Option<String>,
    pub machine_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roi_id: Option<String>,
    pub status: MachineStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub frame_time: DateTime<Utc>,
    /// Event time used for ordering and reconstruction
    pub created_at: DateTime<Utc>,
}

/// Which key a status/uptime query filters vision events by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisionScope {
    Roi(String),
    Machine(String),
    Camera(String),
}

impl VisionScope {
    /// Pick the governing scope: roi > machine > camera. Blank values are ignored.
    pub fn resolve(
        roi_id: Option<&str>,
        machine_id: Option<&str>,
        camera_id: Option<&str>,
    ) -> Option<Self> {
        let present = |v: Option<&str>| v.filter(|s| !s.trim().is_empty()).map(str::to_string);
        present(roi_id)
            .map(VisionScope::Roi)
            .or_else(|| present(machine_id).map(VisionScope::Machine))
            .or_else(|| present(camera_id).map(VisionScope::Camera))
    }

    /// Scope name as reported in responses
    pub fn kind(&self) -> &'static str {
        match self {
            VisionScope::Roi(_) => "roi",
            VisionScope::Machine(_) => "machine",
            VisionScope::Camera(_) => "camera",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            VisionScope::Roi(id) | VisionScope::Machine(id) | VisionScope::Camera(id) => id,
        }
    }

    /// Whether an event belongs to this scope
    pub fn matches(&self, event: &VisionEvent) -> bool {
        match self {
            VisionScope::Roi(id) => event.roi_id.as_deref() == Some(id.as_str()),
            VisionScope::Machine(id) => event.machine_id == *id,
            VisionScope::Camera(id) => event.camera_id.as_deref() == Some(id.as_str()),
        }
    }
}

/// Latest known status for a scope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub scope: String,
    pub id: String,
    pub status: MachineStatus,
    pub confidence: f64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    /// Snapshot from the latest event, or inactive / zero confidence when none exists
    pub fn from_latest(scope: &VisionScope, latest: Option<&VisionEvent>) -> Self {
        match latest {
            Some(event) => Self {
                scope: scope.kind().to_string(),
                id: scope.id().to_string(),
                status: event.status,
                confidence: event.confidence.unwrap_or(0.0),
                updated_at: Some(event.created_at),
            },
            None => Self {
                scope: scope.kind().to_string(),
                id: scope.id().to_string(),
                status: MachineStatus::Inactive,
                confidence: 0.0,
                updated_at: None,
            },
        }
    }
}
