// Vision event, status and uptime service

use chrono::Utc;
use millwatch_core::{
    id::{or_generate, VISION_EVENT_PREFIX},
    MachineStatus, StatusSnapshot, UptimeReport, VisionAnalytics, VisionEvent, VisionScope,
};

use crate::common::{non_blank, parse_timestamp, required};
use crate::error::ApiError;
use crate::vision::{MockEventRequest, ScopeQuery, UptimeQuery};

pub struct VisionService {
    analytics: VisionAnalytics,
    default_window: chrono::Duration,
}

impl VisionService {
    pub fn new(analytics: VisionAnalytics, default_window: chrono::Duration) -> Self {
        Self {
            analytics,
            default_window,
        }
    }

    pub async fn status(&self, query: ScopeQuery) -> Result<StatusSnapshot, ApiError> {
        let scope = resolve_scope(
            query.roi_id.as_deref(),
            query.machine_id.as_deref(),
            query.camera_id.as_deref(),
        )?;
        Ok(self.analytics.status(&scope).await?)
    }

    pub async fn uptime(&self, query: UptimeQuery) -> Result<UptimeReport, ApiError> {
        let scope = resolve_scope(
            query.roi_id.as_deref(),
            query.machine_id.as_deref(),
            query.camera_id.as_deref(),
        )?;
        let to = parse_timestamp(query.to.as_deref(), "to")?.unwrap_or_else(Utc::now);
        let from = match parse_timestamp(query.from.as_deref(), "from")? {
            Some(from) => from,
            None => to.checked_sub_signed(self.default_window).ok_or_else(|| {
                ApiError::bad_request("uptime window starts before the earliest supported time")
            })?,
        };
        Ok(self.analytics.uptime(&scope, from, to).await?)
    }

    pub async fn record(&self, req: MockEventRequest) -> Result<VisionEvent, ApiError> {
        let machine_id = required(req.machine_id, "machineId")?;
        let created_at =
            parse_timestamp(req.created_at.as_deref(), "createdAt")?.unwrap_or_else(Utc::now);
        let frame_time =
            parse_timestamp(req.frame_time.as_deref(), "frameTime")?.unwrap_or(created_at);

        let event = VisionEvent {
            id: or_generate(req.id, VISION_EVENT_PREFIX),
            camera_id: non_blank(req.camera_id),
            machine_id,
            roi_id: non_blank(req.roi_id),
            status: req
                .status
                .as_deref()
                .map(MachineStatus::from)
                .unwrap_or_default(),
            confidence: req.confidence,
            frame_time,
            created_at,
        };
        Ok(self.analytics.record(event).await?)
    }
}

fn resolve_scope(
    roi_id: Option<&str>,
    machine_id: Option<&str>,
    camera_id: Option<&str>,
) -> Result<VisionScope, ApiError> {
    VisionScope::resolve(roi_id, machine_id, camera_id)
        .ok_or_else(|| ApiError::bad_request("one of roiId, machineId or cameraId is required"))
}
