// Alert lifecycle service

use millwatch_core::{Alert, AlertStatus, AlertStore};
use std::sync::Arc;

use crate::error::ApiError;

pub struct AlertService {
    alerts: Arc<dyn AlertStore>,
}

impl AlertService {
    pub fn new(alerts: Arc<dyn AlertStore>) -> Self {
        Self { alerts }
    }

    /// Newest first, optionally filtered by status
    pub async fn list(&self, status: Option<&str>) -> Result<Vec<Alert>, ApiError> {
        let status = match status.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Some(s.parse::<AlertStatus>().map_err(ApiError::BadRequest)?),
            None => None,
        };
        Ok(self.alerts.list_alerts(status).await?)
    }

    /// Mark an alert acknowledged. Repeating it is a no-op; unknown ids are 404.
    pub async fn acknowledge(&self, id: &str) -> Result<(), ApiError> {
        if !self.alerts.acknowledge_alert(id).await? {
            return Err(ApiError::not_found(format!("alert {id} not found")));
        }
        tracing::info!(alert_id = %id, "Alert acknowledged");
        Ok(())
    }
}
