// Sensor registry, binding and ingestion service

use chrono::Utc;
use millwatch_core::{
    id::{or_generate, BINDING_PREFIX, SENSOR_PREFIX},
    sensor::default_scale,
    Binding, BindingStore, IngestOutcome, IngestionPipeline, Reading, Sensor, SensorStore,
};
use std::sync::Arc;

use crate::common::{non_blank, parse_timestamp, required};
use crate::error::ApiError;
use crate::sensors::{BindSensorRequest, CreateSensorRequest, IngestRequest};

pub struct SensorService {
    sensors: Arc<dyn SensorStore>,
    bindings: Arc<dyn BindingStore>,
    pipeline: IngestionPipeline,
}

impl SensorService {
    pub fn new(
        sensors: Arc<dyn SensorStore>,
        bindings: Arc<dyn BindingStore>,
        pipeline: IngestionPipeline,
    ) -> Self {
        Self {
            sensors,
            bindings,
            pipeline,
        }
    }

    pub async fn list(&self) -> Result<Vec<Sensor>, ApiError> {
        Ok(self.sensors.list_sensors().await?)
    }

    pub async fn create(&self, req: CreateSensorRequest) -> Result<Sensor, ApiError> {
        let sensor = Sensor {
            name: required(req.name, "name")?,
            sensor_type: required(req.sensor_type, "type")?,
            protocol: required(req.protocol, "protocol")?,
            id: or_generate(req.id, SENSOR_PREFIX),
            address: non_blank(req.address),
            metadata: req.metadata.unwrap_or_else(|| serde_json::json!({})),
            created_at: Utc::now(),
        };
        let sensor = self.sensors.upsert_sensor(sensor).await?;
        tracing::debug!(sensor_id = %sensor.id, "Sensor stored");
        Ok(sensor)
    }

    pub async fn bind(&self, req: BindSensorRequest) -> Result<Binding, ApiError> {
        let binding = Binding {
            sensor_id: required(req.sensor_id, "sensorId")?,
            machine_id: required(req.machine_id, "machineId")?,
            metric: required(req.metric, "metric")?,
            id: or_generate(req.id, BINDING_PREFIX),
            unit: non_blank(req.unit),
            scale: req.scale.unwrap_or_else(default_scale),
            offset: req.offset.unwrap_or(0.0),
            created_at: Utc::now(),
        };
        let binding = self.bindings.upsert_binding(binding).await?;
        tracing::debug!(
            binding_id = %binding.id,
            sensor_id = %binding.sensor_id,
            machine_id = %binding.machine_id,
            "Sensor bound"
        );
        Ok(binding)
    }

    pub async fn ingest(&self, req: IngestRequest) -> Result<IngestOutcome, ApiError> {
        let reading = Reading {
            sensor_id: required(req.sensor_id, "sensorId")?,
            metric: required(req.metric, "metric")?,
            value: req
                .value
                .ok_or_else(|| ApiError::bad_request("value is required"))?,
            timestamp: parse_timestamp(req.timestamp.as_deref(), "timestamp")?,
        };
        Ok(self.pipeline.ingest(reading).await?)
    }
}
