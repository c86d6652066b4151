// Repository layer for database operations
// Telemetry tables: sensors, sensor_bindings, sensor_rules, alerts, vision_camera_events

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::models::*;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

/// Column a vision scope filters on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeColumn {
    Roi,
    Machine,
    Camera,
}

impl ScopeColumn {
    fn as_sql(self) -> &'static str {
        match self {
            ScopeColumn::Roi => "roi_id",
            ScopeColumn::Machine => "machine_id",
            ScopeColumn::Camera => "camera_id",
        }
    }
}

const SENSOR_COLUMNS: &str = r#"id, name, "type", protocol, address, metadata, created_at"#;
const BINDING_COLUMNS: &str =
    r#"id, sensor_id, machine_id, metric, unit, scale, "offset", created_at"#;
const RULE_COLUMNS: &str = "id, machine_id, sensor_id, metric, operator, min_value, max_value, threshold_value, priority, message, enabled, created_at";
const ALERT_COLUMNS: &str = "id, machine_id, rule_id, sensor_id, metric, value, status, priority, message, created_at, resolved_at";
const VISION_COLUMNS: &str =
    "id, camera_id, machine_id, roi_id, status, confidence, frame_time, created_at";

impl Database {
    /// Create database connection from URL
    pub async fn from_url(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Apply embedded migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // ============================================
    // Sensors
    // ============================================

    pub async fn upsert_sensor(&self, input: UpsertSensor) -> Result<SensorRow> {
        let row = sqlx::query_as::<_, SensorRow>(&format!(
            r#"
            INSERT INTO sensors (id, name, "type", protocol, address, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                "type" = EXCLUDED."type",
                protocol = EXCLUDED.protocol,
                address = EXCLUDED.address,
                metadata = EXCLUDED.metadata
            RETURNING {SENSOR_COLUMNS}
            "#
        ))
        .bind(&input.id)
        .bind(&input.name)
        .bind(&input.sensor_type)
        .bind(&input.protocol)
        .bind(&input.address)
        .bind(&input.metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_sensors(&self) -> Result<Vec<SensorRow>> {
        let rows = sqlx::query_as::<_, SensorRow>(&format!(
            "SELECT {SENSOR_COLUMNS} FROM sensors ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ============================================
    // Bindings
    // ============================================

    pub async fn upsert_binding(&self, input: UpsertBinding) -> Result<BindingRow> {
        let row = sqlx::query_as::<_, BindingRow>(&format!(
            r#"
            INSERT INTO sensor_bindings (id, sensor_id, machine_id, metric, unit, scale, "offset")
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                sensor_id = EXCLUDED.sensor_id,
                machine_id = EXCLUDED.machine_id,
                metric = EXCLUDED.metric,
                unit = EXCLUDED.unit,
                scale = EXCLUDED.scale,
                "offset" = EXCLUDED."offset"
            RETURNING {BINDING_COLUMNS}
            "#
        ))
        .bind(&input.id)
        .bind(&input.sensor_id)
        .bind(&input.machine_id)
        .bind(&input.metric)
        .bind(&input.unit)
        .bind(input.scale)
        .bind(input.offset)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_bindings(&self, sensor_id: &str, metric: &str) -> Result<Vec<BindingRow>> {
        let rows = sqlx::query_as::<_, BindingRow>(&format!(
            r#"
            SELECT {BINDING_COLUMNS}
            FROM sensor_bindings
            WHERE sensor_id = $1 AND metric = $2
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(sensor_id)
        .bind(metric)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ============================================
    // Rules
    // ============================================

    pub async fn upsert_rule(&self, input: UpsertRule) -> Result<RuleRow> {
        let row = sqlx::query_as::<_, RuleRow>(&format!(
            r#"
            INSERT INTO sensor_rules (
                id, machine_id, sensor_id, metric, operator,
                min_value, max_value, threshold_value, priority, message, enabled
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                machine_id = EXCLUDED.machine_id,
                sensor_id = EXCLUDED.sensor_id,
                metric = EXCLUDED.metric,
                operator = EXCLUDED.operator,
                min_value = EXCLUDED.min_value,
                max_value = EXCLUDED.max_value,
                threshold_value = EXCLUDED.threshold_value,
                priority = EXCLUDED.priority,
                message = EXCLUDED.message,
                enabled = EXCLUDED.enabled
            RETURNING {RULE_COLUMNS}
            "#
        ))
        .bind(&input.id)
        .bind(&input.machine_id)
        .bind(&input.sensor_id)
        .bind(&input.metric)
        .bind(&input.operator)
        .bind(input.min_value)
        .bind(input.max_value)
        .bind(input.threshold_value)
        .bind(&input.priority)
        .bind(&input.message)
        .bind(input.enabled)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_active_rules(
        &self,
        machine_id: &str,
        sensor_id: &str,
        metric: &str,
    ) -> Result<Vec<RuleRow>> {
        let rows = sqlx::query_as::<_, RuleRow>(&format!(
            r#"
            SELECT {RULE_COLUMNS}
            FROM sensor_rules
            WHERE enabled = TRUE
              AND machine_id = $1
              AND metric = $3
              AND (sensor_id IS NULL OR sensor_id = $2)
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(machine_id)
        .bind(sensor_id)
        .bind(metric)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn list_enabled_rules(&self) -> Result<Vec<RuleRow>> {
        let rows = sqlx::query_as::<_, RuleRow>(&format!(
            "SELECT {RULE_COLUMNS} FROM sensor_rules WHERE enabled = TRUE ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ============================================
    // Alerts
    // ============================================

    pub async fn create_alert(&self, input: CreateAlertRow) -> Result<AlertRow> {
        let row = sqlx::query_as::<_, AlertRow>(&format!(
            r#"
            INSERT INTO alerts (id, machine_id, rule_id, sensor_id, metric, value, status, priority, message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'active', $7, $8, $9)
            RETURNING {ALERT_COLUMNS}
            "#
        ))
        .bind(&input.id)
        .bind(&input.machine_id)
        .bind(&input.rule_id)
        .bind(&input.sensor_id)
        .bind(&input.metric)
        .bind(input.value)
        .bind(&input.priority)
        .bind(&input.message)
        .bind(input.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Returns false when no alert has this id
    pub async fn acknowledge_alert(&self, id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE alerts
            SET status = 'acknowledged'
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_alerts(&self, status: Option<&str>) -> Result<Vec<AlertRow>> {
        let rows = sqlx::query_as::<_, AlertRow>(&format!(
            r#"
            SELECT {ALERT_COLUMNS}
            FROM alerts
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn latest_alert_for_rule(
        &self,
        rule_id: &str,
        machine_id: &str,
        sensor_id: &str,
    ) -> Result<Option<AlertRow>> {
        let row = sqlx::query_as::<_, AlertRow>(&format!(
            r#"
            SELECT {ALERT_COLUMNS}
            FROM alerts
            WHERE rule_id = $1 AND machine_id = $2 AND sensor_id = $3
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#
        ))
        .bind(rule_id)
        .bind(machine_id)
        .bind(sensor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Vision events (append-only)
    // ============================================

    pub async fn create_vision_event(&self, input: CreateVisionEventRow) -> Result<VisionEventRow> {
        let row = sqlx::query_as::<_, VisionEventRow>(&format!(
            r#"
            INSERT INTO vision_camera_events (id, camera_id, machine_id, roi_id, status, confidence, frame_time, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {VISION_COLUMNS}
            "#
        ))
        .bind(&input.id)
        .bind(&input.camera_id)
        .bind(&input.machine_id)
        .bind(&input.roi_id)
        .bind(&input.status)
        .bind(input.confidence)
        .bind(input.frame_time)
        .bind(input.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn latest_vision_event(
        &self,
        column: ScopeColumn,
        scope_id: &str,
    ) -> Result<Option<VisionEventRow>> {
        let row = sqlx::query_as::<_, VisionEventRow>(&format!(
            r#"
            SELECT {VISION_COLUMNS}
            FROM vision_camera_events
            WHERE {} = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
            column.as_sql()
        ))
        .bind(scope_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn latest_vision_event_before(
        &self,
        column: ScopeColumn,
        scope_id: &str,
        before: DateTime<Utc>,
    ) -> Result<Option<VisionEventRow>> {
        let row = sqlx::query_as::<_, VisionEventRow>(&format!(
            r#"
            SELECT {VISION_COLUMNS}
            FROM vision_camera_events
            WHERE {} = $1 AND created_at < $2
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
            column.as_sql()
        ))
        .bind(scope_id)
        .bind(before)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_vision_events_between(
        &self,
        column: ScopeColumn,
        scope_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<VisionEventRow>> {
        let rows = sqlx::query_as::<_, VisionEventRow>(&format!(
            r#"
            SELECT {VISION_COLUMNS}
            FROM vision_camera_events
            WHERE {} = $1 AND created_at >= $2 AND created_at <= $3
            ORDER BY created_at ASC, id ASC
            "#,
            column.as_sql()
        ))
        .bind(scope_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
