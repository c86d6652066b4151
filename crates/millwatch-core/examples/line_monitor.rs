//! Line Monitor Example - Ingestion and uptime without a database
//!
//! Wires one current clamp to two presses, ingests a few readings and
//! reports how long a press was observed running.
//!
//! Run with: cargo run -p millwatch-core --example line_monitor

use chrono::{Duration, Utc};
use millwatch_core::{
    memory::InMemoryTelemetryStore, Binding, BindingStore, IngestConfig, IngestionPipeline,
    MachineStatus, Priority, Reading, Rule, RuleOperator, RuleStore, VisionAnalytics,
    VisionEvent, VisionScope,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("millwatch_core=debug")
        .init();

    println!("=== Line Monitor (millwatch-core) ===\n");

    let store = Arc::new(InMemoryTelemetryStore::new());
    let now = Utc::now();

    // 1. Bind clamp-7 "current" to two presses with different calibration
    for (id, machine, scale) in [("bind-a", "press-1", 1.0), ("bind-b", "press-2", 0.5)] {
        store
            .upsert_binding(Binding {
                id: id.into(),
                sensor_id: "clamp-7".into(),
                machine_id: machine.into(),
                metric: "current".into(),
                unit: Some("A".into()),
                scale,
                offset: 0.0,
                created_at: now,
            })
            .await?;
    }

    // 2. Same safe range on both presses
    for machine in ["press-1", "press-2"] {
        store
            .upsert_rule(Rule {
                id: format!("rule-{machine}"),
                machine_id: machine.into(),
                sensor_id: None,
                metric: "current".into(),
                operator: RuleOperator::Range,
                min_value: Some(0.0),
                max_value: Some(30.0),
                threshold_value: None,
                priority: Priority::High,
                message: Some("Motor current out of range".into()),
                enabled: true,
                created_at: now,
            })
            .await?;
    }

    // 3. Ingest readings
    let pipeline = IngestionPipeline::new(
        store.clone(),
        store.clone(),
        store.clone(),
        IngestConfig::from_env(),
    );
    for value in [12.0, 45.0, 70.0] {
        let outcome = pipeline
            .ingest(Reading {
                sensor_id: "clamp-7".into(),
                metric: "current".into(),
                value,
                timestamp: None,
            })
            .await?;
        println!("raw {value:>5.1} A -> {} alert(s)", outcome.alerts_created);
    }

    // 4. Vision observations for press-1 over the last hour
    let analytics = VisionAnalytics::new(store.clone());
    for (minutes_ago, status) in [
        (90, MachineStatus::Active),
        (40, MachineStatus::Inactive),
        (25, MachineStatus::Active),
    ] {
        let at = now - Duration::minutes(minutes_ago);
        analytics
            .record(VisionEvent {
                id: format!("vision-{minutes_ago}"),
                camera_id: Some("cam-3".into()),
                machine_id: "press-1".into(),
                roi_id: None,
                status,
                confidence: Some(0.93),
                frame_time: at,
                created_at: at,
            })
            .await?;
    }

    let report = analytics
        .uptime(
            &VisionScope::Machine("press-1".into()),
            now - Duration::hours(1),
            now,
        )
        .await?;
    println!(
        "\npress-1 active {:.2}% of the last hour ({} ms)",
        report.percent_active, report.active_ms
    );

    Ok(())
}
