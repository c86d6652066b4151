// Postgres storage layer with sqlx
//
// This crate provides database implementations for core traits:
// - Database implements SensorStore, BindingStore, RuleStore, AlertStore
//   and VisionEventStore

pub mod models;
pub mod repositories;
pub mod stores;

pub use models::*;
pub use repositories::*;
