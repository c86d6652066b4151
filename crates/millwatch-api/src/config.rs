// Server configuration loaded from the environment

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use millwatch_core::IngestConfig;

/// Startup configuration for the API server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
    pub bind_addr: String,
    /// Example: API_PREFIX="/api" results in routes like /api/sensors
    pub api_prefix: String,
    pub cors_origins: Vec<HeaderValue>,
    pub ingest: IngestConfig,
    pub uptime_window: chrono::Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL environment variable required")?;

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        let run_migrations = std::env::var("RUN_MIGRATIONS")
            .map(|s| parse_flag(&s))
            .unwrap_or(true);

        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:9000".to_string());

        let api_prefix = std::env::var("API_PREFIX").unwrap_or_default();

        // Only needed when the UI is served from a different origin than the API
        let cors_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .map(|s| parse_origins(&s))
            .unwrap_or_default();

        let uptime_window =
            parse_window_hours(std::env::var("UPTIME_DEFAULT_WINDOW_HOURS").ok().as_deref());

        Ok(Self {
            database_url,
            max_connections,
            run_migrations,
            bind_addr,
            api_prefix,
            cors_origins,
            ingest: IngestConfig::from_env(),
            uptime_window,
        })
    }
}

/// Longest accepted default uptime window
const MAX_WINDOW_HOURS: i64 = 24 * 366 * 100;

/// Positive hour count up to `MAX_WINDOW_HOURS`; anything else falls back to 24h
fn parse_window_hours(value: Option<&str>) -> chrono::Duration {
    value
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|h| (1..=MAX_WINDOW_HOURS).contains(h))
        .and_then(chrono::Duration::try_hours)
        .unwrap_or_else(default_window)
}

fn default_window() -> chrono::Duration {
    chrono::Duration::try_hours(24).unwrap_or_default()
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

fn parse_origins(value: &str) -> Vec<HeaderValue> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(" OFF "));
    }

    #[test]
    fn test_parse_window_hours() {
        assert_eq!(parse_window_hours(Some("6")), chrono::Duration::hours(6));
        assert_eq!(parse_window_hours(None), chrono::Duration::hours(24));
        assert_eq!(parse_window_hours(Some("0")), chrono::Duration::hours(24));
        assert_eq!(parse_window_hours(Some("-3")), chrono::Duration::hours(24));
        assert_eq!(parse_window_hours(Some("abc")), chrono::Duration::hours(24));
        assert_eq!(
            parse_window_hours(Some("9223372036854775807")),
            chrono::Duration::hours(24)
        );
        assert_eq!(
            parse_window_hours(Some("2562047788015")),
            chrono::Duration::hours(24)
        );
    }

    #[test]
    fn test_parse_origins() {
        let origins = parse_origins("https://ops.example.com, https://line.example.com,,");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[1], "https://line.example.com");
        assert!(parse_origins("").is_empty());
    }
}
