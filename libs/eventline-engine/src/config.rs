use serde::Deserialize;

use crate::error::EngineError;

/// Root configuration parsed from TOML.
///
/// Resource names are opaque identifiers injected by the operator; the core
/// never resolves or validates them beyond using them in diagnostics.
#[derive(Debug, Clone, Deserialize)]
pub struct EventlineConfig {
    /// HTTP API port.
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Ordered log settings.
    #[serde(default)]
    pub stream: StreamConfig,

    /// Keyed store settings.
    #[serde(default)]
    pub table: TableConfig,

    /// Delivery-loop settings shared by the persister and the observer.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Metrics sink settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

fn default_api_port() -> u16 {
    9300
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    #[serde(default = "default_stream_name")]
    pub name: String,
    /// Partition count. Delivery is FIFO within a shard, parallel across.
    #[serde(default = "default_shards")]
    pub shards: usize,
}

fn default_stream_name() -> String {
    "events".to_string()
}

fn default_shards() -> usize {
    4
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            name: default_stream_name(),
            shards: default_shards(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    #[serde(default = "default_table_name")]
    pub name: String,
}

fn default_table_name() -> String {
    "items".to_string()
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: default_table_name(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_batch_size() -> usize {
    32
}

fn default_max_attempts() -> u32 {
    5
}

fn default_retry_delay_ms() -> u64 {
    500
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// One of: `log`, `memory`, `http`.
    #[serde(default = "default_metrics_sink")]
    pub sink: String,
    /// Alternate service endpoint for the `http` sink. Opaque.
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_metrics_sink() -> String {
    "log".to_string()
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            sink: default_metrics_sink(),
            endpoint: None,
        }
    }
}

impl EventlineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{path}: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, EngineError> {
        toml::from_str(toml_str).map_err(|e| EngineError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = EventlineConfig::parse("").unwrap();
        assert_eq!(config.api_port, 9300);
        assert_eq!(config.stream.name, "events");
        assert_eq!(config.stream.shards, 4);
        assert_eq!(config.table.name, "items");
        assert_eq!(config.delivery.max_attempts, 5);
        assert_eq!(config.metrics.sink, "log");
        assert!(config.metrics.endpoint.is_none());
    }

    #[test]
    fn sections_override_defaults() {
        let config = EventlineConfig::parse(
            r#"
            api_port = 8080

            [stream]
            name = "orders"
            shards = 8

            [table]
            name = "order-items"

            [delivery]
            batch_size = 16
            max_attempts = 3
            retry_delay_ms = 50

            [metrics]
            sink = "http"
            endpoint = "http://localhost:4566/metrics"
            "#,
        )
        .unwrap();

        assert_eq!(config.api_port, 8080);
        assert_eq!(config.stream.name, "orders");
        assert_eq!(config.stream.shards, 8);
        assert_eq!(config.table.name, "order-items");
        assert_eq!(config.delivery.batch_size, 16);
        assert_eq!(
            config.metrics.endpoint.as_deref(),
            Some("http://localhost:4566/metrics")
        );
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = EventlineConfig::parse("stream = ").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
