//! Configuration for Stockfeed
//!
//! The whole service is described by one YAML document. Every section is
//! optional and falls back to the values in [`defaults`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use common::{Security, SecurityClass};

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

/// Root configuration document
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StockfeedConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub consumption: ConsumptionConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub securities: Vec<SecurityConfig>,
}

impl StockfeedConfig {
    /// Convert the configured securities into validated entities.
    pub fn securities(&self) -> common::Result<Vec<Security>> {
        self.securities.iter().map(SecurityConfig::to_security).collect()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    /// pretty, json or compact
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_format: default_log_format(),
        }
    }
}

/// Trade ingestion pipeline settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestionConfig {
    /// Retries after the first failed persist
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
    /// Bounded wait for one inbound poll
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
    /// Consecutive empty polls tolerated before shutting down
    #[serde(default = "default_idle_threshold")]
    pub idle_threshold: u32,
}

impl IngestionConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_interval_ms: default_retry_interval_ms(),
            poll_timeout_ms: default_poll_timeout_ms(),
            idle_threshold: default_idle_threshold(),
        }
    }
}

/// Snapshot consumption pipeline settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsumptionConfig {
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
}

impl ConsumptionConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

impl Default for ConsumptionConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: default_poll_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_window_capacity")]
    pub window_capacity: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            window_capacity: default_window_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportConfig {
    /// Frames buffered per topic before slow subscribers start lagging
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Random trade publisher used for demos and soak runs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulatorConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batches")]
    pub batches: usize,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_min_price")]
    pub min_price: f64,
    #[serde(default = "default_max_price")]
    pub max_price: f64,
    #[serde(default = "default_max_quantity")]
    pub max_quantity: u64,
}

impl SimulatorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            batch_size: default_batch_size(),
            batches: default_batches(),
            interval_ms: default_interval_ms(),
            min_price: default_min_price(),
            max_price: default_max_price(),
            max_quantity: default_max_quantity(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MonitoringConfig {
    /// Prometheus exporter port; disabled when absent
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

/// Reference data for one security
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecurityConfig {
    pub security_id: String,
    pub symbol: String,
    #[serde(default)]
    pub class: SecurityClass,
    #[serde(default)]
    pub last_dividend: f64,
    #[serde(default)]
    pub fixed_dividend_rate: f64,
    pub par_value: f64,
}

impl SecurityConfig {
    pub fn to_security(&self) -> common::Result<Security> {
        Security::new(
            self.security_id.as_str(),
            self.symbol.as_str(),
            self.class,
            self.last_dividend,
            self.fixed_dividend_rate,
            self.par_value,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let yaml = r#"
securities:
  - security_id: STK1
    symbol: TEA
    par_value: 100
"#;
        let cfg: StockfeedConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.service.name, "stockfeed");
        assert_eq!(cfg.ingestion.max_retries, 3);
        assert_eq!(cfg.ingestion.idle_threshold, 10);
        assert_eq!(cfg.ingestion.poll_timeout(), Duration::from_secs(1));
        assert_eq!(cfg.snapshot.window_capacity, 15);
        assert_eq!(cfg.simulator.batch_size, 5);
        assert!(cfg.monitoring.metrics_port.is_none());
        assert_eq!(cfg.securities[0].class, SecurityClass::Common);
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
service:
  name: feed-a
  log_format: json
ingestion:
  max_retries: 5
  retry_interval_ms: 250
  poll_timeout_ms: 500
  idle_threshold: 4
consumption:
  poll_timeout_ms: 200
snapshot:
  window_capacity: 20
transport:
  channel_capacity: 64
simulator:
  enabled: false
monitoring:
  metrics_port: 9100
securities:
  - security_id: STK4
    symbol: GIN
    class: preferred
    last_dividend: 8
    fixed_dividend_rate: 0.02
    par_value: 100
"#;
        let cfg: StockfeedConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.service.log_format, "json");
        assert_eq!(cfg.ingestion.retry_interval(), Duration::from_millis(250));
        assert_eq!(cfg.consumption.poll_timeout_ms, 200);
        assert_eq!(cfg.transport.channel_capacity, 64);
        assert!(!cfg.simulator.enabled);
        assert_eq!(cfg.monitoring.metrics_port, Some(9100));

        let securities = cfg.securities().unwrap();
        assert_eq!(securities[0].class, SecurityClass::Preferred);
        assert!((securities[0].dividend() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_security_fails_conversion() {
        let cfg = StockfeedConfig {
            securities: vec![SecurityConfig {
                security_id: "STK1".into(),
                symbol: "TEA".into(),
                class: SecurityClass::Common,
                last_dividend: 0.0,
                fixed_dividend_rate: 0.0,
                par_value: 0.0,
            }],
            ..Default::default()
        };
        assert!(cfg.securities().is_err());
    }
}
