use crate::*;
use std::collections::HashSet;
use thiserror::Error;

const LOG_FORMATS: [&str; 3] = ["pretty", "json", "compact"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Service name is required")]
    MissingServiceName,

    #[error("Invalid log format: {0}. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("No securities defined")]
    NoSecurities,

    #[error("Security {id}: {message}")]
    InvalidSecurity { id: String, message: String },

    #[error("Duplicate security id '{0}'")]
    DuplicateSecurityId(String),

    #[error("Duplicate symbol '{0}'")]
    DuplicateSymbol(String),

    #[error("{field} must be a positive integer")]
    InvalidPositiveInteger { field: String },

    #[error("Simulator: {message}")]
    InvalidSimulator { message: String },

    #[error("monitoring.metrics_port must not be 0")]
    InvalidMetricsPort,
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_config(config: &StockfeedConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_service(&config.service, &mut report);
    validate_pipelines(config, &mut report);
    validate_simulator(&config.simulator, &mut report);
    validate_securities(&config.securities, &mut report);

    if config.monitoring.metrics_port == Some(0) {
        report.add_error(ValidationError::InvalidMetricsPort);
    }

    report
}

fn validate_service(service: &ServiceConfig, report: &mut ValidationReport) {
    if service.name.trim().is_empty() {
        report.add_error(ValidationError::MissingServiceName);
    }
    if !LOG_FORMATS.contains(&service.log_format.to_lowercase().as_str()) {
        report.add_error(ValidationError::InvalidLogFormat(service.log_format.clone()));
    }
}

fn require_positive(value: u64, field: &str, report: &mut ValidationReport) {
    if value == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: field.to_string(),
        });
    }
}

fn validate_pipelines(config: &StockfeedConfig, report: &mut ValidationReport) {
    let ingestion = &config.ingestion;
    require_positive(ingestion.poll_timeout_ms, "ingestion.poll_timeout_ms", report);
    require_positive(ingestion.idle_threshold as u64, "ingestion.idle_threshold", report);
    require_positive(config.consumption.poll_timeout_ms, "consumption.poll_timeout_ms", report);
    require_positive(config.snapshot.window_capacity as u64, "snapshot.window_capacity", report);
    require_positive(config.transport.channel_capacity as u64, "transport.channel_capacity", report);

    if ingestion.max_retries == 0 {
        report.add_warning(
            "ingestion.max_retries",
            "Failed persists will be dropped without a retry",
        );
    } else if ingestion.retry_interval_ms == 0 {
        report.add_warning(
            "ingestion.retry_interval_ms",
            "Retries will run back to back with no backoff",
        );
    }
}

fn validate_simulator(sim: &SimulatorConfig, report: &mut ValidationReport) {
    if !sim.enabled {
        return;
    }
    require_positive(sim.batch_size as u64, "simulator.batch_size", report);
    require_positive(sim.max_quantity, "simulator.max_quantity", report);

    if !(sim.min_price.is_finite() && sim.min_price > 0.0) {
        report.add_error(ValidationError::InvalidSimulator {
            message: format!("min_price must be positive, got {}", sim.min_price),
        });
    }
    if !sim.max_price.is_finite() || sim.max_price < sim.min_price {
        report.add_error(ValidationError::InvalidSimulator {
            message: format!(
                "max_price {} must not be below min_price {}",
                sim.max_price, sim.min_price
            ),
        });
    }
}

fn validate_securities(securities: &[SecurityConfig], report: &mut ValidationReport) {
    if securities.is_empty() {
        report.add_error(ValidationError::NoSecurities);
        return;
    }

    let mut ids = HashSet::new();
    let mut symbols = HashSet::new();

    for security in securities {
        if !ids.insert(security.security_id.as_str()) {
            report.add_error(ValidationError::DuplicateSecurityId(
                security.security_id.clone(),
            ));
        }
        if !symbols.insert(security.symbol.to_uppercase()) {
            report.add_error(ValidationError::DuplicateSymbol(security.symbol.clone()));
        }

        if let Err(err) = security.to_security() {
            report.add_error(ValidationError::InvalidSecurity {
                id: security.security_id.clone(),
                message: err.to_string(),
            });
            continue;
        }

        let field = format!("securities.{}.fixed_dividend_rate", security.security_id);
        match security.class {
            SecurityClass::Preferred if security.fixed_dividend_rate == 0.0 => {
                report.add_warning(&field, "Preferred security has a zero fixed dividend rate");
            }
            SecurityClass::Common if security.fixed_dividend_rate != 0.0 => {
                report.add_warning(&field, "Fixed dividend rate is ignored for common securities");
            }
            _ => {}
        }
    }
}
