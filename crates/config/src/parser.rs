use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Read, substitute and parse a YAML configuration file.
#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<StockfeedConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!(bytes = content.len(), "Config file read");
    parse_config(&content)
}

/// Parse a YAML configuration document after environment substitution.
pub fn parse_config(content: &str) -> Result<StockfeedConfig> {
    let substituted = substitution::substitute_env_vars(content)?;

    let config: StockfeedConfig = serde_yaml::from_str(&substituted)
        .with_context(|| "Failed to parse YAML configuration")?;

    info!(
        securities = config.securities.len(),
        "Configuration loaded successfully"
    );
    Ok(config)
}

/// Default configuration with the five reference securities.
#[instrument]
pub fn generate_default_config() -> StockfeedConfig {
    let security = |id: &str, symbol: &str, class, last_dividend, fixed_dividend_rate, par_value| {
        SecurityConfig {
            security_id: id.to_string(),
            symbol: symbol.to_string(),
            class,
            last_dividend,
            fixed_dividend_rate,
            par_value,
        }
    };

    StockfeedConfig {
        securities: vec![
            security("STK1", "TEA", SecurityClass::Common, 0.0, 0.0, 100.0),
            security("STK2", "POP", SecurityClass::Common, 8.0, 0.0, 100.0),
            security("STK3", "ALE", SecurityClass::Common, 23.0, 0.0, 60.0),
            security("STK4", "GIN", SecurityClass::Preferred, 8.0, 0.02, 100.0),
            security("STK5", "JOE", SecurityClass::Common, 13.0, 0.0, 250.0),
        ],
        ..Default::default()
    }
}

pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &StockfeedConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}
