//! Stockfeed binary
//!
//! Entry point for running the trade ingestion and consumption pipelines,
//! validating configuration, and writing a default configuration file.

use anyhow::{Context, Result};
use cli::{Cli, Commands};
use config::{generate_default_config, load_config, save_config, validate_config, StockfeedConfig};
use feed::{
    ConsumptionPipeline, IngestionPipeline, IngestionSettings, ShutdownController, Topic,
    TradeSimulator, TRADES_TOPIC, WINDOWS_TOPIC,
};
use market_data::MarketReport;
use observability::{init_logging, init_metrics, LogFormat};
use std::path::Path;
use storage::{load_securities, MarketState};
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Run {
            config,
            no_simulator,
        } => run_command(config, no_simulator).await,
        Commands::Validate { config } => {
            init_logging("stockfeed", LogFormat::Pretty)?;
            validate_command(config)
        }
        Commands::Init { output } => {
            init_logging("stockfeed", LogFormat::Pretty)?;
            init_command(output)
        }
    }
}

async fn run_command<P: AsRef<Path>>(config_path: P, no_simulator: bool) -> Result<()> {
    let config = load_config(&config_path)?;
    let format = LogFormat::parse(&config.service.log_format).unwrap_or_default();
    init_logging(&config.service.name, format)?;

    let report = validate_config(&config);
    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message, "Configuration warning");
    }
    if !report.is_valid() {
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!(
            "Cannot start due to {} configuration error(s)",
            report.errors.len()
        );
    }

    if let Some(port) = config.monitoring.metrics_port {
        init_metrics(port)?;
    }

    let state = MarketState::new(config.snapshot.window_capacity);
    let loaded = load_securities(config.securities()?, &state.securities)?;
    info!(service = %config.service.name, securities = loaded, "Market state ready");

    run_pipelines(&config, &state, no_simulator).await?;

    println!("{}", MarketReport::build(&state.securities, &state.replica));
    Ok(())
}

/// Wire the topics, run every pipeline and wait for ingestion to stop.
async fn run_pipelines(config: &StockfeedConfig, state: &MarketState, no_simulator: bool) -> Result<()> {
    let shutdown = ShutdownController::with_ctrl_c();
    let capacity = config.transport.channel_capacity;
    let trades = Topic::new(TRADES_TOPIC, capacity);
    let windows = Topic::new(WINDOWS_TOPIC, capacity);

    // Subscribers attach before anything is published.
    let consumption = ConsumptionPipeline::from_state(
        windows.subscribe(),
        state,
        config.consumption.poll_timeout(),
    );
    let ingestion = IngestionPipeline::from_state(
        trades.subscribe(),
        windows,
        state,
        IngestionSettings::from_config(&config.ingestion),
    );

    let consumer = tokio::spawn(consumption.run(shutdown.child_token()));
    let ingester = tokio::spawn(ingestion.run(shutdown.child_token()));

    let simulator_cancel = shutdown.child_token();
    let simulator = if config.simulator.enabled && !no_simulator {
        let sim = TradeSimulator::new(&config.simulator, state.securities.ids());
        let publisher = trades.clone();
        let cancel = simulator_cancel.clone();
        Some(tokio::spawn(async move { sim.run(&publisher, cancel).await }))
    } else {
        info!("Trade simulator disabled");
        None
    };

    let ingested = ingester.await.context("ingestion task failed")?;
    info!(
        reason = %ingested.stop_reason,
        received = ingested.counts.received,
        persisted = ingested.counts.persisted,
        rejected = ingested.counts.rejected,
        dropped = ingested.counts.dropped,
        total_trades = ingested.total_trades,
        "Ingestion finished"
    );

    simulator_cancel.cancel();
    if let Some(handle) = simulator {
        let sent = handle.await.context("simulator task failed")?;
        debug!(sent, "Simulator joined");
    }
    drop(trades);

    // The windows topic closed with the ingestion pipeline, so the consumer
    // drains what is buffered and stops.
    let consumed = consumer.await.context("consumption task failed")?;
    info!(
        reason = %consumed.stop_reason,
        applied = consumed.applied,
        failed = consumed.failed,
        "Consumption finished"
    );

    if let Some(reason) = shutdown.reason() {
        info!(%reason, "Stopped by shutdown request");
    }
    shutdown.shutdown("pipelines finished");
    Ok(())
}

fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    info!(path = ?config_path.as_ref(), "Validating configuration");

    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "Failed to load configuration");
            anyhow::bail!(e);
        }
    };

    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Service: {}", config.service.name);
    println!("Securities: {}", config.securities.len());
    println!("Window capacity: {}", config.snapshot.window_capacity);
    println!(
        "Simulator: {}",
        if config.simulator.enabled { "enabled" } else { "disabled" }
    );

    Ok(())
}

fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("Next steps:");
    println!("  1. Edit the securities and pipeline settings");
    println!(
        "  2. Run 'stockfeed validate --config {:?}' to check configuration",
        output_path
    );
    println!(
        "  3. Run 'stockfeed run --config {:?}' to start the pipelines",
        output_path
    );

    Ok(())
}
