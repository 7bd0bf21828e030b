//! Observability infrastructure for Stockfeed
//!
//! This crate provides:
//! - Structured logging via tracing
//! - Prometheus metrics
//! - Counters for the ingestion and consumption pipelines
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat, PipelineMetrics};
//!
//! init_logging("stockfeed", LogFormat::Pretty)?;
//! observability::init_metrics(9090)?;
//!
//! let metrics = PipelineMetrics::new("ingestion");
//! metrics.message_received();
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{init_metrics, PipelineMetrics};
