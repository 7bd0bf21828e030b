//! Prometheus metrics infrastructure
//!
//! Counters are created through the `metrics` facade. Without an installed
//! recorder they are no-ops, so library code and tests never need to check
//! whether metrics are enabled.

use metrics::{counter, Counter};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize the Prometheus metrics exporter
///
/// Starts an HTTP listener on `port` exposing `/metrics`.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// Counters for one pipeline, labelled `pipeline=<name>`.
///
/// # Metrics
///
/// * `feed_messages_received_total` - Frames taken off the inbound topic
/// * `feed_trades_persisted_total` - Trades stored in the trade registry
/// * `feed_trades_rejected_total` - Frames that failed validation
/// * `feed_trades_dropped_total` - Trades abandoned after exhausting retries
/// * `feed_persist_retries_total` - Persistence retries
/// * `feed_windows_published_total` - Windows sent on the outbound topic
/// * `feed_publish_failures_total` - Windows that could not be sent
/// * `feed_aggregation_failures_total` - Persisted trades whose window update failed
/// * `feed_windows_applied_total` - Windows applied by the consumer
/// * `feed_price_updates_total` - Prices written to the security store
/// * `feed_idle_polls_total` - Polls that timed out with no frame
#[derive(Clone)]
pub struct PipelineMetrics {
    pipeline: String,
    received: Counter,
    persisted: Counter,
    rejected: Counter,
    dropped: Counter,
    retries: Counter,
    published: Counter,
    publish_failures: Counter,
    aggregation_failures: Counter,
    applied: Counter,
    price_updates: Counter,
    idle_polls: Counter,
}

impl PipelineMetrics {
    /// Create counters for the pipeline called `pipeline`
    pub fn new(pipeline: &str) -> Self {
        let name = pipeline.to_string();

        Self {
            received: counter!("feed_messages_received_total", "pipeline" => name.clone()),
            persisted: counter!("feed_trades_persisted_total", "pipeline" => name.clone()),
            rejected: counter!("feed_trades_rejected_total", "pipeline" => name.clone()),
            dropped: counter!("feed_trades_dropped_total", "pipeline" => name.clone()),
            retries: counter!("feed_persist_retries_total", "pipeline" => name.clone()),
            published: counter!("feed_windows_published_total", "pipeline" => name.clone()),
            publish_failures: counter!("feed_publish_failures_total", "pipeline" => name.clone()),
            aggregation_failures: counter!("feed_aggregation_failures_total", "pipeline" => name.clone()),
            applied: counter!("feed_windows_applied_total", "pipeline" => name.clone()),
            price_updates: counter!("feed_price_updates_total", "pipeline" => name.clone()),
            idle_polls: counter!("feed_idle_polls_total", "pipeline" => name.clone()),
            pipeline: name,
        }
    }

    pub fn message_received(&self) {
        self.received.increment(1);
    }

    pub fn trade_persisted(&self) {
        self.persisted.increment(1);
    }

    pub fn trade_rejected(&self) {
        self.rejected.increment(1);
    }

    pub fn trade_dropped(&self) {
        self.dropped.increment(1);
    }

    pub fn persist_retried(&self) {
        self.retries.increment(1);
    }

    pub fn window_published(&self) {
        self.published.increment(1);
    }

    pub fn publish_failed(&self) {
        self.publish_failures.increment(1);
    }

    pub fn aggregation_failed(&self) {
        self.aggregation_failures.increment(1);
    }

    pub fn window_applied(&self) {
        self.applied.increment(1);
    }

    pub fn price_updated(&self) {
        self.price_updates.increment(1);
    }

    pub fn idle_poll(&self) {
        self.idle_polls.increment(1);
    }

    /// Get the pipeline name
    pub fn pipeline(&self) -> &str {
        &self.pipeline
    }
}

impl std::fmt::Debug for PipelineMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineMetrics")
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_metrics_without_recorder() {
        let metrics = PipelineMetrics::new("ingestion");
        metrics.message_received();
        metrics.trade_persisted();
        metrics.idle_poll();
        assert_eq!(metrics.pipeline(), "ingestion");
    }
}
