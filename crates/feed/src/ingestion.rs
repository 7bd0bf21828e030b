//! Trade ingestion pipeline
//!
//! Per inbound frame:
//!
//! ```text
//! RECEIVED -> VALIDATED -> PERSISTED -> AGGREGATED -> PUBLISHED
//!          \-> REJECTED            \-> (retries exhausted) DROPPED
//! ```
//!
//! Per-message failures are logged and counted; the loop always moves on to
//! the next frame. The loop itself ends on idle timeout, cancellation, or a
//! closed inbound topic.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use common::{SecurityId, Trade};
use observability::PipelineMetrics;
use storage::{MarketState, SecurityStore, SnapshotStore, TradeSink};

use crate::retry::RetryPolicy;
use crate::transport::{Publisher, Subscriber};
use crate::validation::{validate_frame, InboundTrade};
use crate::StopReason;

/// Tunables for [`IngestionPipeline`]
#[derive(Debug, Clone)]
pub struct IngestionSettings {
    pub retry: RetryPolicy,
    /// Bounded wait for one inbound poll
    pub poll_timeout: Duration,
    /// Stop once the consecutive empty-poll count exceeds this
    pub idle_threshold: u32,
}

impl IngestionSettings {
    pub fn from_config(cfg: &config::IngestionConfig) -> Self {
        Self {
            retry: RetryPolicy::fixed(cfg.retry_interval(), cfg.max_retries),
            poll_timeout: cfg.poll_timeout(),
            idle_threshold: cfg.idle_threshold,
        }
    }
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self::from_config(&config::IngestionConfig::default())
    }
}

/// Terminal state of one inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Persisted, aggregated and the window sent downstream
    Published,
    /// Persisted and aggregated, but the window could not be sent
    PublishFailed,
    /// Persisted, but the window could not be updated; nothing was sent
    AggregationFailed,
    /// Failed validation; never retried
    Rejected,
    /// Persistence failed on every attempt
    Dropped,
}

/// Counters reported when the pipeline stops
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionCounts {
    pub received: u64,
    pub persisted: u64,
    pub rejected: u64,
    pub dropped: u64,
    pub published: u64,
    pub publish_failures: u64,
    pub aggregation_failures: u64,
}

/// Final report of an ingestion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionSummary {
    pub counts: IngestionCounts,
    /// Trades held by the sink at shutdown, across all runs
    pub total_trades: usize,
    pub stop_reason: StopReason,
}

/// Consumes trade frames and republishes the updated windows.
pub struct IngestionPipeline<S, P> {
    inbound: S,
    outbound: P,
    securities: Arc<SecurityStore>,
    sink: Arc<dyn TradeSink>,
    snapshots: Arc<SnapshotStore>,
    settings: IngestionSettings,
    metrics: PipelineMetrics,
    counts: IngestionCounts,
}

impl<S, P> IngestionPipeline<S, P>
where
    S: Subscriber,
    P: Publisher,
{
    /// Pipeline over explicit stores
    pub fn new(
        inbound: S,
        outbound: P,
        securities: Arc<SecurityStore>,
        sink: Arc<dyn TradeSink>,
        snapshots: Arc<SnapshotStore>,
        settings: IngestionSettings,
    ) -> Self {
        Self {
            inbound,
            outbound,
            securities,
            sink,
            snapshots,
            settings,
            metrics: PipelineMetrics::new("ingestion"),
            counts: IngestionCounts::default(),
        }
    }

    /// Pipeline writing into the authoritative stores of `state`
    pub fn from_state(inbound: S, outbound: P, state: &MarketState, settings: IngestionSettings) -> Self {
        Self::new(
            inbound,
            outbound,
            Arc::clone(&state.securities),
            state.trades.clone(),
            Arc::clone(&state.snapshots),
            settings,
        )
    }

    pub fn counts(&self) -> &IngestionCounts {
        &self.counts
    }

    /// Poll and process frames until idle, cancelled or closed.
    ///
    /// Cancellation is observed only while waiting for a frame.
    pub async fn run(mut self, cancel: CancellationToken) -> IngestionSummary {
        info!(
            topic = self.inbound.topic(),
            poll_timeout_ms = self.settings.poll_timeout.as_millis() as u64,
            idle_threshold = self.settings.idle_threshold,
            max_retries = self.settings.retry.max_retries,
            "Ingestion pipeline started"
        );

        let mut idle_polls: u32 = 0;
        let stop_reason = loop {
            let polled = tokio::select! {
                biased;
                _ = cancel.cancelled() => break StopReason::Cancelled,
                polled = tokio::time::timeout(self.settings.poll_timeout, self.inbound.recv()) => polled,
            };

            let frame = match polled {
                Ok(Ok(Some(frame))) => Some(frame),
                Ok(Ok(None)) => break StopReason::ChannelClosed,
                Ok(Err(err)) => {
                    warn!(error = %err, "Receive failed");
                    None
                }
                Err(_elapsed) => None,
            };

            let Some(frame) = frame else {
                idle_polls += 1;
                self.metrics.idle_poll();
                debug!(idle_polls, "No trade received");
                if idle_polls > self.settings.idle_threshold {
                    warn!(idle_polls, "No trades received for a while, shutting down");
                    break StopReason::IdleTimeout;
                }
                continue;
            };

            idle_polls = 0;
            self.process_frame(&frame).await;
        };

        let summary = IngestionSummary {
            counts: self.counts.clone(),
            total_trades: self.sink.persisted_count(),
            stop_reason,
        };
        info!(
            reason = %summary.stop_reason,
            total_trades = summary.total_trades,
            received = summary.counts.received,
            persisted = summary.counts.persisted,
            rejected = summary.counts.rejected,
            dropped = summary.counts.dropped,
            published = summary.counts.published,
            publish_failures = summary.counts.publish_failures,
            aggregation_failures = summary.counts.aggregation_failures,
            "Ingestion pipeline stopped"
        );
        summary
    }

    /// Take one frame through validate, persist, aggregate and publish.
    pub async fn process_frame(&mut self, frame: &str) -> Outcome {
        self.counts.received += 1;
        self.metrics.message_received();

        let trade = match validate_frame(frame, &self.securities) {
            Ok(trade) => trade,
            Err(err) => {
                let hint = InboundTrade::parse(frame)
                    .map(|t| t.trade_id_hint().to_string())
                    .unwrap_or_else(|_| "<unparsed>".to_string());
                warn!(trade_id = %hint, kind = err.kind(), error = %err, "Trade rejected");
                self.counts.rejected += 1;
                self.metrics.trade_rejected();
                return Outcome::Rejected;
            }
        };
        debug!(trade_id = %trade.trade_id(), security_id = %trade.security_id(), "Trade validated");

        if !self.persist(&trade).await {
            return Outcome::Dropped;
        }

        let security_id = trade.security_id().clone();
        let window = match self.snapshots.upsert_trade(&security_id, trade) {
            Ok(window) => window,
            Err(err) => {
                error!(security_id = %security_id, kind = err.kind(), error = %err, "Window update failed, trade stays persisted");
                self.counts.aggregation_failures += 1;
                self.metrics.aggregation_failed();
                return Outcome::AggregationFailed;
            }
        };

        self.publish(&security_id, window.to_message()).await
    }

    #[instrument(skip_all, fields(trade_id = %trade.trade_id()))]
    async fn persist(&mut self, trade: &Trade) -> bool {
        let sink = &*self.sink;
        let (result, attempts) = self
            .settings
            .retry
            .run("persist_trade", |_| sink.persist(trade.clone()))
            .await;

        for _ in 1..attempts {
            self.metrics.persist_retried();
        }

        match result {
            Ok(()) => {
                self.counts.persisted += 1;
                self.metrics.trade_persisted();
                debug!(attempts, "Trade persisted");
                true
            }
            Err(err) => {
                error!(attempts, kind = err.kind(), error = %err, "Trade dropped after exhausting retries");
                self.counts.dropped += 1;
                self.metrics.trade_dropped();
                false
            }
        }
    }

    async fn publish(&mut self, security_id: &SecurityId, message: common::WindowMessage) -> Outcome {
        let frame = match message.to_json() {
            Ok(frame) => frame,
            Err(err) => {
                error!(security_id = %security_id, error = %err, "Window serialization failed");
                self.record_publish_failure();
                return Outcome::PublishFailed;
            }
        };

        match self.outbound.publish(frame).await {
            Ok(receivers) => {
                self.counts.published += 1;
                self.metrics.window_published();
                debug!(security_id = %security_id, trades = message.trades.len(), receivers, "Window published");
                Outcome::Published
            }
            Err(err) => {
                warn!(security_id = %security_id, error = %err, "Window publish failed");
                self.record_publish_failure();
                Outcome::PublishFailed
            }
        }
    }

    fn record_publish_failure(&mut self) {
        self.counts.publish_failures += 1;
        self.metrics.publish_failed();
    }
}
