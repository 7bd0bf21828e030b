//! Snapshot consumption pipeline
//!
//! Applies each published window to a local snapshot replica (replacing,
//! never merging), derives the VWSP from it and writes that price into the
//! security store. Receive timeouts are the normal "nothing new" case.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use common::{Result, SecurityId, WindowMessage};
use market_data::vwsp_of;
use observability::PipelineMetrics;
use storage::{MarketState, SecurityStore, SnapshotStore, TradeWindow};

use crate::transport::Subscriber;
use crate::StopReason;

/// Final report of a consumption run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumptionSummary {
    pub received: u64,
    pub applied: u64,
    pub failed: u64,
    pub stop_reason: StopReason,
}

/// Turns published windows into live prices.
pub struct ConsumptionPipeline<S> {
    inbound: S,
    replica: Arc<SnapshotStore>,
    securities: Arc<SecurityStore>,
    poll_timeout: Duration,
    metrics: PipelineMetrics,
}

impl<S: Subscriber> ConsumptionPipeline<S> {
    pub fn new(
        inbound: S,
        replica: Arc<SnapshotStore>,
        securities: Arc<SecurityStore>,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            inbound,
            replica,
            securities,
            poll_timeout,
            metrics: PipelineMetrics::new("consumption"),
        }
    }

    /// Pipeline over the replica and security store of `state`
    pub fn from_state(inbound: S, state: &MarketState, poll_timeout: Duration) -> Self {
        Self::new(
            inbound,
            Arc::clone(&state.replica),
            Arc::clone(&state.securities),
            poll_timeout,
        )
    }

    /// Consume windows until cancelled or the topic closes.
    pub async fn run(mut self, cancel: CancellationToken) -> ConsumptionSummary {
        info!(topic = self.inbound.topic(), "Consumption pipeline started");

        let (mut received, mut applied, mut failed) = (0u64, 0u64, 0u64);
        let stop_reason = loop {
            let polled = tokio::select! {
                biased;
                _ = cancel.cancelled() => break StopReason::Cancelled,
                polled = tokio::time::timeout(self.poll_timeout, self.inbound.recv()) => polled,
            };

            match polled {
                Ok(Ok(Some(frame))) => {
                    received += 1;
                    self.metrics.message_received();
                    match self.apply_frame(&frame) {
                        Ok(_) => applied += 1,
                        Err(err) => {
                            failed += 1;
                            warn!(kind = err.kind(), error = %err, "Window discarded");
                        }
                    }
                }
                Ok(Ok(None)) => break StopReason::ChannelClosed,
                Ok(Err(err)) => warn!(error = %err, "Receive failed"),
                Err(_elapsed) => {
                    self.metrics.idle_poll();
                    debug!("No window received");
                }
            }
        };

        info!(reason = %stop_reason, received, applied, failed, "Consumption pipeline stopped");
        ConsumptionSummary {
            received,
            applied,
            failed,
            stop_reason,
        }
    }

    /// Parse one window frame, replace the replica's window and update the price.
    ///
    /// Returns the security id and the derived price.
    pub fn apply_frame(&self, frame: &str) -> Result<(SecurityId, f64)> {
        let message = WindowMessage::from_json(frame)?;
        let window = TradeWindow::from_message(message, self.replica.window_capacity())?;
        self.apply_window(window)
    }

    /// Replace the replica's window for its security and update the price.
    pub fn apply_window(&self, window: TradeWindow) -> Result<(SecurityId, f64)> {
        let security_id = window.security_id().clone();
        let price = vwsp_of(&window)?;

        self.replica.replace(window);
        self.metrics.window_applied();

        if self.securities.update_price(&security_id, price, Utc::now()) {
            self.metrics.price_updated();
        }
        debug!(security_id = %security_id, vwsp = price, "Window applied");
        Ok((security_id, price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Security, SecurityClass, Side, Trade};

    use crate::transport::{Publisher, Topic, WINDOWS_TOPIC};

    fn state() -> MarketState {
        let state = MarketState::new(15);
        state
            .securities
            .add(Security::new("STK1", "TEA", SecurityClass::Common, 0.0, 0.0, 100.0).unwrap())
            .unwrap();
        state
    }

    fn window(security: &str, trades: &[(f64, u64)]) -> TradeWindow {
        let mut window = TradeWindow::new(security, 15);
        for (i, (price, quantity)) in trades.iter().enumerate() {
            window
                .append(Trade::new(format!("t-{i}"), security, Utc::now(), *quantity, *price, Side::Buy).unwrap())
                .unwrap();
        }
        window
    }

    #[test]
    fn test_apply_updates_price_and_replica() {
        let state = state();
        let topic = Topic::new(WINDOWS_TOPIC, 8);
        let pipeline = ConsumptionPipeline::from_state(topic.subscribe(), &state, Duration::from_secs(1));

        let frame = window("STK1", &[(10.0, 2), (20.0, 3)]).to_message().to_json().unwrap();
        let (id, price) = pipeline.apply_frame(&frame).unwrap();

        assert_eq!(id.as_str(), "STK1");
        assert!((price - 16.0).abs() < 1e-12);
        let sec = state.securities.get(&id).unwrap();
        assert!((sec.current_price - 16.0).abs() < 1e-12);
        assert!(sec.last_trade_time.is_some());
        assert_eq!(state.replica.get(&id).unwrap().len(), 2);
    }

    #[test]
    fn test_replace_not_merge() {
        let state = state();
        let topic = Topic::new(WINDOWS_TOPIC, 8);
        let pipeline = ConsumptionPipeline::from_state(topic.subscribe(), &state, Duration::from_secs(1));

        pipeline.apply_window(window("STK1", &[(10.0, 1), (10.0, 1), (10.0, 1)])).unwrap();
        pipeline.apply_window(window("STK1", &[(30.0, 1)])).unwrap();

        assert_eq!(state.replica.get(&"STK1".into()).unwrap().len(), 1);
        assert_eq!(state.securities.get(&"STK1".into()).unwrap().current_price, 30.0);
    }

    #[test]
    fn test_unknown_security_window_is_applied_without_price() {
        let state = state();
        let topic = Topic::new(WINDOWS_TOPIC, 8);
        let pipeline = ConsumptionPipeline::from_state(topic.subscribe(), &state, Duration::from_secs(1));

        pipeline.apply_window(window("STK9", &[(10.0, 1)])).unwrap();
        assert!(state.securities.get(&"STK9".into()).is_err());
        assert_eq!(state.replica.len(), 1);
    }

    #[test]
    fn test_huge_quantities_do_not_overflow() {
        let state = state();
        let topic = Topic::new(WINDOWS_TOPIC, 8);
        let pipeline = ConsumptionPipeline::from_state(topic.subscribe(), &state, Duration::from_secs(1));

        let big = 10_000_000_000_000_000_000;
        let frame = window("STK1", &[(10.0, big), (10.0, big)]).to_message().to_json().unwrap();
        let (_, price) = pipeline.apply_frame(&frame).unwrap();

        assert!((price - 10.0).abs() < 1e-9);
        assert!((state.securities.get(&"STK1".into()).unwrap().current_price - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_bad_frames_are_errors() {
        let state = state();
        let topic = Topic::new(WINDOWS_TOPIC, 8);
        let pipeline = ConsumptionPipeline::from_state(topic.subscribe(), &state, Duration::from_secs(1));

        assert!(pipeline.apply_frame("{}").is_err());
        let empty = TradeWindow::new("STK1", 15).to_message().to_json().unwrap();
        assert!(pipeline.apply_frame(&empty).is_err());
        assert_eq!(state.securities.get(&"STK1".into()).unwrap().current_price, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_are_not_errors() {
        let state = state();
        let topic = Topic::new(WINDOWS_TOPIC, 8);
        let pipeline = ConsumptionPipeline::from_state(topic.subscribe(), &state, Duration::from_millis(100));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(pipeline.run(cancel.clone()));

        tokio::time::sleep(Duration::from_secs(1)).await;
        let frame = window("STK1", &[(5.0, 1)]).to_message().to_json().unwrap();
        topic.publish(frame).await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();

        let summary = handle.await.unwrap();
        assert_eq!(summary.stop_reason, StopReason::Cancelled);
        assert_eq!(summary.applied, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(state.securities.get(&"STK1".into()).unwrap().current_price, 5.0);
    }

    #[tokio::test]
    async fn test_stops_when_topic_closes() {
        let state = state();
        let topic = Topic::new(WINDOWS_TOPIC, 8);
        let pipeline = ConsumptionPipeline::from_state(topic.subscribe(), &state, Duration::from_secs(1));
        topic.publish("garbage".into()).await.unwrap();
        drop(topic);

        let summary = pipeline.run(CancellationToken::new()).await;
        assert_eq!(summary.stop_reason, StopReason::ChannelClosed);
        assert_eq!(summary.received, 1);
        assert_eq!(summary.failed, 1);
    }
}
