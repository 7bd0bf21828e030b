//! Random trade publisher
//!
//! Emits `batches` rounds of `batch_size` trades on the trades topic,
//! pausing between rounds. Frames use the same camelCase wire shape the
//! ingestion pipeline validates.

use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use common::{SecurityId, Side, TradeRecord};

use crate::transport::Publisher;

/// Publishes random trades for a fixed set of securities.
#[derive(Debug, Clone)]
pub struct TradeSimulator {
    securities: Vec<SecurityId>,
    batch_size: usize,
    batches: usize,
    interval: Duration,
    min_price: f64,
    max_price: f64,
    max_quantity: u64,
}

impl TradeSimulator {
    pub fn new(cfg: &config::SimulatorConfig, securities: Vec<SecurityId>) -> Self {
        let (min_price, max_price) = if cfg.min_price <= cfg.max_price {
            (cfg.min_price, cfg.max_price)
        } else {
            (cfg.max_price, cfg.min_price)
        };
        Self {
            securities,
            batch_size: cfg.batch_size,
            batches: cfg.batches,
            interval: cfg.interval(),
            min_price,
            max_price,
            max_quantity: cfg.max_quantity.max(1),
        }
    }

    /// One random trade frame
    pub fn next_record(&self) -> Option<TradeRecord> {
        if self.securities.is_empty() {
            return None;
        }
        let security_id = &self.securities[fastrand::usize(..self.securities.len())];
        let raw = self.min_price + fastrand::f64() * (self.max_price - self.min_price);
        let price = ((raw * 100.0).round() / 100.0).clamp(self.min_price, self.max_price);
        let side = if fastrand::bool() { Side::Buy } else { Side::Sell };

        Some(TradeRecord {
            trade_id: Uuid::new_v4().to_string().into(),
            timestamp: Utc::now().to_rfc3339(),
            side,
            security_id: security_id.clone(),
            price,
            quantity: fastrand::u64(1..=self.max_quantity),
        })
    }

    /// Publish every batch, returning the number of frames sent.
    pub async fn run<P: Publisher + ?Sized>(&self, publisher: &P, cancel: CancellationToken) -> usize {
        if self.securities.is_empty() {
            warn!("Simulator has no securities to trade");
            return 0;
        }
        info!(
            topic = publisher.topic(),
            batches = self.batches,
            batch_size = self.batch_size,
            "Trade simulator started"
        );

        let mut sent = 0;
        for batch in 0..self.batches {
            if cancel.is_cancelled() {
                break;
            }
            for record in (0..self.batch_size).filter_map(|_| self.next_record()) {
                let frame = match serde_json::to_string(&record) {
                    Ok(frame) => frame,
                    Err(err) => {
                        warn!(error = %err, "Failed to encode simulated trade");
                        continue;
                    }
                };
                match publisher.publish(frame).await {
                    Ok(_) => sent += 1,
                    Err(err) => warn!(error = %err, trade_id = %record.trade_id, "Simulated trade not delivered"),
                }
            }
            debug!(batch, sent, "Batch published");

            if batch + 1 < self.batches {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.interval) => {}
                }
            }
        }

        info!(sent, "Trade simulator finished");
        sent
    }
}
