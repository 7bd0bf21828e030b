//! Trade registry
//!
//! Every trade accepted by the ingestion pipeline ends up here. The
//! pipeline talks to it through [`TradeSink`] so tests can substitute a
//! failing store.

use std::collections::HashMap;

use async_trait::async_trait;

use common::{Result, Trade, TradeId};

use crate::registry::Registry;

/// Partition name of the trade registry
pub const TRADES: &str = "trades";

/// Destination for persisted trades
#[async_trait]
pub trait TradeSink: Send + Sync {
    /// Persist `trade` under its trade id.
    async fn persist(&self, trade: Trade) -> Result<()>;

    /// Number of trades persisted so far
    fn persisted_count(&self) -> usize;
}

/// In-memory trade registry keyed by trade id.
#[derive(Debug)]
pub struct TradeRegistry {
    inner: Registry<TradeId, Trade>,
}

impl TradeRegistry {
    pub fn new() -> Self {
        Self {
            inner: Registry::new(TRADES),
        }
    }

    pub fn add(&self, trade: Trade) -> Result<()> {
        self.inner.add(trade.trade_id().clone(), trade)
    }

    pub fn get(&self, id: &TradeId) -> Result<Trade> {
        self.inner.get(id)
    }

    pub fn get_all(&self) -> HashMap<TradeId, Trade> {
        self.inner.get_all()
    }

    pub fn remove(&self, id: &TradeId) -> Result<Trade> {
        self.inner.remove(id)
    }

    pub fn clear_all(&self) {
        self.inner.clear_all()
    }

    pub fn contains(&self, id: &TradeId) -> bool {
        self.inner.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for TradeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TradeSink for TradeRegistry {
    async fn persist(&self, trade: Trade) -> Result<()> {
        self.add(trade)
    }

    fn persisted_count(&self) -> usize {
        self.len()
    }
}
