//! Explicit market state shared by the pipelines and calculators

use std::sync::Arc;

use crate::security_store::SecurityStore;
use crate::snapshot_store::SnapshotStore;
use crate::trade_registry::TradeRegistry;

/// Handles to every store, constructed once and passed explicitly.
///
/// The ingestion side writes `snapshots`; the consumption side keeps its
/// own replica in `replica` and writes prices into `securities`.
#[derive(Debug, Clone)]
pub struct MarketState {
    pub securities: Arc<SecurityStore>,
    pub trades: Arc<TradeRegistry>,
    pub snapshots: Arc<SnapshotStore>,
    pub replica: Arc<SnapshotStore>,
}

impl MarketState {
    /// Fresh, empty stores with windows of `window_capacity` trades.
    pub fn new(window_capacity: usize) -> Self {
        Self {
            securities: Arc::new(SecurityStore::new()),
            trades: Arc::new(TradeRegistry::new()),
            snapshots: Arc::new(SnapshotStore::with_capacity(window_capacity)),
            replica: Arc::new(SnapshotStore::with_capacity(window_capacity)),
        }
    }
}

impl Default for MarketState {
    fn default() -> Self {
        Self::new(crate::window::DEFAULT_WINDOW_CAPACITY)
    }
}
