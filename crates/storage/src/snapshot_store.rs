//! Snapshot store
//!
//! One [`TradeWindow`] per security. Windows are created lazily by the
//! first trade for a security and live for the lifetime of the store.

use std::collections::HashMap;

use tracing::trace;

use common::{Result, SecurityId, Trade};

use crate::registry::Registry;
use crate::window::{TradeWindow, DEFAULT_WINDOW_CAPACITY};

/// Partition name of the snapshot store
pub const SNAPSHOTS: &str = "snapshots";

/// Registry of trade windows keyed by security id.
#[derive(Debug)]
pub struct SnapshotStore {
    inner: Registry<SecurityId, TradeWindow>,
    window_capacity: usize,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_WINDOW_CAPACITY)
    }

    /// Store whose new windows hold at most `window_capacity` trades.
    pub fn with_capacity(window_capacity: usize) -> Self {
        Self {
            inner: Registry::new(SNAPSHOTS),
            window_capacity: window_capacity.max(1),
        }
    }

    pub fn window_capacity(&self) -> usize {
        self.window_capacity
    }

    /// Append `trade` to the window of `security_id`, creating it if needed.
    ///
    /// Runs under the partition's write lock, so concurrent upserts for the
    /// same security never lose an append or evict twice. Returns a copy of
    /// the updated window.
    pub fn upsert_trade(&self, security_id: &SecurityId, trade: Trade) -> Result<TradeWindow> {
        let capacity = self.window_capacity;
        let pending = trade.clone();
        let window = self.inner.upsert_with(
            security_id.clone(),
            move || TradeWindow::seeded(trade, capacity),
            move |window| window.append(pending),
        )?;
        trace!(security_id = %security_id, len = window.len(), "Window upserted");
        Ok(window)
    }

    /// Replace the window for its security, returning the previous one.
    pub fn replace(&self, window: TradeWindow) -> Option<TradeWindow> {
        self.inner.insert_or_replace(window.security_id().clone(), window)
    }

    pub fn add(&self, window: TradeWindow) -> Result<()> {
        self.inner.add(window.security_id().clone(), window)
    }

    pub fn get(&self, security_id: &SecurityId) -> Result<TradeWindow> {
        self.inner.get(security_id)
    }

    pub fn get_all(&self) -> HashMap<SecurityId, TradeWindow> {
        self.inner.get_all()
    }

    pub fn remove(&self, security_id: &SecurityId) -> Result<TradeWindow> {
        self.inner.remove(security_id)
    }

    pub fn clear_all(&self) {
        self.inner.clear_all()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{Error, Side};
    use std::sync::Arc;

    fn trade(id: &str, security: &str) -> Trade {
        Trade::new(id, security, Utc::now(), 1, 10.0, Side::Sell).unwrap()
    }

    #[test]
    fn test_upsert_creates_then_appends() {
        let store = SnapshotStore::with_capacity(15);
        let id = SecurityId::from("STK1");

        let window = store.upsert_trade(&id, trade("t-1", "STK1")).unwrap();
        assert_eq!(window.len(), 1);

        let window = store.upsert_trade(&id, trade("t-2", "STK1")).unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_upsert_rejects_foreign_trade() {
        let store = SnapshotStore::new();
        let id = SecurityId::from("STK1");
        store.upsert_trade(&id, trade("t-1", "STK1")).unwrap();

        let err = store.upsert_trade(&id, trade("t-2", "STK2")).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));
        assert_eq!(store.get(&id).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_window_is_not_found() {
        let store = SnapshotStore::new();
        assert!(matches!(store.get(&"STK1".into()), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_replace_overwrites() {
        let store = SnapshotStore::new();
        let id = SecurityId::from("STK1");
        store.upsert_trade(&id, trade("t-1", "STK1")).unwrap();
        store.upsert_trade(&id, trade("t-2", "STK1")).unwrap();

        let fresh = TradeWindow::seeded(trade("t-9", "STK1"), 15).unwrap();
        let previous = store.replace(fresh).unwrap();
        assert_eq!(previous.len(), 2);
        assert_eq!(store.get(&id).unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_upserts_respect_capacity() {
        let store = Arc::new(SnapshotStore::with_capacity(15));
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let id = SecurityId::from("STK1");
                    for i in 0..50 {
                        store
                            .upsert_trade(&id, trade(&format!("w{worker}-{i}"), "STK1"))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.get(&"STK1".into()).unwrap().len(), 15);
    }

    #[test]
    fn test_concurrent_upserts_lose_nothing_below_capacity() {
        let store = Arc::new(SnapshotStore::with_capacity(100));
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let id = SecurityId::from("STK1");
                    for i in 0..20 {
                        store
                            .upsert_trade(&id, trade(&format!("w{worker}-{i}"), "STK1"))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.get(&"STK1".into()).unwrap().len(), 80);
    }
}
