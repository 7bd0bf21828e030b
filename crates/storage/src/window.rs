//! Bounded per-security trade window
//!
//! Holds the most recent trades for one security in arrival order. When an
//! append pushes the length past `capacity` the oldest trades are evicted
//! from the front, so `len() <= capacity` holds after every call.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use common::{Error, Result, SecurityId, Trade, TradeRecord, WindowMessage};

/// Default number of trades kept per security
pub const DEFAULT_WINDOW_CAPACITY: usize = 15;

/// Most recent trades for a single security.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeWindow {
    security_id: SecurityId,
    window_time: DateTime<Utc>,
    capacity: usize,
    trades: VecDeque<Trade>,
}

impl TradeWindow {
    /// Create an empty window. A capacity of zero is raised to one.
    pub fn new(security_id: impl Into<SecurityId>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            security_id: security_id.into(),
            window_time: Utc::now(),
            capacity,
            trades: VecDeque::with_capacity(capacity),
        }
    }

    /// Create a window seeded with `trade`.
    pub fn seeded(trade: Trade, capacity: usize) -> Result<Self> {
        let mut window = Self::new(trade.security_id().clone(), capacity);
        window.append(trade)?;
        Ok(window)
    }

    /// Append `trade` at the tail, evicting from the head while over capacity.
    ///
    /// Fails with `TypeMismatch` when the trade belongs to another security.
    pub fn append(&mut self, trade: Trade) -> Result<()> {
        if trade.security_id() != &self.security_id {
            return Err(Error::type_mismatch(format!(
                "trade {} for {} cannot join the window of {}",
                trade.trade_id(),
                trade.security_id(),
                self.security_id
            )));
        }

        self.trades.push_back(trade);
        while self.trades.len() > self.capacity {
            self.trades.pop_front();
        }
        self.window_time = Utc::now();
        Ok(())
    }

    /// Append each trade in order.
    ///
    /// Not a transaction: when element `i` fails, elements `0..i` stay
    /// appended and the error for `i` is returned.
    pub fn append_batch(&mut self, trades: impl IntoIterator<Item = Trade>) -> Result<()> {
        for trade in trades {
            self.append(trade)?;
        }
        Ok(())
    }

    pub fn security_id(&self) -> &SecurityId {
        &self.security_id
    }

    /// Time of the last mutation
    pub fn window_time(&self) -> DateTime<Utc> {
        self.window_time
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Trades, oldest first
    pub fn trades(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter()
    }

    /// Most recent trade
    pub fn latest(&self) -> Option<&Trade> {
        self.trades.back()
    }

    /// Sum of quantities, widened so that any full window of `u64`
    /// quantities sums exactly.
    pub fn total_quantity(&self) -> u128 {
        self.trades.iter().map(|t| u128::from(t.quantity())).sum()
    }

    /// Sum of price * quantity
    pub fn total_notional(&self) -> f64 {
        self.trades.iter().map(Trade::notional).sum()
    }

    /// Wire form of the window
    pub fn to_message(&self) -> WindowMessage {
        WindowMessage {
            security_id: self.security_id.clone(),
            window_time: self.window_time,
            trades: self.trades.iter().map(TradeRecord::from).collect(),
        }
    }

    /// Rebuild a window from its wire form, keeping the published `windowTime`.
    ///
    /// Every record must be a valid trade of the message's security.
    /// Records beyond `capacity` are evicted oldest first, as with `append`.
    pub fn from_message(msg: WindowMessage, capacity: usize) -> Result<Self> {
        let mut window = Self::new(msg.security_id, capacity);
        for record in msg.trades {
            window.append(Trade::try_from(record)?)?;
        }
        window.window_time = msg.window_time;
        Ok(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Side;
    use proptest::prelude::*;

    fn trade(id: &str, security: &str, price: f64, quantity: u64) -> Trade {
        Trade::new(id, security, Utc::now(), quantity, price, Side::Buy).unwrap()
    }

    #[test]
    fn test_append_evicts_oldest() {
        let mut window = TradeWindow::new("STK1", 3);
        for i in 0..5 {
            window.append(trade(&format!("t-{i}"), "STK1", 10.0, 1)).unwrap();
        }
        let ids: Vec<_> = window.trades().map(|t| t.trade_id().as_str().to_string()).collect();
        assert_eq!(ids, vec!["t-2", "t-3", "t-4"]);
        assert_eq!(window.latest().unwrap().trade_id().as_str(), "t-4");
    }

    #[test]
    fn test_append_updates_window_time() {
        let mut window = TradeWindow::new("STK1", 3);
        let before = window.window_time();
        std::thread::sleep(std::time::Duration::from_millis(2));
        window.append(trade("t-1", "STK1", 10.0, 1)).unwrap();
        assert!(window.window_time() > before);
    }

    #[test]
    fn test_append_wrong_security_is_type_mismatch() {
        let mut window = TradeWindow::new("STK1", 3);
        let err = window.append(trade("t-1", "STK2", 10.0, 1)).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));
        assert!(window.is_empty());
    }

    #[test]
    fn test_append_batch_keeps_prefix_on_failure() {
        let mut window = TradeWindow::new("STK1", 15);
        let batch = vec![
            trade("t-1", "STK1", 10.0, 1),
            trade("t-2", "STK1", 11.0, 1),
            trade("t-3", "STK2", 12.0, 1),
            trade("t-4", "STK1", 13.0, 1),
        ];
        assert!(window.append_batch(batch).is_err());
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut window = TradeWindow::new("STK1", 0);
        window.append(trade("t-1", "STK1", 10.0, 1)).unwrap();
        window.append(trade("t-2", "STK1", 10.0, 1)).unwrap();
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn test_totals() {
        let mut window = TradeWindow::new("STK1", 15);
        window
            .append_batch(vec![trade("t-1", "STK1", 10.0, 2), trade("t-2", "STK1", 20.0, 3)])
            .unwrap();
        assert_eq!(window.total_quantity(), 5);
        assert_eq!(window.total_notional(), 80.0);
    }

    #[test]
    fn test_total_quantity_beyond_u64() {
        let mut window = TradeWindow::new("STK1", 15);
        window
            .append_batch(vec![
                trade("t-1", "STK1", 10.0, 10_000_000_000_000_000_000),
                trade("t-2", "STK1", 10.0, 10_000_000_000_000_000_000),
            ])
            .unwrap();
        assert_eq!(window.total_quantity(), 20_000_000_000_000_000_000u128);
    }

    #[test]
    fn test_message_keeps_window_time_and_order() {
        let mut window = TradeWindow::new("STK1", 15);
        window
            .append_batch(vec![trade("t-1", "STK1", 10.0, 2), trade("t-2", "STK1", 20.0, 3)])
            .unwrap();
        let msg = window.to_message();
        let rebuilt = TradeWindow::from_message(msg.clone(), 15).unwrap();
        assert_eq!(rebuilt.window_time(), msg.window_time);
        assert_eq!(rebuilt.len(), 2);
        assert_eq!(rebuilt.latest().unwrap().trade_id().as_str(), "t-2");
    }

    proptest! {
        #[test]
        fn prop_window_never_exceeds_capacity(
            capacity in 1usize..32,
            quantities in prop::collection::vec(1u64..1_000, 0..100),
        ) {
            let mut window = TradeWindow::new("STK1", capacity);
            for (i, quantity) in quantities.iter().enumerate() {
                let oldest = window.trades().next().map(|t| t.trade_id().clone());
                let was_full = window.len() == capacity;

                window.append(trade(&format!("t-{i}"), "STK1", 10.0, *quantity)).unwrap();

                prop_assert!(window.len() <= capacity);
                if let (true, Some(oldest)) = (was_full, oldest) {
                    prop_assert!(window.trades().all(|t| t.trade_id() != &oldest));
                }
            }
        }
    }
}
