//! Immutable trade entity

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::{SecurityId, Side, TradeId};

/// A single executed trade.
///
/// Fields are private so a `Trade` can only come out of [`Trade::new`],
/// which enforces the quantity and price invariants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    trade_id: TradeId,
    security_id: SecurityId,
    timestamp: DateTime<Utc>,
    quantity: u64,
    price: f64,
    side: Side,
}

impl Trade {
    /// Construct a trade, failing fast on a non-positive quantity or price.
    pub fn new(
        trade_id: impl Into<TradeId>,
        security_id: impl Into<SecurityId>,
        timestamp: DateTime<Utc>,
        quantity: u64,
        price: f64,
        side: Side,
    ) -> Result<Self> {
        let trade_id = trade_id.into();
        let security_id = security_id.into();

        if trade_id.as_str().trim().is_empty() {
            return Err(Error::validation("trade id must not be empty"));
        }
        if security_id.as_str().trim().is_empty() {
            return Err(Error::validation(format!(
                "trade {} has an empty security id",
                trade_id
            )));
        }
        if quantity == 0 {
            return Err(Error::validation(format!(
                "trade {} must have a positive quantity",
                trade_id
            )));
        }
        if !price.is_finite() || price <= 0.0 {
            return Err(Error::validation(format!(
                "trade {} must have a positive price, got {}",
                trade_id, price
            )));
        }

        Ok(Self {
            trade_id,
            security_id,
            timestamp,
            quantity,
            price,
            side,
        })
    }

    pub fn trade_id(&self) -> &TradeId {
        &self.trade_id
    }

    pub fn security_id(&self) -> &SecurityId {
        &self.security_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// price * quantity
    pub fn notional(&self) -> f64 {
        self.price * self.quantity as f64
    }
}
