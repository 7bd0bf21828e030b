//! Security reference entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{SecurityClass, SecurityId};

/// A tradable stock with its reference attributes and live price.
///
/// Reference fields are fixed at construction. Only `current_price` and
/// `last_trade_time` change afterwards, through the security store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Security {
    /// Unique identity
    pub security_id: SecurityId,
    /// Ticker symbol (e.g. "TEA")
    pub symbol: String,
    /// Common or preferred
    pub class: SecurityClass,
    /// Last dividend paid, in pennies
    pub last_dividend: f64,
    /// Fixed dividend as a fraction of par; meaningful for preferred only
    pub fixed_dividend_rate: f64,
    /// Par value, in pennies
    pub par_value: f64,
    /// Latest price derived from the trade window; 0 until the first update
    #[serde(default)]
    pub current_price: f64,
    /// Time of the latest price update
    #[serde(default)]
    pub last_trade_time: Option<DateTime<Utc>>,
}

impl Security {
    /// Create a security, checking the reference-data invariants.
    pub fn new(
        security_id: impl Into<SecurityId>,
        symbol: impl Into<String>,
        class: SecurityClass,
        last_dividend: f64,
        fixed_dividend_rate: f64,
        par_value: f64,
    ) -> Result<Self> {
        let security_id = security_id.into();
        let symbol = symbol.into();

        if security_id.as_str().trim().is_empty() {
            return Err(Error::validation("security id must not be empty"));
        }
        if symbol.trim().is_empty() {
            return Err(Error::validation(format!(
                "security {} has an empty symbol",
                security_id
            )));
        }
        if !last_dividend.is_finite() || last_dividend < 0.0 {
            return Err(Error::validation(format!(
                "security {} has negative last dividend {}",
                security_id, last_dividend
            )));
        }
        if !fixed_dividend_rate.is_finite() || fixed_dividend_rate < 0.0 {
            return Err(Error::validation(format!(
                "security {} has negative fixed dividend rate {}",
                security_id, fixed_dividend_rate
            )));
        }
        if !par_value.is_finite() || par_value <= 0.0 {
            return Err(Error::validation(format!(
                "security {} must have a positive par value, got {}",
                security_id, par_value
            )));
        }

        Ok(Self {
            security_id,
            symbol,
            class,
            last_dividend,
            fixed_dividend_rate,
            par_value,
            current_price: 0.0,
            last_trade_time: None,
        })
    }

    /// Dividend used by the yield calculation.
    ///
    /// Common stock pays `last_dividend`; preferred stock pays
    /// `fixed_dividend_rate * par_value`.
    pub fn dividend(&self) -> f64 {
        match self.class {
            SecurityClass::Common => self.last_dividend,
            SecurityClass::Preferred => self.fixed_dividend_rate * self.par_value,
        }
    }

    /// Returns true once a trade-derived price has been applied
    pub fn has_price(&self) -> bool {
        self.current_price > 0.0
    }
}
