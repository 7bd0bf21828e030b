//! Market report
//!
//! Collects the calculator results for every security into one value that
//! callers can print or serialize. Per-security failures are kept as their
//! error text instead of aborting the report.

use chrono::{DateTime, Utc};
use serde::Serialize;

use common::{SecurityClass, SecurityId};
use storage::{SecurityStore, SnapshotStore};

use crate::index::all_share_index;
use crate::ratios::{dividend_yield_of, pe_ratio_of};
use crate::vwsp::vwsp;

/// Calculator results for one security.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityQuote {
    pub security_id: SecurityId,
    pub symbol: String,
    pub class: SecurityClass,
    pub current_price: f64,
    pub last_trade_time: Option<DateTime<Utc>>,
    pub trades_in_window: usize,
    pub vwsp: Result<f64, String>,
    pub dividend_yield: Result<f64, String>,
    pub pe_ratio: Result<f64, String>,
}

/// Calculator results for the whole market.
#[derive(Debug, Clone, Serialize)]
pub struct MarketReport {
    pub generated_at: DateTime<Utc>,
    pub quotes: Vec<SecurityQuote>,
    pub all_share_index: Result<f64, String>,
}

impl MarketReport {
    /// Build a report from the security store and a snapshot store.
    ///
    /// Ratios are evaluated at each security's current price.
    pub fn build(securities: &SecurityStore, snapshots: &SnapshotStore) -> Self {
        let mut all: Vec<_> = securities.get_all().into_values().collect();
        all.sort_by(|a, b| a.security_id.cmp(&b.security_id));

        let quotes = all
            .into_iter()
            .map(|security| {
                let price = security.current_price;
                SecurityQuote {
                    trades_in_window: snapshots
                        .get(&security.security_id)
                        .map(|w| w.len())
                        .unwrap_or(0),
                    vwsp: vwsp(snapshots, &security.security_id).map_err(|e| e.to_string()),
                    dividend_yield: dividend_yield_of(&security, price).map_err(|e| e.to_string()),
                    pe_ratio: pe_ratio_of(&security, price).map_err(|e| e.to_string()),
                    security_id: security.security_id,
                    symbol: security.symbol,
                    class: security.class,
                    current_price: price,
                    last_trade_time: security.last_trade_time,
                }
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            quotes,
            all_share_index: all_share_index(securities).map_err(|e| e.to_string()),
        }
    }

    /// Number of securities with a trade-derived price
    pub fn priced(&self) -> usize {
        self.quotes.iter().filter(|q| q.current_price > 0.0).count()
    }
}

impl std::fmt::Display for MarketReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn cell(value: &Result<f64, String>) -> String {
            match value {
                Ok(v) => format!("{:.4}", v),
                Err(e) => format!("n/a ({})", e),
            }
        }

        writeln!(f, "Market report at {}", self.generated_at.to_rfc3339())?;
        for q in &self.quotes {
            writeln!(
                f,
                "  {} {:<4} {:<9} price={:<10.2} last_trade={} window={} vwsp={} yield={} pe={}",
                q.security_id,
                q.symbol,
                q.class.to_string(),
                q.current_price,
                q.last_trade_time
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string()),
                q.trades_in_window,
                cell(&q.vwsp),
                cell(&q.dividend_yield),
                cell(&q.pe_ratio),
            )?;
        }
        write!(f, "  All-share index: {}", cell(&self.all_share_index))
    }
}
