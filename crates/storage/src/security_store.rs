//! Security store
//!
//! Holds the reference data for every known security plus the live price
//! written by the consumption pipeline.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use common::{Result, Security, SecurityId};

use crate::registry::Registry;

/// Partition name of the security store
pub const SECURITIES: &str = "securities";

/// Registry of securities keyed by id.
#[derive(Debug)]
pub struct SecurityStore {
    inner: Registry<SecurityId, Security>,
}

impl SecurityStore {
    pub fn new() -> Self {
        Self {
            inner: Registry::new(SECURITIES),
        }
    }

    pub fn add(&self, security: Security) -> Result<()> {
        self.inner.add(security.security_id.clone(), security)
    }

    pub fn get(&self, id: &SecurityId) -> Result<Security> {
        self.inner.get(id)
    }

    pub fn get_all(&self) -> HashMap<SecurityId, Security> {
        self.inner.get_all()
    }

    pub fn remove(&self, id: &SecurityId) -> Result<Security> {
        self.inner.remove(id)
    }

    pub fn clear_all(&self) {
        self.inner.clear_all()
    }

    pub fn contains(&self, id: &SecurityId) -> bool {
        self.inner.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// All security ids, sorted.
    pub fn ids(&self) -> Vec<SecurityId> {
        let mut ids: Vec<_> = self.inner.get_all().into_keys().collect();
        ids.sort();
        ids
    }

    /// Set `current_price` and `last_trade_time` together.
    ///
    /// An unknown id is a no-op: it is logged at `warn`, counted in
    /// `storage_unknown_price_updates_total`, and reported by returning
    /// `false`. Price updates arrive asynchronously and may race the
    /// reference-data load, so the caller is never failed.
    pub fn update_price(&self, id: &SecurityId, price: f64, at: DateTime<Utc>) -> bool {
        let updated = self.inner.update(id, |security| {
            security.current_price = price;
            security.last_trade_time = Some(at);
            Ok(())
        });

        match updated {
            Ok(()) => {
                debug!(security_id = %id, price, "Price updated");
                true
            }
            Err(err) => {
                warn!(security_id = %id, price, error = %err, "Price update for unknown security ignored");
                metrics::counter!("storage_unknown_price_updates_total", "store" => SECURITIES)
                    .increment(1);
                false
            }
        }
    }
}

impl Default for SecurityStore {
    fn default() -> Self {
        Self::new()
    }
}
