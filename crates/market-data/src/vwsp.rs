//! Volume-weighted stock price

use common::{Error, Result, SecurityId};
use storage::{SnapshotStore, TradeWindow};

/// VWSP over the current window of `id`.
///
/// Fails with `NotFound` when the security has no window yet.
pub fn vwsp(store: &SnapshotStore, id: &SecurityId) -> Result<f64> {
    vwsp_of(&store.get(id)?)
}

/// `Σ(price·quantity) / Σ(quantity)` over the trades in `window`.
///
/// Fails with `InvalidInput` when the total quantity is zero.
pub fn vwsp_of(window: &TradeWindow) -> Result<f64> {
    let quantity = window.total_quantity();
    if quantity == 0 {
        return Err(Error::invalid_input(format!(
            "window of {} has zero total quantity",
            window.security_id()
        )));
    }
    Ok(window.total_notional() / quantity as f64)
}
