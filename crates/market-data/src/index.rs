//! Composite indices

use tracing::debug;

use common::{Error, Result};
use storage::SecurityStore;

/// Geometric mean of `prices`.
///
/// Computed as `exp(mean(ln p))` so large inputs cannot overflow the
/// product. Fails with `InvalidInput` on an empty slice or any price that
/// is not strictly positive.
pub fn geometric_mean_index(prices: &[f64]) -> Result<f64> {
    if prices.is_empty() {
        return Err(Error::invalid_input("price list cannot be empty"));
    }
    if let Some(bad) = prices.iter().find(|p| !(p.is_finite() && **p > 0.0)) {
        return Err(Error::invalid_input(format!(
            "all prices must be positive, got {}",
            bad
        )));
    }

    let log_sum: f64 = prices.iter().map(|p| p.ln()).sum();
    Ok((log_sum / prices.len() as f64).exp())
}

/// All-share index: geometric mean of every security's current price.
///
/// Securities still at a current price of zero (no trade applied yet) are
/// excluded. If none has a price the index is undefined and this fails with
/// `InvalidInput`.
pub fn all_share_index(store: &SecurityStore) -> Result<f64> {
    let all = store.get_all();
    let prices: Vec<f64> = all
        .values()
        .filter(|s| s.has_price())
        .map(|s| s.current_price)
        .collect();

    debug!(
        priced = prices.len(),
        excluded = all.len() - prices.len(),
        "Computing all-share index"
    );

    if prices.is_empty() {
        return Err(Error::invalid_input(
            "no security has a trade-derived price yet",
        ));
    }
    geometric_mean_index(&prices)
}
