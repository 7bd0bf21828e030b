//! Dividend yield and P/E ratio

use common::{Error, Result, Security, SecurityId};
use storage::SecurityStore;

/// Dividend yield of the security `id` at `price`.
pub fn dividend_yield(store: &SecurityStore, id: &SecurityId, price: f64) -> Result<f64> {
    dividend_yield_of(&store.get(id)?, price)
}

/// Dividend yield of `security` at `price`.
///
/// Common stock uses the last dividend, preferred stock uses
/// `fixed_dividend_rate * par_value`. Fails with `InvalidInput` when the
/// price is not positive or the dividend is negative.
pub fn dividend_yield_of(security: &Security, price: f64) -> Result<f64> {
    let dividend = security.dividend();
    if !dividend.is_finite() || dividend < 0.0 {
        return Err(Error::invalid_input(format!(
            "dividend of {} cannot be negative",
            security.security_id
        )));
    }
    check_price(price)?;
    if price == 0.0 {
        return Err(Error::invalid_input("price cannot be zero"));
    }
    Ok(dividend / price)
}

/// Price/earnings ratio of the security `id` at `price`.
pub fn pe_ratio(store: &SecurityStore, id: &SecurityId, price: f64) -> Result<f64> {
    pe_ratio_of(&store.get(id)?, price)
}

/// Price/earnings ratio of `security` at `price`, using its last dividend.
///
/// Fails with `InvalidInput` for a zero or negative dividend, or a negative
/// price.
pub fn pe_ratio_of(security: &Security, price: f64) -> Result<f64> {
    let dividend = security.last_dividend;
    if !dividend.is_finite() || dividend < 0.0 {
        return Err(Error::invalid_input(format!(
            "dividend of {} cannot be negative",
            security.security_id
        )));
    }
    check_price(price)?;
    if dividend == 0.0 {
        return Err(Error::invalid_input(format!(
            "dividend of {} is zero, P/E ratio is undefined",
            security.security_id
        )));
    }
    Ok(price / dividend)
}

fn check_price(price: f64) -> Result<()> {
    if !price.is_finite() {
        return Err(Error::invalid_input(format!("price {} is not a number", price)));
    }
    if price < 0.0 {
        return Err(Error::invalid_input("price cannot be negative"));
    }
    Ok(())
}
