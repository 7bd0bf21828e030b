//! Financial calculators for Stockfeed
//!
//! Stateless functions over the security store and snapshot store.
//!
//! # Core Components
//!
//! - [`ratios`] - Dividend yield and price/earnings ratio
//! - [`index`] - Geometric-mean composite index and the all-share index
//! - [`vwsp`] - Volume-weighted stock price over a trade window
//! - [`report`] - Per-security quote summary built from the calculators
//!
//! # Key Invariants
//!
//! - Calculators never write state
//! - A precondition failure is an explicit error, never a silent zero
//! - Securities without a trade-derived price are left out of the all-share index

pub mod index;
pub mod ratios;
pub mod report;
pub mod vwsp;

pub use index::{all_share_index, geometric_mean_index};
pub use ratios::{dividend_yield, dividend_yield_of, pe_ratio, pe_ratio_of};
pub use report::{MarketReport, SecurityQuote};
pub use vwsp::{vwsp, vwsp_of};

pub use common::{Error, Result};
