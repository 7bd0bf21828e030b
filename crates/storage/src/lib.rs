//! In-memory stores for Stockfeed
//!
//! Every store is a named [`Registry`] partition guarded by its own lock, so
//! operations on one store never block another.
//!
//! # Modules
//!
//! - [`registry`] - Generic named keyed store
//! - [`security_store`] - Securities plus their live price
//! - [`trade_registry`] - Every persisted trade, behind the [`TradeSink`] seam
//! - [`window`] - Bounded per-security trade window
//! - [`snapshot_store`] - One window per security with atomic upsert
//! - [`context`] - The explicit [`MarketState`] passed to pipelines
//! - [`bootstrap`] - Reference-data loading

pub mod bootstrap;
pub mod context;
pub mod registry;
pub mod security_store;
pub mod snapshot_store;
pub mod trade_registry;
pub mod window;

pub use bootstrap::load_securities;
pub use context::MarketState;
pub use registry::Registry;
pub use security_store::SecurityStore;
pub use snapshot_store::SnapshotStore;
pub use trade_registry::{TradeRegistry, TradeSink};
pub use window::{TradeWindow, DEFAULT_WINDOW_CAPACITY};

pub use common::{Error, Result};
