//! Common types and utilities for Stockfeed
//!
//! This crate provides the shared domain entities, identifiers and error
//! taxonomy used across all Stockfeed crates.
//!
//! # Modules
//!
//! - [`error`] - Common error types
//! - [`types`] - Shared identifiers and enums (SecurityId, TradeId, Side, SecurityClass)
//! - [`security`] - The `Security` reference entity
//! - [`trade`] - The immutable `Trade` entity
//! - [`wire`] - JSON records exchanged over the trade and window topics

pub mod error;
pub mod security;
pub mod trade;
pub mod types;
pub mod wire;

pub use error::{Error, Result};
pub use security::Security;
pub use trade::Trade;
pub use types::*;
pub use wire::{TradeRecord, WindowMessage};
