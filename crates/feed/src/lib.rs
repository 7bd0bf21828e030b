//! Trade feed pipelines for Stockfeed
//!
//! # Components
//!
//! - [`transport`] - Publish/subscribe seam and the in-process [`Topic`]
//! - [`validation`] - Schema-checked parsing of inbound trade frames
//! - [`retry`] - Fixed-interval retry policy for persistence
//! - [`ingestion`] - Validate, persist, aggregate and republish trades
//! - [`consumption`] - Apply published windows and derive live prices
//! - [`simulator`] - Random trade publisher
//! - [`shutdown`] - Cooperative cancellation
//!
//! # Data flow
//!
//! ```text
//! trades topic -> IngestionPipeline -> windows topic -> ConsumptionPipeline -> SecurityStore
//! ```

pub mod consumption;
pub mod error;
pub mod ingestion;
pub mod retry;
pub mod shutdown;
pub mod simulator;
pub mod transport;
pub mod validation;

pub use consumption::{ConsumptionPipeline, ConsumptionSummary};
pub use error::{FeedError, FeedResult};
pub use ingestion::{IngestionPipeline, IngestionSettings, IngestionSummary, Outcome};
pub use retry::RetryPolicy;
pub use shutdown::ShutdownController;
pub use simulator::TradeSimulator;
pub use transport::{Publisher, Subscriber, Topic, TopicSubscriber, TRADES_TOPIC, WINDOWS_TOPIC};

/// Why a pipeline loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Too many consecutive polls without a frame
    IdleTimeout,
    /// The cancellation token fired
    Cancelled,
    /// Every publisher of the inbound topic has gone away
    ChannelClosed,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::IdleTimeout => write!(f, "idle_timeout"),
            StopReason::Cancelled => write!(f, "cancelled"),
            StopReason::ChannelClosed => write!(f, "channel_closed"),
        }
    }
}
