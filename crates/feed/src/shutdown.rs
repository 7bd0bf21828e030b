//! Cooperative shutdown using CancellationToken
//!
//! Pipelines hold a child token and check it only at poll boundaries, so a
//! stop request never interrupts a message that is being processed. The
//! controller also remembers which component asked for the stop first.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Coordinates shutdown across the pipelines and the simulator.
///
/// ```ignore
/// let shutdown = ShutdownController::with_ctrl_c();
/// let ingestion = tokio::spawn(pipeline.run(shutdown.child_token()));
///
/// let summary = ingestion.await?;
/// shutdown.shutdown("ingestion finished");
/// ```
#[derive(Clone)]
pub struct ShutdownController {
    token: CancellationToken,
    reason: Arc<Mutex<Option<String>>>,
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownController {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            reason: Arc::new(Mutex::new(None)),
        }
    }

    /// Controller that also shuts down on Ctrl+C.
    ///
    /// Spawns a background task, so it must be called inside a runtime.
    pub fn with_ctrl_c() -> Self {
        let controller = Self::new();
        let signalled = controller.clone();

        tokio::spawn(async move {
            tokio::select! {
                result = tokio::signal::ctrl_c() => match result {
                    Ok(()) => signalled.shutdown("ctrl-c"),
                    Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C"),
                },
                _ = signalled.token.cancelled() => {}
            }
        });

        controller
    }

    /// Token cancelled together with this controller; cancelling the child
    /// alone leaves the controller running.
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Request shutdown. Only the first reason is kept.
    pub fn shutdown(&self, reason: &str) {
        {
            let mut slot = self.reason.lock();
            if slot.is_none() {
                *slot = Some(reason.to_string());
                info!(reason, "Shutdown requested");
            }
        }
        self.token.cancel();
    }

    /// Reason given by the first `shutdown` call
    pub fn reason(&self) -> Option<String> {
        self.reason.lock().clone()
    }
}
