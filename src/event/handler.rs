//! Error handling strategies for broadcasts
//!
//! The strategy is an argument of [`Multicaster::broadcast`](super::Multicaster::broadcast),
//! never multicaster state, so one multicaster can be used with different
//! policies from one call to the next.

use super::{EventError, EventKind};

/// Decides what happens when a listener fails during a broadcast
pub trait ErrorHandler: Send + Sync {
    /// Returning `Err` aborts the broadcast; returning `Ok` continues with the
    /// next listener.
    fn handle_error(
        &self,
        listener: &str,
        event: EventKind,
        error: anyhow::Error,
    ) -> Result<(), EventError>;
}

/// Abort the broadcast and surface the listener's error to the caller
#[derive(Debug, Clone, Copy, Default)]
pub struct PropagateErrors;

impl ErrorHandler for PropagateErrors {
    fn handle_error(
        &self,
        listener: &str,
        event: EventKind,
        error: anyhow::Error,
    ) -> Result<(), EventError> {
        tracing::error!("Listener {} failed handling {}: {:#}", listener, event, error);
        Err(EventError::listener_failed(listener, event, error))
    }
}

/// Log the listener's error and carry on with the remaining listeners
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingErrorHandler;

impl ErrorHandler for LoggingErrorHandler {
    fn handle_error(
        &self,
        listener: &str,
        event: EventKind,
        error: anyhow::Error,
    ) -> Result<(), EventError> {
        tracing::warn!(
            "Error calling application listener {} for {}: {:#}",
            listener,
            event,
            error
        );
        Ok(())
    }
}
