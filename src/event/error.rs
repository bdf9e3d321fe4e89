//! Event delivery error types

use super::EventKind;
use thiserror::Error;

/// Errors raised while delivering events
#[derive(Debug, Error)]
pub enum EventError {
    /// A listener returned an error and the active error handler propagated it
    #[error("Listener '{listener}' failed handling {event}: {cause:#}")]
    ListenerFailed {
        /// Name of the failing listener
        listener: String,
        /// Kind of the event being delivered
        event: EventKind,
        /// The listener's error
        cause: anyhow::Error,
    },

    /// An event was published to a context that is not active
    #[error("Context {context} is not active; cannot publish {event}")]
    ContextInactive {
        /// Id of the context
        context: String,
        /// Kind of the rejected event
        event: EventKind,
    },

    /// A context operation was attempted in the wrong state
    #[error("Cannot {operation} context {context} in state {state}")]
    InvalidState {
        /// Id of the context
        context: String,
        /// The attempted operation
        operation: &'static str,
        /// The state the context was in
        state: &'static str,
    },
}

impl EventError {
    /// Create a listener failure error
    pub fn listener_failed(
        listener: impl Into<String>,
        event: EventKind,
        cause: anyhow::Error,
    ) -> Self {
        Self::ListenerFailed {
            listener: listener.into(),
            event,
            cause,
        }
    }
}
