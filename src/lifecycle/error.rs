//! Lifecycle-specific error types

use crate::error::BootcastError;
use crate::event::{EventError, EventKind};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while publishing lifecycle phases
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A phase was published out of sequence
    #[error("Cannot publish {attempted} after {previous}")]
    InvalidTransition {
        /// The last phase published, or `construction`
        previous: &'static str,
        /// The phase that was attempted
        attempted: EventKind,
    },

    /// Delivering the phase event failed
    #[error(transparent)]
    Event(#[from] EventError),

    /// Preparing the environment or context failed
    #[error(transparent)]
    Setup(#[from] BootcastError),

    /// The application failed to start; the `Failed` event has been published
    #[error("Application startup failed: {0:#}")]
    StartupFailed(Arc<anyhow::Error>),
}

impl LifecycleError {
    /// Create an invalid transition error
    pub fn invalid_transition(previous: Option<EventKind>, attempted: EventKind) -> Self {
        Self::InvalidTransition {
            previous: previous.map_or("construction", Into::into),
            attempted,
        }
    }

    /// The startup failure cause, for [`LifecycleError::StartupFailed`]
    pub fn cause(&self) -> Option<&anyhow::Error> {
        match self {
            Self::StartupFailed(cause) => Some(&**cause),
            _ => None,
        }
    }
}

/// A specialized Result type for lifecycle operations
pub type Result<T> = std::result::Result<T, LifecycleError>;
