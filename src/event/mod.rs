//! Event Module
//!
//! Events, listeners and the multicaster that connects them.
//!
//! ```text
//!   broadcast(&event, &handler)
//!        │
//!        ├─ select registrations whose filter matches event.kind()
//!        ├─ sort by order (stable: ties keep registration order)
//!        └─ for each: listener.on_event(&event)
//!                        └─ Err → handler.handle_error(..)
//!                                   ├─ Err → abort, return it
//!                                   └─ Ok  → next listener
//! ```

mod application_event;
mod error;
mod handler;
mod kind;
mod listener;
mod multicaster;

pub use application_event::{ApplicationEvent, ContextEvent, RunEvent, RunPayload};
pub use error::EventError;
pub use handler::{ErrorHandler, LoggingErrorHandler, PropagateErrors};
pub use kind::{EventFilter, EventKind};
pub use listener::{ApplicationListener, ContextAware, FnListener};
pub use multicaster::{Multicaster, Registration};
