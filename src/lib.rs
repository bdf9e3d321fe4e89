//! # Bootcast
//!
//! Lifecycle event publishing for application startup.
//!
//! Bootcast drives an application from construction to readiness and tells
//! the application's listeners about each phase as it happens. Before the
//! application context exists, events are delivered by a bootstrap
//! multicaster; once the context is loaded the listeners are handed over to
//! it, and later events flow through the context.
//!
//! ## Features
//!
//! - **Ordered Phases**: `Starting`, `EnvironmentPrepared`, `ContextInitialized`,
//!   `ContextLoaded`, `Started`, `Running`, and `Failed` from any point
//! - **Filtered, Prioritized Listeners**: each listener declares which events it
//!   wants and where it sorts
//! - **Context Hand-off**: context-aware listeners receive the context before
//!   `ContextLoaded` is delivered
//! - **Failure Reporting**: `Failed` reaches every listener, even when the
//!   context never became active
//! - **Layered Environment**: defaults, environment variables, `APPLICATION_JSON`
//!   and `--key=value` arguments, bindable into typed settings
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bootcast::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let ready = FnListener::new("ready", |event| {
//!         tracing::info!("{} reached", event.kind());
//!         Ok(())
//!     })
//!     .with_filter(EventFilter::only(EventKind::Running))
//!     .arc();
//!
//!     let context = Application::builder()
//!         .name("orders")
//!         .listener(ready)
//!         .build()
//!         .run(std::env::args().skip(1))?;
//!
//!     // ... serve ...
//!
//!     context.close()?;
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod environment;
pub mod error;
pub mod event;
pub mod lifecycle;

#[cfg(test)]
mod testing;

// Re-export core types
pub use context::{ApplicationContext, RuntimeContext};
pub use environment::{ApplicationKind, Environment};
pub use error::{BootcastError, Result};
pub use event::{ApplicationEvent, ApplicationListener, EventKind, Multicaster};
pub use lifecycle::{Application, LifecycleError, LifecyclePublisher};

/// Prelude module for convenient imports
///
/// ```
/// use bootcast::prelude::*;
/// ```
pub mod prelude {
    pub use crate::context::{
        ApplicationContext, BeanRegistry, ContextBuilder, ContextState, RuntimeContext,
    };
    pub use crate::environment::{ApplicationKind, Environment, MainSettings};
    pub use crate::error::{BootcastError, Result};
    pub use crate::event::{
        ApplicationEvent, ApplicationListener, ContextAware, ContextEvent, ErrorHandler,
        EventError, EventFilter, EventKind, FnListener, LoggingErrorHandler, Multicaster,
        PropagateErrors, RunEvent, RunPayload,
    };
    pub use crate::lifecycle::{
        Application, ApplicationBuilder, LifecycleError, LifecyclePublisher,
    };
    pub use std::sync::Arc;
}
