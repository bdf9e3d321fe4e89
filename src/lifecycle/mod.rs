//! Lifecycle Module
//!
//! This module publishes an application run's lifecycle events to the
//! application's listeners, in order, as startup progresses.
//!
//! # Lifecycle Phases
//!
//! ```text
//! 1. Starting                  ← bootstrap multicaster
//!    ↓
//! 2. EnvironmentPrepared       ← bootstrap multicaster
//!    ↓
//! 3. ContextInitialized        ← bootstrap multicaster
//!    ↓
//! 4. ContextLoaded             ← listeners handed over to the context,
//!    ↓                            event still sent by the bootstrap multicaster
//!    (context refresh)
//!    ↓
//! 5. Started                   ← context
//!    ↓
//! 6. Running                   ← context
//!
//! Failed (from any point)      ← context if active, otherwise the bootstrap
//!                                 multicaster with listener errors logged
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use bootcast::event::{EventFilter, EventKind, FnListener};
//! use bootcast::lifecycle::Application;
//!
//! let ready = FnListener::new("ready", |_| {
//!     tracing::info!("Accepting traffic");
//!     Ok(())
//! })
//! .with_filter(EventFilter::only(EventKind::Running))
//! .arc();
//!
//! let context = Application::builder()
//!     .name("orders")
//!     .listener(ready)
//!     .build()
//!     .run(std::env::args().skip(1))?;
//! ```

mod application;
mod error;
mod publisher;

pub use application::{Application, ApplicationBuilder, ContextInitializer};
pub use error::{LifecycleError, Result};
pub use publisher::LifecyclePublisher;
