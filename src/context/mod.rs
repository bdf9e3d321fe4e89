//! Runtime Context Module
//!
//! The lifecycle publisher hands its listeners over to a runtime context at
//! `ContextLoaded` and delegates later phases to it. [`RuntimeContext`] is the
//! whole contract it relies on; [`ApplicationContext`] is the implementation
//! this crate ships.

mod application_context;
mod beans;
mod builder;

pub use application_context::{ApplicationContext, ContextState};
pub use beans::BeanRegistry;
pub use builder::ContextBuilder;

use crate::event::{ApplicationEvent, ApplicationListener, EventError};
use std::sync::Arc;

/// The runtime container an application run hands its listeners over to
pub trait RuntimeContext: Send + Sync {
    /// A stable identifier, used in logs and errors
    fn id(&self) -> &str;

    /// Deliver one event to the context's own listeners
    fn publish_event(&self, event: &ApplicationEvent) -> Result<(), EventError>;

    /// Register a listener with the context's own collection
    fn add_listener(&self, listener: Arc<dyn ApplicationListener>);

    /// Whether the context can currently publish events itself
    fn is_active(&self) -> bool;

    /// The context's listeners, in registration order
    ///
    /// Contexts that cannot enumerate their listeners return `None`.
    fn listeners(&self) -> Option<Vec<Arc<dyn ApplicationListener>>> {
        None
    }

    /// The context's bean registry, for contexts that have one
    fn beans(&self) -> Option<&BeanRegistry> {
        None
    }
}
