use crate::context::{ApplicationContext, RuntimeContext};
use crate::environment::ApplicationKind;
use crate::event::ApplicationListener;
use std::sync::Arc;

/// Builder for constructing an application context
///
/// Use this to register beans and listeners before the context is refreshed.
///
/// # Example
/// ```rust,ignore
/// let context = ContextBuilder::new()
///     .kind(ApplicationKind::Servlet)
///     .bean(Database::new())
///     .listener(audit_listener)
///     .build();
/// ```
pub struct ContextBuilder {
    context: ApplicationContext,
}

impl ContextBuilder {
    /// Create a new context builder for a standalone application
    pub fn new() -> Self {
        Self {
            context: ApplicationContext::new(ApplicationKind::Standalone),
        }
    }

    /// Set the application kind, keeping everything registered so far
    pub fn kind(mut self, kind: ApplicationKind) -> Self {
        self.context.set_kind(kind);
        self
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.context.set_display_name(display_name);
        self
    }

    /// Register a bean instance
    pub fn bean<T: 'static + Send + Sync>(self, instance: T) -> Self {
        self.context.bean_registry().register(instance);
        self
    }

    /// Register a listener with the context's own collection
    pub fn listener(self, listener: Arc<dyn ApplicationListener>) -> Self {
        self.context.add_listener(listener);
        self
    }

    /// Build the context, not yet refreshed
    pub fn build(self) -> ApplicationContext {
        self.context
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
