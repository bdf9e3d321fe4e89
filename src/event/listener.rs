//! Listener traits
//!
//! These traits define the contract for anything that wants to observe the
//! application lifecycle.

use super::{ApplicationEvent, EventFilter};
use crate::context::RuntimeContext;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Observes application events
///
/// A listener declares which events it is interested in through
/// [`filter`](Self::filter) and where it sorts through [`order`](Self::order).
/// Both are read once, when the listener is registered with a
/// [`Multicaster`](super::Multicaster).
///
/// # Example
///
/// ```rust,ignore
/// use bootcast::event::{ApplicationEvent, ApplicationListener, EventFilter, EventKind};
///
/// struct BannerPrinter;
///
/// impl ApplicationListener for BannerPrinter {
///     fn on_event(&self, event: &ApplicationEvent) -> anyhow::Result<()> {
///         println!("== {} ==", event.kind());
///         Ok(())
///     }
///
///     fn filter(&self) -> EventFilter {
///         EventFilter::only(EventKind::Starting)
///     }
/// }
/// ```
pub trait ApplicationListener: Send + Sync + 'static {
    /// Handle one event
    ///
    /// Returning an error aborts the rest of the broadcast unless the
    /// broadcast was started with a non-propagating error handler.
    fn on_event(&self, event: &ApplicationEvent) -> anyhow::Result<()>;

    /// The events this listener accepts. Defaults to every event.
    fn filter(&self) -> EventFilter {
        EventFilter::All
    }

    /// Sort key within a broadcast; lower values are invoked first
    fn order(&self) -> i32 {
        0
    }

    /// Name used in logs and errors
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Listeners that want the context reference return `Some(self)`
    fn as_context_aware(&self) -> Option<&dyn ContextAware> {
        None
    }
}

/// Receives the application context once it has been loaded
///
/// The reference is supplied during the hand-off at `ContextLoaded`, before
/// any later event is dispatched. Implementors need interior mutability to
/// keep it, typically a `OnceLock`.
pub trait ContextAware: Send + Sync {
    fn set_context(&self, context: Arc<dyn RuntimeContext>);
}

/// Closure-backed listener
///
/// Wraps a closure `F: Fn(&ApplicationEvent) -> anyhow::Result<()>` together
/// with a name, a filter and an order.
pub struct FnListener<F> {
    name: Cow<'static, str>,
    filter: EventFilter,
    order: i32,
    f: F,
}

impl<F> FnListener<F>
where
    F: Fn(&ApplicationEvent) -> anyhow::Result<()> + Send + Sync + 'static,
{
    /// Creates a listener accepting every event with order 0
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            filter: EventFilter::All,
            order: 0,
            f,
        }
    }

    /// Restrict the events this listener accepts
    pub fn with_filter(mut self, filter: EventFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the sort key
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Wrap into a shared handle ready for registration
    pub fn arc(self) -> Arc<dyn ApplicationListener> {
        Arc::new(self)
    }
}

impl<F> ApplicationListener for FnListener<F>
where
    F: Fn(&ApplicationEvent) -> anyhow::Result<()> + Send + Sync + 'static,
{
    fn on_event(&self, event: &ApplicationEvent) -> anyhow::Result<()> {
        (self.f)(event)
    }

    fn filter(&self) -> EventFilter {
        self.filter.clone()
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for FnListener<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnListener")
            .field("name", &self.name)
            .field("filter", &self.filter)
            .field("order", &self.order)
            .finish()
    }
}
