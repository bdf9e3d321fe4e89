//! Event Multicaster
//!
//! Ordered, fault-isolated, synchronous fan-out of one event to the listeners
//! registered for it.

use super::{ApplicationEvent, ApplicationListener, ErrorHandler, EventError, EventFilter, EventKind};
use std::fmt;
use std::sync::Arc;

/// A registered listener with the filter and order captured at registration
#[derive(Clone)]
pub struct Registration {
    listener: Arc<dyn ApplicationListener>,
    filter: EventFilter,
    order: i32,
}

impl Registration {
    fn new(listener: Arc<dyn ApplicationListener>) -> Self {
        Self {
            filter: listener.filter(),
            order: listener.order(),
            listener,
        }
    }

    pub fn listener(&self) -> &Arc<dyn ApplicationListener> {
        &self.listener
    }

    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn name(&self) -> &str {
        self.listener.name()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name())
            .field("filter", &self.filter)
            .field("order", &self.order)
            .finish()
    }
}

/// Delivers events to registered listeners
///
/// The Multicaster is responsible for:
/// - Keeping listeners in registration order
/// - Selecting the listeners whose filter matches an event
/// - Invoking them by ascending order, ties in registration order
/// - Passing listener errors to the error handler chosen for the broadcast
///
/// Cloning a multicaster snapshots its listener collection.
///
/// # Example
///
/// ```rust,ignore
/// use bootcast::event::{Multicaster, PropagateErrors};
///
/// let mut multicaster = Multicaster::new();
/// multicaster.register(audit_listener);
/// multicaster.register(metrics_listener);
///
/// let delivered = multicaster.broadcast(&event, &PropagateErrors)?;
/// ```
#[derive(Clone, Default)]
pub struct Multicaster {
    registrations: Vec<Registration>,
}

impl Multicaster {
    /// Create an empty Multicaster
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a Multicaster holding the given listeners in order
    pub fn with_listeners(listeners: impl IntoIterator<Item = Arc<dyn ApplicationListener>>) -> Self {
        let mut multicaster = Self::new();
        for listener in listeners {
            multicaster.register(listener);
        }
        multicaster
    }

    /// Append a listener
    ///
    /// Listeners are not de-duplicated: registering the same instance twice
    /// delivers each matching event to it twice.
    pub fn register(&mut self, listener: Arc<dyn ApplicationListener>) {
        let registration = Registration::new(listener);
        tracing::trace!(
            "Registered listener {} (order {}, filter {:?})",
            registration.name(),
            registration.order,
            registration.filter
        );
        self.registrations.push(registration);
    }

    /// Whether this exact listener instance is registered
    pub fn contains(&self, listener: &Arc<dyn ApplicationListener>) -> bool {
        self.registrations
            .iter()
            .any(|r| Arc::ptr_eq(&r.listener, listener))
    }

    /// All registered listeners, in registration order
    pub fn listeners(&self) -> Vec<Arc<dyn ApplicationListener>> {
        self.registrations
            .iter()
            .map(|r| Arc::clone(&r.listener))
            .collect()
    }

    /// The registrations an event of `kind` is delivered to, in delivery order
    pub fn matching(&self, kind: EventKind) -> Vec<&Registration> {
        let mut matched: Vec<&Registration> = self
            .registrations
            .iter()
            .filter(|r| r.filter.matches(kind))
            .collect();
        // Stable: equal orders keep registration order
        matched.sort_by_key(|r| r.order);
        matched
    }

    /// Deliver `event` to every matching listener
    ///
    /// Each listener error is passed to `handler`; if the handler returns an
    /// error the remaining listeners are skipped and the error is returned.
    /// Returns the number of listeners invoked.
    pub fn broadcast(
        &self,
        event: &ApplicationEvent,
        handler: &dyn ErrorHandler,
    ) -> Result<usize, EventError> {
        let kind = event.kind();
        let matched = self.matching(kind);
        tracing::debug!("Broadcasting {} to {} listener(s)", kind, matched.len());

        let mut invoked = 0;
        for registration in matched {
            tracing::debug!("Invoking {} for {}", registration.name(), kind);
            invoked += 1;
            if let Err(error) = registration.listener.on_event(event) {
                handler.handle_error(registration.name(), kind, error)?;
            }
        }
        Ok(invoked)
    }

    /// Get the number of registrations
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl fmt::Debug for Multicaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.registrations).finish()
    }
}
