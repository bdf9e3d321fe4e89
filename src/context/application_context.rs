//! Application Context
//!
//! The runtime container an application run hands its listeners over to.

use super::{BeanRegistry, RuntimeContext};
use crate::environment::ApplicationKind;
use crate::event::{
    ApplicationEvent, ApplicationListener, ContextEvent, EventError, Multicaster, PropagateErrors,
};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use strum_macros::{Display, IntoStaticStr};
use uuid::Uuid;

/// Where a context is in its own lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum ContextState {
    /// Built, not yet refreshed; cannot publish events
    Created,
    /// Refreshed and publishing
    Active,
    /// Closed; cannot publish events
    Closed,
}

/// A bean registry with its own listener collection and event publisher
///
/// The context only publishes while it is [`ContextState::Active`]. Events are
/// delivered from a snapshot of the listener collection, so listeners may
/// register further listeners while handling an event.
///
/// # Example
///
/// ```rust,ignore
/// use bootcast::context::ApplicationContext;
///
/// let context = ApplicationContext::builder()
///     .display_name("orders")
///     .bean(OrderRepository::new())
///     .build();
///
/// context.add_listener(audit_listener);
/// context.refresh()?;                 // publishes ContextRefreshed
/// context.publish_event(&event)?;
/// context.close()?;                   // publishes ContextClosed
/// ```
pub struct ApplicationContext {
    id: String,
    display_name: String,
    kind: ApplicationKind,
    beans: BeanRegistry,
    multicaster: RwLock<Multicaster>,
    state: RwLock<ContextState>,
}

impl ApplicationContext {
    /// Create a context with no beans and no listeners
    pub fn new(kind: ApplicationKind) -> Self {
        let id = Uuid::new_v4().to_string();
        Self {
            display_name: format!("context-{}", &id[..8]),
            id,
            kind,
            beans: BeanRegistry::new(),
            multicaster: RwLock::new(Multicaster::new()),
            state: RwLock::new(ContextState::Created),
        }
    }

    /// Create a new context builder
    pub fn builder() -> super::ContextBuilder {
        super::ContextBuilder::new()
    }

    pub(crate) fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.display_name = display_name.into();
    }

    pub(crate) fn set_kind(&mut self, kind: ApplicationKind) {
        self.kind = kind;
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The kind of application this context was created for
    pub fn kind(&self) -> ApplicationKind {
        self.kind
    }

    /// The context's bean registry
    pub fn bean_registry(&self) -> &BeanRegistry {
        &self.beans
    }

    pub fn state(&self) -> ContextState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.multicaster
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Activate the context and publish `ContextRefreshed`
    ///
    /// # Errors
    ///
    /// Fails if the context is not in [`ContextState::Created`], or if a
    /// listener of `ContextRefreshed` fails. In the latter case the context
    /// goes back to [`ContextState::Created`] and is not active.
    pub fn refresh(&self) -> Result<(), EventError> {
        self.transition("refresh", ContextState::Created, ContextState::Active)?;
        if let Err(err) = self.publish_event(&ContextEvent::refreshed(&self.id).into()) {
            *self.state.write().unwrap_or_else(PoisonError::into_inner) = ContextState::Created;
            tracing::warn!("Refresh of context {} failed: {}", self.display_name, err);
            return Err(err);
        }
        tracing::info!("Refreshed context {} ({} beans)", self.display_name, self.beans.len());
        Ok(())
    }

    /// Publish `ContextClosed` if active, then close the context
    ///
    /// Closing an already closed context is a no-op. The context is closed
    /// even if a listener of `ContextClosed` fails; that error is returned.
    pub fn close(&self) -> Result<(), EventError> {
        let published = match self.state() {
            ContextState::Closed => return Ok(()),
            ContextState::Active => self.publish_event(&ContextEvent::closed(&self.id).into()),
            ContextState::Created => Ok(()),
        };
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = ContextState::Closed;
        tracing::info!("Closed context {}", self.display_name);
        published
    }

    fn transition(
        &self,
        operation: &'static str,
        from: ContextState,
        to: ContextState,
    ) -> Result<(), EventError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if *state != from {
            return Err(EventError::InvalidState {
                context: self.id.clone(),
                operation,
                state: (*state).into(),
            });
        }
        *state = to;
        Ok(())
    }
}

impl RuntimeContext for ApplicationContext {
    fn id(&self) -> &str {
        &self.id
    }

    fn publish_event(&self, event: &ApplicationEvent) -> Result<(), EventError> {
        if !self.is_active() {
            return Err(EventError::ContextInactive {
                context: self.id.clone(),
                event: event.kind(),
            });
        }
        let snapshot = self
            .multicaster
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        snapshot.broadcast(event, &PropagateErrors).map(|_| ())
    }

    fn add_listener(&self, listener: Arc<dyn ApplicationListener>) {
        self.multicaster
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(listener);
    }

    fn is_active(&self) -> bool {
        self.state() == ContextState::Active
    }

    fn listeners(&self) -> Option<Vec<Arc<dyn ApplicationListener>>> {
        Some(
            self.multicaster
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .listeners(),
        )
    }

    fn beans(&self) -> Option<&BeanRegistry> {
        Some(&self.beans)
    }
}

impl fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("kind", &self.kind)
            .field("state", &self.state())
            .field("beans", &self.beans)
            .field("listeners", &self.listener_count())
            .finish()
    }
}
