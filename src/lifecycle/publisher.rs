//! Lifecycle Publisher
//!
//! Publishes one event per run phase, choosing the broadcaster for each and
//! handing the application's listeners over to the context at `ContextLoaded`.

use super::{Application, LifecycleError, Result};
use crate::context::RuntimeContext;
use crate::environment::Environment;
use crate::event::{
    ApplicationEvent, EventKind, LoggingErrorHandler, Multicaster, PropagateErrors, RunEvent,
    RunPayload,
};
use std::sync::Arc;

/// Publishes the events of one application run
///
/// The LifecyclePublisher is responsible for:
/// - Building the event for each phase
/// - Delivering `Starting` through `ContextLoaded` with its own bootstrap
///   multicaster
/// - Handing the application's listeners over to the context at
///   `ContextLoaded`
/// - Delegating `Started` and `Running` to the context
/// - Delivering `Failed` through the context when it is active, and through
///   the bootstrap multicaster with errors logged otherwise
///
/// Phases must be published in order, each at most once. `failed` may be
/// called at any point, after which nothing else can be published.
///
/// # Example
///
/// ```rust,ignore
/// use bootcast::lifecycle::LifecyclePublisher;
///
/// let mut publisher = LifecyclePublisher::new(Arc::clone(&app), args);
///
/// publisher.starting()?;
/// publisher.environment_prepared(environment)?;
/// publisher.context_initialized(Arc::clone(&context))?;
/// publisher.context_loaded(Arc::clone(&context))?;
/// // ... refresh the context ...
/// publisher.started(Arc::clone(&context))?;
/// publisher.running(context)?;
/// ```
pub struct LifecyclePublisher {
    application: Arc<Application>,
    args: Arc<[String]>,
    multicaster: Multicaster,
    last: Option<EventKind>,
}

impl LifecyclePublisher {
    /// Create a publisher whose bootstrap multicaster holds the application's
    /// listeners
    pub fn new<I, S>(application: Arc<Application>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let multicaster = Multicaster::with_listeners(application.listeners().iter().cloned());
        Self {
            args: args.into_iter().map(Into::into).collect(),
            application,
            multicaster,
            last: None,
        }
    }

    /// The bootstrap multicaster
    pub fn multicaster(&self) -> &Multicaster {
        &self.multicaster
    }

    /// The last phase published, if any
    pub fn last_phase(&self) -> Option<EventKind> {
        self.last
    }

    /// Publish `Starting`
    pub fn starting(&mut self) -> Result<()> {
        let event = self.begin(RunPayload::Starting)?;
        self.multicaster.broadcast(&event, &PropagateErrors)?;
        Ok(())
    }

    /// Publish `EnvironmentPrepared`
    pub fn environment_prepared(&mut self, environment: Arc<Environment>) -> Result<()> {
        let event = self.begin(RunPayload::EnvironmentPrepared { environment })?;
        self.multicaster.broadcast(&event, &PropagateErrors)?;
        Ok(())
    }

    /// Publish `ContextInitialized`
    pub fn context_initialized(&mut self, context: Arc<dyn RuntimeContext>) -> Result<()> {
        let event = self.begin(RunPayload::ContextInitialized { context })?;
        self.multicaster.broadcast(&event, &PropagateErrors)?;
        Ok(())
    }

    /// Hand the listeners over to `context`, then publish `ContextLoaded`
    /// through the bootstrap multicaster
    pub fn context_loaded(&mut self, context: Arc<dyn RuntimeContext>) -> Result<()> {
        let event = self.begin(RunPayload::ContextLoaded {
            context: Arc::clone(&context),
        })?;
        self.hand_off(&context);
        self.multicaster.broadcast(&event, &PropagateErrors)?;
        Ok(())
    }

    /// Publish `Started` through the context
    pub fn started(&mut self, context: Arc<dyn RuntimeContext>) -> Result<()> {
        let event = self.begin(RunPayload::Started {
            context: Arc::clone(&context),
        })?;
        context.publish_event(&event)?;
        Ok(())
    }

    /// Publish `Running` through the context
    pub fn running(&mut self, context: Arc<dyn RuntimeContext>) -> Result<()> {
        let event = self.begin(RunPayload::Running {
            context: Arc::clone(&context),
        })?;
        context.publish_event(&event)?;
        Ok(())
    }

    /// Publish `Failed`
    ///
    /// If `context` is present and active the event goes through it, and a
    /// listener error is returned. Otherwise the context's listeners are copied
    /// into the bootstrap multicaster, which delivers the event with every
    /// listener error logged and none returned.
    pub fn failed(
        &mut self,
        context: Option<Arc<dyn RuntimeContext>>,
        cause: Arc<anyhow::Error>,
    ) -> Result<()> {
        let event = self.begin(RunPayload::Failed {
            context: context.clone(),
            cause,
        })?;

        match context {
            Some(context) if context.is_active() => {
                tracing::debug!("Publishing {} through context {}", EventKind::Failed, context.id());
                context.publish_event(&event)?;
            }
            context => {
                if let Some(context) = context {
                    self.copy_listeners_from(context.as_ref());
                }
                self.multicaster.broadcast(&event, &LoggingErrorHandler)?;
            }
        }
        Ok(())
    }

    /// Register every application listener with `context`
    ///
    /// Context-aware listeners receive the context first. Returns the number
    /// of listeners handed over.
    fn hand_off(&self, context: &Arc<dyn RuntimeContext>) -> usize {
        let listeners = self.application.listeners();
        for listener in listeners {
            if let Some(aware) = listener.as_context_aware() {
                tracing::debug!("Supplying context {} to {}", context.id(), listener.name());
                aware.set_context(Arc::clone(context));
            }
            context.add_listener(Arc::clone(listener));
        }
        tracing::info!(
            "Handed {} listener(s) over to context {}",
            listeners.len(),
            context.id()
        );
        listeners.len()
    }

    /// Register the context's listeners that the bootstrap multicaster does
    /// not already hold
    fn copy_listeners_from(&mut self, context: &dyn RuntimeContext) {
        let Some(listeners) = context.listeners() else {
            tracing::debug!(
                "Context {} cannot enumerate its listeners; failing over with {} bootstrap listener(s)",
                context.id(),
                self.multicaster.len()
            );
            return;
        };

        let mut copied = 0;
        for listener in listeners {
            if !self.multicaster.contains(&listener) {
                self.multicaster.register(listener);
                copied += 1;
            }
        }
        tracing::debug!("Copied {} listener(s) from inactive context {}", copied, context.id());
    }

    /// Check the phase may follow the last one, record it and build its event
    fn begin(&mut self, payload: RunPayload) -> Result<ApplicationEvent> {
        let kind = payload.kind();
        let allowed = match (self.last, kind) {
            (Some(EventKind::Failed), _) => false,
            (_, EventKind::Failed) => true,
            (last, kind) => last == kind.predecessor(),
        };
        if !allowed {
            return Err(LifecycleError::invalid_transition(self.last, kind));
        }

        self.last = Some(kind);
        tracing::info!("Publishing {} for {}", kind, self.application.name());
        Ok(RunEvent::new(
            Arc::clone(&self.application),
            Arc::clone(&self.args),
            payload,
        )
        .into())
    }
}
