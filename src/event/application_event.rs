//! Event records
//!
//! Events are built once per phase and never mutated. Everything they carry is
//! reference counted, so cloning an event is cheap and a listener may keep one.

use super::EventKind;
use crate::context::RuntimeContext;
use crate::environment::Environment;
use crate::lifecycle::Application;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Any event a listener can receive
#[derive(Clone)]
pub enum ApplicationEvent {
    /// A run phase published by the lifecycle publisher
    Run(RunEvent),
    /// An event published by an application context
    Context(ContextEvent),
}

impl ApplicationEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ApplicationEvent::Run(event) => event.kind(),
            ApplicationEvent::Context(event) => event.kind(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ApplicationEvent::Run(event) => event.timestamp(),
            ApplicationEvent::Context(event) => event.timestamp(),
        }
    }

    /// The run event, if this is one
    pub fn as_run(&self) -> Option<&RunEvent> {
        match self {
            ApplicationEvent::Run(event) => Some(event),
            ApplicationEvent::Context(_) => None,
        }
    }

    /// The context event, if this is one
    pub fn as_context(&self) -> Option<&ContextEvent> {
        match self {
            ApplicationEvent::Run(_) => None,
            ApplicationEvent::Context(event) => Some(event),
        }
    }
}

impl fmt::Debug for ApplicationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationEvent::Run(event) => fmt::Debug::fmt(event, f),
            ApplicationEvent::Context(event) => fmt::Debug::fmt(event, f),
        }
    }
}

/// Phase-specific data of a [`RunEvent`]
#[derive(Clone)]
pub enum RunPayload {
    Starting,
    EnvironmentPrepared {
        environment: Arc<Environment>,
    },
    ContextInitialized {
        context: Arc<dyn RuntimeContext>,
    },
    ContextLoaded {
        context: Arc<dyn RuntimeContext>,
    },
    Started {
        context: Arc<dyn RuntimeContext>,
    },
    Running {
        context: Arc<dyn RuntimeContext>,
    },
    Failed {
        context: Option<Arc<dyn RuntimeContext>>,
        cause: Arc<anyhow::Error>,
    },
}

impl RunPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            RunPayload::Starting => EventKind::Starting,
            RunPayload::EnvironmentPrepared { .. } => EventKind::EnvironmentPrepared,
            RunPayload::ContextInitialized { .. } => EventKind::ContextInitialized,
            RunPayload::ContextLoaded { .. } => EventKind::ContextLoaded,
            RunPayload::Started { .. } => EventKind::Started,
            RunPayload::Running { .. } => EventKind::Running,
            RunPayload::Failed { .. } => EventKind::Failed,
        }
    }
}

/// An event for one phase of an application run
#[derive(Clone)]
pub struct RunEvent {
    application: Arc<Application>,
    args: Arc<[String]>,
    timestamp: DateTime<Utc>,
    payload: RunPayload,
}

impl RunEvent {
    pub(crate) fn new(
        application: Arc<Application>,
        args: Arc<[String]>,
        payload: RunPayload,
    ) -> Self {
        Self {
            application,
            args,
            timestamp: Utc::now(),
            payload,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// The descriptor of the application being run
    pub fn application(&self) -> &Arc<Application> {
        &self.application
    }

    /// The arguments the run was invoked with, unchanged
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn payload(&self) -> &RunPayload {
        &self.payload
    }

    /// The prepared environment (`EnvironmentPrepared` only)
    pub fn environment(&self) -> Option<&Arc<Environment>> {
        match &self.payload {
            RunPayload::EnvironmentPrepared { environment } => Some(environment),
            _ => None,
        }
    }

    /// The context reference, for phases that carry one
    pub fn context(&self) -> Option<&Arc<dyn RuntimeContext>> {
        match &self.payload {
            RunPayload::ContextInitialized { context }
            | RunPayload::ContextLoaded { context }
            | RunPayload::Started { context }
            | RunPayload::Running { context } => Some(context),
            RunPayload::Failed { context, .. } => context.as_ref(),
            RunPayload::Starting | RunPayload::EnvironmentPrepared { .. } => None,
        }
    }

    /// The failure cause (`Failed` only)
    pub fn cause(&self) -> Option<&anyhow::Error> {
        match &self.payload {
            RunPayload::Failed { cause, .. } => Some(&**cause),
            _ => None,
        }
    }
}

impl fmt::Debug for RunEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunEvent")
            .field("kind", &self.kind())
            .field("application", &self.application.name())
            .field("args", &self.args)
            .field("timestamp", &self.timestamp)
            .field("context", &self.context().map(|c| c.id().to_string()))
            .finish()
    }
}

/// An event published by an application context about itself
#[derive(Debug, Clone)]
pub struct ContextEvent {
    kind: EventKind,
    context_id: String,
    timestamp: DateTime<Utc>,
}

impl ContextEvent {
    pub(crate) fn refreshed(context_id: impl Into<String>) -> Self {
        Self::new(EventKind::ContextRefreshed, context_id)
    }

    pub(crate) fn closed(context_id: impl Into<String>) -> Self {
        Self::new(EventKind::ContextClosed, context_id)
    }

    fn new(kind: EventKind, context_id: impl Into<String>) -> Self {
        debug_assert!(kind.is_context_event());
        Self {
            kind,
            context_id: context_id.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Id of the publishing context
    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl From<RunEvent> for ApplicationEvent {
    fn from(event: RunEvent) -> Self {
        ApplicationEvent::Run(event)
    }
}

impl From<ContextEvent> for ApplicationEvent {
    fn from(event: ContextEvent) -> Self {
        ApplicationEvent::Context(event)
    }
}
