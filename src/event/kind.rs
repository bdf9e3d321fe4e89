//! Event kinds and listener filters
//!
//! Every event carries an [`EventKind`] tag. Listeners declare an
//! [`EventFilter`] once, at registration, and the multicaster matches the two
//! without inspecting event types at runtime.

use strum_macros::{Display, EnumIter, IntoStaticStr};

/// The kind of an [`ApplicationEvent`](super::ApplicationEvent)
///
/// The first seven variants are the run phases, in the order an application
/// moves through them. The remaining variants are published by the
/// application context itself.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, IntoStaticStr,
)]
pub enum EventKind {
    /// The run has begun; nothing but the descriptor and arguments exist yet
    Starting,
    /// The environment has been prepared, no context exists yet
    EnvironmentPrepared,
    /// The context has been created and initialized but no definitions loaded
    ContextInitialized,
    /// The context is fully loaded but not refreshed
    ContextLoaded,
    /// The context has been refreshed
    Started,
    /// The application is ready; terminal on the success path
    Running,
    /// Startup failed; terminal
    Failed,
    /// Published by a context when it becomes active
    ContextRefreshed,
    /// Published by a context when it is closed
    ContextClosed,
}

impl EventKind {
    /// The run phases in sequence order, `Failed` last
    pub const RUN_PHASES: [EventKind; 7] = [
        EventKind::Starting,
        EventKind::EnvironmentPrepared,
        EventKind::ContextInitialized,
        EventKind::ContextLoaded,
        EventKind::Started,
        EventKind::Running,
        EventKind::Failed,
    ];

    /// True for the seven application run phases
    pub fn is_run_phase(self) -> bool {
        !self.is_context_event()
    }

    /// True for events published by the context itself
    pub fn is_context_event(self) -> bool {
        matches!(self, EventKind::ContextRefreshed | EventKind::ContextClosed)
    }

    /// The phase that must have fired immediately before this one on the
    /// success path.
    ///
    /// `None` for `Starting` (first phase), `Failed` (reachable from anywhere)
    /// and the context events (not sequenced).
    pub fn predecessor(self) -> Option<EventKind> {
        match self {
            EventKind::EnvironmentPrepared => Some(EventKind::Starting),
            EventKind::ContextInitialized => Some(EventKind::EnvironmentPrepared),
            EventKind::ContextLoaded => Some(EventKind::ContextInitialized),
            EventKind::Started => Some(EventKind::ContextLoaded),
            EventKind::Running => Some(EventKind::Started),
            _ => None,
        }
    }
}

/// The event-type capability a listener declares
///
/// Filters form a small hierarchy: `All` is the supertype of every event,
/// `Run` of every run phase and `Context` of every context event. `Kinds`
/// matches the listed kinds exactly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventFilter {
    #[default]
    All,
    Run,
    Context,
    Kinds(Vec<EventKind>),
}

impl EventFilter {
    /// A filter matching a single kind
    pub fn only(kind: EventKind) -> Self {
        Self::Kinds(vec![kind])
    }

    /// A filter matching exactly the given kinds
    pub fn kinds(kinds: impl IntoIterator<Item = EventKind>) -> Self {
        Self::Kinds(kinds.into_iter().collect())
    }

    /// Whether an event of `kind` should be delivered to a listener with this
    /// filter
    pub fn matches(&self, kind: EventKind) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Run => kind.is_run_phase(),
            EventFilter::Context => kind.is_context_event(),
            EventFilter::Kinds(kinds) => kinds.contains(&kind),
        }
    }
}
