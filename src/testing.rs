//! Shared test fixtures: recording listeners and a scriptable context

use crate::context::RuntimeContext;
use crate::event::{
    ApplicationEvent, ApplicationListener, ContextAware, EventError, EventFilter, EventKind,
    FnListener, Multicaster, PropagateErrors, RunEvent, RunPayload,
};
use crate::lifecycle::Application;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Ordered record of `name:Kind` deliveries, shared by many listeners
#[derive(Clone, Default)]
pub(crate) struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub(crate) fn push(&self, name: &str, kind: EventKind) {
        self.push_raw(format!("{name}:{kind}"));
    }

    pub(crate) fn push_raw(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Drain and return the entries
    pub(crate) fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }

    /// Listener names only, in delivery order
    pub(crate) fn names(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .map(|e| e.split(':').next().unwrap_or_default().to_string())
            .collect()
    }

    pub(crate) fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.lock().unwrap().is_empty()
    }
}

pub(crate) fn recording(
    name: &str,
    log: &EventLog,
    filter: EventFilter,
    order: i32,
) -> Arc<dyn ApplicationListener> {
    let log = log.clone();
    let label = name.to_string();
    FnListener::new(name.to_string(), move |event| {
        log.push(&label, event.kind());
        Ok(())
    })
    .with_filter(filter)
    .with_order(order)
    .arc()
}

/// Records the delivery, then fails
pub(crate) fn failing(name: &str, log: &EventLog, order: i32) -> Arc<dyn ApplicationListener> {
    let log = log.clone();
    let label = name.to_string();
    FnListener::new(name.to_string(), move |event| {
        log.push(&label, event.kind());
        anyhow::bail!("{label} failed")
    })
    .with_order(order)
    .arc()
}

/// A recording listener that also wants the context
pub(crate) struct AwareRecorder {
    name: String,
    log: EventLog,
    contexts: Mutex<Vec<String>>,
}

impl AwareRecorder {
    pub(crate) fn new(name: &str, log: &EventLog) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            log: log.clone(),
            contexts: Mutex::new(Vec::new()),
        })
    }

    /// Ids of the contexts received, in order
    pub(crate) fn contexts(&self) -> Vec<String> {
        self.contexts.lock().unwrap().clone()
    }
}

impl ApplicationListener for AwareRecorder {
    fn on_event(&self, event: &ApplicationEvent) -> anyhow::Result<()> {
        self.log.push(&self.name, event.kind());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn as_context_aware(&self) -> Option<&dyn ContextAware> {
        Some(self)
    }
}

impl ContextAware for AwareRecorder {
    fn set_context(&self, context: Arc<dyn RuntimeContext>) {
        self.log.push_raw(format!("{}:set_context", self.name));
        self.contexts.lock().unwrap().push(context.id().to_string());
    }
}

/// A context whose activity and listener enumeration are scripted by the test
pub(crate) struct StubContext {
    id: String,
    active: AtomicBool,
    enumerable: bool,
    multicaster: Mutex<Multicaster>,
    published: Mutex<Vec<EventKind>>,
}

impl StubContext {
    pub(crate) fn new(id: &str, enumerable: bool) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            active: AtomicBool::new(false),
            enumerable,
            multicaster: Mutex::new(Multicaster::new()),
            published: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn activate(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    /// Kinds passed to `publish_event`, in order
    pub(crate) fn published(&self) -> Vec<EventKind> {
        self.published.lock().unwrap().clone()
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.multicaster.lock().unwrap().len()
    }

    pub(crate) fn holds(&self, listener: &Arc<dyn ApplicationListener>) -> bool {
        self.multicaster.lock().unwrap().contains(listener)
    }
}

impl RuntimeContext for StubContext {
    fn id(&self) -> &str {
        &self.id
    }

    fn publish_event(&self, event: &ApplicationEvent) -> Result<(), EventError> {
        self.published.lock().unwrap().push(event.kind());
        let snapshot = self.multicaster.lock().unwrap().clone();
        snapshot.broadcast(event, &PropagateErrors).map(|_| ())
    }

    fn add_listener(&self, listener: Arc<dyn ApplicationListener>) {
        self.multicaster.lock().unwrap().register(listener);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn listeners(&self) -> Option<Vec<Arc<dyn ApplicationListener>>> {
        self.enumerable
            .then(|| self.multicaster.lock().unwrap().listeners())
    }
}

/// A run event for a throwaway application
pub(crate) fn run_event(payload: RunPayload) -> ApplicationEvent {
    let application = Application::builder().name("test").build();
    RunEvent::new(application, Arc::from(Vec::<String>::new()), payload).into()
}
