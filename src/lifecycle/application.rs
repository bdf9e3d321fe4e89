//! Application Bootstrap
//!
//! Describes an application and drives a run of it through every lifecycle
//! phase.

use super::{LifecycleError, LifecyclePublisher, Result};
use crate::context::{ApplicationContext, RuntimeContext};
use crate::environment::{ApplicationKind, Environment, MainSettings};
use crate::event::ApplicationListener;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Prepares a freshly created context before `ContextInitialized` is published
pub type ContextInitializer = Arc<dyn Fn(&ApplicationContext) -> anyhow::Result<()> + Send + Sync>;

/// Describes an application: its listeners and how its context is set up
///
/// # Example
///
/// ```rust,ignore
/// use bootcast::lifecycle::Application;
///
/// fn main() -> anyhow::Result<()> {
///     let context = Application::builder()
///         .name("orders")
///         .listener(audit_listener)
///         .initializer(|context| {
///             context.bean_registry().register(OrderRepository::new());
///             Ok(())
///         })
///         .build()
///         .run(std::env::args().skip(1))?;
///
///     // ... serve ...
///
///     context.close()?;
///     Ok(())
/// }
/// ```
pub struct Application {
    name: String,
    kind: ApplicationKind,
    listeners: Vec<Arc<dyn ApplicationListener>>,
    default_properties: Vec<(String, String)>,
    initializers: Vec<ContextInitializer>,
    include_system_environment: bool,
}

impl Application {
    /// Create a new application builder
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ApplicationKind {
        self.kind
    }

    /// The listeners, in the order they were added
    pub fn listeners(&self) -> &[Arc<dyn ApplicationListener>] {
        &self.listeners
    }

    /// Run the application through every lifecycle phase
    ///
    /// This will:
    /// 1. Publish `Starting`
    /// 2. Prepare the environment and publish `EnvironmentPrepared`
    /// 3. Create the context, apply initializers, publish `ContextInitialized`
    /// 4. Hand listeners over and publish `ContextLoaded`
    /// 5. Refresh the context
    /// 6. Publish `Started` and `Running` through the context
    ///
    /// # Errors
    ///
    /// A failure publishing `Starting` is returned as is. Any later failure
    /// publishes `Failed`, closes the context if it was created, and is
    /// returned as [`LifecycleError::StartupFailed`].
    pub fn run<I, S>(self: Arc<Self>, args: I) -> Result<Arc<ApplicationContext>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let started_at = Instant::now();
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut publisher = LifecyclePublisher::new(Arc::clone(&self), args.iter().cloned());

        tracing::info!("Starting application {}", self.name);
        publisher.starting()?;

        let mut created: Option<Arc<ApplicationContext>> = None;
        match self.launch(&mut publisher, &args, &mut created) {
            Ok((context, settings)) => {
                if settings.log_startup_info {
                    tracing::info!(
                        "Started {} in {:.3}s",
                        self.name,
                        started_at.elapsed().as_secs_f64()
                    );
                }
                Ok(context)
            }
            Err(err) => Err(self.report_failure(&mut publisher, created, err)),
        }
    }

    /// Everything after `Starting`; `created` holds the context once it exists
    fn launch(
        &self,
        publisher: &mut LifecyclePublisher,
        args: &[String],
        created: &mut Option<Arc<ApplicationContext>>,
    ) -> Result<(Arc<ApplicationContext>, MainSettings)> {
        let environment = Arc::new(Environment::prepare(
            self.default_properties.iter().cloned(),
            self.include_system_environment,
            args,
        )?);
        publisher.environment_prepared(Arc::clone(&environment))?;

        let settings: MainSettings = environment.bind(MainSettings::PREFIX)?;
        let kind = settings.kind.unwrap_or(self.kind);
        let context = Arc::new(
            ApplicationContext::builder()
                .kind(kind)
                .display_name(&self.name)
                .build(),
        );
        context.bean_registry().register_arc(environment);
        *created = Some(Arc::clone(&context));
        tracing::debug!("Created {} context {}", kind, context.id());

        for initializer in &self.initializers {
            initializer(context.as_ref()).map_err(|e| LifecycleError::StartupFailed(Arc::new(e)))?;
        }
        publisher.context_initialized(context.clone())?;
        publisher.context_loaded(context.clone())?;
        context.refresh()?;
        publisher.started(context.clone())?;
        publisher.running(context.clone())?;
        Ok((context, settings))
    }

    /// Publish `Failed` for `err`, close the context if one was created, and
    /// turn `err` into the error `run` returns
    fn report_failure(
        &self,
        publisher: &mut LifecyclePublisher,
        context: Option<Arc<ApplicationContext>>,
        err: LifecycleError,
    ) -> LifecycleError {
        let cause = match err {
            LifecycleError::StartupFailed(cause) => cause,
            other => Arc::new(anyhow::Error::new(other)),
        };
        tracing::error!("Application {} failed to start: {:#}", self.name, cause);

        let reported = context.clone().map(|c| c as Arc<dyn RuntimeContext>);
        if let Err(e) = publisher.failed(reported, Arc::clone(&cause)) {
            tracing::warn!("Error handling failed start of {}: {}", self.name, e);
        }
        if let Some(context) = context {
            if let Err(e) = context.close() {
                tracing::warn!("Error closing context of {} after failed start: {}", self.name, e);
            }
        }
        LifecycleError::StartupFailed(cause)
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field(
                "listeners",
                &self.listeners.iter().map(|l| l.name()).collect::<Vec<_>>(),
            )
            .field("initializers", &self.initializers.len())
            .finish()
    }
}

/// Builder for Application
pub struct ApplicationBuilder {
    name: String,
    kind: ApplicationKind,
    listeners: Vec<Arc<dyn ApplicationListener>>,
    default_properties: Vec<(String, String)>,
    initializers: Vec<ContextInitializer>,
    include_system_environment: bool,
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            name: "application".to_string(),
            kind: ApplicationKind::default(),
            listeners: Vec::new(),
            default_properties: Vec::new(),
            initializers: Vec::new(),
            include_system_environment: true,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the kind of application, as decided by the caller
    pub fn kind(mut self, kind: ApplicationKind) -> Self {
        self.kind = kind;
        self
    }

    /// Add a listener; listeners keep the order they are added in
    pub fn listener(mut self, listener: Arc<dyn ApplicationListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Add several listeners in order
    pub fn listeners(
        mut self,
        listeners: impl IntoIterator<Item = Arc<dyn ApplicationListener>>,
    ) -> Self {
        self.listeners.extend(listeners);
        self
    }

    /// Add a property with the lowest precedence
    pub fn default_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_properties.push((key.into(), value.into()));
        self
    }

    /// Add a context initializer; initializers run in the order they are added
    pub fn initializer<F>(mut self, initializer: F) -> Self
    where
        F: Fn(&ApplicationContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.initializers.push(Arc::new(initializer));
        self
    }

    /// Whether process environment variables become properties (default true)
    pub fn system_environment(mut self, include: bool) -> Self {
        self.include_system_environment = include;
        self
    }

    /// Build the application descriptor
    pub fn build(self) -> Arc<Application> {
        Arc::new(Application {
            name: self.name,
            kind: self.kind,
            listeners: self.listeners,
            default_properties: self.default_properties,
            initializers: self.initializers,
            include_system_environment: self.include_system_environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextState;
    use crate::event::{EventError, EventFilter, EventKind, FnListener};
    use crate::testing::{AwareRecorder, EventLog, failing, recording};
    use std::sync::Mutex;

    struct Greeter(&'static str);

    #[test]
    fn test_run_publishes_every_phase() {
        let log = EventLog::default();
        let context = Application::builder()
            .name("orders")
            .system_environment(false)
            .listener(recording("all", &log, EventFilter::All, 0))
            .build()
            .run(["--server.port=9000"])
            .unwrap();

        assert_eq!(
            log.entries(),
            vec![
                "all:Starting",
                "all:EnvironmentPrepared",
                "all:ContextInitialized",
                "all:ContextLoaded",
                "all:ContextRefreshed",
                "all:Started",
                "all:Running",
            ]
        );
        assert_eq!(context.state(), ContextState::Active);
        assert_eq!(context.display_name(), "orders");
        assert_eq!(context.listener_count(), 1);

        let environment = context.bean_registry().resolve::<Environment>().unwrap();
        assert_eq!(environment.get("server.port").as_deref(), Some("9000"));
    }

    #[test]
    fn test_initializers_and_aware_listeners_see_the_context() {
        let log = EventLog::default();
        let aware = AwareRecorder::new("aware", &log);
        let context = Application::builder()
            .system_environment(false)
            .listener(aware.clone())
            .initializer(|context| {
                context.bean_registry().register(Greeter("hello"));
                Ok(())
            })
            .build()
            .run(Vec::<String>::new())
            .unwrap();

        assert_eq!(aware.contexts(), vec![context.id().to_string()]);
        let greeter = context.bean_registry().resolve::<Greeter>().unwrap();
        assert_eq!(greeter.0, "hello");
    }

    #[test]
    fn test_kind_override_from_properties() {
        let application = Application::builder()
            .kind(ApplicationKind::Servlet)
            .default_property("main.kind", "reactive")
            .default_property("main.log-startup-info", "false")
            .system_environment(false)
            .build();
        assert_eq!(application.kind(), ApplicationKind::Servlet);

        let context = application.run(Vec::<String>::new()).unwrap();
        assert_eq!(context.kind(), ApplicationKind::Reactive);
    }

    #[test]
    fn test_initializer_failure_publishes_failed() {
        let log = EventLog::default();
        let err = Application::builder()
            .system_environment(false)
            .listener(recording("A", &log, EventFilter::Run, 0))
            .listener(recording("B", &log, EventFilter::Run, 0))
            .initializer(|_| anyhow::bail!("datasource unreachable"))
            .build()
            .run(Vec::<String>::new())
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Application startup failed: datasource unreachable"
        );
        assert_eq!(
            err.cause().map(|c| c.to_string()).as_deref(),
            Some("datasource unreachable")
        );
        assert_eq!(
            log.entries(),
            vec![
                "A:Starting",
                "B:Starting",
                "A:EnvironmentPrepared",
                "B:EnvironmentPrepared",
                "A:Failed",
                "B:Failed",
            ]
        );
    }

    #[test]
    fn test_started_listener_failure_publishes_failed_through_context() {
        let log = EventLog::default();
        let broken = FnListener::new("broken", |event| {
            anyhow::ensure!(event.kind() != EventKind::Started, "not ready");
            Ok(())
        })
        .arc();
        let err = Application::builder()
            .system_environment(false)
            .listener(broken)
            .listener(recording(
                "watcher",
                &log,
                EventFilter::kinds([EventKind::Failed, EventKind::ContextClosed]),
                0,
            ))
            .build()
            .run(Vec::<String>::new())
            .unwrap_err();

        assert!(matches!(err, LifecycleError::StartupFailed(_)));
        assert!(err.to_string().contains("not ready"));
        assert_eq!(log.entries(), vec!["watcher:Failed", "watcher:ContextClosed"]);
    }

    /// Keeps the context carried by the `Failed` event
    fn failed_context_capture() -> (
        Arc<Mutex<Option<Arc<dyn RuntimeContext>>>>,
        Arc<dyn ApplicationListener>,
    ) {
        let seen = Arc::new(Mutex::new(None));
        let capture = Arc::clone(&seen);
        let listener = FnListener::new("capture", move |event| {
            *capture.lock().unwrap() = event.as_run().and_then(|run| run.context()).cloned();
            Ok(())
        })
        .with_filter(EventFilter::only(EventKind::Failed))
        .arc();
        (seen, listener)
    }

    #[test]
    fn test_refresh_failure_reports_through_bootstrap_and_closes() {
        let log = EventLog::default();
        let broken = FnListener::new("broken", |_| anyhow::bail!("cache warmup failed"))
            .with_filter(EventFilter::only(EventKind::ContextRefreshed))
            .arc();
        let (seen, capture) = failed_context_capture();
        let err = Application::builder()
            .system_environment(false)
            .listener(broken)
            .listener(capture)
            .listener(recording(
                "watcher",
                &log,
                EventFilter::kinds([EventKind::Failed, EventKind::ContextClosed]),
                0,
            ))
            .build()
            .run(Vec::<String>::new())
            .unwrap_err();

        assert!(matches!(err, LifecycleError::StartupFailed(_)));
        assert!(err.to_string().contains("cache warmup failed"));
        // Never active, so no ContextClosed
        assert_eq!(log.entries(), vec!["watcher:Failed"]);

        let context = seen.lock().unwrap().take().expect("Failed carries the context");
        assert!(!context.is_active());
    }

    #[test]
    fn test_failed_run_leaves_no_active_context() {
        let broken = FnListener::new("broken", |event| {
            anyhow::ensure!(event.kind() != EventKind::Running, "not ready");
            Ok(())
        })
        .arc();
        let (seen, capture) = failed_context_capture();
        Application::builder()
            .system_environment(false)
            .listener(broken)
            .listener(capture)
            .build()
            .run(Vec::<String>::new())
            .unwrap_err();

        let context = seen.lock().unwrap().take().expect("Failed carries the context");
        assert!(!context.is_active());
    }

    #[test]
    fn test_starting_failure_is_returned_without_failed() {
        let log = EventLog::default();
        let err = Application::builder()
            .system_environment(false)
            .listener(failing("broken", &log, 0))
            .build()
            .run(Vec::<String>::new())
            .unwrap_err();

        assert!(matches!(
            err,
            LifecycleError::Event(EventError::ListenerFailed {
                event: EventKind::Starting,
                ..
            })
        ));
        assert_eq!(log.entries(), vec!["broken:Starting"]);
    }

    #[test]
    fn test_invalid_application_json_fails_startup() {
        let log = EventLog::default();
        let err = Application::builder()
            .system_environment(false)
            .default_property(crate::environment::APPLICATION_JSON, "[1, 2]")
            .listener(recording("A", &log, EventFilter::Run, 0))
            .build()
            .run(Vec::<String>::new())
            .unwrap_err();

        assert!(matches!(err, LifecycleError::StartupFailed(_)));
        assert_eq!(log.entries(), vec!["A:Starting", "A:Failed"]);
    }
}
