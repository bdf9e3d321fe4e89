use bootcast::prelude::*;
use serde::Deserialize;
use std::sync::OnceLock;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ServerSettings {
    port: u16,
    #[serde(default)]
    banner: Option<String>,
}

struct Greeting(String);

/// Looks up the greeting bean once the context is handed over
struct GreetingReporter {
    context: OnceLock<Arc<dyn RuntimeContext>>,
}

impl ApplicationListener for GreetingReporter {
    fn on_event(&self, _event: &ApplicationEvent) -> anyhow::Result<()> {
        let context = self
            .context
            .get()
            .ok_or_else(|| anyhow::anyhow!("no context yet"))?;
        let greeting = context
            .beans()
            .ok_or_else(|| anyhow::anyhow!("context {} has no beans", context.id()))?
            .resolve::<Greeting>()?;
        tracing::info!("📣 {}", greeting.0);
        Ok(())
    }

    fn filter(&self) -> EventFilter {
        EventFilter::only(EventKind::Running)
    }

    fn as_context_aware(&self) -> Option<&dyn ContextAware> {
        Some(self)
    }
}

impl ContextAware for GreetingReporter {
    fn set_context(&self, context: Arc<dyn RuntimeContext>) {
        if let Err(rejected) = self.context.set(context) {
            tracing::debug!("GreetingReporter already has a context; ignoring {}", rejected.id());
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let audit = FnListener::new("audit", |event| {
        tracing::info!("🔔 {} at {}", event.kind(), event.timestamp());
        Ok(())
    })
    .with_order(-10)
    .arc();

    let settings = FnListener::new("settings", |event| {
        let Some(environment) = event.as_run().and_then(|run| run.environment()) else {
            return Ok(());
        };
        let server: ServerSettings = environment.bind("server")?;
        tracing::info!(
            "⚙️  Listening on port {} ({})",
            server.port,
            server.banner.as_deref().unwrap_or("no banner")
        );
        Ok(())
    })
    .with_filter(EventFilter::only(EventKind::EnvironmentPrepared))
    .arc();

    let failure = FnListener::new("failure", |event| {
        if let Some(cause) = event.as_run().and_then(|run| run.cause()) {
            tracing::error!("💥 Startup aborted: {cause:#}");
        }
        Ok(())
    })
    .with_filter(EventFilter::only(EventKind::Failed))
    .arc();

    let reporter = Arc::new(GreetingReporter {
        context: OnceLock::new(),
    });

    let context = Application::builder()
        .name("startup-demo")
        .kind(ApplicationKind::Servlet)
        .default_property("server.port", "8080")
        .listener(audit)
        .listener(settings)
        .listener(failure)
        .listener(reporter)
        .initializer(|context| {
            context
                .bean_registry()
                .register(Greeting(format!("Hello from {}", context.display_name())));
            Ok(())
        })
        .build()
        .run(std::env::args().skip(1))?;

    tracing::info!("✅ {} is {}", context.display_name(), context.state());

    context.close()?;
    tracing::info!("🛑 Closed context {}", context.id());
    Ok(())
}
