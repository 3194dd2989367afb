pub mod ask;
pub mod chat;
pub mod status;

use sidekick_agent::Agent;
use sidekick_brain::{DecisionEngine, HttpBackend};
use sidekick_config::AppConfig;
use sidekick_core::event::{SurfaceEvent, SurfaceSink};
use sidekick_store::Store;
use sidekick_watch::{DesktopProbe, HostProbe, ReminderScheduler};
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;

/// Everything a command needs to talk to the agent.
pub struct Runtime {
    pub agent: Agent,
    pub probe: Arc<dyn DesktopProbe>,
    pub scheduler: Arc<ReminderScheduler>,
    pub sink: SurfaceSink,
    pub events: Receiver<SurfaceEvent>,
}

/// Wire the store, backend, tools, and agent together from config.
/// A store that cannot open is fatal; everything downstream needs it.
pub async fn build_runtime(config: &AppConfig) -> Result<Runtime, Box<dyn std::error::Error>> {
    config.validate()?;

    let store = Store::open(&config.store.resolved_path())
        .await
        .map_err(|e| format!("Cannot open the database: {e}"))?;

    let backend = HttpBackend::new(
        &config.backend.url,
        &config.backend.model,
        config.backend.timeout_secs,
    )?;
    let engine = Arc::new(DecisionEngine::new(Arc::new(backend), config));

    let (sink, events) = SurfaceSink::channel(32);
    let scheduler = Arc::new(ReminderScheduler::new(sink.clone()));
    let probe: Arc<dyn DesktopProbe> = Arc::new(HostProbe::new());

    let registry = sidekick_tools::default_registry(
        store.clone(),
        probe.clone(),
        scheduler.clone(),
        AppConfig::data_dir().join("notes.txt"),
    )?;

    let agent = Agent::new(store, engine, registry, config);
    Ok(Runtime {
        agent,
        probe,
        scheduler,
        sink,
        events,
    })
}

/// Render a surface event as a line the user sees, or `None` for events
/// only worth a log entry.
pub fn render_event(event: &SurfaceEvent) -> Option<String> {
    match event {
        SurfaceEvent::ReminderFired { message, .. } => {
            Some(format!("Reminder: {message}"))
        }
        SurfaceEvent::WindowChange {
            title,
            contains_error: true,
            ..
        } => Some(format!(
            "I notice '{title}' looks like an error — want a hand with it?"
        )),
        SurfaceEvent::WindowChange { title, .. } => {
            tracing::debug!("Window changed to '{title}'");
            None
        }
        SurfaceEvent::ClipboardChange { is_error: true, .. } => {
            Some("That looks like an error message you just copied — I can take a look.".into())
        }
        SurfaceEvent::ClipboardChange { is_code: true, .. } => {
            Some("I see you copied some code — ask me if you want it explained.".into())
        }
        SurfaceEvent::ClipboardChange { .. } => None,
        SurfaceEvent::SystemStress {
            cpu_percent,
            memory_percent,
            ..
        } => Some(format!(
            "Your machine is under load (cpu {cpu_percent:.0}%, memory {memory_percent:.0}%)."
        )),
    }
}
