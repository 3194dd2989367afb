//! `sidekick status` — show the effective configuration and tool set.

use sidekick_config::AppConfig;
use sidekick_core::event::SurfaceSink;
use sidekick_store::Store;
use sidekick_watch::{HostProbe, ReminderScheduler};
use std::sync::Arc;

pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!();
    println!("  Agent:    {}", config.identity.agent_name);
    println!("  Backend:  {} (model: {})", config.backend.url, display_model(&config));
    println!("  Database: {}", config.store.resolved_path().display());
    println!(
        "  Observer: {}",
        if config.observer.enabled {
            format!("every {}s", config.observer.interval_secs)
        } else {
            "disabled".into()
        }
    );

    // Registration failures show up here before they bite in a session.
    let store = Store::open_in_memory().await?;
    let (sink, _rx) = SurfaceSink::channel(1);
    let registry = sidekick_tools::default_registry(
        store,
        Arc::new(HostProbe::new()),
        Arc::new(ReminderScheduler::new(sink)),
        AppConfig::data_dir().join("notes.txt"),
    )?;
    println!("  Tools:    {}", registry.names().join(", "));
    println!();
    Ok(())
}

fn display_model(config: &AppConfig) -> &str {
    if config.backend.model.is_empty() {
        "server default"
    } else {
        &config.backend.model
    }
}
