//! `sidekick ask` — one message, one answer, no background loops.

use super::build_runtime;
use sidekick_config::AppConfig;

pub async fn run(config: AppConfig, message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = build_runtime(&config).await?;
    let response = runtime.agent.handle_turn(message, None).await;
    println!("{response}");
    runtime.scheduler.shutdown().await;
    Ok(())
}
