//! `sidekick chat` — interactive session with background observation.

use super::{build_runtime, render_event};
use sidekick_config::AppConfig;
use sidekick_watch::{Observer, snapshot};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut runtime = build_runtime(&config).await?;

    let observer = if config.observer.enabled {
        Some(
            Observer::new(
                runtime.probe.clone(),
                runtime.sink.clone(),
                Duration::from_secs(config.observer.interval_secs),
            )
            .start(),
        )
    } else {
        None
    };

    println!();
    println!("  {} is listening.", config.identity.agent_name);
    println!("  Rate my last answer with !approve, !reject, or !save.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let input = line.trim();
                if input.is_empty() {
                    prompt()?;
                    continue;
                }
                if input == "exit" || input == "quit" {
                    break;
                }

                let reply = if let Some(command) = input.strip_prefix('!') {
                    if command.trim() == "reset" {
                        runtime.agent.reset_session().await
                    } else {
                        runtime.agent.feedback(command).await
                    }
                } else {
                    let environment = snapshot(runtime.probe.as_ref());
                    runtime.agent.handle_turn(input, Some(&environment)).await
                };
                println!("  {reply}");
                println!();
                prompt()?;
            }
            event = runtime.events.recv() => {
                let Some(event) = event else { break };
                if let Some(line) = render_event(&event) {
                    println!();
                    println!("  * {line}");
                    prompt()?;
                }
            }
        }
    }

    if let Some(observer) = observer {
        observer.stop().await;
    }
    runtime.scheduler.shutdown().await;
    println!("  Bye.");
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  you > ");
    std::io::stdout().flush()
}
