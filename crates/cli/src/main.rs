//! sidekick CLI — the main entry point.
//!
//! Commands:
//! - `chat`   — Interactive session with background observation (default)
//! - `ask`    — Send a single message and exit
//! - `status` — Show configuration and registered tools

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "sidekick",
    about = "sidekick — a local desktop assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a config file (default: ~/.sidekick/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session
    Chat,

    /// Send a single message and print the response
    Ask {
        /// The message to send
        message: String,
    },

    /// Show configuration and registered tools
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => sidekick_config::AppConfig::load_from(path)?,
        None => sidekick_config::AppConfig::load()?,
    };

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => commands::chat::run(config).await?,
        Commands::Ask { message } => commands::ask::run(config, &message).await?,
        Commands::Status => commands::status::run(config).await?,
    }

    Ok(())
}
