//! Configuration loading and validation for sidekick.
//!
//! Loads `~/.sidekick/config.toml` with environment variable overrides
//! (`SIDEKICK_BACKEND_URL`, `SIDEKICK_MODEL`, `SIDEKICK_DB_PATH`).
//! Every field has a default, so a missing config file yields a working
//! local setup pointed at an OpenAI-compatible server on localhost.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The root configuration, mapping to `~/.sidekick/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub conversation: ConversationConfig,

    #[serde(default)]
    pub observer: ObserverConfig,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub identity: IdentityConfig,
}

/// Reasoning backend connection and sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of an OpenAI-compatible completion server.
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Model name passed through to the server. Empty = server default.
    #[serde(default)]
    pub model: String,

    /// Max tokens per decision completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for decision generation. Kept low: decisions favor
    /// determinism over creativity.
    #[serde(default = "default_decision_temperature")]
    pub decision_temperature: f32,

    /// Temperature for the plain chat path.
    #[serde(default = "default_chat_temperature")]
    pub chat_temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8080".into()
}
fn default_max_tokens() -> u32 {
    512
}
fn default_decision_temperature() -> f32 {
    0.2
}
fn default_chat_temperature() -> f32 {
    0.7
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            model: String::new(),
            max_tokens: default_max_tokens(),
            decision_temperature: default_decision_temperature(),
            chat_temperature: default_chat_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database path. Empty = `<data dir>/sidekick.db`.
    #[serde(default)]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: String::new() }
    }
}

impl StoreConfig {
    /// Resolve the effective database path.
    pub fn resolved_path(&self) -> PathBuf {
        if self.path.is_empty() {
            AppConfig::data_dir().join("sidekick.db")
        } else {
            PathBuf::from(&self.path)
        }
    }
}

/// Conversation window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Turns kept per direction; the window hard cap is twice this.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

fn default_window_size() -> usize {
    5
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
        }
    }
}

/// Background observer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserverConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Polling interval in seconds.
    #[serde(default = "default_observe_interval")]
    pub interval_secs: u64,
}

fn default_true() -> bool {
    true
}
fn default_observe_interval() -> u64 {
    5
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_observe_interval(),
        }
    }
}

/// Memory promotion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Minimum response length for auto-promotion of query answers.
    #[serde(default = "default_promote_min_len")]
    pub auto_promote_min_len: usize,

    /// How many recent valid entries the context assembler pulls.
    #[serde(default = "default_recall_limit")]
    pub recall_limit: usize,
}

fn default_promote_min_len() -> usize {
    50
}
fn default_recall_limit() -> usize {
    5
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            auto_promote_min_len: default_promote_min_len(),
            recall_limit: default_recall_limit(),
        }
    }
}

/// Agent identity settings used in prompt framing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_agent_name")]
    pub agent_name: String,

    /// One-paragraph persona description embedded in the prompt.
    #[serde(default = "default_persona")]
    pub persona: String,
}

fn default_agent_name() -> String {
    "Sidekick".into()
}
fn default_persona() -> String {
    "a locally running personal assistant that helps with notes, tasks, \
     reminders, and questions about the user's desktop"
        .into()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            agent_name: default_agent_name(),
            persona: default_persona(),
        }
    }
}

impl AppConfig {
    /// `~/.sidekick`
    pub fn config_dir() -> PathBuf {
        home_dir().join(".sidekick")
    }

    /// Where the database and tool data files live.
    pub fn data_dir() -> PathBuf {
        Self::config_dir().join("data")
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist, then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_dir().join("config.toml");
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path. The file must exist and parse.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&text)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("SIDEKICK_BACKEND_URL") {
            self.backend.url = url;
        }
        if let Ok(model) = std::env::var("SIDEKICK_MODEL") {
            self.backend.model = model;
        }
        if let Ok(path) = std::env::var("SIDEKICK_DB_PATH") {
            self.store.path = path;
        }
    }

    /// Validate settings that would otherwise fail far from their cause.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.url.trim().is_empty() {
            return Err(ConfigError::Invalid("backend.url must not be empty".into()));
        }
        if self.conversation.window_size == 0 {
            return Err(ConfigError::Invalid(
                "conversation.window_size must be at least 1".into(),
            ));
        }
        if self.observer.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "observer.interval_secs must be at least 1".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.backend.decision_temperature) {
            return Err(ConfigError::Invalid(
                "backend.decision_temperature must be between 0.0 and 2.0".into(),
            ));
        }
        Ok(())
    }
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}
