//! Decision — the structured output of the reasoning backend for one turn.
//!
//! A Decision is produced per turn and never persisted; only its effects
//! are. The engine guarantees every Decision handed to the dispatcher is
//! well-formed (missing fields are backfilled during parsing), so the
//! dispatcher only has to enforce that a requested tool actually exists.

use serde::{Deserialize, Serialize};

/// What the backend believes the user wants from this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Perform an action (usually via a tool call).
    Command,
    /// Answer a question; answers are candidates for memory promotion.
    Query,
    /// Small talk, no side effects.
    #[default]
    Chat,
}

/// A tool invocation requested by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// The per-turn decision: intent, optional tool call, and base response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    #[serde(default)]
    pub intent: Intent,

    #[serde(default)]
    pub tool_call: Option<ToolCall>,

    #[serde(default)]
    pub response: String,
}

impl Decision {
    /// A plain chat reply with no tool call.
    pub fn chat(response: impl Into<String>) -> Self {
        Self {
            intent: Intent::Chat,
            tool_call: None,
            response: response.into(),
        }
    }
}
