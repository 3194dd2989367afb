//! The per-turn context bundle consumed by the reasoning engine.
//!
//! Assembled by `sidekick-agent`; defined here because both the assembler
//! and the engine need the shape.

use chrono::{DateTime, Datelike, Local, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::turn::ConversationTurn;

/// Raw environment capture handed to the pipeline alongside user input.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentSnapshot {
    pub window_title: Option<String>,
    pub clipboard: Option<String>,
    pub captured_at: Option<DateTime<Utc>>,
}

/// The reduced form of an environment snapshot that enters the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenContext {
    pub active_window: String,
    /// Clipboard text truncated to 100 chars.
    pub clipboard_preview: String,
    pub captured_at: Option<DateTime<Utc>>,
}

/// Wall-clock facts computed at context-build time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalContext {
    /// Local HH:MM.
    pub current_time: String,
    /// Local YYYY-MM-DD.
    pub current_date: String,
    /// Full weekday name.
    pub day_of_week: String,
    pub is_weekend: bool,
}

impl TemporalContext {
    pub fn now() -> Self {
        let now = Local::now();
        let weekday = now.weekday();
        Self {
            current_time: now.format("%H:%M").to_string(),
            current_date: now.format("%Y-%m-%d").to_string(),
            day_of_week: now.format("%A").to_string(),
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
        }
    }
}

/// Everything the engine sees about one turn besides the user input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextBundle {
    /// Profile attributes merged over defaults.
    pub profile: BTreeMap<String, String>,
    /// The bounded conversation window, oldest first.
    pub conversation: Vec<ConversationTurn>,
    pub temporal: TemporalContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen: Option<ScreenContext>,
    /// Recent valid memory values, newest first. Advisory: empty on
    /// store failure.
    pub relevant_memories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporal_context_shapes() {
        let t = TemporalContext::now();
        assert_eq!(t.current_time.len(), 5);
        assert_eq!(t.current_date.len(), 10);
        assert!(!t.day_of_week.is_empty());
    }
}
