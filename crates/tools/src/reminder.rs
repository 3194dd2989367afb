//! Reminder tool — arm one-shot reminders through the scheduler.

use async_trait::async_trait;
use serde_json::Value;
use sidekick_core::error::ToolError;
use sidekick_core::tool::{ParamKind, ParamSpec, Tool, ToolSpec};
use sidekick_watch::ReminderScheduler;
use std::sync::Arc;

/// Delays beyond a day are almost certainly a unit mistake by the backend.
const MAX_DELAY_SECS: u64 = 24 * 3600;

pub struct SetReminderTool {
    scheduler: Arc<ReminderScheduler>,
}

impl SetReminderTool {
    pub fn new(scheduler: Arc<ReminderScheduler>) -> Self {
        Self { scheduler }
    }
}

#[async_trait]
impl Tool for SetReminderTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "set_reminder",
            "Set a reminder that fires after a delay, e.g. 'remind me in 10 minutes'.",
            vec![
                ParamSpec::required(
                    "message",
                    ParamKind::String,
                    "What to remind the user about",
                ),
                ParamSpec::required(
                    "delay_secs",
                    ParamKind::Integer,
                    "Seconds from now until the reminder fires",
                ),
            ],
        )
    }

    async fn call(&self, arguments: Value) -> Result<String, ToolError> {
        let message = arguments["message"].as_str().unwrap_or_default().trim();
        let delay = arguments["delay_secs"].as_i64().unwrap_or_default();
        if message.is_empty() {
            return Err(ToolError::InvalidArguments {
                tool_name: "set_reminder".into(),
                reason: "reminder message must not be empty".into(),
            });
        }
        if delay < 0 {
            return Err(ToolError::InvalidArguments {
                tool_name: "set_reminder".into(),
                reason: format!("delay must not be negative, got {delay}"),
            });
        }
        let delay_secs = delay as u64;
        if delay_secs > MAX_DELAY_SECS {
            return Err(ToolError::InvalidArguments {
                tool_name: "set_reminder".into(),
                reason: format!("delay of {delay_secs}s exceeds the one-day maximum"),
            });
        }
        Ok(self.scheduler.schedule(message, delay_secs))
    }
}
