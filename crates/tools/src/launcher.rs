//! App launcher tool — start desktop applications from an allowlist.

use async_trait::async_trait;
use serde_json::Value;
use sidekick_core::error::ToolError;
use sidekick_core::tool::{ParamKind, ParamSpec, Tool, ToolSpec};
use std::collections::HashMap;
use std::process::{Command, Stdio};
use tracing::info;

pub struct LaunchAppTool {
    /// Friendly name to executable. Only names in this table can launch.
    apps: HashMap<String, String>,
}

impl LaunchAppTool {
    /// Common desktop applications by friendly name.
    pub fn with_defaults() -> Self {
        let mut apps = HashMap::new();
        for (name, command) in [
            ("firefox", "firefox"),
            ("browser", "firefox"),
            ("terminal", "x-terminal-emulator"),
            ("files", "nautilus"),
            ("editor", "gedit"),
            ("calculator", "gnome-calculator"),
        ] {
            apps.insert(name.to_string(), command.to_string());
        }
        Self { apps }
    }

    pub fn with_apps(apps: HashMap<String, String>) -> Self {
        Self { apps }
    }
}

#[async_trait]
impl Tool for LaunchAppTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "launch_app",
            "Open a desktop application by name, e.g. 'firefox' or 'terminal'.",
            vec![ParamSpec::required(
                "app_name",
                ParamKind::String,
                "Name of the application to open",
            )],
        )
    }

    async fn call(&self, arguments: Value) -> Result<String, ToolError> {
        let name = arguments["app_name"]
            .as_str()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        let Some(command) = self.apps.get(&name) else {
            let mut known: Vec<&str> = self.apps.keys().map(String::as_str).collect();
            known.sort();
            return Err(ToolError::ExecutionFailed {
                tool_name: "launch_app".into(),
                reason: format!("unknown app '{name}'; I can open: {}", known.join(", ")),
            });
        };

        // Detach: the app outlives the agent process.
        Command::new(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "launch_app".into(),
                reason: format!("could not start '{command}': {e}"),
            })?;
        info!(app = %name, "Launched application");
        Ok(format!("Opening {name}."))
    }
}
