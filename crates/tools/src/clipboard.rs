//! Clipboard tool — read the current clipboard text through the probe.

use async_trait::async_trait;
use serde_json::Value;
use sidekick_core::error::ToolError;
use sidekick_core::tool::{Tool, ToolSpec};
use sidekick_watch::DesktopProbe;
use std::sync::Arc;

pub struct ReadClipboardTool {
    probe: Arc<dyn DesktopProbe>,
}

impl ReadClipboardTool {
    pub fn new(probe: Arc<dyn DesktopProbe>) -> Self {
        Self { probe }
    }
}

#[async_trait]
impl Tool for ReadClipboardTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "read_clipboard",
            "Read whatever text is currently on the clipboard.",
            vec![],
        )
    }

    async fn call(&self, _arguments: Value) -> Result<String, ToolError> {
        match self.probe.clipboard_text() {
            Some(text) => Ok(text),
            None => Ok("The clipboard is empty.".into()),
        }
    }
}
