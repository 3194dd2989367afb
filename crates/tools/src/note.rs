//! Note tool — append timestamped notes to a plain text file.

use async_trait::async_trait;
use chrono::Local;
use serde_json::Value;
use sidekick_core::error::ToolError;
use sidekick_core::tool::{ParamKind, ParamSpec, Tool, ToolSpec};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

pub struct TakeNoteTool {
    notes_path: PathBuf,
}

impl TakeNoteTool {
    pub fn new(notes_path: PathBuf) -> Self {
        Self { notes_path }
    }
}

#[async_trait]
impl Tool for TakeNoteTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "take_note",
            "Save a short note for the user. Notes are kept in a plain text file with a timestamp.",
            vec![ParamSpec::required(
                "text",
                ParamKind::String,
                "The text of the note to save",
            )],
        )
    }

    async fn call(&self, arguments: Value) -> Result<String, ToolError> {
        let content = arguments["text"].as_str().unwrap_or_default().trim();
        if content.is_empty() {
            return Err(ToolError::InvalidArguments {
                tool_name: "take_note".into(),
                reason: "note content must not be empty".into(),
            });
        }

        if let Some(parent) = self.notes_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::ExecutionFailed {
                    tool_name: "take_note".into(),
                    reason: e.to_string(),
                })?;
        }

        let line = format!("[{}] {content}\n", Local::now().format("%Y-%m-%d %H:%M"));
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.notes_path)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "take_note".into(),
                reason: e.to_string(),
            })?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "take_note".into(),
                reason: e.to_string(),
            })?;

        Ok(format!("Noted: {content}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn note_is_appended_with_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let tool = TakeNoteTool::new(path.clone());

        tool.call(json!({"text": "buy milk"})).await.unwrap();
        tool.call(json!({"text": "call mom"})).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("buy milk"));
        assert!(lines[1].ends_with("call mom"));
    }

    #[tokio::test]
    async fn bound_arguments_save_and_echo_the_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let tool = TakeNoteTool::new(path.clone());

        // The full dispatch path: bind against the declared spec first.
        let bound = tool
            .spec()
            .bind(&json!({"text": "dentist appointment tomorrow"}))
            .unwrap();
        let confirmation = tool.call(bound).await.unwrap();
        assert!(confirmation.contains("dentist appointment tomorrow"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("dentist appointment tomorrow"));
    }

    #[tokio::test]
    async fn empty_note_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let tool = TakeNoteTool::new(dir.path().join("notes.txt"));
        let err = tool.call(json!({"text": "   "})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }
}
