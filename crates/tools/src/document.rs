//! Document tool — read a text file with path validation.

use async_trait::async_trait;
use serde_json::Value;
use sidekick_core::error::ToolError;
use sidekick_core::tool::{ParamKind, ParamSpec, Tool, ToolSpec};

/// Paths under these prefixes are never readable through the tool.
const FORBIDDEN_PREFIXES: &[&str] = &["/etc", "/proc", "/sys", "/root/.ssh"];

/// Files larger than this are truncated in the output.
const MAX_OUTPUT_CHARS: usize = 8000;

pub struct ReadDocumentTool;

impl ReadDocumentTool {
    fn validate_path(path: &str) -> Result<(), String> {
        if path.contains("..") {
            return Err("relative traversal is not allowed".into());
        }
        let expanded = Self::expand(path);
        if expanded.contains("/.ssh/")
            || FORBIDDEN_PREFIXES.iter().any(|p| expanded.starts_with(p))
        {
            return Err(format!("reading '{path}' is not allowed"));
        }
        Ok(())
    }

    fn expand(path: &str) -> String {
        match path.strip_prefix("~/") {
            Some(rest) => match std::env::var("HOME") {
                Ok(home) => format!("{home}/{rest}"),
                Err(_) => path.to_string(),
            },
            None => path.to_string(),
        }
    }
}

#[async_trait]
impl Tool for ReadDocumentTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "read_document",
            "Read the contents of a text file at the given path.",
            vec![ParamSpec::required(
                "path",
                ParamKind::String,
                "The file path to read",
            )],
        )
    }

    async fn call(&self, arguments: Value) -> Result<String, ToolError> {
        let path = arguments["path"].as_str().unwrap_or_default();
        Self::validate_path(path).map_err(|reason| ToolError::ExecutionFailed {
            tool_name: "read_document".into(),
            reason,
        })?;

        let expanded = Self::expand(path);
        let content = tokio::fs::read_to_string(&expanded).await.map_err(|e| {
            ToolError::ExecutionFailed {
                tool_name: "read_document".into(),
                reason: format!("could not read '{path}': {e}"),
            }
        })?;

        if content.chars().count() > MAX_OUTPUT_CHARS {
            let truncated: String = content.chars().take(MAX_OUTPUT_CHARS).collect();
            Ok(format!("{truncated}\n[... truncated]"))
        } else {
            Ok(content)
        }
    }
}
