//! Todo tools — persistent task list backed by the store.

use async_trait::async_trait;
use serde_json::Value;
use sidekick_core::error::ToolError;
use sidekick_core::tool::{ParamKind, ParamSpec, Tool, ToolSpec};
use sidekick_store::Store;

pub struct AddTodoTool {
    store: Store,
}

impl AddTodoTool {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for AddTodoTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "add_todo",
            "Add a task to the user's todo list.",
            vec![ParamSpec::required(
                "task",
                ParamKind::String,
                "The task to add",
            )],
        )
    }

    async fn call(&self, arguments: Value) -> Result<String, ToolError> {
        let task = arguments["task"].as_str().unwrap_or_default().trim();
        if task.is_empty() {
            return Err(ToolError::InvalidArguments {
                tool_name: "add_todo".into(),
                reason: "task must not be empty".into(),
            });
        }
        self.store
            .add_task(task)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "add_todo".into(),
                reason: e.to_string(),
            })?;
        Ok(format!("Added to your list: {task}"))
    }
}

pub struct ListTodosTool {
    store: Store,
}

impl ListTodosTool {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ListTodosTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "list_todos",
            "Show the user's pending todo items.",
            vec![],
        )
    }

    async fn call(&self, _arguments: Value) -> Result<String, ToolError> {
        let tasks = self
            .store
            .pending_tasks()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "list_todos".into(),
                reason: e.to_string(),
            })?;
        if tasks.is_empty() {
            return Ok("Your todo list is empty.".into());
        }
        let lines: Vec<String> = tasks
            .iter()
            .enumerate()
            .map(|(i, (_, task))| format!("{}. {task}", i + 1))
            .collect();
        Ok(format!("Your pending tasks:\n{}", lines.join("\n")))
    }
}
