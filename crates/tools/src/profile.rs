//! Profile tool — persist user facts as profile key/value pairs.

use async_trait::async_trait;
use serde_json::Value;
use sidekick_core::error::ToolError;
use sidekick_core::tool::{ParamKind, ParamSpec, Tool, ToolSpec};
use sidekick_store::Store;

pub struct RememberProfileTool {
    store: Store,
}

impl RememberProfileTool {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for RememberProfileTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "remember_profile",
            "Remember a lasting fact about the user, e.g. key 'user_name' value 'Sam'.",
            vec![
                ParamSpec::required("key", ParamKind::String, "Short identifier for the fact"),
                ParamSpec::required("value", ParamKind::String, "The fact to remember"),
            ],
        )
    }

    async fn call(&self, arguments: Value) -> Result<String, ToolError> {
        let key = arguments["key"].as_str().unwrap_or_default().trim();
        let value = arguments["value"].as_str().unwrap_or_default().trim();
        if key.is_empty() || value.is_empty() {
            return Err(ToolError::InvalidArguments {
                tool_name: "remember_profile".into(),
                reason: "both key and value must be non-empty".into(),
            });
        }
        self.store
            .upsert_profile(key, value)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "remember_profile".into(),
                reason: e.to_string(),
            })?;
        Ok(format!("Got it, I'll remember that ({key})."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn fact_lands_in_the_profile() {
        let store = Store::open_in_memory().await.unwrap();
        let tool = RememberProfileTool::new(store.clone());

        tool.call(json!({"key": "user_name", "value": "Sam"}))
            .await
            .unwrap();
        assert_eq!(store.profile("user_name").await.unwrap().as_deref(), Some("Sam"));

        // Upsert replaces.
        tool.call(json!({"key": "user_name", "value": "Samantha"}))
            .await
            .unwrap();
        assert_eq!(
            store.profile("user_name").await.unwrap().as_deref(),
            Some("Samantha")
        );
    }
}
