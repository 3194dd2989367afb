//! Tool dispatch — carry out a decision's tool call, softly.
//!
//! Every failure mode here becomes a conversational sentence rather than
//! an error: an unknown tool, bad arguments, or a handler failure must
//! never kill the turn.

use sidekick_brain::DecisionEngine;
use sidekick_core::decision::Decision;
use sidekick_core::tool::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, warn};

/// Tools whose output is raw content rather than a finished sentence.
/// Long results from these go back through the engine for narration.
const CONTENT_TOOLS: &[&str] = &["read_clipboard", "read_document", "web_search"];

/// Content shorter than this is passed through verbatim.
const NARRATION_THRESHOLD_CHARS: usize = 100;

pub struct Dispatcher {
    registry: ToolRegistry,
    engine: Arc<DecisionEngine>,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry, engine: Arc<DecisionEngine>) -> Self {
        Self { registry, engine }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Produce the final response text for a decision.
    ///
    /// Without a tool call this is just the decision's response. With one,
    /// the tool result is appended after the response text, re-narrated
    /// first when it is long raw content.
    pub async fn dispatch(&self, decision: &Decision, user_input: &str) -> String {
        let Some(call) = &decision.tool_call else {
            return decision.response.clone();
        };

        let Some(tool) = self.registry.get(&call.name) else {
            warn!(tool = %call.name, "Decision named an unregistered tool");
            return format!(
                "I tried to use a capability I don't have ('{}'). Could you rephrase?",
                call.name
            );
        };

        let bound = match tool.spec().bind(&call.arguments) {
            Ok(bound) => bound,
            Err(e) => {
                warn!(tool = %call.name, "Argument binding failed: {e}");
                return format!("I couldn't work out how to use {}: {e}", call.name);
            }
        };

        let result = match tool.call(bound).await {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = %call.name, "Tool execution failed: {e}");
                return format!("Something went wrong while running {}: {e}", call.name);
            }
        };
        debug!(tool = %call.name, chars = result.len(), "Tool completed");

        let result = if CONTENT_TOOLS.contains(&call.name.as_str())
            && result.chars().count() > NARRATION_THRESHOLD_CHARS
        {
            self.engine
                .explain_content(&call.name, &result, user_input)
                .await
        } else {
            result
        };

        if decision.response.trim().is_empty() {
            result
        } else {
            format!("{}\n\n{result}", decision.response)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use sidekick_brain::HttpBackend;
    use sidekick_config::AppConfig;
    use sidekick_core::decision::{Intent, ToolCall};
    use sidekick_core::error::ToolError;
    use sidekick_core::tool::{ParamKind, ParamSpec, Tool, ToolSpec};

    struct ShoutTool;

    #[async_trait]
    impl Tool for ShoutTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec::new(
                "shout",
                "Uppercases text",
                vec![ParamSpec::required("text", ParamKind::String, "Text")],
            )
        }
        async fn call(&self, arguments: Value) -> Result<String, ToolError> {
            Ok(arguments["text"].as_str().unwrap_or_default().to_uppercase())
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec::new("broken", "Always fails", vec![])
        }
        async fn call(&self, _arguments: Value) -> Result<String, ToolError> {
            Err(ToolError::ExecutionFailed {
                tool_name: "broken".into(),
                reason: "disk on fire".into(),
            })
        }
    }

    fn dispatcher() -> Dispatcher {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(ShoutTool)).unwrap();
        registry.register(Box::new(FailingTool)).unwrap();
        // The engine is only reached on the narration path, which these
        // tests avoid; a dead endpoint is fine.
        let config = AppConfig::default();
        let backend = Arc::new(HttpBackend::new("http://127.0.0.1:1", "", 1).unwrap());
        Dispatcher::new(registry, Arc::new(DecisionEngine::new(backend, &config)))
    }

    fn decision_with_call(response: &str, name: &str, arguments: Value) -> Decision {
        Decision {
            intent: Intent::Command,
            tool_call: Some(ToolCall {
                name: name.into(),
                arguments,
            }),
            response: response.into(),
        }
    }

    #[tokio::test]
    async fn plain_chat_passes_through() {
        let d = dispatcher();
        let decision = Decision::chat("Hello!");
        assert_eq!(d.dispatch(&decision, "hi").await, "Hello!");
    }

    #[tokio::test]
    async fn result_appended_after_response() {
        let d = dispatcher();
        let decision = decision_with_call("On it.", "shout", json!({"text": "quiet"}));
        assert_eq!(d.dispatch(&decision, "shout quiet").await, "On it.\n\nQUIET");
    }

    #[tokio::test]
    async fn empty_response_yields_bare_result() {
        let d = dispatcher();
        let decision = decision_with_call("", "shout", json!({"text": "hi"}));
        assert_eq!(d.dispatch(&decision, "shout").await, "HI");
    }

    #[tokio::test]
    async fn unknown_tool_soft_fails() {
        let d = dispatcher();
        let decision = decision_with_call("Sure.", "teleport", json!({}));
        let output = d.dispatch(&decision, "teleport me").await;
        assert!(output.contains("teleport"));
        assert!(output.contains("don't have"));
    }

    #[tokio::test]
    async fn bad_arguments_soft_fail() {
        let d = dispatcher();
        let decision = decision_with_call("Sure.", "shout", json!({"text": 42}));
        let output = d.dispatch(&decision, "shout").await;
        assert!(output.contains("shout"));
        assert!(output.contains("string"));
    }

    #[tokio::test]
    async fn execution_failure_soft_fails() {
        let d = dispatcher();
        let decision = decision_with_call("Sure.", "broken", json!({}));
        let output = d.dispatch(&decision, "break").await;
        assert!(output.contains("broken"));
        assert!(output.contains("disk on fire"));
    }
}
