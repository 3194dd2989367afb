//! The decision engine — prompt construction and output parsing.
//!
//! Packages the per-turn context and the tool schema list into a single
//! instruction block, invokes the backend with deterministic-leaning
//! sampling, and parses the output into a [`Decision`]. The contract is
//! that `decide` is infallible: any backend failure or malformed output
//! degrades to a well-formed fallback Decision, so the pipeline never
//! sees an error from this boundary.

use serde_json::Value;
use sidekick_config::AppConfig;
use sidekick_core::backend::{Backend, BackendRequest};
use sidekick_core::context::ContextBundle;
use sidekick_core::decision::{Decision, Intent};
use std::sync::Arc;
use tracing::{debug, warn};

/// How much raw text survives into a fallback response.
const FALLBACK_PREVIEW_CHARS: usize = 500;
/// How much raw text backfills a missing `response` field.
const BACKFILL_PREVIEW_CHARS: usize = 200;
/// How much tool output is shown to the backend during re-narration.
const EXPLAIN_INPUT_CHARS: usize = 1000;

const APOLOGY: &str = "Sorry, I hit a snag while thinking that over. Could you say it again?";

/// The reasoning backend adapter.
pub struct DecisionEngine {
    backend: Arc<dyn Backend>,
    agent_name: String,
    persona: String,
    max_tokens: u32,
    decision_temperature: f32,
    chat_temperature: f32,
}

impl DecisionEngine {
    pub fn new(backend: Arc<dyn Backend>, config: &AppConfig) -> Self {
        Self {
            backend,
            agent_name: config.identity.agent_name.clone(),
            persona: config.identity.persona.clone(),
            max_tokens: config.backend.max_tokens,
            decision_temperature: config.backend.decision_temperature,
            chat_temperature: config.backend.chat_temperature,
        }
    }

    /// Produce a Decision for one turn. Never fails.
    pub async fn decide(
        &self,
        user_input: &str,
        context: &ContextBundle,
        tool_schemas: &[Value],
    ) -> Decision {
        let prompt = self.build_decision_prompt(user_input, context, tool_schemas);
        let request = BackendRequest::new(prompt)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.decision_temperature)
            .with_stop(vec!["User:".into(), "\n\n\n".into()]);

        match self.backend.complete(request).await {
            Ok(raw) => {
                let decision = parse_decision(&raw);
                debug!(intent = ?decision.intent, has_tool = decision.tool_call.is_some(), "Decision parsed");
                decision
            }
            Err(e) => {
                warn!("Backend invocation failed: {e}");
                Decision::chat(APOLOGY)
            }
        }
    }

    /// Plain chat path: no tool framing, low temperature, short replies.
    /// Degrades to a generic apology instead of erroring.
    pub async fn simple_chat(&self, message: &str, max_tokens: u32) -> String {
        let prompt = format!(
            "You are {}, {}.\n\nUser: {message}\nAssistant:",
            self.agent_name, self.persona
        );
        let request = BackendRequest::new(prompt)
            .with_max_tokens(max_tokens)
            .with_temperature(self.chat_temperature)
            .with_stop(vec!["User:".into()]);

        match self.backend.complete(request).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!("Simple chat failed: {e}");
                APOLOGY.to_string()
            }
        }
    }

    /// Re-narrate raw tool output in light of the original user input.
    /// Used by the dispatcher for content-producing tools.
    pub async fn explain_content(
        &self,
        tool_name: &str,
        content: &str,
        user_input: &str,
    ) -> String {
        let preview: String = content.chars().take(EXPLAIN_INPUT_CHARS).collect();
        let prompt = format!(
            "The tool '{tool_name}' returned this data:\n\n{preview}\n\n\
             The user asked: '{user_input}'. Explain this data to them briefly."
        );
        self.simple_chat(&prompt, 300).await
    }

    fn build_decision_prompt(
        &self,
        user_input: &str,
        context: &ContextBundle,
        tool_schemas: &[Value],
    ) -> String {
        let user_name = context
            .profile
            .get("user_name")
            .map(String::as_str)
            .unwrap_or("the user");
        let tone = context
            .profile
            .get("tone")
            .map(String::as_str)
            .unwrap_or("friendly");

        // Last 3 turns, role-labeled
        let history: String = context
            .conversation
            .iter()
            .rev()
            .take(3)
            .rev()
            .map(|t| format!("{}: {}\n", t.role, t.content))
            .collect();
        let history_block = if history.is_empty() {
            "(first interaction)".to_string()
        } else {
            history
        };

        let memories_block = if context.relevant_memories.is_empty() {
            String::new()
        } else {
            let lines: String = context
                .relevant_memories
                .iter()
                .map(|m| format!("- {m}\n"))
                .collect();
            format!("\nTHINGS YOU REMEMBER:\n{lines}")
        };

        let screen_block = match &context.screen {
            Some(screen) => format!(
                "\nSCREEN:\n- active window: {}\n- clipboard: {}\n",
                screen.active_window, screen.clipboard_preview
            ),
            None => String::new(),
        };

        let tools_json =
            serde_json::to_string_pretty(tool_schemas).unwrap_or_else(|_| "[]".into());

        format!(
            r#"You are {name}, {persona}.

USER:
- name: {user_name}
- preferred tone: {tone}
- time: {weekday} {time}, {date}
{memories_block}{screen_block}
RECENT CONVERSATION:
{history_block}
TASK:
Understand the user's request and pick the right action.

AVAILABLE TOOLS:
{tools_json}

ANSWER FORMAT (a single JSON object, nothing else):
{{
  "intent": "command" or "query" or "chat",
  "tool_call": {{"name": "tool_name", "arguments": {{"param": "value"}}}} or null,
  "response": "short message for the user"
}}

RULES:
1. Fill "tool_call" only when a tool should run, otherwise use null.
2. Always answer with valid JSON.
3. Keep the tone '{tone}' and the answer short.

User: {input}

Assistant (JSON only):"#,
            name = self.agent_name,
            persona = self.persona,
            user_name = user_name,
            tone = tone,
            weekday = context.temporal.day_of_week,
            time = context.temporal.current_time,
            date = context.temporal.current_date,
            memories_block = memories_block,
            screen_block = screen_block,
            history_block = history_block,
            tools_json = tools_json,
            input = user_input,
        )
    }
}

/// Parse raw backend output into a well-formed Decision.
///
/// Strips fenced-code delimiters, then parses as JSON. Parse failure is
/// not an error: the raw text becomes a chat fallback. On success,
/// missing `intent` defaults to chat and a missing `response` is
/// backfilled with a truncated prefix of the raw text, so the dispatcher
/// never receives a malformed Decision.
pub fn parse_decision(raw: &str) -> Decision {
    let cleaned = strip_fences(raw);

    match serde_json::from_str::<Decision>(cleaned) {
        Ok(mut decision) => {
            if decision.response.trim().is_empty() {
                decision.response = cleaned.chars().take(BACKFILL_PREVIEW_CHARS).collect();
            }
            decision
        }
        Err(e) => {
            warn!("Decision parse failed ({e}); falling back to raw text");
            Decision {
                intent: Intent::Chat,
                tool_call: None,
                response: raw.trim().chars().take(FALLBACK_PREVIEW_CHARS).collect(),
            }
        }
    }
}

/// Cut the payload out of a ```json fenced block if one is present.
fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    for fence in ["```json", "```"] {
        if let Some(start) = trimmed.find(fence) {
            let after = &trimmed[start + fence.len()..];
            if let Some(end) = after.find("```") {
                return after[..end].trim();
            }
            return after.trim();
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sidekick_core::context::TemporalContext;
    use sidekick_core::error::BackendError;
    use sidekick_core::turn::ConversationTurn;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Scripted backend: returns queued outputs in order, then errors.
    struct MockBackend {
        outputs: Mutex<Vec<Result<String, BackendError>>>,
    }

    impl MockBackend {
        fn scripted(outputs: Vec<Result<String, BackendError>>) -> Arc<Self> {
            Arc::new(Self {
                outputs: Mutex::new(outputs),
            })
        }

        fn single(text: &str) -> Arc<Self> {
            Self::scripted(vec![Ok(text.to_string())])
        }
    }

    #[async_trait]
    impl Backend for MockBackend {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(&self, _request: BackendRequest) -> Result<String, BackendError> {
            let mut outputs = self.outputs.lock().unwrap();
            if outputs.is_empty() {
                return Err(BackendError::EmptyCompletion);
            }
            outputs.remove(0)
        }
    }

    fn bundle() -> ContextBundle {
        ContextBundle {
            profile: BTreeMap::from([
                ("user_name".to_string(), "Ada".to_string()),
                ("tone".to_string(), "technical".to_string()),
            ]),
            conversation: vec![
                ConversationTurn::user("hi"),
                ConversationTurn::assistant("hello"),
            ],
            temporal: TemporalContext::now(),
            screen: None,
            relevant_memories: vec!["the user likes Rust".into()],
        }
    }

    fn engine(backend: Arc<dyn Backend>) -> DecisionEngine {
        DecisionEngine::new(backend, &AppConfig::default())
    }

    #[tokio::test]
    async fn valid_json_parses_into_decision() {
        let backend = MockBackend::single(
            r#"{"intent": "command", "tool_call": {"name": "take_note", "arguments": {"text": "dentist"}}, "response": "Saved."}"#,
        );
        let decision = engine(backend).decide("note the dentist", &bundle(), &[]).await;
        assert_eq!(decision.intent, Intent::Command);
        assert_eq!(decision.tool_call.unwrap().name, "take_note");
        assert_eq!(decision.response, "Saved.");
    }

    #[tokio::test]
    async fn fenced_json_is_unwrapped() {
        let backend = MockBackend::single(
            "```json\n{\"intent\": \"query\", \"tool_call\": null, \"response\": \"42\"}\n```",
        );
        let decision = engine(backend).decide("answer?", &bundle(), &[]).await;
        assert_eq!(decision.intent, Intent::Query);
        assert_eq!(decision.response, "42");
    }

    #[tokio::test]
    async fn garbage_output_falls_back_to_chat() {
        let backend = MockBackend::single("I think the answer is probably yes.");
        let decision = engine(backend).decide("hm", &bundle(), &[]).await;
        assert_eq!(decision.intent, Intent::Chat);
        assert!(decision.tool_call.is_none());
        assert!(decision.response.contains("probably yes"));
    }

    #[tokio::test]
    async fn backend_failure_yields_apology_not_panic() {
        let backend = MockBackend::scripted(vec![Err(BackendError::Network("refused".into()))]);
        let decision = engine(backend).decide("hello", &bundle(), &[]).await;
        assert_eq!(decision.intent, Intent::Chat);
        assert!(!decision.response.is_empty());
    }

    #[tokio::test]
    async fn prompt_embeds_profile_history_and_tools() {
        let backend = MockBackend::single("{}");
        let engine = engine(backend);
        let schemas = vec![serde_json::json!({"name": "take_note"})];
        let prompt = engine.build_decision_prompt("note this", &bundle(), &schemas);
        assert!(prompt.contains("Ada"));
        assert!(prompt.contains("technical"));
        assert!(prompt.contains("User: hi"));
        assert!(prompt.contains("take_note"));
        assert!(prompt.contains("the user likes Rust"));
        assert!(prompt.contains("\"intent\""));
    }

    #[test]
    fn missing_response_is_backfilled() {
        let decision = parse_decision(r#"{"intent": "query", "tool_call": null}"#);
        assert_eq!(decision.intent, Intent::Query);
        assert!(!decision.response.is_empty());
    }

    #[test]
    fn fallback_response_is_truncated() {
        let long = "x".repeat(2000);
        let decision = parse_decision(&long);
        assert_eq!(decision.response.chars().count(), FALLBACK_PREVIEW_CHARS);
    }

    #[tokio::test]
    async fn simple_chat_survives_backend_failure() {
        let backend = MockBackend::scripted(vec![Err(BackendError::Timeout(60))]);
        let reply = engine(backend).simple_chat("hello", 64).await;
        assert!(!reply.is_empty());
    }
}
