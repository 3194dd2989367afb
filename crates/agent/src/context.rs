//! Context assembly — gather everything one turn of reasoning needs.
//!
//! The assembler owns the in-process conversation window and pulls the
//! durable pieces (profile, memories) from the store. Store failures
//! degrade the affected section to its default rather than failing the
//! turn.

use sidekick_config::AppConfig;
use sidekick_core::context::{ContextBundle, EnvironmentSnapshot, ScreenContext, TemporalContext};
use sidekick_core::turn::ConversationTurn;
use sidekick_store::Store;
use std::collections::{BTreeMap, VecDeque};
use tracing::warn;

/// Clipboard text entering the prompt is cut to this many chars.
const CLIPBOARD_PREVIEW_CHARS: usize = 100;

/// Profile attributes assumed when the store has no value for them.
const PROFILE_DEFAULTS: &[(&str, &str)] = &[
    ("user_name", "there"),
    ("tone", "friendly"),
    ("expertise", "general"),
];

pub struct ContextAssembler {
    store: Store,
    /// Oldest-first turn history, pruned to twice the window size.
    window: VecDeque<ConversationTurn>,
    window_size: usize,
    recall_limit: usize,
}

impl ContextAssembler {
    pub fn new(store: Store, config: &AppConfig) -> Self {
        Self {
            store,
            window: VecDeque::new(),
            window_size: config.conversation.window_size,
            recall_limit: config.memory.recall_limit,
        }
    }

    /// Build the bundle for one turn. Infallible: sections the store
    /// cannot provide fall back to defaults or empty.
    pub async fn build_context(
        &self,
        user_input: &str,
        environment: Option<&EnvironmentSnapshot>,
    ) -> ContextBundle {
        ContextBundle {
            profile: self.load_profile().await,
            conversation: self.recent_turns(),
            temporal: TemporalContext::now(),
            screen: environment.and_then(screen_context),
            relevant_memories: self.load_memories(user_input).await,
        }
    }

    async fn load_profile(&self) -> BTreeMap<String, String> {
        let mut profile: BTreeMap<String, String> = PROFILE_DEFAULTS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        match self.store.profile_all().await {
            Ok(stored) => profile.extend(stored),
            Err(e) => warn!("Profile unavailable, using defaults: {e}"),
        }
        profile
    }

    async fn load_memories(&self, user_input: &str) -> Vec<String> {
        let mut memories = Vec::new();
        match self.store.recall(user_input).await {
            Ok(Some(hit)) => memories.push(hit),
            Ok(None) => {}
            Err(e) => warn!("Memory recall failed: {e}"),
        }
        match self.store.recent_valid(self.recall_limit).await {
            Ok(entries) => {
                for entry in entries {
                    if !memories.contains(&entry.value) {
                        memories.push(entry.value);
                    }
                }
            }
            Err(e) => warn!("Recent memories unavailable: {e}"),
        }
        memories.truncate(self.recall_limit);
        memories
    }

    /// The last `window_size` turns, oldest first.
    fn recent_turns(&self) -> Vec<ConversationTurn> {
        let skip = self.window.len().saturating_sub(self.window_size);
        self.window.iter().skip(skip).cloned().collect()
    }

    /// Append a completed exchange, pruning to twice the window size.
    pub fn add_exchange(&mut self, user_input: &str, response: &str) {
        self.window.push_back(ConversationTurn::user(user_input));
        self.window.push_back(ConversationTurn::assistant(response));
        while self.window.len() > self.window_size * 2 {
            self.window.pop_front();
        }
    }

    /// Drop all in-process history. Durable state is untouched.
    pub fn clear(&mut self) {
        self.window.clear();
    }

    pub fn turn_count(&self) -> usize {
        self.window.len()
    }
}

fn screen_context(snapshot: &EnvironmentSnapshot) -> Option<ScreenContext> {
    if snapshot.window_title.is_none() && snapshot.clipboard.is_none() {
        return None;
    }
    let clipboard_preview = snapshot
        .clipboard
        .as_deref()
        .map(|c| c.chars().take(CLIPBOARD_PREVIEW_CHARS).collect())
        .unwrap_or_default();
    Some(ScreenContext {
        active_window: snapshot.window_title.clone().unwrap_or_default(),
        clipboard_preview,
        captured_at: snapshot.captured_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn assembler() -> ContextAssembler {
        let store = Store::open_in_memory().await.unwrap();
        ContextAssembler::new(store, &AppConfig::default())
    }

    #[tokio::test]
    async fn defaults_fill_missing_profile_attributes() {
        let a = assembler().await;
        let bundle = a.build_context("hello", None).await;
        assert_eq!(bundle.profile["user_name"], "there");
        assert_eq!(bundle.profile["tone"], "friendly");
        assert_eq!(bundle.profile["expertise"], "general");
    }

    #[tokio::test]
    async fn stored_profile_overrides_defaults() {
        let a = assembler().await;
        a.store.upsert_profile("user_name", "Sam").await.unwrap();
        let bundle = a.build_context("hello", None).await;
        assert_eq!(bundle.profile["user_name"], "Sam");
        assert_eq!(bundle.profile["tone"], "friendly");
    }

    #[tokio::test]
    async fn window_prunes_but_bundle_sees_only_window_size() {
        let mut a = assembler().await;
        for i in 0..10 {
            a.add_exchange(&format!("question {i}"), &format!("answer {i}"));
        }
        // Ten exchanges = 20 turns, pruned to 2 * window_size.
        assert_eq!(a.turn_count(), 10);

        let bundle = a.build_context("next", None).await;
        assert_eq!(bundle.conversation.len(), 5);
        assert_eq!(bundle.conversation.last().unwrap().content, "answer 9");
    }

    #[tokio::test]
    async fn clipboard_preview_is_truncated() {
        let a = assembler().await;
        let env = EnvironmentSnapshot {
            window_title: Some("editor".into()),
            clipboard: Some("x".repeat(500)),
            captured_at: None,
        };
        let bundle = a.build_context("hello", Some(&env)).await;
        let screen = bundle.screen.unwrap();
        assert_eq!(screen.clipboard_preview.len(), 100);
        assert_eq!(screen.active_window, "editor");
    }

    #[tokio::test]
    async fn empty_snapshot_yields_no_screen_section() {
        let a = assembler().await;
        let bundle = a
            .build_context("hello", Some(&EnvironmentSnapshot::default()))
            .await;
        assert!(bundle.screen.is_none());
    }

    #[tokio::test]
    async fn memories_prefer_the_direct_hit() {
        let a = assembler().await;
        a.store
            .promote("when is my dentist appointment", "Tuesday at 3pm")
            .await
            .unwrap();
        a.store.promote("other fact", "the wifi password is hunter2").await.unwrap();

        let bundle = a.build_context("When is my dentist appointment?", None).await;
        assert_eq!(bundle.relevant_memories[0], "Tuesday at 3pm");
        assert!(bundle.relevant_memories.len() >= 2);
    }

    #[tokio::test]
    async fn clear_drops_history() {
        let mut a = assembler().await;
        a.add_exchange("hi", "hello");
        a.clear();
        assert_eq!(a.turn_count(), 0);
    }
}
