//! The turn pipeline — one user input in, one response out.
//!
//! Order inside a turn is fixed: assemble context, decide, dispatch,
//! persist, then grow the conversation window. A single async mutex
//! serializes turns so concurrent calls cannot interleave their reads
//! and writes of the window.

use crate::context::ContextAssembler;
use crate::dispatch::Dispatcher;
use crate::feedback::FeedbackHandler;
use sidekick_brain::DecisionEngine;
use sidekick_config::AppConfig;
use sidekick_core::context::EnvironmentSnapshot;
use sidekick_core::decision::Intent;
use sidekick_core::tool::ToolRegistry;
use sidekick_core::turn::TurnRecord;
use sidekick_store::Store;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct Agent {
    engine: Arc<DecisionEngine>,
    dispatcher: Dispatcher,
    feedback: FeedbackHandler,
    store: Store,
    auto_promote_min_len: usize,
    inner: Mutex<Inner>,
}

struct Inner {
    assembler: ContextAssembler,
    last_turn: Option<TurnRecord>,
}

impl Agent {
    pub fn new(
        store: Store,
        engine: Arc<DecisionEngine>,
        registry: ToolRegistry,
        config: &AppConfig,
    ) -> Self {
        Self {
            dispatcher: Dispatcher::new(registry, engine.clone()),
            feedback: FeedbackHandler::new(store.clone()),
            engine,
            auto_promote_min_len: config.memory.auto_promote_min_len,
            inner: Mutex::new(Inner {
                assembler: ContextAssembler::new(store.clone(), config),
                last_turn: None,
            }),
            store,
        }
    }

    /// Run one full turn. Always returns something to say.
    pub async fn handle_turn(
        &self,
        user_input: &str,
        environment: Option<&EnvironmentSnapshot>,
    ) -> String {
        let mut inner = self.inner.lock().await;

        let context = inner.assembler.build_context(user_input, environment).await;
        let schemas = self.dispatcher.registry().schemas();
        let decision = self.engine.decide(user_input, &context, &schemas).await;
        let response = self.dispatcher.dispatch(&decision, user_input).await;

        match self.store.insert_interaction(user_input, &response).await {
            Ok(id) => {
                inner.last_turn = Some(TurnRecord {
                    interaction_id: id,
                    user_input: user_input.to_string(),
                    response: response.clone(),
                });
            }
            Err(e) => {
                warn!("Interaction not persisted: {e}");
                inner.last_turn = None;
            }
        }

        // Substantial answers to questions are worth remembering unprompted.
        if decision.intent == Intent::Query
            && response.chars().count() > self.auto_promote_min_len
        {
            match self.store.promote(user_input, &response).await {
                Ok(()) => debug!("Answer auto-promoted to memory"),
                Err(e) => warn!("Auto-promotion failed: {e}"),
            }
        }

        inner.assembler.add_exchange(user_input, &response);
        response
    }

    /// Apply a `!` feedback command against the most recent turn.
    pub async fn feedback(&self, command: &str) -> String {
        let inner = self.inner.lock().await;
        self.feedback.handle(command, inner.last_turn.as_ref()).await
    }

    /// Forget the in-process conversation. Durable state survives.
    pub async fn reset_session(&self) -> String {
        let mut inner = self.inner.lock().await;
        inner.assembler.clear();
        inner.last_turn = None;
        info!("Session reset");
        "Fresh start — what's on your mind?".into()
    }
}
