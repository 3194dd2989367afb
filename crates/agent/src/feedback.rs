//! Feedback commands — the `!` channel for rating the last answer.
//!
//! Feedback always targets an explicit turn record, handed back by the
//! pipeline when the turn completed. `approve` and `save` both promote
//! the exchange to long-term memory (save carries the stronger score),
//! and `reject` scores the interaction and invalidates whatever memory
//! the rated question maps to.

use sidekick_core::turn::TurnRecord;
use sidekick_store::Store;
use tracing::{info, warn};

const APPROVE_SCORE: i32 = 1;
const REJECT_SCORE: i32 = -1;
const SAVE_SCORE: i32 = 2;

pub struct FeedbackHandler {
    store: Store,
}

impl FeedbackHandler {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Apply one feedback command against the given turn record.
    /// Returns the acknowledgement line shown to the user.
    pub async fn handle(&self, command: &str, target: Option<&TurnRecord>) -> String {
        let command = command.trim().to_lowercase();
        let Some(record) = target else {
            return "There's nothing to rate yet — ask me something first.".into();
        };

        match command.as_str() {
            "approve" | "good" => {
                self.score(record, "approve", APPROVE_SCORE).await;
                if let Err(e) = self
                    .store
                    .promote(&record.user_input, &record.response)
                    .await
                {
                    warn!("Promotion failed: {e}");
                }
                "Thanks, glad that helped.".into()
            }
            "reject" | "bad" => {
                self.score(record, "reject", REJECT_SCORE).await;
                match self.store.invalidate(&record.user_input).await {
                    Ok(true) => {
                        info!("Memory invalidated for rejected answer");
                        "Understood — I've forgotten what I thought I knew about that.".into()
                    }
                    Ok(false) => "Understood, I'll try to do better.".into(),
                    Err(e) => {
                        warn!("Invalidation failed: {e}");
                        "Understood, I'll try to do better.".into()
                    }
                }
            }
            "save" => {
                self.score(record, "save", SAVE_SCORE).await;
                match self
                    .store
                    .promote(&record.user_input, &record.response)
                    .await
                {
                    Ok(()) => "Saved — I'll remember that one.".into(),
                    Err(e) => {
                        warn!("Promotion failed: {e}");
                        "I couldn't save that just now.".into()
                    }
                }
            }
            other => format!(
                "I don't know the feedback command '{other}'. Try !approve, !reject, or !save."
            ),
        }
    }

    async fn score(&self, record: &TurnRecord, kind: &str, score: i32) {
        if let Err(e) = self
            .store
            .record_feedback(record.interaction_id, kind, score)
            .await
        {
            warn!("Feedback write failed: {e}");
        }
    }
}
