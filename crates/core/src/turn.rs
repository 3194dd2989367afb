//! Conversation turn value objects.
//!
//! A turn is one user input through to one finalized assistant response.
//! Turns live in the bounded in-process window only — they are ephemeral
//! and cleared on session reset or restart. The durable record of a turn
//! is the `Interaction` row written by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "User"),
            Role::Assistant => write!(f, "Assistant"),
        }
    }
}

/// One entry in the bounded conversation window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A persisted interaction row, one per completed turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub id: i64,
    pub user_input: String,
    pub response_text: String,
    pub created_at: DateTime<Utc>,
}

/// The outcome of one completed pipeline turn, threaded explicitly to the
/// feedback loop instead of living in ambient mutable state.
#[derive(Debug, Clone)]
pub struct TurnRecord {
    /// Row id of the Interaction this turn produced.
    pub interaction_id: i64,
    pub user_input: String,
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_labels() {
        assert_eq!(Role::User.to_string(), "User");
        assert_eq!(Role::Assistant.to_string(), "Assistant");
    }

    #[test]
    fn turn_serialization_uses_lowercase_role() {
        let turn = ConversationTurn::user("hello");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("\"role\":\"user\""));
    }
}
