//! Long-term memory value objects.
//!
//! A memory entry is a promoted (query, response) pair. Keys are
//! normalized query text and are not unique across time: promotion always
//! appends a new row, and lookup returns the newest `valid` row for a
//! key. Invalidation flips status and never deletes, so rejected answers
//! stay auditable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a memory entry is still authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryStatus {
    Valid,
    Invalid,
}

impl MemoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryStatus::Valid => "valid",
            MemoryStatus::Invalid => "invalid",
        }
    }
}

/// One promoted memory row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Normalized query text this entry answers.
    pub key: String,
    /// The promoted response text.
    pub value: String,
    pub status: MemoryStatus,
    pub created_at: DateTime<Utc>,
}

/// Normalize free-form query text into a memory key: lowercase, strip
/// punctuation, collapse whitespace. Two differently punctuated inputs
/// with the same words must produce the same key.
pub fn normalize_key(query: &str) -> String {
    let cleaned: String = query
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
