//! Error types for the sidekick domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the top-level `Error`
//! wraps them all for callers that cross context boundaries.

use thiserror::Error;

/// The top-level error type for all sidekick operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures in the persistence layer.
///
/// Reads of advisory data (recent memories, profile) are expected to be
/// degraded to defaults by the caller; only the initial open is fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to open database: {0}")]
    Open(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Write failed: {0}")]
    Write(String),
}

/// Failures at the reasoning backend boundary.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("Backend request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Backend unreachable: {0}")]
    Network(String),

    #[error("Backend request timed out after {0}s")]
    Timeout(u64),

    #[error("Backend returned an empty completion")]
    EmptyCompletion,

    #[error("Backend not configured: {0}")]
    NotConfigured(String),
}

/// Failures in tool registration, binding, and execution.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid tool arguments for {tool_name}: {reason}")]
    InvalidArguments { tool_name: String, reason: String },

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool registration rejected: {0}")]
    Registration(String),
}
