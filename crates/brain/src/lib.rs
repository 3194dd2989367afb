//! Reasoning backend adapter for sidekick.
//!
//! [`engine::DecisionEngine`] owns prompt construction and output
//! parsing; [`http::HttpBackend`] talks to any OpenAI-compatible
//! completion server. The backend itself is opaque to the rest of the
//! system — everything else sees only well-formed [`Decision`]s.
//!
//! [`Decision`]: sidekick_core::decision::Decision

pub mod engine;
pub mod http;

pub use engine::{DecisionEngine, parse_decision};
pub use http::HttpBackend;
