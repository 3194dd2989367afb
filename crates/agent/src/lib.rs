//! The sidekick turn pipeline.
//!
//! [`pipeline::Agent`] is the single entry point for a conversation:
//! it assembles context, asks the engine for a decision, dispatches any
//! tool call, persists the turn, and handles feedback against it.

pub mod context;
pub mod dispatch;
pub mod feedback;
pub mod pipeline;

pub use context::ContextAssembler;
pub use dispatch::Dispatcher;
pub use feedback::FeedbackHandler;
pub use pipeline::Agent;
