//! # sidekick-core
//!
//! Core domain types and traits shared across the sidekick workspace:
//!
//! - [`decision`] — the structured per-turn output of the reasoning backend
//! - [`turn`] — conversation turns and persisted interactions
//! - [`memory`] — long-term memory entries and key normalization
//! - [`tool`] — the Tool trait and typed registration table
//! - [`backend`] — the reasoning backend boundary
//! - [`event`] — surface events emitted by the background loops
//! - [`error`] — the error taxonomy

pub mod backend;
pub mod context;
pub mod decision;
pub mod error;
pub mod event;
pub mod memory;
pub mod tool;
pub mod turn;

pub use backend::{Backend, BackendRequest};
pub use context::{ContextBundle, EnvironmentSnapshot, ScreenContext, TemporalContext};
pub use decision::{Decision, Intent, ToolCall};
pub use error::{BackendError, Error, Result, StoreError, ToolError};
pub use event::{SurfaceEvent, SurfaceSink};
pub use memory::{MemoryEntry, MemoryStatus, normalize_key};
pub use tool::{ParamKind, ParamSpec, Tool, ToolRegistry, ToolSpec};
pub use turn::{ConversationTurn, Interaction, Role, TurnRecord};
