//! Built-in tool implementations for sidekick.
//!
//! Tools give the agent hands: saving notes and todos, launching apps,
//! reading the clipboard and documents, arming reminders, searching the
//! web, and remembering lasting user facts.

pub mod clipboard;
pub mod document;
pub mod launcher;
pub mod note;
pub mod profile;
pub mod reminder;
pub mod todo;
pub mod web_search;

use sidekick_core::error::ToolError;
use sidekick_core::tool::ToolRegistry;
use sidekick_store::Store;
use sidekick_watch::{DesktopProbe, ReminderScheduler};
use std::path::PathBuf;
use std::sync::Arc;

/// Build the stock registry with every built-in tool.
///
/// `notes_path` is where `take_note` appends; reminders go through the
/// shared scheduler so they surface on the same channel as observer events.
pub fn default_registry(
    store: Store,
    probe: Arc<dyn DesktopProbe>,
    scheduler: Arc<ReminderScheduler>,
    notes_path: PathBuf,
) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(note::TakeNoteTool::new(notes_path)))?;
    registry.register(Box::new(todo::AddTodoTool::new(store.clone())))?;
    registry.register(Box::new(todo::ListTodosTool::new(store.clone())))?;
    registry.register(Box::new(launcher::LaunchAppTool::with_defaults()))?;
    registry.register(Box::new(clipboard::ReadClipboardTool::new(probe)))?;
    registry.register(Box::new(document::ReadDocumentTool))?;
    registry.register(Box::new(reminder::SetReminderTool::new(scheduler)))?;
    registry.register(Box::new(web_search::WebSearchTool))?;
    registry.register(Box::new(profile::RememberProfileTool::new(store)))?;
    Ok(registry)
}
