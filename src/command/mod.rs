mod history;

use crate::action::ToolKind;

pub use history::{History, Snapshot};

/// Editor-level requests that do not come from a pointer gesture: toolbar
/// buttons and keyboard shortcuts both resolve to one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Make `ToolKind` the active tool
    SelectTool(ToolKind),
    /// Restore the log as it was before the last commit
    Undo,
    /// Re-apply the last undone change
    Redo,
    /// Wipe the canvas (undoable)
    Clear,
    /// Hand the current payload to the drawing store
    Save,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::SelectTool(tool) => tool.name(),
            Command::Undo => "Undo",
            Command::Redo => "Redo",
            Command::Clear => "Clear",
            Command::Save => "Save",
        }
    }
}
