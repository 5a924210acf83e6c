mod editor_state;
pub mod autosave;
pub mod persistence;

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionLog, ToolKind};
use crate::command::History;
use crate::style::{Color, FontStyle};

pub use autosave::AutoSave;
pub use editor_state::{Drag, Gesture, TextDraft};
pub use persistence::{DecodeError, EncodeError, PersistedPayload, PAYLOAD_VERSION};

/// What hydrating a saved drawing does to the undo stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HydrationPolicy {
    /// Loaded drawings start with empty undo/redo stacks
    #[default]
    Clean,
    /// Seed one undo snapshot equal to the loaded log, like older builds did
    SeedUndo,
}

/// Initial tool, color and text style for a new surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceDefaults {
    pub tool: ToolKind,
    pub color: Color,
    pub font_style: FontStyle,
}

/// Everything one drawing surface owns: the current tool and styles, the
/// gesture in progress, the action log and its history.
///
/// The log and history are private; they only change through the history
/// operations below, which keeps the "checkpoint before append" ordering in
/// one place.
#[derive(Debug, Clone, Default)]
pub struct DrawingSurfaceState {
    pub tool: ToolKind,
    pub color: Color,
    pub font_style: FontStyle,
    pub gesture: Gesture,
    log: ActionLog,
    history: History,
}

impl DrawingSurfaceState {
    pub fn new(defaults: SurfaceDefaults) -> Self {
        Self {
            tool: defaults.tool,
            color: defaults.color,
            font_style: defaults.font_style,
            ..Self::default()
        }
    }

    /// Adopt a previously saved log.
    pub fn hydrate(&mut self, log: ActionLog, policy: HydrationPolicy) {
        self.gesture = Gesture::Idle;
        match policy {
            HydrationPolicy::Clean => self.history.reset(),
            HydrationPolicy::SeedUndo => self.history.seed(&log),
        }
        log::info!("hydrated surface with {} actions ({policy:?})", log.len());
        self.log = log;
    }

    pub fn log(&self) -> &[Action] {
        &self.log
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// The committed log followed by the pencil stroke still being drawn.
    pub fn visible_actions(&self) -> impl Iterator<Item = Action> + '_ {
        let open = self.gesture.open_stroke().map(|stroke| stroke.to_action());
        self.log.iter().cloned().chain(open)
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.tool != tool {
            log::debug!("tool changed: {:?} -> {:?}", self.tool, tool);
        }
        self.tool = tool;
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_font_style(&mut self, font_style: FontStyle) {
        self.font_style = font_style;
    }

    /// Checkpoint the current log, then append `action`.
    pub fn commit(&mut self, action: Action) {
        log::debug!("commit {:?} action", action.kind());
        self.history.apply(&mut self.log, action);
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.log)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.log)
    }

    /// Wipe the log as an undoable change.
    pub fn clear(&mut self) {
        self.history.clear(&mut self.log);
    }
}
