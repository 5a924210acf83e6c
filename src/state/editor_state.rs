/// The gesture state machine of a drawing surface.
///
/// Every pointer interaction moves the surface between three states:
///
/// ```text
///                 pointer-down (pencil/rectangle/circle)
///             ┌──────────────────────────────────────────►┌────────────┐
///             │                                           │  Dragging  │◄─┐ pointer-move
/// ┌────────┐  │◄──────────────────────────────────────────┤            ├──┘
/// │        ├──┘      pointer-up / pointer-leave (commit)  └────────────┘
/// │  Idle  │
/// │        ├──┐      pointer-down (text)                  ┌────────────┐
/// └────────┘  └──────────────────────────────────────────►│ TextPrompt │◄─┐ edit draft
///             ◄───────────────────────────────────────────┤            ├──┘
///                    submit (commit if non-blank) / cancel└────────────┘
/// ```
///
/// The transitions themselves live in [`crate::tools`]; this module only
/// holds the data each state carries.
use crate::action::{Action, Point, ToolKind};
use crate::style::Color;
use crate::tools::OpenStroke;

/// An in-flight drag. Tool and color are captured when the drag starts, so
/// changing either mid-drag does not affect the shape being drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    pub tool: ToolKind,
    pub color: Color,
    pub anchor: Point,
    pub current: Point,
    /// The stroke being grown, for pencil drags only
    pub stroke: Option<OpenStroke>,
}

impl Drag {
    /// The shape the drag would commit if released at `current`.
    pub fn pending_shape(&self) -> Option<Action> {
        Action::shape(self.tool, self.color, self.anchor, self.current)
    }
}

/// An open text prompt waiting for submit or cancel.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDraft {
    pub position: Point,
    pub text: String,
}

/// The possible states of a drawing surface's gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    /// No gesture in progress
    #[default]
    Idle,
    /// Pointer is held down with a drag tool
    Dragging(Drag),
    /// A text draft is open at a position
    TextPrompt(TextDraft),
}

impl Gesture {
    /// Returns true if no gesture is in progress
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    /// Returns true if the pointer is held down with a drag tool
    pub fn is_dragging(&self) -> bool {
        matches!(self, Gesture::Dragging(_))
    }

    /// Returns true while a text draft is open; keyboard shortcuts are
    /// suppressed in this state
    pub fn is_text_prompt(&self) -> bool {
        matches!(self, Gesture::TextPrompt(_))
    }

    pub fn drag(&self) -> Option<&Drag> {
        match self {
            Gesture::Dragging(drag) => Some(drag),
            _ => None,
        }
    }

    /// The pencil stroke currently being drawn, if any
    pub fn open_stroke(&self) -> Option<&OpenStroke> {
        self.drag().and_then(|drag| drag.stroke.as_ref())
    }

    pub fn draft(&self) -> Option<&TextDraft> {
        match self {
            Gesture::TextPrompt(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut TextDraft> {
        match self {
            Gesture::TextPrompt(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn state_name(&self) -> &'static str {
        match self {
            Gesture::Idle => "Idle",
            Gesture::Dragging(_) => "Dragging",
            Gesture::TextPrompt(_) => "TextPrompt",
        }
    }
}
