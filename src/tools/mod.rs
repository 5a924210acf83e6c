//! Pointer and text-prompt handling for a drawing surface.
//!
//! Each handler takes the surface state by reference, applies one transition
//! of the [`Gesture`] machine and reports what has to be repainted.

use crate::action::{Action, Point};
use crate::state::{Drag, DrawingSurfaceState, Gesture, TextDraft};
use crate::style::Color;

mod open_stroke;
pub use open_stroke::OpenStroke;

pub use crate::action::ToolKind;

/// A rectangle or circle preview for the overlay surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewShape {
    pub tool: ToolKind,
    pub anchor: Point,
    pub current: Point,
    pub color: Color,
}

/// What the overlay surface should do after a transition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PreviewUpdate {
    #[default]
    Unchanged,
    Draw(PreviewShape),
    Clear,
}

/// Side effects of a transition for the caller to carry out.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Effects {
    /// The persistent surface must be repainted from the visible actions
    pub repaint_committed: bool,
    pub preview: PreviewUpdate,
    /// The committed log changed (schedule an autosave)
    pub log_changed: bool,
}

impl Effects {
    pub fn none() -> Self {
        Self::default()
    }

    fn committed() -> Self {
        Self {
            repaint_committed: true,
            preview: PreviewUpdate::Clear,
            log_changed: true,
        }
    }

    /// Combine two effect sets, the later preview update winning.
    pub fn merge(self, later: Effects) -> Effects {
        Effects {
            repaint_committed: self.repaint_committed || later.repaint_committed,
            preview: match later.preview {
                PreviewUpdate::Unchanged => self.preview,
                other => other,
            },
            log_changed: self.log_changed || later.log_changed,
        }
    }
}

/// Handle pointer press on the canvas.
///
/// An open text prompt is submitted first, and a drag that never saw its
/// pointer-up is finished first, so the surface always starts from `Idle`.
pub fn on_pointer_down(state: &mut DrawingSurfaceState, pos: Point) -> Effects {
    let mut effects = Effects::none();
    if state.gesture.is_text_prompt() {
        effects = submit_text(state);
    } else if let Some(last) = state.gesture.drag().map(|drag| drag.current) {
        effects = on_pointer_up(state, last);
    }

    let tool = state.tool;
    let started = match tool {
        ToolKind::Pencil => {
            state.gesture = Gesture::Dragging(Drag {
                tool,
                color: state.color,
                anchor: pos,
                current: pos,
                stroke: Some(OpenStroke::new(state.color, pos)),
            });
            Effects {
                repaint_committed: true,
                ..Effects::none()
            }
        }
        ToolKind::Rectangle | ToolKind::Circle => {
            state.gesture = Gesture::Dragging(Drag {
                tool,
                color: state.color,
                anchor: pos,
                current: pos,
                stroke: None,
            });
            Effects::none()
        }
        ToolKind::Text => {
            state.gesture = Gesture::TextPrompt(TextDraft {
                position: pos,
                text: String::new(),
            });
            Effects::none()
        }
        // Selectable, but nothing happens on the canvas.
        ToolKind::Select | ToolKind::Eraser => Effects::none(),
    };
    effects.merge(started)
}

/// Handle pointer movement. Only matters while dragging.
pub fn on_pointer_move(state: &mut DrawingSurfaceState, pos: Point) -> Effects {
    let Gesture::Dragging(drag) = &mut state.gesture else {
        return Effects::none();
    };
    drag.current = pos;

    if let Some(stroke) = &mut drag.stroke {
        stroke.add_point(pos);
        return Effects {
            repaint_committed: true,
            ..Effects::none()
        };
    }

    if drag.tool.is_shape_tool() {
        return Effects {
            preview: PreviewUpdate::Draw(PreviewShape {
                tool: drag.tool,
                anchor: drag.anchor,
                current: pos,
                color: drag.color,
            }),
            ..Effects::none()
        };
    }
    Effects::none()
}

/// Handle pointer release: the drag is turned into an action and committed.
pub fn on_pointer_up(state: &mut DrawingSurfaceState, pos: Point) -> Effects {
    if !state.gesture.is_dragging() {
        return Effects::none();
    }
    let Gesture::Dragging(mut drag) = std::mem::take(&mut state.gesture) else {
        return Effects::none();
    };
    drag.current = pos;

    let action = match drag.stroke.take() {
        Some(stroke) => Some(stroke.finish()),
        None => drag.pending_shape(),
    };
    match action {
        Some(action) => {
            state.commit(action);
            Effects::committed()
        }
        None => Effects {
            preview: PreviewUpdate::Clear,
            ..Effects::none()
        },
    }
}

/// The pointer left the surface; treated exactly like a release at `pos`.
pub fn on_pointer_leave(state: &mut DrawingSurfaceState, pos: Point) -> Effects {
    on_pointer_up(state, pos)
}

/// Replace the text of the open draft. Ignored when no prompt is open.
pub fn edit_draft(state: &mut DrawingSurfaceState, text: &str) {
    if let Some(draft) = state.gesture.draft_mut() {
        draft.text.clear();
        draft.text.push_str(text);
    }
}

/// Close the text prompt, committing the draft unless it is blank.
///
/// The action takes the color and font style current at submit time; the
/// style is copied, so later style changes never touch committed text.
pub fn submit_text(state: &mut DrawingSurfaceState) -> Effects {
    if !state.gesture.is_text_prompt() {
        return Effects::none();
    }
    let Gesture::TextPrompt(draft) = std::mem::take(&mut state.gesture) else {
        return Effects::none();
    };

    if draft.text.trim().is_empty() {
        log::debug!("discarding blank text draft");
        return Effects::none();
    }

    state.commit(Action::Text {
        color: state.color,
        start_x: draft.position.x,
        start_y: draft.position.y,
        text: draft.text,
        font_style: state.font_style,
    });
    Effects::committed()
}

/// Close the text prompt without touching the log.
pub fn cancel_text(state: &mut DrawingSurfaceState) -> Effects {
    if state.gesture.is_text_prompt() {
        state.gesture = Gesture::Idle;
    }
    Effects::none()
}
