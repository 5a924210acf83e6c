use egui::{Context, Key, Modifiers, Pos2, Response};

use crate::action::{Point, ToolKind};
use crate::command::Command;

/// Input events in canvas-local coordinates, as the drawing surface sees them
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed over the canvas
    PointerDown { pos: Point },
    /// Pointer moved while a press that started on the canvas is held
    PointerMove { pos: Point },
    /// Primary button released
    PointerUp { pos: Point },
    /// Pointer left the canvas while a press was held
    PointerLeave { pos: Point },
    /// Key was pressed
    KeyDown { key: Key, modifiers: Modifiers },
}

/// Single-letter tool shortcuts
pub const TOOL_KEYS: [(Key, ToolKind); 6] = [
    (Key::P, ToolKind::Pencil),
    (Key::R, ToolKind::Rectangle),
    (Key::C, ToolKind::Circle),
    (Key::T, ToolKind::Text),
    (Key::V, ToolKind::Select),
    (Key::E, ToolKind::Eraser),
];

/// The key that selects `tool`.
pub fn tool_key(tool: ToolKind) -> Option<Key> {
    TOOL_KEYS
        .iter()
        .find_map(|&(key, candidate)| (candidate == tool).then_some(key))
}

/// Map a key press to the command it triggers, if any.
///
/// Tool letters only fire without modifiers; `command` is Ctrl on most
/// platforms and Cmd on macOS.
pub fn shortcut_for(key: Key, modifiers: Modifiers) -> Option<Command> {
    if modifiers.command {
        return match key {
            Key::Z if modifiers.shift => Some(Command::Redo),
            Key::Z => Some(Command::Undo),
            Key::S => Some(Command::Save),
            _ => None,
        };
    }
    if modifiers.alt || modifiers.ctrl || modifiers.mac_cmd {
        return None;
    }
    TOOL_KEYS
        .iter()
        .find_map(|&(candidate, tool)| (candidate == key).then_some(Command::SelectTool(tool)))
}

/// Turns raw egui input into [`InputEvent`]s for one canvas widget.
///
/// A press only counts when it lands on the canvas; from then on moves are
/// reported until the button is released or the pointer leaves the canvas.
#[derive(Debug, Default)]
pub struct InputHandler {
    pressed: bool,
    last_pointer_pos: Option<Pos2>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect this frame's events for the canvas allocated as `canvas`.
    pub fn process(&mut self, ctx: &Context, canvas: &Response) -> Vec<InputEvent> {
        let rect = canvas.rect;
        let hovered = canvas.hovered();
        let keyboard_free = !ctx.wants_keyboard_input();
        let local = |pos: Pos2| Point::from(pos - rect.min.to_vec2());

        let mut events = Vec::new();
        ctx.input(|input| {
            let pointer = &input.pointer;
            match pointer.latest_pos() {
                Some(pos) => {
                    let inside = rect.contains(pos);
                    if pointer.primary_pressed() && hovered && inside {
                        events.push(InputEvent::PointerDown { pos: local(pos) });
                        self.pressed = true;
                        self.last_pointer_pos = Some(pos);
                    } else if self.pressed {
                        if !inside {
                            events.push(InputEvent::PointerLeave { pos: local(pos) });
                            self.pressed = false;
                        } else if self.last_pointer_pos != Some(pos) {
                            events.push(InputEvent::PointerMove { pos: local(pos) });
                        }
                        self.last_pointer_pos = Some(pos);
                    }

                    if self.pressed && pointer.primary_released() {
                        events.push(InputEvent::PointerUp { pos: local(pos) });
                        self.pressed = false;
                    }
                }
                None if self.pressed => {
                    // Pointer left the window mid-press
                    let pos = self.last_pointer_pos.unwrap_or(rect.min);
                    events.push(InputEvent::PointerLeave { pos: local(pos) });
                    self.pressed = false;
                }
                None => {}
            }

            if keyboard_free {
                for event in &input.raw.events {
                    if let egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } = event
                    {
                        events.push(InputEvent::KeyDown {
                            key: *key,
                            modifiers: *modifiers,
                        });
                    }
                }
            }
        });

        events
    }
}
