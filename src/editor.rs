//! One mounted drawing surface.
//!
//! The [`Editor`] owns everything a surface instance needs: its state
//! machine, its history, both raster surfaces and its auto-save timer. Input
//! goes in through [`Editor::handle_input`] and [`Editor::execute`]; the
//! effects of every transition are carried out before those return, so the
//! surfaces always match the state when the frame is drawn.

use std::io::Cursor;
use std::time::Instant;

use thiserror::Error;
use uuid::Uuid;

use crate::action::Point;
use crate::command::Command;
use crate::config::SketchConfig;
use crate::input::{shortcut_for, InputEvent};
use crate::renderer::{RenderReport, Renderer, Surface, SurfaceError};
use crate::state::persistence::{self, DecodeError, EncodeError};
use crate::state::{AutoSave, DrawingSurfaceState, HydrationPolicy};
use crate::storage::{self, Download, SaveRequest, UNTITLED};
use crate::style::{Color, FontStyle};
use crate::tools::{self, Effects, PreviewShape, PreviewUpdate};

/// Errors exporting the persistent surface as an image
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("surface could not be converted to an image")]
    EmptySurface,

    #[error("failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
}

/// What the caller has to do after an input or command.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Reaction {
    pub effects: Effects,
    /// A save the caller should hand to the drawing store
    pub save: Option<SaveRequest>,
}

impl From<Effects> for Reaction {
    fn from(effects: Effects) -> Self {
        Self {
            effects,
            save: None,
        }
    }
}

pub struct Editor {
    id: Uuid,
    name: String,
    state: DrawingSurfaceState,
    renderer: Renderer,
    surface: Surface,
    overlay: Surface,
    autosave: AutoSave,
    last_report: RenderReport,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("actions", &self.state.log().len())
            .field("gesture", &self.state.gesture.state_name())
            .field("surface", &self.surface)
            .finish()
    }
}

impl Editor {
    /// Mount a surface for drawing `id`, hydrating it from `payload` when one
    /// is given.
    ///
    /// A payload that cannot be decoded does not stop the mount: the surface
    /// starts empty and the decode error is handed back for the caller to
    /// show.
    pub fn mount(
        config: &SketchConfig,
        renderer: Renderer,
        id: Uuid,
        name: impl Into<String>,
        payload: Option<&str>,
    ) -> Result<(Self, Option<DecodeError>), SurfaceError> {
        let surface = Surface::new(config.canvas.width, config.canvas.height)?;
        let overlay = Surface::new(config.canvas.width, config.canvas.height)?;
        let mut name = name.into();
        if name.trim().is_empty() {
            name = UNTITLED.to_owned();
        }

        let mut editor = Self {
            id,
            name,
            state: DrawingSurfaceState::new(config.defaults),
            renderer,
            surface,
            overlay,
            autosave: AutoSave::new(config.autosave.quiet_period(), config.autosave.enabled),
            last_report: RenderReport::default(),
        };

        let mut decode_error = None;
        if let Some(payload) = payload {
            if let Err(err) = editor.hydrate(payload, config.hydration) {
                log::warn!("could not load drawing {id}: {err}");
                decode_error = Some(err);
            }
        }
        editor.repaint();
        log::info!(
            "mounted drawing {:?} ({id}) at {}x{}",
            editor.name,
            editor.surface.width(),
            editor.surface.height()
        );
        Ok((editor, decode_error))
    }

    /// Replace the log with the one in `payload`. On error nothing changes.
    pub fn hydrate(&mut self, payload: &str, policy: HydrationPolicy) -> Result<(), DecodeError> {
        let log = persistence::deserialize(payload)?;
        self.state.hydrate(log, policy);
        self.renderer.clear_preview(&mut self.overlay);
        self.repaint();
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn state(&self) -> &DrawingSurfaceState {
        &self.state
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// The persistent surface holding every committed action
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// The overlay surface holding the rectangle or circle preview
    pub fn overlay(&self) -> &Surface {
        &self.overlay
    }

    pub fn last_report(&self) -> RenderReport {
        self.last_report
    }

    pub fn autosave(&self) -> &AutoSave {
        &self.autosave
    }

    /// Feed one input event through the tool state machine.
    ///
    /// Keyboard shortcuts are ignored while the text prompt is open.
    pub fn handle_input(&mut self, event: &InputEvent, now: Instant) -> Reaction {
        let effects = match *event {
            InputEvent::PointerDown { pos } => tools::on_pointer_down(&mut self.state, pos),
            InputEvent::PointerMove { pos } => tools::on_pointer_move(&mut self.state, pos),
            InputEvent::PointerUp { pos } => tools::on_pointer_up(&mut self.state, pos),
            InputEvent::PointerLeave { pos } => tools::on_pointer_leave(&mut self.state, pos),
            InputEvent::KeyDown { key, modifiers } => {
                if self.state.gesture.is_text_prompt() {
                    return Reaction::default();
                }
                return match shortcut_for(key, modifiers) {
                    Some(command) => self.execute(command, now),
                    None => Reaction::default(),
                };
            }
        };
        self.apply(effects, now);
        effects.into()
    }

    /// Run a toolbar or keyboard command.
    pub fn execute(&mut self, command: Command, now: Instant) -> Reaction {
        log::debug!("executing {}", command.name());
        let changed = |changed: bool| {
            if changed {
                Effects {
                    repaint_committed: true,
                    preview: PreviewUpdate::Unchanged,
                    log_changed: true,
                }
            } else {
                Effects::none()
            }
        };

        let effects = match command {
            Command::SelectTool(tool) => {
                self.state.set_tool(tool);
                Effects::none()
            }
            Command::Undo => changed(self.state.undo()),
            Command::Redo => changed(self.state.redo()),
            Command::Clear => {
                self.state.clear();
                changed(true)
            }
            Command::Save => {
                return Reaction {
                    effects: Effects::none(),
                    save: self.save_request_logged(),
                }
            }
        };
        self.apply(effects, now);
        effects.into()
    }

    pub fn set_color(&mut self, color: Color) {
        self.state.set_color(color);
    }

    pub fn set_font_style(&mut self, font_style: FontStyle) {
        self.state.set_font_style(font_style);
    }

    /// Replace the text of the open prompt.
    pub fn edit_draft(&mut self, text: &str) {
        tools::edit_draft(&mut self.state, text);
    }

    pub fn submit_text(&mut self, now: Instant) -> Effects {
        let effects = tools::submit_text(&mut self.state);
        self.apply(effects, now);
        effects
    }

    pub fn cancel_text(&mut self, now: Instant) -> Effects {
        let effects = tools::cancel_text(&mut self.state);
        self.apply(effects, now);
        effects
    }

    /// Where the open text prompt sits on the canvas, if one is open.
    pub fn draft_position(&self) -> Option<Point> {
        self.state.gesture.draft().map(|draft| draft.position)
    }

    /// The current log, encoded for the drawing store.
    pub fn save_request(&self) -> Result<SaveRequest, EncodeError> {
        Ok(SaveRequest {
            id: self.id,
            name: self.name.clone(),
            content: persistence::serialize(self.state.log())?,
        })
    }

    fn save_request_logged(&self) -> Option<SaveRequest> {
        match self.save_request() {
            Ok(request) => Some(request),
            Err(err) => {
                log::error!("could not encode drawing {:?}: {err}", self.name);
                None
            }
        }
    }

    /// The current log as a downloadable `<name>.json` file.
    pub fn download(&self) -> Result<Download, EncodeError> {
        Ok(Download {
            filename: storage::download_filename(&self.name),
            content: persistence::serialize(self.state.log())?,
        })
    }

    /// The persistent surface encoded as PNG.
    pub fn export_png(&self) -> Result<Vec<u8>, ExportError> {
        let image = self.surface.to_rgba_image().ok_or(ExportError::EmptySurface)?;
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, image::ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }

    /// Suggested file name for [`Editor::export_png`].
    pub fn png_filename(&self) -> String {
        format!("{}.png", storage::file_stem(&self.name))
    }

    /// A save request once the auto-save quiet period has run out.
    pub fn poll_autosave(&mut self, now: Instant) -> Option<SaveRequest> {
        if self.autosave.poll(now) {
            log::debug!("auto-saving {:?}", self.name);
            self.save_request_logged()
        } else {
            None
        }
    }

    /// Recreate both surfaces at the new size and repaint them.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        if width == self.surface.width() && height == self.surface.height() {
            return Ok(());
        }
        let surface = Surface::new(width, height)?;
        let overlay = Surface::new(width, height)?;
        self.surface = surface;
        self.overlay = overlay;
        log::debug!("resized surfaces to {width}x{height}");

        self.repaint();
        if let Some(drag) = self.state.gesture.drag().filter(|drag| drag.tool.is_shape_tool()) {
            let preview = PreviewShape {
                tool: drag.tool,
                anchor: drag.anchor,
                current: drag.current,
                color: drag.color,
            };
            self.renderer.render_preview(&mut self.overlay, &preview);
        }
        Ok(())
    }

    /// Stop the surface: a pending auto-save never fires after this.
    pub fn teardown(&mut self) {
        if self.autosave.is_pending() {
            log::debug!("cancelling pending auto-save of {:?}", self.name);
        }
        self.autosave.cancel();
    }

    fn repaint(&mut self) {
        self.last_report = self
            .renderer
            .render_committed(&mut self.surface, self.state.visible_actions());
    }

    fn apply(&mut self, effects: Effects, now: Instant) {
        if effects.repaint_committed {
            self.repaint();
        }
        match effects.preview {
            PreviewUpdate::Unchanged => {}
            PreviewUpdate::Draw(preview) => self.renderer.render_preview(&mut self.overlay, &preview),
            PreviewUpdate::Clear => self.renderer.clear_preview(&mut self.overlay),
        }
        if effects.log_changed {
            self.autosave.touch(now);
        }
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        self.teardown();
    }
}
