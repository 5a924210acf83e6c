use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::Point;
use crate::command::Command;
use crate::config::LoadedConfig;
use crate::editor::Editor;
use crate::error::AppError;
use crate::input::{InputEvent, InputHandler};
use crate::panels::{central_panel, tools_panel};
use crate::renderer::{FontBook, Renderer};
use crate::storage::{DirectoryOffer, DrawingStore, FileOffer, LocalDrawingStore, SaveWorker, UNTITLED};
use crate::texture_manager::SurfaceTexture;
use crate::util::time;

/// What survives a restart through eframe's storage.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct PersistedApp {
    last_drawing: Option<Uuid>,
}

/// A message for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Info(text) | Status::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

/// The shell's editable copy of the open text prompt.
///
/// [`PromptBuffer::sync`] runs after every editor transition. When the
/// editor's draft no longer matches the buffer, the buffer takes the
/// editor's text and asks for focus if a prompt is open.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PromptBuffer {
    text: String,
    position: Option<Point>,
    focus: bool,
}

impl PromptBuffer {
    pub fn sync(&mut self, editor: &Editor) {
        let draft = editor.state().gesture.draft();
        let position = draft.map(|draft| draft.position);
        let text = draft.map_or("", |draft| draft.text.as_str());
        if position != self.position || text != self.text {
            self.text = text.to_owned();
            self.position = position;
            self.focus = position.is_some();
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    /// True once after a prompt opened.
    pub fn take_focus(&mut self) -> bool {
        std::mem::take(&mut self.focus)
    }
}

pub struct SketchApp {
    editor: Editor,
    store: Arc<LocalDrawingStore>,
    saver: SaveWorker,
    offer: DirectoryOffer,
    input: InputHandler,
    surface_texture: SurfaceTexture,
    overlay_texture: SurfaceTexture,
    /// Text shown in the open prompt, mirrored into the editor on change
    prompt: PromptBuffer,
    confirm_clear: bool,
    status: Option<Status>,
    last_saved: Option<DateTime<Local>>,
}

impl SketchApp {
    /// Called once before the first frame.
    ///
    /// Opens `open` if given, else the drawing open when the app last quit,
    /// else a new drawing.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        loaded: LoadedConfig,
        open: Option<Uuid>,
    ) -> Result<Self, AppError> {
        let config = &loaded.config;
        let mut status = loaded
            .reset_reason
            .as_ref()
            .map(|reason| Status::Error(format!("Using default settings: {reason}")));

        let fonts = match FontBook::load(&config.fonts) {
            Ok(fonts) => fonts,
            Err(err) => {
                log::warn!("{err}; falling back to built-in fonts");
                status = Some(Status::Error(err.to_string()));
                FontBook::builtin()?
            }
        };
        let renderer = Renderer::new(fonts)
            .with_line_width(config.canvas.line_width)
            .with_underline_offset(config.canvas.underline_offset);

        let persisted: PersistedApp = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        let id = open.or(persisted.last_drawing).unwrap_or_else(Uuid::new_v4);

        let store = Arc::new(LocalDrawingStore::new(&config.storage.drawings_dir));
        let record = match store.load(id) {
            Ok(record) => record,
            Err(err) => {
                log::warn!("could not read drawing {id}: {err}");
                status = Some(Status::Error(format!("Could not open drawing: {err}")));
                None
            }
        };
        let (name, payload) = match record {
            Some(record) => (record.name, Some(record.content)),
            None => (UNTITLED.to_owned(), None),
        };

        let (editor, decode_error) = Editor::mount(config, renderer, id, name, payload.as_deref())?;
        if let Some(err) = decode_error {
            status = Some(Status::Error(format!("Drawing could not be loaded: {err}")));
        }

        let saver = SaveWorker::new(Arc::clone(&store) as Arc<dyn DrawingStore>)?;
        Ok(Self {
            editor,
            store,
            saver,
            offer: DirectoryOffer::new(&config.storage.downloads_dir),
            input: InputHandler::new(),
            surface_texture: SurfaceTexture::new("persistent_surface"),
            overlay_texture: SurfaceTexture::new("overlay_surface"),
            prompt: PromptBuffer::default(),
            confirm_clear: false,
            status,
            last_saved: None,
        })
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn last_saved(&self) -> Option<&DateTime<Local>> {
        self.last_saved.as_ref()
    }

    pub fn is_saving(&self) -> bool {
        self.saver.is_saving()
    }

    pub fn drawings_dir(&self) -> &std::path::Path {
        self.store.dir()
    }

    /// Feed this frame's canvas input to the editor.
    pub fn process_canvas_input(&mut self, ctx: &egui::Context, canvas: &egui::Response, now: Instant) {
        for event in self.input.process(ctx, canvas) {
            self.handle_input(&event, now);
        }
    }

    fn handle_input(&mut self, event: &InputEvent, now: Instant) {
        let reaction = self.editor.handle_input(event, now);
        if let Some(request) = reaction.save {
            self.saver.submit(request);
        }
        self.prompt.sync(&self.editor);
    }

    /// Run a toolbar command. Clearing asks for confirmation first.
    pub fn execute(&mut self, command: Command, now: Instant) {
        if command == Command::Clear {
            self.confirm_clear = true;
            return;
        }
        let reaction = self.editor.execute(command, now);
        if let Some(request) = reaction.save {
            self.saver.submit(request);
        }
    }

    pub fn download(&mut self) {
        let offered = self
            .editor
            .download()
            .map_err(|err| err.to_string())
            .and_then(|download| {
                self.offer
                    .offer(&download.filename, download.content.as_bytes())
                    .map_err(|err| err.to_string())
            });
        self.status = Some(match offered {
            Ok(path) => Status::Info(format!("Downloaded to {}", path.display())),
            Err(err) => Status::Error(format!("Download failed: {err}")),
        });
    }

    pub fn export_png(&mut self) {
        let filename = self.editor.png_filename();
        let exported = self
            .editor
            .export_png()
            .map_err(|err| err.to_string())
            .and_then(|png| self.offer.offer(&filename, &png).map_err(|err| err.to_string()));
        self.status = Some(match exported {
            Ok(path) => Status::Info(format!("Exported {}", path.display())),
            Err(err) => Status::Error(format!("Export failed: {err}")),
        });
    }

    /// Recreate the surfaces when the canvas area changed size.
    pub fn resize_canvas(&mut self, width: u32, height: u32) {
        if let Err(err) = self.editor.resize(width, height) {
            log::warn!("{err}");
        }
    }

    /// Texture ids for the persistent and overlay surfaces, in paint order.
    pub fn canvas_textures(&mut self, ctx: &egui::Context) -> [egui::TextureId; 2] {
        [
            self.surface_texture.texture_id(ctx, self.editor.surface()),
            self.overlay_texture.texture_id(ctx, self.editor.overlay()),
        ]
    }

    /// The text prompt floating over the canvas at the draft position.
    pub fn text_prompt(&mut self, ctx: &egui::Context, canvas_origin: egui::Pos2, now: Instant) {
        let Some(position) = self.editor.draft_position() else {
            return;
        };

        egui::Area::new(egui::Id::new("text_prompt"))
            .fixed_pos(canvas_origin + egui::vec2(position.x, position.y))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    // Enter submits and Shift+Enter falls through as a newline.
                    let submit = ui.input_mut(|input| {
                        !input.modifiers.shift && input.consume_key(egui::Modifiers::NONE, egui::Key::Enter)
                    });
                    let cancel = ui.input_mut(|input| input.consume_key(egui::Modifiers::NONE, egui::Key::Escape));

                    let edit = ui.add(
                        egui::TextEdit::multiline(self.prompt.text_mut())
                            .desired_rows(2)
                            .desired_width(220.0)
                            .hint_text("Enter text"),
                    );
                    if self.prompt.take_focus() {
                        edit.request_focus();
                    }
                    if edit.changed() {
                        self.editor.edit_draft(self.prompt.text());
                    }

                    let mut add = false;
                    let mut close = false;
                    ui.horizontal(|ui| {
                        add = ui.button("Add").clicked();
                        close = ui.button("Cancel").clicked();
                    });

                    if submit || add {
                        self.editor.submit_text(now);
                    } else if cancel || close {
                        self.editor.cancel_text(now);
                    }
                    self.prompt.sync(&self.editor);
                });
            });
    }

    fn clear_confirmation(&mut self, ctx: &egui::Context, now: Instant) {
        if !self.confirm_clear {
            return;
        }
        egui::Window::new("Clear canvas")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("Are you sure you want to clear the canvas?");
                ui.horizontal(|ui| {
                    if ui.button("Clear").clicked() {
                        self.editor.execute(Command::Clear, now);
                        self.confirm_clear = false;
                    }
                    if ui.button("Cancel").clicked() {
                        self.confirm_clear = false;
                    }
                });
            });
    }

    fn collect_saves(&mut self) {
        for outcome in self.saver.drain() {
            match outcome.result {
                Ok(()) => {
                    self.status = Some(Status::Info(format!(
                        "Saved {:?} at {}",
                        outcome.name,
                        time::clock_label(&outcome.finished_at)
                    )));
                    self.last_saved = Some(outcome.finished_at);
                }
                Err(err) => self.status = Some(Status::Error(format!("Save failed: {err}"))),
            }
        }
    }
}

impl eframe::App for SketchApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let persisted = PersistedApp {
            last_drawing: Some(self.editor.id()),
        };
        eframe::set_value(storage, eframe::APP_KEY, &persisted);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.collect_saves();
        if let Some(request) = self.editor.poll_autosave(now) {
            self.saver.submit(request);
        }

        tools_panel(self, ctx, now);
        central_panel(self, ctx, now);
        self.clear_confirmation(ctx, now);

        if let Some(remaining) = self.editor.autosave().remaining(now) {
            ctx.request_repaint_after(remaining);
        }
        if self.saver.is_saving() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
