use std::time::Instant;

use crate::action::ToolKind;
use crate::command::Command;
use crate::components::ToolButton;
use crate::input::tool_key;
use crate::style::{Color, FontFamily};
use crate::util::time;
use crate::SketchApp;

pub fn tools_panel(app: &mut SketchApp, ctx: &egui::Context, now: Instant) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.heading("Drawing");
            let mut name = app.editor().name().to_owned();
            if ui.text_edit_singleline(&mut name).changed() {
                app.editor_mut().set_name(name);
            }
            ui.separator();

            ui.heading("Tools");
            let active = app.editor().state().tool;
            ui.horizontal_wrapped(|ui| {
                for tool in ToolKind::ALL {
                    let button = ToolButton::new(tool, active == tool).show(ui);
                    let button = match tool_key(tool) {
                        Some(key) => button.on_hover_text(format!("Shortcut: {}", key.name())),
                        None => button,
                    };
                    if button.clicked() {
                        log::info!("Tool selected from UI: {}", tool.name());
                        app.execute(Command::SelectTool(tool), now);
                    }
                }
            });
            ui.label(active.name());
            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Color");
                let mut color = app.editor().state().color.to_color32();
                if ui.color_edit_button_srgba(&mut color).changed() {
                    app.editor_mut().set_color(Color::from_color32(color));
                }
            });

            if active == ToolKind::Text {
                text_style(app, ui);
            }
            ui.separator();

            // Undo/Redo section
            ui.horizontal(|ui| {
                let history = app.editor().state().history();
                let (can_undo, can_redo) = (history.can_undo(), history.can_redo());

                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    app.execute(Command::Undo, now);
                }
                if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                    app.execute(Command::Redo, now);
                }
                if ui.button("Clear").clicked() {
                    app.execute(Command::Clear, now);
                }
            });

            let history = app.editor().state().history();
            ui.horizontal(|ui| {
                ui.label(format!("Undo stack size: {}", history.undo_depth()));
                ui.label(format!("Redo stack size: {}", history.redo_depth()));
            });
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    app.execute(Command::Save, now);
                }
                if ui.button("Download").clicked() {
                    app.download();
                }
                if ui.button("Export PNG").clicked() {
                    app.export_png();
                }
            });

            ui.horizontal(|ui| {
                if app.is_saving() {
                    ui.spinner();
                    ui.label("Saving...");
                } else if let Some(saved) = app.last_saved() {
                    ui.label(format!("Last saved {}", time::clock_label(saved)));
                }
            });
            if let Some(status) = app.status() {
                let color = if status.is_error() {
                    ui.visuals().error_fg_color
                } else {
                    ui.visuals().text_color()
                };
                ui.colored_label(color, status.text());
            }

            ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                let report = app.editor().last_report();
                ui.weak(format!(
                    "{} actions, {} skipped",
                    app.editor().state().log().len(),
                    report.skipped
                ));
                ui.weak(format!("Drawings in {}", app.drawings_dir().display()));
            });
        });
}

fn text_style(app: &mut SketchApp, ui: &mut egui::Ui) {
    let mut style = app.editor().state().font_style;

    egui::ComboBox::from_id_salt("font_family")
        .selected_text(style.family.name())
        .show_ui(ui, |ui| {
            for family in FontFamily::ALL {
                ui.selectable_value(&mut style.family, family, family.name());
            }
        });
    ui.horizontal(|ui| {
        ui.label("Size");
        let mut size = style.size;
        if ui.add(egui::DragValue::new(&mut size).range(8..=96).suffix("px")).changed() {
            style = style.with_size(size);
        }
    });
    ui.horizontal(|ui| {
        ui.checkbox(&mut style.bold, "Bold");
        ui.checkbox(&mut style.italic, "Italic");
        ui.checkbox(&mut style.underline, "Underline");
    });

    if style != app.editor().state().font_style {
        app.editor_mut().set_font_style(style);
    }
}
