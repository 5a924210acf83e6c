use std::time::Instant;

use crate::action::ToolKind;
use crate::SketchApp;

/// The canvas: the persistent surface with the overlay on top, sized to
/// fill the panel.
pub fn central_panel(app: &mut SketchApp, ctx: &egui::Context, now: Instant) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none().fill(egui::Color32::from_gray(200)))
        .show(ctx, |ui| {
            let available = ui.available_size();
            let (width, height) = (available.x.max(1.0) as u32, available.y.max(1.0) as u32);
            app.resize_canvas(width, height);

            let (response, painter) = ui.allocate_painter(
                egui::vec2(width as f32, height as f32),
                egui::Sense::click_and_drag(),
            );
            let rect = response.rect;

            // Input first, so this frame already shows its effects.
            app.process_canvas_input(ctx, &response, now);

            painter.rect_filled(rect, 0.0, egui::Color32::WHITE);
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            for texture in app.canvas_textures(ctx) {
                painter.image(texture, rect, uv, egui::Color32::WHITE);
            }

            let tool = app.editor().state().tool;
            if response.hovered() && (tool.is_drag_tool() || tool == ToolKind::Text) {
                ctx.set_cursor_icon(egui::CursorIcon::Crosshair);
            }

            app.text_prompt(ctx, rect.min, now);
        });
}
