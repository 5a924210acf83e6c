#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use sketchpad::{SketchApp, SketchConfig};
use uuid::Uuid;

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let loaded = SketchConfig::load_or_default(&SketchConfig::default_path());

    // Optional drawing id to open
    let open = std::env::args().nth(1).and_then(|arg| match Uuid::parse_str(&arg) {
        Ok(id) => Some(id),
        Err(err) => {
            log::warn!("ignoring drawing id {arg:?}: {err}");
            None
        }
    });

    let canvas = &loaded.config.canvas;
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([canvas.width as f32 + 220.0, canvas.height as f32])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Sketchpad",
        native_options,
        Box::new(move |cc| Ok(Box::new(SketchApp::new(cc, loaded, open)?))),
    )
}
