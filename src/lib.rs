#![warn(clippy::all, rust_2018_idioms)]

pub mod action;
pub mod app;
pub mod command;
pub mod components;
pub mod config;
pub mod editor;
pub mod error;
pub mod input;
pub mod panels;
pub mod renderer;
pub mod state;
pub mod storage;
pub mod style;
pub mod texture_manager;
pub mod tools;
pub mod util;

pub use action::{Action, ActionLog, Point, ToolKind};
pub use app::SketchApp;
pub use command::{Command, History};
pub use config::SketchConfig;
pub use editor::Editor;
pub use input::{InputEvent, InputHandler};
pub use renderer::{Renderer, Surface};
pub use state::{DrawingSurfaceState, Gesture, HydrationPolicy};
pub use style::{Color, FontFamily, FontStyle};
