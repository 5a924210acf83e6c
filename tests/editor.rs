use std::sync::Arc;
use std::time::{Duration, Instant};

use egui::{Key, Modifiers};
use uuid::Uuid;

use sketchpad::action::{Action, Point, ToolKind};
use sketchpad::app::PromptBuffer;
use sketchpad::command::Command;
use sketchpad::config::SketchConfig;
use sketchpad::editor::Editor;
use sketchpad::input::InputEvent;
use sketchpad::renderer::{FontBook, Renderer};
use sketchpad::state::persistence::serialize;
use sketchpad::state::{DecodeError, HydrationPolicy};
use sketchpad::storage::{DrawingStore, LocalDrawingStore, SaveWorker};

fn config() -> SketchConfig {
    let mut config = SketchConfig::default();
    config.canvas.width = 80;
    config.canvas.height = 60;
    config.autosave.quiet_period_ms = 1000;
    config
}

fn mount(config: &SketchConfig, payload: Option<&str>) -> (Editor, Option<DecodeError>) {
    let renderer = Renderer::new(FontBook::builtin().unwrap());
    Editor::mount(config, renderer, Uuid::new_v4(), "Sketch", payload).unwrap()
}

fn drag(editor: &mut Editor, from: (f32, f32), to: (f32, f32), now: Instant) {
    editor.handle_input(&InputEvent::PointerDown { pos: Point::new(from.0, from.1) }, now);
    editor.handle_input(&InputEvent::PointerMove { pos: Point::new(to.0, to.1) }, now);
    editor.handle_input(&InputEvent::PointerUp { pos: Point::new(to.0, to.1) }, now);
}

fn key(editor: &mut Editor, key: Key, modifiers: Modifiers, now: Instant) {
    editor.handle_input(&InputEvent::KeyDown { key, modifiers }, now);
}

#[test]
fn test_mount_hydrates_and_paints() {
    let config = config();
    let now = Instant::now();
    let (mut source, _) = mount(&config, None);
    drag(&mut source, (5.0, 5.0), (30.0, 30.0), now);
    let payload = serialize(source.state().log()).unwrap();

    let (editor, error) = mount(&config, Some(&payload));
    assert!(error.is_none());
    assert_eq!(editor.state().log(), source.state().log());
    assert_eq!(editor.surface(), source.surface());
    assert!(!editor.state().history().can_undo());
}

#[test]
fn test_seed_undo_hydration() {
    let mut config = config();
    config.hydration = HydrationPolicy::SeedUndo;
    let payload = r##"{"version":"1.0","actions":[{"tool":"circle","color":"#000000","startX":1,"startY":1,"width":9,"height":9}]}"##;
    let (editor, _) = mount(&config, Some(payload));
    assert_eq!(editor.state().history().undo_depth(), 1);
}

#[test]
fn test_bad_payload_mounts_empty() {
    let (editor, error) = mount(&config(), Some("{ broken"));
    assert!(matches!(error, Some(DecodeError::Malformed(_))));
    assert!(editor.state().log().is_empty());
    assert!(editor.surface().is_blank());
}

#[test]
fn test_shape_preview_lives_on_the_overlay() {
    let (mut editor, _) = mount(&config(), None);
    let now = Instant::now();
    editor.execute(Command::SelectTool(ToolKind::Rectangle), now);

    editor.handle_input(&InputEvent::PointerDown { pos: Point::new(10.0, 10.0) }, now);
    editor.handle_input(&InputEvent::PointerMove { pos: Point::new(40.0, 40.0) }, now);
    assert!(!editor.overlay().is_blank());
    assert!(editor.surface().is_blank());

    editor.handle_input(&InputEvent::PointerUp { pos: Point::new(40.0, 40.0) }, now);
    assert!(editor.overlay().is_blank());
    assert!(!editor.surface().is_blank());
}

#[test]
fn test_pencil_is_painted_while_drawing() {
    let (mut editor, _) = mount(&config(), None);
    let now = Instant::now();
    editor.handle_input(&InputEvent::PointerDown { pos: Point::new(10.0, 10.0) }, now);
    editor.handle_input(&InputEvent::PointerMove { pos: Point::new(40.0, 10.0) }, now);
    assert!(editor.state().log().is_empty());
    assert!(editor.surface().pixel_alpha(25, 10).unwrap() > 0);
}

#[test]
fn test_shortcuts() {
    let (mut editor, _) = mount(&config(), None);
    let now = Instant::now();
    key(&mut editor, Key::R, Modifiers::NONE, now);
    assert_eq!(editor.state().tool, ToolKind::Rectangle);

    drag(&mut editor, (5.0, 5.0), (20.0, 20.0), now);
    assert_eq!(editor.state().log().len(), 1);
    key(&mut editor, Key::Z, Modifiers::COMMAND, now);
    assert!(editor.state().log().is_empty());
    let redo = Modifiers {
        shift: true,
        ..Modifiers::COMMAND
    };
    key(&mut editor, Key::Z, redo, now);
    assert_eq!(editor.state().log().len(), 1);

    let reaction = editor.handle_input(&InputEvent::KeyDown { key: Key::S, modifiers: Modifiers::COMMAND }, now);
    let save = reaction.save.unwrap();
    assert_eq!(save.name, "Sketch");
    assert_eq!(save.id, editor.id());
}

#[test]
fn test_shortcuts_are_suppressed_during_text_entry() {
    let (mut editor, _) = mount(&config(), None);
    let now = Instant::now();
    key(&mut editor, Key::T, Modifiers::NONE, now);
    editor.handle_input(&InputEvent::PointerDown { pos: Point::new(10.0, 30.0) }, now);
    assert!(editor.state().gesture.is_text_prompt());

    key(&mut editor, Key::R, Modifiers::NONE, now);
    let reaction = editor.handle_input(&InputEvent::KeyDown { key: Key::S, modifiers: Modifiers::COMMAND }, now);
    assert_eq!(editor.state().tool, ToolKind::Text);
    assert!(reaction.save.is_none());

    editor.edit_draft("note");
    editor.submit_text(now);
    assert_eq!(editor.state().log().len(), 1);
    assert!(!editor.surface().is_blank());
}

#[test]
fn test_clicking_elsewhere_opens_a_fresh_prompt() {
    let (mut editor, _) = mount(&config(), None);
    let now = Instant::now();
    let mut prompt = PromptBuffer::default();
    key(&mut editor, Key::T, Modifiers::NONE, now);

    editor.handle_input(&InputEvent::PointerDown { pos: Point::new(10.0, 30.0) }, now);
    prompt.sync(&editor);
    assert!(prompt.take_focus());
    prompt.text_mut().push_str("first");
    editor.edit_draft(prompt.text());
    prompt.sync(&editor);
    assert!(!prompt.take_focus());

    editor.handle_input(&InputEvent::PointerDown { pos: Point::new(40.0, 20.0) }, now);
    prompt.sync(&editor);
    assert_eq!(editor.state().log().len(), 1);
    assert!(matches!(&editor.state().log()[0], Action::Text { text, .. } if text == "first"));
    assert_eq!(editor.draft_position(), Some(Point::new(40.0, 20.0)));
    assert_eq!(prompt.text(), "");
    assert!(prompt.take_focus());

    editor.cancel_text(now);
    prompt.sync(&editor);
    assert_eq!(prompt, PromptBuffer::default());
}

#[test]
fn test_autosave_fires_after_quiet_period() {
    let (mut editor, _) = mount(&config(), None);
    let start = Instant::now();
    drag(&mut editor, (5.0, 5.0), (20.0, 20.0), start);

    assert!(editor.poll_autosave(start + Duration::from_millis(500)).is_none());
    // Another change pushes the deadline back.
    drag(&mut editor, (5.0, 5.0), (25.0, 25.0), start + Duration::from_millis(600));
    assert!(editor.poll_autosave(start + Duration::from_millis(1200)).is_none());

    let request = editor.poll_autosave(start + Duration::from_millis(1700)).unwrap();
    assert_eq!(request.content, serialize(editor.state().log()).unwrap());
    assert!(editor.poll_autosave(start + Duration::from_secs(10)).is_none());
}

#[test]
fn test_teardown_cancels_autosave() {
    let (mut editor, _) = mount(&config(), None);
    let start = Instant::now();
    drag(&mut editor, (5.0, 5.0), (20.0, 20.0), start);
    editor.teardown();
    assert!(editor.poll_autosave(start + Duration::from_secs(60)).is_none());
}

#[test]
fn test_clear_and_undo() {
    let (mut editor, _) = mount(&config(), None);
    let now = Instant::now();
    drag(&mut editor, (5.0, 5.0), (20.0, 20.0), now);
    drag(&mut editor, (30.0, 30.0), (50.0, 40.0), now);
    let painted = editor.surface().clone();

    editor.execute(Command::Clear, now);
    assert!(editor.surface().is_blank());
    editor.execute(Command::Undo, now);
    assert_eq!(editor.state().log().len(), 2);
    assert_eq!(editor.surface(), &painted);
}

#[test]
fn test_resize_repaints_everything() {
    let (mut editor, _) = mount(&config(), None);
    let now = Instant::now();
    drag(&mut editor, (5.0, 5.0), (20.0, 20.0), now);

    editor.resize(120, 90).unwrap();
    assert_eq!(editor.surface().width(), 120);
    assert_eq!(editor.overlay().height(), 90);
    assert!(editor.surface().pixel_alpha(5, 12).unwrap() > 0);
    assert!(editor.resize(0, 90).is_err());
}

#[test]
fn test_download_and_png_export() {
    let (mut editor, _) = mount(&config(), None);
    editor.set_name("My: Drawing");
    let download = editor.download().unwrap();
    assert_eq!(download.filename, "My_ Drawing.json");
    assert_eq!(download.content, r#"{"actions":[],"version":"1.0"}"#);

    let png = editor.export_png().unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(editor.png_filename(), "My_ Drawing.png");
}

#[test]
fn test_save_worker_writes_records() {
    let dir = std::env::temp_dir().join(format!("sketchpad-test-{}", Uuid::new_v4()));
    let store = Arc::new(LocalDrawingStore::new(&dir));
    let mut worker = SaveWorker::new(Arc::clone(&store) as Arc<dyn DrawingStore>).unwrap();

    let (mut editor, _) = mount(&config(), None);
    drag(&mut editor, (5.0, 5.0), (20.0, 20.0), Instant::now());
    let request = editor.save_request().unwrap();
    worker.submit(request.clone());

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut outcomes = Vec::new();
    while outcomes.is_empty() && Instant::now() < deadline {
        outcomes = worker.drain();
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].result.is_ok());
    assert!(!worker.is_saving());

    let record = store.load(request.id).unwrap().unwrap();
    assert_eq!(record.name, "Sketch");
    assert_eq!(record.content, request.content);
    assert_eq!(store.list().unwrap().len(), 1);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_later_save_of_a_drawing_wins() {
    let dir = std::env::temp_dir().join(format!("sketchpad-test-{}", Uuid::new_v4()));
    let store = Arc::new(LocalDrawingStore::new(&dir));
    let mut worker = SaveWorker::new(Arc::clone(&store) as Arc<dyn DrawingStore>).unwrap();

    let (mut editor, _) = mount(&config(), None);
    let now = Instant::now();
    let mut requests = Vec::new();
    for end in [20.0, 30.0, 40.0, 50.0] {
        drag(&mut editor, (5.0, 5.0), (end, end), now);
        requests.push(editor.save_request().unwrap());
    }
    for request in &requests {
        worker.submit(request.clone());
    }
    assert!(worker.is_saving());

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut outcomes = Vec::new();
    while outcomes.len() < requests.len() && Instant::now() < deadline {
        outcomes.extend(worker.drain());
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(outcomes.len(), requests.len());
    assert!(outcomes.iter().all(|outcome| outcome.result.is_ok()));
    assert!(outcomes.windows(2).all(|pair| pair[0].finished_at <= pair[1].finished_at));

    let latest = requests.last().unwrap();
    let record = store.load(latest.id).unwrap().unwrap();
    assert_eq!(record.content, latest.content);
    assert_eq!(store.list().unwrap().len(), 1);

    drop(worker);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_dropping_the_worker_finishes_queued_saves() {
    let dir = std::env::temp_dir().join(format!("sketchpad-test-{}", Uuid::new_v4()));
    let store = Arc::new(LocalDrawingStore::new(&dir));
    let mut worker = SaveWorker::new(Arc::clone(&store) as Arc<dyn DrawingStore>).unwrap();

    let (mut editor, _) = mount(&config(), None);
    drag(&mut editor, (5.0, 5.0), (20.0, 20.0), Instant::now());
    let request = editor.save_request().unwrap();
    worker.submit(request.clone());
    drop(worker);

    let record = store.load(request.id).unwrap().unwrap();
    assert_eq!(record.content, request.content);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_oversized_text_does_not_stop_the_mount() {
    let payload = r##"{"version":"1.0","actions":[
        {"tool":"text","color":"#000000","startX":5,"startY":30,"text":"Huge",
         "fontStyle":{"family":"Arial","size":200000,"bold":false,"italic":false,"underline":false}},
        {"tool":"rectangle","color":"#ff0000","startX":10,"startY":10,"width":20,"height":20}
    ]}"##;
    let (editor, err) = mount(&config(), Some(payload));
    assert!(err.is_none());
    assert_eq!(editor.state().log().len(), 2);
    assert_eq!(editor.last_report().skipped, 1);
    assert!(!editor.surface().is_blank());
}
