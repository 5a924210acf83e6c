use sketchpad::action::{Action, Point, ToolKind};
use sketchpad::state::{DrawingSurfaceState, Gesture};
use sketchpad::style::{Color, FontFamily, FontStyle};
use sketchpad::tools::{
    cancel_text, edit_draft, on_pointer_down, on_pointer_leave, on_pointer_move, on_pointer_up, submit_text,
    PreviewUpdate,
};

fn state_with(tool: ToolKind) -> DrawingSurfaceState {
    let mut state = DrawingSurfaceState::default();
    state.set_tool(tool);
    state
}

fn p(x: f32, y: f32) -> Point {
    Point::new(x, y)
}

#[test]
fn test_pencil_stroke_scenario() {
    let mut state = state_with(ToolKind::Pencil);
    on_pointer_down(&mut state, p(0.0, 0.0));
    on_pointer_move(&mut state, p(10.0, 0.0));
    on_pointer_move(&mut state, p(10.0, 10.0));

    // The open stroke is visible but not yet committed.
    assert!(state.log().is_empty());
    assert_eq!(state.visible_actions().count(), 1);

    let effects = on_pointer_up(&mut state, p(10.0, 10.0));
    assert!(effects.log_changed);
    assert_eq!(state.log().len(), 1);
    let committed = state.log()[0].clone();
    match &committed {
        Action::Pencil { points, .. } => {
            assert_eq!(points, &vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)])
        }
        other => panic!("expected pencil action, got {other:?}"),
    }

    assert!(state.undo());
    assert!(state.log().is_empty());
    assert!(state.redo());
    assert_eq!(state.log(), &[committed]);
}

#[test]
fn test_rectangle_keeps_signed_extent() {
    let mut state = state_with(ToolKind::Rectangle);
    state.set_color(Color::rgb(255, 0, 0));
    on_pointer_down(&mut state, p(5.0, 5.0));
    let effects = on_pointer_move(&mut state, p(3.0, 3.0));
    assert!(matches!(effects.preview, PreviewUpdate::Draw(_)));
    assert!(state.log().is_empty());

    let effects = on_pointer_up(&mut state, p(2.0, 2.0));
    assert_eq!(effects.preview, PreviewUpdate::Clear);
    assert_eq!(
        state.log(),
        &[Action::Rectangle {
            color: Color::rgb(255, 0, 0),
            start_x: 5.0,
            start_y: 5.0,
            width: -3.0,
            height: -3.0,
        }]
    );
}

#[test]
fn test_leaving_the_surface_commits() {
    let mut state = state_with(ToolKind::Circle);
    on_pointer_down(&mut state, p(0.0, 0.0));
    on_pointer_move(&mut state, p(20.0, 10.0));
    let effects = on_pointer_leave(&mut state, p(30.0, 10.0));
    assert!(effects.log_changed);
    assert!(state.gesture.is_idle());
    assert!(matches!(
        state.log(),
        [Action::Circle { width, height, .. }] if *width == 30.0 && *height == 10.0
    ));
}

#[test]
fn test_move_without_press_is_ignored() {
    let mut state = state_with(ToolKind::Pencil);
    let effects = on_pointer_move(&mut state, p(1.0, 1.0));
    assert!(!effects.repaint_committed);
    assert!(state.gesture.is_idle());
    assert!(!on_pointer_up(&mut state, p(1.0, 1.0)).log_changed);
}

#[test]
fn test_blank_text_is_discarded() {
    let mut state = state_with(ToolKind::Text);
    on_pointer_down(&mut state, p(4.0, 20.0));
    assert!(state.gesture.is_text_prompt());

    edit_draft(&mut state, "   ");
    let effects = submit_text(&mut state);
    assert!(!effects.log_changed);
    assert!(state.log().is_empty());
    assert!(!state.history().can_undo());
    assert!(state.gesture.is_idle());
}

#[test]
fn test_text_copies_style_at_submit() {
    let mut state = state_with(ToolKind::Text);
    let style = FontStyle {
        family: FontFamily::Courier,
        size: 24,
        bold: true,
        italic: false,
        underline: true,
    };
    state.set_font_style(style);
    on_pointer_down(&mut state, p(4.0, 20.0));
    edit_draft(&mut state, "hello");
    submit_text(&mut state);

    state.set_font_style(FontStyle::default());
    assert_eq!(
        state.log(),
        &[Action::Text {
            color: Color::BLACK,
            start_x: 4.0,
            start_y: 20.0,
            text: "hello".to_owned(),
            font_style: style,
        }]
    );
}

#[test]
fn test_cancel_leaves_log_alone() {
    let mut state = state_with(ToolKind::Text);
    on_pointer_down(&mut state, p(1.0, 1.0));
    edit_draft(&mut state, "draft");
    cancel_text(&mut state);
    assert_eq!(state.gesture, Gesture::Idle);
    assert!(state.log().is_empty());
}

#[test]
fn test_click_elsewhere_submits_open_draft() {
    let mut state = state_with(ToolKind::Text);
    on_pointer_down(&mut state, p(1.0, 1.0));
    edit_draft(&mut state, "first");
    on_pointer_down(&mut state, p(50.0, 50.0));

    assert_eq!(state.log().len(), 1);
    assert_eq!(state.gesture.draft().map(|draft| draft.position), Some(p(50.0, 50.0)));
}

#[test]
fn test_select_and_eraser_are_inert() {
    for tool in [ToolKind::Select, ToolKind::Eraser] {
        let mut state = state_with(tool);
        on_pointer_down(&mut state, p(1.0, 1.0));
        on_pointer_move(&mut state, p(5.0, 5.0));
        on_pointer_up(&mut state, p(5.0, 5.0));
        assert!(state.log().is_empty());
        assert!(!state.history().can_undo());
    }
}
