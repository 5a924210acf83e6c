use sketchpad::action::{Action, ActionLog, Point};
use sketchpad::state::persistence::{decode_payload, deserialize, serialize, PersistedPayload, PAYLOAD_VERSION};
use sketchpad::state::DecodeError;
use sketchpad::style::{Color, FontFamily, FontStyle};

fn sample_log() -> ActionLog {
    vec![
        Action::Pencil {
            color: Color::rgb(0x12, 0x34, 0x56),
            points: vec![Point::new(0.0, 0.0), Point::new(10.5, 0.25), Point::new(10.0, 10.0)],
        },
        Action::Rectangle {
            color: Color::rgb(255, 0, 0),
            start_x: 5.0,
            start_y: 5.0,
            width: -3.0,
            height: -3.0,
        },
        Action::Circle {
            color: Color::rgb(0, 128, 0),
            start_x: 40.0,
            start_y: 40.0,
            width: 20.0,
            height: 10.0,
        },
        Action::Text {
            color: Color::BLACK,
            start_x: 12.0,
            start_y: 30.0,
            text: "Hello\nworld".to_owned(),
            font_style: FontStyle {
                family: FontFamily::TimesNewRoman,
                size: 20,
                bold: true,
                italic: true,
                underline: false,
            },
        },
    ]
}

#[test]
fn test_log_survives_a_round_trip() {
    let log = sample_log();
    let payload = serialize(&log).unwrap();
    assert_eq!(deserialize(&payload).unwrap(), log);
}

/// Every kind at fractional and negative coordinates, with the font and
/// color variations the wire format carries.
fn varied_logs() -> Vec<ActionLog> {
    let coords = [0.1_f32, 1.3333, -2.75, 123.456, 0.0, -0.5, 1e-3, 4096.25];
    let colors = [Color::BLACK, Color::rgb(0x12, 0x34, 0x56), Color::rgba(255, 128, 0, 64), Color::rgba(1, 2, 3, 0)];
    let texts = ["a", "Hello\nworld", "日本語 ✏️", "  padded  ", "quote \" and \\ slash"];

    let mut logs = vec![
        Vec::new(),
        vec![Action::Pencil {
            color: Color::BLACK,
            points: vec![Point::new(3.5, 7.25)],
        }],
    ];
    for seed in 0..24_usize {
        let at = |offset: usize| coords[(seed + offset) % coords.len()];
        let color = colors[seed % colors.len()];
        let mut log = Vec::new();
        log.push(Action::Pencil {
            color,
            points: (0..=seed % 5).map(|i| Point::new(at(i), at(i + 3))).collect(),
        });
        log.push(Action::Rectangle {
            color,
            start_x: at(1),
            start_y: at(2),
            width: at(3),
            height: at(4),
        });
        log.push(Action::Circle {
            color,
            start_x: at(5),
            start_y: at(6),
            width: at(7),
            height: -at(0),
        });
        log.push(Action::Text {
            color,
            start_x: at(2),
            start_y: at(5),
            text: texts[seed % texts.len()].to_owned(),
            font_style: FontStyle {
                family: FontFamily::ALL[seed % FontFamily::ALL.len()],
                size: 8 + (seed as u32) * 3,
                bold: seed % 2 == 0,
                italic: seed % 3 == 0,
                underline: seed % 4 == 0,
            },
        });
        log.rotate_left(seed % 4);
        log.truncate(1 + seed % 4);
        logs.push(log);
    }
    logs
}

#[test]
fn test_varied_logs_survive_a_round_trip() {
    for log in varied_logs() {
        let payload = serialize(&log).unwrap();
        let decoded = decode_payload(&payload).unwrap();
        assert_eq!(decoded.skipped, 0, "{payload}");
        assert_eq!(decoded.actions, log, "{payload}");
        // Encoding is stable.
        assert_eq!(serialize(&decoded.actions).unwrap(), payload);
    }
}

#[test]
fn test_empty_log_round_trip() {
    let payload = serialize(&[]).unwrap();
    assert_eq!(payload, r#"{"actions":[],"version":"1.0"}"#);
    assert!(deserialize(&payload).unwrap().is_empty());
}

#[test]
fn test_wire_format_field_names() {
    let payload = serialize(&sample_log()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();

    assert_eq!(value["version"], PAYLOAD_VERSION);
    let actions = value["actions"].as_array().unwrap();
    assert_eq!(actions[0]["tool"], "pencil");
    assert_eq!(actions[0]["color"], "#123456");
    assert_eq!(actions[1]["tool"], "rectangle");
    assert_eq!(actions[1]["startX"], 5.0);
    assert_eq!(actions[1]["width"], -3.0);
    assert_eq!(actions[3]["fontStyle"]["family"], "Times New Roman");
    assert_eq!(actions[3]["fontStyle"]["bold"], true);
}

#[test]
fn test_payload_type_round_trip() {
    let payload = PersistedPayload::new(sample_log());
    let json = serde_json::to_string(&payload).unwrap();
    assert_eq!(deserialize(&json).unwrap(), payload.actions);
}

#[test]
fn test_saved_drawing_from_the_web_app() {
    let payload = r##"{
        "actions": [
            {"tool":"rectangle","color":"#000000","startX":10,"startY":20,"width":30,"height":40},
            {"tool":"text","color":"#ff0000","startX":1,"startY":2,"text":"hi"}
        ],
        "version": "1.0"
    }"##;
    let log = deserialize(payload).unwrap();
    assert_eq!(log.len(), 2);
    assert!(matches!(
        &log[1],
        Action::Text { font_style, color, .. } if *font_style == FontStyle::default() && *color == Color::rgb(255, 0, 0)
    ));
}

#[test]
fn test_bad_actions_are_dropped_individually() {
    let payload = r##"{"version":"1.0","actions":[
        {"tool":"eraser","color":"#000000"},
        {"tool":"circle","color":"#000000","startX":1,"startY":1},
        {"tool":"pencil","color":"#000000","points":[{"x":1,"y":2}]}
    ]}"##;
    let decoded = decode_payload(payload).unwrap();
    assert_eq!(decoded.skipped, 2);
    assert_eq!(decoded.actions.len(), 1);
}

#[test]
fn test_payload_level_errors() {
    assert!(matches!(deserialize("not json"), Err(DecodeError::Malformed(_))));
    assert!(matches!(deserialize("[]"), Err(DecodeError::NotAnObject)));
    assert!(matches!(deserialize(r#"{"actions":[]}"#), Err(DecodeError::MissingVersion)));
    assert!(matches!(
        deserialize(r#"{"version":"1.0","actions":{}}"#),
        Err(DecodeError::ActionsNotAList)
    ));
}

#[test]
fn test_missing_actions_is_an_empty_drawing() {
    assert_eq!(deserialize(r#"{"version":"1.0"}"#).unwrap(), Vec::new());
}
