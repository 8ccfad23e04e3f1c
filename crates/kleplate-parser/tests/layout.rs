use kleplate_core::{Key, Vec2};
use kleplate_parser::{LayoutParseError, parse_keys, parse_layout_text};
use proptest::prelude::*;

fn assert_close(a: Vec2, b: Vec2) {
    let eps = 1e-9;
    assert!(
        (a.x - b.x).abs() <= eps && (a.y - b.y).abs() <= eps,
        "got={a:?} expected={b:?}"
    );
}

const SAMPLE: &str = r#"[
  {"name": "sample", "author": "someone"},
  ["Esc\nSW1", {"x": 0.25}, "F1\nSW2", {"w": 1.5}, "Tab\nSW3"],
  [{"r": 15, "rx": 4, "ry": 1}, "SW4", {"h": 2}, "SW5"],
  [{"y": 0.5}, "SW6"]
]"#;

#[test]
fn positions_are_a_pure_function_of_the_document() {
    let first = parse_keys(SAMPLE, Vec2::new(0.0, 0.5)).unwrap();

    // Round-trip the document through serde_json and parse again.
    let doc = parse_layout_text(SAMPLE).unwrap();
    let reserialized = serde_json::to_string(&doc).unwrap();
    let second = parse_keys(&reserialized, Vec2::new(0.0, 0.5)).unwrap();

    assert_eq!(first, second);
    let hints: Vec<Option<u32>> = first.iter().map(|k| k.designator_hint).collect();
    assert_eq!(
        hints,
        vec![Some(1), Some(2), Some(3), Some(4), Some(5), Some(6)]
    );
}

#[test]
fn quarter_turn_rotates_about_origin() {
    let keys = parse_keys(r#"[[{r:90},"SW4"]]"#, Vec2::default()).unwrap();
    assert_eq!(keys.len(), 1);
    let key: &Key = &keys[0];
    assert_eq!(key.rotation_degrees, 90.0);
    assert_eq!(key.designator_hint, Some(4));

    let unrotated = Vec2::new(0.5, 0.5);
    assert_close(key.position, unrotated.rotated_about(Vec2::default(), 90.0));
    assert_close(key.position, Vec2::new(-0.5, 0.5));
}

#[test]
fn keys_follow_document_order() {
    let keys = parse_keys(SAMPLE, Vec2::default()).unwrap();
    let labels: Vec<&str> = keys.iter().map(|k| k.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["Esc\nSW1", "F1\nSW2", "Tab\nSW3", "SW4", "SW5", "SW6"]
    );
    let indices: Vec<usize> = keys.iter().map(|k| k.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn malformed_layout_reports_preview_and_length() {
    let text = "[[\"A\", {w: 2}, \"B\"";
    let err = parse_keys(text, Vec2::default()).unwrap_err();
    let LayoutParseError::Unreadable {
        json_error,
        relaxed_error,
        preview,
        length,
    } = &err
    else {
        panic!("unexpected error {err:?}");
    };
    assert!(!json_error.is_empty());
    assert!(!relaxed_error.is_empty());
    assert_eq!(preview, text);
    assert_eq!(*length, text.chars().count());

    let message = err.to_string();
    assert!(message.contains("preview:"), "{message}");
    assert!(message.contains(&format!("length: {}", text.chars().count())));
}

#[test]
fn long_malformed_layout_preview_is_truncated() {
    let text = format!("<{}>", "x".repeat(300));
    let err = parse_keys(&text, Vec2::default()).unwrap_err();
    let LayoutParseError::Unreadable { preview, length, .. } = err else {
        panic!("expected unreadable error");
    };
    assert_eq!(preview.chars().count(), 121);
    assert!(preview.ends_with('…'));
    assert_eq!(length, 302);
}

proptest! {
    #[test]
    fn rotation_is_periodic(theta in -720.0f64..720.0, rx in -5.0f64..5.0, ry in -5.0f64..5.0) {
        let a = format!(r#"[[{{"r":{theta},"rx":{rx},"ry":{ry}}},"A","B"],["C"]]"#);
        let b = format!(r#"[[{{"r":{},"rx":{rx},"ry":{ry}}},"A","B"],["C"]]"#, theta + 360.0);
        let ka = parse_keys(&a, Vec2::new(0.0, 1.0)).unwrap();
        let kb = parse_keys(&b, Vec2::new(0.0, 1.0)).unwrap();
        prop_assert_eq!(ka.len(), kb.len());
        for (x, y) in ka.iter().zip(kb.iter()) {
            prop_assert!((x.position.x - y.position.x).abs() < 1e-6);
            prop_assert!((x.position.y - y.position.y).abs() < 1e-6);
            prop_assert!((x.diode_offset_position.x - y.diode_offset_position.x).abs() < 1e-6);
            prop_assert!((x.diode_offset_position.y - y.diode_offset_position.y).abs() < 1e-6);
        }
    }
}
