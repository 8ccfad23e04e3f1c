use std::sync::LazyLock;

use kleplate_core::{Key, Vec2};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::LayoutParseError;

static SW_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bSW\s*([0-9]+)\b").expect("static regex is valid"));

/// Running cursor shared by every row of the document.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    rx: f64,
    ry: f64,
    r: f64,
}

impl Cursor {
    fn new() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: 1.0,
            h: 1.0,
            rx: 0.0,
            ry: 0.0,
            r: 0.0,
        }
    }

    fn origin(&self) -> Vec2 {
        Vec2::new(self.rx, self.ry)
    }

    /// Apply one modifier object. Fields are checked in a fixed order so later fields observe
    /// earlier updates from the same object.
    fn apply(&mut self, props: &Map<String, Value>) {
        if let Some(r) = value_f64(props.get("r")) {
            self.r = r;
        }
        if let Some(rx) = value_f64(props.get("rx")) {
            self.rx = rx;
            self.x = self.rx;
            self.y = self.ry;
        }
        if let Some(ry) = value_f64(props.get("ry")) {
            self.ry = ry;
            self.y = self.ry;
        }
        if let Some(w) = value_f64(props.get("w")) {
            self.w = w;
        }
        if let Some(h) = value_f64(props.get("h")) {
            self.h = h;
        }
        if let Some(dx) = value_f64(props.get("x")) {
            self.x += dx;
        }
        if let Some(dy) = value_f64(props.get("y")) {
            self.y += dy;
        }
    }
}

fn value_f64(v: Option<&Value>) -> Option<f64> {
    match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Extract the designator number from a legend such as `"Esc\nSW1"`.
#[must_use]
pub fn designator_hint(label: &str) -> Option<u32> {
    SW_HINT
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

/// Walk a parsed layout document and emit keys in document order.
///
/// `offset` is the secondary-point offset in layout units; it is added to the unrotated key center
/// and then rotated with the key.
pub fn keys_from_document(doc: &Value, offset: Vec2) -> Result<Vec<Key>, LayoutParseError> {
    let Value::Array(rows) = doc else {
        return Err(LayoutParseError::NotAnArray {
            found: json_kind(doc),
        });
    };

    let mut cursor = Cursor::new();
    let mut keys: Vec<Key> = Vec::new();

    for (row_index, row) in rows.iter().enumerate() {
        let Value::Array(items) = row else {
            debug!(row_index, kind = json_kind(row), "skipping non-row layout entry");
            continue;
        };

        cursor.x = cursor.rx;
        cursor.w = 1.0;
        cursor.h = 1.0;

        for item in items {
            match item {
                Value::Object(props) => cursor.apply(props),
                Value::String(label) => {
                    let center = Vec2::new(cursor.x + cursor.w / 2.0, cursor.y + cursor.h / 2.0);
                    let origin = cursor.origin();
                    keys.push(Key {
                        index: keys.len(),
                        label: label.clone(),
                        designator_hint: designator_hint(label),
                        position: center.rotated_about(origin, cursor.r),
                        diode_offset_position: (center + offset).rotated_about(origin, cursor.r),
                        rotation_degrees: cursor.r,
                        width: cursor.w,
                        height: cursor.h,
                    });
                    cursor.x += cursor.w;
                    cursor.w = 1.0;
                    cursor.h = 1.0;
                }
                _ => {}
            }
        }

        cursor.y += 1.0;
    }

    debug!(keys = keys.len(), rows = rows.len(), "parsed layout");
    Ok(keys)
}
