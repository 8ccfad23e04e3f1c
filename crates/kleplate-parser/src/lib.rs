//! Keyboard-layout-editor (KLE) document parsing.
//!
//! The entry point is [`parse_keys`], which recovers a layout document from loosely formatted text
//! and walks it into absolutely positioned [`Key`]s.

mod error;
mod kle;
mod relaxed;

pub use error::LayoutParseError;
pub use kle::{designator_hint, keys_from_document};
pub use relaxed::parse_relaxed;

use kleplate_core::{Key, Vec2};
use serde_json::Value;
use tracing::debug;

const PREVIEW_CHARS: usize = 120;

/// Recover a layout document from raw text.
///
/// Strategies, in order: strict JSON; strict JSON of the text between the first `[` and the last
/// `]`; the relaxed JavaScript-literal reader.
pub fn parse_layout_text(raw: &str) -> Result<Value, LayoutParseError> {
    let text = strip_bom_and_trim(raw);

    let json_error = match serde_json::from_str::<Value>(text) {
        Ok(v) => return Ok(v),
        Err(e) => e.to_string(),
    };

    if let (Some(first), Some(last)) = (text.find('['), text.rfind(']'))
        && last > first
    {
        let sliced = strip_bom_and_trim(&text[first..=last]);
        if let Ok(v) = serde_json::from_str::<Value>(sliced) {
            debug!(first, last, "layout recovered from bracketed slice");
            return Ok(v);
        }
    }

    match parse_relaxed(text) {
        Ok(v) => {
            debug!("layout recovered with the relaxed reader");
            Ok(v)
        }
        Err(relaxed_error) => Err(LayoutParseError::Unreadable {
            json_error,
            relaxed_error,
            preview: preview_text(text, PREVIEW_CHARS),
            length: text.chars().count(),
        }),
    }
}

/// Parse layout text and emit keys. `offset` is in layout units.
pub fn parse_keys(raw: &str, offset: Vec2) -> Result<Vec<Key>, LayoutParseError> {
    let doc = parse_layout_text(raw)?;
    keys_from_document(&doc, offset)
}

fn strip_bom_and_trim(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text).trim()
}

/// Truncate to `max_chars` and make control characters visible as `\xNN`.
fn preview_text(text: &str, max_chars: usize) -> String {
    let mut out = String::new();
    for (i, c) in text.chars().enumerate() {
        if i == max_chars {
            out.push('…');
            break;
        }
        if c.is_ascii_control() {
            out.push_str(&format!("\\x{:02x}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}
