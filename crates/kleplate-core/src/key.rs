use serde::{Deserialize, Serialize};

use crate::point::Vec2;

/// A key emitted by the layout parser, in layout units with Y pointing down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    /// 0-based position in document order.
    pub index: usize,
    pub label: String,
    /// Numeric value of the first `SW<n>` token in the label, if any.
    pub designator_hint: Option<u32>,
    pub position: Vec2,
    /// Key center plus the fixed per-key offset, under the same rotation as `position`.
    pub diode_offset_position: Vec2,
    /// Clockwise-positive in the Y-down layout frame.
    pub rotation_degrees: f64,
    pub width: f64,
    pub height: f64,
}
