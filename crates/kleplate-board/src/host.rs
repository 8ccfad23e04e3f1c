//! The design host: where components live and outline primitives come from.
//!
//! Host coordinates are mils with Y pointing up. Conversion to the millimetre, Y-down pipeline
//! frame happens in the callers.

use kleplate_core::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::HostError;

pub const DEFAULT_OUTLINE_LAYER: &str = "BoardOutline";

/// A placed component as reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub designator: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,
}

/// Target pose for a component, in host mils and degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentMove {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
}

/// Where outline primitives are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveSource {
    /// Whatever the user currently has selected.
    Selection,
    /// Everything on the board outline layer.
    BoardOutlineLayer,
}

impl PrimitiveSource {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PrimitiveSource::Selection => "selection",
            PrimitiveSource::BoardOutlineLayer => "board outline layer",
        }
    }
}

/// Raw drawing primitive, tagged with the layer it sits on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Primitive {
    Line {
        layer: String,
        a: Vec2,
        b: Vec2,
    },
    /// `sweep_deg` is positive for counter-clockwise arcs.
    Arc {
        layer: String,
        a: Vec2,
        b: Vec2,
        #[serde(rename = "sweepDeg")]
        sweep_deg: f64,
    },
    Polyline {
        layer: String,
        points: Vec<Vec2>,
        #[serde(default)]
        closed: bool,
    },
}

impl Primitive {
    #[must_use]
    pub fn layer(&self) -> &str {
        match self {
            Primitive::Line { layer, .. }
            | Primitive::Arc { layer, .. }
            | Primitive::Polyline { layer, .. } => layer,
        }
    }
}

/// Capabilities the board operations need from the design they act on.
pub trait DesignHost {
    fn components(&self) -> Result<Vec<Component>, HostError>;

    fn primitives(&self, source: PrimitiveSource) -> Result<Vec<Primitive>, HostError>;

    fn move_component(&mut self, id: &str, target: &ComponentMove) -> Result<(), HostError>;
}

/// A design held entirely in memory, serializable as a JSON snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSnapshot {
    #[serde(default = "default_outline_layer")]
    pub outline_layer: String,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub primitives: Vec<Primitive>,
    #[serde(default)]
    pub selection: Vec<Primitive>,
}

fn default_outline_layer() -> String {
    DEFAULT_OUTLINE_LAYER.to_string()
}

impl Default for DesignSnapshot {
    fn default() -> Self {
        Self {
            outline_layer: default_outline_layer(),
            components: Vec::new(),
            primitives: Vec::new(),
            selection: Vec::new(),
        }
    }
}

impl DesignHost for DesignSnapshot {
    fn components(&self) -> Result<Vec<Component>, HostError> {
        Ok(self.components.clone())
    }

    fn primitives(&self, source: PrimitiveSource) -> Result<Vec<Primitive>, HostError> {
        Ok(match source {
            PrimitiveSource::Selection => self.selection.clone(),
            PrimitiveSource::BoardOutlineLayer => self
                .primitives
                .iter()
                .filter(|p| p.layer() == self.outline_layer)
                .cloned()
                .collect(),
        })
    }

    fn move_component(&mut self, id: &str, target: &ComponentMove) -> Result<(), HostError> {
        let component = self
            .components
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| HostError::UnknownComponent { id: id.to_string() })?;
        component.x = target.x;
        component.y = target.y;
        component.rotation = target.rotation;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_filters_the_outline_layer() {
        let snapshot: DesignSnapshot = serde_json::from_str(
            r#"{
                "primitives": [
                    {"kind": "line", "layer": "BoardOutline", "a": {"x": 0, "y": 0}, "b": {"x": 1, "y": 0}},
                    {"kind": "line", "layer": "Silk", "a": {"x": 0, "y": 0}, "b": {"x": 1, "y": 1}},
                    {"kind": "arc", "layer": "BoardOutline", "a": {"x": 1, "y": 0}, "b": {"x": 0, "y": 0}, "sweepDeg": 180}
                ]
            }"#,
        )
        .unwrap();
        let outline = snapshot.primitives(PrimitiveSource::BoardOutlineLayer).unwrap();
        assert_eq!(outline.len(), 2);
        assert!(snapshot.primitives(PrimitiveSource::Selection).unwrap().is_empty());
    }

    #[test]
    fn moving_an_unknown_component_fails() {
        let mut snapshot = DesignSnapshot::default();
        let err = snapshot
            .move_component(
                "nope",
                &ComponentMove {
                    x: 0.0,
                    y: 0.0,
                    rotation: 0.0,
                },
            )
            .unwrap_err();
        assert_eq!(err, HostError::UnknownComponent { id: "nope".into() });
    }
}
