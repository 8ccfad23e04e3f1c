//! Request payloads and their validated forms.
//!
//! Payload fields are optional; [`ExportPayload::validate`] swaps anything missing, non-finite or
//! out of range for the defaults below. Only the pitch has no default.

use std::str::FromStr;

use kleplate_core::Vec2;
use kleplate_export::{DEFAULT_BASE_NAME, ExportFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;

pub const DEFAULT_CUTOUT_SIZE_MM: f64 = 14.0;
pub const DEFAULT_MARGIN_MM: f64 = 5.0;
pub const DEFAULT_CLEARANCE_MM: f64 = 1.0;
pub const DEFAULT_WALL_THICKNESS_MM: f64 = 3.0;
pub const DEFAULT_APPLY_ROTATION: bool = true;
pub const DEFAULT_INCLUDE_HOLES: bool = false;

/// How the plate or case outline is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlineMode {
    /// The board outline layer of the design.
    Board,
    /// The user's selected primitives, then the board outline layer.
    Selection,
    /// Convex hull of the switch cutouts, grown by the margin.
    #[default]
    Hull,
    /// Union of the switch cutouts, each grown by the margin.
    Union,
}

impl FromStr for OutlineMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "board" => Ok(OutlineMode::Board),
            "selection" => Ok(OutlineMode::Selection),
            "hull" => Ok(OutlineMode::Hull),
            "union" => Ok(OutlineMode::Union),
            other => Err(format!("unknown outline mode {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementPayload {
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub pitch: Option<f64>,
    /// Diode offset from the switch center, millimetres, Y down.
    #[serde(default)]
    pub dx: Option<f64>,
    #[serde(default)]
    pub dy: Option<f64>,
    #[serde(default)]
    pub do_diode: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementConfig {
    pub pitch_mm: f64,
    pub diode_offset_mm: Vec2,
    pub do_diode: bool,
}

impl PlacementPayload {
    pub fn validate(&self) -> Result<PlacementConfig, ValidationError> {
        let pitch_mm = validate_pitch(self.pitch)?;
        let finite_or_zero = |v: Option<f64>| v.filter(|v| v.is_finite()).unwrap_or(0.0);
        Ok(PlacementConfig {
            pitch_mm,
            diode_offset_mm: Vec2::new(finite_or_zero(self.dx), finite_or_zero(self.dy)),
            do_diode: self.do_diode.unwrap_or(false),
        })
    }
}

/// Plate and case request, as received.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub pitch: Option<f64>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub cutout_size_mm: Option<f64>,
    #[serde(default)]
    pub margin_mm: Option<f64>,
    #[serde(default)]
    pub clearance_mm: Option<f64>,
    #[serde(default)]
    pub wall_thickness_mm: Option<f64>,
    #[serde(default)]
    pub apply_rotation: Option<bool>,
    #[serde(default)]
    pub include_holes: Option<bool>,
    #[serde(default)]
    pub outline_mode: Option<String>,
    #[serde(default)]
    pub base_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    pub pitch_mm: f64,
    pub format: ExportFormat,
    pub cutout_size_mm: f64,
    pub margin_mm: f64,
    pub clearance_mm: f64,
    pub wall_thickness_mm: f64,
    pub apply_rotation: bool,
    pub include_holes: bool,
    pub outline_mode: OutlineMode,
    pub base_name: String,
}

impl ExportPayload {
    pub fn validate(&self) -> Result<ExportConfig, ValidationError> {
        let pitch_mm = validate_pitch(self.pitch)?;

        let format = parse_or_default(self.format.as_deref(), "format", |s| {
            ExportFormat::from_str(s).ok()
        });
        let outline_mode = parse_or_default(self.outline_mode.as_deref(), "outlineMode", |s| {
            OutlineMode::from_str(s).ok()
        });

        Ok(ExportConfig {
            pitch_mm,
            format,
            cutout_size_mm: positive_or(
                self.cutout_size_mm,
                DEFAULT_CUTOUT_SIZE_MM,
                "cutoutSizeMm",
            ),
            margin_mm: non_negative_or(self.margin_mm, DEFAULT_MARGIN_MM, "marginMm"),
            clearance_mm: non_negative_or(self.clearance_mm, DEFAULT_CLEARANCE_MM, "clearanceMm"),
            wall_thickness_mm: positive_or(
                self.wall_thickness_mm,
                DEFAULT_WALL_THICKNESS_MM,
                "wallThicknessMm",
            ),
            apply_rotation: self.apply_rotation.unwrap_or(DEFAULT_APPLY_ROTATION),
            include_holes: self.include_holes.unwrap_or(DEFAULT_INCLUDE_HOLES),
            outline_mode,
            base_name: self
                .base_name
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_BASE_NAME)
                .to_string(),
        })
    }
}

fn validate_pitch(pitch: Option<f64>) -> Result<f64, ValidationError> {
    match pitch {
        Some(p) if p.is_finite() && p > 0.0 => Ok(p),
        Some(p) => Err(ValidationError::InvalidPitch(p)),
        None => Err(ValidationError::InvalidPitch(f64::NAN)),
    }
}

fn positive_or(value: Option<f64>, default: f64, field: &'static str) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        Some(v) => {
            debug!(field, value = v, default, "out-of-range value replaced by default");
            default
        }
        None => default,
    }
}

fn non_negative_or(value: Option<f64>, default: f64, field: &'static str) -> f64 {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        Some(v) => {
            debug!(field, value = v, default, "out-of-range value replaced by default");
            default
        }
        None => default,
    }
}

fn parse_or_default<T: Default>(
    raw: Option<&str>,
    field: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> T {
    match raw {
        Some(s) => parse(s).unwrap_or_else(|| {
            debug!(field, value = s, "unrecognized value replaced by default");
            T::default()
        }),
        None => T::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> ExportPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg = payload(r#"{"layout": "[]", "pitch": 19.05}"#).validate().unwrap();
        assert_eq!(cfg.format, ExportFormat::Svg);
        assert_eq!(cfg.outline_mode, OutlineMode::Hull);
        assert_eq!(cfg.cutout_size_mm, DEFAULT_CUTOUT_SIZE_MM);
        assert_eq!(cfg.margin_mm, DEFAULT_MARGIN_MM);
        assert_eq!(cfg.clearance_mm, DEFAULT_CLEARANCE_MM);
        assert_eq!(cfg.wall_thickness_mm, DEFAULT_WALL_THICKNESS_MM);
        assert!(cfg.apply_rotation);
        assert!(!cfg.include_holes);
        assert_eq!(cfg.base_name, "layout");
    }

    #[test]
    fn invalid_values_are_replaced() {
        let cfg = payload(
            r#"{
                "pitch": 18,
                "format": "DXF",
                "cutoutSizeMm": -3,
                "marginMm": 0,
                "wallThicknessMm": 0,
                "outlineMode": "spline",
                "baseName": "  "
            }"#,
        )
        .validate()
        .unwrap();
        assert_eq!(cfg.format, ExportFormat::Dxf);
        assert_eq!(cfg.cutout_size_mm, DEFAULT_CUTOUT_SIZE_MM);
        assert_eq!(cfg.margin_mm, 0.0);
        assert_eq!(cfg.wall_thickness_mm, DEFAULT_WALL_THICKNESS_MM);
        assert_eq!(cfg.outline_mode, OutlineMode::Hull);
        assert_eq!(cfg.base_name, "layout");
    }

    #[test]
    fn pitch_has_no_default() {
        assert!(matches!(
            payload(r#"{"pitch": 0}"#).validate(),
            Err(ValidationError::InvalidPitch(p)) if p == 0.0
        ));
        assert!(payload("{}").validate().is_err());
        let placement = PlacementPayload {
            pitch: Some(f64::INFINITY),
            ..Default::default()
        };
        assert!(placement.validate().is_err());
    }
}
