//! SVG and DXF writers for plate and case drawings.
//!
//! Both formats are plain text built in memory. Identical drawings always serialize to identical
//! bytes.

pub mod dxf;
pub mod svg;

use std::fmt;
use std::str::FromStr;

use kleplate_core::{BBox, Polygon};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Margin added around the geometry on every side of the exported frame.
pub const FRAME_PADDING: f64 = 2.0;
/// Base name used when sanitizing leaves nothing.
pub const DEFAULT_BASE_NAME: &str = "layout";

pub const OUTLINE_LAYER: &str = "OUTLINE";
pub const CUTOUTS_LAYER: &str = "CUTOUTS";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error("non-finite coordinate in layer {layer}")]
    NonFinite { layer: String },
    #[error("unknown export format {0:?} (expected svg or dxf)")]
    UnknownFormat(String),
}

/// A named group of extra polygons, written after the outline and cutouts.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub polygons: Vec<Polygon>,
}

/// Everything one export file contains, in millimetres with Y pointing down.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    pub outline: Polygon,
    pub cutouts: Vec<Polygon>,
    pub layers: Vec<Layer>,
}

impl Drawing {
    #[must_use]
    pub fn new(outline: Polygon) -> Self {
        Self {
            outline,
            cutouts: Vec::new(),
            layers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_cutouts(mut self, cutouts: Vec<Polygon>) -> Self {
        self.cutouts = cutouts;
        self
    }

    #[must_use]
    pub fn with_layer(mut self, name: impl Into<String>, polygons: Vec<Polygon>) -> Self {
        self.layers.push(Layer {
            name: name.into(),
            polygons,
        });
        self
    }

    /// Union bbox of every polygon in the drawing.
    #[must_use]
    pub fn bbox(&self) -> BBox {
        let mut bbox = self.outline.bbox();
        for p in self.cutouts.iter().chain(self.layers.iter().flat_map(|l| &l.polygons)) {
            bbox = bbox.union(p.bbox());
        }
        bbox
    }

    /// Exported frame: the bbox padded by [`FRAME_PADDING`].
    #[must_use]
    pub fn frame(&self) -> BBox {
        self.bbox().padded(FRAME_PADDING)
    }

    /// `(layer name, polygons)` in output order, skipping empty layers.
    pub(crate) fn layered(&self) -> Vec<(&str, Vec<&Polygon>)> {
        let mut out: Vec<(&str, Vec<&Polygon>)> = vec![(OUTLINE_LAYER, vec![&self.outline])];
        if !self.cutouts.is_empty() {
            out.push((CUTOUTS_LAYER, self.cutouts.iter().collect()));
        }
        for layer in &self.layers {
            if !layer.polygons.is_empty() {
                out.push((layer.name.as_str(), layer.polygons.iter().collect()));
            }
        }
        out
    }

    fn check_finite(&self) -> Result<(), ExportError> {
        for (name, polygons) in self.layered() {
            let finite = polygons
                .iter()
                .flat_map(|p| p.points())
                .all(|v| v.x.is_finite() && v.y.is_finite());
            if !finite {
                return Err(ExportError::NonFinite {
                    layer: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Svg,
    Dxf,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Dxf => "dxf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(ExportFormat::Svg),
            "dxf" => Ok(ExportFormat::Dxf),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

/// A rendered file handed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportFile {
    pub filename: String,
    pub format: ExportFormat,
    pub text: String,
}

/// Serialize `drawing` in `format`.
pub fn render(drawing: &Drawing, format: ExportFormat) -> Result<String, ExportError> {
    drawing.check_finite()?;
    let text = match format {
        ExportFormat::Svg => svg::to_svg(drawing),
        ExportFormat::Dxf => dxf::to_dxf(drawing),
    };
    debug!(%format, bytes = text.len(), "rendered drawing");
    Ok(text)
}

/// Render and name an export file: `<prefix><sanitized base>.<ext>`.
pub fn export_file(
    drawing: &Drawing,
    format: ExportFormat,
    prefix: &str,
    base_name: &str,
) -> Result<ExportFile, ExportError> {
    Ok(ExportFile {
        filename: export_filename(prefix, base_name, format),
        format,
        text: render(drawing, format)?,
    })
}

#[must_use]
pub fn export_filename(prefix: &str, base_name: &str, format: ExportFormat) -> String {
    format!("{prefix}{}.{}", sanitize_base_name(base_name), format.extension())
}

/// Strip a trailing extension, replace anything outside `[A-Za-z0-9._-]` with `_` and trim
/// underscores. Falls back to [`DEFAULT_BASE_NAME`] when nothing is left.
#[must_use]
pub fn sanitize_base_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let stem = match trimmed.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && (1..=5).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            stem
        }
        _ => trimmed,
    };
    let mapped: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = mapped.trim_matches('_');
    if cleaned.is_empty() {
        DEFAULT_BASE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Fixed-precision number with negative zero folded into zero.
pub(crate) fn fmt_fixed(v: f64, decimals: usize) -> String {
    let s = format!("{v:.decimals$}");
    match s.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_zero_is_folded() {
        assert_eq!(fmt_fixed(-0.0001, 3), "0.000");
        assert_eq!(fmt_fixed(-0.0, 4), "0.0000");
        assert_eq!(fmt_fixed(-1.25, 3), "-1.250");
    }

    #[test]
    fn base_names_are_sanitized() {
        assert_eq!(sanitize_base_name("my layout.json"), "my_layout");
        assert_eq!(sanitize_base_name("  ergo/v2 (final).txt "), "ergo_v2__final");
        assert_eq!(sanitize_base_name("archive.tar.gz"), "archive.tar");
        assert_eq!(sanitize_base_name("***"), DEFAULT_BASE_NAME);
        assert_eq!(sanitize_base_name(""), DEFAULT_BASE_NAME);
    }

    #[test]
    fn filenames_carry_prefix_and_extension() {
        assert_eq!(
            export_filename("switch-plate_", "Corne.json", ExportFormat::Dxf),
            "switch-plate_Corne.dxf"
        );
        assert_eq!(export_filename("case_", "", ExportFormat::Svg), "case_layout.svg");
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("DXF".parse::<ExportFormat>().unwrap(), ExportFormat::Dxf);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }
}
