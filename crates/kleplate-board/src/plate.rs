//! Switch plate export: key cutouts inside an outline.

use kleplate_core::units::layout_to_mm;
use kleplate_core::{GeometryError, Key, Polygon, Vec2};
use kleplate_export::{Drawing, ExportFile, export_file};
use kleplate_geometry::{convex_hull, largest, offset, rectangle, union};
use kleplate_parser::parse_keys;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ExportConfig, ExportPayload, OutlineMode};
use crate::error::{Error, Warning};
use crate::host::DesignHost;
use crate::outline_source::find_board_outline;

pub const PLATE_PREFIX: &str = "switch-plate_";

/// Outline and cutouts of a plate, in millimetres with Y down.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateGeometry {
    pub outline: Polygon,
    pub cutouts: Vec<Polygon>,
    pub outline_source: String,
    pub warnings: Vec<Warning>,
}

/// Result of a plate or case export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    pub file: ExportFile,
    pub key_count: usize,
    pub outline_source: String,
    pub warnings: Vec<Warning>,
}

#[must_use]
pub fn key_centers_mm(keys: &[Key], pitch_mm: f64) -> Vec<Vec2> {
    keys.iter().map(|k| layout_to_mm(k.position, pitch_mm)).collect()
}

/// One square cutout per key, rotated with the key when `apply_rotation` is set.
pub fn switch_cutouts(keys: &[Key], config: &ExportConfig) -> Result<Vec<Polygon>, GeometryError> {
    let size = (config.cutout_size_mm, config.cutout_size_mm);
    keys.iter()
        .map(|k| {
            let rotation = if config.apply_rotation {
                k.rotation_degrees
            } else {
                0.0
            };
            rectangle(layout_to_mm(k.position, config.pitch_mm), size, rotation)
        })
        .collect()
}

/// Cutouts plus the outline chosen by `config.outline_mode`.
pub fn plate_geometry<H>(
    host: &H,
    keys: &[Key],
    config: &ExportConfig,
) -> Result<PlateGeometry, Error>
where
    H: DesignHost + ?Sized,
{
    let cutouts = switch_cutouts(keys, config)?;

    let (outline, outline_source, warnings) = match config.outline_mode {
        OutlineMode::Hull => {
            let corners: Vec<Vec2> = cutouts
                .iter()
                .flat_map(|c| c.points().iter().copied())
                .collect();
            let hull = convex_hull(&corners)?;
            (offset(&hull, config.margin_mm)?, "hull".to_string(), Vec::new())
        }
        OutlineMode::Union => {
            let grown = cutouts
                .iter()
                .map(|c| offset(c, config.margin_mm))
                .collect::<Result<Vec<_>, _>>()?;
            let merged = union(&grown)?;
            debug!(pieces = merged.len(), "union outline");
            let outline = largest(merged).ok_or(GeometryError::EmptyUnion {
                inputs: grown.len(),
            })?;
            (outline, "union".to_string(), Vec::new())
        }
        OutlineMode::Board | OutlineMode::Selection => {
            let references = key_centers_mm(keys, config.pitch_mm);
            let found = find_board_outline(host, config.outline_mode, &references)?;
            (found.polygon, found.source, found.warnings)
        }
    };

    Ok(PlateGeometry {
        outline,
        cutouts,
        outline_source,
        warnings,
    })
}

/// Parse the layout, build the plate and render it.
pub fn export_plate<H>(host: &H, payload: &ExportPayload) -> Result<ExportReport, Error>
where
    H: DesignHost + ?Sized,
{
    let config = payload.validate()?;
    let keys = parse_keys(&payload.layout, Vec2::default())?;
    let plate = plate_geometry(host, &keys, &config)?;

    let drawing = Drawing::new(plate.outline).with_cutouts(plate.cutouts);
    let file = export_file(&drawing, config.format, PLATE_PREFIX, &config.base_name)?;
    info!(
        file = %file.filename,
        keys = keys.len(),
        outline = %plate.outline_source,
        "switch plate exported"
    );
    Ok(ExportReport {
        file,
        key_count: keys.len(),
        outline_source: plate.outline_source,
        warnings: plate.warnings,
    })
}
