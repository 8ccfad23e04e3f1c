//! Case export: an inner wall around the plate outline and an outer wall around that.

use kleplate_core::Vec2;
use kleplate_export::{Drawing, export_file};
use kleplate_geometry::offset;
use kleplate_parser::parse_keys;
use tracing::info;

use crate::config::ExportPayload;
use crate::error::Error;
use crate::host::DesignHost;
use crate::plate::{ExportReport, plate_geometry};

pub const CASE_PREFIX: &str = "case_";
pub const CASE_INNER_LAYER: &str = "CASE_INNER";

/// Grow the plate outline by the clearance, then by the wall thickness, and render both rings.
///
/// Switch cutouts are included only when `includeHoles` is set.
pub fn export_case<H>(host: &H, payload: &ExportPayload) -> Result<ExportReport, Error>
where
    H: DesignHost + ?Sized,
{
    let config = payload.validate()?;
    let keys = parse_keys(&payload.layout, Vec2::default())?;
    let base = plate_geometry(host, &keys, &config)?;

    let inner = offset(&base.outline, config.clearance_mm)?;
    let outer = offset(&inner, config.wall_thickness_mm)?;

    let mut drawing = Drawing::new(outer).with_layer(CASE_INNER_LAYER, vec![inner]);
    if config.include_holes {
        drawing = drawing.with_cutouts(base.cutouts);
    }
    let file = export_file(&drawing, config.format, CASE_PREFIX, &config.base_name)?;
    info!(
        file = %file.filename,
        keys = keys.len(),
        outline = %base.outline_source,
        clearance_mm = config.clearance_mm,
        wall_mm = config.wall_thickness_mm,
        "case exported"
    );
    Ok(ExportReport {
        file,
        key_count: keys.len(),
        outline_source: base.outline_source,
        warnings: base.warnings,
    })
}
