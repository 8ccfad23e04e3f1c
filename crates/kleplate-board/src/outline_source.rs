//! Finding the board outline in the design's own primitives.
//!
//! Sources are tried in order: the user's selection (selection mode only), then the board outline
//! layer. Within a source, closed polylines are considered before line and arc fragments are
//! stitched together. The first stage that produces an acceptable outline wins.

use kleplate_core::units::board_mil_to_mm;
use kleplate_core::{BBox, GeometryError, Polygon, Vec2};
use kleplate_outline::{
    DEFAULT_SNAP_TOLERANCE, MIN_REFERENCE_AREA, OutlineItem, ReconstructMode, reconstruct,
    select_outline,
};
use tracing::{debug, warn};

use crate::config::OutlineMode;
use crate::error::Warning;
use crate::host::{DesignHost, Primitive, PrimitiveSource};

/// A chosen outline this many times larger than the key area is reported.
pub const OUTLINE_WARNING_RATIO: f64 = 80.0;

/// An outline taken from the design, with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundOutline {
    pub polygon: Polygon,
    pub source: String,
    pub warnings: Vec<Warning>,
}

/// Primitives of one source converted to the millimetre, Y-down frame.
#[derive(Debug, Default)]
struct SourceGeometry {
    closed: Vec<Polygon>,
    items: Vec<OutlineItem>,
}

impl SourceGeometry {
    fn from_primitives(primitives: &[Primitive]) -> Self {
        let mut out = SourceGeometry::default();
        for primitive in primitives {
            match primitive {
                Primitive::Line { a, b, .. } => out.items.push(OutlineItem::Line {
                    a: board_mil_to_mm(*a),
                    b: board_mil_to_mm(*b),
                }),
                // Mirroring Y reverses the turning direction.
                Primitive::Arc { a, b, sweep_deg, .. } => out.items.push(OutlineItem::Arc {
                    a: board_mil_to_mm(*a),
                    b: board_mil_to_mm(*b),
                    sweep_deg: -sweep_deg,
                }),
                Primitive::Polyline { points, closed, .. } => {
                    let pts: Vec<Vec2> = points.iter().copied().map(board_mil_to_mm).collect();
                    if *closed {
                        match Polygon::new(pts) {
                            Ok(p) => out.closed.push(p),
                            Err(e) => debug!(error = %e, "skipping degenerate closed polyline"),
                        }
                    } else {
                        out.items.extend(
                            pts.windows(2)
                                .map(|w| OutlineItem::Line { a: w[0], b: w[1] }),
                        );
                    }
                }
            }
        }
        out
    }
}

fn sources_for(mode: OutlineMode) -> &'static [PrimitiveSource] {
    match mode {
        OutlineMode::Selection => &[PrimitiveSource::Selection, PrimitiveSource::BoardOutlineLayer],
        _ => &[PrimitiveSource::BoardOutlineLayer],
    }
}

/// Walk the fallback chain for `mode` and return the first outline that fits `references`.
///
/// `references` are key centres in millimetres, Y down. Board mode insists that the outline
/// contains at least one of them; selection mode accepts a best guess and also tries an open-path
/// reconstruction.
pub fn find_board_outline<H>(
    host: &H,
    mode: OutlineMode,
    references: &[Vec2],
) -> Result<FoundOutline, GeometryError>
where
    H: DesignHost + ?Sized,
{
    let require_containment = mode != OutlineMode::Selection;
    let mut tried: Vec<String> = Vec::new();

    for &source in sources_for(mode) {
        let primitives = match host.primitives(source) {
            Ok(p) => p,
            Err(e) => {
                warn!(source = source.label(), error = %e, "outline source unavailable");
                Vec::new()
            }
        };
        let geometry = SourceGeometry::from_primitives(&primitives);
        debug!(
            source = source.label(),
            primitives = primitives.len(),
            closed = geometry.closed.len(),
            fragments = geometry.items.len(),
            "outline source loaded"
        );

        let stage = format!("{} polylines", source.label());
        if let Some(polygon) = select_outline(&geometry.closed, references, require_containment) {
            return Ok(found(polygon, stage, references));
        }
        tried.push(stage);

        let stage = format!("{} segments", source.label());
        let mut candidates =
            reconstruct(&geometry.items, ReconstructMode::Cycles, DEFAULT_SNAP_TOLERANCE);
        if candidates.is_empty() && !require_containment {
            candidates =
                reconstruct(&geometry.items, ReconstructMode::OpenPath, DEFAULT_SNAP_TOLERANCE);
        }
        if let Some(polygon) = select_outline(&candidates, references, require_containment) {
            return Ok(found(polygon, stage, references));
        }
        tried.push(stage);
    }

    Err(GeometryError::NoOutline { tried })
}

fn found(polygon: Polygon, source: String, references: &[Vec2]) -> FoundOutline {
    let mut warnings = Vec::new();
    let reference_area = BBox::from_points(references.iter().copied()).area();
    if reference_area > MIN_REFERENCE_AREA {
        let ratio = polygon.bbox().area() / reference_area;
        if ratio > OUTLINE_WARNING_RATIO {
            let warning = Warning::OutlineMuchLarger { ratio };
            warn!(source = %source, "{warning}");
            warnings.push(warning);
        }
    }
    debug!(source = %source, area = polygon.area(), "board outline selected");
    FoundOutline {
        polygon,
        source,
        warnings,
    }
}
