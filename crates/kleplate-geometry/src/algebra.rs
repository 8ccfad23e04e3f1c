//! Offset and union on an integer grid.
//!
//! Coordinates are scaled by [`CLIP_SCALE`] and rounded before they reach `cavalier_contours`, so
//! every boolean/offset runs on fixed-point input and repeated calls see identical vertices.

use cavalier_contours::polyline::{
    BooleanOp, BooleanResultInfo, PlineOffsetOptions, PlineOrientation, PlineSource,
    PlineSourceMut, PlineVertex, Polyline,
};
use kleplate_core::{GeometryError, Polygon, Vec2};
use tracing::debug;

use crate::primitives::{arc_center, arc_points};

/// Fixed-point scale applied before clipping (1 unit becomes 1000 grid steps).
pub const CLIP_SCALE: f64 = 1000.0;
/// Round joins whose miter would reach further than this multiple of the offset are flattened
/// instead of mitered.
pub const MITER_LIMIT: f64 = 2.0;
/// Closing-point tolerance, in grid steps.
const CLOSE_EPS: f64 = 1e-6;
const SIMPLIFY_EPS: f64 = 1e-6;
/// Collinearity tolerance for mitered rings, in grid steps. Miter tips are computed, not rounded.
const MITER_SIMPLIFY_EPS: f64 = 1.0;

/// Grow (`distance > 0`) or shrink (`distance < 0`) a polygon with mitered corners.
///
/// If the library splits the result, the ring with the largest area is returned.
pub fn offset(polygon: &Polygon, distance: f64) -> Result<Polygon, GeometryError> {
    if distance == 0.0 {
        return Ok(polygon.clone());
    }

    let pline = to_pline(polygon);
    let input_area = polygon.bbox().area();
    let grows = distance > 0.0;
    let signed = signed_offset_for(&pline, distance.abs(), !grows) * CLIP_SCALE;

    let first = offset_once(&pline, signed);
    let acceptable = |p: &Polygon| {
        let area = p.bbox().area();
        if grows { area >= input_area } else { area <= input_area }
    };

    match first {
        Some(p) if acceptable(&p) => Ok(p),
        Some(p) => {
            debug!(distance, "offset direction inverted, retrying with negated distance");
            Ok(further_in_direction(grows, p, offset_once(&pline, -signed)))
        }
        None if grows => offset_once(&pline, -signed)
            .filter(acceptable)
            .ok_or(GeometryError::EmptyOffset { distance }),
        None => Err(GeometryError::EmptyOffset { distance }),
    }
}

/// Boolean union of every input polygon.
///
/// Returns the disjoint outer rings of the result; holes are dropped. Callers that expect a single
/// outline can use [`largest`].
pub fn union(polygons: &[Polygon]) -> Result<Vec<Polygon>, GeometryError> {
    if polygons.is_empty() {
        return Ok(Vec::new());
    }

    let plines: Vec<Polyline<f64>> = polygons
        .iter()
        .map(|p| {
            let mut pl = to_pline(p);
            if pl.orientation() == PlineOrientation::Clockwise {
                pl.invert_direction_mut();
            }
            pl
        })
        .collect();

    let merged = union_pline_set(plines);
    let mut out: Vec<Polygon> = Vec::with_capacity(merged.len());
    for pl in &merged {
        if let Ok(p) = from_pline(pl) {
            out.push(p);
        }
    }
    if out.is_empty() {
        return Err(GeometryError::EmptyUnion {
            inputs: polygons.len(),
        });
    }
    debug!(inputs = polygons.len(), outputs = out.len(), "union");
    Ok(out)
}

/// The polygon with the largest absolute area, first one winning ties.
#[must_use]
pub fn largest(polygons: Vec<Polygon>) -> Option<Polygon> {
    let mut best: Option<Polygon> = None;
    for p in polygons {
        if best.as_ref().is_none_or(|b| p.area() > b.area()) {
            best = Some(p);
        }
    }
    best
}

/// Of an offset result and its retry, the one that moved further the requested way.
fn further_in_direction(grows: bool, first: Polygon, retry: Option<Polygon>) -> Polygon {
    match retry {
        Some(r) if grows && r.bbox().area() > first.bbox().area() => r,
        Some(r) if !grows && r.bbox().area() < first.bbox().area() => r,
        _ => first,
    }
}

fn offset_once(pline: &Polyline<f64>, signed: f64) -> Option<Polygon> {
    let opts = PlineOffsetOptions {
        handle_self_intersects: true,
        ..Default::default()
    };
    let rings: Vec<Polyline<f64>> = pline.parallel_offset_opt(signed, &opts);
    let mut polygons: Vec<Polygon> = Vec::with_capacity(rings.len());
    for ring in rings.iter().filter(|r| r.is_closed() && r.vertex_count() >= 2) {
        if let Ok(p) = from_pline(&simplify(mitered(ring), MITER_SIMPLIFY_EPS)) {
            polygons.push(p);
        }
    }
    largest(polygons)
}

fn signed_offset_for(pline: &Polyline<f64>, abs: f64, inside: bool) -> f64 {
    match pline.orientation() {
        // Interior on the left; a positive (left) offset moves inward.
        PlineOrientation::CounterClockwise | PlineOrientation::Open => {
            if inside { abs } else { -abs }
        }
        PlineOrientation::Clockwise => {
            if inside { -abs } else { abs }
        }
    }
}

/// Replace the round joins produced by the offset with sharp miters.
fn mitered(pline: &Polyline<f64>) -> Polyline<f64> {
    let n = pline.vertex_count();
    let mut out = Polyline::new_closed();
    for i in 0..n {
        let v1 = pline.at(i);
        let v2 = pline.at((i + 1) % n);
        out.vertex_data.push(PlineVertex::new(v1.x, v1.y, 0.0));
        if v1.bulge_is_zero() {
            continue;
        }

        let start = Vec2::new(v1.x, v1.y);
        let end = Vec2::new(v2.x, v2.y);
        let sweep_deg = (4.0 * v1.bulge.atan()).to_degrees();
        let half = (sweep_deg / 2.0).to_radians();
        let miter_ratio = 1.0 / half.cos();

        match arc_center(start, end, sweep_deg) {
            Some((center, radius)) if half.cos() > 0.0 && miter_ratio <= MITER_LIMIT => {
                let dir = (start.midpoint(end) - center).normalized();
                let tip = center + dir * (radius * miter_ratio);
                out.vertex_data.push(PlineVertex::new(tip.x, tip.y, 0.0));
            }
            _ => {
                let samples = arc_points(start, end, sweep_deg);
                for p in &samples[1..samples.len() - 1] {
                    out.vertex_data.push(PlineVertex::new(p.x, p.y, 0.0));
                }
            }
        }
    }
    out
}

/// Merge overlapping rings pairwise until every remaining pair is disjoint.
fn union_pline_set(plines: Vec<Polyline<f64>>) -> Vec<Polyline<f64>> {
    let mut rings: Vec<Polyline<f64>> = plines
        .into_iter()
        .filter(|p| p.is_closed() && p.vertex_count() >= 3)
        .map(|p| simplify(p, SIMPLIFY_EPS))
        .collect();

    while let Some((i, j, merged)) = first_overlap(&rings) {
        // j > i, so removing j first leaves i in place.
        rings.swap_remove(j);
        rings.swap_remove(i);
        rings.extend(merged);
    }
    rings
}

fn first_overlap(rings: &[Polyline<f64>]) -> Option<(usize, usize, Vec<Polyline<f64>>)> {
    for i in 0..rings.len() {
        for j in i + 1..rings.len() {
            let res = rings[i].boolean(&rings[j], BooleanOp::Or);
            if matches!(
                res.result_info,
                BooleanResultInfo::Disjoint | BooleanResultInfo::InvalidInput
            ) {
                continue;
            }
            let merged = res
                .pos_plines
                .into_iter()
                .map(|p| simplify(p.pline, SIMPLIFY_EPS))
                .collect();
            return Some((i, j, merged));
        }
    }
    None
}

fn simplify(p: Polyline<f64>, eps: f64) -> Polyline<f64> {
    p.remove_redundant(eps).unwrap_or(p)
}

fn to_pline(polygon: &Polygon) -> Polyline<f64> {
    let mut pl = Polyline::new_closed();
    for p in polygon.points() {
        pl.vertex_data.push(PlineVertex::new(
            (p.x * CLIP_SCALE).round(),
            (p.y * CLIP_SCALE).round(),
            0.0,
        ));
    }
    pl
}

/// Back to model units. Any remaining arc segments are flattened.
fn from_pline(pline: &Polyline<f64>) -> Result<Polygon, GeometryError> {
    let n = pline.vertex_count();
    let mut points: Vec<Vec2> = Vec::with_capacity(n);
    for i in 0..n {
        let v1 = pline.at(i);
        let start = Vec2::new(v1.x, v1.y);
        if v1.bulge_is_zero() {
            points.push(start);
            continue;
        }
        let v2 = pline.at((i + 1) % n);
        let sweep_deg = (4.0 * v1.bulge.atan()).to_degrees();
        let samples = arc_points(start, Vec2::new(v2.x, v2.y), sweep_deg);
        points.extend_from_slice(&samples[..samples.len() - 1]);
    }

    if points.len() > 1 && points[0].approx_eq(points[points.len() - 1], CLOSE_EPS) {
        points.pop();
    }
    Polygon::new(
        points
            .into_iter()
            .map(|p| Vec2::new(p.x / CLIP_SCALE, p.y / CLIP_SCALE))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::rectangle;
    use approx::assert_abs_diff_eq;

    fn square(center: (f64, f64), size: f64) -> Polygon {
        rectangle(Vec2::new(center.0, center.1), (size, size), 0.0).unwrap()
    }

    #[test]
    fn outset_square_has_sharp_corners() {
        let grown = offset(&square((0.0, 0.0), 10.0), 2.0).unwrap();
        let bbox = grown.bbox();
        assert_abs_diff_eq!(bbox.width(), 14.0, epsilon = 1e-6);
        assert_abs_diff_eq!(bbox.height(), 14.0, epsilon = 1e-6);
        assert_abs_diff_eq!(grown.area(), 196.0, epsilon = 1e-6);
        assert_eq!(grown.len(), 4);
    }

    #[test]
    fn outset_l_shape_keeps_only_real_corners() {
        let l_shape = Polygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 4.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(4.0, 10.0),
            Vec2::new(0.0, 10.0),
        ])
        .unwrap();
        let grown = offset(&l_shape, 1.0).unwrap();
        assert_eq!(grown.len(), 6);
        assert_abs_diff_eq!(grown.area(), 108.0, epsilon = 1e-6);
        assert_abs_diff_eq!(grown.bbox().width(), 12.0, epsilon = 1e-6);
        assert_abs_diff_eq!(grown.bbox().height(), 12.0, epsilon = 1e-6);
        assert!(grown.contains(Vec2::new(4.5, 4.5)));
        assert!(!grown.contains(Vec2::new(5.5, 5.5)));
    }

    #[test]
    fn inset_square_shrinks() {
        let shrunk = offset(&square((0.0, 0.0), 10.0), -2.0).unwrap();
        assert_abs_diff_eq!(shrunk.bbox().width(), 6.0, epsilon = 1e-6);
    }

    #[test]
    fn offset_ignores_ring_orientation() {
        let cw = square((0.0, 0.0), 10.0).reversed();
        let grown = offset(&cw, 1.0).unwrap();
        assert_abs_diff_eq!(grown.bbox().width(), 12.0, epsilon = 1e-6);
    }

    #[test]
    fn collapsing_inset_is_an_error() {
        let err = offset(&square((0.0, 0.0), 2.0), -5.0).unwrap_err();
        assert_eq!(err, GeometryError::EmptyOffset { distance: -5.0 });
    }

    #[test]
    fn sharp_corner_beyond_miter_limit_is_rounded() {
        // Thin triangle: the 10° apex would produce a miter far beyond the limit.
        let tri = Polygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(20.0, 1.75),
            Vec2::new(0.0, 3.5),
        ])
        .unwrap();
        let grown = offset(&tri, 1.0).unwrap();
        assert!(grown.bbox().max.x < 20.0 + 1.0 * MITER_LIMIT + 1e-6);
        assert!(grown.len() > 6);
    }

    #[test]
    fn retry_is_kept_only_when_it_moved_further() {
        let small = square((0.0, 0.0), 4.0);
        let big = square((0.0, 0.0), 8.0);

        assert_eq!(further_in_direction(true, small.clone(), Some(big.clone())), big);
        assert_eq!(further_in_direction(true, big.clone(), Some(small.clone())), big);
        assert_eq!(further_in_direction(false, big.clone(), Some(small.clone())), small);
        assert_eq!(further_in_direction(false, small.clone(), Some(big.clone())), small);
        assert_eq!(further_in_direction(true, small.clone(), None), small);
    }

    #[test]
    fn union_merges_overlapping_squares() {
        let merged = union(&[square((0.0, 0.0), 10.0), square((5.0, 0.0), 10.0)]).unwrap();
        assert_eq!(merged.len(), 1);
        assert_abs_diff_eq!(merged[0].area(), 150.0, epsilon = 1e-6);
        assert_eq!(merged[0].len(), 4);
    }

    #[test]
    fn union_chains_through_a_late_overlap() {
        // The first and last squares only meet through the middle one.
        let merged = union(&[
            square((0.0, 0.0), 10.0),
            square((20.0, 0.0), 10.0),
            square((10.0, 0.0), 12.0),
        ])
        .unwrap();
        assert_eq!(merged.len(), 1);
        assert_abs_diff_eq!(merged[0].bbox().width(), 30.0, epsilon = 1e-6);
    }

    #[test]
    fn union_keeps_disjoint_squares_apart() {
        let merged = union(&[square((0.0, 0.0), 2.0), square((10.0, 0.0), 4.0)]).unwrap();
        assert_eq!(merged.len(), 2);
        let big = largest(merged).unwrap();
        assert_abs_diff_eq!(big.area(), 16.0, epsilon = 1e-6);
    }

    #[test]
    fn union_of_nothing_is_empty() {
        assert!(union(&[]).unwrap().is_empty());
    }
}
