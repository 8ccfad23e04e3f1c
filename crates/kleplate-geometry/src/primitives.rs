use kleplate_core::{GeometryError, Polygon, Vec2};

/// Minimum number of samples for any flattened arc.
pub const MIN_ARC_SAMPLES: usize = 8;
/// Samples per quarter turn of sweep.
pub const ARC_SAMPLES_PER_QUARTER: f64 = 12.0;

/// Rectangle centered on `center`, rotated by `rotation_deg` about its center.
///
/// Vertices are emitted counter-clockwise (Y-up convention) before rotation.
pub fn rectangle(
    center: Vec2,
    size: (f64, f64),
    rotation_deg: f64,
) -> Result<Polygon, GeometryError> {
    let hw = size.0 / 2.0;
    let hh = size.1 / 2.0;
    let corners = [
        Vec2::new(center.x - hw, center.y - hh),
        Vec2::new(center.x + hw, center.y - hh),
        Vec2::new(center.x + hw, center.y + hh),
        Vec2::new(center.x - hw, center.y + hh),
    ];
    let points = if rotation_deg != 0.0 {
        corners
            .iter()
            .map(|p| p.rotated_about(center, rotation_deg))
            .collect()
    } else {
        corners.to_vec()
    };
    Polygon::new(points)
}

/// Center and radius of the arc from `start` to `end` sweeping `sweep_deg`.
///
/// Positive sweeps run counter-clockwise in the Y-up convention. Returns `None` where the circle
/// is undefined: a zero-length chord, or a sweep that is zero, non-finite or at least a full turn.
#[must_use]
pub fn arc_center(start: Vec2, end: Vec2, sweep_deg: f64) -> Option<(Vec2, f64)> {
    if !sweep_deg.is_finite() || sweep_deg.abs() >= 360.0 {
        return None;
    }
    let chord = end - start;
    let chord_len = chord.length();
    let half = sweep_deg.to_radians() / 2.0;
    if chord_len <= f64::EPSILON || half.sin().abs() <= f64::EPSILON {
        return None;
    }
    let radius = (chord_len / 2.0) / half.sin().abs();
    // Signed distance from the chord midpoint to the center, along the chord's left normal.
    let offset = (chord_len / 2.0) / half.tan();
    let center = start.midpoint(end) + chord.normalized().perp() * offset;
    Some((center, radius))
}

/// Polyline approximation of an arc, including both endpoints.
///
/// Uses at least [`MIN_ARC_SAMPLES`] segments and [`ARC_SAMPLES_PER_QUARTER`] per 90° of sweep.
/// The last sample is snapped to `end`. Arcs without a defined circle fall back to the chord.
#[must_use]
pub fn arc_points(start: Vec2, end: Vec2, sweep_deg: f64) -> Vec<Vec2> {
    let Some((center, radius)) = arc_center(start, end, sweep_deg) else {
        return vec![start, end];
    };

    let per_quarter = (sweep_deg.abs() / 90.0 * ARC_SAMPLES_PER_QUARTER).ceil() as usize;
    let samples = per_quarter.max(MIN_ARC_SAMPLES);
    let start_angle = (start.y - center.y).atan2(start.x - center.x);
    let sweep = sweep_deg.to_radians();

    let mut out = Vec::with_capacity(samples + 1);
    out.push(start);
    for i in 1..samples {
        let a = start_angle + sweep * (i as f64) / (samples as f64);
        out.push(Vec2::new(center.x + radius * a.cos(), center.y + radius * a.sin()));
    }
    out.push(end);
    out
}
