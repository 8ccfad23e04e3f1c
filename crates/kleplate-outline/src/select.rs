//! Picking the candidate outline that best wraps a set of reference points.

use kleplate_core::{BBox, Polygon, Vec2};
use tracing::debug;

/// Candidates whose bbox is more than this multiple of the reference bbox are ignored.
pub const OUTLINE_SIZE_LIMIT: f64 = 60.0;
/// Below this reference bbox area the size filter is not applied.
pub const MIN_REFERENCE_AREA: f64 = 1e-3;
/// Last-resort picks must be larger than this.
pub const MIN_FALLBACK_AREA: f64 = 1.0;

/// Choose the outline containing the most references, smaller area breaking ties.
///
/// With an empty reference set the largest candidate wins. When no candidate contains any
/// reference, `require_containment` yields `None`; otherwise the smallest candidate with an area
/// above [`MIN_FALLBACK_AREA`] is returned.
#[must_use]
pub fn select_outline(
    candidates: &[Polygon],
    references: &[Vec2],
    require_containment: bool,
) -> Option<Polygon> {
    if candidates.is_empty() {
        return None;
    }
    if references.is_empty() {
        return pick_by_area(candidates.iter(), |a, b| a > b).cloned();
    }

    let reference_area = BBox::from_points(references.iter().copied()).area();
    let mut pool: Vec<&Polygon> = candidates.iter().collect();
    if reference_area > MIN_REFERENCE_AREA {
        let limit = reference_area * OUTLINE_SIZE_LIMIT;
        let filtered: Vec<&Polygon> = pool
            .iter()
            .copied()
            .filter(|c| c.bbox().area() <= limit)
            .collect();
        if filtered.is_empty() {
            debug!(candidates = pool.len(), "size filter would drop every outline, skipped");
        } else {
            pool = filtered;
        }
    }

    let mut best: Option<(&Polygon, usize)> = None;
    for &c in &pool {
        let inside = references.iter().filter(|p| c.contains(**p)).count();
        let better = match best {
            None => true,
            Some((b, count)) => inside > count || (inside == count && c.area() < b.area()),
        };
        if better {
            best = Some((c, inside));
        }
    }

    let (winner, inside) = best?;
    debug!(inside, references = references.len(), area = winner.area(), "outline scored");
    if inside > 0 {
        return Some(winner.clone());
    }
    if require_containment {
        return None;
    }
    pick_by_area(
        pool.into_iter().filter(|c| c.area() > MIN_FALLBACK_AREA),
        |a, b| a < b,
    )
    .cloned()
}

/// Candidate whose area is preferred over every other; earlier candidates win ties.
fn pick_by_area<'a>(
    candidates: impl Iterator<Item = &'a Polygon>,
    prefer: impl Fn(f64, f64) -> bool,
) -> Option<&'a Polygon> {
    let mut best: Option<&Polygon> = None;
    for c in candidates {
        if best.is_none_or(|b| prefer(c.area(), b.area())) {
            best = Some(c);
        }
    }
    best
}
