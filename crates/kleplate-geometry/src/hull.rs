//! Monotone-chain convex hull.

use std::cmp::Ordering;

use kleplate_core::{GeometryError, Polygon, Vec2};

/// Turn direction of `o -> a -> b`; negative for a clockwise turn (Y-up convention).
fn cross(o: Vec2, a: Vec2, b: Vec2) -> f64 {
    (a - o).cross(b - o)
}

fn lexicographic(a: &Vec2, b: &Vec2) -> Ordering {
    a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y))
}

/// Push `p` onto `chain`, popping every point that would not leave a strictly clockwise turn.
fn push_clockwise(chain: &mut Vec<Vec2>, p: Vec2) {
    while chain.len() >= 2 && cross(chain[chain.len() - 2], chain[chain.len() - 1], p) >= 0.0 {
        chain.pop();
    }
    chain.push(p);
}

/// Convex hull of `points`, clockwise in the Y-up convention.
///
/// Collinear boundary points are dropped and the seam point is not repeated.
pub fn convex_hull(points: &[Vec2]) -> Result<Polygon, GeometryError> {
    let mut sorted: Vec<Vec2> = points
        .iter()
        .copied()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();
    sorted.sort_by(lexicographic);
    sorted.dedup();

    if sorted.len() < 3 {
        return Err(GeometryError::DegenerateHull {
            points: sorted.len(),
        });
    }

    let mut lower: Vec<Vec2> = Vec::with_capacity(sorted.len());
    for &p in &sorted {
        push_clockwise(&mut lower, p);
    }
    let mut upper: Vec<Vec2> = Vec::with_capacity(sorted.len());
    for &p in sorted.iter().rev() {
        push_clockwise(&mut upper, p);
    }

    // The last point of each chain is the first point of the other.
    lower.pop();
    upper.pop();
    lower.extend(upper);

    Polygon::new(lower).map_err(|_| GeometryError::DegenerateHull {
        points: sorted.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_and_collinear_points_are_dropped() {
        let pts = [
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 4.0),
            Vec2::new(2.0, 2.0),
        ];
        let hull = convex_hull(&pts).unwrap();
        assert_eq!(hull.len(), 4);
        assert!(hull.signed_area() < 0.0);
        assert_eq!(hull.area(), 16.0);
    }

    #[test]
    fn collinear_input_is_degenerate() {
        let pts = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)];
        assert!(matches!(
            convex_hull(&pts),
            Err(GeometryError::DegenerateHull { points: 3 })
        ));
    }

    #[test]
    fn duplicates_do_not_count() {
        let pts = [Vec2::new(0.0, 0.0), Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)];
        assert!(convex_hull(&pts).is_err());
    }
}
