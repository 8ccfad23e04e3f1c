use kleplate_core::{BBox, Polygon, Vec2};
use kleplate_geometry::{convex_hull, offset, rectangle, union};
use proptest::prelude::*;

fn bbox_close(a: BBox, b: BBox, eps: f64) -> bool {
    a.min.approx_eq(b.min, eps) && a.max.approx_eq(b.max, eps)
}

fn sorted_points(p: &Polygon) -> Vec<(i64, i64)> {
    let mut pts: Vec<(i64, i64)> = p
        .points()
        .iter()
        .map(|v| ((v.x * 1000.0).round() as i64, (v.y * 1000.0).round() as i64))
        .collect();
    pts.sort_unstable();
    pts
}

proptest! {
    #[test]
    fn outset_then_inset_restores_rectangle(
        w in 2.0f64..60.0,
        h in 2.0f64..60.0,
        cx in -50.0f64..50.0,
        cy in -50.0f64..50.0,
        d in 0.5f64..5.0,
    ) {
        let rect = rectangle(Vec2::new(cx, cy), (w, h), 0.0).unwrap();
        let grown = offset(&rect, d).unwrap();
        let back = offset(&grown, -d).unwrap();
        // Inputs are snapped to a 0.001 grid before the offset runs.
        prop_assert!(bbox_close(back.bbox(), rect.bbox(), 2e-3));
        prop_assert!((back.bbox().area() - rect.bbox().area()).abs() < 0.2);
    }

    #[test]
    fn union_of_one_polygon_is_itself(
        w in 1.0f64..50.0,
        h in 1.0f64..50.0,
        rot in 0.0f64..90.0,
    ) {
        let rect = rectangle(Vec2::new(0.0, 0.0), (w, h), rot).unwrap();
        let merged = union(std::slice::from_ref(&rect)).unwrap();
        prop_assert_eq!(merged.len(), 1);
        prop_assert!((merged[0].area() - rect.area()).abs() < 0.2);
        prop_assert!(bbox_close(merged[0].bbox(), rect.bbox(), 1e-3));
    }

    #[test]
    fn hull_of_a_convex_polygon_is_itself(
        w in 1.0f64..50.0,
        h in 1.0f64..50.0,
        rot in 0.0f64..360.0,
    ) {
        let rect = rectangle(Vec2::new(3.0, -2.0), (w, h), rot).unwrap();
        let hull = convex_hull(rect.points()).unwrap();
        let again = convex_hull(hull.points()).unwrap();
        prop_assert_eq!(hull.len(), 4);
        prop_assert_eq!(sorted_points(&hull), sorted_points(&rect));
        prop_assert_eq!(&hull, &again);
    }
}

#[test]
fn hull_is_clockwise_and_contains_inputs() {
    let pts = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(5.0, -1.0),
        Vec2::new(9.0, 3.0),
        Vec2::new(4.0, 8.0),
        Vec2::new(4.0, 3.0),
        Vec2::new(-1.0, 4.0),
    ];
    let hull = convex_hull(&pts).unwrap();
    assert!(hull.signed_area() < 0.0);
    assert!(hull.contains(Vec2::new(4.0, 3.0)));
    assert_eq!(hull.len(), 5);
}
