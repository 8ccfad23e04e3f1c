//! Polygon construction and algebra: rectangles, arcs, offset, union and convex hull.

pub mod algebra;
pub mod hull;
pub mod primitives;

pub use algebra::{largest, offset, union};
pub use hull::convex_hull;
pub use primitives::{arc_center, arc_points, rectangle};
