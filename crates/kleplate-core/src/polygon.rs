use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::point::Vec2;

/// Points closer than this are treated as the same vertex during normalization.
const DUPLICATE_EPS: f64 = 1e-9;

/// A simple closed loop in canonical open-ring form.
///
/// The first point is never repeated at the end and consecutive vertices are distinct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec2>", into = "Vec<Vec2>")]
pub struct Polygon {
    points: Vec<Vec2>,
}

impl Polygon {
    /// Normalize `points` into an open ring and reject anything with fewer than 3 vertices left.
    pub fn new(points: Vec<Vec2>) -> Result<Self, GeometryError> {
        let mut ring: Vec<Vec2> = Vec::with_capacity(points.len());
        for p in points {
            if ring.last().is_some_and(|last| last.approx_eq(p, DUPLICATE_EPS)) {
                continue;
            }
            ring.push(p);
        }
        while ring.len() > 1 && ring[0].approx_eq(ring[ring.len() - 1], DUPLICATE_EPS) {
            ring.pop();
        }
        if ring.len() < 3 {
            return Err(GeometryError::DegeneratePolygon { points: ring.len() });
        }
        Ok(Self { points: ring })
    }

    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate the closed edge list, including the wrap-around edge.
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Shoelace area; positive for counter-clockwise rings in the Y-up convention.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.points)
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    #[must_use]
    pub fn bbox(&self) -> BBox {
        BBox::from_points(self.points.iter().copied())
    }

    /// Ray-casting point-in-polygon test. Points on the boundary are not guaranteed either way.
    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        let mut inside = false;
        let n = self.points.len();
        let mut j = n - 1;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    #[must_use]
    pub fn reversed(&self) -> Polygon {
        let mut points = self.points.clone();
        points.reverse();
        Polygon { points }
    }
}

impl TryFrom<Vec<Vec2>> for Polygon {
    type Error = GeometryError;

    fn try_from(points: Vec<Vec2>) -> Result<Self, Self::Error> {
        Polygon::new(points)
    }
}

impl From<Polygon> for Vec<Vec2> {
    fn from(polygon: Polygon) -> Self {
        polygon.points
    }
}

#[must_use]
pub fn signed_area(points: &[Vec2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        twice += a.cross(b);
    }
    twice / 2.0
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min: Vec2,
    pub max: Vec2,
}

impl BBox {
    /// An inverted box that any `include` call will overwrite.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Vec2::new(f64::INFINITY, f64::INFINITY),
            max: Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.include(p);
        }
        bbox
    }

    pub fn include(&mut self, p: Vec2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    #[must_use]
    pub fn union(self, other: BBox) -> BBox {
        BBox {
            min: Vec2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Vec2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.x.is_finite()
            && self.min.y.is_finite()
            && self.max.x.is_finite()
            && self.max.y.is_finite()
            && self.min.x <= self.max.x
            && self.min.y <= self.max.y
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Width × height, or 0 for an empty box.
    #[must_use]
    pub fn area(&self) -> f64 {
        if self.is_valid() {
            self.width() * self.height()
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn padded(&self, pad: f64) -> BBox {
        BBox {
            min: Vec2::new(self.min.x - pad, self.min.y - pad),
            max: Vec2::new(self.max.x + pad, self.max.y + pad),
        }
    }
}
