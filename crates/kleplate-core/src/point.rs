use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A 2D point or vector.
///
/// Coordinates carry no unit of their own; each pipeline stage works in exactly one unit system
/// (layout units, mils or millimetres) and converts explicitly via [`crate::units`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product `self × other`.
    #[must_use]
    pub fn cross(self, other: Vec2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction, or the zero vector for a zero-length input.
    #[must_use]
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len <= f64::EPSILON {
            Vec2::default()
        } else {
            Vec2::new(self.x / len, self.y / len)
        }
    }

    /// Left-hand perpendicular (rotated +90° in the math convention).
    #[must_use]
    pub fn perp(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    #[must_use]
    pub fn midpoint(self, other: Vec2) -> Vec2 {
        Vec2::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Rotate this point by `angle_deg` around `origin` using the standard rotation matrix.
    #[must_use]
    pub fn rotated_about(self, origin: Vec2, angle_deg: f64) -> Vec2 {
        rotate_vec(self - origin, angle_deg) + origin
    }

    #[must_use]
    pub fn approx_eq(self, other: Vec2, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }
}

/// Rotate a vector by `angle_deg` around the origin.
#[must_use]
pub fn rotate_vec(v: Vec2, angle_deg: f64) -> Vec2 {
    let (s, c) = angle_deg.to_radians().sin_cos();
    Vec2::new(v.x * c - v.y * s, v.x * s + v.y * c)
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}
