//! Shared value types for the kleplate pipeline: points, polygons, keys and unit conversions.

pub mod error;
pub mod key;
pub mod point;
pub mod polygon;
pub mod units;

pub use error::GeometryError;
pub use key::Key;
pub use point::Vec2;
pub use polygon::{BBox, Polygon};
