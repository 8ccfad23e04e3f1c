use thiserror::Error;

/// Geometry failures shared by the outline, algebra and orchestration layers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("polygon needs at least 3 distinct points (got {points})")]
    DegeneratePolygon { points: usize },

    #[error("no outline found (tried: {})", tried.join(", "))]
    NoOutline { tried: Vec<String> },

    #[error("no candidate outline contains any of the {references} reference points")]
    NoContainingOutline { references: usize },

    #[error("offset by {distance} produced no usable ring")]
    EmptyOffset { distance: f64 },

    #[error("union of {inputs} polygons produced no usable ring")]
    EmptyUnion { inputs: usize },

    #[error("convex hull needs at least 3 non-collinear points (got {points})")]
    DegenerateHull { points: usize },
}
