//! Board outline recovery: fragment graphs and candidate selection.

pub mod graph;
pub mod select;

pub use graph::{DEFAULT_SNAP_TOLERANCE, OutlineGraph, OutlineItem, ReconstructMode, reconstruct};
pub use select::{MIN_REFERENCE_AREA, OUTLINE_SIZE_LIMIT, select_outline};
