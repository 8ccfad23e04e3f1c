//! Board-level operations over a design host: key placement, switch plate export and case export.

pub mod case;
pub mod config;
pub mod error;
pub mod host;
pub mod outline_source;
pub mod placement;
pub mod plate;

pub use case::{CASE_INNER_LAYER, CASE_PREFIX, export_case};
pub use config::{ExportConfig, ExportPayload, OutlineMode, PlacementConfig, PlacementPayload};
pub use error::{Error, HostError, ValidationError, Warning};
pub use host::{Component, ComponentMove, DesignHost, DesignSnapshot, Primitive, PrimitiveSource};
pub use outline_source::{FoundOutline, find_board_outline};
pub use placement::{PlacementInstruction, PlacementReport, place_keys};
pub use plate::{ExportReport, PLATE_PREFIX, export_plate};
