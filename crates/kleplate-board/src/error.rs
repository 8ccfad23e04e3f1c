use std::fmt;

use kleplate_core::GeometryError;
use kleplate_export::ExportError;
use kleplate_parser::LayoutParseError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("pitch must be a finite number greater than 0 (got {0})")]
    InvalidPitch(f64),

    #[error("no key label carries an SW<n> designator hint (e.g. \"Esc\\nSW1\")")]
    NoDesignatorHints,
}

/// A failure reported by the design host.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    #[error("component \"{id}\" does not exist")]
    UnknownComponent { id: String },

    #[error("host query failed: {0}")]
    Query(String),
}

/// Everything the board operations can fail with.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Layout(#[from] LayoutParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Non-fatal findings returned alongside a successful result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Warning {
    /// Designator numbers used by more than one key, in first-seen order.
    DuplicateDesignators { numbers: Vec<u32> },
    /// The chosen outline dwarfs the area spanned by the keys.
    OutlineMuchLarger { ratio: f64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DuplicateDesignators { numbers } => {
                let list: Vec<String> = numbers.iter().map(u32::to_string).collect();
                write!(f, "duplicate SW numbers in the layout: {}", list.join(", "))
            }
            Warning::OutlineMuchLarger { ratio } => write!(
                f,
                "selected outline is {ratio:.1}x larger than the key area; check the outline source"
            ),
        }
    }
}
