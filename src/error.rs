//! Structured error types for permit tables.
//!
//! Every structural edit is validated before it is committed, so each variant
//! here describes a rejected operation; the table is unchanged when one is returned.

use crate::types::Axis;

/// All errors that can occur while editing, compiling or loading a table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The flat cell sequence no longer matches `row_count * column_count`,
    /// or a size array disagrees with its dimension.
    #[error("Structural integrity: expected {expected} entries, found {actual}")]
    StructuralIntegrity { expected: usize, actual: usize },

    /// A row or column reference outside the current bounds.
    #[error("{axis} index {index} out of bounds (len {len})")]
    IndexOutOfBounds { axis: Axis, index: usize, len: usize },

    /// Merge requested over a block that cuts through an existing merge.
    #[error("Invalid selection shape: {0}")]
    InvalidSelectionShape(String),

    /// No cells were selected.
    #[error("Selection is empty")]
    EmptySelection,

    /// Deleting the last remaining row or column.
    #[error("Cannot delete the last remaining {0}")]
    MinimumDimensionViolation(Axis),

    /// Structural edit attempted while a text region has focus.
    #[error("A cell edit is in progress; commit it first")]
    EditInProgress,

    /// Text update without a focused region.
    #[error("No cell is being edited")]
    NoActiveEdit,

    /// Persisted data that cannot describe a valid table.
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// Layout constants that cannot produce finite geometry.
    #[error("Invalid layout config: {0}")]
    InvalidConfig(String),

    /// A row height or column width that is negative or not finite.
    #[error("Invalid {axis} size {value} at index {index}")]
    InvalidSize { axis: Axis, index: usize, value: f64 },

    /// JSON encoding/decoding of a snapshot or config.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TableError>;

impl TableError {
    pub(crate) fn row_out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            axis: Axis::Row,
            index,
            len,
        }
    }

    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub(crate) fn column_out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            axis: Axis::Column,
            index,
            len,
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl From<TableError> for wasm_bindgen::JsValue {
    fn from(e: TableError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
