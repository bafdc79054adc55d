//! permit-table - editable permit tables for canvas editors
//!
//! Models a table as a flat grid of cells with per-cell merge flags and
//! compiles it into drawable primitives (line segments and text regions):
//! - Merge/demerge of rectangular blocks
//! - Row and column insertion, deletion and boundary resizing
//! - In-cell editing with greedy text reflow and automatic row growth
//! - JSON snapshots that round-trip the persisted shape
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { PermitTableHandle } from 'permit-table';
//! await init();
//! const table = PermitTableHandle.blank(0, 0, 3, 3);
//! table.merge([{row: 0, column: 0}, {row: 1, column: 1}]);
//! const { lines, textRegions } = table.primitives();
//! ```

// Model
pub mod config;
pub mod error;
pub mod grid;
pub mod merge;
pub mod selection;
pub mod types;

// Editing and geometry
pub mod editor;
pub mod layout;
pub mod reflow;
pub mod snapshot;

// Host bindings
pub mod bindings;

use wasm_bindgen::prelude::*;

pub use bindings::PermitTableHandle;
pub use config::LayoutConfig;
pub use editor::{EditState, Table};
pub use error::{Result, TableError};
pub use reflow::{CachedWidthOracle, CharWidthOracle, ReflowOutcome};
pub use snapshot::{CellSnapshot, TableSnapshot};

pub use types::*;

/// Compile a JSON snapshot with the default layout and return its primitives as JSON
///
/// # Errors
/// Returns an error if the snapshot cannot be parsed or describes an invalid table.
#[wasm_bindgen]
pub fn compile_snapshot(json: &str) -> std::result::Result<String, JsValue> {
    let table =
        Table::from_json(json, LayoutConfig::default()).map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_json::to_string(table.primitives())
        .map_err(|e| JsValue::from_str(&format!("JSON serialization error: {e}")))
}

/// Compile a JSON snapshot and return the primitives as a `JsValue`
///
/// # Errors
/// Returns an error if the snapshot is invalid or cannot be converted.
#[wasm_bindgen]
pub fn compile_snapshot_to_js(json: &str) -> std::result::Result<JsValue, JsValue> {
    let table =
        Table::from_json(json, LayoutConfig::default()).map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_wasm_bindgen::to_value(table.primitives())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
