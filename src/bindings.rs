//! JavaScript-facing handle around a [`Table`].
//!
//! The host canvas owns rendering and pointer events; it forwards presses,
//! keystrokes and menu commands here and redraws from `PermitTableHandle::primitives`
//! after every call that reports a change. Off wasm32 the handle exposes a
//! small `Result`-returning surface for tests and native callers.

use wasm_bindgen::prelude::*;

use crate::config::LayoutConfig;
use crate::editor::Table;
use crate::error::Result as TableResult;
use crate::types::{CellPos, Point};

#[cfg(target_arch = "wasm32")]
use crate::reflow::{CachedWidthOracle, CharWidthOracle};
#[cfg(target_arch = "wasm32")]
use crate::types::{FontStyle, FontWeight, TextStyle};

/// Character widths measured by a JS callback `(ch: string, fontSize: number) => number`.
#[cfg(target_arch = "wasm32")]
struct JsWidthOracle<'a>(&'a js_sys::Function);

#[cfg(target_arch = "wasm32")]
impl CharWidthOracle for JsWidthOracle<'_> {
    fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let mut buf = [0u8; 4];
        self.0
            .call2(
                &JsValue::NULL,
                &JsValue::from_str(ch.encode_utf8(&mut buf)),
                &JsValue::from_f64(font_size),
            )
            .ok()
            .and_then(|v| v.as_f64())
            .filter(|w| w.is_finite())
            .unwrap_or(0.0)
    }
}

#[cfg(target_arch = "wasm32")]
fn js_error(msg: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&msg.to_string())
}

#[cfg(target_arch = "wasm32")]
fn parse_cells(cells: JsValue) -> Result<Vec<CellPos>, JsValue> {
    serde_wasm_bindgen::from_value(cells).map_err(|e| js_error(format!("Invalid cell list: {e}")))
}

/// Layout constants from JSON; blank input means the defaults.
fn parse_config(config_json: &str) -> TableResult<LayoutConfig> {
    if config_json.trim().is_empty() {
        return Ok(LayoutConfig::default());
    }
    let config: LayoutConfig = serde_json::from_str(config_json)?;
    config.validate()?;
    Ok(config)
}

/// A permit table owned by the host page.
#[wasm_bindgen]
pub struct PermitTableHandle {
    table: Table,
}

// ============================================================================
// WASM32 Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl PermitTableHandle {
    /// Blank `rows` x `columns` table with its top-left corner at `(x, y)`.
    #[wasm_bindgen]
    pub fn blank(x: f64, y: f64, rows: usize, columns: usize) -> Result<PermitTableHandle, JsValue> {
        let table = Table::new(Point::new(x, y), rows, columns, LayoutConfig::default())?;
        Ok(Self { table })
    }

    /// Load a snapshot. `config_json` may be empty for the default layout.
    #[wasm_bindgen(js_name = "fromJson")]
    pub fn from_json(json: &str, config_json: &str) -> Result<PermitTableHandle, JsValue> {
        let table = Table::from_json(json, parse_config(config_json)?)?;
        Ok(Self { table })
    }

    #[wasm_bindgen(js_name = "toJson")]
    pub fn to_json(&self) -> Result<String, JsValue> {
        Ok(self.table.to_json()?)
    }

    /// Compiled line segments and text regions.
    #[wasm_bindgen]
    pub fn primitives(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.table.primitives())
            .map_err(|e| js_error(format!("Serialization error: {e}")))
    }

    /// Current edit state as `{state: "idle"}` or `{state: "editing", pos, cursor}`.
    #[wasm_bindgen]
    pub fn state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.table.state())
            .map_err(|e| js_error(format!("Serialization error: {e}")))
    }

    #[wasm_bindgen]
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    #[wasm_bindgen]
    pub fn column_count(&self) -> usize {
        self.table.column_count()
    }

    #[wasm_bindgen]
    pub fn is_editing(&self) -> bool {
        self.table.is_editing()
    }

    /// Hit-test: anchor `[row, column]` of the region under a canvas point.
    #[wasm_bindgen]
    pub fn cell_at(&self, x: f64, y: f64) -> Option<Vec<u32>> {
        let pos = self.table.cell_at(Point::new(x, y))?;
        Some(vec![
            u32::try_from(pos.row).ok()?,
            u32::try_from(pos.column).ok()?,
        ])
    }

    /// Pointer press on a region.
    #[wasm_bindgen]
    pub fn press(&mut self, row: usize, column: usize, shift: bool) -> Result<(), JsValue> {
        Ok(self.table.press_region(CellPos::new(row, column), shift)?)
    }

    #[wasm_bindgen]
    pub fn begin_edit(&mut self, row: usize, column: usize) -> Result<(), JsValue> {
        Ok(self.table.begin_edit(CellPos::new(row, column))?)
    }

    /// Replace the focused region's text, measuring characters with `measure`.
    /// Returns the reflow outcome (`{kind: "fits" | "wrapped" | "rowGrown", ...}`).
    #[wasm_bindgen]
    pub fn update_text(&mut self, text: &str, measure: &js_sys::Function) -> Result<JsValue, JsValue> {
        let oracle = CachedWidthOracle::new(JsWidthOracle(measure));
        let outcome = self.table.update_text(text, &oracle)?;
        serde_wasm_bindgen::to_value(&outcome)
            .map_err(|e| js_error(format!("Serialization error: {e}")))
    }

    #[wasm_bindgen]
    pub fn commit_edit(&mut self) {
        self.table.commit_edit();
    }

    #[wasm_bindgen]
    pub fn clear_selection(&mut self) {
        self.table.clear_selection();
    }

    /// Merge the given `[{row, column}]` cells.
    #[wasm_bindgen]
    pub fn merge(&mut self, cells: JsValue) -> Result<(), JsValue> {
        let cells = parse_cells(cells)?;
        Ok(self.table.merge_cells(&cells)?)
    }

    /// Split the merge anchored at the top-left of the given cells.
    #[wasm_bindgen]
    pub fn demerge(&mut self, cells: JsValue) -> Result<(), JsValue> {
        let cells = parse_cells(cells)?;
        Ok(self.table.demerge_cells(&cells)?)
    }

    /// Merge the cells collected by Shift-presses.
    #[wasm_bindgen]
    pub fn merge_selection(&mut self) -> Result<(), JsValue> {
        let cells = self.table.selection().to_vec();
        self.table.merge_cells(&cells)?;
        self.table.clear_selection();
        Ok(())
    }

    /// Split the merge under the Shift-press selection.
    #[wasm_bindgen]
    pub fn demerge_selection(&mut self) -> Result<(), JsValue> {
        let cells = self.table.selection().to_vec();
        self.table.demerge_cells(&cells)?;
        self.table.clear_selection();
        Ok(())
    }

    #[wasm_bindgen]
    pub fn insert_row(&mut self, reference_row: usize, above: bool) -> Result<usize, JsValue> {
        Ok(self.table.insert_row(reference_row, above)?)
    }

    #[wasm_bindgen]
    pub fn delete_row(&mut self, row: usize) -> Result<(), JsValue> {
        Ok(self.table.delete_row(row)?)
    }

    #[wasm_bindgen]
    pub fn insert_column(&mut self, reference_column: usize, left: bool) -> Result<usize, JsValue> {
        Ok(self.table.insert_column(reference_column, left)?)
    }

    #[wasm_bindgen]
    pub fn delete_column(&mut self, column: usize) -> Result<(), JsValue> {
        Ok(self.table.delete_column(column)?)
    }

    #[wasm_bindgen]
    pub fn resize_row_boundary(&mut self, boundary: usize, delta_px: f64) -> Result<(), JsValue> {
        Ok(self.table.resize_row_boundary(boundary, delta_px)?)
    }

    #[wasm_bindgen]
    pub fn resize_column_boundary(&mut self, boundary: usize, delta_px: f64) -> Result<(), JsValue> {
        Ok(self.table.resize_column_boundary(boundary, delta_px)?)
    }

    #[wasm_bindgen]
    pub fn set_cell_style(
        &mut self,
        row: usize,
        column: usize,
        bold: bool,
        italic: bool,
        underline: bool,
    ) -> Result<(), JsValue> {
        let style = TextStyle {
            underline,
            weight: if bold { FontWeight::Bold } else { FontWeight::Normal },
            style: if italic { FontStyle::Italic } else { FontStyle::Normal },
        };
        Ok(self.table.set_cell_style(CellPos::new(row, column), style)?)
    }

    /// Move the table after a drag.
    #[wasm_bindgen]
    pub fn move_to(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        Ok(self.table.set_origin(Point::new(x, y))?)
    }
}

// ============================================================================
// Non-WASM32 Implementation (for tests)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
impl PermitTableHandle {
    /// Blank table with the default layout.
    pub fn blank(x: f64, y: f64, rows: usize, columns: usize) -> TableResult<Self> {
        let table = Table::new(Point::new(x, y), rows, columns, LayoutConfig::default())?;
        Ok(Self { table })
    }

    /// Load a snapshot. `config_json` may be empty for the default layout.
    pub fn from_json(json: &str, config_json: &str) -> TableResult<Self> {
        let table = Table::from_json(json, parse_config(config_json)?)?;
        Ok(Self { table })
    }

    pub fn to_json(&self) -> TableResult<String> {
        self.table.to_json()
    }

    pub fn press(&mut self, row: usize, column: usize, shift: bool) -> TableResult<()> {
        self.table.press_region(CellPos::new(row, column), shift)
    }

    pub fn merge_selection(&mut self) -> TableResult<()> {
        let cells = self.table.selection().to_vec();
        self.table.merge_cells(&cells)?;
        self.table.clear_selection();
        Ok(())
    }

    pub fn insert_column(&mut self, reference_column: usize, left: bool) -> TableResult<usize> {
        self.table.insert_column(reference_column, left)
    }
}

impl PermitTableHandle {
    pub fn table(&self) -> &Table {
        &self.table
    }
}

impl From<Table> for PermitTableHandle {
    fn from(table: Table) -> Self {
        Self { table }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::error::TableError;

    #[test]
    fn test_selection_merge_through_handle() {
        let mut handle = PermitTableHandle::blank(0.0, 0.0, 2, 2).unwrap();
        handle.press(0, 0, true).unwrap();
        handle.press(0, 1, true).unwrap();
        handle.merge_selection().unwrap();
        assert_eq!(handle.table().primitives().text_regions.len(), 3);
        assert!(handle.table().selection().is_empty());
    }

    #[test]
    fn test_json_round_trip_through_handle() {
        let mut handle = PermitTableHandle::blank(10.0, 20.0, 2, 3).unwrap();
        assert_eq!(handle.insert_column(2, false).unwrap(), 3);
        let json = handle.to_json().unwrap();
        let loaded = PermitTableHandle::from_json(&json, "").unwrap();
        assert_eq!(loaded.table().column_count(), 4);
        assert_eq!(loaded.table().origin(), Point::new(10.0, 20.0));
    }

    #[test]
    fn test_errors_stay_native() {
        let mut handle = PermitTableHandle::blank(0.0, 0.0, 1, 1).unwrap();
        assert!(matches!(
            handle.press(4, 0, false),
            Err(TableError::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            PermitTableHandle::blank(0.0, 0.0, 0, 1),
            Err(TableError::MinimumDimensionViolation(_))
        ));
    }

    #[test]
    fn test_config_json_is_validated() {
        let json = PermitTableHandle::blank(0.0, 0.0, 1, 1)
            .unwrap()
            .to_json()
            .unwrap();
        assert!(matches!(
            PermitTableHandle::from_json(&json, r#"{"rowScale": 0}"#),
            Err(TableError::InvalidConfig(_))
        ));
        assert!(matches!(
            PermitTableHandle::from_json(&json, "{"),
            Err(TableError::Json(_))
        ));
    }
}
