//! Persisted table shape.
//!
//! ```json
//! {
//!   "position": {"x": 0, "y": 0},
//!   "rowCount": 2, "columnCount": 2,
//!   "columnWidths": [0.3, 0.3], "rowHeights": [0.3, 0.3],
//!   "cells": [{"text": "A", "horizontalMergeFlag": false,
//!              "style": {"underline": false, "weight": "normal", "style": "normal"}}, ...]
//! }
//! ```
//!
//! Spans are never stored; they are re-derived on load.

use serde::{Deserialize, Serialize};

use crate::config::{check_sizes, LayoutConfig};
use crate::editor::Table;
use crate::error::{Result, TableError};
use crate::grid::CellGrid;
use crate::types::{Cell, Point, TextStyle};

/// One persisted cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellSnapshot {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub horizontal_merge_flag: bool,
    /// Older snapshots omit this; absent means unmerged.
    #[serde(default)]
    pub vertical_merge_flag: bool,
    #[serde(default)]
    pub style: TextStyle,
}

/// A persisted table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    pub position: Point,
    pub row_count: usize,
    pub column_count: usize,
    pub column_widths: Vec<f64>,
    pub row_heights: Vec<f64>,
    pub cells: Vec<CellSnapshot>,
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        Self {
            text: cell.text.clone(),
            horizontal_merge_flag: cell.horizontal_merge_flag,
            vertical_merge_flag: cell.vertical_merge_flag,
            style: cell.style,
        }
    }
}

impl From<CellSnapshot> for Cell {
    fn from(snap: CellSnapshot) -> Self {
        Cell {
            text: snap.text,
            horizontal_merge_flag: snap.horizontal_merge_flag,
            vertical_merge_flag: snap.vertical_merge_flag,
            style: snap.style,
            ..Cell::default()
        }
    }
}

impl TableSnapshot {
    /// Parse a snapshot from JSON without validating it.
    ///
    /// # Errors
    /// Returns `Json` for syntactically invalid input.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize as pretty JSON.
    ///
    /// # Errors
    /// Returns `Json` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check dimensions and sizes before building a table.
    ///
    /// # Errors
    /// Returns `MalformedSnapshot` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.row_count == 0 || self.column_count == 0 {
            return Err(malformed(format!(
                "table must have at least one row and column, got {}x{}",
                self.row_count, self.column_count
            )));
        }
        let expected = self.row_count.saturating_mul(self.column_count);
        if self.cells.len() != expected {
            return Err(malformed(format!(
                "expected {expected} cells for {}x{}, found {}",
                self.row_count,
                self.column_count,
                self.cells.len()
            )));
        }
        if self.row_heights.len() != self.row_count {
            return Err(malformed(format!(
                "expected {} row heights, found {}",
                self.row_count,
                self.row_heights.len()
            )));
        }
        if self.column_widths.len() != self.column_count {
            return Err(malformed(format!(
                "expected {} column widths, found {}",
                self.column_count,
                self.column_widths.len()
            )));
        }
        check_sizes(&self.row_heights, &self.column_widths).map_err(|e| malformed(e.to_string()))?;
        if !self.position.x.is_finite() || !self.position.y.is_finite() {
            return Err(malformed("position must be finite"));
        }
        Ok(())
    }
}

fn malformed(msg: impl Into<String>) -> TableError {
    TableError::MalformedSnapshot(msg.into())
}

impl Table {
    /// Capture the persisted shape of this table.
    pub fn save(&self) -> TableSnapshot {
        let (grid, row_heights, column_widths) = self.parts();
        TableSnapshot {
            position: self.origin(),
            row_count: grid.row_count(),
            column_count: grid.column_count(),
            column_widths: column_widths.to_vec(),
            row_heights: row_heights.to_vec(),
            cells: grid.cells().iter().map(CellSnapshot::from).collect(),
        }
    }

    /// Rebuild a table from a snapshot, re-deriving spans and geometry.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for an unusable layout and `MalformedSnapshot`
    /// for inconsistent dimensions, sizes or merge flags.
    pub fn load(snapshot: TableSnapshot, config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        snapshot.validate()?;
        let TableSnapshot {
            position,
            row_count,
            column_count,
            column_widths,
            row_heights,
            cells,
        } = snapshot;
        let cells = cells.into_iter().map(Cell::from).collect();
        let grid = CellGrid::from_cells(row_count, column_count, cells)
            .map_err(|e| malformed(e.to_string()))?;
        Table::from_parts(position, grid, row_heights, column_widths, config).map_err(|e| match e {
            m @ TableError::MalformedSnapshot(_) => m,
            other => malformed(other.to_string()),
        })
    }

    /// Parse and load a JSON snapshot.
    ///
    /// # Errors
    /// Returns `Json` for unparsable input and `MalformedSnapshot` for invalid tables.
    pub fn from_json(json: &str, config: LayoutConfig) -> Result<Self> {
        Self::load(TableSnapshot::from_json(json)?, config)
    }

    /// Serialize the persisted shape as pretty JSON.
    ///
    /// # Errors
    /// Returns `Json` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        self.save().to_json()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::types::CellPos;

    #[test]
    fn test_legacy_cell_defaults() {
        let cell: CellSnapshot =
            serde_json::from_str(r#"{"text": "A", "horizontalMergeFlag": true}"#).unwrap();
        assert!(cell.horizontal_merge_flag);
        assert!(!cell.vertical_merge_flag);
        assert_eq!(cell.style, TextStyle::default());
    }

    #[test]
    fn test_cell_count_mismatch_is_malformed() {
        let mut snap = Table::new(Point::default(), 2, 2, LayoutConfig::default())
            .unwrap()
            .save();
        snap.cells.pop();
        assert!(matches!(
            Table::load(snap, LayoutConfig::default()),
            Err(TableError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_inconsistent_flags_are_malformed() {
        let mut snap = Table::new(Point::default(), 2, 2, LayoutConfig::default())
            .unwrap()
            .save();
        snap.cells[0].horizontal_merge_flag = true;
        assert!(matches!(
            Table::load(snap, LayoutConfig::default()),
            Err(TableError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_load_derives_spans() {
        let mut table = Table::new(Point::default(), 2, 2, LayoutConfig::default()).unwrap();
        table
            .merge_cells(&[CellPos::new(0, 0), CellPos::new(1, 0)])
            .unwrap();
        let loaded = Table::load(table.save(), LayoutConfig::default()).unwrap();
        assert_eq!(loaded.cell(CellPos::new(0, 0)).unwrap().vertical_span, 1);
    }
}
