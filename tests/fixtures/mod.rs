//! Test fixtures for building permit tables in memory.
//!
//! Tables are assembled as snapshots and loaded through [`Table::load`], so
//! fixtures exercise the same path a host uses when restoring a saved table.
//!
//! # Example
//!
//! ```rust,ignore
//! use fixtures::TableBuilder;
//!
//! let table = TableBuilder::new(3, 3)
//!     .text(0, 0, "Permit No.")
//!     .merge(0, 0, 1, 1)
//!     .column_width(2, 0.4)
//!     .build();
//! ```
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use permit_table::{CellSnapshot, LayoutConfig, Point, Table, TableSnapshot, TextStyle};

// ============================================================================
// Table Builder
// ============================================================================

/// Builder for tables with text, styles, merges and custom sizes.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    rows: usize,
    columns: usize,
    position: Point,
    row_heights: Vec<f64>,
    column_widths: Vec<f64>,
    cells: Vec<CellSnapshot>,
    config: LayoutConfig,
}

impl TableBuilder {
    /// Blank `rows` x `columns` table with default sizes at the origin.
    pub fn new(rows: usize, columns: usize) -> Self {
        let config = LayoutConfig::default();
        Self {
            rows,
            columns,
            position: Point::default(),
            row_heights: vec![config.default_row_height; rows],
            column_widths: vec![config.default_column_width; columns],
            cells: vec![CellSnapshot::default(); rows * columns],
            config,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Point::new(x, y);
        self
    }

    pub fn text(mut self, row: usize, col: usize, text: &str) -> Self {
        self.cell_mut(row, col).text = text.to_string();
        self
    }

    pub fn style(mut self, row: usize, col: usize, style: TextStyle) -> Self {
        self.cell_mut(row, col).style = style;
        self
    }

    /// Flag the inclusive block as merged into its top-left cell.
    pub fn merge(mut self, start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Self {
        for row in start_row..=end_row {
            for col in start_col..=end_col {
                let cell = self.cell_mut(row, col);
                cell.horizontal_merge_flag = col != start_col;
                cell.vertical_merge_flag = row != start_row;
            }
        }
        self
    }

    pub fn row_height(mut self, row: usize, height: f64) -> Self {
        self.row_heights[row] = height;
        self
    }

    pub fn column_width(mut self, col: usize, width: f64) -> Self {
        self.column_widths[col] = width;
        self
    }

    pub fn config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            position: self.position,
            row_count: self.rows,
            column_count: self.columns,
            column_widths: self.column_widths.clone(),
            row_heights: self.row_heights.clone(),
            cells: self.cells.clone(),
        }
    }

    /// Load the table, panicking if the fixture is inconsistent.
    pub fn build(&self) -> Table {
        Table::load(self.snapshot(), self.config.clone()).expect("fixture should load")
    }

    fn cell_mut(&mut self, row: usize, col: usize) -> &mut CellSnapshot {
        &mut self.cells[row * self.columns + col]
    }
}

// ============================================================================
// Width Oracles
// ============================================================================

/// Every character is 5px wide.
pub fn five_px(_: char, _: f64) -> f64 {
    5.0
}

/// Narrow spaces, wide capitals, everything else in between.
pub fn proportional(ch: char, font_size: f64) -> f64 {
    if ch.is_whitespace() {
        font_size * 0.25
    } else if ch.is_uppercase() {
        font_size * 0.7
    } else {
        font_size * 0.5
    }
}
