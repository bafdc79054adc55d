use serde::{Deserialize, Serialize};
use std::fmt;

use super::TextStyle;

/// Logical `(row, column)` coordinate of a cell, 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellPos {
    pub row: usize,
    pub column: usize,
}

impl CellPos {
    #[must_use]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl From<(usize, usize)> for CellPos {
    fn from((row, column): (usize, usize)) -> Self {
        Self { row, column }
    }
}

/// Grid direction, used to tag errors and line primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Row,
    Column,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => f.write_str("row"),
            Axis::Column => f.write_str("column"),
        }
    }
}

/// A single cell's text, merge flags and style.
///
/// Spans are derived state: they are rewritten by the merge resolver after
/// every structural edit and never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub text: String,
    /// Absorbed into the nearest non-flagged cell to the left in the same row.
    pub horizontal_merge_flag: bool,
    /// Absorbed into the nearest non-flagged cell above in the same column.
    pub vertical_merge_flag: bool,
    /// Additional cells absorbed to the right (derived).
    pub horizontal_span: usize,
    /// Additional cells absorbed below (derived).
    pub vertical_span: usize,
    pub style: TextStyle,
}

impl Cell {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Blank cell carrying the merge flags of `neighbor`.
    ///
    /// Used when inserting rows/columns so merges spanning the insertion
    /// point stay merged.
    #[must_use]
    pub fn inheriting_flags(neighbor: Option<&Cell>) -> Self {
        let mut cell = Self::default();
        if let Some(n) = neighbor {
            cell.horizontal_merge_flag = n.horizontal_merge_flag;
            cell.vertical_merge_flag = n.vertical_merge_flag;
        }
        cell
    }

    /// True if this cell is not absorbed into any other cell.
    #[must_use]
    pub fn is_anchor(&self) -> bool {
        !self.horizontal_merge_flag && !self.vertical_merge_flag
    }

    /// True if this anchor owns at least one other cell.
    #[must_use]
    pub fn has_span(&self) -> bool {
        self.horizontal_span > 0 || self.vertical_span > 0
    }

    pub(crate) fn clear_merge_flags(&mut self) {
        self.horizontal_merge_flag = false;
        self.vertical_merge_flag = false;
    }
}
