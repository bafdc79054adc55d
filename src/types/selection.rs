use serde::{Deserialize, Serialize};

use super::CellPos;

/// Inclusive rectangular block of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRange {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl CellRange {
    /// Create a range, normalizing so start <= end on both axes.
    #[must_use]
    pub fn new(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Self {
        Self {
            start_row: start_row.min(end_row),
            start_col: start_col.min(end_col),
            end_row: start_row.max(end_row),
            end_col: start_col.max(end_col),
        }
    }

    /// Single-cell range.
    #[must_use]
    pub fn cell(pos: CellPos) -> Self {
        Self::new(pos.row, pos.column, pos.row, pos.column)
    }

    /// Top-left cell.
    #[must_use]
    pub fn anchor(&self) -> CellPos {
        CellPos::new(self.start_row, self.start_col)
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    #[must_use]
    pub fn contains(&self, pos: CellPos) -> bool {
        (self.start_row..=self.end_row).contains(&pos.row)
            && (self.start_col..=self.end_col).contains(&pos.column)
    }

    #[must_use]
    pub fn contains_range(&self, other: &CellRange) -> bool {
        self.contains(other.anchor()) && self.contains(CellPos::new(other.end_row, other.end_col))
    }

    #[must_use]
    pub fn intersects(&self, other: &CellRange) -> bool {
        self.start_row <= other.end_row
            && other.start_row <= self.end_row
            && self.start_col <= other.end_col
            && other.start_col <= self.end_col
    }

    /// Row-major iterator over every position in the range.
    pub fn positions(&self) -> impl Iterator<Item = CellPos> + '_ {
        (self.start_row..=self.end_row)
            .flat_map(move |row| (self.start_col..=self.end_col).map(move |col| CellPos::new(row, col)))
    }
}
