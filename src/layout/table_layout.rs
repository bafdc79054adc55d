//! Pre-computed boundary positions for a table.
//!
//! Positions are computed once per geometry compile, enabling O(log n)
//! hit testing and O(1) boundary lookups.

use crate::config::Scale;
use crate::error::{Result, TableError};
use crate::types::{CellRange, Point};

/// Cumulative boundary positions in canvas pixels.
#[derive(Debug, Clone)]
pub struct TableLayout {
    /// `col_positions[j]` = x of column j's left edge; last entry is the right edge
    pub col_positions: Vec<f64>,
    /// `row_positions[i]` = y of row i's top edge; last entry is the bottom edge
    pub row_positions: Vec<f64>,
}

/// Rectangle covering one cell or merge block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CellRect {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

impl TableLayout {
    /// Build positions from logical sizes.
    ///
    /// # Errors
    /// Returns `StructuralIntegrity` when a size array is empty.
    pub fn new(
        row_heights: &[f64],
        column_widths: &[f64],
        origin: Point,
        scale: Scale,
    ) -> Result<Self> {
        if row_heights.is_empty() || column_widths.is_empty() {
            return Err(TableError::StructuralIntegrity {
                expected: 1,
                actual: 0,
            });
        }
        Ok(Self {
            col_positions: cumulative(origin.x, column_widths, scale.column),
            row_positions: cumulative(origin.y, row_heights, scale.row),
        })
    }

    pub fn row_count(&self) -> usize {
        self.row_positions.len().saturating_sub(1)
    }

    pub fn column_count(&self) -> usize {
        self.col_positions.len().saturating_sub(1)
    }

    /// y of row boundary `i` (0 = top edge, `row_count` = bottom edge).
    pub fn row_y(&self, boundary: usize) -> f64 {
        self.row_positions
            .get(boundary)
            .or_else(|| self.row_positions.last())
            .copied()
            .unwrap_or(0.0)
    }

    /// x of column boundary `j` (0 = left edge, `column_count` = right edge).
    pub fn col_x(&self, boundary: usize) -> f64 {
        self.col_positions
            .get(boundary)
            .or_else(|| self.col_positions.last())
            .copied()
            .unwrap_or(0.0)
    }

    /// Rectangle covering an inclusive range of cells.
    pub fn range_rect(&self, range: &CellRange) -> CellRect {
        let x = self.col_x(range.start_col);
        let y = self.row_y(range.start_row);
        CellRect {
            x,
            y,
            width: self.col_x(range.end_col + 1) - x,
            height: self.row_y(range.end_row + 1) - y,
        }
    }

    /// Find row at y position (binary search); `None` outside the table.
    pub fn row_at_y(&self, y: f64) -> Option<usize> {
        index_at(&self.row_positions, y)
    }

    /// Find column at x position (binary search); `None` outside the table.
    pub fn col_at_x(&self, x: f64) -> Option<usize> {
        index_at(&self.col_positions, x)
    }

    pub fn total_width(&self) -> f64 {
        self.col_x(self.column_count()) - self.col_x(0)
    }

    pub fn total_height(&self) -> f64 {
        self.row_y(self.row_count()) - self.row_y(0)
    }
}

fn cumulative(start: f64, sizes: &[f64], scale: f64) -> Vec<f64> {
    let mut positions = Vec::with_capacity(sizes.len() + 1);
    let mut acc = start;
    positions.push(acc);
    for size in sizes {
        acc += size * scale;
        positions.push(acc);
    }
    positions
}

fn index_at(positions: &[f64], v: f64) -> Option<usize> {
    let (first, last) = (positions.first()?, positions.last()?);
    if v < *first || v >= *last {
        return None;
    }
    match positions.binary_search_by(|pos| pos.partial_cmp(&v).unwrap_or(std::cmp::Ordering::Equal)) {
        Ok(i) => Some(i),
        Err(i) => Some(i.saturating_sub(1)),
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

    fn layout() -> TableLayout {
        TableLayout::new(
            &[0.3, 0.5, 0.2],
            &[1.0, 0.5],
            Point::new(10.0, 20.0),
            Scale::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_positions_include_origin() {
        let layout = layout();
        assert_eq!(layout.col_positions, vec![10.0, 110.0, 160.0]);
        assert_eq!(layout.row_positions, vec![20.0, 50.0, 100.0, 120.0]);
        assert_eq!(layout.total_width(), 150.0);
        assert_eq!(layout.total_height(), 100.0);
    }

    #[test]
    fn test_range_rect() {
        let rect = layout().range_rect(&CellRange::new(0, 0, 1, 1));
        assert_eq!(rect.x, 10.0);
        assert_eq!(rect.y, 20.0);
        assert_eq!(rect.width, 150.0);
        assert_eq!(rect.height, 80.0);
        assert_eq!(rect.center(), Point::new(85.0, 60.0));
    }

    #[test]
    fn test_row_at_y() {
        let layout = layout();
        assert_eq!(layout.row_at_y(19.0), None);
        assert_eq!(layout.row_at_y(20.0), Some(0));
        assert_eq!(layout.row_at_y(50.0), Some(1));
        assert_eq!(layout.row_at_y(99.5), Some(1));
        assert_eq!(layout.row_at_y(120.0), None);
    }

    #[test]
    fn test_col_at_x() {
        let layout = layout();
        assert_eq!(layout.col_at_x(10.0), Some(0));
        assert_eq!(layout.col_at_x(109.0), Some(0));
        assert_eq!(layout.col_at_x(110.0), Some(1));
        assert_eq!(layout.col_at_x(200.0), None);
    }

    #[test]
    fn test_empty_sizes_rejected() {
        assert!(TableLayout::new(&[], &[1.0], Point::default(), Scale::default()).is_err());
    }
}
