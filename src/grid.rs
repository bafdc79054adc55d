//! Flat row-major cell storage with row and column views.
//!
//! A cell's logical coordinate is implicit from its position:
//! `index = row * column_count + column`. Everything that needs to refer to a
//! cell from outside the grid does so by [`CellPos`], never by reference.

use crate::error::{Result, TableError};
use crate::types::{Axis, Cell, CellPos};

/// Owned grid of cells.
///
/// `cells.len() == row_count * column_count` holds for every value reachable
/// through the public API.
#[derive(Debug, Clone, PartialEq)]
pub struct CellGrid {
    row_count: usize,
    column_count: usize,
    cells: Vec<Cell>,
}

impl CellGrid {
    /// Create a grid of blank, unmerged cells.
    ///
    /// # Errors
    /// Returns `MinimumDimensionViolation` if either dimension is zero.
    pub fn new(row_count: usize, column_count: usize) -> Result<Self> {
        let cells = vec![Cell::default(); row_count.saturating_mul(column_count)];
        Self::from_cells(row_count, column_count, cells)
    }

    /// Wrap an existing row-major cell sequence.
    ///
    /// Spans are not resolved here; callers run the merge resolver afterwards.
    ///
    /// # Errors
    /// Returns `MinimumDimensionViolation` for a zero dimension and
    /// `StructuralIntegrity` if the sequence length does not match.
    pub fn from_cells(row_count: usize, column_count: usize, cells: Vec<Cell>) -> Result<Self> {
        if row_count == 0 {
            return Err(TableError::MinimumDimensionViolation(Axis::Row));
        }
        if column_count == 0 {
            return Err(TableError::MinimumDimensionViolation(Axis::Column));
        }
        let grid = Self {
            row_count,
            column_count,
            cells,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Check the size invariant.
    ///
    /// # Errors
    /// Returns `StructuralIntegrity` when `cells.len() != row_count * column_count`.
    pub fn validate(&self) -> Result<()> {
        let expected = self.row_count.saturating_mul(self.column_count);
        if self.cells.len() != expected {
            return Err(TableError::StructuralIntegrity {
                expected,
                actual: self.cells.len(),
            });
        }
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Flat row-major cell sequence.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Flat index of `pos`, or `None` when outside the grid.
    pub fn index_of(&self, pos: CellPos) -> Option<usize> {
        if pos.row < self.row_count && pos.column < self.column_count {
            Some(pos.row * self.column_count + pos.column)
        } else {
            None
        }
    }

    /// Logical coordinate of a flat index.
    pub fn pos_of(&self, index: usize) -> CellPos {
        CellPos::new(index / self.column_count, index % self.column_count)
    }

    pub fn get(&self, pos: CellPos) -> Option<&Cell> {
        self.index_of(pos).and_then(|i| self.cells.get(i))
    }

    pub(crate) fn get_mut(&mut self, pos: CellPos) -> Option<&mut Cell> {
        self.index_of(pos).and_then(move |i| self.cells.get_mut(i))
    }

    /// Cell at `pos`.
    ///
    /// # Errors
    /// Returns `IndexOutOfBounds` naming the offending axis.
    pub fn cell(&self, pos: CellPos) -> Result<&Cell> {
        self.check_bounds(pos)?;
        self.get(pos)
            .ok_or_else(|| TableError::row_out_of_bounds(pos.row, self.row_count))
    }

    pub(crate) fn cell_mut(&mut self, pos: CellPos) -> Result<&mut Cell> {
        self.check_bounds(pos)?;
        let row_count = self.row_count;
        self.get_mut(pos)
            .ok_or_else(|| TableError::row_out_of_bounds(pos.row, row_count))
    }

    /// Validate that `pos` lies inside the grid.
    ///
    /// # Errors
    /// Returns `IndexOutOfBounds` naming the offending axis.
    pub fn check_bounds(&self, pos: CellPos) -> Result<()> {
        if pos.row >= self.row_count {
            return Err(TableError::row_out_of_bounds(pos.row, self.row_count));
        }
        if pos.column >= self.column_count {
            return Err(TableError::column_out_of_bounds(
                pos.column,
                self.column_count,
            ));
        }
        Ok(())
    }

    /// `row_count` groups of `column_count` consecutive cells.
    pub fn rows(&self) -> Vec<&[Cell]> {
        self.cells.chunks(self.column_count).collect()
    }

    /// Transposed view: column `j` holds `cells[j + i * column_count]`.
    pub fn columns(&self) -> Vec<Vec<&Cell>> {
        (0..self.column_count)
            .map(|j| {
                self.cells
                    .iter()
                    .skip(j)
                    .step_by(self.column_count)
                    .collect()
            })
            .collect()
    }

    /// Splice `new_cells` in as row `at`, shifting later rows down.
    pub(crate) fn insert_row(&mut self, at: usize, new_cells: Vec<Cell>) -> Result<()> {
        if at > self.row_count {
            return Err(TableError::row_out_of_bounds(at, self.row_count + 1));
        }
        if new_cells.len() != self.column_count {
            return Err(TableError::StructuralIntegrity {
                expected: self.column_count,
                actual: new_cells.len(),
            });
        }
        let offset = at * self.column_count;
        self.cells.splice(offset..offset, new_cells);
        self.row_count += 1;
        self.validate()
    }

    /// Remove row `at` and return its cells.
    pub(crate) fn remove_row(&mut self, at: usize) -> Result<Vec<Cell>> {
        if self.row_count <= 1 {
            return Err(TableError::MinimumDimensionViolation(Axis::Row));
        }
        if at >= self.row_count {
            return Err(TableError::row_out_of_bounds(at, self.row_count));
        }
        let offset = at * self.column_count;
        let removed = self.cells.drain(offset..offset + self.column_count).collect();
        self.row_count -= 1;
        self.validate()?;
        Ok(removed)
    }

    /// Insert `new_cells` (one per row, top to bottom) as column `at`.
    pub(crate) fn insert_column(&mut self, at: usize, new_cells: Vec<Cell>) -> Result<()> {
        if at > self.column_count {
            return Err(TableError::column_out_of_bounds(at, self.column_count + 1));
        }
        if new_cells.len() != self.row_count {
            return Err(TableError::StructuralIntegrity {
                expected: self.row_count,
                actual: new_cells.len(),
            });
        }
        let mut rows = self.take_rows();
        for (row, cell) in rows.iter_mut().zip(new_cells) {
            row.insert(at, cell);
        }
        self.set_rows(rows);
        self.validate()
    }

    /// Remove column `at` and return its cells, top to bottom.
    pub(crate) fn remove_column(&mut self, at: usize) -> Result<Vec<Cell>> {
        if self.column_count <= 1 {
            return Err(TableError::MinimumDimensionViolation(Axis::Column));
        }
        if at >= self.column_count {
            return Err(TableError::column_out_of_bounds(at, self.column_count));
        }
        let mut rows = self.take_rows();
        let removed = rows.iter_mut().map(|row| row.remove(at)).collect();
        self.set_rows(rows);
        self.validate()?;
        Ok(removed)
    }

    fn take_rows(&mut self) -> Vec<Vec<Cell>> {
        let mut cells = std::mem::take(&mut self.cells).into_iter();
        (0..self.row_count)
            .map(|_| cells.by_ref().take(self.column_count).collect())
            .collect()
    }

    fn set_rows(&mut self, rows: Vec<Vec<Cell>>) {
        self.row_count = rows.len();
        self.column_count = rows.first().map_or(0, Vec::len);
        self.cells = rows.into_iter().flatten().collect();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn labeled(rows: usize, cols: usize) -> CellGrid {
        let cells = (0..rows * cols).map(|i| Cell::new(i.to_string())).collect();
        CellGrid::from_cells(rows, cols, cells).unwrap()
    }

    #[test]
    fn test_rows_partition_row_major() {
        let grid = labeled(2, 3);
        let rows = grid.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0].text, "3");
        assert_eq!(rows[1][2].text, "5");
    }

    #[test]
    fn test_columns_transpose() {
        let grid = labeled(2, 3);
        let cols = grid.columns();
        assert_eq!(cols.len(), 3);
        assert_eq!(cols[1].len(), 2);
        assert_eq!(cols[1][0].text, "1");
        assert_eq!(cols[1][1].text, "4");
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = CellGrid::from_cells(2, 2, vec![Cell::default(); 3]).unwrap_err();
        assert!(matches!(
            err,
            TableError::StructuralIntegrity {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            CellGrid::new(0, 3),
            Err(TableError::MinimumDimensionViolation(Axis::Row))
        ));
        assert!(matches!(
            CellGrid::new(3, 0),
            Err(TableError::MinimumDimensionViolation(Axis::Column))
        ));
    }

    #[test]
    fn test_insert_and_remove_column() {
        let mut grid = labeled(2, 2);
        grid.insert_column(1, vec![Cell::new("a"), Cell::new("b")])
            .unwrap();
        assert_eq!(grid.column_count(), 3);
        assert_eq!(grid.get(CellPos::new(0, 1)).unwrap().text, "a");
        assert_eq!(grid.get(CellPos::new(1, 2)).unwrap().text, "3");

        let removed = grid.remove_column(0).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[1].text, "2");
        assert_eq!(grid.get(CellPos::new(1, 0)).unwrap().text, "b");
    }

    #[test]
    fn test_insert_and_remove_row() {
        let mut grid = labeled(2, 2);
        grid.insert_row(0, vec![Cell::new("x"), Cell::new("y")])
            .unwrap();
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.get(CellPos::new(0, 1)).unwrap().text, "y");
        assert_eq!(grid.get(CellPos::new(1, 0)).unwrap().text, "0");

        grid.remove_row(2).unwrap();
        assert_eq!(grid.len(), 4);
        assert!(grid.get(CellPos::new(2, 0)).is_none());
    }

    #[test]
    fn test_bounds_name_axis() {
        let grid = labeled(2, 2);
        assert!(matches!(
            grid.cell(CellPos::new(0, 5)),
            Err(TableError::IndexOutOfBounds {
                axis: Axis::Column,
                index: 5,
                len: 2
            })
        ));
    }
}
