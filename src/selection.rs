//! Normalize a UI selection into a rectangular block of cells.

use crate::error::{Result, TableError};
use crate::grid::CellGrid;
use crate::types::{Cell, CellPos, CellRange};

/// One cell of a materialized block, with its logical coordinate.
#[derive(Debug, Clone, Copy)]
pub struct BlockCell<'a> {
    pub cell: &'a Cell,
    pub pos: CellPos,
}

/// Bounding block of a selection, materialized row by row.
#[derive(Debug, Clone)]
pub struct CellBlock<'a> {
    pub range: CellRange,
    pub cells: Vec<Vec<BlockCell<'a>>>,
}

impl CellBlock<'_> {
    /// Top-left cell of the block.
    pub fn anchor(&self) -> Option<BlockCell<'_>> {
        self.cells.first().and_then(|row| row.first()).copied()
    }
}

/// Resolve selected coordinates into their bounding block.
///
/// Outside demerge mode a selected anchor with positive spans pulls the far
/// corner of its merge block into the bounds, so partially clicked merges are
/// covered whole. In demerge mode the raw coordinates are used.
///
/// # Errors
/// Returns `EmptySelection` for no input and `IndexOutOfBounds` for a
/// coordinate outside the grid.
pub fn resolve_selection<'a>(
    grid: &'a CellGrid,
    selected: &[CellPos],
    demerge_mode: bool,
) -> Result<CellBlock<'a>> {
    let range = selection_bounds(grid, selected, demerge_mode)?;
    let rows = grid.rows();
    let cells = (range.start_row..=range.end_row)
        .map(|row| {
            (range.start_col..=range.end_col)
                .filter_map(|column| {
                    let cell = rows.get(row).and_then(|r| r.get(column))?;
                    Some(BlockCell {
                        cell,
                        pos: CellPos::new(row, column),
                    })
                })
                .collect()
        })
        .collect();
    Ok(CellBlock { range, cells })
}

/// Bounds of the selection without materializing the cells.
///
/// # Errors
/// Same as [`resolve_selection`].
pub fn selection_bounds(
    grid: &CellGrid,
    selected: &[CellPos],
    demerge_mode: bool,
) -> Result<CellRange> {
    let (first, rest) = selected.split_first().ok_or(TableError::EmptySelection)?;
    grid.check_bounds(*first)?;
    let mut range = CellRange::cell(*first);

    for &pos in std::iter::once(first).chain(rest) {
        let cell = grid.cell(pos)?;
        let far = if demerge_mode {
            pos
        } else {
            CellPos::new(pos.row + cell.vertical_span, pos.column + cell.horizontal_span)
        };
        range = CellRange::new(
            range.start_row.min(pos.row),
            range.start_col.min(pos.column),
            range.end_row.max(far.row),
            range.end_col.max(far.column),
        );
    }
    Ok(range)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::merge::resolve_spans;

    fn grid_with_wide_merge() -> CellGrid {
        // (0,0)-(0,1) merged horizontally
        let mut grid = CellGrid::new(3, 3).unwrap();
        grid.get_mut(CellPos::new(0, 1)).unwrap().horizontal_merge_flag = true;
        resolve_spans(&mut grid);
        grid
    }

    #[test]
    fn test_empty_selection_rejected() {
        let grid = CellGrid::new(2, 2).unwrap();
        assert!(matches!(
            resolve_selection(&grid, &[], false),
            Err(TableError::EmptySelection)
        ));
    }

    #[test]
    fn test_bounds_over_scattered_cells() {
        let grid = CellGrid::new(4, 4).unwrap();
        let block =
            resolve_selection(&grid, &[CellPos::new(2, 1), CellPos::new(1, 3)], false).unwrap();
        assert_eq!(block.range, CellRange::new(1, 1, 2, 3));
        assert_eq!(block.cells.len(), 2);
        assert_eq!(block.cells[0].len(), 3);
        assert_eq!(block.cells[1][2].pos, CellPos::new(2, 3));
    }

    #[test]
    fn test_merged_anchor_expands() {
        let grid = grid_with_wide_merge();
        let block = resolve_selection(&grid, &[CellPos::new(0, 0)], false).unwrap();
        assert_eq!(block.range, CellRange::new(0, 0, 0, 1));
    }

    #[test]
    fn test_demerge_mode_uses_raw_coordinates() {
        let grid = grid_with_wide_merge();
        let block = resolve_selection(&grid, &[CellPos::new(0, 0)], true).unwrap();
        assert_eq!(block.range, CellRange::cell(CellPos::new(0, 0)));
        assert_eq!(block.anchor().unwrap().pos, CellPos::new(0, 0));
    }

    #[test]
    fn test_out_of_bounds_selection() {
        let grid = CellGrid::new(2, 2).unwrap();
        assert!(matches!(
            resolve_selection(&grid, &[CellPos::new(0, 0), CellPos::new(2, 0)], false),
            Err(TableError::IndexOutOfBounds { .. })
        ));
    }
}
