//! Structural mutations.
//!
//! Each function edits a scratch copy of the grid and size arrays owned by the
//! caller; [`super::Table`] re-resolves spans, validates and recompiles before
//! swapping the scratch in, so a failure here never reaches the live table.

use crate::error::{Result, TableError};
use crate::grid::CellGrid;
use crate::merge::{block_range, merge_blocks, owner_of};
use crate::types::{Axis, Cell, CellPos, CellRange};

/// Row-height change (logical units) below which a boundary drag is ignored.
pub(crate) const MIN_ROW_DRAG_CHANGE: f64 = -0.2;

/// Merge `range` into one block anchored at its top-left cell.
///
/// Existing merges fully inside the range are absorbed. Cells other than the
/// anchor lose their text.
pub(crate) fn merge_cells(grid: &mut CellGrid, range: CellRange) -> Result<()> {
    grid.check_bounds(range.anchor())?;
    grid.check_bounds(CellPos::new(range.end_row, range.end_col))?;

    for block in merge_blocks(grid) {
        if block.range.intersects(&range) && !range.contains_range(&block.range) {
            return Err(TableError::InvalidSelectionShape(format!(
                "selection cuts through the merge anchored at ({}, {})",
                block.anchor.row, block.anchor.column
            )));
        }
    }

    let anchor = range.anchor();
    for pos in range.positions() {
        let cell = grid.cell_mut(pos)?;
        if pos == anchor {
            cell.clear_merge_flags();
            continue;
        }
        cell.horizontal_merge_flag = pos.column != range.start_col;
        cell.vertical_merge_flag = pos.row != range.start_row;
        cell.text.clear();
    }
    Ok(())
}

/// Split the merge owning the top-left cell of `range` back into single cells.
///
/// Text previously cleared by the merge is not restored.
pub(crate) fn demerge_cells(grid: &mut CellGrid, range: CellRange) -> Result<()> {
    grid.check_bounds(range.anchor())?;
    let anchor = owner_of(grid, range.anchor());
    let block = block_range(grid, anchor);
    for pos in block.positions() {
        grid.cell_mut(pos)?.clear_merge_flags();
    }
    Ok(())
}

/// Insert a blank row next to `reference_row`.
///
/// New cells copy their merge flags from the row that ends up directly below
/// the inserted one, so a vertical merge spanning the insertion point stays
/// merged. Returns the index of the new row.
pub(crate) fn insert_row(
    grid: &mut CellGrid,
    row_heights: &mut Vec<f64>,
    reference_row: usize,
    above: bool,
    height: f64,
) -> Result<usize> {
    if reference_row >= grid.row_count() {
        return Err(TableError::row_out_of_bounds(
            reference_row,
            grid.row_count(),
        ));
    }
    let at = if above {
        reference_row
    } else {
        reference_row + 1
    };
    let new_cells = (0..grid.column_count())
        .map(|col| Cell::inheriting_flags(grid.get(CellPos::new(at, col))))
        .collect();
    grid.insert_row(at, new_cells)?;
    row_heights.insert(at, height);
    Ok(at)
}

/// Delete `row`, handing merge ownership to the next row where needed.
///
/// When a deleted cell is the top of a vertical merge, the cell below it
/// becomes the new top: its vertical flag is cleared and, for the merge's
/// anchor column, it takes over the text and style.
pub(crate) fn delete_row(
    grid: &mut CellGrid,
    row_heights: &mut Vec<f64>,
    row: usize,
) -> Result<()> {
    if grid.row_count() <= 1 {
        return Err(TableError::MinimumDimensionViolation(Axis::Row));
    }
    if row >= grid.row_count() {
        return Err(TableError::row_out_of_bounds(row, grid.row_count()));
    }

    for col in 0..grid.column_count() {
        let removed = grid.cell(CellPos::new(row, col))?.clone();
        let Some(next) = grid.get_mut(CellPos::new(row + 1, col)) else {
            continue;
        };
        if removed.vertical_merge_flag || !next.vertical_merge_flag {
            continue;
        }
        next.vertical_merge_flag = false;
        if !next.horizontal_merge_flag {
            next.text = removed.text;
            next.style = removed.style;
        }
    }

    grid.remove_row(row)?;
    row_heights.remove(row);
    Ok(())
}

/// Insert a blank column next to `reference_col`, copying merge flags from
/// the column that ends up directly right of the new one.
pub(crate) fn insert_column(
    grid: &mut CellGrid,
    column_widths: &mut Vec<f64>,
    reference_col: usize,
    left: bool,
    width: f64,
) -> Result<usize> {
    if reference_col >= grid.column_count() {
        return Err(TableError::column_out_of_bounds(
            reference_col,
            grid.column_count(),
        ));
    }
    let at = if left {
        reference_col
    } else {
        reference_col + 1
    };
    let new_cells = (0..grid.row_count())
        .map(|row| Cell::inheriting_flags(grid.get(CellPos::new(row, at))))
        .collect();
    grid.insert_column(at, new_cells)?;
    column_widths.insert(at, width);
    Ok(at)
}

/// Delete `col`, handing merge ownership to the next column where needed.
pub(crate) fn delete_column(
    grid: &mut CellGrid,
    column_widths: &mut Vec<f64>,
    col: usize,
) -> Result<()> {
    if grid.column_count() <= 1 {
        return Err(TableError::MinimumDimensionViolation(Axis::Column));
    }
    if col >= grid.column_count() {
        return Err(TableError::column_out_of_bounds(col, grid.column_count()));
    }

    for row in 0..grid.row_count() {
        let removed = grid.cell(CellPos::new(row, col))?.clone();
        let Some(next) = grid.get_mut(CellPos::new(row, col + 1)) else {
            continue;
        };
        if removed.horizontal_merge_flag || !next.horizontal_merge_flag {
            continue;
        }
        next.horizontal_merge_flag = false;
        if !next.vertical_merge_flag {
            next.text = removed.text;
            next.style = removed.style;
        }
    }

    grid.remove_column(col)?;
    column_widths.remove(col);
    Ok(())
}

/// Move row boundary `boundary` by `change` logical units.
///
/// The top edge resizes row 0 against the drag; any other boundary resizes
/// the row above it. Changes below [`MIN_ROW_DRAG_CHANGE`] are discarded.
pub(crate) fn resize_row_boundary(
    row_heights: &mut [f64],
    boundary: usize,
    change: f64,
    min_height: f64,
) -> Result<()> {
    let len = row_heights.len();
    if boundary > len {
        return Err(TableError::row_out_of_bounds(boundary, len + 1));
    }
    let change = if change < MIN_ROW_DRAG_CHANGE {
        0.0
    } else {
        change
    };
    let (index, delta) = if boundary == 0 {
        (0, -change)
    } else {
        (boundary - 1, change)
    };
    if let Some(h) = row_heights.get_mut(index) {
        *h = (*h + delta).max(min_height);
    }
    Ok(())
}

/// Move column boundary `boundary` by `change` logical units.
///
/// Outer edges resize the adjacent column; an interior boundary trades width
/// between its two neighbors.
pub(crate) fn resize_column_boundary(
    column_widths: &mut [f64],
    boundary: usize,
    change: f64,
    min_width: f64,
) -> Result<()> {
    let len = column_widths.len();
    if boundary > len {
        return Err(TableError::column_out_of_bounds(boundary, len + 1));
    }
    if boundary < len {
        if let Some(w) = column_widths.get_mut(boundary) {
            *w = (*w - change).max(min_width);
        }
    }
    if boundary > 0 {
        if let Some(w) = column_widths.get_mut(boundary - 1) {
            *w = (*w + change).max(min_width);
        }
    }
    Ok(())
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
    use crate::merge::{resolve_spans, validate_merges};

    fn grid(rows: usize, cols: usize) -> CellGrid {
        let cells = (0..rows * cols).map(|i| Cell::new(i.to_string())).collect();
        CellGrid::from_cells(rows, cols, cells).unwrap()
    }

    fn merged(rows: usize, cols: usize, range: CellRange) -> CellGrid {
        let mut g = grid(rows, cols);
        merge_cells(&mut g, range).unwrap();
        resolve_spans(&mut g);
        g
    }

    #[test]
    fn test_merge_sets_flags_and_clears_text() {
        let g = merged(3, 3, CellRange::new(0, 0, 1, 1));
        let at = |r, c| g.get(CellPos::new(r, c)).unwrap();
        assert!(at(0, 0).is_anchor());
        assert_eq!(at(0, 0).text, "0");
        assert!(at(0, 1).horizontal_merge_flag && !at(0, 1).vertical_merge_flag);
        assert!(!at(1, 0).horizontal_merge_flag && at(1, 0).vertical_merge_flag);
        assert!(at(1, 1).horizontal_merge_flag && at(1, 1).vertical_merge_flag);
        assert!(at(1, 1).text.is_empty());
        validate_merges(&g).unwrap();
    }

    #[test]
    fn test_merge_absorbs_nested_block() {
        let mut g = merged(3, 3, CellRange::new(0, 0, 0, 1));
        merge_cells(&mut g, CellRange::new(0, 0, 1, 2)).unwrap();
        resolve_spans(&mut g);
        validate_merges(&g).unwrap();
        assert_eq!(g.get(CellPos::new(0, 0)).unwrap().horizontal_span, 2);
    }

    #[test]
    fn test_merge_rejects_partial_overlap() {
        let mut g = merged(3, 3, CellRange::new(0, 0, 1, 1));
        let before = g.clone();
        let err = merge_cells(&mut g, CellRange::new(1, 1, 2, 2)).unwrap_err();
        assert!(matches!(err, TableError::InvalidSelectionShape(_)));
        assert_eq!(g, before);
    }

    #[test]
    fn test_demerge_from_interior_cell() {
        let mut g = merged(3, 3, CellRange::new(0, 0, 1, 1));
        demerge_cells(&mut g, CellRange::cell(CellPos::new(1, 1))).unwrap();
        resolve_spans(&mut g);
        assert!(g.cells().iter().all(|c| c.is_anchor() && !c.has_span()));
    }

    #[test]
    fn test_insert_row_inherits_vertical_merge() {
        let mut g = merged(3, 2, CellRange::new(0, 0, 1, 0));
        let mut heights = vec![0.3; 3];
        let at = insert_row(&mut g, &mut heights, 0, false, 0.3).unwrap();
        resolve_spans(&mut g);
        assert_eq!(at, 1);
        assert!(g.get(CellPos::new(1, 0)).unwrap().vertical_merge_flag);
        assert_eq!(g.get(CellPos::new(0, 0)).unwrap().vertical_span, 2);
        assert_eq!(heights.len(), 4);
        validate_merges(&g).unwrap();
    }

    #[test]
    fn test_insert_row_at_bottom_is_blank() {
        let mut g = merged(2, 2, CellRange::new(0, 0, 1, 0));
        let mut heights = vec![0.3; 2];
        let at = insert_row(&mut g, &mut heights, 1, false, 0.3).unwrap();
        assert_eq!(at, 2);
        assert!(g.get(CellPos::new(2, 0)).unwrap().is_anchor());
    }

    #[test]
    fn test_delete_top_of_vertical_merge_transfers_ownership() {
        let mut g = merged(3, 2, CellRange::new(0, 0, 2, 1));
        let mut heights = vec![0.3; 3];
        delete_row(&mut g, &mut heights, 0).unwrap();
        resolve_spans(&mut g);
        validate_merges(&g).unwrap();
        let anchor = g.get(CellPos::new(0, 0)).unwrap();
        assert_eq!(anchor.text, "0");
        assert_eq!(anchor.vertical_span, 1);
        assert_eq!(anchor.horizontal_span, 1);
        assert_eq!(heights.len(), 2);
    }

    #[test]
    fn test_delete_last_row_rejected() {
        let mut g = grid(1, 3);
        let mut heights = vec![0.3];
        assert!(matches!(
            delete_row(&mut g, &mut heights, 0),
            Err(TableError::MinimumDimensionViolation(Axis::Row))
        ));
    }

    #[test]
    fn test_delete_left_of_horizontal_merge_transfers_ownership() {
        let mut g = merged(2, 3, CellRange::new(0, 0, 0, 2));
        let mut widths = vec![0.3; 3];
        delete_column(&mut g, &mut widths, 0).unwrap();
        resolve_spans(&mut g);
        validate_merges(&g).unwrap();
        let anchor = g.get(CellPos::new(0, 0)).unwrap();
        assert_eq!(anchor.text, "0");
        assert_eq!(anchor.horizontal_span, 1);
        assert_eq!(widths.len(), 2);
    }

    #[test]
    fn test_insert_column_left_of_first() {
        let mut g = grid(2, 2);
        let mut widths = vec![0.3, 0.4];
        let at = insert_column(&mut g, &mut widths, 0, true, 0.3).unwrap();
        assert_eq!(at, 0);
        assert_eq!(widths, vec![0.3, 0.3, 0.4]);
        assert_eq!(g.get(CellPos::new(1, 1)).unwrap().text, "2");
    }

    #[test]
    fn test_resize_row_boundaries() {
        let mut heights = vec![0.5, 0.5];
        resize_row_boundary(&mut heights, 1, 0.25, 0.05).unwrap();
        assert_eq!(heights, vec![0.75, 0.5]);
        resize_row_boundary(&mut heights, 0, 0.25, 0.05).unwrap();
        assert_eq!(heights, vec![0.5, 0.5]);
        // large shrink discarded
        resize_row_boundary(&mut heights, 2, -0.3, 0.05).unwrap();
        assert_eq!(heights, vec![0.5, 0.5]);
        assert!(resize_row_boundary(&mut heights, 3, 0.1, 0.05).is_err());
    }

    #[test]
    fn test_resize_column_boundaries() {
        let mut widths = vec![0.5, 0.5];
        resize_column_boundary(&mut widths, 1, 0.25, 0.05).unwrap();
        assert_eq!(widths, vec![0.75, 0.25]);
        resize_column_boundary(&mut widths, 2, 0.25, 0.05).unwrap();
        assert_eq!(widths, vec![0.75, 0.5]);
        resize_column_boundary(&mut widths, 0, 1.0, 0.05).unwrap();
        assert_eq!(widths, vec![0.05, 0.5]);
    }
}
