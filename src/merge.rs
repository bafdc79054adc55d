//! Merge-span resolution and merge consistency checks.
//!
//! Spans are derived from the per-cell merge flags with two independent 1-D
//! passes. A merge block is the rectangle `anchor .. anchor + spans`, which is
//! only meaningful when every covered cell's flags agree with that single
//! anchor; [`validate_merges`] enforces that after every structural edit.

use crate::error::{Result, TableError};
use crate::grid::CellGrid;
use crate::types::{CellPos, CellRange};

/// A resolved merge block: an anchor owning at least one other cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeBlock {
    pub anchor: CellPos,
    pub range: CellRange,
}

/// Recompute `horizontal_span`/`vertical_span` for every cell.
///
/// Horizontal pass, per row: a cell without `horizontal_merge_flag` becomes the
/// current anchor and each following flagged cell adds one to its span, until
/// the row ends or a non-flagged cell starts a new anchor. The vertical pass is
/// identical down each column with `vertical_merge_flag`.
pub fn resolve_spans(grid: &mut CellGrid) {
    let rows = grid.row_count();
    let cols = grid.column_count();
    let cells = grid.cells_mut();

    for cell in cells.iter_mut() {
        cell.horizontal_span = 0;
        cell.vertical_span = 0;
    }

    for row in cells.chunks_mut(cols) {
        let mut anchor: Option<usize> = None;
        for j in 0..row.len() {
            let flagged = row.get(j).is_some_and(|c| c.horizontal_merge_flag);
            if !flagged {
                anchor = Some(j);
            } else if let Some(a) = anchor.and_then(|a| row.get_mut(a)) {
                a.horizontal_span += 1;
            }
        }
    }

    for j in 0..cols {
        let mut anchor: Option<usize> = None;
        for i in 0..rows {
            let idx = i * cols + j;
            let flagged = cells.get(idx).is_some_and(|c| c.vertical_merge_flag);
            if !flagged {
                anchor = Some(idx);
            } else if let Some(a) = anchor.and_then(|a| cells.get_mut(a)) {
                a.vertical_span += 1;
            }
        }
    }
}

/// Anchor of the merge block containing `pos`.
///
/// Walks left across horizontally merged cells, then up across vertically
/// merged cells. For an unmerged cell this is `pos` itself.
pub fn owner_of(grid: &CellGrid, pos: CellPos) -> CellPos {
    let mut owner = pos;
    while owner.column > 0
        && grid
            .get(owner)
            .is_some_and(|c| c.horizontal_merge_flag)
    {
        owner.column -= 1;
    }
    while owner.row > 0 && grid.get(owner).is_some_and(|c| c.vertical_merge_flag) {
        owner.row -= 1;
    }
    owner
}

/// Rectangle covered by the anchor at `pos`, from its resolved spans.
pub fn block_range(grid: &CellGrid, pos: CellPos) -> CellRange {
    let (h, v) = grid
        .get(pos)
        .map_or((0, 0), |c| (c.horizontal_span, c.vertical_span));
    CellRange::new(pos.row, pos.column, pos.row + v, pos.column + h)
}

/// All multi-cell merge blocks, in row-major anchor order.
pub fn merge_blocks(grid: &CellGrid) -> Vec<MergeBlock> {
    grid.cells()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_anchor() && c.has_span())
        .map(|(i, _)| {
            let anchor = grid.pos_of(i);
            MergeBlock {
                anchor,
                range: block_range(grid, anchor),
            }
        })
        .collect()
}

/// Verify every flagged cell belongs to exactly one rectangular block.
///
/// Expects spans to be resolved. Inside an anchor's rectangle, cells in the
/// anchor's row carry only the horizontal flag, cells in the anchor's column
/// only the vertical flag, and interior cells both.
///
/// # Errors
/// Returns `InvalidSelectionShape` describing the first inconsistent cell.
pub fn validate_merges(grid: &CellGrid) -> Result<()> {
    let mut owned = vec![false; grid.len()];

    for (i, cell) in grid.cells().iter().enumerate() {
        if !cell.is_anchor() {
            continue;
        }
        let anchor = grid.pos_of(i);
        let range = block_range(grid, anchor);
        if range.end_row >= grid.row_count() || range.end_col >= grid.column_count() {
            return Err(TableError::InvalidSelectionShape(format!(
                "merge anchored at ({}, {}) extends past the table",
                anchor.row, anchor.column
            )));
        }
        for pos in range.positions() {
            let Some(idx) = grid.index_of(pos) else {
                continue;
            };
            if owned.get(idx).copied().unwrap_or(false) {
                return Err(TableError::InvalidSelectionShape(format!(
                    "cell ({}, {}) belongs to more than one merge",
                    pos.row, pos.column
                )));
            }
            let expect_h = pos.column > anchor.column;
            let expect_v = pos.row > anchor.row;
            let consistent = grid.get(pos).is_some_and(|c| {
                c.horizontal_merge_flag == expect_h && c.vertical_merge_flag == expect_v
            });
            if !consistent {
                return Err(TableError::InvalidSelectionShape(format!(
                    "cell ({}, {}) is not consistent with the merge anchored at ({}, {})",
                    pos.row, pos.column, anchor.row, anchor.column
                )));
            }
            if let Some(slot) = owned.get_mut(idx) {
                *slot = true;
            }
        }
    }

    if let Some(i) = owned.iter().position(|o| !o) {
        let pos = grid.pos_of(i);
        return Err(TableError::InvalidSelectionShape(format!(
            "cell ({}, {}) is merged into no anchor",
            pos.row, pos.column
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn flag(grid: &mut CellGrid, row: usize, col: usize, h: bool, v: bool) {
        let cell = grid.get_mut(CellPos::new(row, col)).unwrap();
        cell.horizontal_merge_flag = h;
        cell.vertical_merge_flag = v;
    }

    fn merged_2x2() -> CellGrid {
        let mut grid = CellGrid::new(3, 3).unwrap();
        flag(&mut grid, 0, 1, true, false);
        flag(&mut grid, 1, 0, false, true);
        flag(&mut grid, 1, 1, true, true);
        resolve_spans(&mut grid);
        grid
    }

    #[test]
    fn test_spans_for_2x2_block() {
        let grid = merged_2x2();
        let anchor = grid.get(CellPos::new(0, 0)).unwrap();
        assert_eq!(anchor.horizontal_span, 1);
        assert_eq!(anchor.vertical_span, 1);
        assert_eq!(grid.get(CellPos::new(0, 2)).unwrap().horizontal_span, 0);
        validate_merges(&grid).unwrap();
    }

    #[test]
    fn test_spans_reset_before_resolving() {
        let mut grid = merged_2x2();
        for cell in grid.cells_mut() {
            cell.clear_merge_flags();
        }
        resolve_spans(&mut grid);
        assert!(grid.cells().iter().all(|c| !c.has_span()));
    }

    #[test]
    fn test_span_stops_at_non_flagged_cell() {
        let mut grid = CellGrid::new(1, 5).unwrap();
        flag(&mut grid, 0, 1, true, false);
        flag(&mut grid, 0, 3, true, false);
        flag(&mut grid, 0, 4, true, false);
        resolve_spans(&mut grid);
        assert_eq!(grid.get(CellPos::new(0, 0)).unwrap().horizontal_span, 1);
        assert_eq!(grid.get(CellPos::new(0, 2)).unwrap().horizontal_span, 2);
    }

    #[test]
    fn test_owner_of_interior_cell() {
        let grid = merged_2x2();
        assert_eq!(owner_of(&grid, CellPos::new(1, 1)), CellPos::new(0, 0));
        assert_eq!(owner_of(&grid, CellPos::new(1, 0)), CellPos::new(0, 0));
        assert_eq!(owner_of(&grid, CellPos::new(2, 2)), CellPos::new(2, 2));
    }

    #[test]
    fn test_merge_blocks_lists_anchor() {
        let grid = merged_2x2();
        let blocks = merge_blocks(&grid);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].range, CellRange::new(0, 0, 1, 1));
    }

    #[test]
    fn test_l_shaped_flags_rejected() {
        let mut grid = CellGrid::new(2, 2).unwrap();
        flag(&mut grid, 0, 1, true, false);
        flag(&mut grid, 1, 0, false, true);
        resolve_spans(&mut grid);
        assert!(matches!(
            validate_merges(&grid),
            Err(TableError::InvalidSelectionShape(_))
        ));
    }

    #[test]
    fn test_orphan_flag_rejected() {
        let mut grid = CellGrid::new(2, 2).unwrap();
        flag(&mut grid, 0, 0, true, false);
        resolve_spans(&mut grid);
        assert!(validate_merges(&grid).is_err());
    }
}
