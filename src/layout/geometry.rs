//! Compile a grid plus pixel dimensions into renderable primitives.
//!
//! Pure function of its inputs: compiling an unchanged table twice yields
//! identical primitive sets.

use std::collections::HashMap;

use super::TableLayout;
use crate::config::Scale;
use crate::error::{Result, TableError};
use crate::grid::CellGrid;
use crate::types::{CellPos, CellRange, LineKind, LineSegment, Point, Primitives, TextRegion};

/// Build grid-line segments and text regions for `grid`.
///
/// # Errors
/// Returns `StructuralIntegrity` when the size arrays disagree with the grid's
/// dimensions or the grid violates the cell-count invariant.
pub fn compile(
    grid: &CellGrid,
    row_heights: &[f64],
    column_widths: &[f64],
    origin: Point,
    scale: Scale,
) -> Result<Primitives> {
    grid.validate()?;
    if row_heights.len() != grid.row_count() {
        return Err(TableError::StructuralIntegrity {
            expected: grid.row_count(),
            actual: row_heights.len(),
        });
    }
    if column_widths.len() != grid.column_count() {
        return Err(TableError::StructuralIntegrity {
            expected: grid.column_count(),
            actual: column_widths.len(),
        });
    }

    let layout = TableLayout::new(row_heights, column_widths, origin, scale)?;
    let mut lines = row_lines(grid, &layout);
    lines.extend(column_lines(grid, &layout));
    let text_regions = text_regions(grid, &layout);

    tracing::trace!(
        lines = lines.len(),
        regions = text_regions.len(),
        "compiled table geometry"
    );

    Ok(Primitives {
        lines,
        text_regions,
    })
}

/// Horizontal segments on every row boundary.
///
/// At an interior boundary the line is suppressed under each cell that is
/// vertically merged across it; the outer edges are always drawn in full.
fn row_lines(grid: &CellGrid, layout: &TableLayout) -> Vec<LineSegment> {
    let rows = grid.row_count();
    let cols = grid.column_count();
    let mut lines = Vec::new();

    for boundary in 0..=rows {
        let interior = boundary > 0 && boundary < rows;
        let runs = visible_runs(cols, |j| {
            interior
                && grid
                    .get(CellPos::new(boundary, j))
                    .is_some_and(|c| c.vertical_merge_flag)
        });
        let y = layout.row_y(boundary);
        lines.extend(runs.into_iter().map(|(start, end)| LineSegment {
            endpoint_a: Point::new(layout.col_x(start), y),
            endpoint_b: Point::new(layout.col_x(end), y),
            kind: LineKind::Row,
            index: boundary,
        }));
    }
    lines
}

/// Vertical segments on every column boundary, suppressed where the cell to
/// the right is horizontally merged across it.
fn column_lines(grid: &CellGrid, layout: &TableLayout) -> Vec<LineSegment> {
    let rows = grid.row_count();
    let cols = grid.column_count();
    let mut lines = Vec::new();

    for boundary in 0..=cols {
        let interior = boundary > 0 && boundary < cols;
        let runs = visible_runs(rows, |i| {
            interior
                && grid
                    .get(CellPos::new(i, boundary))
                    .is_some_and(|c| c.horizontal_merge_flag)
        });
        let x = layout.col_x(boundary);
        lines.extend(runs.into_iter().map(|(start, end)| LineSegment {
            endpoint_a: Point::new(x, layout.row_y(start)),
            endpoint_b: Point::new(x, layout.row_y(end)),
            kind: LineKind::Column,
            index: boundary,
        }));
    }
    lines
}

/// Coalesce the non-suppressed cells `0..count` into half-open index runs.
fn visible_runs(count: usize, suppressed: impl Fn(usize) -> bool) -> Vec<(usize, usize)> {
    let mut runs: Vec<(usize, usize)> = Vec::new();
    for k in (0..count).filter(|&k| !suppressed(k)) {
        match runs.last_mut() {
            Some(last) if last.1 == k => last.1 = k + 1,
            _ => runs.push((k, k + 1)),
        }
    }
    runs
}

/// One text region per anchor.
///
/// Row-wise first: a horizontally merged cell widens the region to its left.
/// Then each region whose cell is vertically merged is folded into the
/// surviving region above it in the same column.
fn text_regions(grid: &CellGrid, layout: &TableLayout) -> Vec<TextRegion> {
    let mut row_wise: Vec<CellRange> = Vec::new();
    for (i, row) in grid.rows().into_iter().enumerate() {
        let mut current: Option<usize> = None;
        for (j, cell) in row.iter().enumerate() {
            if cell.horizontal_merge_flag {
                if let Some(region) = current.and_then(|k| row_wise.get_mut(k)) {
                    region.end_col = j;
                    continue;
                }
            }
            current = Some(row_wise.len());
            row_wise.push(CellRange::cell(CellPos::new(i, j)));
        }
    }

    let mut merged: Vec<CellRange> = Vec::with_capacity(row_wise.len());
    let mut open_by_column: HashMap<usize, usize> = HashMap::new();
    for region in row_wise {
        let flagged = grid
            .get(region.anchor())
            .is_some_and(|c| c.vertical_merge_flag);
        if flagged {
            let above = open_by_column
                .get(&region.start_col)
                .and_then(|&k| merged.get_mut(k));
            if let Some(above) = above {
                above.end_row = region.end_row;
                continue;
            }
        }
        open_by_column.insert(region.start_col, merged.len());
        merged.push(region);
    }

    merged
        .iter()
        .filter_map(|range| {
            let cell = grid.get(range.anchor())?;
            let rect = layout.range_rect(range);
            Some(TextRegion {
                content: cell.text.clone(),
                center: rect.center(),
                width: rect.width,
                height: rect.height,
                style: cell.style,
                logical_position: range.anchor(),
            })
        })
        .collect()
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
    use crate::merge::resolve_spans;

    fn compile_default(grid: &CellGrid) -> Primitives {
        let rows = vec![0.3; grid.row_count()];
        let cols = vec![0.3; grid.column_count()];
        compile(grid, &rows, &cols, Point::default(), Scale::default()).unwrap()
    }

    #[test]
    fn test_visible_runs_coalesce() {
        assert_eq!(visible_runs(4, |_| false), vec![(0, 4)]);
        assert_eq!(visible_runs(4, |k| k == 1), vec![(0, 1), (2, 4)]);
        assert!(visible_runs(2, |_| true).is_empty());
    }

    #[test]
    fn test_plain_grid_line_counts() {
        let grid = CellGrid::new(2, 3).unwrap();
        let prims = compile_default(&grid);
        assert_eq!(prims.row_lines().count(), 3);
        assert_eq!(prims.column_lines().count(), 4);
        assert_eq!(prims.text_regions.len(), 6);
        assert!(prims.row_lines().all(|l| l.length() == 90.0));
    }

    #[test]
    fn test_horizontal_merge_widens_region() {
        let mut grid = CellGrid::new(1, 3).unwrap();
        grid.get_mut(CellPos::new(0, 1)).unwrap().horizontal_merge_flag = true;
        resolve_spans(&mut grid);
        let prims = compile_default(&grid);

        assert_eq!(prims.text_regions.len(), 2);
        let region = prims.region_at(CellPos::new(0, 0)).unwrap();
        assert_eq!(region.width, 60.0);
        assert_eq!(region.center, Point::new(30.0, 15.0));

        // boundary 1 fully suppressed, others whole
        assert!(prims.column_lines().all(|l| l.index != 1));
    }

    #[test]
    fn test_vertical_merge_folds_region() {
        let mut grid = CellGrid::new(3, 1).unwrap();
        grid.get_mut(CellPos::new(1, 0)).unwrap().vertical_merge_flag = true;
        resolve_spans(&mut grid);
        let prims = compile_default(&grid);

        assert_eq!(prims.text_regions.len(), 2);
        let region = prims.region_at(CellPos::new(0, 0)).unwrap();
        assert_eq!(region.height, 60.0);
        assert!(prims.region_at(CellPos::new(2, 0)).is_some());
        assert!(prims.row_lines().all(|l| l.index != 1));
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let grid = CellGrid::new(2, 2).unwrap();
        let err = compile(&grid, &[0.3], &[0.3, 0.3], Point::default(), Scale::default())
            .unwrap_err();
        assert!(matches!(
            err,
            TableError::StructuralIntegrity {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_compile_is_idempotent() {
        let mut grid = CellGrid::new(3, 3).unwrap();
        grid.get_mut(CellPos::new(0, 1)).unwrap().horizontal_merge_flag = true;
        resolve_spans(&mut grid);
        assert_eq!(compile_default(&grid), compile_default(&grid));
    }
}
