//! Common test utilities and assertion helpers.
//!
//! Invariant checks shared by the integration tests: every committed table
//! must satisfy them, whatever sequence of edits produced it.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use permit_table::layout::compile;
use permit_table::merge::{resolve_spans, validate_merges};
use permit_table::{CellPos, LineKind, LineSegment, Table};

// Re-export fixtures for convenience
pub use super::fixtures::*;

/// Shorthand for a logical position.
pub fn pos(row: usize, column: usize) -> CellPos {
    CellPos::new(row, column)
}

/// Assert the structural invariants of a committed table.
pub fn assert_invariants(table: &Table) {
    let grid = table.grid();
    assert_eq!(
        grid.cells().len(),
        table.row_count() * table.column_count(),
        "cell count must equal rows * columns"
    );
    assert_eq!(table.row_heights().len(), table.row_count());
    assert_eq!(table.column_widths().len(), table.column_count());
    assert!(table.row_count() >= 1 && table.column_count() >= 1);
    validate_merges(grid).expect("merge flags should describe rectangles");

    let mut resolved = grid.clone();
    resolve_spans(&mut resolved);
    assert_eq!(&resolved, grid, "spans are stale");

    let recompiled = compile(
        grid,
        table.row_heights(),
        table.column_widths(),
        table.origin(),
        table.config().scale(),
    )
    .expect("committed table should compile");
    assert_eq!(&recompiled, table.primitives(), "cached primitives are stale");
}

/// Segments of `kind` on boundary `index`, in emission order.
pub fn lines_on(table: &Table, kind: LineKind, index: usize) -> Vec<LineSegment> {
    table
        .primitives()
        .lines
        .iter()
        .filter(|l| l.kind == kind && l.index == index)
        .cloned()
        .collect()
}

/// Cell texts row by row.
pub fn texts(table: &Table) -> Vec<Vec<String>> {
    table
        .grid()
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|c| c.text.clone()).collect())
        .collect()
}

/// Anchor positions of all text regions, sorted.
pub fn region_anchors(table: &Table) -> Vec<CellPos> {
    let mut anchors: Vec<CellPos> = table
        .primitives()
        .text_regions
        .iter()
        .map(|r| r.logical_position)
        .collect();
    anchors.sort();
    anchors
}
