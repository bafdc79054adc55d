//! Tests for merging and splitting blocks of cells.
//!
//! A merge is stored as per-cell flags: every cell of the block except its
//! top-left anchor is flagged horizontally (not in the first column) and/or
//! vertically (not in the first row). Spans on the anchor are re-derived
//! after every edit.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;
mod fixtures;

use common::{assert_invariants, lines_on, pos, region_anchors, texts};
use fixtures::TableBuilder;
use permit_table::{CellRange, LineKind, TableError};
use pretty_assertions::assert_eq;

// ============================================================================
// MERGE
// ============================================================================

#[test]
fn test_merge_2x2_block_in_3x3() {
    let mut table = TableBuilder::new(3, 3).build();
    table.merge_cells(&[pos(0, 0), pos(1, 1)]).unwrap();

    let anchor = table.cell(pos(0, 0)).unwrap();
    assert_eq!(anchor.horizontal_span, 1);
    assert_eq!(anchor.vertical_span, 1);
    assert!(table.cell(pos(0, 1)).unwrap().horizontal_merge_flag);
    assert!(table.cell(pos(1, 0)).unwrap().vertical_merge_flag);
    let inner = table.cell(pos(1, 1)).unwrap();
    assert!(inner.horizontal_merge_flag && inner.vertical_merge_flag);
    assert_invariants(&table);
}

#[test]
fn test_merged_block_has_only_outer_lines() {
    let mut table = TableBuilder::new(3, 3).build();
    table.merge_cells(&[pos(0, 0), pos(1, 1)]).unwrap();

    // Horizontal lines crossing the block's columns (x in 0..60)
    let row_lines_in_block: Vec<usize> = table
        .primitives()
        .row_lines()
        .filter(|l| l.endpoint_a.x.min(l.endpoint_b.x) < 60.0 && l.endpoint_a.y <= 60.0)
        .map(|l| l.index)
        .collect();
    assert_eq!(row_lines_in_block, vec![0, 2]);

    // Vertical lines crossing the block's rows (y in 0..60)
    let col_lines_in_block: Vec<usize> = table
        .primitives()
        .column_lines()
        .filter(|l| l.endpoint_a.y.min(l.endpoint_b.y) < 60.0 && l.endpoint_a.x <= 60.0)
        .map(|l| l.index)
        .collect();
    assert_eq!(col_lines_in_block, vec![0, 2]);

    // The interior boundaries survive beside the block
    let interior_row = lines_on(&table, LineKind::Row, 1);
    assert_eq!(interior_row.len(), 1);
    assert_eq!(interior_row[0].endpoint_a.x, 60.0);
    assert_eq!(interior_row[0].endpoint_b.x, 90.0);
    let interior_col = lines_on(&table, LineKind::Column, 1);
    assert_eq!(interior_col.len(), 1);
    assert_eq!(interior_col[0].endpoint_a.y, 60.0);
    assert_eq!(interior_col[0].endpoint_b.y, 90.0);
}

#[test]
fn test_merged_region_covers_block() {
    let mut table = TableBuilder::new(3, 3).at(10.0, 20.0).build();
    table.merge_cells(&[pos(1, 1), pos(0, 0)]).unwrap();

    let region = table.primitives().region_at(pos(0, 0)).unwrap();
    assert_eq!(region.width, 60.0);
    assert_eq!(region.height, 60.0);
    assert_eq!(region.center.x, 40.0);
    assert_eq!(region.center.y, 50.0);
    assert_eq!(table.primitives().text_regions.len(), 6);
}

#[test]
fn test_merge_keeps_anchor_text_only() {
    let mut table = TableBuilder::new(2, 2)
        .text(0, 0, "Permit")
        .text(0, 1, "No.")
        .text(1, 0, "Issued")
        .build();
    table.merge_cells(&[pos(0, 0), pos(0, 1)]).unwrap();
    assert_eq!(
        texts(&table),
        vec![
            vec!["Permit".to_string(), String::new()],
            vec!["Issued".to_string(), String::new()],
        ]
    );
}

#[test]
fn test_merge_expands_to_cover_existing_block_extent() {
    let mut table = TableBuilder::new(3, 3).merge(0, 0, 1, 0).build();
    // Selecting the anchor reaches the bottom of its block
    table.merge_cells(&[pos(0, 0), pos(0, 1)]).unwrap();
    assert_eq!(table.merge_range(pos(0, 0)).unwrap(), CellRange::new(0, 0, 1, 1));
    assert_invariants(&table);
}

#[test]
fn test_merge_absorbs_inner_block() {
    let mut table = TableBuilder::new(3, 3).merge(1, 1, 1, 2).build();
    table.merge_cells(&[pos(0, 0), pos(2, 2)]).unwrap();
    assert_eq!(region_anchors(&table), vec![pos(0, 0)]);
    assert_eq!(table.primitives().lines.len(), 4);
    assert_invariants(&table);
}

#[test]
fn test_merge_cutting_through_block_is_rejected() {
    let mut table = TableBuilder::new(3, 3).merge(0, 1, 1, 2).build();
    let before = table.save();
    let err = table.merge_cells(&[pos(1, 0), pos(2, 1)]).unwrap_err();
    assert!(matches!(err, TableError::InvalidSelectionShape(_)));
    assert_eq!(table.save(), before);
}

#[test]
fn test_merge_empty_selection() {
    let mut table = TableBuilder::new(2, 2).build();
    assert!(matches!(table.merge_cells(&[]), Err(TableError::EmptySelection)));
}

#[test]
fn test_merge_out_of_bounds() {
    let mut table = TableBuilder::new(2, 2).build();
    assert!(matches!(
        table.merge_cells(&[pos(0, 0), pos(0, 5)]),
        Err(TableError::IndexOutOfBounds { index: 5, len: 2, .. })
    ));
}

// ============================================================================
// DEMERGE
// ============================================================================

#[test]
fn test_demerge_restores_single_cells() {
    let mut table = TableBuilder::new(3, 3).build();
    let original = table.primitives().clone();

    table.merge_cells(&[pos(0, 0), pos(1, 1)]).unwrap();
    assert_ne!(table.primitives(), &original);

    table.demerge_cells(&[pos(0, 0)]).unwrap();
    assert_eq!(table.primitives(), &original);
    assert_eq!(table.cell(pos(0, 0)).unwrap().horizontal_span, 0);
    assert_eq!(table.cell(pos(0, 0)).unwrap().vertical_span, 0);
    assert_invariants(&table);
}

#[test]
fn test_demerge_from_inner_cell_resolves_owner() {
    let mut table = TableBuilder::new(3, 3).merge(0, 0, 2, 1).build();
    table.demerge_cells(&[pos(2, 1)]).unwrap();
    assert_eq!(table.primitives().text_regions.len(), 9);
}

#[test]
fn test_demerge_does_not_restore_cleared_text() {
    let mut table = TableBuilder::new(1, 2).text(0, 0, "A").text(0, 1, "B").build();
    table.merge_cells(&[pos(0, 0), pos(0, 1)]).unwrap();
    table.demerge_cells(&[pos(0, 0)]).unwrap();
    assert_eq!(texts(&table), vec![vec!["A".to_string(), String::new()]]);
}

#[test]
fn test_demerge_unmerged_cell_is_noop() {
    let mut table = TableBuilder::new(2, 2).merge(0, 0, 0, 1).build();
    table.demerge_cells(&[pos(1, 1)]).unwrap();
    assert_eq!(table.merge_range(pos(0, 1)).unwrap(), CellRange::new(0, 0, 0, 1));
}
