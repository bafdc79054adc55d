//! Tests for the edit session: presses, focus changes and the Idle/Editing gate
//! on structural edits.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;
mod fixtures;

use common::{assert_invariants, pos};
use fixtures::{five_px, TableBuilder};
use permit_table::{EditState, TableError, TextStyle};
use pretty_assertions::assert_eq;

#[test]
fn test_new_table_is_idle() {
    let table = TableBuilder::new(2, 2).build();
    assert_eq!(table.state(), EditState::Idle);
    assert!(!table.is_editing());
    assert!(table.selection().is_empty());
}

#[test]
fn test_press_begins_edit_with_cursor_at_end() {
    let mut table = TableBuilder::new(2, 2).text(1, 0, "Valid").build();
    table.press_region(pos(1, 0), false).unwrap();
    assert_eq!(
        table.state(),
        EditState::Editing {
            pos: pos(1, 0),
            cursor: 5
        }
    );
    assert_eq!(table.selection(), &[pos(1, 0)]);
}

#[test]
fn test_commit_returns_to_idle() {
    let mut table = TableBuilder::new(1, 1).build();
    table.begin_edit(pos(0, 0)).unwrap();
    table.update_text("Hi", &five_px).unwrap();
    table.commit_edit();
    assert_eq!(table.state(), EditState::Idle);
    assert_eq!(table.cell(pos(0, 0)).unwrap().text, "Hi");
    assert_invariants(&table);

    // Committing again is harmless
    table.commit_edit();
    assert_eq!(table.state(), EditState::Idle);
}

#[test]
fn test_switching_cells_commits_previous_edit() {
    let mut table = TableBuilder::new(1, 2).build();
    table.begin_edit(pos(0, 0)).unwrap();
    table.update_text("first", &five_px).unwrap();
    table.begin_edit(pos(0, 1)).unwrap();

    assert_eq!(
        table.state(),
        EditState::Editing {
            pos: pos(0, 1),
            cursor: 0
        }
    );
    assert_eq!(table.cell(pos(0, 0)).unwrap().text, "first");
}

#[test]
fn test_update_text_when_idle_fails() {
    let mut table = TableBuilder::new(1, 1).build();
    assert!(matches!(
        table.update_text("nope", &five_px),
        Err(TableError::NoActiveEdit)
    ));
    assert_eq!(table.cell(pos(0, 0)).unwrap().text, "");
}

#[test]
fn test_structural_edits_rejected_while_editing() {
    let mut table = TableBuilder::new(2, 2).build();
    table.begin_edit(pos(0, 0)).unwrap();
    let before = table.save();

    assert!(matches!(table.merge_cells(&[pos(0, 0), pos(1, 1)]), Err(TableError::EditInProgress)));
    assert!(matches!(table.demerge_cells(&[pos(0, 0)]), Err(TableError::EditInProgress)));
    assert!(matches!(table.insert_row(0, true), Err(TableError::EditInProgress)));
    assert!(matches!(table.delete_row(0), Err(TableError::EditInProgress)));
    assert!(matches!(table.insert_column(0, true), Err(TableError::EditInProgress)));
    assert!(matches!(table.delete_column(0), Err(TableError::EditInProgress)));
    assert!(matches!(table.resize_row_boundary(1, 5.0), Err(TableError::EditInProgress)));
    assert!(matches!(table.resize_column_boundary(1, 5.0), Err(TableError::EditInProgress)));
    assert!(matches!(
        table.set_cell_style(pos(0, 0), TextStyle::default().bold()),
        Err(TableError::EditInProgress)
    ));
    assert!(matches!(
        table.set_origin(permit_table::Point::new(1.0, 1.0)),
        Err(TableError::EditInProgress)
    ));

    assert_eq!(table.save(), before);
    assert!(table.is_editing());
}

#[test]
fn test_shift_presses_build_selection_for_merge() {
    let mut table = TableBuilder::new(3, 3).build();
    table.press_region(pos(0, 0), true).unwrap();
    table.press_region(pos(1, 2), true).unwrap();
    table.press_region(pos(1, 2), true).unwrap();
    assert_eq!(table.selection(), &[pos(0, 0), pos(1, 2)]);
    assert!(!table.is_editing());

    let selected = table.selection().to_vec();
    table.merge_cells(&selected).unwrap();
    assert_eq!(table.cell(pos(0, 0)).unwrap().horizontal_span, 2);
    assert_eq!(table.cell(pos(0, 0)).unwrap().vertical_span, 1);
    assert_invariants(&table);
}

#[test]
fn test_shift_press_on_merged_cell_selects_anchor() {
    let mut table = TableBuilder::new(2, 2).merge(0, 0, 1, 0).build();
    table.press_region(pos(1, 0), true).unwrap();
    assert_eq!(table.selection(), &[pos(0, 0)]);
}

#[test]
fn test_plain_press_replaces_selection() {
    let mut table = TableBuilder::new(2, 2).build();
    table.press_region(pos(0, 0), true).unwrap();
    table.press_region(pos(0, 1), true).unwrap();
    table.press_region(pos(1, 1), false).unwrap();
    assert_eq!(table.selection(), &[pos(1, 1)]);
    table.commit_edit();
    table.clear_selection();
    assert!(table.selection().is_empty());
}

#[test]
fn test_selection_pruned_after_delete() {
    let mut table = TableBuilder::new(3, 1).build();
    table.press_region(pos(0, 0), true).unwrap();
    table.press_region(pos(2, 0), true).unwrap();
    table.delete_row(1).unwrap();
    assert_eq!(table.selection(), &[pos(0, 0)]);
}

#[test]
fn test_press_out_of_bounds() {
    let mut table = TableBuilder::new(1, 1).build();
    assert!(matches!(
        table.press_region(pos(3, 0), false),
        Err(TableError::IndexOutOfBounds { .. })
    ));
    assert!(!table.is_editing());
}
