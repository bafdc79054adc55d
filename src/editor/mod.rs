//! Table session: owns the grid and drives every edit through it.
//!
//! `Table` wraps the grid model, adding:
//! - An Idle/Editing state machine for in-cell text editing
//! - Validate-then-commit structural edits (merge, demerge, insert/delete)
//! - Cached primitives, recompiled atomically with every committed edit

pub(crate) mod mutation;

use serde::{Deserialize, Serialize};

use crate::config::{check_sizes, LayoutConfig};
use crate::error::{Result, TableError};
use crate::grid::CellGrid;
use crate::layout::{compile, TableLayout};
use crate::merge::{block_range, owner_of, resolve_spans, validate_merges};
use crate::reflow::{plan_reflow, CharWidthOracle, ReflowOutcome};
use crate::selection::selection_bounds;
use crate::types::{Cell, CellPos, CellRange, Point, Primitives, TextStyle};

/// Edit state of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum EditState {
    /// The whole table is selectable as one unit.
    #[default]
    Idle,
    /// One text region has focus; `cursor` is a char offset into its text.
    Editing { pos: CellPos, cursor: usize },
}

/// A permit table: grid, sizes, placement and the primitives compiled from them.
#[derive(Debug, Clone)]
pub struct Table {
    origin: Point,
    grid: CellGrid,
    row_heights: Vec<f64>,
    column_widths: Vec<f64>,
    config: LayoutConfig,
    state: EditState,
    selection: Vec<CellPos>,
    primitives: Primitives,
}

/// Scratch copy a structural edit works on before it is committed.
struct Draft {
    grid: CellGrid,
    row_heights: Vec<f64>,
    column_widths: Vec<f64>,
}

impl Table {
    /// Create a blank table with default row heights and column widths.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for an unusable layout and
    /// `MinimumDimensionViolation` if either dimension is zero.
    pub fn new(
        origin: Point,
        row_count: usize,
        column_count: usize,
        config: LayoutConfig,
    ) -> Result<Self> {
        let grid = CellGrid::new(row_count, column_count)?;
        let row_heights = vec![config.default_row_height; row_count];
        let column_widths = vec![config.default_column_width; column_count];
        Self::from_parts(origin, grid, row_heights, column_widths, config)
    }

    /// Assemble a table from a grid and its size arrays.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for an unusable layout, `InvalidSize` for a
    /// negative or non-finite size, `StructuralIntegrity` when the size arrays
    /// disagree with the grid, or `InvalidSelectionShape` when its merge flags
    /// are inconsistent.
    pub fn from_parts(
        origin: Point,
        mut grid: CellGrid,
        row_heights: Vec<f64>,
        column_widths: Vec<f64>,
        config: LayoutConfig,
    ) -> Result<Self> {
        config.validate()?;
        check_sizes(&row_heights, &column_widths)?;
        resolve_spans(&mut grid);
        validate_merges(&grid)?;
        let primitives = compile(&grid, &row_heights, &column_widths, origin, config.scale())?;
        Ok(Self {
            origin,
            grid,
            row_heights,
            column_widths,
            config,
            state: EditState::Idle,
            selection: Vec::new(),
            primitives,
        })
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    pub fn row_count(&self) -> usize {
        self.grid.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.grid.column_count()
    }

    pub fn row_heights(&self) -> &[f64] {
        &self.row_heights
    }

    pub fn column_widths(&self) -> &[f64] {
        &self.column_widths
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Cell at `pos`.
    ///
    /// # Errors
    /// Returns `IndexOutOfBounds` outside the grid.
    pub fn cell(&self, pos: CellPos) -> Result<&Cell> {
        self.grid.cell(pos)
    }

    /// Primitives compiled from the current state.
    pub fn primitives(&self) -> &Primitives {
        &self.primitives
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing { .. })
    }

    /// Cells collected by Shift-presses, in press order.
    pub fn selection(&self) -> &[CellPos] {
        &self.selection
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Anchor of the cell under a canvas point, if any.
    pub fn cell_at(&self, point: Point) -> Option<CellPos> {
        let layout = TableLayout::new(
            &self.row_heights,
            &self.column_widths,
            self.origin,
            self.config.scale(),
        )
        .ok()?;
        let pos = CellPos::new(layout.row_at_y(point.y)?, layout.col_at_x(point.x)?);
        Some(owner_of(&self.grid, pos))
    }

    // ---- Edit session ----

    /// Pointer press on a text region.
    ///
    /// With Shift held the region joins the multi-cell selection and the
    /// table stays Idle; otherwise it becomes the only selected cell and
    /// editing begins on it.
    ///
    /// # Errors
    /// Returns `IndexOutOfBounds` for a position outside the grid.
    pub fn press_region(&mut self, pos: CellPos, shift_held: bool) -> Result<()> {
        self.grid.check_bounds(pos)?;
        let anchor = owner_of(&self.grid, pos);
        if shift_held {
            if !self.selection.contains(&anchor) {
                self.selection.push(anchor);
            }
            return Ok(());
        }
        self.selection = vec![anchor];
        self.begin_edit(anchor)
    }

    /// Give focus to the region owning `pos`, cursor at the end of its text.
    ///
    /// An edit already in progress elsewhere is committed first.
    ///
    /// # Errors
    /// Returns `IndexOutOfBounds` for a position outside the grid.
    pub fn begin_edit(&mut self, pos: CellPos) -> Result<()> {
        self.grid.check_bounds(pos)?;
        let anchor = owner_of(&self.grid, pos);
        self.commit_edit();
        let cursor = self.grid.cell(anchor)?.text.chars().count();
        self.state = EditState::Editing {
            pos: anchor,
            cursor,
        };
        tracing::debug!(row = anchor.row, column = anchor.column, "begin edit");
        Ok(())
    }

    /// Return to Idle. A no-op when nothing is being edited.
    pub fn commit_edit(&mut self) {
        if let EditState::Editing { pos, .. } = self.state {
            tracing::debug!(row = pos.row, column = pos.column, "commit edit");
        }
        self.state = EditState::Idle;
    }

    /// Replace the focused region's text, re-wrapping it if it overflows.
    ///
    /// When the wrapped text is taller than the region, the anchor row grows by
    /// one line increment, geometry is recompiled and editing resumes on the
    /// same cell with the cursor at the end. Otherwise only the region's own
    /// primitive grows.
    ///
    /// # Errors
    /// Returns `NoActiveEdit` when Idle.
    pub fn update_text(
        &mut self,
        text: &str,
        oracle: &impl CharWidthOracle,
    ) -> Result<ReflowOutcome> {
        let EditState::Editing { pos, .. } = self.state else {
            return Err(TableError::NoActiveEdit);
        };
        let (width, height) = self
            .primitives
            .region_at(pos)
            .map_or((0.0, 0.0), |r| (r.width, r.height));
        let row_height = self.row_heights.get(pos.row).copied().unwrap_or(0.0);

        let Some(plan) = plan_reflow(text, width, row_height, &self.config, oracle) else {
            self.grid.cell_mut(pos)?.text = text.to_string();
            self.set_region_text(pos, text, None);
            self.state = EditState::Editing {
                pos,
                cursor: text.chars().count(),
            };
            return Ok(ReflowOutcome::Fits);
        };

        let wrapped = plan.text();
        let cursor = wrapped.chars().count();

        if let Some(grown) = plan.grown_row_height {
            let mut draft = self.draft();
            draft.grid.cell_mut(pos)?.text = wrapped;
            if let Some(h) = draft.row_heights.get_mut(pos.row) {
                *h = grown;
            }
            self.commit_draft("reflow_grow_row", draft)?;
            self.state = EditState::Editing { pos, cursor };
            return Ok(ReflowOutcome::RowGrown {
                row: pos.row,
                row_height: grown,
                lines: plan.lines,
            });
        }

        self.grid.cell_mut(pos)?.text.clone_from(&wrapped);
        self.set_region_text(pos, &wrapped, Some(plan.wrapped_height));
        self.state = EditState::Editing { pos, cursor };
        Ok(ReflowOutcome::Wrapped {
            lines: plan.lines,
            height: plan.wrapped_height.max(height),
        })
    }

    fn set_region_text(&mut self, pos: CellPos, text: &str, min_height: Option<f64>) {
        let Some(region) = self
            .primitives
            .text_regions
            .iter_mut()
            .find(|r| r.logical_position == pos)
        else {
            return;
        };
        let top = region.center.y - region.height * 0.5;
        region.content = text.to_string();
        if let Some(h) = min_height.filter(|h| *h > region.height) {
            region.height = h;
            region.center.y = top + h * 0.5;
        }
    }

    // ---- Structural edits (Idle only) ----

    /// Merge the block covering `selected` into one cell.
    ///
    /// # Errors
    /// `EditInProgress`, `EmptySelection`, `IndexOutOfBounds`, or
    /// `InvalidSelectionShape` when the block cuts through an existing merge.
    pub fn merge_cells(&mut self, selected: &[CellPos]) -> Result<()> {
        self.ensure_idle()?;
        let range = selection_bounds(&self.grid, selected, false)?;
        self.apply("merge_cells", |d| mutation::merge_cells(&mut d.grid, range))
    }

    /// Split the merge anchored at the top-left of `selected`.
    ///
    /// # Errors
    /// `EditInProgress`, `EmptySelection` or `IndexOutOfBounds`.
    pub fn demerge_cells(&mut self, selected: &[CellPos]) -> Result<()> {
        self.ensure_idle()?;
        let range = selection_bounds(&self.grid, selected, true)?;
        self.apply("demerge_cells", |d| {
            mutation::demerge_cells(&mut d.grid, range)
        })
    }

    /// Insert a row above or below `reference_row`; returns the new row's index.
    ///
    /// # Errors
    /// `EditInProgress` or `IndexOutOfBounds`.
    pub fn insert_row(&mut self, reference_row: usize, above: bool) -> Result<usize> {
        let height = self.config.default_row_height;
        let mut at = 0;
        self.apply("insert_row", |d| {
            at = mutation::insert_row(
                &mut d.grid,
                &mut d.row_heights,
                reference_row,
                above,
                height,
            )?;
            Ok(())
        })?;
        Ok(at)
    }

    /// Delete `row`.
    ///
    /// # Errors
    /// `EditInProgress`, `IndexOutOfBounds`, or `MinimumDimensionViolation`
    /// when it is the only row.
    pub fn delete_row(&mut self, row: usize) -> Result<()> {
        self.apply("delete_row", |d| {
            mutation::delete_row(&mut d.grid, &mut d.row_heights, row)
        })
    }

    /// Insert a column left or right of `reference_col`; returns its index.
    ///
    /// # Errors
    /// `EditInProgress` or `IndexOutOfBounds`.
    pub fn insert_column(&mut self, reference_col: usize, left: bool) -> Result<usize> {
        let width = self.config.default_column_width;
        let mut at = 0;
        self.apply("insert_column", |d| {
            at = mutation::insert_column(
                &mut d.grid,
                &mut d.column_widths,
                reference_col,
                left,
                width,
            )?;
            Ok(())
        })?;
        Ok(at)
    }

    /// Delete `col`.
    ///
    /// # Errors
    /// `EditInProgress`, `IndexOutOfBounds`, or `MinimumDimensionViolation`
    /// when it is the only column.
    pub fn delete_column(&mut self, col: usize) -> Result<()> {
        self.apply("delete_column", |d| {
            mutation::delete_column(&mut d.grid, &mut d.column_widths, col)
        })
    }

    /// Drag row boundary `boundary` vertically by `delta_px` pixels.
    ///
    /// # Errors
    /// `EditInProgress` or `IndexOutOfBounds` for a boundary past the bottom edge.
    pub fn resize_row_boundary(&mut self, boundary: usize, delta_px: f64) -> Result<()> {
        let change = delta_px / self.config.row_scale;
        let min = self.config.min_dimension;
        self.apply("resize_row_boundary", |d| {
            mutation::resize_row_boundary(&mut d.row_heights, boundary, change, min)
        })
    }

    /// Drag column boundary `boundary` horizontally by `delta_px` pixels.
    ///
    /// # Errors
    /// `EditInProgress` or `IndexOutOfBounds` for a boundary past the right edge.
    pub fn resize_column_boundary(&mut self, boundary: usize, delta_px: f64) -> Result<()> {
        let change = delta_px / self.config.column_scale;
        let min = self.config.min_dimension;
        self.apply("resize_column_boundary", |d| {
            mutation::resize_column_boundary(&mut d.column_widths, boundary, change, min)
        })
    }

    /// Restyle the region owning `pos`.
    ///
    /// # Errors
    /// `EditInProgress` or `IndexOutOfBounds`.
    pub fn set_cell_style(&mut self, pos: CellPos, style: TextStyle) -> Result<()> {
        self.apply("set_cell_style", |d| {
            d.grid.check_bounds(pos)?;
            let anchor = owner_of(&d.grid, pos);
            d.grid.cell_mut(anchor)?.style = style;
            Ok(())
        })
    }

    /// Move the table's top-left corner.
    ///
    /// # Errors
    /// `EditInProgress`.
    pub fn set_origin(&mut self, origin: Point) -> Result<()> {
        self.ensure_idle()?;
        let primitives = compile(
            &self.grid,
            &self.row_heights,
            &self.column_widths,
            origin,
            self.config.scale(),
        )?;
        self.origin = origin;
        self.primitives = primitives;
        Ok(())
    }

    /// Extent of the merge block owning `pos`.
    ///
    /// # Errors
    /// `IndexOutOfBounds`.
    pub fn merge_range(&self, pos: CellPos) -> Result<CellRange> {
        self.grid.check_bounds(pos)?;
        Ok(block_range(&self.grid, owner_of(&self.grid, pos)))
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.is_editing() {
            tracing::warn!("structural edit rejected: edit in progress");
            return Err(TableError::EditInProgress);
        }
        Ok(())
    }

    fn draft(&self) -> Draft {
        Draft {
            grid: self.grid.clone(),
            row_heights: self.row_heights.clone(),
            column_widths: self.column_widths.clone(),
        }
    }

    /// Run a structural edit on a draft and commit it if it leaves a valid table.
    fn apply<F>(&mut self, op: &'static str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Draft) -> Result<()>,
    {
        self.ensure_idle()?;
        let mut draft = self.draft();
        if let Err(e) = edit(&mut draft) {
            tracing::warn!(op, error = %e, "structural edit rejected");
            return Err(e);
        }
        self.commit_draft(op, draft)
    }

    fn commit_draft(&mut self, op: &'static str, mut draft: Draft) -> Result<()> {
        resolve_spans(&mut draft.grid);
        let checked = draft
            .grid
            .validate()
            .and_then(|()| check_sizes(&draft.row_heights, &draft.column_widths))
            .and_then(|()| validate_merges(&draft.grid))
            .and_then(|()| {
                compile(
                    &draft.grid,
                    &draft.row_heights,
                    &draft.column_widths,
                    self.origin,
                    self.config.scale(),
                )
            });
        let primitives = match checked {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(op, error = %e, "structural edit rejected");
                return Err(e);
            }
        };

        self.grid = draft.grid;
        self.row_heights = draft.row_heights;
        self.column_widths = draft.column_widths;
        self.primitives = primitives;
        self.selection
            .retain(|pos| pos.row < self.grid.row_count() && pos.column < self.grid.column_count());

        tracing::debug!(
            op,
            rows = self.grid.row_count(),
            columns = self.grid.column_count(),
            "structural edit applied"
        );
        Ok(())
    }

    pub(crate) fn parts(&self) -> (&CellGrid, &[f64], &[f64]) {
        (&self.grid, &self.row_heights, &self.column_widths)
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

    fn table(rows: usize, cols: usize) -> Table {
        Table::new(Point::default(), rows, cols, LayoutConfig::default()).unwrap()
    }

    #[test]
    fn test_new_table_compiles() {
        let t = table(2, 2);
        assert_eq!(t.primitives().text_regions.len(), 4);
        assert_eq!(t.state(), EditState::Idle);
    }

    #[test]
    fn test_structural_edit_rejected_while_editing() {
        let mut t = table(2, 2);
        t.begin_edit(CellPos::new(0, 0)).unwrap();
        assert!(matches!(t.insert_row(0, false), Err(TableError::EditInProgress)));
        assert_eq!(t.row_count(), 2);
        t.commit_edit();
        assert_eq!(t.insert_row(0, false).unwrap(), 1);
        assert_eq!(t.row_count(), 3);
    }

    #[test]
    fn test_shift_press_collects_selection() {
        let mut t = table(2, 2);
        t.press_region(CellPos::new(0, 0), true).unwrap();
        t.press_region(CellPos::new(1, 1), true).unwrap();
        assert!(!t.is_editing());
        assert_eq!(t.selection().len(), 2);

        let selected = t.selection().to_vec();
        t.merge_cells(&selected).unwrap();
        assert_eq!(t.primitives().text_regions.len(), 1);
    }

    #[test]
    fn test_plain_press_begins_edit_on_anchor() {
        let mut t = table(2, 2);
        t.merge_cells(&[CellPos::new(0, 0), CellPos::new(0, 1)])
            .unwrap();
        t.press_region(CellPos::new(0, 1), false).unwrap();
        assert_eq!(
            t.state(),
            EditState::Editing {
                pos: CellPos::new(0, 0),
                cursor: 0
            }
        );
    }

    #[test]
    fn test_update_text_requires_edit() {
        let mut t = table(1, 1);
        let oracle = |_: char, _: f64| 5.0;
        assert!(matches!(
            t.update_text("x", &oracle),
            Err(TableError::NoActiveEdit)
        ));
    }

    #[test]
    fn test_cell_at_resolves_anchor() {
        let mut t = table(2, 2);
        t.merge_cells(&[CellPos::new(0, 0), CellPos::new(1, 1)])
            .unwrap();
        assert_eq!(t.cell_at(Point::new(45.0, 45.0)), Some(CellPos::new(0, 0)));
        assert_eq!(t.cell_at(Point::new(-1.0, 5.0)), None);
    }
}
