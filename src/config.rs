//! Layout constants for converting logical table units into canvas pixels.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};
use crate::types::Axis;

/// Pixels per logical row-height unit.
pub const DEFAULT_ROW_SCALE: f64 = 100.0;

/// Pixels per logical column-width unit.
pub const DEFAULT_COLUMN_SCALE: f64 = 100.0;

/// Font size of cell text in pixels.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Extra pixels added to the font size to get one text line's height.
pub const DEFAULT_LINE_PADDING: f64 = 5.0;

/// Height given to freshly inserted rows, in logical units.
pub const DEFAULT_ROW_HEIGHT: f64 = 0.3;

/// Width given to freshly inserted columns, in logical units.
pub const DEFAULT_COLUMN_WIDTH: f64 = 0.3;

/// Smallest row height or column width a resize may produce, in logical units.
pub const DEFAULT_MIN_DIMENSION: f64 = 0.05;

/// Scale factors applied by the geometry compiler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scale {
    pub row: f64,
    pub column: f64,
}

impl Default for Scale {
    fn default() -> Self {
        Self {
            row: DEFAULT_ROW_SCALE,
            column: DEFAULT_COLUMN_SCALE,
        }
    }
}

/// Layout configuration for one table.
///
/// Deserializes from camelCase JSON; missing keys fall back to the defaults above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub row_scale: f64,
    pub column_scale: f64,
    pub font_size: f64,
    pub line_padding: f64,
    pub default_row_height: f64,
    pub default_column_width: f64,
    pub min_dimension: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_scale: DEFAULT_ROW_SCALE,
            column_scale: DEFAULT_COLUMN_SCALE,
            font_size: DEFAULT_FONT_SIZE,
            line_padding: DEFAULT_LINE_PADDING,
            default_row_height: DEFAULT_ROW_HEIGHT,
            default_column_width: DEFAULT_COLUMN_WIDTH,
            min_dimension: DEFAULT_MIN_DIMENSION,
        }
    }
}

impl LayoutConfig {
    #[must_use]
    pub fn scale(&self) -> Scale {
        Scale {
            row: self.row_scale,
            column: self.column_scale,
        }
    }

    /// Pixel height of one wrapped text line.
    #[must_use]
    pub fn line_height(&self) -> f64 {
        self.font_size + self.line_padding
    }

    /// Logical units a row grows by when reflowed text overflows it.
    #[must_use]
    pub fn row_growth_increment(&self) -> f64 {
        self.line_height() / self.row_scale
    }

    /// Check that every constant yields finite geometry.
    ///
    /// # Errors
    /// Returns `InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("rowScale", self.row_scale),
            ("columnScale", self.column_scale),
            ("fontSize", self.font_size),
            ("defaultRowHeight", self.default_row_height),
            ("defaultColumnWidth", self.default_column_width),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, v)| !v.is_finite() || *v <= 0.0) {
            return Err(TableError::invalid_config(format!(
                "{name} must be finite and positive, got {value}"
            )));
        }
        let non_negative = [
            ("linePadding", self.line_padding),
            ("minDimension", self.min_dimension),
        ];
        if let Some((name, value)) = non_negative.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            return Err(TableError::invalid_config(format!(
                "{name} must be finite and non-negative, got {value}"
            )));
        }
        Ok(())
    }
}

/// Reject row heights or column widths that are negative or not finite.
///
/// # Errors
/// Returns `InvalidSize` for the first offending entry.
pub fn check_sizes(row_heights: &[f64], column_widths: &[f64]) -> Result<()> {
    let rows = row_heights.iter().enumerate().map(|(i, v)| (Axis::Row, i, *v));
    let columns = column_widths.iter().enumerate().map(|(i, v)| (Axis::Column, i, *v));
    match rows.chain(columns).find(|(_, _, v)| !v.is_finite() || *v < 0.0) {
        Some((axis, index, value)) => Err(TableError::InvalidSize { axis, index, value }),
        None => Ok(()),
    }
}
