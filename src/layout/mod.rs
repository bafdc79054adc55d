//! Geometry engine: logical table model to renderable primitives.
//!
//! This module handles:
//! - Pre-computing boundary positions from row heights and column widths
//! - Binary search for cell lookup at canvas coordinates
//! - Compiling grid-line segments and text regions, honoring merges

mod geometry;
mod table_layout;

pub use geometry::compile;
pub use table_layout::{CellRect, TableLayout};
