//! Data types for permit tables.

mod cell;
mod geometry;
mod selection;
mod style;

pub use cell::*;
pub use geometry::*;
pub use selection::*;
pub use style::*;
