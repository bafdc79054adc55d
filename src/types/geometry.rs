use serde::{Deserialize, Serialize};

use super::{CellPos, TextStyle};

/// Point in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which family of grid boundary a line segment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Horizontal line on a row boundary.
    Row,
    /// Vertical line on a column boundary.
    Column,
}

/// A coalesced grid-line segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSegment {
    pub endpoint_a: Point,
    pub endpoint_b: Point,
    pub kind: LineKind,
    /// Boundary index: 0 is the top/left edge, `count` the bottom/right edge.
    pub index: usize,
}

impl LineSegment {
    /// Length along the segment's own axis.
    #[must_use]
    pub fn length(&self) -> f64 {
        match self.kind {
            LineKind::Row => (self.endpoint_b.x - self.endpoint_a.x).abs(),
            LineKind::Column => (self.endpoint_b.y - self.endpoint_a.y).abs(),
        }
    }
}

/// Text primitive for one visible (anchor) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRegion {
    pub content: String,
    pub center: Point,
    pub width: f64,
    pub height: f64,
    pub style: TextStyle,
    pub logical_position: CellPos,
}

impl TextRegion {
    /// Left/top corner of the region's rectangle.
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(
            self.center.x - self.width * 0.5,
            self.center.y - self.height * 0.5,
        )
    }
}

/// Everything the renderer needs to paint a table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Primitives {
    pub lines: Vec<LineSegment>,
    pub text_regions: Vec<TextRegion>,
}

impl Primitives {
    pub fn row_lines(&self) -> impl Iterator<Item = &LineSegment> {
        self.lines.iter().filter(|l| l.kind == LineKind::Row)
    }

    pub fn column_lines(&self) -> impl Iterator<Item = &LineSegment> {
        self.lines.iter().filter(|l| l.kind == LineKind::Column)
    }

    /// Text region whose anchor is at `pos`.
    #[must_use]
    pub fn region_at(&self, pos: CellPos) -> Option<&TextRegion> {
        self.text_regions.iter().find(|r| r.logical_position == pos)
    }
}
