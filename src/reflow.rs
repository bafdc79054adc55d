//! Greedy text wrapping and row-growth decisions for edited cells.
//!
//! Character widths come from a host-supplied [`CharWidthOracle`]; the engine
//! only assumes it is deterministic for a given character and font size.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use crate::config::LayoutConfig;

/// Default capacity of [`CachedWidthOracle`].
pub const WIDTH_CACHE_CAP: usize = 512;

/// Width of a single character at a font size, in pixels.
pub trait CharWidthOracle {
    fn char_width(&self, ch: char, font_size: f64) -> f64;
}

impl<F> CharWidthOracle for F
where
    F: Fn(char, f64) -> f64,
{
    fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self(ch, font_size)
    }
}

/// Bounded FIFO cache in front of a slower oracle (e.g. a JS callback).
pub struct CachedWidthOracle<O> {
    inner: O,
    cache: RefCell<WidthCache>,
}

struct WidthCache {
    entries: HashMap<(char, u64), f64>,
    order: VecDeque<(char, u64)>,
    max_entries: usize,
}

impl<O: CharWidthOracle> CachedWidthOracle<O> {
    pub fn new(inner: O) -> Self {
        Self::with_capacity(inner, WIDTH_CACHE_CAP)
    }

    pub fn with_capacity(inner: O, max_entries: usize) -> Self {
        Self {
            inner,
            cache: RefCell::new(WidthCache {
                entries: HashMap::new(),
                order: VecDeque::new(),
                max_entries,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<O: CharWidthOracle> CharWidthOracle for CachedWidthOracle<O> {
    fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let key = (ch, font_size.to_bits());
        if let Some(width) = self.cache.borrow().entries.get(&key) {
            return *width;
        }
        let width = self.inner.char_width(ch, font_size);
        let mut cache = self.cache.borrow_mut();
        if cache.max_entries > 0 {
            cache.entries.insert(key, width);
            cache.order.push_back(key);
            while cache.entries.len() > cache.max_entries {
                let Some(oldest) = cache.order.pop_front() else {
                    break;
                };
                cache.entries.remove(&oldest);
            }
        }
        width
    }
}

/// Wrap `text` greedily into lines no wider than `max_width`.
///
/// Walks the text one character at a time, closing the line when the next
/// character would push the running width past `max_width`. An explicit `\n`
/// always closes the line. A character wider than `max_width` gets a line of
/// its own. Always yields at least one line.
pub fn wrap_text(
    text: &str,
    max_width: f64,
    font_size: f64,
    oracle: &impl CharWidthOracle,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut width = 0.0;

    for ch in text.chars() {
        if ch == '\n' {
            lines.push(std::mem::take(&mut current));
            width = 0.0;
            continue;
        }
        let w = oracle.char_width(ch, font_size);
        if !current.is_empty() && width + w > max_width {
            lines.push(std::mem::take(&mut current));
            width = 0.0;
        }
        current.push(ch);
        width += w;
    }
    lines.push(current);
    lines
}

/// Rendered width of the widest explicit line of `text`.
pub fn measure_text(text: &str, font_size: f64, oracle: &impl CharWidthOracle) -> f64 {
    text.split('\n')
        .map(|line| line.chars().map(|ch| oracle.char_width(ch, font_size)).sum())
        .fold(0.0, f64::max)
}

/// Result of reflowing a region's text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ReflowOutcome {
    /// Text fits the region's width as typed.
    Fits,
    /// Text was re-wrapped and the region grew in place; no recompile.
    Wrapped { lines: Vec<String>, height: f64 },
    /// Wrapped text overflowed the row: the row grew and geometry was recompiled.
    RowGrown {
        row: usize,
        row_height: f64,
        lines: Vec<String>,
    },
}

/// What the table should do with an overflowing region.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflowPlan {
    pub lines: Vec<String>,
    /// `line_height * lines.len()` in pixels.
    pub wrapped_height: f64,
    /// New logical height of the anchor row when the wrapped text does not fit.
    pub grown_row_height: Option<f64>,
}

impl ReflowPlan {
    /// Wrapped lines re-joined with explicit breaks.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Decide how to reflow `text` inside a region, or `None` when it already fits.
///
/// `row_height` is the anchor row's logical height. Its pixel allocation is
/// `row_height * row_scale`, even when the region spans several rows; when the
/// wrapped height exceeds it the row grows by one line increment.
pub fn plan_reflow(
    text: &str,
    region_width: f64,
    row_height: f64,
    config: &LayoutConfig,
    oracle: &impl CharWidthOracle,
) -> Option<ReflowPlan> {
    if measure_text(text, config.font_size, oracle) <= region_width {
        return None;
    }
    let lines = wrap_text(text, region_width, config.font_size, oracle);
    let wrapped_height = config.line_height() * lines.len() as f64;
    let allocated_height = row_height * config.row_scale;
    let grown_row_height =
        (wrapped_height > allocated_height).then(|| row_height + config.row_growth_increment());
    Some(ReflowPlan {
        lines,
        wrapped_height,
        grown_row_height,
    })
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
    use std::cell::Cell;

    fn five_px(_: char, _: f64) -> f64 {
        5.0
    }

    #[test]
    fn test_wrap_fills_greedily() {
        let lines = wrap_text("AAAAAAAAAA", 40.0, 12.0, &five_px);
        assert_eq!(lines, vec!["AAAAAAAA", "AA"]);
    }

    #[test]
    fn test_explicit_break_always_closes_line() {
        let lines = wrap_text("AB\nCD", 100.0, 12.0, &five_px);
        assert_eq!(lines, vec!["AB", "CD"]);
        let lines = wrap_text("AB\n", 100.0, 12.0, &five_px);
        assert_eq!(lines, vec!["AB", ""]);
    }

    #[test]
    fn test_wide_char_gets_own_line() {
        let lines = wrap_text("ab", 3.0, 12.0, &five_px);
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_text_is_one_line() {
        assert_eq!(wrap_text("", 10.0, 12.0, &five_px), vec![String::new()]);
    }

    #[test]
    fn test_measure_widest_line() {
        assert_eq!(measure_text("AAA\nA", 12.0, &five_px), 15.0);
    }

    #[test]
    fn test_plan_none_when_fits() {
        let config = LayoutConfig::default();
        assert!(plan_reflow("AAAA", 40.0, 0.3, &config, &five_px).is_none());
    }

    #[test]
    fn test_plan_grows_row_when_overflowing() {
        let config = LayoutConfig::default();
        // 2 lines * 17px = 34px > 30px allocated
        let plan = plan_reflow("AAAAAAAAAA", 40.0, 0.3, &config, &five_px).unwrap();
        assert_eq!(plan.lines.len(), 2);
        assert_eq!(plan.wrapped_height, 34.0);
        let grown = plan.grown_row_height.unwrap();
        assert!((grown - 0.47).abs() < 1e-9);
    }

    #[test]
    fn test_plan_keeps_row_when_tall_enough() {
        let config = LayoutConfig::default();
        let plan = plan_reflow("AAAAAAAAAA", 40.0, 0.6, &config, &five_px).unwrap();
        assert_eq!(plan.grown_row_height, None);
        assert_eq!(plan.text(), "AAAAAAAA\nAA");
    }

    #[test]
    fn test_plan_allocation_follows_row_scale() {
        let config = LayoutConfig {
            row_scale: 200.0,
            ..LayoutConfig::default()
        };
        // 0.3 * 200 = 60px holds two 17px lines
        let plan = plan_reflow("AAAAAAAAAA", 40.0, 0.3, &config, &five_px).unwrap();
        assert_eq!(plan.grown_row_height, None);
    }

    #[test]
    fn test_cached_oracle_calls_inner_once_per_key() {
        let calls = Cell::new(0);
        let oracle = CachedWidthOracle::new(|_: char, size: f64| {
            calls.set(calls.get() + 1);
            size / 2.0
        });
        assert_eq!(oracle.char_width('a', 12.0), 6.0);
        assert_eq!(oracle.char_width('a', 12.0), 6.0);
        assert_eq!(oracle.char_width('a', 14.0), 7.0);
        assert_eq!(calls.get(), 2);
        assert_eq!(oracle.len(), 2);
    }

    #[test]
    fn test_cached_oracle_enforces_cap() {
        let oracle = CachedWidthOracle::with_capacity(five_px, 2);
        oracle.char_width('a', 12.0);
        oracle.char_width('b', 12.0);
        oracle.char_width('c', 12.0);
        assert_eq!(oracle.len(), 2);
    }
}
