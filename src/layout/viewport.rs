//! Virtual scrolling over the filtered row sequence.
//!
//! Only rows inside the window are materialized. Two spacers, one above and
//! one below, keep the scrollbar geometry of the full list:
//!
//! ```text
//! start = max(0, floor(scroll / row_height) - buffer)
//! end   = min(total, ceil((scroll + height) / row_height) + buffer)
//! ```

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::types::GridConfig;

/// Half-open range of materialized row indices
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VirtualWindow {
    pub start_index: usize,
    pub end_index: usize,
}

impl VirtualWindow {
    pub fn range(&self) -> Range<usize> {
        self.start_index..self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, row: usize) -> bool {
        self.range().contains(&row)
    }

    /// Height of the spacer above the first rendered row.
    #[allow(clippy::cast_precision_loss)]
    pub fn top_spacer(&self, row_height: f64) -> f64 {
        self.start_index as f64 * row_height
    }

    /// Height of the spacer below the last rendered row.
    #[allow(clippy::cast_precision_loss)]
    pub fn bottom_spacer(&self, total_rows: usize, row_height: f64) -> f64 {
        total_rows.saturating_sub(self.end_index) as f64 * row_height
    }
}

/// Compute the window for a scroll position.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn compute_window(
    scroll_offset: f64,
    container_height: f64,
    total_rows: usize,
    row_height: f64,
    buffer_size: usize,
) -> VirtualWindow {
    if total_rows == 0 || row_height <= 0.0 {
        return VirtualWindow::default();
    }
    let scroll = scroll_offset.max(0.0);
    let height = container_height.max(0.0);
    let first = (scroll / row_height).floor() as usize;
    let last = ((scroll + height) / row_height).ceil() as usize;
    let start = first.saturating_sub(buffer_size).min(total_rows);
    let end = last.saturating_add(buffer_size).min(total_rows);
    VirtualWindow {
        start_index: start,
        end_index: end.max(start),
    }
}

/// Scroll state of the grid body
#[derive(Debug, Clone)]
pub struct VirtualViewport {
    /// Fixed row height in pixels
    pub row_height: f64,
    /// Extra rows rendered outside the visible area
    pub buffer_size: usize,
    /// Rows rendered while the container is unmeasured
    pub default_page_size: usize,
    /// Height assumed when the container reports zero
    pub fallback_height: f64,
    /// Vertical scroll offset in pixels
    pub scroll_offset: f64,
    /// Measured container height; `None` until the element exists
    pub container_height: Option<f64>,
    window: VirtualWindow,
}

impl Default for VirtualViewport {
    fn default() -> Self {
        Self::new(&GridConfig::default())
    }
}

impl VirtualViewport {
    pub fn new(config: &GridConfig) -> Self {
        Self {
            row_height: config.row_height,
            buffer_size: config.buffer_size,
            default_page_size: config.default_page_size,
            fallback_height: config.fallback_container_height,
            scroll_offset: 0.0,
            container_height: None,
            window: VirtualWindow::default(),
        }
    }

    /// Current window
    pub fn window(&self) -> VirtualWindow {
        self.window
    }

    /// Recompute the window for `total_rows`.
    ///
    /// Before the container has been measured the first page is shown.
    pub fn update(&mut self, total_rows: usize) -> VirtualWindow {
        self.window = match self.container_height {
            None => VirtualWindow {
                start_index: 0,
                end_index: total_rows.min(self.default_page_size),
            },
            Some(h) => {
                let height = if h > 0.0 { h } else { self.fallback_height };
                compute_window(
                    self.scroll_offset,
                    height,
                    total_rows,
                    self.row_height,
                    self.buffer_size,
                )
            }
        };
        self.window
    }

    /// Scroll event.
    pub fn on_scroll(&mut self, scroll_offset: f64, container_height: f64, total_rows: usize) -> VirtualWindow {
        self.scroll_offset = scroll_offset.max(0.0);
        self.container_height = Some(container_height);
        self.update(total_rows)
    }

    /// Container resize.
    pub fn resize(&mut self, container_height: f64, total_rows: usize) -> VirtualWindow {
        self.container_height = Some(container_height);
        self.update(total_rows)
    }

    /// The container element went away (or is not rendered yet).
    pub fn detach(&mut self) {
        self.container_height = None;
    }

    /// Back to the top (the filtered sequence changed).
    pub fn reset(&mut self, total_rows: usize) -> VirtualWindow {
        self.scroll_offset = 0.0;
        self.update(total_rows)
    }

    /// Scroll so that `row` is the first visible row.
    #[allow(clippy::cast_precision_loss)]
    pub fn scroll_to_row(&mut self, row: usize, total_rows: usize) -> VirtualWindow {
        self.scroll_offset = row as f64 * self.row_height;
        self.update(total_rows)
    }

    /// Bring `row` inside the window if it lies beyond it.
    pub fn ensure_visible(&mut self, row: usize, total_rows: usize) -> bool {
        if row >= total_rows || self.window.contains(row) {
            return false;
        }
        self.scroll_to_row(row, total_rows);
        true
    }

    pub fn top_spacer(&self) -> f64 {
        self.window.top_spacer(self.row_height)
    }

    pub fn bottom_spacer(&self, total_rows: usize) -> f64 {
        self.window.bottom_spacer(total_rows, self.row_height)
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

    #[test]
    fn test_window_reference_values() {
        let w = compute_window(420.0, 500.0, 1000, 42.0, 10);
        assert_eq!(w, VirtualWindow { start_index: 0, end_index: 32 });
    }

    #[test]
    fn test_window_mid_list() {
        let w = compute_window(4200.0, 500.0, 1000, 42.0, 10);
        // floor(100) - 10 = 90, ceil(4700 / 42) = 112 + 10 = 122
        assert_eq!(w, VirtualWindow { start_index: 90, end_index: 122 });
        assert_eq!(w.top_spacer(42.0), 3780.0);
        assert_eq!(w.bottom_spacer(1000, 42.0), 878.0 * 42.0);
    }

    #[test]
    fn test_window_clamped_at_end() {
        let w = compute_window(41_600.0, 500.0, 1000, 42.0, 10);
        assert_eq!(w.end_index, 1000);
        assert!(w.start_index < w.end_index);
    }

    #[test]
    fn test_empty_input() {
        let w = compute_window(0.0, 500.0, 0, 42.0, 10);
        assert!(w.is_empty());
        assert_eq!(w.bottom_spacer(0, 42.0), 0.0);
    }

    #[test]
    fn test_unmeasured_container_shows_first_page() {
        let mut vp = VirtualViewport::default();
        assert_eq!(vp.update(1000).range(), 0..50);
        assert_eq!(vp.update(7).range(), 0..7);
        vp.resize(420.0, 1000);
        assert_eq!(vp.window().range(), 0..20);
    }

    #[test]
    fn test_zero_height_uses_fallback() {
        let mut vp = VirtualViewport::default();
        let w = vp.resize(0.0, 1000);
        // 500px fallback: ceil(500 / 42) = 12 + 10
        assert_eq!(w.range(), 0..22);
    }

    #[test]
    fn test_reset_and_ensure_visible() {
        let mut vp = VirtualViewport::default();
        vp.on_scroll(4200.0, 500.0, 1000);
        vp.reset(1000);
        assert_eq!(vp.scroll_offset, 0.0);
        assert_eq!(vp.window().start_index, 0);

        assert!(vp.ensure_visible(300, 1000));
        assert!(vp.window().contains(300));
        assert!(!vp.ensure_visible(300, 1000));
    }
}
