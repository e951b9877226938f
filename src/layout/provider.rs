//! Geometry queries behind a trait.
//!
//! Filtering and selection logic never touches a DOM. Anything that needs
//! element geometry (filter popup placement, scroll container size) asks a
//! [`LayoutProvider`]; the browser bindings implement it over the document
//! and tests use [`StaticLayout`].

use serde::{Deserialize, Serialize};

/// Gap between a column header and its filter popup, in pixels.
pub const POPUP_GAP: f64 = 4.0;

/// Viewport-relative rectangle
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// Scroll position and size of the grid body container
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub client_height: f64,
}

/// Source of element geometry.
pub trait LayoutProvider {
    /// Bounding box of the header of visible column `col`.
    fn header_rect(&self, col: usize) -> Option<Rect>;

    /// Metrics of the scroll container, `None` while it is not rendered.
    fn scroll_metrics(&self) -> Option<ScrollMetrics>;
}

/// Fixed geometry, for headless hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticLayout {
    pub headers: Vec<Rect>,
    pub metrics: Option<ScrollMetrics>,
}

impl StaticLayout {
    /// Uniform header row of `count` columns of `width` pixels.
    #[allow(clippy::cast_precision_loss)]
    pub fn uniform(count: usize, width: f64, header_height: f64) -> Self {
        let headers = (0..count)
            .map(|i| Rect::new(i as f64 * width, 0.0, width, header_height))
            .collect();
        Self {
            headers,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, scroll_top: f64, client_height: f64) -> Self {
        self.metrics = Some(ScrollMetrics {
            scroll_top,
            client_height,
        });
        self
    }
}

impl LayoutProvider for StaticLayout {
    fn header_rect(&self, col: usize) -> Option<Rect> {
        self.headers.get(col).copied()
    }

    fn scroll_metrics(&self) -> Option<ScrollMetrics> {
        self.metrics
    }
}

/// Top-left corner of the filter popup for column `col`: under its header,
/// or the origin when the header is not laid out.
pub fn popup_anchor(provider: &dyn LayoutProvider, col: usize) -> (f64, f64) {
    provider
        .header_rect(col)
        .map_or((0.0, 0.0), |r| (r.left, r.bottom() + POPUP_GAP))
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_popup_anchor_below_header() {
        let layout = StaticLayout::uniform(3, 120.0, 50.0);
        assert_eq!(popup_anchor(&layout, 2), (240.0, 54.0));
        assert_eq!(popup_anchor(&layout, 9), (0.0, 0.0));
    }
}
