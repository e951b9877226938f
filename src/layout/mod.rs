//! Column layout, drag-and-drop and virtual scrolling.
//!
//! This module handles:
//! - Visible column order and the hidden field pool
//! - The drag-and-drop state machine that edits them
//! - Mapping scroll position to the window of rendered rows
//! - Geometry queries, abstracted away from any DOM

mod columns;
mod drag;
mod provider;
mod viewport;

pub use columns::ColumnLayout;
pub use drag::{DragState, DropTarget, LayoutChange};
pub use provider::{popup_anchor, LayoutProvider, Rect, ScrollMetrics, StaticLayout, POPUP_GAP};
pub use viewport::{compute_window, VirtualViewport, VirtualWindow};
