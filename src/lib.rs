//! execgrid - headless execution browser grid
//!
//! Spreadsheet-like view over trade execution records, with all state and
//! logic in Rust and a thin host on top:
//! - Per-column value filters keyed by field name
//! - Column reorder, hide and show, including drag-and-drop
//! - Virtual scrolling over the filtered rows
//! - Rectangular cell selection, keyboard navigation, TSV copy and paste
//! - Country flags resolved from MIC codes
//!
//! # Usage (Rust)
//!
//! ```
//! use execgrid::{ColumnDescriptor, ColumnLayout, ExecutionGrid, GridConfig, Row};
//!
//! let catalog = vec![
//!     ColumnDescriptor::text("ticker", "Ticker"),
//!     ColumnDescriptor::text("side", "Side"),
//! ];
//! let mut grid = ExecutionGrid::new(GridConfig::default(), ColumnLayout::all_visible(catalog));
//! grid.load_rows(vec![
//!     Row::new().with("ticker", "AAPL").with("side", "BUY"),
//!     Row::new().with("ticker", "MSFT").with("side", "SELL"),
//! ]);
//! grid.toggle_value(1, "BUY").unwrap();
//! assert_eq!(grid.filtered_len(), 1);
//! ```
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { ExecutionBrowser } from 'execgrid';
//! await init();
//! const grid = new ExecutionBrowser(root, null);
//! await grid.loadConfig();
//! await grid.search('real', '2024-03-05 09:30:00');
//! ```

pub mod api;
pub mod column_filter;
pub mod editor;
pub mod error;
pub mod format;
pub mod grid;
pub mod layout;
pub mod mic_country;
pub mod types;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

use wasm_bindgen::prelude::*;

pub use error::{GridError, Result};
pub use grid::{ExecutionGrid, GridStatus, KeyInput, KeyOutcome, PasteReport};
pub use layout::{ColumnLayout, DropTarget, VirtualWindow};
pub use types::*;

#[cfg(target_arch = "wasm32")]
pub use wasm::ExecutionBrowser;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
