//! Structured error types for execgrid.
//!
//! Every fallible operation in the crate returns [`Result`]. Failures at the
//! async boundaries (fetch, clipboard) are logged by the caller and degrade to
//! a previously valid state rather than propagating to the UI.

/// All errors that can occur while loading data into or manipulating the grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// JSON decoding error (rows, column config, field catalog).
    #[error("JSON decoding: {0}")]
    Json(#[from] serde_json::Error),

    /// A visible-column index outside the current table layout.
    #[error("Column index {index} out of range (layout has {len} columns)")]
    ColumnOutOfRange { index: usize, len: usize },

    /// A field that is not part of the hidden field pool.
    #[error("Field not available to show: {0}")]
    UnknownField(String),

    /// Clipboard read or write failure.
    #[error("Clipboard: {0}")]
    Clipboard(String),

    /// HTTP fetch failure.
    #[error("Fetch failed: {0}")]
    Fetch(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
