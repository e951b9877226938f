//! In-place cell edits applied by paste.
//!
//! Pasted text is typed according to the target column before it is written
//! into the row:
//! - number / decimal columns take numeric text only
//! - datetime columns take any accepted timestamp layout, stored as ISO 8601
//! - text columns take the text verbatim
//! - computed columns (the country flag) are never written

mod mutation;

pub use mutation::{apply_cell_input, parse_cell_input, CellEdit};
