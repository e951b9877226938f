use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Value-set filter for one column, keyed by field name in the engine.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFilter {
    /// Display values a row must match; empty means no filter
    pub selected_values: BTreeSet<String>,
    /// Search text typed in the filter popup
    #[serde(default)]
    pub search_text: String,
}

impl ColumnFilter {
    /// True if a filter is actively applied (not showing all values)
    pub fn is_active(&self) -> bool {
        !self.selected_values.is_empty()
    }

    /// Whether a display value passes this filter.
    pub fn accepts(&self, value: &str) -> bool {
        self.selected_values.is_empty() || self.selected_values.contains(value)
    }
}
