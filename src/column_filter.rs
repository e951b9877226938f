//! Per-column value-set filtering.
//!
//! Filters are keyed by field name rather than column position, so moving a
//! column never moves its filter onto another column. Value universes are
//! always computed from the full, unfiltered row set: the options offered for
//! one column never shrink because another column is filtered.
//!
//! A row passes when, for every column with a non-empty selection, its display
//! value for that column is one of the selected values.

use std::collections::{BTreeSet, HashMap};

use crate::format::display_value;
use crate::mic_country::CountryCodes;
use crate::types::{ColumnDescriptor, ColumnFilter, Row};

/// Sorted distinct display values of a column over all rows.
///
/// Empty values are excluded.
pub fn unique_values(rows: &[Row], column: &ColumnDescriptor, countries: &CountryCodes) -> Vec<String> {
    rows.iter()
        .map(|row| display_value(row, column, countries))
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Values containing `search` (case-insensitive, trimmed); all values when
/// the search is blank.
pub fn matching_values(values: &[String], search: &str) -> Vec<String> {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return values.to_vec();
    }
    values
        .iter()
        .filter(|v| v.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Number of rows whose display value for `column` equals `value`.
pub fn value_count(
    rows: &[Row],
    column: &ColumnDescriptor,
    countries: &CountryCodes,
    value: &str,
) -> usize {
    rows.iter()
        .filter(|row| display_value(row, column, countries) == value)
        .count()
}

/// Indices of the rows passing every active filter on the given columns.
///
/// Filters on fields that are not among `columns` are ignored.
pub fn apply_filters(
    rows: &[Row],
    columns: &[ColumnDescriptor],
    filters: &FilterEngine,
    countries: &CountryCodes,
) -> Vec<usize> {
    let active: Vec<(&ColumnDescriptor, &ColumnFilter)> = columns
        .iter()
        .filter_map(|col| {
            filters
                .get(&col.field)
                .filter(|f| f.is_active())
                .map(|f| (col, f))
        })
        .collect();

    if active.is_empty() {
        return (0..rows.len()).collect();
    }

    rows.iter()
        .enumerate()
        .filter(|(_, row)| {
            active
                .iter()
                .all(|(col, filter)| filter.accepts(&display_value(row, col, countries)))
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Filter state for all columns, keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    filters: HashMap<String, ColumnFilter>,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&ColumnFilter> {
        self.filters.get(field)
    }

    fn entry(&mut self, field: &str) -> &mut ColumnFilter {
        self.filters.entry(field.to_string()).or_default()
    }

    /// Flip membership of `value`; returns whether it is now selected.
    pub fn toggle_value(&mut self, field: &str, value: &str) -> bool {
        let filter = self.entry(field);
        if filter.selected_values.remove(value) {
            false
        } else {
            filter.selected_values.insert(value.to_string());
            true
        }
    }

    /// Add or remove a batch of values (the "select all" checkbox).
    pub fn set_values<'a, I>(&mut self, field: &str, values: I, selected: bool)
    where
        I: IntoIterator<Item = &'a String>,
    {
        let filter = self.entry(field);
        for value in values {
            if selected {
                filter.selected_values.insert(value.clone());
            } else {
                filter.selected_values.remove(value);
            }
        }
    }

    pub fn set_search_text(&mut self, field: &str, text: &str) {
        self.entry(field).search_text = text.to_string();
    }

    pub fn search_text(&self, field: &str) -> &str {
        self.filters
            .get(field)
            .map(|f| f.search_text.as_str())
            .unwrap_or("")
    }

    /// Empty the selection and search text of one column.
    pub fn clear(&mut self, field: &str) {
        if let Some(filter) = self.filters.get_mut(field) {
            filter.selected_values.clear();
            filter.search_text.clear();
        }
    }

    /// Forget a column's filter entirely.
    pub fn remove(&mut self, field: &str) -> bool {
        self.filters
            .remove(field)
            .is_some_and(|f| f.is_active())
    }

    /// Drop every filter (new row set).
    pub fn reset(&mut self) {
        self.filters.clear();
    }

    pub fn is_active(&self, field: &str) -> bool {
        self.filters.get(field).is_some_and(ColumnFilter::is_active)
    }

    pub fn selected_count(&self, field: &str) -> usize {
        self.filters
            .get(field)
            .map_or(0, |f| f.selected_values.len())
    }

    pub fn is_selected(&self, field: &str, value: &str) -> bool {
        self.filters
            .get(field)
            .is_some_and(|f| f.selected_values.contains(value))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::types::ColumnType;

    fn rows() -> Vec<Row> {
        vec![
            Row::new().with("trader", "alice").with("price", 10.0),
            Row::new().with("trader", "bob").with("price", 10.004),
            Row::new().with("trader", "alice").with("price", 12.5),
            Row::new().with("trader", "").with("price", serde_json::Value::Null),
        ]
    }

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::text("trader", "Trader"),
            ColumnDescriptor::new("price", "Price", Some(ColumnType::Decimal)),
        ]
    }

    #[test]
    fn test_unique_values_sorted_distinct_non_empty() {
        let cols = columns();
        let countries = CountryCodes::default();
        assert_eq!(unique_values(&rows(), &cols[0], &countries), vec!["alice", "bob"]);
        // Decimal values compare on their two-decimal display text
        assert_eq!(unique_values(&rows(), &cols[1], &countries), vec!["10.00", "12.50"]);
    }

    #[test]
    fn test_matching_values_case_insensitive() {
        let values = vec!["ACK".to_string(), "Pending".to_string(), "TIMEOUT".to_string()];
        assert_eq!(matching_values(&values, "  pend "), vec!["Pending"]);
        assert_eq!(matching_values(&values, "OUT"), vec!["TIMEOUT"]);
        assert_eq!(matching_values(&values, ""), values);
    }

    #[test]
    fn test_no_filter_passes_everything() {
        let idx = apply_filters(&rows(), &columns(), &FilterEngine::new(), &CountryCodes::default());
        assert_eq!(idx, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let mut engine = FilterEngine::new();
        engine.toggle_value("trader", "alice");
        let countries = CountryCodes::default();
        assert_eq!(apply_filters(&rows(), &columns(), &engine, &countries), vec![0, 2]);

        engine.toggle_value("price", "10.00");
        assert_eq!(apply_filters(&rows(), &columns(), &engine, &countries), vec![0]);
    }

    #[test]
    fn test_filter_on_absent_column_ignored() {
        let mut engine = FilterEngine::new();
        engine.toggle_value("book", "B1");
        let idx = apply_filters(&rows(), &columns(), &engine, &CountryCodes::default());
        assert_eq!(idx.len(), 4);
    }

    #[test]
    fn test_toggle_and_clear() {
        let mut engine = FilterEngine::new();
        assert!(engine.toggle_value("trader", "bob"));
        engine.set_search_text("trader", "bo");
        assert!(engine.is_active("trader"));
        assert_eq!(engine.selected_count("trader"), 1);
        assert!(!engine.toggle_value("trader", "bob"));
        assert!(!engine.is_active("trader"));

        engine.set_values("trader", &["alice".to_string(), "bob".to_string()], true);
        assert_eq!(engine.selected_count("trader"), 2);
        engine.clear("trader");
        assert_eq!(engine.selected_count("trader"), 0);
        assert_eq!(engine.search_text("trader"), "");
    }

    #[test]
    fn test_value_count_over_all_rows() {
        let cols = columns();
        assert_eq!(value_count(&rows(), &cols[0], &CountryCodes::default(), "alice"), 2);
    }
}
