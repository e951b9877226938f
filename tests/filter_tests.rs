//! Tests for per-column value filtering through the grid.
//!
//! Filters are conjunctive across columns, never grow the result when a
//! value set is narrowed, and always offer values from the unfiltered rows.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::collections::BTreeSet;

use common::{column_values, loaded_grid};
use test_case::test_case;

const TICKER: usize = 0;
const SIDE: usize = 1;
const TRADER: usize = 2;
const PRICE: usize = 3;
const COUNTRY: usize = 4;

fn passing_ids(grid: &execgrid::ExecutionGrid) -> BTreeSet<i64> {
    grid.filtered_rows()
        .filter_map(execgrid::Row::execution_id)
        .collect()
}

#[test]
fn test_no_filters_show_everything() {
    let grid = loaded_grid();
    assert_eq!(grid.filtered_len(), 6);
    for col in 0..grid.columns().len() {
        assert!(!grid.has_active_filter(col));
    }
}

#[test]
fn test_unique_values_sorted() {
    let grid = loaded_grid();
    assert_eq!(grid.unique_values(SIDE), vec!["BUY", "SELL"]);
    assert_eq!(grid.unique_values(TRADER), vec!["alice", "bob", "carol"]);
    assert_eq!(grid.unique_values(COUNTRY), vec!["fr", "gb", "us"]);
    assert_eq!(grid.unique_values(PRICE)[0], "0.72");
}

#[test]
fn test_filter_monotonicity() {
    let mut grid = loaded_grid();
    grid.toggle_value(TRADER, "alice").unwrap();
    grid.toggle_value(TRADER, "bob").unwrap();
    let wide = passing_ids(&grid);

    // Removing a value from the set can only shrink the result
    grid.toggle_value(TRADER, "bob").unwrap();
    let narrow = passing_ids(&grid);
    assert!(narrow.is_subset(&wide));
    assert!(narrow.len() < wide.len());
}

#[test]
fn test_filter_conjunction() {
    let mut grid = loaded_grid();
    grid.toggle_value(SIDE, "BUY").unwrap();
    let buys = passing_ids(&grid);
    grid.clear_filter(SIDE).unwrap();

    grid.toggle_value(COUNTRY, "fr").unwrap();
    let french = passing_ids(&grid);

    grid.toggle_value(SIDE, "BUY").unwrap();
    let both = passing_ids(&grid);
    let expected: BTreeSet<i64> = buys.intersection(&french).copied().collect();
    assert_eq!(both, expected);
    assert_eq!(both, BTreeSet::from([6]));
}

#[test]
fn test_value_universe_ignores_other_filters() {
    let mut grid = loaded_grid();
    grid.toggle_value(TRADER, "carol").unwrap();
    assert_eq!(grid.filtered_len(), 2);
    assert_eq!(grid.unique_values(TICKER).len(), 6);
    assert_eq!(grid.value_count(SIDE, "BUY"), 4);
}

#[test_case("al", &["alice"] ; "prefix")]
#[test_case(" CAR ", &["carol"] ; "trimmed and case insensitive")]
#[test_case("o", &["bob", "carol"] ; "substring")]
#[test_case("", &["alice", "bob", "carol"] ; "empty search")]
#[test_case("zz", &[] ; "no match")]
fn test_filtered_values(search: &str, expected: &[&str]) {
    let grid = loaded_grid();
    assert_eq!(grid.filtered_values(TRADER, search), expected);
}

#[test]
fn test_select_all_with_search() {
    let mut grid = loaded_grid();
    grid.set_filter_search(TICKER, "A").unwrap();
    grid.toggle_select_all(TICKER, true).unwrap();
    // AAPL, AIR match "a"; GOOG, MSFT, VOD and BNP do not
    assert_eq!(grid.filter_count(TICKER), 2);
    assert!(grid.are_all_values_selected(TICKER));
    assert_eq!(column_values(&grid, TICKER), vec!["AAPL", "AIR"]);

    grid.toggle_select_all(TICKER, false).unwrap();
    assert!(!grid.has_active_filter(TICKER));
    assert_eq!(grid.filtered_len(), 6);
}

#[test]
fn test_decimal_filter_matches_display_text() {
    let mut grid = loaded_grid();
    grid.toggle_value(PRICE, "189.50").unwrap();
    assert_eq!(column_values(&grid, TICKER), vec!["AAPL"]);

    grid.toggle_value(PRICE, "189.5").unwrap();
    assert_eq!(grid.filtered_len(), 1);
}

#[test]
fn test_filter_survives_reorder() {
    let mut grid = loaded_grid();
    grid.toggle_value(SIDE, "SELL").unwrap();
    grid.reorder_columns(SIDE, 4).unwrap();
    assert!(grid.has_active_filter(4));
    assert!(!grid.has_active_filter(SIDE));
    assert_eq!(column_values(&grid, 4), vec!["SELL", "SELL"]);
}

#[test]
fn test_filter_resets_scroll_and_selection() {
    let mut grid = loaded_grid();
    grid.on_scroll(84.0, 42.0);
    grid.click(2, 1, false);
    grid.toggle_value(TRADER, "bob").unwrap();
    assert_eq!(grid.viewport().scroll_offset, 0.0);
    assert_eq!(grid.visible_window().start_index, 0);
    assert_eq!(grid.selection(), None);
    assert_eq!(grid.focused_cell(), None);
}

#[test]
fn test_new_rows_reset_filters() {
    let mut grid = loaded_grid();
    grid.toggle_value(SIDE, "BUY").unwrap();
    grid.set_filter_search(TRADER, "al").unwrap();
    grid.load_rows(common::executions());
    assert!(!grid.has_active_filter(SIDE));
    assert_eq!(grid.filter_search_text(TRADER), "");
    assert_eq!(grid.filtered_len(), 6);
}

#[test]
fn test_out_of_range_column() {
    let mut grid = loaded_grid();
    assert!(grid.toggle_value(99, "x").is_err());
    assert!(grid.clear_filter(99).is_err());
    assert!(grid.unique_values(99).is_empty());
    assert!(!grid.has_active_filter(99));
    assert_eq!(grid.filtered_len(), 6);
}
