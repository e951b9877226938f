//! Tests for search results, configuration assets and the empty state.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{catalog, column_values, executions, loaded_grid, text_grid, MIC_CSV, TABLE_COLUMNS_JSON};
use execgrid::api::{decode_field_catalog, decode_mic_codes, decode_or_default, decode_table_config};
use execgrid::layout::ColumnLayout;
use execgrid::mic_country::{CountryCodes, MicCountryMap};
use execgrid::{ExecutionGrid, FieldCatalog, GridConfig, GridError, GridStatus, TableConfig};

const COUNTRY: usize = 4;

#[test]
fn test_status_lifecycle() {
    let mut grid = ExecutionGrid::default();
    assert_eq!(grid.status(), GridStatus::Idle);
    assert_eq!(grid.empty_message(), None);

    grid.begin_loading();
    assert_eq!(grid.status(), GridStatus::Loading);

    grid.load_rows(executions());
    assert_eq!(grid.status(), GridStatus::Ready);
    assert_eq!(grid.filtered_len(), 6);
}

#[test]
fn test_failed_fetch_shows_no_results() {
    let mut grid = loaded_grid();
    grid.click(0, 0, false);
    grid.begin_loading();
    // Previous rows stay visible while the search runs
    assert_eq!(grid.filtered_len(), 6);

    grid.fetch_failed(&GridError::Fetch("POST /test-real returned status 502".into()));
    assert_eq!(grid.status(), GridStatus::Empty);
    assert_eq!(grid.empty_message(), Some("No executions found"));
    assert_eq!(grid.filtered_len(), 0);
    assert_eq!(grid.focused_cell(), None);

    let data = grid.render_data();
    assert_eq!(data.message, Some("No executions found"));
    assert_eq!(data.total_rows, 0);
    assert!(data.rows.is_empty());
    assert_eq!(data.bottom_spacer, 0.0);
}

#[test]
fn test_country_flags_from_mic() {
    let grid = loaded_grid();
    assert_eq!(column_values(&grid, COUNTRY), vec!["us", "us", "us", "fr", "gb", "fr"]);

    let data = grid.render_data();
    let flags: Vec<Option<String>> = data.rows.iter().map(|r| r.cells[COUNTRY].flag.clone()).collect();
    assert_eq!(flags[3].as_deref(), Some("/assets/svgs/illustrations/flags/fr.svg"));
    assert_eq!(flags[4].as_deref(), Some("/assets/svgs/illustrations/flags/gb.svg"));
    assert!(data.rows.iter().all(|r| r.cells[0].flag.is_none()));
}

#[test]
fn test_country_codes_arrive_after_rows() {
    let layout = ColumnLayout::new(catalog(), common::table_columns());
    let mut grid = ExecutionGrid::new(GridConfig::default(), layout);
    grid.load_rows(executions());
    assert!(column_values(&grid, COUNTRY).iter().all(String::is_empty));

    grid.set_mic_map(decode_mic_codes(MIC_CSV));
    assert_eq!(grid.cell_text(4, COUNTRY).as_deref(), Some("gb"));

    // The mapping carries over to the next search
    grid.load_rows(executions().into_iter().rev().collect());
    assert_eq!(grid.cell_text(1, COUNTRY).as_deref(), Some("gb"));
}

#[test]
fn test_unknown_mic_has_no_flag() {
    let mut rows = executions();
    rows[0].set("mic", "ZZZZ".into());
    let mut grid = loaded_grid();
    grid.load_rows(rows);
    assert_eq!(grid.cell_text(0, COUNTRY).as_deref(), Some(""));
    assert_eq!(grid.render_data().rows[0].cells[COUNTRY].flag, None);
}

#[test]
fn test_hidden_datetime_column_formats_when_shown() {
    let mut grid = loaded_grid();
    let at = grid.show_column("executionTime", Some(0)).unwrap();
    assert_eq!(at, 0);
    assert_eq!(grid.cell_text(0, 0).as_deref(), Some("03/05/2024, 14:07:09"));

    grid.show_column("quantity", None).unwrap();
    let last = grid.columns().len() - 1;
    assert_eq!(grid.cell_text(4, last).as_deref(), Some("900"));
}

#[test]
fn test_missing_config_degrades_to_empty() {
    let config: TableConfig = decode_or_default("table-columns.json", "<html>404</html>", decode_table_config);
    assert!(config.columns.is_empty());

    let catalog = FieldCatalog { fields: catalog() };
    let layout = ColumnLayout::from_config(config, catalog);
    assert!(layout.is_empty());
    assert_eq!(layout.hidden().len(), 10);
}

#[test]
fn test_missing_catalog_keeps_table_columns() {
    let table = decode_table_config(TABLE_COLUMNS_JSON).unwrap();
    let fields = decode_or_default("all-fields.json", "", decode_field_catalog);
    let mut grid = ExecutionGrid::default();
    grid.set_layout(ColumnLayout::from_config(table, fields));
    grid.load_rows(executions());
    assert_eq!(grid.columns().len(), 5);
    assert!(grid.hidden_fields().is_empty());
    assert_eq!(grid.cell_text(0, 0).as_deref(), Some("AAPL"));
}

#[test]
fn test_new_layout_resets_filters_and_selection() {
    let mut grid = loaded_grid();
    grid.toggle_value(1, "SELL").unwrap();
    grid.click(0, 0, false);
    grid.set_layout(ColumnLayout::new(catalog(), common::table_columns()));
    assert_eq!(grid.filtered_len(), 6);
    assert_eq!(grid.focused_cell(), None);
}

#[test]
fn test_country_codes_resolved_by_host() {
    let layout = ColumnLayout::new(catalog(), common::table_columns());
    let mut grid = ExecutionGrid::new(GridConfig::default(), layout);
    grid.load_rows(executions());
    let codes = CountryCodes::resolve(grid.rows(), &MicCountryMap::parse(MIC_CSV));
    assert_eq!(codes.len(), 6);
    grid.set_country_codes(codes);
    assert_eq!(grid.cell_text(3, COUNTRY).as_deref(), Some("fr"));
    assert_eq!(grid.country_codes().len(), 6);
}

#[test]
fn test_config_json_defaults() {
    let config = GridConfig::from_json(r#"{ "rowHeight": 30, "apiBaseUrl": "https://exec.example" }"#).unwrap();
    assert_eq!(config.row_height, 30.0);
    assert_eq!(config.buffer_size, 10);
    assert_eq!(config.api_base_url, "https://exec.example");
    assert!(GridConfig::from_json("42").is_err());
}

#[test]
fn test_mic_csv_tolerates_bad_lines() {
    let map = MicCountryMap::parse("header\nshort,line\n\nXNYS,,,,,,,,us\n");
    assert_eq!(map.len(), 1);
    assert_eq!(map.country_code(" xnys "), Some("us"));
}

#[test]
fn test_needs_render_tracking() {
    let mut grid = text_grid(3, 2);
    assert!(grid.take_needs_render());
    assert!(!grid.take_needs_render());
    grid.click(1, 1, false);
    assert!(grid.take_needs_render());
}
