//! Common test fixtures for the execution grid.
//!
//! Builds small, realistic execution data sets plus the column configuration
//! the dashboard ships with.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use execgrid::api::{decode_field_catalog, decode_rows, decode_table_config};
use execgrid::layout::ColumnLayout;
use execgrid::mic_country::MicCountryMap;
use execgrid::{ColumnDescriptor, ExecutionGrid, GridConfig, Row};

/// `all-fields.json`
pub const ALL_FIELDS_JSON: &str = r#"{
  "fields": [
    { "field": "orderId", "header": "Order ID" },
    { "field": "bloombergLongTicker", "header": "Ticker" },
    { "field": "side", "header": "Side" },
    { "field": "trader", "header": "Trader" },
    { "field": "book", "header": "Book" },
    { "field": "quantity", "header": "Quantity", "type": "number" },
    { "field": "price", "header": "Price", "type": "decimal" },
    { "field": "executionTime", "header": "Execution Time", "type": "datetime" },
    { "field": "mic", "header": "MIC" },
    { "field": "country", "header": "Country", "type": "flag" }
  ]
}"#;

/// `table-columns.json`
pub const TABLE_COLUMNS_JSON: &str = r#"{
  "columns": [
    { "field": "bloombergLongTicker", "header": "Ticker" },
    { "field": "side", "header": "Side" },
    { "field": "trader", "header": "Trader" },
    { "field": "price", "header": "Price", "type": "decimal" },
    { "field": "country", "header": "Country", "type": "flag" }
  ]
}"#;

/// Excerpt of the ISO 10383 MIC list.
pub const MIC_CSV: &str = "\
MIC,OPERATING MIC,OPRT/SGMT,MARKET NAME-INSTITUTION DESCRIPTION,LEGAL ENTITY NAME,LEI,MARKET CATEGORY CODE,ACRONYM,ISO COUNTRY CODE (ISO 3166),CITY\n\
XNAS,XNAS,OPRT,NASDAQ - ALL MARKETS,\"NASDAQ, INC.\",,NSPD,NASDAQ,US,NEW YORK\n\
XPAR,XPAR,OPRT,EURONEXT - EURONEXT PARIS,EURONEXT PARIS,,RMKT,,FR,PARIS\n\
XLON,XLON,OPRT,LONDON STOCK EXCHANGE,LONDON STOCK EXCHANGE PLC,,RMKT,LSE,GB,LONDON\n";

/// Executions response body.
pub const EXECUTIONS_JSON: &str = r#"[
  { "executionId": 1, "orderId": "ORD-1", "bloombergLongTicker": "AAPL", "side": "BUY",  "trader": "alice", "book": "EQ1", "quantity": 100, "price": 189.5,  "executionTime": "2024-03-05T14:07:09.123Z", "mic": "XNAS" },
  { "executionId": 2, "orderId": "ORD-2", "bloombergLongTicker": "MSFT", "side": "SELL", "trader": "bob",   "book": "EQ1", "quantity": 250, "price": 402.25, "executionTime": "2024-03-05T14:08:00.000Z", "mic": "XNAS" },
  { "executionId": 3, "orderId": "ORD-3", "bloombergLongTicker": "GOOG", "side": "BUY",  "trader": "alice", "book": "EQ2", "quantity": 75,  "price": 141.8,  "executionTime": "2024-03-05T15:30:00.000Z", "mic": "XNAS" },
  { "executionId": 4, "orderId": "ORD-4", "bloombergLongTicker": "AIR",  "side": "SELL", "trader": "carol", "book": "EU1", "quantity": 40,  "price": 168.02, "executionTime": "2024-03-06T08:00:00.000Z", "mic": "XPAR" },
  { "executionId": 5, "orderId": "ORD-5", "bloombergLongTicker": "VOD",  "side": "BUY",  "trader": "bob",   "book": "EU2", "quantity": 900, "price": 0.72,   "executionTime": "2024-03-06T09:15:00.000Z", "mic": "XLON" },
  { "executionId": 6, "orderId": "ORD-6", "bloombergLongTicker": "BNP",  "side": "BUY",  "trader": "carol", "book": "EU1", "quantity": 60,  "price": 64.1,   "executionTime": "2024-03-06T10:45:00.000Z", "mic": "XPAR" }
]"#;

pub fn catalog() -> Vec<ColumnDescriptor> {
    decode_field_catalog(ALL_FIELDS_JSON).unwrap().fields
}

pub fn table_columns() -> Vec<ColumnDescriptor> {
    decode_table_config(TABLE_COLUMNS_JSON).unwrap().columns
}

pub fn executions() -> Vec<Row> {
    decode_rows(EXECUTIONS_JSON).unwrap()
}

/// Grid with the shipped configuration, MIC mapping and executions loaded.
pub fn loaded_grid() -> ExecutionGrid {
    let layout = ColumnLayout::new(catalog(), table_columns());
    let mut grid = ExecutionGrid::new(GridConfig::default(), layout);
    grid.set_mic_map(MicCountryMap::parse(MIC_CSV));
    grid.load_rows(executions());
    grid
}

/// Grid of text columns `f0..f{cols}` with `rows` rows of `r{r}c{c}`.
pub fn text_grid(rows: usize, cols: usize) -> ExecutionGrid {
    let catalog: Vec<_> = (0..cols)
        .map(|c| ColumnDescriptor::text(&format!("f{c}"), &format!("F{c}")))
        .collect();
    let mut grid = ExecutionGrid::new(GridConfig::default(), ColumnLayout::all_visible(catalog));
    grid.load_rows(
        (0..rows)
            .map(|r| (0..cols).fold(Row::new(), |row, c| row.with(&format!("f{c}"), format!("r{r}c{c}"))))
            .collect(),
    );
    grid
}

/// Visible field names, in order.
pub fn visible_fields(grid: &ExecutionGrid) -> Vec<String> {
    grid.columns().iter().map(|c| c.field.clone()).collect()
}

/// Hidden field names, in catalog order.
pub fn hidden_fields(grid: &ExecutionGrid) -> Vec<String> {
    grid.hidden_fields().iter().map(|c| c.field.clone()).collect()
}

/// Filtered display values of one column.
pub fn column_values(grid: &ExecutionGrid, col: usize) -> Vec<String> {
    (0..grid.filtered_len())
        .map(|r| grid.cell_text(r, col).unwrap())
        .collect()
}
