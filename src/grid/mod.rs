//! Grid controller: the single owner of execution browser state.
//!
//! `ExecutionGrid` ties the pieces together:
//!
//! ```text
//! rows ──▶ FilterEngine ──▶ filtered indices ──▶ VirtualViewport ──▶ window
//!                                  │
//!            ColumnLayout ─────────┴──▶ (filtered-row, visible-column) cells
//! ```
//!
//! All mutation goes through `&mut self`. Hosts forward events (scroll,
//! mouse, keyboard, drag-and-drop, fetch results) and read back what to draw.
//! Indices passed in from the host are validated; out-of-range values are
//! rejected with [`GridError`] or ignored, never panicking.

mod clipboard;
mod events;
mod view;

pub use clipboard::{
    parse_tsv, sanitize_cell, to_tsv, write_with_fallback, ClipboardBackend, MemoryClipboard,
    PasteReport,
};
pub use events::{Key, KeyInput, KeyOutcome};
pub use view::{CellRenderData, GridRenderData, RowRenderData};

use serde::{Deserialize, Serialize};

use crate::column_filter::{self, FilterEngine};
use crate::error::{GridError, Result};
use crate::format::display_value;
use crate::layout::{
    popup_anchor, ColumnLayout, DragState, DropTarget, LayoutChange, LayoutProvider,
    VirtualViewport, VirtualWindow,
};
use crate::mic_country::{CountryCodes, MicCountryMap};
use crate::types::{
    CellBorders, CellPos, ColumnDescriptor, GridConfig, Row, Selection, SelectionPhase,
};

/// Message shown when a search returned no rows.
pub const NO_RESULTS_MESSAGE: &str = "No executions found";

/// What the grid area shows
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum GridStatus {
    /// No search has run yet
    #[default]
    Idle,
    /// A fetch is in flight
    Loading,
    /// The last search returned no rows (or failed)
    Empty,
    /// Rows are loaded
    Ready,
}

/// Execution browser state
#[derive(Debug)]
pub struct ExecutionGrid {
    config: GridConfig,
    rows: Vec<Row>,
    layout: ColumnLayout,
    filters: FilterEngine,
    /// Indices into `rows`, in row order
    filtered: Vec<usize>,
    viewport: VirtualViewport,
    focused: Option<CellPos>,
    selection: Option<Selection>,
    phase: SelectionPhase,
    drag: DragState,
    mic_map: Option<MicCountryMap>,
    countries: CountryCodes,
    active_filter: Option<usize>,
    status: GridStatus,
    needs_render: bool,
}

impl Default for ExecutionGrid {
    fn default() -> Self {
        Self::new(GridConfig::default(), ColumnLayout::default())
    }
}

impl ExecutionGrid {
    pub fn new(config: GridConfig, layout: ColumnLayout) -> Self {
        let viewport = VirtualViewport::new(&config);
        Self {
            config,
            rows: Vec::new(),
            layout,
            filters: FilterEngine::new(),
            filtered: Vec::new(),
            viewport,
            focused: None,
            selection: None,
            phase: SelectionPhase::Idle,
            drag: DragState::Idle,
            mic_map: None,
            countries: CountryCodes::default(),
            active_filter: None,
            status: GridStatus::Idle,
            needs_render: false,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn status(&self) -> GridStatus {
        self.status
    }

    /// Text of the "no results" state, when it is showing.
    pub fn empty_message(&self) -> Option<&'static str> {
        (self.status == GridStatus::Empty).then_some(NO_RESULTS_MESSAGE)
    }

    /// Whether anything changed since the last call.
    pub fn take_needs_render(&mut self) -> bool {
        std::mem::take(&mut self.needs_render)
    }

    // ------------------------------------------------------------------
    // Row store
    // ------------------------------------------------------------------

    /// A search started; the previous rows stay until the result arrives.
    pub fn begin_loading(&mut self) {
        self.status = GridStatus::Loading;
        self.needs_render = true;
    }

    /// Replace the row store wholesale with a search result.
    ///
    /// Filters, selection and the scroll position are reset; the column
    /// layout is kept.
    pub fn load_rows(&mut self, rows: Vec<Row>) {
        tracing::debug!(rows = rows.len(), "loading executions");
        self.rows = rows;
        self.filters.reset();
        self.active_filter = None;
        self.countries = match &self.mic_map {
            Some(map) => CountryCodes::resolve(&self.rows, map),
            None => CountryCodes::default(),
        };
        self.status = if self.rows.is_empty() {
            GridStatus::Empty
        } else {
            GridStatus::Ready
        };
        self.apply_filters();
    }

    /// A search failed: empty the store and show the "no results" state.
    pub fn fetch_failed(&mut self, error: &GridError) {
        tracing::error!(error = %error, "failed to fetch executions");
        self.load_rows(Vec::new());
    }

    /// Install the MIC mapping and resolve country codes for the current rows.
    ///
    /// The mapping is kept for later searches.
    pub fn set_mic_map(&mut self, map: MicCountryMap) {
        self.countries = CountryCodes::resolve(&self.rows, &map);
        self.mic_map = Some(map);
        self.needs_render = true;
    }

    /// Replace the resolved country codes directly.
    pub fn set_country_codes(&mut self, codes: CountryCodes) {
        self.countries = codes;
        self.needs_render = true;
    }

    pub fn country_codes(&self) -> &CountryCodes {
        &self.countries
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows passing the filters.
    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// Row at position `index` of the filtered sequence.
    pub fn filtered_row(&self, index: usize) -> Option<&Row> {
        self.filtered.get(index).and_then(|&i| self.rows.get(i))
    }

    /// Rows passing the filters, in order.
    pub fn filtered_rows(&self) -> impl Iterator<Item = &Row> {
        self.filtered.iter().filter_map(|&i| self.rows.get(i))
    }

    fn filtered_row_mut(&mut self, index: usize) -> Option<&mut Row> {
        let i = *self.filtered.get(index)?;
        self.rows.get_mut(i)
    }

    // ------------------------------------------------------------------
    // Column filters
    // ------------------------------------------------------------------

    fn column(&self, col: usize) -> Result<&ColumnDescriptor> {
        self.layout.get(col).ok_or(GridError::ColumnOutOfRange {
            index: col,
            len: self.layout.len(),
        })
    }

    /// Distinct display values of a column over all loaded rows.
    pub fn unique_values(&self, col: usize) -> Vec<String> {
        self.layout
            .get(col)
            .map(|c| column_filter::unique_values(&self.rows, c, &self.countries))
            .unwrap_or_default()
    }

    /// Unique values of a column matching `search`.
    pub fn filtered_values(&self, col: usize, search: &str) -> Vec<String> {
        column_filter::matching_values(&self.unique_values(col), search)
    }

    /// Values offered by the popup of a column, under its current search text.
    pub fn popup_values(&self, col: usize) -> Vec<String> {
        self.filtered_values(col, self.filter_search_text(col))
    }

    pub fn set_filter_search(&mut self, col: usize, text: &str) -> Result<()> {
        let field = self.column(col)?.field.clone();
        self.filters.set_search_text(&field, text);
        self.needs_render = true;
        Ok(())
    }

    pub fn filter_search_text(&self, col: usize) -> &str {
        self.layout
            .get(col)
            .map_or("", |c| self.filters.search_text(&c.field))
    }

    /// Flip one value of a column filter and re-filter.
    pub fn toggle_value(&mut self, col: usize, value: &str) -> Result<bool> {
        let field = self.column(col)?.field.clone();
        let selected = self.filters.toggle_value(&field, value);
        self.apply_filters();
        Ok(selected)
    }

    /// Select or deselect every value currently offered by the popup.
    pub fn toggle_select_all(&mut self, col: usize, selected: bool) -> Result<()> {
        let field = self.column(col)?.field.clone();
        let values = self.popup_values(col);
        self.filters.set_values(&field, &values, selected);
        self.apply_filters();
        Ok(())
    }

    /// Empty a column filter and its search text, then re-filter.
    pub fn clear_filter(&mut self, col: usize) -> Result<()> {
        let field = self.column(col)?.field.clone();
        self.filters.clear(&field);
        self.apply_filters();
        Ok(())
    }

    /// Recompute the filtered sequence and move back to the top.
    pub fn apply_filters(&mut self) {
        self.filtered = column_filter::apply_filters(
            &self.rows,
            self.layout.columns(),
            &self.filters,
            &self.countries,
        );
        tracing::debug!(
            passing = self.filtered.len(),
            total = self.rows.len(),
            "filters applied"
        );
        self.clear_selection();
        self.viewport.reset(self.filtered.len());
        self.needs_render = true;
    }

    pub fn has_active_filter(&self, col: usize) -> bool {
        self.layout
            .get(col)
            .is_some_and(|c| self.filters.is_active(&c.field))
    }

    /// Number of selected values in a column filter.
    pub fn filter_count(&self, col: usize) -> usize {
        self.layout
            .get(col)
            .map_or(0, |c| self.filters.selected_count(&c.field))
    }

    /// Occurrences of `value` in a column over all loaded rows.
    pub fn value_count(&self, col: usize, value: &str) -> usize {
        self.layout.get(col).map_or(0, |c| {
            column_filter::value_count(&self.rows, c, &self.countries, value)
        })
    }

    pub fn is_value_selected(&self, col: usize, value: &str) -> bool {
        self.layout
            .get(col)
            .is_some_and(|c| self.filters.is_selected(&c.field, value))
    }

    /// Whether every value offered by the popup is selected.
    ///
    /// False when nothing matches the search.
    pub fn are_all_values_selected(&self, col: usize) -> bool {
        let Some(column) = self.layout.get(col) else {
            return false;
        };
        let values = self.popup_values(col);
        !values.is_empty()
            && values
                .iter()
                .all(|v| self.filters.is_selected(&column.field, v))
    }

    /// Open the filter popup of `col`, or close it if it is already open.
    pub fn toggle_filter_popup(&mut self, col: usize) -> Result<()> {
        self.column(col)?;
        self.active_filter = if self.active_filter == Some(col) {
            None
        } else {
            Some(col)
        };
        self.needs_render = true;
        Ok(())
    }

    /// Close the open filter popup; returns whether one was open.
    pub fn close_filter_popup(&mut self) -> bool {
        let was_open = self.active_filter.take().is_some();
        if was_open {
            self.needs_render = true;
        }
        was_open
    }

    /// Column whose filter popup is open.
    pub fn active_filter(&self) -> Option<usize> {
        self.active_filter
    }

    /// Where to place the open filter popup.
    pub fn filter_popup_anchor(&self, provider: &dyn LayoutProvider) -> Option<(f64, f64)> {
        self.active_filter.map(|col| popup_anchor(provider, col))
    }

    // ------------------------------------------------------------------
    // Column layout
    // ------------------------------------------------------------------

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        self.layout.columns()
    }

    pub fn hidden_fields(&self) -> &[ColumnDescriptor] {
        self.layout.hidden()
    }

    /// Install a new column layout (configuration loaded).
    pub fn set_layout(&mut self, layout: ColumnLayout) {
        self.layout = layout;
        self.drag.end();
        self.filters.reset();
        self.apply_filters();
        self.after_layout_change();
    }

    pub fn reorder_columns(&mut self, from: usize, to: usize) -> Result<()> {
        self.layout.reorder(from, to)?;
        if from != to {
            self.after_layout_change();
        }
        Ok(())
    }

    /// Hide a visible column; its filter is dropped.
    pub fn hide_column(&mut self, col: usize) -> Result<ColumnDescriptor> {
        let column = self.layout.hide(col)?;
        self.on_layout_change(&LayoutChange::Hidden {
            field: column.field.clone(),
        });
        Ok(column)
    }

    /// Show a hidden field at `at`, or at the end.
    pub fn show_column(&mut self, field: &str, at: Option<usize>) -> Result<usize> {
        let index = self.layout.show(field, at)?;
        self.after_layout_change();
        Ok(index)
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn start_column_drag(&mut self, col: usize) -> Result<()> {
        self.column(col)?;
        self.drag.start_column(col);
        Ok(())
    }

    pub fn start_field_drag(&mut self, field: &str) -> Result<()> {
        if !self.layout.hidden().iter().any(|c| c.field == field) {
            return Err(GridError::UnknownField(field.to_string()));
        }
        self.drag.start_hidden_field(field);
        Ok(())
    }

    pub fn drag_over(&mut self, target: DropTarget) -> bool {
        let accepted = self.drag.drag_over(target);
        self.needs_render = true;
        accepted
    }

    pub fn drag_leave(&mut self) {
        self.drag.drag_leave();
        self.needs_render = true;
    }

    /// Finish the current drag on `target`.
    pub fn drop_on(&mut self, target: DropTarget) -> Option<LayoutChange> {
        let change = self.drag.drop_on(target, &mut self.layout);
        if let Some(change) = &change {
            self.on_layout_change(change);
        }
        self.needs_render = true;
        change
    }

    pub fn end_drag(&mut self) {
        self.drag.end();
        self.needs_render = true;
    }

    fn on_layout_change(&mut self, change: &LayoutChange) {
        if let LayoutChange::Hidden { field } = change {
            if self.filters.remove(field) {
                tracing::debug!(field = %field, "filter dropped with hidden column");
                self.active_filter = None;
                self.apply_filters();
                return;
            }
        }
        self.after_layout_change();
    }

    fn after_layout_change(&mut self) {
        self.active_filter = None;
        self.clear_selection();
        self.needs_render = true;
    }

    // ------------------------------------------------------------------
    // Virtual viewport
    // ------------------------------------------------------------------

    pub fn viewport(&self) -> &VirtualViewport {
        &self.viewport
    }

    pub fn on_scroll(&mut self, scroll_offset: f64, container_height: f64) -> VirtualWindow {
        let previous = self.viewport.window();
        let window = self
            .viewport
            .on_scroll(scroll_offset, container_height, self.filtered.len());
        if window != previous {
            self.needs_render = true;
        }
        window
    }

    pub fn on_resize(&mut self, container_height: f64) -> VirtualWindow {
        self.needs_render = true;
        self.viewport.resize(container_height, self.filtered.len())
    }

    /// Pull container metrics from a layout provider.
    pub fn sync_viewport(&mut self, provider: &dyn LayoutProvider) -> VirtualWindow {
        match provider.scroll_metrics() {
            Some(m) => self.on_scroll(m.scroll_top, m.client_height),
            None => {
                self.viewport.detach();
                self.viewport.update(self.filtered.len())
            }
        }
    }

    pub fn visible_window(&self) -> VirtualWindow {
        self.viewport.window()
    }

    /// Materialized rows with their filtered index.
    pub fn visible_rows(&self) -> impl Iterator<Item = (usize, &Row)> {
        self.viewport
            .window()
            .range()
            .filter_map(|i| self.filtered_row(i).map(|row| (i, row)))
    }

    pub fn top_spacer(&self) -> f64 {
        self.viewport.top_spacer()
    }

    pub fn bottom_spacer(&self) -> f64 {
        self.viewport.bottom_spacer(self.filtered.len())
    }

    // ------------------------------------------------------------------
    // Cells and selection
    // ------------------------------------------------------------------

    /// Display text of a cell in (filtered-row, visible-column) space.
    pub fn cell_text(&self, row: usize, col: usize) -> Option<String> {
        let record = self.filtered_row(row)?;
        let column = self.layout.get(col)?;
        Some(display_value(record, column, &self.countries))
    }

    fn in_bounds(&self, pos: CellPos) -> bool {
        pos.row < self.filtered.len() && pos.col < self.layout.len()
    }

    pub fn focused_cell(&self) -> Option<CellPos> {
        self.focused
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn selection_phase(&self) -> SelectionPhase {
        self.phase
    }

    pub fn clear_selection(&mut self) {
        if self.focused.is_some() || self.selection.is_some() {
            self.needs_render = true;
        }
        self.focused = None;
        self.selection = None;
        self.phase = SelectionPhase::Idle;
    }

    pub fn is_selected(&self, row: usize, col: usize) -> bool {
        self.selection.is_some_and(|s| s.contains(row, col))
    }

    pub fn is_focused(&self, row: usize, col: usize) -> bool {
        self.focused == Some(CellPos::new(row, col))
    }

    pub fn is_selection_start(&self, row: usize, col: usize) -> bool {
        self.selection
            .is_some_and(|s| s.start == CellPos::new(row, col))
    }

    pub fn is_selection_end(&self, row: usize, col: usize) -> bool {
        self.selection.is_some_and(|s| s.end == CellPos::new(row, col))
    }

    /// Outline edges of a cell.
    pub fn cell_borders(&self, row: usize, col: usize) -> CellBorders {
        self.selection
            .map(|s| s.borders(row, col))
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::layout::StaticLayout;
    use crate::types::ColumnType;

    fn grid() -> ExecutionGrid {
        let catalog = vec![
            ColumnDescriptor::text("orderId", "Order"),
            ColumnDescriptor::text("trader", "Trader"),
            ColumnDescriptor::text("side", "Side"),
            ColumnDescriptor::new("price", "Price", Some(ColumnType::Decimal)),
            ColumnDescriptor::text("book", "Book"),
        ];
        let visible = catalog.iter().take(4).cloned().collect();
        let mut grid = ExecutionGrid::new(GridConfig::default(), ColumnLayout::new(catalog, visible));
        grid.load_rows(vec![
            Row::new().with("orderId", "O1").with("trader", "alice").with("side", "BUY").with("price", 10.0),
            Row::new().with("orderId", "O2").with("trader", "bob").with("side", "SELL").with("price", 11.0),
            Row::new().with("orderId", "O3").with("trader", "alice").with("side", "SELL").with("price", 12.0),
        ]);
        grid
    }

    #[test]
    fn test_load_rows_sets_status() {
        let mut g = grid();
        assert_eq!(g.status(), GridStatus::Ready);
        assert_eq!(g.filtered_len(), 3);
        assert_eq!(g.visible_window().range(), 0..3);

        g.fetch_failed(&GridError::Fetch("connection refused".into()));
        assert_eq!(g.status(), GridStatus::Empty);
        assert_eq!(g.empty_message(), Some(NO_RESULTS_MESSAGE));
        assert!(g.visible_window().is_empty());
    }

    #[test]
    fn test_filter_by_index_follows_field() {
        let mut g = grid();
        assert!(g.toggle_value(1, "alice").unwrap());
        assert_eq!(g.filtered_len(), 2);
        assert!(g.has_active_filter(1));

        // Move "trader" to the front; the filter moves with it
        g.reorder_columns(1, 0).unwrap();
        assert!(g.has_active_filter(0));
        assert!(!g.has_active_filter(1));
        assert_eq!(g.filtered_len(), 2);
    }

    #[test]
    fn test_unique_values_ignore_other_filters() {
        let mut g = grid();
        g.toggle_value(2, "BUY").unwrap();
        assert_eq!(g.filtered_len(), 1);
        assert_eq!(g.unique_values(1), vec!["alice", "bob"]);
        assert_eq!(g.value_count(1, "alice"), 2);
    }

    #[test]
    fn test_select_all_respects_search() {
        let mut g = grid();
        g.set_filter_search(1, "AL").unwrap();
        assert!(!g.are_all_values_selected(1));
        g.toggle_select_all(1, true).unwrap();
        assert!(g.are_all_values_selected(1));
        assert!(g.is_value_selected(1, "alice"));
        assert!(!g.is_value_selected(1, "bob"));
        assert_eq!(g.filter_count(1), 1);

        g.set_filter_search(1, "zzz").unwrap();
        assert!(!g.are_all_values_selected(1));

        g.clear_filter(1).unwrap();
        assert_eq!(g.filter_search_text(1), "");
        assert_eq!(g.filtered_len(), 3);
    }

    #[test]
    fn test_hiding_filtered_column_drops_filter() {
        let mut g = grid();
        g.toggle_value(2, "SELL").unwrap();
        assert_eq!(g.filtered_len(), 2);
        g.hide_column(2).unwrap();
        assert_eq!(g.filtered_len(), 3);

        // Showing it again does not bring the filter back
        g.show_column("side", Some(2)).unwrap();
        assert!(!g.has_active_filter(2));
    }

    #[test]
    fn test_new_search_resets_filters_keeps_layout() {
        let mut g = grid();
        g.hide_column(0).unwrap();
        g.toggle_value(0, "bob").unwrap();
        let rows = g.rows().to_vec();
        g.load_rows(rows);
        assert!(!g.has_active_filter(0));
        assert_eq!(g.columns().len(), 3);
        assert_eq!(g.filtered_len(), 3);
    }

    #[test]
    fn test_filter_popup() {
        let mut g = grid();
        let layout = StaticLayout::uniform(4, 100.0, 50.0);
        assert_eq!(g.filter_popup_anchor(&layout), None);
        g.toggle_filter_popup(1).unwrap();
        assert_eq!(g.filter_popup_anchor(&layout), Some((100.0, 54.0)));
        g.toggle_filter_popup(1).unwrap();
        assert_eq!(g.active_filter(), None);
        g.toggle_filter_popup(3).unwrap();
        assert!(g.close_filter_popup());
        assert!(!g.close_filter_popup());
        assert!(g.toggle_filter_popup(9).is_err());
    }

    #[test]
    fn test_drag_hidden_field_onto_column() {
        let mut g = grid();
        g.start_field_drag("book").unwrap();
        assert!(g.drag_over(DropTarget::Column(0)));
        let change = g.drop_on(DropTarget::Column(0));
        assert!(matches!(change, Some(LayoutChange::Shown { index: 0, .. })));
        assert_eq!(g.columns()[0].field, "book");
        assert!(g.hidden_fields().is_empty());
        assert!(g.start_field_drag("book").is_err());
    }

    #[test]
    fn test_cell_text_and_bounds() {
        let g = grid();
        assert_eq!(g.cell_text(1, 3).as_deref(), Some("11.00"));
        assert_eq!(g.cell_text(3, 0), None);
        assert_eq!(g.cell_text(0, 4), None);
    }

    #[test]
    fn test_sync_viewport_without_metrics() {
        let mut g = grid();
        let window = g.sync_viewport(&StaticLayout::default());
        assert_eq!(window.range(), 0..3);
        let window = g.sync_viewport(&StaticLayout::default().with_metrics(0.0, 420.0));
        assert_eq!(window.range(), 0..3);
        assert_eq!(g.bottom_spacer(), 0.0);
    }
}
