//! Browser bindings: the WASM-exported `ExecutionBrowser`.
//!
//! Wraps an [`ExecutionGrid`] shared through `Rc<RefCell<_>>` so async tasks
//! (fetch, clipboard) can apply their results after they resolve. Borrows are
//! only held inside synchronous sections, never across an `.await`.
//!
//! ```javascript
//! import init, { ExecutionBrowser } from 'execgrid';
//! await init();
//! const grid = new ExecutionBrowser(document.querySelector('.grid'), null);
//! grid.setRenderCallback(() => draw(grid.renderData()));
//! await grid.loadConfig();
//! await grid.search('testApi', '2024-03-05 09:30:00');
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Function, Promise};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local, JsFuture};
use web_sys::{Element, HtmlDocument, HtmlElement, HtmlTextAreaElement};

use crate::api::{
    decode_field_catalog, decode_mic_codes, decode_or_default, decode_rows, decode_table_config,
    execution_request, fetch_text, ApiRequest, ExecutionSource,
};
use crate::error::{GridError, Result};
use crate::format::parse_datetime;
use crate::grid::{ClipboardBackend, ExecutionGrid, Key, KeyInput, KeyOutcome};
use crate::layout::{ColumnLayout, DropTarget, LayoutProvider, Rect, ScrollMetrics};
use crate::types::{FieldCatalog, GridConfig, TableConfig};

/// Class of the scroll container inside the grid root.
const SCROLL_CONTAINER_SELECTOR: &str = ".table-wrapper";

type RenderCallback = Rc<RefCell<Option<Function>>>;

fn to_js<T: Serialize>(value: &T) -> std::result::Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn invoke_render_callback(callback: &RenderCallback) {
    let callback = callback.borrow().clone();
    if let Some(cb) = callback {
        let _ = cb.call0(&JsValue::NULL);
    }
}

/// Move the scroll container to the grid's scroll offset when they differ
/// (filters reset it, keyboard navigation moves it).
#[allow(clippy::cast_possible_truncation)]
fn push_scroll_offset(root: &Element, grid: &ExecutionGrid) {
    let offset = grid.viewport().scroll_offset;
    let Ok(Some(wrapper)) = root.query_selector(SCROLL_CONTAINER_SELECTOR) else {
        return;
    };
    if (f64::from(wrapper.scroll_top()) - offset).abs() >= 1.0 {
        wrapper.set_scroll_top(offset.round() as i32);
    }
}

/// Apply a finished async result: sync the DOM scroll position, then redraw.
fn finish_async_update(state: &Rc<RefCell<ExecutionGrid>>, root: &Element, render: &RenderCallback) {
    {
        let mut grid = state.borrow_mut();
        push_scroll_offset(root, &grid);
        grid.take_needs_render();
    }
    invoke_render_callback(render);
}

/// `navigator.clipboard`, absent outside secure contexts.
fn clipboard_api() -> Option<web_sys::Clipboard> {
    let navigator = web_sys::window()?.navigator();
    let value = js_sys::Reflect::get(&navigator, &JsValue::from_str("clipboard")).ok()?;
    if value.is_undefined() || value.is_null() {
        return None;
    }
    Some(value.unchecked_into())
}

/// Geometry read from the rendered grid DOM.
struct DomLayout<'a> {
    root: &'a Element,
}

impl LayoutProvider for DomLayout<'_> {
    fn header_rect(&self, col: usize) -> Option<Rect> {
        let header = self
            .root
            .query_selector(&format!("th[data-col-index=\"{col}\"]"))
            .ok()??;
        let r = header.get_bounding_client_rect();
        Some(Rect::new(r.left(), r.top(), r.width(), r.height()))
    }

    fn scroll_metrics(&self) -> Option<ScrollMetrics> {
        let wrapper = self.root.query_selector(SCROLL_CONTAINER_SELECTOR).ok()??;
        Some(ScrollMetrics {
            scroll_top: f64::from(wrapper.scroll_top()),
            client_height: f64::from(wrapper.client_height()),
        })
    }
}

/// Off-screen textarea plus `execCommand("copy")`, for browsers without
/// the async clipboard API.
struct TextareaClipboard;

impl ClipboardBackend for TextareaClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        let err = |e: JsValue| GridError::Clipboard(format!("{e:?}"));
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| GridError::Clipboard("no document".into()))?;
        let body = document
            .body()
            .ok_or_else(|| GridError::Clipboard("no body".into()))?;
        let textarea: HtmlTextAreaElement = document
            .create_element("textarea")
            .map_err(err)?
            .dyn_into()
            .map_err(|_| GridError::Clipboard("not a textarea".into()))?;
        textarea.set_value(text);
        let style = textarea.style();
        style.set_property("position", "fixed").map_err(err)?;
        style.set_property("left", "-999999px").map_err(err)?;
        style.set_property("top", "-999999px").map_err(err)?;
        body.append_child(&textarea).map_err(err)?;
        let _ = textarea.focus();
        textarea.select();
        let copied = document
            .dyn_ref::<HtmlDocument>()
            .map(|d| d.exec_command("copy"));
        let _ = body.remove_child(&textarea);
        match copied {
            Some(Ok(true)) => Ok(()),
            Some(Ok(false)) => Err(GridError::Clipboard("copy command refused".into())),
            Some(Err(e)) => Err(err(e)),
            None => Err(GridError::Clipboard("document is not an HTML document".into())),
        }
    }

    fn read_text(&mut self) -> Result<String> {
        Err(GridError::Clipboard(
            "reading is not supported without the clipboard API".into(),
        ))
    }
}

/// Write to the async clipboard API, falling back to the textarea method.
async fn write_clipboard(text: String) {
    if let Some(clipboard) = clipboard_api() {
        match JsFuture::from(clipboard.write_text(&text)).await {
            Ok(_) => return,
            Err(e) => tracing::warn!(error = ?e, "clipboard API write failed, trying fallback"),
        }
    } else {
        tracing::debug!("clipboard API unavailable, using textarea copy");
    }
    if let Err(e) = TextareaClipboard.write_text(&text) {
        tracing::error!(error = %e, "fallback clipboard write failed");
    }
}

/// Read the clipboard and paste at the focused cell.
async fn paste_from_clipboard(state: Rc<RefCell<ExecutionGrid>>, root: Element, render: RenderCallback) {
    let Some(clipboard) = clipboard_api() else {
        tracing::error!("clipboard API unavailable, paste ignored");
        return;
    };
    let text = match JsFuture::from(clipboard.read_text()).await {
        Ok(value) => value.as_string().unwrap_or_default(),
        Err(e) => {
            tracing::error!(error = ?e, "failed to read clipboard");
            return;
        }
    };
    state.borrow_mut().paste_text(&text);
    finish_async_update(&state, &root, &render);
}

/// Layout from the two config assets, degrading on failures.
fn layout_from_assets(table: Result<String>, catalog: Result<String>) -> ColumnLayout {
    let table = match table {
        Ok(text) => decode_or_default("table-columns.json", &text, decode_table_config),
        Err(e) => {
            tracing::warn!(error = %e, "table-columns.json unavailable");
            TableConfig::default()
        }
    };
    let catalog = match catalog {
        Ok(text) => decode_or_default("all-fields.json", &text, decode_field_catalog),
        Err(e) => {
            tracing::warn!(error = %e, "all-fields.json unavailable");
            FieldCatalog::default()
        }
    };
    ColumnLayout::from_config(table, catalog)
}

fn parse_drop_target(kind: &str, index: Option<usize>) -> Option<DropTarget> {
    match (kind, index) {
        ("column", Some(i)) => Some(DropTarget::Column(i)),
        ("hidden", _) => Some(DropTarget::HiddenPool),
        ("end", _) => Some(DropTarget::EndZone),
        _ => None,
    }
}

fn parse_source(source: &str, count: usize) -> std::result::Result<ExecutionSource, JsValue> {
    match source {
        "list" => Ok(ExecutionSource::List { count }),
        "testApi" => Ok(ExecutionSource::TestApi),
        "real" => Ok(ExecutionSource::Real),
        other => Err(JsValue::from_str(&format!("unknown execution source: {other}"))),
    }
}

/// The execution browser grid, exported to JavaScript.
#[wasm_bindgen]
pub struct ExecutionBrowser {
    state: Rc<RefCell<ExecutionGrid>>,
    root: Element,
    render_callback: RenderCallback,
}

impl ExecutionBrowser {
    fn after_update(&self) {
        let needs_render = {
            let mut grid = self.state.borrow_mut();
            push_scroll_offset(&self.root, &grid);
            grid.take_needs_render()
        };
        if needs_render {
            invoke_render_callback(&self.render_callback);
        }
    }
}

#[wasm_bindgen]
impl ExecutionBrowser {
    /// Create a grid bound to its root element.
    ///
    /// `config` is an optional `GridConfig` object; missing keys take their
    /// defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(root: Element, config: JsValue) -> std::result::Result<ExecutionBrowser, JsValue> {
        console_error_panic_hook::set_once();
        let config: GridConfig = if config.is_null() || config.is_undefined() {
            GridConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        Ok(ExecutionBrowser {
            state: Rc::new(RefCell::new(ExecutionGrid::new(config, ColumnLayout::default()))),
            root,
            render_callback: Rc::new(RefCell::new(None)),
        })
    }

    /// Function called whenever the grid needs to be redrawn.
    #[wasm_bindgen(js_name = "setRenderCallback")]
    pub fn set_render_callback(&self, callback: Option<Function>) {
        *self.render_callback.borrow_mut() = callback;
    }

    /// Fetch the column configuration, field catalog and MIC mapping.
    ///
    /// Missing or malformed assets degrade to empty defaults.
    #[wasm_bindgen(js_name = "loadConfig")]
    pub fn load_config(&self) -> Promise {
        let state = Rc::clone(&self.state);
        let root = self.root.clone();
        let render = Rc::clone(&self.render_callback);
        let config = state.borrow().config().clone();
        future_to_promise(async move {
            let table = fetch_text(&ApiRequest::get(&config.table_columns_path)).await;
            let catalog = fetch_text(&ApiRequest::get(&config.all_fields_path)).await;
            state.borrow_mut().set_layout(layout_from_assets(table, catalog));
            finish_async_update(&state, &root, &render);

            match fetch_text(&ApiRequest::get(&config.mic_codes_path)).await {
                Ok(text) => state.borrow_mut().set_mic_map(decode_mic_codes(&text)),
                Err(e) => tracing::warn!(error = %e, "MIC codes unavailable, flags disabled"),
            }
            finish_async_update(&state, &root, &render);
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Apply configuration JSON already held by the host.
    ///
    /// `fields` may be empty, in which case the table columns form the catalog.
    #[wasm_bindgen(js_name = "setConfig")]
    pub fn set_config(&self, table: &str, fields: &str) -> std::result::Result<(), JsValue> {
        let table = decode_table_config(table)?;
        let catalog = if fields.trim().is_empty() {
            FieldCatalog::default()
        } else {
            decode_field_catalog(fields)?
        };
        self.state
            .borrow_mut()
            .set_layout(ColumnLayout::from_config(table, catalog));
        self.after_update();
        Ok(())
    }

    /// Run a search against `source` (`list`, `testApi` or `real`).
    ///
    /// `start` is an optional timestamp; `count` applies to `list`.
    pub fn search(
        &self,
        source: &str,
        start: Option<String>,
        count: Option<usize>,
    ) -> std::result::Result<Promise, JsValue> {
        let source = parse_source(source, count.unwrap_or(10))?;
        let start = start.as_deref().and_then(parse_datetime);
        let request = {
            let mut grid = self.state.borrow_mut();
            grid.begin_loading();
            execution_request(&grid.config().api_base_url, source, start.as_ref())
        };
        self.after_update();

        let state = Rc::clone(&self.state);
        let root = self.root.clone();
        let render = Rc::clone(&self.render_callback);
        Ok(future_to_promise(async move {
            let result = match fetch_text(&request).await {
                Ok(text) => decode_rows(&text),
                Err(e) => Err(e),
            };
            {
                let mut grid = state.borrow_mut();
                match result {
                    Ok(rows) => grid.load_rows(rows),
                    Err(e) => grid.fetch_failed(&e),
                }
            }
            finish_async_update(&state, &root, &render);
            Ok(JsValue::UNDEFINED)
        }))
    }

    /// Replace the rows with a JSON array.
    #[wasm_bindgen(js_name = "loadRows")]
    pub fn load_rows(&self, json: &str) -> std::result::Result<(), JsValue> {
        let rows = decode_rows(json)?;
        self.state.borrow_mut().load_rows(rows);
        self.after_update();
        Ok(())
    }

    #[wasm_bindgen(js_name = "renderData")]
    pub fn render_data(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.state.borrow().render_data())
    }

    pub fn columns(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.state.borrow().columns())
    }

    #[wasm_bindgen(js_name = "hiddenFields")]
    pub fn hidden_fields(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.state.borrow().hidden_fields())
    }

    // ----- viewport -----

    #[wasm_bindgen(js_name = "onScroll")]
    pub fn on_scroll(&self, scroll_top: f64, client_height: f64) {
        self.state.borrow_mut().on_scroll(scroll_top, client_height);
        self.after_update();
    }

    /// Re-read the scroll container from the DOM.
    #[wasm_bindgen(js_name = "syncViewport")]
    pub fn sync_viewport(&self) {
        let layout = DomLayout { root: &self.root };
        self.state.borrow_mut().sync_viewport(&layout);
        self.after_update();
    }

    /// Scroll the container so that `row` is the first visible row.
    #[wasm_bindgen(js_name = "scrollToRow")]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn scroll_to_row(&self, row: usize) {
        let offset = row as f64 * self.state.borrow().config().row_height;
        if let Ok(Some(wrapper)) = self.root.query_selector(SCROLL_CONTAINER_SELECTOR) {
            wrapper.set_scroll_top(offset as i32);
        }
        self.sync_viewport();
    }

    // ----- filters -----

    #[wasm_bindgen(js_name = "uniqueValues")]
    pub fn unique_values(&self, col: usize) -> Vec<String> {
        self.state.borrow().unique_values(col)
    }

    #[wasm_bindgen(js_name = "filteredValues")]
    pub fn filtered_values(&self, col: usize, search: &str) -> Vec<String> {
        self.state.borrow().filtered_values(col, search)
    }

    #[wasm_bindgen(js_name = "setFilterSearch")]
    pub fn set_filter_search(&self, col: usize, text: &str) -> std::result::Result<(), JsValue> {
        self.state.borrow_mut().set_filter_search(col, text)?;
        self.after_update();
        Ok(())
    }

    #[wasm_bindgen(js_name = "toggleValue")]
    pub fn toggle_value(&self, col: usize, value: &str) -> std::result::Result<bool, JsValue> {
        let selected = self.state.borrow_mut().toggle_value(col, value)?;
        self.after_update();
        Ok(selected)
    }

    #[wasm_bindgen(js_name = "toggleSelectAll")]
    pub fn toggle_select_all(&self, col: usize, selected: bool) -> std::result::Result<(), JsValue> {
        self.state.borrow_mut().toggle_select_all(col, selected)?;
        self.after_update();
        Ok(())
    }

    #[wasm_bindgen(js_name = "clearFilter")]
    pub fn clear_filter(&self, col: usize) -> std::result::Result<(), JsValue> {
        self.state.borrow_mut().clear_filter(col)?;
        self.after_update();
        Ok(())
    }

    #[wasm_bindgen(js_name = "hasActiveFilter")]
    pub fn has_active_filter(&self, col: usize) -> bool {
        self.state.borrow().has_active_filter(col)
    }

    #[wasm_bindgen(js_name = "filterCount")]
    pub fn filter_count(&self, col: usize) -> usize {
        self.state.borrow().filter_count(col)
    }

    #[wasm_bindgen(js_name = "valueCount")]
    pub fn value_count(&self, col: usize, value: &str) -> usize {
        self.state.borrow().value_count(col, value)
    }

    #[wasm_bindgen(js_name = "isValueSelected")]
    pub fn is_value_selected(&self, col: usize, value: &str) -> bool {
        self.state.borrow().is_value_selected(col, value)
    }

    #[wasm_bindgen(js_name = "areAllValuesSelected")]
    pub fn are_all_values_selected(&self, col: usize) -> bool {
        self.state.borrow().are_all_values_selected(col)
    }

    #[wasm_bindgen(js_name = "toggleFilterPopup")]
    pub fn toggle_filter_popup(&self, col: usize) -> std::result::Result<(), JsValue> {
        self.state.borrow_mut().toggle_filter_popup(col)?;
        self.after_update();
        Ok(())
    }

    #[wasm_bindgen(js_name = "closeFilterPopup")]
    pub fn close_filter_popup(&self) -> bool {
        let closed = self.state.borrow_mut().close_filter_popup();
        self.after_update();
        closed
    }

    #[wasm_bindgen(js_name = "activeFilter")]
    pub fn active_filter(&self) -> Option<usize> {
        self.state.borrow().active_filter()
    }

    /// `[left, top]` of the open filter popup, or `undefined`.
    #[wasm_bindgen(js_name = "filterPopupAnchor")]
    pub fn filter_popup_anchor(&self) -> Option<Vec<f64>> {
        let layout = DomLayout { root: &self.root };
        self.state
            .borrow()
            .filter_popup_anchor(&layout)
            .map(|(left, top)| vec![left, top])
    }

    // ----- column layout -----

    #[wasm_bindgen(js_name = "reorderColumns")]
    pub fn reorder_columns(&self, from: usize, to: usize) -> std::result::Result<(), JsValue> {
        self.state.borrow_mut().reorder_columns(from, to)?;
        self.after_update();
        Ok(())
    }

    #[wasm_bindgen(js_name = "hideColumn")]
    pub fn hide_column(&self, col: usize) -> std::result::Result<(), JsValue> {
        self.state.borrow_mut().hide_column(col)?;
        self.after_update();
        Ok(())
    }

    #[wasm_bindgen(js_name = "showColumn")]
    pub fn show_column(&self, field: &str, at: Option<usize>) -> std::result::Result<usize, JsValue> {
        let index = self.state.borrow_mut().show_column(field, at)?;
        self.after_update();
        Ok(index)
    }

    #[wasm_bindgen(js_name = "startColumnDrag")]
    pub fn start_column_drag(&self, col: usize) -> std::result::Result<(), JsValue> {
        Ok(self.state.borrow_mut().start_column_drag(col)?)
    }

    #[wasm_bindgen(js_name = "startFieldDrag")]
    pub fn start_field_drag(&self, field: &str) -> std::result::Result<(), JsValue> {
        Ok(self.state.borrow_mut().start_field_drag(field)?)
    }

    /// `kind` is `column` (with `index`), `hidden` or `end`.
    #[wasm_bindgen(js_name = "dragOver")]
    pub fn drag_over(&self, kind: &str, index: Option<usize>) -> bool {
        let Some(target) = parse_drop_target(kind, index) else {
            return false;
        };
        let accepted = self.state.borrow_mut().drag_over(target);
        self.after_update();
        accepted
    }

    #[wasm_bindgen(js_name = "dragLeave")]
    pub fn drag_leave(&self) {
        self.state.borrow_mut().drag_leave();
        self.after_update();
    }

    /// Returns whether the drop changed the layout.
    #[wasm_bindgen(js_name = "drop")]
    pub fn drop_on(&self, kind: &str, index: Option<usize>) -> bool {
        let changed = match parse_drop_target(kind, index) {
            Some(target) => self.state.borrow_mut().drop_on(target).is_some(),
            None => {
                self.state.borrow_mut().end_drag();
                false
            }
        };
        self.after_update();
        changed
    }

    #[wasm_bindgen(js_name = "dragEnd")]
    pub fn drag_end(&self) {
        self.state.borrow_mut().end_drag();
        self.after_update();
    }

    // ----- selection -----

    #[wasm_bindgen(js_name = "mouseDown")]
    pub fn mouse_down(&self, row: usize, col: usize, button: i16) {
        if button != 0 {
            return;
        }
        self.state.borrow_mut().mouse_down(row, col);
        self.after_update();
    }

    #[wasm_bindgen(js_name = "mouseEnter")]
    pub fn mouse_enter(&self, row: usize, col: usize) {
        self.state.borrow_mut().mouse_enter(row, col);
        self.after_update();
    }

    #[wasm_bindgen(js_name = "mouseUp")]
    pub fn mouse_up(&self) {
        self.state.borrow_mut().mouse_up();
        self.after_update();
    }

    pub fn click(&self, row: usize, col: usize, shift: bool) {
        self.state.borrow_mut().click(row, col, shift);
        self.after_update();
    }

    #[wasm_bindgen(js_name = "focusCell")]
    pub fn focus_cell(&self, row: usize, col: usize) {
        self.state.borrow_mut().focus_cell(row, col);
        self.after_update();
    }

    /// Document-level keydown; returns whether the default action should be
    /// prevented.
    #[wasm_bindgen(js_name = "keyDown")]
    pub fn key_down(&self, key: &str, shift: bool, ctrl: bool) -> bool {
        let Some(key) = Key::from_dom(key) else {
            return false;
        };
        let outcome = self
            .state
            .borrow_mut()
            .key_down(KeyInput { key, shift, ctrl });
        let handled = match outcome {
            KeyOutcome::Ignored => false,
            KeyOutcome::Handled => true,
            KeyOutcome::Copy(text) => {
                spawn_local(write_clipboard(text));
                true
            }
            KeyOutcome::PasteRequested => {
                spawn_local(paste_from_clipboard(
                    Rc::clone(&self.state),
                    self.root.clone(),
                    Rc::clone(&self.render_callback),
                ));
                true
            }
        };
        self.after_update();
        handled
    }

    #[wasm_bindgen(js_name = "copySelection")]
    pub fn copy_selection(&self) -> Option<String> {
        self.state.borrow().copy_selection()
    }

    #[wasm_bindgen(js_name = "pasteText")]
    pub fn paste_text(&self, text: &str) -> std::result::Result<JsValue, JsValue> {
        let report = self.state.borrow_mut().paste_text(text);
        self.after_update();
        to_js(&report)
    }

    /// Focus the DOM cell at (row, col) if it is rendered.
    #[wasm_bindgen(js_name = "focusDomCell")]
    pub fn focus_dom_cell(&self, row: usize, col: usize) {
        let selector = format!("td[data-row=\"{row}\"][data-col=\"{col}\"]");
        if let Ok(Some(cell)) = self.root.query_selector(&selector) {
            if let Some(cell) = cell.dyn_ref::<HtmlElement>() {
                let _ = cell.focus();
            }
        }
    }
}
