//! Browser tests for the `ExecutionBrowser` bindings.
//!
//! Run with: wasm-pack test --headless --firefox
#![cfg(target_arch = "wasm32")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{ALL_FIELDS_JSON, EXECUTIONS_JSON, TABLE_COLUMNS_JSON};
use execgrid::ExecutionBrowser;
use serde_json::json;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::Element;

wasm_bindgen_test_configure!(run_in_browser);

fn mount(inner_html: &str) -> Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let root = document.create_element("div").unwrap();
    root.set_inner_html(inner_html);
    document.body().unwrap().append_child(&root).unwrap();
    root
}

fn field(value: &JsValue, key: &str) -> JsValue {
    js_sys::Reflect::get(value, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn test_config_rows_and_filter() {
    let browser = ExecutionBrowser::new(mount(""), JsValue::NULL).unwrap();
    browser.set_config(TABLE_COLUMNS_JSON, ALL_FIELDS_JSON).unwrap();
    browser.load_rows(EXECUTIONS_JSON).unwrap();
    let data = browser.render_data().unwrap();
    assert_eq!(field(&data, "totalRows").as_f64(), Some(6.0));

    assert!(browser.toggle_value(1, "BUY").unwrap());
    let data = browser.render_data().unwrap();
    assert_eq!(field(&data, "totalRows").as_f64(), Some(4.0));

    browser.click(0, 0, false);
    browser.click(1, 1, true);
    assert_eq!(browser.copy_selection().as_deref(), Some("AAPL\tBUY\nGOOG\tBUY"));
}

#[wasm_bindgen_test]
fn test_missing_catalog_keeps_table_columns() {
    let browser = ExecutionBrowser::new(mount(""), JsValue::NULL).unwrap();
    browser.set_config(TABLE_COLUMNS_JSON, "").unwrap();
    let columns = js_sys::Array::from(&browser.columns().unwrap());
    assert_eq!(columns.length(), 5);
    let hidden = js_sys::Array::from(&browser.hidden_fields().unwrap());
    assert_eq!(hidden.length(), 0);
}

#[wasm_bindgen_test]
fn test_filter_moves_container_back_to_top() {
    let root = mount(
        r#"<div class="table-wrapper" style="height: 100px; overflow: auto">
             <div style="height: 100000px"></div>
           </div>"#,
    );
    let browser = ExecutionBrowser::new(root.clone(), JsValue::NULL).unwrap();
    browser
        .set_config(r#"{"columns":[{"field":"side","header":"Side"}]}"#, "")
        .unwrap();
    let rows: Vec<_> = (0..300)
        .map(|i| json!({ "executionId": i, "side": if i % 2 == 0 { "BUY" } else { "SELL" } }))
        .collect();
    browser.load_rows(&serde_json::to_string(&rows).unwrap()).unwrap();

    let wrapper = root.query_selector(".table-wrapper").unwrap().unwrap();
    wrapper.set_scroll_top(4200);
    browser.on_scroll(f64::from(wrapper.scroll_top()), 100.0);
    assert!(wrapper.scroll_top() > 0);

    browser.toggle_value(0, "BUY").unwrap();
    assert_eq!(wrapper.scroll_top(), 0);
    let data = browser.render_data().unwrap();
    assert_eq!(field(&data, "scrollTop").as_f64(), Some(0.0));
}

#[wasm_bindgen_test]
async fn test_shortcuts_without_clipboard_api() {
    let navigator = JsValue::from(web_sys::window().unwrap().navigator());
    let hidden = js_sys::Object::new();
    js_sys::Reflect::set(&hidden, &"value".into(), &JsValue::UNDEFINED).unwrap();
    js_sys::Reflect::set(&hidden, &"configurable".into(), &JsValue::TRUE).unwrap();
    js_sys::Object::define_property(navigator.unchecked_ref(), &"clipboard".into(), &hidden);

    let browser = ExecutionBrowser::new(mount(""), JsValue::NULL).unwrap();
    browser.set_config(TABLE_COLUMNS_JSON, ALL_FIELDS_JSON).unwrap();
    browser.load_rows(EXECUTIONS_JSON).unwrap();
    browser.click(0, 0, false);

    assert!(browser.key_down("c", false, true));
    assert!(browser.key_down("v", false, true));
    let tick = js_sys::Promise::resolve(&JsValue::NULL);
    wasm_bindgen_futures::JsFuture::from(tick).await.unwrap();

    assert_eq!(browser.copy_selection().as_deref(), Some("AAPL"));
    let data = browser.render_data().unwrap();
    assert_eq!(field(&data, "totalRows").as_f64(), Some(6.0));

    js_sys::Reflect::delete_property(navigator.unchecked_ref(), &"clipboard".into()).unwrap();
}
