//! Execution REST API and static asset requests.
//!
//! The grid never performs I/O itself. This module describes the requests a
//! host has to make and decodes their responses; the browser build also
//! performs them through the Fetch API ([`fetch_text`]).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::mic_country::MicCountryMap;
use crate::types::{FieldCatalog, Row, TableConfig};

/// Layout of the `startTimestamp` request parameter.
pub const START_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// HTTP method
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// A request to be performed by the host
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    /// JSON body, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Option<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody {
    start_timestamp: String,
}

/// Where a search takes its executions from
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionSource {
    /// Sampling endpoint used by the dashboard
    List { count: usize },
    /// Test API data set
    TestApi,
    /// Upstream execution system
    Real,
}

fn base(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

/// Request fetching executions from `source`, optionally from `start` on.
///
/// The start timestamp only applies to the search endpoints.
pub fn execution_request(
    base_url: &str,
    source: ExecutionSource,
    start: Option<&NaiveDateTime>,
) -> ApiRequest {
    let base = base(base_url);
    let path = match source {
        ExecutionSource::List { count } => {
            return ApiRequest::get(format!("{base}/test-execution/list?count={count}"));
        }
        ExecutionSource::TestApi => "test-api-executions",
        ExecutionSource::Real => "test-real",
    };
    let body = start.and_then(|dt| {
        serde_json::to_string(&SearchBody {
            start_timestamp: format_start_timestamp(dt),
        })
        .ok()
    });
    ApiRequest::post(format!("{base}/test-execution/{path}"), body)
}

/// `YYYY-MM-DD HH:MM:SS`
pub fn format_start_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(START_TIMESTAMP_FORMAT).to_string()
}

/// Decode an execution list response.
pub fn decode_rows(text: &str) -> Result<Vec<Row>> {
    Ok(serde_json::from_str(text)?)
}

/// Decode `table-columns.json`.
pub fn decode_table_config(text: &str) -> Result<TableConfig> {
    Ok(serde_json::from_str(text)?)
}

/// Decode `all-fields.json`.
pub fn decode_field_catalog(text: &str) -> Result<FieldCatalog> {
    Ok(serde_json::from_str(text)?)
}

/// Decode an optional asset, degrading to the default on failure.
pub fn decode_or_default<T: Default>(name: &str, text: &str, decode: fn(&str) -> Result<T>) -> T {
    decode(text).unwrap_or_else(|e| {
        tracing::warn!(asset = name, error = %e, "failed to decode asset, using empty default");
        T::default()
    })
}

/// Decode the MIC CSV (never fails; bad lines are skipped).
pub fn decode_mic_codes(text: &str) -> MicCountryMap {
    MicCountryMap::parse(text)
}

/// Perform a request with the browser Fetch API and return the body text.
#[cfg(target_arch = "wasm32")]
pub async fn fetch_text(request: &ApiRequest) -> Result<String> {
    use crate::error::GridError;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    let opts = RequestInit::new();
    opts.set_method(request.method.as_str());
    opts.set_mode(RequestMode::Cors);
    if let Some(body) = &request.body {
        opts.set_body(&wasm_bindgen::JsValue::from_str(body));
    }

    let req = Request::new_with_str_and_init(&request.url, &opts)
        .map_err(|e| GridError::Fetch(format!("failed to create request: {e:?}")))?;
    if request.body.is_some() {
        req.headers()
            .set("Content-Type", "application/json")
            .map_err(|e| GridError::Fetch(format!("failed to set header: {e:?}")))?;
    }

    let window = web_sys::window().ok_or_else(|| GridError::Fetch("no window".into()))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&req))
        .await
        .map_err(|e| GridError::Fetch(format!("{e:?}")))?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|_| GridError::Fetch("response is not a Response object".into()))?;
    if !resp.ok() {
        return Err(GridError::Fetch(format!(
            "{} {} returned status {}",
            request.method.as_str(),
            request.url,
            resp.status()
        )));
    }

    let text_promise = resp
        .text()
        .map_err(|e| GridError::Fetch(format!("failed to read body: {e:?}")))?;
    let text = JsFuture::from(text_promise)
        .await
        .map_err(|e| GridError::Fetch(format!("failed to read body: {e:?}")))?;
    text.as_string()
        .ok_or_else(|| GridError::Fetch("response body is not a string".into()))
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
    use chrono::NaiveDate;

    const BASE: &str = "http://localhost:8080/api/";

    #[test]
    fn test_list_request() {
        let req = execution_request(BASE, ExecutionSource::List { count: 25 }, None);
        assert_eq!(req, ApiRequest::get("http://localhost:8080/api/test-execution/list?count=25"));
    }

    #[test]
    fn test_search_requests() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let req = execution_request(BASE, ExecutionSource::Real, Some(&start));
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.url, "http://localhost:8080/api/test-execution/test-real");
        assert_eq!(req.body.as_deref(), Some(r#"{"startTimestamp":"2024-03-05 09:30:00"}"#));

        let req = execution_request(BASE, ExecutionSource::TestApi, None);
        assert_eq!(req.url, "http://localhost:8080/api/test-execution/test-api-executions");
        assert_eq!(req.body, None);
    }

    #[test]
    fn test_decode_configs() {
        let table = decode_table_config(
            r#"{"columns":[{"field":"price","header":"Price","type":"decimal"},{"field":"trader","header":"Trader"}]}"#,
        )
        .unwrap();
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[0].kind, Some(crate::types::ColumnType::Decimal));
        assert_eq!(table.columns[1].kind, None);

        let catalog = decode_or_default("all-fields.json", "not json", decode_field_catalog);
        assert!(catalog.fields.is_empty());
    }

    #[test]
    fn test_decode_rows() {
        let rows = decode_rows(r#"[{"executionId":7,"orderId":"O7","price":1.5}]"#).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].execution_id(), Some(7));
        assert!(decode_rows("{}").is_err());
    }
}
