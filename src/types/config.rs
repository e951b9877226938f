use serde::{Deserialize, Serialize};

/// Grid configuration: geometry constants, endpoints and asset locations.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    /// Fixed row height in pixels (42px default)
    pub row_height: f64,
    /// Height of the column header row in pixels (~50px default)
    pub header_height: f64,
    /// Extra rows rendered above and below the visible area
    pub buffer_size: usize,
    /// Rows rendered before the scroll container has been measured
    pub default_page_size: usize,
    /// Container height assumed when the measured height is zero
    pub fallback_container_height: f64,
    /// Base URL of the execution REST API
    pub api_base_url: String,
    /// Initial visible layout
    pub table_columns_path: String,
    /// Full field catalog
    pub all_fields_path: String,
    /// MIC code to country code mapping
    pub mic_codes_path: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            row_height: 42.0,
            header_height: 50.0,
            buffer_size: 10,
            default_page_size: 50,
            fallback_container_height: 500.0,
            api_base_url: "http://localhost:8080/api".to_string(),
            table_columns_path: "/assets/config/table-columns.json".to_string(),
            all_fields_path: "/assets/config/all-fields.json".to_string(),
            mic_codes_path: "/assets/config/static-data/mic-codes.csv".to_string(),
        }
    }
}

impl GridConfig {
    /// Load a configuration from JSON; missing keys take their defaults.
    pub fn from_json(text: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
