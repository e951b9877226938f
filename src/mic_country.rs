//! MIC code to country code mapping and per-row country enrichment.
//!
//! The mapping comes from the ISO 10383 market identifier CSV: the MIC is the
//! first column and the ISO country code the ninth. The header line is
//! skipped and rows with fewer than nine columns are ignored.

use std::collections::HashMap;

use crate::types::Row;

/// Column holding the market identifier code.
const MIC_COLUMN: usize = 0;

/// Column holding the ISO country code.
const COUNTRY_COLUMN: usize = 8;

/// Lookup from MIC (upper-case) to ISO country code (lower-case).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MicCountryMap {
    codes: HashMap<String, String>,
}

impl MicCountryMap {
    /// Parse the MIC CSV. Malformed lines are skipped, never fatal.
    pub fn parse(text: &str) -> Self {
        let mut codes = HashMap::new();
        for line in text.lines().skip(1) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let columns = split_csv_line(line, ',');
            if columns.len() <= COUNTRY_COLUMN {
                continue;
            }
            let mic = columns
                .get(MIC_COLUMN)
                .map(|s| s.trim().to_uppercase())
                .unwrap_or_default();
            let country = columns
                .get(COUNTRY_COLUMN)
                .map(|s| s.trim().to_lowercase())
                .unwrap_or_default();
            if !mic.is_empty() && !country.is_empty() {
                codes.insert(mic, country);
            }
        }
        tracing::debug!(entries = codes.len(), "parsed MIC country mapping");
        Self { codes }
    }

    /// Parse raw bytes, replacing invalid UTF-8.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::parse(&String::from_utf8_lossy(data))
    }

    /// Country code for a MIC (case and whitespace insensitive).
    pub fn country_code(&self, mic: &str) -> Option<&str> {
        self.codes
            .get(&mic.trim().to_uppercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Path of the flag image for a country code.
pub fn flag_path(country_code: &str) -> Option<String> {
    let code = country_code.trim();
    if code.is_empty() {
        return None;
    }
    Some(format!(
        "/assets/svgs/illustrations/flags/{}.svg",
        code.to_lowercase()
    ))
}

/// Country codes resolved per row, keyed by order id.
///
/// Populated after the rows are already displayed, so it may be empty or
/// partial at render time; unresolved rows show no flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryCodes {
    by_order: HashMap<String, String>,
}

impl CountryCodes {
    /// Resolve every row with both an order id and a known MIC.
    pub fn resolve(rows: &[Row], mics: &MicCountryMap) -> Self {
        let mut by_order = HashMap::new();
        for row in rows {
            let (Some(order_id), Some(mic)) = (row.order_id(), row.mic()) else {
                continue;
            };
            if let Some(code) = mics.country_code(mic) {
                by_order.insert(order_id.to_string(), code.to_string());
            }
        }
        tracing::debug!(
            resolved = by_order.len(),
            rows = rows.len(),
            "resolved execution country codes"
        );
        Self { by_order }
    }

    /// Country code of a row, if resolved.
    pub fn for_row(&self, row: &Row) -> Option<&str> {
        let order_id = row.order_id()?;
        self.by_order.get(order_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_order.is_empty()
    }
}

/// Split a CSV line respecting quoted fields.
fn split_csv_line(line: &str, sep: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    // Escaped quote
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(ch);
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == sep {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    fields.push(current);
    fields
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

    const SAMPLE: &str = "MIC,OPERATING MIC,OPRT/SGMT,MARKET NAME,LEGAL ENTITY,LEI,CATEGORY,ACRONYM,ISO COUNTRY CODE,CITY\n\
XPAR,XPAR,OPRT,EURONEXT - EURONEXT PARIS,EURONEXT PARIS,,NSPD,,FR,PARIS\n\
xnys,XNYS,OPRT,\"NEW YORK STOCK EXCHANGE, INC.\",NYSE,,RMKT,NYSE,US,NEW YORK\n\
SHORT,ROW\n\
\n";

    #[test]
    fn test_parse_mapping() {
        let map = MicCountryMap::parse(SAMPLE);
        assert_eq!(map.len(), 2);
        assert_eq!(map.country_code("XPAR"), Some("fr"));
        assert_eq!(map.country_code(" xnys "), Some("us"));
        assert_eq!(map.country_code("XLON"), None);
    }

    #[test]
    fn test_quoted_field_keeps_comma() {
        let fields = split_csv_line("a,\"b, c\",\"say \"\"hi\"\"\"", ',');
        assert_eq!(fields, vec!["a", "b, c", "say \"hi\""]);
    }

    #[test]
    fn test_empty_input_degrades_to_empty_map() {
        assert!(MicCountryMap::parse("").is_empty());
        assert!(MicCountryMap::from_bytes(&[0xff, 0xfe]).is_empty());
    }

    #[test]
    fn test_resolve_rows() {
        let map = MicCountryMap::parse(SAMPLE);
        let rows = vec![
            Row::new().with("orderId", "O1").with("mic", "XPAR"),
            Row::new().with("orderId", "O2").with("mic", "XLON"),
            Row::new().with("mic", "XNYS"),
        ];
        let codes = CountryCodes::resolve(&rows, &map);
        assert_eq!(codes.len(), 1);
        assert_eq!(codes.for_row(&rows[0]), Some("fr"));
        assert_eq!(codes.for_row(&rows[1]), None);
    }

    #[test]
    fn test_flag_path() {
        assert_eq!(
            flag_path("FR").as_deref(),
            Some("/assets/svgs/illustrations/flags/fr.svg")
        );
        assert_eq!(flag_path(""), None);
    }
}
