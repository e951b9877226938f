//! Cell editing mutations.
//!
//! Applies pasted text to the in-memory row model.

use serde_json::{Number, Value};

use crate::format::{iso_datetime, parse_datetime};
use crate::types::{ColumnDescriptor, ColumnType, Row};

/// Result of writing one pasted value into a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellEdit {
    /// Value parsed and stored
    Applied,
    /// Value does not parse for the column type; row untouched
    Rejected,
    /// Column is computed and cannot be written
    ReadOnly,
}

/// Parse pasted text for a column type.
///
/// - `Number` / `Decimal` → JSON number; integral values are stored as
///   integers
/// - `Datetime` → `YYYY-MM-DDTHH:MM:SS.sssZ` string
/// - `None` (text) → the text itself
/// - `Flag` → never writable
pub fn parse_cell_input(kind: Option<ColumnType>, text: &str) -> Option<Value> {
    let text = text.trim();
    match kind {
        Some(ColumnType::Number | ColumnType::Decimal) => parse_number(text),
        Some(ColumnType::Datetime) => parse_datetime(text).map(|dt| Value::String(iso_datetime(&dt))),
        Some(ColumnType::Flag) => None,
        None => Some(Value::String(text.to_string())),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn parse_number(text: &str) -> Option<Value> {
    if let Ok(i) = text.parse::<i64>() {
        return Some(Value::from(i));
    }
    let n = text.parse::<f64>().ok().filter(|n| n.is_finite())?;
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        return Some(Value::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number)
}

/// Write pasted text into `row` for `column`.
pub fn apply_cell_input(row: &mut Row, column: &ColumnDescriptor, text: &str) -> CellEdit {
    if !column.is_editable() {
        return CellEdit::ReadOnly;
    }
    match parse_cell_input(column.kind, text) {
        Some(value) => {
            row.set(&column.field, value);
            CellEdit::Applied
        }
        None => {
            tracing::debug!(field = %column.field, input = text, "pasted value rejected");
            CellEdit::Rejected
        }
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
    use serde_json::json;
    use test_case::test_case;

    #[test_case(Some(ColumnType::Number), "42", Some(json!(42)) ; "integer")]
    #[test_case(Some(ColumnType::Number), " 1.5 ", Some(json!(1.5)) ; "float trimmed")]
    #[test_case(Some(ColumnType::Decimal), "100.0", Some(json!(100)) ; "integral float stored as integer")]
    #[test_case(Some(ColumnType::Decimal), "abc", None ; "non numeric rejected")]
    #[test_case(Some(ColumnType::Number), "NaN", None ; "nan rejected")]
    #[test_case(Some(ColumnType::Datetime), "03/05/2024, 14:07:09", Some(json!("2024-03-05T14:07:09.000Z")) ; "display format")]
    #[test_case(Some(ColumnType::Datetime), "soon", None ; "bad date rejected")]
    #[test_case(None, "  BUY ", Some(json!("BUY")) ; "text")]
    #[test_case(Some(ColumnType::Flag), "fr", None ; "flag never written")]
    fn test_parse_cell_input(kind: Option<ColumnType>, input: &str, expected: Option<Value>) {
        assert_eq!(parse_cell_input(kind, input), expected);
    }

    #[test]
    fn test_apply_cell_input() {
        let mut row = Row::new().with("price", 10.0).with("country", "fr");
        let price = ColumnDescriptor::new("price", "Price", Some(ColumnType::Decimal));
        let country = ColumnDescriptor::text("country", "Country");

        assert_eq!(apply_cell_input(&mut row, &price, "12.25"), CellEdit::Applied);
        assert_eq!(row.get("price"), Some(&json!(12.25)));

        assert_eq!(apply_cell_input(&mut row, &price, "x"), CellEdit::Rejected);
        assert_eq!(row.get("price"), Some(&json!(12.25)));

        assert_eq!(apply_cell_input(&mut row, &country, "us"), CellEdit::ReadOnly);
        assert_eq!(row.get("country"), Some(&json!("fr")));
    }
}
