//! Cell display formatting.
//!
//! The display string of a cell is what the grid renders, what column
//! filters compare against and what copy puts on the clipboard, so all three
//! go through [`display_value`].
//!
//! Datetimes are shown as `MM/DD/YYYY, HH:MM:SS` in UTC. Values carrying an
//! offset are converted; naive values are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::mic_country::CountryCodes;
use crate::types::{ColumnDescriptor, ColumnType, Row};

/// Display format for datetime cells.
pub const DISPLAY_DATETIME_FORMAT: &str = "%m/%d/%Y, %H:%M:%S";

/// Storage format for datetime cells written by paste.
pub const ISO_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Naive layouts accepted when parsing datetimes, tried in order.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    DISPLAY_DATETIME_FORMAT,
    "%m/%d/%Y %H:%M:%S",
];

/// Display text of one cell.
pub fn display_value(row: &Row, column: &ColumnDescriptor, countries: &CountryCodes) -> String {
    if column.kind == Some(ColumnType::Flag) {
        return countries.for_row(row).unwrap_or_default().to_string();
    }
    match row.get(&column.field) {
        Some(value) => format_value(value, column.kind),
        None => String::new(),
    }
}

/// Format a raw JSON value for a column type.
pub fn format_value(value: &Value, kind: Option<ColumnType>) -> String {
    match (kind, value) {
        (_, Value::Null) => String::new(),
        (Some(ColumnType::Decimal), v) => format_decimal(v),
        (Some(ColumnType::Datetime), Value::String(s)) => format_datetime(s),
        (_, Value::String(s)) => s.clone(),
        (_, Value::Number(n)) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        },
        (_, Value::Bool(b)) => b.to_string(),
        (_, other) => other.to_string(),
    }
}

/// Shortest plain representation; integral values print without a fraction.
#[allow(clippy::cast_possible_truncation)]
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Two-decimal rendering; text that is not numeric is returned unchanged.
pub fn format_decimal(value: &Value) -> String {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => to_fixed_2(n),
        _ => match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

/// Two decimals, rounding exact ties away from zero.
///
/// `{:.2}` already rounds on the exact binary value but sends ties to even.
/// At two decimals an exact tie is an odd multiple of 1/8.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_fixed_2(n: f64) -> String {
    let eighths = n.abs() * 8.0;
    let tie = eighths < 9.0e15 && eighths.fract() == 0.0 && (eighths as u64) % 2 == 1;
    if !tie {
        return format!("{n:.2}");
    }
    let hundredths = (n.abs() * 100.0).floor() + 1.0;
    let magnitude = format!("{:.2}", hundredths / 100.0);
    if n.is_sign_negative() {
        format!("-{magnitude}")
    } else {
        magnitude
    }
}

/// Parse a timestamp in any of the accepted layouts, normalized to UTC.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Display form of a timestamp; unparseable text is returned unchanged.
pub fn format_datetime(text: &str) -> String {
    match parse_datetime(text) {
        Some(dt) => dt.format(DISPLAY_DATETIME_FORMAT).to_string(),
        None => text.to_string(),
    }
}

/// Storage form of a timestamp, as written back by paste.
pub fn iso_datetime(dt: &NaiveDateTime) -> String {
    dt.format(ISO_DATETIME_FORMAT).to_string()
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
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn test_decimal_rounds_to_two_places() {
        assert_eq!(format_value(&json!(101.5), Some(ColumnType::Decimal)), "101.50");
        assert_eq!(format_value(&json!(3), Some(ColumnType::Decimal)), "3.00");
        assert_eq!(format_value(&json!("2.346"), Some(ColumnType::Decimal)), "2.35");
        assert_eq!(format_value(&json!("n/a"), Some(ColumnType::Decimal)), "n/a");
    }

    #[test_case(0.125 => "0.13" ; "eighth")]
    #[test_case(101.125 => "101.13" ; "price tie")]
    #[test_case(0.375 => "0.38" ; "tie already up")]
    #[test_case(0.625 => "0.63" ; "tie rounded down by half even")]
    #[test_case(-0.125 => "-0.13" ; "negative tie")]
    #[test_case(1.005 => "1.00" ; "below tie in binary")]
    #[test_case(2.675 => "2.67" ; "another inexact tie")]
    fn test_decimal_ties_round_away_from_zero(n: f64) -> String {
        format_value(&json!(n), Some(ColumnType::Decimal))
    }

    #[test]
    fn test_number_shortest_form() {
        assert_eq!(format_value(&json!(42), Some(ColumnType::Number)), "42");
        assert_eq!(format_value(&json!(42.0), Some(ColumnType::Number)), "42");
        assert_eq!(format_value(&json!(1.5), None), "1.5");
        assert_eq!(format_value(&json!(-7), None), "-7");
    }

    #[test]
    fn test_null_and_bool() {
        assert_eq!(format_value(&Value::Null, Some(ColumnType::Decimal)), "");
        assert_eq!(format_value(&json!(true), None), "true");
    }

    #[test]
    fn test_datetime_display() {
        assert_eq!(
            format_datetime("2024-03-05T14:07:09.123Z"),
            "03/05/2024, 14:07:09"
        );
        assert_eq!(format_datetime("2024-03-05 14:07:09"), "03/05/2024, 14:07:09");
        assert_eq!(
            format_datetime("2024-03-05T16:07:09+02:00"),
            "03/05/2024, 14:07:09"
        );
        assert_eq!(format_datetime("2024-03-05"), "03/05/2024, 00:00:00");
    }

    #[test]
    fn test_datetime_unparseable_left_unchanged() {
        assert_eq!(format_datetime("yesterday"), "yesterday");
        assert_eq!(format_datetime(""), "");
    }

    #[test]
    fn test_display_form_parses_back() {
        let dt = parse_datetime("03/05/2024, 14:07:09").unwrap();
        assert_eq!(iso_datetime(&dt), "2024-03-05T14:07:09.000Z");
    }

    #[test]
    fn test_display_value_missing_field() {
        let row = Row::new().with("trader", "alice");
        let col = ColumnDescriptor::text("book", "Book");
        assert_eq!(display_value(&row, &col, &CountryCodes::default()), "");
    }
}
