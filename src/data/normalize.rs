//! Value Coercion Helpers
//! Best-effort parsing of raw text cells into typed values.

use chrono::NaiveDate;

/// Placeholder for missing categorical values.
pub const UNKNOWN: &str = "unknown";

/// Default day/month/year date format of the transactions file.
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Trimmed cell contents, or `None` for null/blank cells.
pub fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

/// Parse a date with a single fixed format.
pub fn parse_date(raw: Option<&str>, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(non_blank(raw)?, format).ok()
}

/// Grouping key for a date, e.g. `2024-03 (March)`.
pub fn month_bucket(date: NaiveDate) -> String {
    date.format("%Y-%m (%B)").to_string()
}

/// Parse a currency/quantity cell such as `Rp1.500.000`.
///
/// Strips the `Rp` marker, whitespace and `.` thousands separators; a
/// remaining `,` is read as the decimal point. Negative or non-finite
/// values are rejected.
pub fn parse_amount(raw: Option<&str>) -> Option<f64> {
    let value = strip_currency(non_blank(raw)?);

    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    let amount = cleaned.parse::<f64>().ok()?;
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

/// Parse a coordinate that may use `,` as the decimal separator.
pub fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    let value = non_blank(raw)?.replace(',', ".");
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn strip_currency(value: &str) -> &str {
    match value.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("rp") => &value[2..],
        _ => value,
    }
}
