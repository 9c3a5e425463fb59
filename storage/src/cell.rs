use entity::NOT_AVAILABLE;
use std::num::ParseFloatError;

/// Formats a numeric cell with a fixed number of decimals, `N/A` when absent.
pub fn format_cell(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.precision$}"),
        _ => NOT_AVAILABLE.to_owned(),
    }
}

/// Parses a numeric cell. Empty and `N/A` cells are absent; a comma is
/// accepted as the decimal separator.
pub fn parse_cell(text: &str) -> Result<Option<f64>, ParseFloatError> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case(NOT_AVAILABLE) {
        return Ok(None);
    }
    text.replace(',', ".").parse::<f64>().map(Some)
}
