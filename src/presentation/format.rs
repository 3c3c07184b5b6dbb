// Display formatting for metric values
use crate::domain::metrics::is_rate_metric;
use chrono::{DateTime, Local};

/// Shown in place of an absent value. Never rendered as 0.
pub const PLACEHOLDER: &str = "---";

pub const PERCENT_UNIT: &str = "%";

/// Round to `digits` fraction digits with ties away from zero. `format!`
/// alone rounds exact ties to even (`12.25` -> `12.2`).
fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// `0.753` -> `75.3%`
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", round_to(value * 100.0, 1))
}

/// Plain number with thousands separators and at most three fraction digits.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = format!("{:.3}", round_to(value.abs(), 3));
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::new();
    if value < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Table cell: rate metrics as percentages, everything else as a plain number.
pub fn format_cell(value: Option<f64>, is_rate: bool) -> String {
    match value {
        None => PLACEHOLDER.to_string(),
        Some(v) if is_rate => format_percent(v),
        Some(v) => format_number(v),
    }
}

pub fn format_metric_cell(metric: &str, value: Option<f64>) -> String {
    format_cell(value, is_rate_metric(metric))
}

/// KPI card value. Percent-unit cards hold ratios; other units are appended.
pub fn format_kpi_value(value: Option<f64>, unit: &str) -> String {
    match value {
        None => PLACEHOLDER.to_string(),
        Some(v) if unit == PERCENT_UNIT => format_percent(v),
        Some(v) => format!("{}{}", format_number(v), unit),
    }
}

/// Status badge text, whole percent.
pub fn format_badge(rate: f64) -> String {
    format!("{}%", (rate * 100.0).round() as i64)
}

/// Bar height for the funnel chart: percent with two decimals, absent as 0.
pub fn funnel_percent(value: Option<f64>) -> f64 {
    value.map(|v| (v * 10_000.0).round() / 100.0).unwrap_or(0.0)
}

pub fn format_last_updated(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(time) => time
            .with_timezone(&Local)
            .format("%Y/%m/%d %H:%M:%S")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_formatting() {
        assert_eq!(format_cell(Some(0.753), true), "75.3%");
        assert_eq!(format_metric_cell("実績：通電率", Some(0.5)), "50.0%");
    }

    #[test]
    fn test_percent_ties_round_up() {
        assert_eq!(format_percent(49.0 / 400.0), "12.3%");
        assert_eq!(format_percent(0.0625), "6.3%");
        assert_eq!(format_kpi_value(Some(49.0 / 400.0), "%"), "12.3%");
        assert_eq!(format_metric_cell("実績：アポ率", Some(0.0625)), "6.3%");
    }

    #[test]
    fn test_absent_is_placeholder_regardless_of_unit() {
        assert_eq!(format_cell(None, true), PLACEHOLDER);
        assert_eq!(format_cell(None, false), PLACEHOLDER);
        assert_eq!(format_kpi_value(None, "%"), "---");
        assert_eq!(format_kpi_value(None, "件"), "---");
    }

    #[test]
    fn test_zero_is_rendered() {
        assert_eq!(format_cell(Some(0.0), false), "0");
        assert_eq!(format_kpi_value(Some(0.0), "%"), "0.0%");
    }

    #[test]
    fn test_number_grouping() {
        assert_eq!(format_number(1234567.0), "1,234,567");
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(1000.5), "1,000.5");
        assert_eq!(format_number(-12345.6789), "-12,345.679");
        assert_eq!(format_number(-0.0001), "0");
        assert_eq!(format_number(0.0625), "0.063");
    }

    #[test]
    fn test_kpi_values() {
        assert_eq!(format_kpi_value(Some(0.423), "%"), "42.3%");
        assert_eq!(format_kpi_value(Some(1200.0), "件"), "1,200件");
    }

    #[test]
    fn test_badge_and_funnel() {
        assert_eq!(format_badge(0.746), "75%");
        assert_eq!(format_badge(1.2), "120%");
        assert_eq!(funnel_percent(Some(0.31234)), 31.23);
        assert_eq!(funnel_percent(None), 0.0);
    }

    #[test]
    fn test_last_updated() {
        let raw = "2024-06-30T00:00:00Z";
        let expected = DateTime::parse_from_rfc3339(raw)
            .unwrap()
            .with_timezone(&Local)
            .format("%Y/%m/%d %H:%M:%S")
            .to_string();
        assert_eq!(format_last_updated(raw), expected);
        assert_eq!(format_last_updated("yesterday"), "yesterday");
    }
}
