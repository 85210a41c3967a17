//! Campaign data model

mod campaign;
mod column;
mod null_handling;
mod report;

pub use campaign::{CampaignRow, CellValue, Row};
pub use column::{default_columns, ColumnDefinition, CAMPAIGN_COLUMN, CHECKBOX_COLUMN};
pub use null_handling::NullConfig;
pub use report::{derive_ratio, CampaignReport, DailyPerformance, Summary};

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a calendar day from `YYYY-MM-DD` or an ISO date-time
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
        return Some(date_time.date_naive());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|date_time| date_time.date())
}

/// Parse a number, tolerating currency symbols, thousands separators and a
/// trailing percent sign
pub fn parse_number(value: &str) -> Option<f64> {
    let cleaned: String = value
        .trim()
        .trim_end_matches('%')
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();

    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}
