//! Reporting date ranges

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Wire format for report dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range; `start` must not be after `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedRange {
                start: start.format(DATE_FORMAT).to_string(),
                end: end.format(DATE_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        let parse = |value: &str| {
            NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
                ValidationError::InvalidDate {
                    column: "dateRange".to_string(),
                    value: value.to_string(),
                }
            })
        };
        Self::new(parse(start)?, parse(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Number of days covered, counting both ends
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn start_string(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_string(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start_string(), self.end_string())
    }
}

/// Quick picks offered next to the custom range inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePreset {
    Today,
    Yesterday,
    #[serde(rename = "last_7_days")]
    Last7Days,
    #[serde(rename = "last_14_days")]
    Last14Days,
    #[serde(rename = "last_30_days")]
    Last30Days,
    ThisMonth,
    LastMonth,
}

impl DatePreset {
    pub fn all() -> &'static [DatePreset] {
        &[
            DatePreset::Today,
            DatePreset::Yesterday,
            DatePreset::Last7Days,
            DatePreset::Last14Days,
            DatePreset::Last30Days,
            DatePreset::ThisMonth,
            DatePreset::LastMonth,
        ]
    }

    /// Parse the snake_case preset name used on the command line
    pub fn from_name(name: &str) -> Option<DatePreset> {
        match name {
            "today" => Some(DatePreset::Today),
            "yesterday" => Some(DatePreset::Yesterday),
            "last_7_days" | "last7" => Some(DatePreset::Last7Days),
            "last_14_days" | "last14" => Some(DatePreset::Last14Days),
            "last_30_days" | "last30" => Some(DatePreset::Last30Days),
            "this_month" => Some(DatePreset::ThisMonth),
            "last_month" => Some(DatePreset::LastMonth),
            _ => None,
        }
    }

    /// Resolve against `today`; trailing windows end on `today`
    pub fn resolve(&self, today: NaiveDate) -> DateRange {
        let trailing = |days: i64| DateRange {
            start: today - Duration::days(days - 1),
            end: today,
        };

        match self {
            DatePreset::Today => DateRange {
                start: today,
                end: today,
            },
            DatePreset::Yesterday => {
                let yesterday = today - Duration::days(1);
                DateRange {
                    start: yesterday,
                    end: yesterday,
                }
            }
            DatePreset::Last7Days => trailing(7),
            DatePreset::Last14Days => trailing(14),
            DatePreset::Last30Days => trailing(30),
            DatePreset::ThisMonth => DateRange {
                start: first_of_month(today),
                end: today,
            },
            DatePreset::LastMonth => {
                let end = first_of_month(today) - Duration::days(1);
                DateRange {
                    start: first_of_month(end),
                    end,
                }
            }
        }
    }
}

fn first_of_month(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.day0()))
}
