//! Core functionality for the bid optimizer dashboard
//!
//! This crate provides the campaign data model and the pure table engine
//! (filter evaluation and sorting) shared by the data and view layers,
//! together with the session state containers for campaign groups and
//! staged bid changes.

pub mod events;
pub mod filter;
pub mod groups;
pub mod model;
pub mod range;
pub mod sort;
pub mod staging;

use thiserror::Error;
use uuid::Uuid;

// Re-export commonly used types
pub use filter::{
    apply_filters, matches, matches_all, ColumnType, FilterCondition, FilterEvaluator,
    FilterOperator, FilterValue, LogicalOperator,
};
pub use model::{
    CampaignReport, CampaignRow, CellValue, ColumnDefinition, DailyPerformance, NullConfig, Row,
    Summary,
};
pub use range::{DatePreset, DateRange};
pub use sort::{SortConfig, SortDirection};

/// Errors raised when user-supplied configuration is rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("operator `{operator}` is not valid for {column_type} column `{column}`")]
    InvalidOperator {
        column: String,
        column_type: ColumnType,
        operator: FilterOperator,
    },

    #[error("column `{column}` holds {expected} values, not {found}")]
    ColumnTypeMismatch {
        column: String,
        expected: ColumnType,
        found: ColumnType,
    },

    #[error("`{value}` is not a number (column `{column}`)")]
    InvalidNumber { column: String, value: String },

    #[error("`{value}` is not a date (column `{column}`)")]
    InvalidDate { column: String, value: String },

    #[error("`between` filter on `{column}` needs an end value")]
    MissingEndValue { column: String },

    #[error("date range starts on {start} but ends on {end}")]
    InvertedRange { start: String, end: String },

    #[error("staged amount {0} must be a positive number")]
    InvalidAmount(f64),

    #[error("campaign group {0} does not exist")]
    UnknownGroup(Uuid),
}
