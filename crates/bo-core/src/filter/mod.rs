//! Client-side filtering of table rows

mod condition;
mod evaluate;

pub use condition::{ColumnType, FilterCondition, FilterOperator, FilterValue, LogicalOperator};
pub use evaluate::{apply_filters, matches, matches_all, FilterEvaluator};

/// Filterable columns of the campaigns table and their kinds
pub const FILTER_COLUMNS: &[(&str, ColumnType)] = &[
    ("campaign", ColumnType::Text),
    ("adType", ColumnType::Enum),
    ("state", ColumnType::Enum),
    ("optGroup", ColumnType::Text),
    ("startDate", ColumnType::Date),
    ("endDate", ColumnType::Date),
    ("lastOptimized", ColumnType::Date),
    ("budget", ColumnType::Number),
    ("bid", ColumnType::Number),
    ("impressions", ColumnType::Number),
    ("clicks", ColumnType::Number),
    ("orders", ColumnType::Number),
    ("units", ColumnType::Number),
    ("ctr", ColumnType::Percentage),
    ("cvr", ColumnType::Percentage),
    ("cpc", ColumnType::Number),
    ("spend", ColumnType::Number),
    ("sales", ColumnType::Number),
    ("acos", ColumnType::Percentage),
    ("rpc", ColumnType::Number),
    ("roas", ColumnType::Number),
];

/// Kind of a filterable column, if the column is filterable at all
pub fn column_type_of(column: &str) -> Option<ColumnType> {
    FILTER_COLUMNS
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, column_type)| *column_type)
}
