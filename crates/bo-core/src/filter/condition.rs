//! Filter conditions as edited in the filter dialog

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::column_type_of;
use crate::model::{parse_day, parse_number};
use crate::ValidationError;

/// Kind of data a filtered column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Enum,
    Date,
    Number,
    Percentage,
}

impl ColumnType {
    /// Operators the filter dialog offers for this column type
    pub fn operators(&self) -> &'static [FilterOperator] {
        use FilterOperator::*;

        match self {
            ColumnType::Text => &[Contains, NotContains, Equals, NotEquals, StartsWith, EndsWith],
            ColumnType::Enum => &[Equals, NotEquals],
            ColumnType::Date => &[Before, After, Equals, Between, Never],
            ColumnType::Number | ColumnType::Percentage => &[
                LessThan,
                LessThanEqual,
                Equals,
                NotEquals,
                GreaterThanEqual,
                GreaterThan,
                Between,
            ],
        }
    }

    pub fn supports(&self, operator: FilterOperator) -> bool {
        self.operators().contains(&operator)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Enum => "enum",
            ColumnType::Date => "date",
            ColumnType::Number => "number",
            ColumnType::Percentage => "percentage",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison applied between a row cell and each filter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    // Text
    Contains,
    NotContains,
    Equals,
    NotEquals,
    StartsWith,
    EndsWith,

    // Date
    Before,
    After,
    Never,

    // Number
    LessThan,
    LessThanEqual,
    GreaterThanEqual,
    GreaterThan,

    // Date and number
    Between,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::Before => "before",
            Self::After => "after",
            Self::Never => "never",
            Self::LessThan => "less_than",
            Self::LessThanEqual => "less_than_equal",
            Self::GreaterThanEqual => "greater_than_equal",
            Self::GreaterThan => "greater_than",
            Self::Between => "between",
        }
    }

    /// Returns true if this operator reads the `end_value` of each value
    pub fn requires_two_values(&self) -> bool {
        matches!(self, Self::Between)
    }

    /// Returns true if the cell alone decides the result
    pub fn ignores_values(&self) -> bool {
        matches!(self, Self::Never)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the values of one filter combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    #[default]
    Or,
}

/// One entry of a filter's value list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterValue {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub value: String,
    /// Upper bound, only read by `between`
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_string_or_number"
    )]
    pub end_value: Option<String>,
}

impl FilterValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            value: value.into(),
            end_value: None,
        }
    }

    pub fn range(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            value: start.into(),
            end_value: Some(end.into()),
        }
    }
}

/// A single row of the filter dialog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCondition {
    #[serde(default = "new_id")]
    pub id: String,
    pub column: String,
    pub column_type: ColumnType,
    pub operator: FilterOperator,
    #[serde(default)]
    pub values: Vec<FilterValue>,
    #[serde(default)]
    pub values_logical_operator: LogicalOperator,
}

impl FilterCondition {
    /// Create a filter with no values yet
    pub fn new(
        column: impl Into<String>,
        column_type: ColumnType,
        operator: FilterOperator,
    ) -> Self {
        Self {
            id: new_id(),
            column: column.into(),
            column_type,
            operator,
            values: Vec::new(),
            values_logical_operator: LogicalOperator::default(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.values.push(FilterValue::new(value));
        self
    }

    pub fn with_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.values.push(FilterValue::range(start, end));
        self
    }

    pub fn combined_with(mut self, logical: LogicalOperator) -> Self {
        self.values_logical_operator = logical;
        self
    }

    /// A filter without values matches every row
    pub fn is_vacuous(&self) -> bool {
        self.values.is_empty()
    }

    /// Check the operator against the column type and that every value
    /// coerces to the column's kind
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(expected) = column_type_of(&self.column) {
            if expected != self.column_type {
                return Err(ValidationError::ColumnTypeMismatch {
                    column: self.column.clone(),
                    expected,
                    found: self.column_type,
                });
            }
        }

        if !self.column_type.supports(self.operator) {
            return Err(ValidationError::InvalidOperator {
                column: self.column.clone(),
                column_type: self.column_type,
                operator: self.operator,
            });
        }

        if self.operator.ignores_values() {
            return Ok(());
        }

        for value in &self.values {
            if self.operator.requires_two_values() && value.end_value.is_none() {
                return Err(ValidationError::MissingEndValue {
                    column: self.column.clone(),
                });
            }

            let bounds = std::iter::once(&value.value).chain(
                value
                    .end_value
                    .as_ref()
                    .filter(|_| self.operator.requires_two_values()),
            );
            for raw in bounds {
                self.validate_scalar(raw)?;
            }
        }

        Ok(())
    }

    fn validate_scalar(&self, raw: &str) -> Result<(), ValidationError> {
        match self.column_type {
            ColumnType::Number | ColumnType::Percentage if parse_number(raw).is_none() => {
                Err(ValidationError::InvalidNumber {
                    column: self.column.clone(),
                    value: raw.to_string(),
                })
            }
            ColumnType::Date if parse_day(raw).is_none() => Err(ValidationError::InvalidDate {
                column: self.column.clone(),
                value: raw.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Text(text) => text,
            Scalar::Number(number) => number.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Scalar::deserialize(deserializer).map(String::from)
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_numeric_value() {
        let filter: FilterCondition = serde_json::from_str(
            r#"{"column":"acos","columnType":"percentage","operator":"greater_than","values":[{"value":50}]}"#,
        )
        .unwrap();

        assert_eq!(filter.values[0].value, "50");
        assert_eq!(filter.values_logical_operator, LogicalOperator::Or);
        assert!(!filter.id.is_empty());
        assert!(filter.validate().is_ok());
    }

    #[test]
    fn test_deserialize_between_range() {
        let filter: FilterCondition = serde_json::from_str(
            r#"{"id":"f1","column":"startDate","columnType":"date","operator":"between",
                "values":[{"id":"v1","value":"2025-03-01","endValue":"2025-03-31"}],
                "valuesLogicalOperator":"AND"}"#,
        )
        .unwrap();

        assert_eq!(filter.values[0].end_value.as_deref(), Some("2025-03-31"));
        assert_eq!(filter.values_logical_operator, LogicalOperator::And);
    }

    #[test]
    fn test_operator_must_match_column_type() {
        let filter = FilterCondition::new("campaign", ColumnType::Text, FilterOperator::GreaterThan)
            .with_value("x");
        assert!(matches!(
            filter.validate(),
            Err(ValidationError::InvalidOperator { .. })
        ));
    }

    #[test]
    fn test_column_type_must_match_catalog() {
        let filter = FilterCondition::new("acos", ColumnType::Text, FilterOperator::Contains)
            .with_value("5");
        assert!(matches!(
            filter.validate(),
            Err(ValidationError::ColumnTypeMismatch {
                expected: ColumnType::Percentage,
                found: ColumnType::Text,
                ..
            })
        ));

        let state = FilterCondition::new("state", ColumnType::Enum, FilterOperator::Equals)
            .with_value("paused");
        assert!(state.validate().is_ok());

        // Columns outside the catalog keep their declared kind
        let custom = FilterCondition::new("margin", ColumnType::Number, FilterOperator::LessThan)
            .with_value("3");
        assert!(custom.validate().is_ok());
    }

    #[test]
    fn test_unparseable_values_are_rejected() {
        let number = FilterCondition::new("spend", ColumnType::Number, FilterOperator::LessThan)
            .with_value("lots");
        assert!(matches!(
            number.validate(),
            Err(ValidationError::InvalidNumber { .. })
        ));

        let date = FilterCondition::new("startDate", ColumnType::Date, FilterOperator::Before)
            .with_value("someday");
        assert!(matches!(date.validate(), Err(ValidationError::InvalidDate { .. })));

        let range = FilterCondition::new("spend", ColumnType::Number, FilterOperator::Between)
            .with_value("10");
        assert!(matches!(
            range.validate(),
            Err(ValidationError::MissingEndValue { .. })
        ));
    }

    #[test]
    fn test_never_ignores_values() {
        let filter = FilterCondition::new("lastOptimized", ColumnType::Date, FilterOperator::Never)
            .with_value("");
        assert!(filter.validate().is_ok());
    }
}
