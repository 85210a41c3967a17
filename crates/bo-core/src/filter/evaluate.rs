//! Row-by-row filter evaluation

use chrono::NaiveDate;

use super::{ColumnType, FilterCondition, FilterOperator, FilterValue, LogicalOperator};
use crate::model::{parse_day, parse_number, CellValue, NullConfig, Row};

/// Evaluates filter conditions against rows.
///
/// Evaluation never fails. A filter value that does not coerce to the
/// column's kind is a no-op match; a row cell that does not coerce never
/// satisfies a comparison.
#[derive(Debug, Clone, Default)]
pub struct FilterEvaluator {
    nulls: NullConfig,
}

impl FilterEvaluator {
    pub fn new(nulls: NullConfig) -> Self {
        Self { nulls }
    }

    /// Does `row` satisfy `condition`?
    pub fn matches<R: Row + ?Sized>(&self, row: &R, condition: &FilterCondition) -> bool {
        if condition.is_vacuous() {
            return true;
        }

        let cell = row.cell(&condition.column);
        match condition.column_type {
            ColumnType::Text => self.matches_text(&cell, condition),
            ColumnType::Enum => self.matches_enum(&cell, condition),
            ColumnType::Date => self.matches_date(&cell, condition),
            ColumnType::Number | ColumnType::Percentage => self.matches_number(&cell, condition),
        }
    }

    /// Does `row` satisfy every filter?
    pub fn matches_all<R: Row + ?Sized>(&self, row: &R, filters: &[FilterCondition]) -> bool {
        filters.iter().all(|filter| self.matches(row, filter))
    }

    /// Keep the rows that satisfy every filter, in input order
    pub fn apply<'a, R: Row>(&self, rows: &'a [R], filters: &[FilterCondition]) -> Vec<&'a R> {
        rows.iter()
            .filter(|row| self.matches_all(*row, filters))
            .collect()
    }

    fn matches_text(&self, cell: &CellValue<'_>, condition: &FilterCondition) -> bool {
        let haystack = cell.as_text().to_lowercase();

        combine(condition, |value| {
            let needle = value.value.to_lowercase();
            match condition.operator {
                FilterOperator::Contains => haystack.contains(&needle),
                FilterOperator::NotContains => !haystack.contains(&needle),
                FilterOperator::Equals => haystack == needle,
                FilterOperator::NotEquals => haystack != needle,
                FilterOperator::StartsWith => haystack.starts_with(&needle),
                FilterOperator::EndsWith => haystack.ends_with(&needle),
                _ => true,
            }
        })
    }

    fn matches_enum(&self, cell: &CellValue<'_>, condition: &FilterCondition) -> bool {
        let current = cell.as_text().to_lowercase();
        let selected = combine(condition, |value| value.value.to_lowercase() == current);

        match condition.operator {
            FilterOperator::Equals => selected,
            FilterOperator::NotEquals => !selected,
            _ => true,
        }
    }

    fn matches_date(&self, cell: &CellValue<'_>, condition: &FilterCondition) -> bool {
        if condition.operator == FilterOperator::Never {
            return self.nulls.is_null_cell(cell);
        }

        let day = match cell {
            CellValue::Text(text) if !self.nulls.is_null(text) => parse_day(text),
            _ => None,
        };
        let Some(day) = day else {
            return false;
        };

        combine(condition, |value| {
            let Some(bound) = parse_day(&value.value) else {
                return true;
            };
            match condition.operator {
                FilterOperator::Before => day < bound,
                FilterOperator::After => day > bound,
                FilterOperator::Equals => day == bound,
                FilterOperator::Between => {
                    match value.end_value.as_deref().and_then(parse_day) {
                        Some(end) => within(day, bound, end),
                        None => true,
                    }
                }
                _ => true,
            }
        })
    }

    fn matches_number(&self, cell: &CellValue<'_>, condition: &FilterCondition) -> bool {
        let Some(number) = cell.as_number() else {
            return false;
        };

        combine(condition, |value| {
            let Some(bound) = parse_number(&value.value) else {
                return true;
            };
            match condition.operator {
                FilterOperator::LessThan => number < bound,
                FilterOperator::LessThanEqual => number <= bound,
                FilterOperator::Equals => number == bound,
                FilterOperator::NotEquals => number != bound,
                FilterOperator::GreaterThanEqual => number >= bound,
                FilterOperator::GreaterThan => number > bound,
                FilterOperator::Between => match value.end_value.as_deref().and_then(parse_number) {
                    Some(end) => bound <= number && number <= end,
                    None => true,
                },
                _ => true,
            }
        })
    }
}

fn within(day: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    start <= day && day <= end
}

/// Fold the per-value results with the filter's logical operator
fn combine(condition: &FilterCondition, mut test: impl FnMut(&FilterValue) -> bool) -> bool {
    match condition.values_logical_operator {
        LogicalOperator::And => condition.values.iter().all(|value| test(value)),
        LogicalOperator::Or => condition.values.iter().any(|value| test(value)),
    }
}

/// Evaluate one condition with the default empty-value markers
pub fn matches<R: Row + ?Sized>(row: &R, condition: &FilterCondition) -> bool {
    FilterEvaluator::default().matches(row, condition)
}

/// Evaluate a filter set with the default empty-value markers
pub fn matches_all<R: Row + ?Sized>(row: &R, filters: &[FilterCondition]) -> bool {
    FilterEvaluator::default().matches_all(row, filters)
}

/// Filter rows with the default empty-value markers, preserving order
pub fn apply_filters<'a, R: Row>(rows: &'a [R], filters: &[FilterCondition]) -> Vec<&'a R> {
    FilterEvaluator::default().apply(rows, filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CampaignRow;

    fn campaign(id: &str, name: &str, spend: f64, acos: f64) -> CampaignRow {
        CampaignRow {
            spend,
            acos,
            ad_type: "SP".to_string(),
            state: "enabled".to_string(),
            ..CampaignRow::new(id, name)
        }
    }

    fn sample_rows() -> Vec<CampaignRow> {
        vec![
            campaign("1", "a FOOBAR b", 10.0, 20.0),
            campaign("2", "Brand Exact", 20.0, 55.0),
            campaign("3", "Generic Broad", 30.0, 50.0),
            campaign("4", "bar only", 40.0, 75.5),
        ]
    }

    #[test]
    fn test_empty_filter_set_keeps_all_rows_in_order() {
        let rows = sample_rows();
        let kept = apply_filters(&rows, &[]);
        assert_eq!(kept.len(), rows.len());

        let vacuous = vec![
            FilterCondition::new("acos", ColumnType::Percentage, FilterOperator::GreaterThan),
            FilterCondition::new("campaign", ColumnType::Text, FilterOperator::Contains),
        ];
        let kept: Vec<&str> = apply_filters(&rows, &vacuous)
            .into_iter()
            .map(|row| row.id.as_str())
            .collect();
        assert_eq!(kept, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_text_contains_or_is_case_insensitive() {
        let filter = FilterCondition::new("campaign", ColumnType::Text, FilterOperator::Contains)
            .with_value("foo")
            .with_value("BAR")
            .combined_with(LogicalOperator::Or);

        let rows = sample_rows();
        assert!(matches(&rows[0], &filter));
        assert!(!matches(&rows[1], &filter));
        assert!(matches(&rows[3], &filter));
    }

    #[test]
    fn test_text_and_requires_every_value() {
        let filter = FilterCondition::new("campaign", ColumnType::Text, FilterOperator::Contains)
            .with_value("foo")
            .with_value("bar")
            .combined_with(LogicalOperator::And);

        let rows = sample_rows();
        assert!(matches(&rows[0], &filter));
        assert!(!matches(&rows[3], &filter));
    }

    #[test]
    fn test_text_prefix_suffix_and_negation() {
        let row = campaign("1", "Brand Exact", 0.0, 0.0);
        let starts = FilterCondition::new("campaign", ColumnType::Text, FilterOperator::StartsWith)
            .with_value("brand");
        let ends = FilterCondition::new("campaign", ColumnType::Text, FilterOperator::EndsWith)
            .with_value("EXACT");
        let not_contains =
            FilterCondition::new("campaign", ColumnType::Text, FilterOperator::NotContains)
                .with_value("broad");
        let not_equals =
            FilterCondition::new("campaign", ColumnType::Text, FilterOperator::NotEquals)
                .with_value("brand exact");

        assert!(matches(&row, &starts));
        assert!(matches(&row, &ends));
        assert!(matches(&row, &not_contains));
        assert!(!matches(&row, &not_equals));
    }

    #[test]
    fn test_enum_membership() {
        let mut paused = campaign("2", "Paused", 0.0, 0.0);
        paused.state = "paused".to_string();
        let enabled = campaign("1", "Enabled", 0.0, 0.0);

        let any_of = FilterCondition::new("state", ColumnType::Enum, FilterOperator::Equals)
            .with_value("enabled")
            .with_value("archived");
        assert!(matches(&enabled, &any_of));
        assert!(!matches(&paused, &any_of));

        let none_of = FilterCondition {
            operator: FilterOperator::NotEquals,
            ..any_of.clone()
        };
        assert!(!matches(&enabled, &none_of));
        assert!(matches(&paused, &none_of));

        // AND over a single-valued field only holds when every selection is the row value
        let all_of = any_of.combined_with(LogicalOperator::And);
        assert!(!matches(&enabled, &all_of));
        let single = FilterCondition::new("state", ColumnType::Enum, FilterOperator::Equals)
            .with_value("ENABLED")
            .combined_with(LogicalOperator::And);
        assert!(matches(&enabled, &single));
    }

    #[test]
    fn test_number_between_is_inclusive() {
        let filter = FilterCondition::new("spend", ColumnType::Number, FilterOperator::Between)
            .with_range("20", "30");
        let rows = sample_rows();

        assert!(!matches(&rows[0], &filter));
        assert!(matches(&rows[1], &filter));
        assert!(matches(&rows[2], &filter));
        assert!(!matches(&rows[3], &filter));
    }

    #[test]
    fn test_number_comparisons() {
        let row = campaign("1", "x", 25.0, 50.0);
        let cases = [
            (FilterOperator::LessThan, "25", false),
            (FilterOperator::LessThanEqual, "25", true),
            (FilterOperator::Equals, "25", true),
            (FilterOperator::NotEquals, "25", false),
            (FilterOperator::GreaterThanEqual, "25", true),
            (FilterOperator::GreaterThan, "24.99", true),
        ];
        for (operator, value, expected) in cases {
            let filter =
                FilterCondition::new("spend", ColumnType::Number, operator).with_value(value);
            assert_eq!(matches(&row, &filter), expected, "{operator} {value}");
        }
    }

    #[test]
    fn test_percentage_accepts_percent_sign() {
        let filter =
            FilterCondition::new("acos", ColumnType::Percentage, FilterOperator::GreaterThan)
                .with_value("50%");
        let rows = sample_rows();
        let kept: Vec<&str> = apply_filters(&rows, std::slice::from_ref(&filter))
            .into_iter()
            .map(|row| row.id.as_str())
            .collect();
        assert_eq!(kept, vec!["2", "4"]);
    }

    #[test]
    fn test_unparseable_filter_value_is_permissive() {
        let filter = FilterCondition::new("spend", ColumnType::Number, FilterOperator::GreaterThan)
            .with_value("not a number");
        assert!(matches(&sample_rows()[0], &filter));
    }

    #[test]
    fn test_date_between_is_inclusive_by_day() {
        let filter = FilterCondition::new("startDate", ColumnType::Date, FilterOperator::Between)
            .with_range("2025-03-01", "2025-03-31");

        let mut last_day = campaign("1", "x", 0.0, 0.0);
        last_day.start_date = Some("2025-03-31T00:00".to_string());
        let mut next_month = campaign("2", "y", 0.0, 0.0);
        next_month.start_date = Some("2025-04-01T00:00".to_string());

        assert!(matches(&last_day, &filter));
        assert!(!matches(&next_month, &filter));
    }

    #[test]
    fn test_date_before_after_equals() {
        let mut row = campaign("1", "x", 0.0, 0.0);
        row.start_date = Some("2025-03-15T18:30:00".to_string());

        let before = FilterCondition::new("startDate", ColumnType::Date, FilterOperator::Before)
            .with_value("2025-03-16");
        let after = FilterCondition::new("startDate", ColumnType::Date, FilterOperator::After)
            .with_value("2025-03-15");
        let same_day = FilterCondition::new("startDate", ColumnType::Date, FilterOperator::Equals)
            .with_value("2025-03-15");

        assert!(matches(&row, &before));
        assert!(!matches(&row, &after));
        assert!(matches(&row, &same_day));
    }

    #[test]
    fn test_date_never_matches_empty_or_marker() {
        let filter = FilterCondition::new("lastOptimized", ColumnType::Date, FilterOperator::Never)
            .with_value("");

        let mut never = campaign("1", "x", 0.0, 0.0);
        never.last_optimized = Some("Never".to_string());
        let missing = campaign("2", "y", 0.0, 0.0);
        let mut optimized = campaign("3", "z", 0.0, 0.0);
        optimized.last_optimized = Some("2025-02-01".to_string());

        assert!(matches(&never, &filter));
        assert!(matches(&missing, &filter));
        assert!(!matches(&optimized, &filter));

        let before = FilterCondition::new("lastOptimized", ColumnType::Date, FilterOperator::Before)
            .with_value("2030-01-01");
        assert!(!matches(&never, &before));
    }

    #[test]
    fn test_all_filters_must_match() {
        let filters = vec![
            FilterCondition::new("acos", ColumnType::Percentage, FilterOperator::GreaterThan)
                .with_value("50"),
            FilterCondition::new("campaign", ColumnType::Text, FilterOperator::Contains)
                .with_value("brand"),
        ];
        let rows = sample_rows();
        let kept: Vec<&str> = apply_filters(&rows, &filters)
            .into_iter()
            .map(|row| row.id.as_str())
            .collect();
        assert_eq!(kept, vec!["2"]);
    }
}
