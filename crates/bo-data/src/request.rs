//! Report requests and the server/client filter split

use bo_core::{
    ColumnType, DateRange, FilterCondition, FilterOperator, FilterValue, LogicalOperator,
};
use serde::{Deserialize, Serialize};

use crate::DataError;

/// Filter columns the reporting backend evaluates itself; every other
/// filter runs client-side over the returned rows
pub const SERVER_SIDE_COLUMNS: &[&str] = &[
    "campaign",
    "adType",
    "state",
    "impressions",
    "clicks",
    "spend",
    "sales",
    "acos",
];

/// One value of a pushed-down filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerValue {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// Backend representation of a filter condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerFilter {
    /// Backend field name
    pub field: String,
    pub column_type: ColumnType,
    pub operator: FilterOperator,
    pub values: Vec<ServerValue>,
    pub logic: LogicalOperator,
}

impl ServerFilter {
    pub fn from_condition(condition: &FilterCondition) -> Self {
        Self {
            field: backend_field(&condition.column).to_string(),
            column_type: condition.column_type,
            operator: condition.operator,
            values: condition
                .values
                .iter()
                .map(|v| ServerValue {
                    value: v.value.clone(),
                    end: v.end_value.clone(),
                })
                .collect(),
            logic: condition.values_logical_operator,
        }
    }

    /// Rebuild an evaluable condition; row lookups accept backend field names
    pub fn to_condition(&self) -> FilterCondition {
        let mut condition =
            FilterCondition::new(self.field.clone(), self.column_type, self.operator)
                .combined_with(self.logic);
        condition.values = self
            .values
            .iter()
            .map(|v| match &v.end {
                Some(end) => FilterValue::range(v.value.clone(), end.clone()),
                None => FilterValue::new(v.value.clone()),
            })
            .collect();
        condition
    }
}

fn backend_field(column: &str) -> &str {
    match column {
        "campaign" => "campaignName",
        other => other,
    }
}

/// Split active filters into the backend payload and the client-side rest.
/// Vacuous filters are dropped from both sides.
pub fn split_filters<S: AsRef<str>>(
    filters: &[FilterCondition],
    server_columns: &[S],
) -> (Vec<ServerFilter>, Vec<FilterCondition>) {
    let mut server = Vec::new();
    let mut client = Vec::new();

    for filter in filters.iter().filter(|f| !f.is_vacuous()) {
        if server_columns.iter().any(|c| c.as_ref() == filter.column) {
            server.push(ServerFilter::from_condition(filter));
        } else {
            client.push(filter.clone());
        }
    }

    (server, client)
}

/// Parameters of one report fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub profile_id: String,
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// `YYYY-MM-DD`
    pub end_date: String,
    pub filters: Vec<ServerFilter>,
}

impl ReportRequest {
    pub fn new(
        profile_id: impl Into<String>,
        range: &DateRange,
        filters: Vec<ServerFilter>,
    ) -> Self {
        Self {
            profile_id: profile_id.into(),
            start_date: range.start_string(),
            end_date: range.end_string(),
            filters,
        }
    }

    /// Parse the request's dates back into a range
    pub fn date_range(&self) -> Result<DateRange, DataError> {
        DateRange::parse(&self.start_date, &self.end_date)
            .map_err(|e| DataError::Request(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pushes_known_columns() {
        let filters = vec![
            FilterCondition::new("acos", ColumnType::Percentage, FilterOperator::GreaterThan)
                .with_value("50"),
            FilterCondition::new("roas", ColumnType::Number, FilterOperator::LessThan)
                .with_value("2"),
            FilterCondition::new("campaign", ColumnType::Text, FilterOperator::Contains)
                .with_value("brand"),
            FilterCondition::new("spend", ColumnType::Number, FilterOperator::GreaterThan),
        ];

        let (server, client) = split_filters(&filters, SERVER_SIDE_COLUMNS);
        assert_eq!(server.len(), 2);
        assert_eq!(server[0].field, "acos");
        assert_eq!(server[1].field, "campaignName");
        assert_eq!(client.len(), 1);
        assert_eq!(client[0].column, "roas");
    }

    #[test]
    fn test_server_filter_payload_shape() {
        let filter = FilterCondition::new("spend", ColumnType::Number, FilterOperator::Between)
            .with_range("10", "20");
        let payload = serde_json::to_value(ServerFilter::from_condition(&filter)).unwrap();

        assert_eq!(payload["field"], "spend");
        assert_eq!(payload["operator"], "between");
        assert_eq!(payload["logic"], "OR");
        assert_eq!(payload["values"][0]["end"], "20");
    }

    #[test]
    fn test_to_condition_keeps_semantics() {
        let filter = FilterCondition::new("campaign", ColumnType::Text, FilterOperator::Contains)
            .with_value("brand")
            .combined_with(LogicalOperator::And);
        let rebuilt = ServerFilter::from_condition(&filter).to_condition();

        assert_eq!(rebuilt.column, "campaignName");
        assert_eq!(rebuilt.operator, FilterOperator::Contains);
        assert_eq!(rebuilt.values_logical_operator, LogicalOperator::And);
        assert_eq!(rebuilt.values[0].value, "brand");
    }

    #[test]
    fn test_request_dates() {
        let range = DateRange::parse("2025-03-01", "2025-03-31").unwrap();
        let request = ReportRequest::new("p1", &range, Vec::new());
        assert_eq!(request.start_date, "2025-03-01");
        assert_eq!(request.date_range().unwrap(), range);
    }
}
