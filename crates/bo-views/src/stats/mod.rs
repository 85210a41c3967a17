//! Summary statistics over the rows currently shown

use bo_core::{CampaignRow, CellValue, Row, Summary};
use serde::Serialize;

/// Metric columns summarised by default
pub const DEFAULT_STAT_COLUMNS: &[&str] = &[
    "impressions",
    "clicks",
    "orders",
    "spend",
    "sales",
    "acos",
    "roas",
];

/// Distribution of one numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub empty_count: usize,
    pub numeric: Option<NumericStats>,
}

/// Totals of the visible rows plus per-column distributions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub totals: Summary,
    pub columns: Vec<ColumnStats>,
}

impl SummaryStats {
    pub fn from_campaigns(rows: &[&CampaignRow], columns: &[&str]) -> Self {
        Self {
            totals: Summary::from_campaigns(rows.iter().copied()),
            columns: columns.iter().map(|c| column_stats(rows, c)).collect(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnStats> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Statistics of one column; text cells count as non-numeric
pub fn column_stats<R: Row>(rows: &[R], column: &str) -> ColumnStats {
    let mut values = Vec::with_capacity(rows.len());
    let mut empty_count = 0;
    for row in rows {
        match row.cell(column) {
            CellValue::Number(value) => values.push(value),
            CellValue::Empty => empty_count += 1,
            CellValue::Text(_) => {}
        }
    }

    ColumnStats {
        name: column.to_string(),
        count: rows.len(),
        empty_count,
        numeric: numeric_stats(values),
    }
}

fn numeric_stats(mut values: Vec<f64>) -> Option<NumericStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let mid = values.len() / 2;
    let median = if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    };

    Some(NumericStats {
        min: values[0],
        max: values[values.len() - 1],
        mean,
        std_dev: variance.sqrt(),
        median,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, spend: f64, sales: f64) -> CampaignRow {
        let mut row = CampaignRow::new(id, format!("Campaign {id}"));
        row.spend = spend;
        row.sales = sales;
        row.clicks = 10;
        row.derive_metrics();
        row
    }

    #[test]
    fn test_totals_and_distribution() {
        let rows = vec![row("1", 10.0, 40.0), row("2", 30.0, 40.0), row("3", 20.0, 0.0)];
        let refs: Vec<&CampaignRow> = rows.iter().collect();

        let stats = SummaryStats::from_campaigns(&refs, DEFAULT_STAT_COLUMNS);
        assert_eq!(stats.totals.spend, 60.0);
        assert_eq!(stats.totals.sales, 80.0);
        assert_eq!(stats.totals.acos, 75.0);

        let spend = stats.column("spend").unwrap().numeric.clone().unwrap();
        assert_eq!(spend.min, 10.0);
        assert_eq!(spend.max, 30.0);
        assert_eq!(spend.median, 20.0);
        assert_eq!(spend.mean, 20.0);
    }

    #[test]
    fn test_text_and_empty_cells() {
        let rows = vec![row("1", 10.0, 0.0), row("2", 20.0, 0.0)];
        let stats = column_stats(&rows, "optGroup");
        assert_eq!(stats.count, 2);
        assert_eq!(stats.empty_count, 2);
        assert!(stats.numeric.is_none());

        let even = column_stats(&rows, "spend");
        assert_eq!(even.numeric.unwrap().median, 15.0);
    }
}
