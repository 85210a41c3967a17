//! Campaign rows and cell access

use serde::{Deserialize, Serialize};

use super::parse_number;

/// A single cell as seen by the filter and sort engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Text(&'a str),
    Number(f64),
    Empty,
}

impl<'a> CellValue<'a> {
    /// Wrap an optional text field, mapping blanks to `Empty`
    pub fn from_text(value: Option<&'a str>) -> Self {
        match value {
            Some(text) if !text.trim().is_empty() => CellValue::Text(text),
            _ => CellValue::Empty,
        }
    }

    /// Numeric view of the cell
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(number) if number.is_finite() => Some(*number),
            CellValue::Number(_) => None,
            CellValue::Text(text) => parse_number(text),
            CellValue::Empty => None,
        }
    }

    /// Text view of the cell; numbers are rendered without trailing zeros
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(text) => (*text).to_string(),
            CellValue::Number(number) => number.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

/// Anything that can be filtered and sorted by column key
pub trait Row {
    /// Stable identifier of the row
    fn row_id(&self) -> &str;

    /// Look up a cell by column key; unknown keys yield `CellValue::Empty`
    fn cell(&self, column: &str) -> CellValue<'_>;
}

impl<R: Row + ?Sized> Row for &R {
    fn row_id(&self) -> &str {
        (**self).row_id()
    }

    fn cell(&self, column: &str) -> CellValue<'_> {
        (**self).cell(column)
    }
}

/// Campaign performance record as delivered by the reporting backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignRow {
    pub id: String,
    pub campaign_name: String,
    /// Sponsored ad product (`SP`, `SB`, `SD`)
    pub ad_type: String,
    /// Delivery state (`enabled`, `paused`, `archived`)
    pub state: String,
    /// Optimization group label
    pub opt_group: Option<String>,
    pub budget: f64,
    pub bid: f64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub last_optimized: Option<String>,

    pub impressions: u64,
    pub clicks: u64,
    pub orders: u64,
    pub units: u64,
    pub ctr: f64,
    pub cvr: f64,
    pub cpc: f64,
    pub spend: f64,
    pub sales: f64,
    pub acos: f64,
    pub rpc: f64,
    pub roas: f64,
}

impl CampaignRow {
    /// Create an empty row with identity fields set
    pub fn new(id: impl Into<String>, campaign_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            campaign_name: campaign_name.into(),
            ..Default::default()
        }
    }

    /// Recompute the ratio metrics from the raw counters
    pub fn derive_metrics(&mut self) {
        use super::derive_ratio;

        let impressions = self.impressions as f64;
        let clicks = self.clicks as f64;
        let orders = self.orders as f64;

        self.ctr = derive_ratio(clicks * 100.0, impressions);
        self.cvr = derive_ratio(orders * 100.0, clicks);
        self.cpc = derive_ratio(self.spend, clicks);
        self.acos = derive_ratio(self.spend * 100.0, self.sales);
        self.rpc = derive_ratio(self.sales, clicks);
        self.roas = derive_ratio(self.sales, self.spend);
    }
}

impl Row for CampaignRow {
    fn row_id(&self) -> &str {
        &self.id
    }

    fn cell(&self, column: &str) -> CellValue<'_> {
        match column {
            "id" => CellValue::Text(&self.id),
            "campaign" | "campaignName" => CellValue::Text(&self.campaign_name),
            "adType" => CellValue::from_text(Some(self.ad_type.as_str())),
            "state" => CellValue::from_text(Some(self.state.as_str())),
            "optGroup" => CellValue::from_text(self.opt_group.as_deref()),
            "startDate" => CellValue::from_text(self.start_date.as_deref()),
            "endDate" => CellValue::from_text(self.end_date.as_deref()),
            "lastOptimized" => CellValue::from_text(self.last_optimized.as_deref()),
            "budget" => CellValue::Number(self.budget),
            "bid" => CellValue::Number(self.bid),
            "impressions" => CellValue::Number(self.impressions as f64),
            "clicks" => CellValue::Number(self.clicks as f64),
            "orders" => CellValue::Number(self.orders as f64),
            "units" => CellValue::Number(self.units as f64),
            "ctr" => CellValue::Number(self.ctr),
            "cvr" => CellValue::Number(self.cvr),
            "cpc" => CellValue::Number(self.cpc),
            "spend" => CellValue::Number(self.spend),
            "sales" => CellValue::Number(self.sales),
            "acos" => CellValue::Number(self.acos),
            "rpc" => CellValue::Number(self.rpc),
            "roas" => CellValue::Number(self.roas),
            _ => CellValue::Empty,
        }
    }
}
