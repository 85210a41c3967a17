//! Report payloads: campaign rows, account summary and daily series

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::CampaignRow;

/// `numerator / denominator`, or `0` when the denominator is not positive
pub fn derive_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Totals and derived ratios over a set of campaigns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Summary {
    pub campaigns: usize,
    pub impressions: u64,
    pub clicks: u64,
    pub orders: u64,
    pub units: u64,
    pub spend: f64,
    pub sales: f64,
    pub ctr: f64,
    pub cvr: f64,
    pub cpc: f64,
    pub acos: f64,
    pub rpc: f64,
    pub roas: f64,
}

impl Summary {
    /// Aggregate a campaign set
    pub fn from_campaigns<'a>(campaigns: impl IntoIterator<Item = &'a CampaignRow>) -> Self {
        let mut summary = Summary::default();
        for campaign in campaigns {
            summary.campaigns += 1;
            summary.impressions += campaign.impressions;
            summary.clicks += campaign.clicks;
            summary.orders += campaign.orders;
            summary.units += campaign.units;
            summary.spend += campaign.spend;
            summary.sales += campaign.sales;
        }

        let impressions = summary.impressions as f64;
        let clicks = summary.clicks as f64;
        let orders = summary.orders as f64;

        summary.ctr = derive_ratio(clicks * 100.0, impressions);
        summary.cvr = derive_ratio(orders * 100.0, clicks);
        summary.cpc = derive_ratio(summary.spend, clicks);
        summary.acos = derive_ratio(summary.spend * 100.0, summary.sales);
        summary.rpc = derive_ratio(summary.sales, clicks);
        summary.roas = derive_ratio(summary.sales, summary.spend);
        summary
    }
}

/// One point of the account-level time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPerformance {
    pub date: NaiveDate,
    pub impressions: u64,
    pub clicks: u64,
    pub orders: u64,
    pub spend: f64,
    pub sales: f64,
    pub acos: f64,
}

impl DailyPerformance {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            impressions: 0,
            clicks: 0,
            orders: 0,
            spend: 0.0,
            sales: 0.0,
            acos: 0.0,
        }
    }

    /// Recompute ACOS after the counters were accumulated
    pub fn finish(&mut self) {
        self.acos = derive_ratio(self.spend * 100.0, self.sales);
    }
}

/// Everything one fetch returns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignReport {
    pub campaigns: Vec<CampaignRow>,
    pub summary: Summary,
    #[serde(rename = "daily_performance", alias = "dailyPerformance")]
    pub daily_performance: Vec<DailyPerformance>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_totals_and_ratios() {
        let a = CampaignRow {
            impressions: 600,
            clicks: 30,
            orders: 3,
            spend: 15.0,
            sales: 60.0,
            ..CampaignRow::new("a", "A")
        };
        let b = CampaignRow {
            impressions: 400,
            clicks: 20,
            orders: 2,
            spend: 10.0,
            sales: 40.0,
            ..CampaignRow::new("b", "B")
        };

        let summary = Summary::from_campaigns([&a, &b]);
        assert_eq!(summary.campaigns, 2);
        assert_eq!(summary.impressions, 1000);
        assert_eq!(summary.clicks, 50);
        assert_eq!(summary.ctr, 5.0);
        assert_eq!(summary.acos, 25.0);
        assert_eq!(summary.roas, 4.0);
    }

    #[test]
    fn test_empty_summary_has_zero_ratios() {
        let summary = Summary::from_campaigns(std::iter::empty());
        assert_eq!(summary.campaigns, 0);
        assert_eq!(summary.acos, 0.0);
        assert_eq!(summary.cpc, 0.0);
    }
}
