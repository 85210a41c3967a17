//! In-memory report backend over daily campaign records

use std::collections::BTreeMap;

use ahash::{AHashMap, AHashSet};
use async_trait::async_trait;
use bo_core::{CampaignReport, CampaignRow, DailyPerformance, FilterEvaluator, NullConfig, Summary};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::CampaignSource;
use crate::request::ReportRequest;
use crate::DataError;

/// One campaign's performance on one day, as exported by the ads console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    pub date: NaiveDate,
    /// Records without a profile belong to every profile
    #[serde(default)]
    pub profile_id: Option<String>,
    pub campaign_id: String,
    pub campaign_name: String,
    #[serde(default)]
    pub ad_type: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub opt_group: Option<String>,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub bid: f64,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub last_optimized: Option<String>,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub orders: u64,
    #[serde(default)]
    pub units: u64,
    #[serde(default)]
    pub spend: f64,
    #[serde(default)]
    pub sales: f64,
}

impl DailyRecord {
    fn belongs_to(&self, profile_id: &str) -> bool {
        self.profile_id.as_deref().map_or(true, |p| p == profile_id)
    }

    fn apply_identity(&self, row: &mut CampaignRow) {
        row.campaign_name = self.campaign_name.clone();
        row.ad_type = self.ad_type.clone();
        row.state = self.state.clone();
        row.opt_group = self.opt_group.clone();
        row.budget = self.budget;
        row.bid = self.bid;
        row.start_date = self.start_date.clone();
        row.end_date = self.end_date.clone();
        row.last_optimized = self.last_optimized.clone();
    }
}

/// Serves reports by aggregating daily records held in memory
pub struct MemorySource {
    name: String,
    records: Vec<DailyRecord>,
    evaluator: FilterEvaluator,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, records: Vec<DailyRecord>) -> Self {
        Self {
            name: name.into(),
            records,
            evaluator: FilterEvaluator::default(),
        }
    }

    /// Use custom empty-value markers when evaluating pushed filters
    pub fn with_null_config(mut self, nulls: NullConfig) -> Self {
        self.evaluator = FilterEvaluator::new(nulls);
        self
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Build a report synchronously; checks `cancel` between stages
    pub fn build_report(
        &self,
        request: &ReportRequest,
        cancel: &CancellationToken,
    ) -> Result<CampaignReport, DataError> {
        let range = request.date_range()?;
        let selected: Vec<&DailyRecord> = self
            .records
            .iter()
            .filter(|r| r.belongs_to(&request.profile_id) && range.contains(r.date))
            .collect();

        // Aggregate per campaign in first-seen order; identity comes from the latest day
        let mut index: AHashMap<&str, usize> = AHashMap::new();
        let mut campaigns: Vec<(CampaignRow, NaiveDate)> = Vec::new();
        for record in &selected {
            let slot = match index.get(record.campaign_id.as_str()) {
                Some(&slot) => slot,
                None => {
                    let mut row = CampaignRow::new(record.campaign_id.clone(), "");
                    record.apply_identity(&mut row);
                    campaigns.push((row, record.date));
                    index.insert(record.campaign_id.as_str(), campaigns.len() - 1);
                    campaigns.len() - 1
                }
            };
            let (row, latest) = &mut campaigns[slot];
            if record.date >= *latest {
                record.apply_identity(row);
                *latest = record.date;
            }
            row.impressions += record.impressions;
            row.clicks += record.clicks;
            row.orders += record.orders;
            row.units += record.units;
            row.spend += record.spend;
            row.sales += record.sales;
        }

        if cancel.is_cancelled() {
            return Err(DataError::Aborted);
        }

        let conditions: Vec<_> = request.filters.iter().map(|f| f.to_condition()).collect();
        let campaigns: Vec<CampaignRow> = campaigns
            .into_iter()
            .map(|(mut row, _)| {
                row.derive_metrics();
                row
            })
            .filter(|row| self.evaluator.matches_all(row, &conditions))
            .collect();

        if cancel.is_cancelled() {
            return Err(DataError::Aborted);
        }

        let kept: AHashSet<&str> = campaigns.iter().map(|c| c.id.as_str()).collect();
        let mut days: BTreeMap<NaiveDate, DailyPerformance> = BTreeMap::new();
        for record in selected.iter().filter(|r| kept.contains(r.campaign_id.as_str())) {
            let day = days
                .entry(record.date)
                .or_insert_with(|| DailyPerformance::new(record.date));
            day.impressions += record.impressions;
            day.clicks += record.clicks;
            day.orders += record.orders;
            day.spend += record.spend;
            day.sales += record.sales;
        }
        let daily_performance = days
            .into_values()
            .map(|mut day| {
                day.finish();
                day
            })
            .collect();

        Ok(CampaignReport {
            summary: Summary::from_campaigns(&campaigns),
            campaigns,
            daily_performance,
        })
    }
}

#[async_trait]
impl CampaignSource for MemorySource {
    async fn fetch(
        &self,
        request: &ReportRequest,
        cancel: CancellationToken,
    ) -> Result<CampaignReport, DataError> {
        if cancel.is_cancelled() {
            return Err(DataError::Aborted);
        }
        self.build_report(request, &cancel)
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}
