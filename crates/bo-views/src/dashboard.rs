//! Dashboard controller.
//!
//! Owns the session state of the campaigns page: connection, date range,
//! filters, sort, column layout, selection and staged changes. Changing the
//! connection, the range or the filters schedules a debounced fetch; the
//! rows shown are the latest report narrowed by every active filter and
//! ordered by the active sort. Filters the backend already applied match
//! its rows again, so rows stay consistent while a refetch is pending.

use std::io::Write;
use std::sync::Arc;

use bo_core::events::events::{ChangeStaged, ColumnsSaved, FiltersApplied};
use bo_core::events::EventBus;
use bo_core::groups::GroupManager;
use bo_core::sort::sort_rows;
use bo_core::staging::{ChangeKind, StagedChange, StagingManager};
use bo_core::{
    CampaignReport, CampaignRow, DatePreset, DateRange, FilterCondition, FilterEvaluator,
    SortConfig,
};
use bo_data::fetch::FetchState;
use bo_data::request::split_filters;
use bo_data::{CampaignSource, DashboardConfig, FetchCoordinator, ReportRequest};
use chrono::NaiveDate;
use tokio::sync::watch;

use crate::export::{export_csv, ExportOptions};
use crate::stats::{SummaryStats, DEFAULT_STAT_COLUMNS};
use crate::tables::{ColumnCustomizer, ColumnLayout, TableModel, TableView};
use crate::ViewError;

pub struct Dashboard {
    config: DashboardConfig,
    events: Arc<EventBus>,
    coordinator: FetchCoordinator,
    evaluator: FilterEvaluator,

    connection: Option<String>,
    range: DateRange,
    filters: Vec<FilterCondition>,
    sort: Option<SortConfig>,

    layout: ColumnLayout,
    table_view: TableView,
    staging: StagingManager,
    groups: GroupManager,
}

impl Dashboard {
    pub fn new(
        config: DashboardConfig,
        source: Arc<dyn CampaignSource>,
        events: Arc<EventBus>,
        today: NaiveDate,
    ) -> Self {
        let coordinator = FetchCoordinator::new(source, config.debounce, Arc::clone(&events));
        Self {
            evaluator: FilterEvaluator::new(config.null_values.clone()),
            range: config.default_preset.resolve(today),
            sort: config.default_sort.clone(),
            connection: None,
            filters: Vec::new(),
            layout: ColumnLayout::default(),
            table_view: TableView::default(),
            staging: StagingManager::new(),
            groups: GroupManager::new(),
            coordinator,
            events,
            config,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn connection(&self) -> Option<&str> {
        self.connection.as_deref()
    }

    /// Switch the advertising profile. Configured connections are checked;
    /// with none configured any profile id is accepted.
    pub fn set_connection(&mut self, profile_id: &str) -> Result<(), ViewError> {
        if !self.config.connections.is_empty() && self.config.connection(profile_id).is_none() {
            return Err(ViewError::UnknownConnection(profile_id.to_string()));
        }
        if self.connection.as_deref() != Some(profile_id) {
            self.connection = Some(profile_id.to_string());
            self.staging.clear();
            self.schedule_fetch();
        }
        Ok(())
    }

    pub fn date_range(&self) -> &DateRange {
        &self.range
    }

    pub fn set_date_range(&mut self, range: DateRange) {
        if self.range != range {
            self.range = range;
            self.schedule_fetch();
        }
    }

    pub fn set_preset(&mut self, preset: DatePreset, today: NaiveDate) {
        self.set_date_range(preset.resolve(today));
    }

    pub fn filters(&self) -> &[FilterCondition] {
        &self.filters
    }

    /// Replace the active filters; every filter must validate first
    pub fn set_filters(&mut self, filters: Vec<FilterCondition>) -> Result<(), ViewError> {
        for filter in &filters {
            filter.validate()?;
        }
        self.filters = filters;
        self.events.publish(FiltersApplied {
            active: self.filters.iter().filter(|f| !f.is_vacuous()).count(),
        });
        self.schedule_fetch();
        Ok(())
    }

    pub fn add_filter(&mut self, filter: FilterCondition) -> Result<(), ViewError> {
        let mut filters = self.filters.clone();
        filters.push(filter);
        self.set_filters(filters)
    }

    pub fn remove_filter(&mut self, index: usize) -> Option<FilterCondition> {
        if index >= self.filters.len() {
            return None;
        }
        let mut filters = self.filters.clone();
        let removed = filters.remove(index);
        // Remaining filters were already validated
        self.set_filters(filters).ok()?;
        Some(removed)
    }

    pub fn clear_filters(&mut self) {
        if !self.filters.is_empty() {
            self.filters.clear();
            self.events.publish(FiltersApplied { active: 0 });
            self.schedule_fetch();
        }
    }

    pub fn sort(&self) -> Option<&SortConfig> {
        self.sort.as_ref()
    }

    /// Header click: flip the direction on the active key, else sort ascending
    pub fn sort_by(&mut self, key: &str) -> &SortConfig {
        let next = SortConfig::toggle(self.sort.as_ref(), key);
        self.sort.insert(next)
    }

    pub fn set_sort(&mut self, sort: Option<SortConfig>) {
        self.sort = sort;
    }

    /// Re-issue the current parameters
    pub fn refresh(&mut self) {
        self.schedule_fetch();
    }

    pub fn retry(&self) -> bool {
        self.coordinator.retry()
    }

    fn schedule_fetch(&mut self) {
        let Some(profile_id) = self.connection.clone() else {
            tracing::debug!("no connection selected, skipping fetch");
            return;
        };
        let (server, _) = split_filters(&self.filters, &self.config.server_side_columns);
        self.coordinator
            .request(ReportRequest::new(profile_id, &self.range, server));
    }

    pub fn fetch_state(&self) -> FetchState {
        self.coordinator.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.coordinator.subscribe()
    }

    /// Latest loaded report, if any
    pub fn report(&self) -> Option<CampaignReport> {
        self.coordinator.state().report
    }

    /// Campaigns of the latest report that satisfy the active filters, sorted
    pub fn visible_rows(&self) -> Vec<CampaignRow> {
        let Some(report) = self.report() else {
            return Vec::new();
        };
        let mut rows: Vec<CampaignRow> = self
            .evaluator
            .apply(&report.campaigns, &self.filters)
            .into_iter()
            .cloned()
            .collect();
        if let Some(sort) = &self.sort {
            sort_rows(&mut rows, sort);
        }
        rows
    }

    pub fn table(&self) -> TableModel {
        self.table_view
            .build(&self.visible_rows(), &self.layout, &self.staging)
    }

    pub fn table_view_mut(&mut self) -> &mut TableView {
        &mut self.table_view
    }

    pub fn summary_stats(&self) -> SummaryStats {
        let rows = self.visible_rows();
        let refs: Vec<&CampaignRow> = rows.iter().collect();
        SummaryStats::from_campaigns(&refs, DEFAULT_STAT_COLUMNS)
    }

    pub fn export<W: Write>(&self, writer: W, options: &ExportOptions) -> Result<usize, ViewError> {
        export_csv(&self.table(), writer, options)
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut ColumnLayout {
        &mut self.layout
    }

    /// Open a customization session over the current columns
    pub fn customize_columns(&self) -> ColumnCustomizer {
        ColumnCustomizer::new(self.layout.columns())
    }

    /// Commit a customization session
    pub fn save_columns(&mut self, customizer: ColumnCustomizer) {
        self.layout.commit(customizer.save());
        self.events.publish(ColumnsSaved {
            visible: self.layout.visible_count(),
            frozen: self.layout.frozen_columns().count(),
        });
    }

    pub fn staging(&self) -> &StagingManager {
        &self.staging
    }

    pub fn groups(&self) -> &GroupManager {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut GroupManager {
        &mut self.groups
    }

    /// Checkbox click on a row
    pub fn toggle_row(&self, campaign_id: &str) -> bool {
        self.staging.toggle(campaign_id)
    }

    /// Header checkbox: select every visible row
    pub fn select_all_visible(&self) {
        let rows = self.visible_rows();
        self.staging.select_all(rows.iter().map(|r| r.id.as_str()));
    }

    /// Stage a new bid or budget for a campaign in the current report.
    /// Bids are kept inside the campaign group's floor and ceiling.
    pub fn stage_change(
        &self,
        campaign_id: &str,
        kind: ChangeKind,
        proposed: f64,
    ) -> Result<StagedChange, ViewError> {
        let report = self.report();
        let campaign = report
            .as_ref()
            .and_then(|r| r.campaigns.iter().find(|c| c.id == campaign_id))
            .ok_or_else(|| ViewError::UnknownCampaign(campaign_id.to_string()))?;
        let current = match kind {
            ChangeKind::Bid => campaign.bid,
            ChangeKind::Budget => campaign.budget,
        };

        let group = self.groups.group_for_campaign(campaign_id);
        let change = self
            .staging
            .stage(campaign_id, kind, current, proposed, group)?;
        self.events.publish(ChangeStaged {
            campaign_id: campaign_id.to_string(),
            pending: self.staging.pending_count(),
        });
        Ok(change)
    }
}
