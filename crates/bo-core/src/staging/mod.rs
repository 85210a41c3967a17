use std::sync::Arc;
use parking_lot::RwLock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::groups::CampaignGroup;
use crate::ValidationError;

/// Holds the row selection of the campaigns table and the bid/budget
/// changes staged for review. Nothing here is ever submitted.
pub struct StagingManager {
    /// Selected campaign ids, in selection order
    selection: Arc<RwLock<SelectionState>>,

    /// Pending changes, at most one per campaign and kind
    changes: Arc<RwLock<Vec<StagedChange>>>,
}

/// Selection state of the checkbox column
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    pub selected: Vec<String>,
}

impl SelectionState {
    pub fn contains(&self, campaign_id: &str) -> bool {
        self.selected.iter().any(|id| id == campaign_id)
    }
}

/// What a staged change edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Bid,
    Budget,
}

/// A change waiting in the optimization preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedChange {
    pub campaign_id: String,
    pub kind: ChangeKind,
    pub current: f64,
    pub proposed: f64,
    /// Set when the proposed bid was pulled into the group's floor/ceiling
    pub clamped: bool,
    pub staged_at: DateTime<Utc>,
}

impl StagedChange {
    pub fn delta(&self) -> f64 {
        self.proposed - self.current
    }

    /// Relative change in percent; `None` when there was no current value
    pub fn delta_percent(&self) -> Option<f64> {
        (self.current > 0.0).then(|| self.delta() / self.current * 100.0)
    }
}

/// Aggregate view shown before submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewSummary {
    pub bid_changes: usize,
    pub budget_changes: usize,
    pub increases: usize,
    pub decreases: usize,
    /// Sum of daily budget deltas
    pub budget_delta: f64,
}

impl StagingManager {
    pub fn new() -> Self {
        Self {
            selection: Arc::new(RwLock::new(SelectionState::default())),
            changes: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get the current selection state
    pub fn selection(&self) -> SelectionState {
        self.selection.read().clone()
    }

    pub fn is_selected(&self, campaign_id: &str) -> bool {
        self.selection.read().contains(campaign_id)
    }

    /// Flip one checkbox; returns the new state
    pub fn toggle(&self, campaign_id: &str) -> bool {
        let mut selection = self.selection.write();
        if selection.contains(campaign_id) {
            selection.selected.retain(|id| id != campaign_id);
            false
        } else {
            selection.selected.push(campaign_id.to_string());
            true
        }
    }

    /// Header checkbox: select every listed campaign
    pub fn select_all<'a>(&self, campaign_ids: impl IntoIterator<Item = &'a str>) {
        let mut selection = self.selection.write();
        for campaign_id in campaign_ids {
            if !selection.contains(campaign_id) {
                selection.selected.push(campaign_id.to_string());
            }
        }
    }

    pub fn clear_selection(&self) {
        self.selection.write().selected.clear();
    }

    /// Stage a change, replacing any pending change of the same kind for
    /// the campaign. Bids are clamped into the group's floor and ceiling.
    pub fn stage(
        &self,
        campaign_id: &str,
        kind: ChangeKind,
        current: f64,
        proposed: f64,
        group: Option<&CampaignGroup>,
    ) -> Result<StagedChange, ValidationError> {
        if !proposed.is_finite() || proposed <= 0.0 {
            return Err(ValidationError::InvalidAmount(proposed));
        }

        let adjusted = match (kind, group) {
            (ChangeKind::Bid, Some(group)) => group.clamp_bid(proposed),
            _ => proposed,
        };
        let change = StagedChange {
            campaign_id: campaign_id.to_string(),
            kind,
            current,
            proposed: adjusted,
            clamped: adjusted != proposed,
            staged_at: Utc::now(),
        };

        let mut changes = self.changes.write();
        match changes
            .iter_mut()
            .find(|c| c.campaign_id == campaign_id && c.kind == kind)
        {
            Some(existing) => *existing = change.clone(),
            None => changes.push(change.clone()),
        }

        tracing::debug!(campaign_id, ?kind, proposed = adjusted, "staged change");
        Ok(change)
    }

    /// Drop a pending change
    pub fn unstage(&self, campaign_id: &str, kind: ChangeKind) -> Option<StagedChange> {
        let mut changes = self.changes.write();
        let index = changes
            .iter()
            .position(|c| c.campaign_id == campaign_id && c.kind == kind)?;
        Some(changes.remove(index))
    }

    /// Pending changes in staging order
    pub fn pending(&self) -> Vec<StagedChange> {
        self.changes.read().clone()
    }

    pub fn pending_count(&self) -> usize {
        self.changes.read().len()
    }

    /// Summarize pending changes for the review step
    pub fn review(&self) -> ReviewSummary {
        let changes = self.changes.read();
        let mut summary = ReviewSummary::default();

        for change in changes.iter() {
            match change.kind {
                ChangeKind::Bid => summary.bid_changes += 1,
                ChangeKind::Budget => {
                    summary.budget_changes += 1;
                    summary.budget_delta += change.delta();
                }
            }
            if change.delta() > 0.0 {
                summary.increases += 1;
            } else if change.delta() < 0.0 {
                summary.decreases += 1;
            }
        }

        summary
    }

    /// Discard every pending change and the selection
    pub fn clear(&self) {
        self.changes.write().clear();
        self.clear_selection();
    }
}

impl Default for StagingManager {
    fn default() -> Self {
        Self::new()
    }
}
