//! Campaign groups
//!
//! A group buckets campaigns that share optimization settings: a target
//! ACOS and an optional bid floor and ceiling. A campaign belongs to at
//! most one group at a time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::ValidationError;

/// Unique identifier for a group
pub type GroupId = Uuid;

/// A user-defined bucket of campaigns
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignGroup {
    pub id: GroupId,
    pub name: String,
    /// Target ACOS in percent
    pub target_acos: f64,
    pub bid_floor: Option<f64>,
    pub bid_ceiling: Option<f64>,
    pub campaign_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl CampaignGroup {
    /// Clamp a bid into the group's floor and ceiling
    pub fn clamp_bid(&self, bid: f64) -> f64 {
        let bid = self.bid_floor.map_or(bid, |floor| bid.max(floor));
        self.bid_ceiling.map_or(bid, |ceiling| bid.min(ceiling))
    }
}

/// Optimization settings applied when creating or editing a group
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSettings {
    pub target_acos: f64,
    pub bid_floor: Option<f64>,
    pub bid_ceiling: Option<f64>,
}

/// Group manager handles storage and lookup of campaign groups
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GroupManager {
    groups: HashMap<GroupId, CampaignGroup>,

    /// Campaign id to owning group
    #[serde(skip)]
    campaign_index: HashMap<String, GroupId>,
}

impl GroupManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty group
    pub fn create_group(&mut self, name: impl Into<String>, settings: GroupSettings) -> GroupId {
        let now = Utc::now();
        let group = CampaignGroup {
            id: Uuid::new_v4(),
            name: name.into(),
            target_acos: settings.target_acos,
            bid_floor: settings.bid_floor,
            bid_ceiling: settings.bid_ceiling,
            campaign_ids: Vec::new(),
            created_at: now,
            modified_at: now,
        };
        let id = group.id;
        self.groups.insert(id, group);
        id
    }

    /// Replace a group's optimization settings
    pub fn update_settings(
        &mut self,
        id: GroupId,
        settings: GroupSettings,
    ) -> Result<(), ValidationError> {
        let group = self
            .groups
            .get_mut(&id)
            .ok_or(ValidationError::UnknownGroup(id))?;
        group.target_acos = settings.target_acos;
        group.bid_floor = settings.bid_floor;
        group.bid_ceiling = settings.bid_ceiling;
        group.modified_at = Utc::now();
        Ok(())
    }

    /// Rename a group
    pub fn rename(&mut self, id: GroupId, name: impl Into<String>) -> Result<(), ValidationError> {
        let group = self
            .groups
            .get_mut(&id)
            .ok_or(ValidationError::UnknownGroup(id))?;
        group.name = name.into();
        group.modified_at = Utc::now();
        Ok(())
    }

    /// Delete a group; its campaigns become ungrouped
    pub fn delete_group(&mut self, id: GroupId) -> Option<CampaignGroup> {
        let group = self.groups.remove(&id)?;
        for campaign_id in &group.campaign_ids {
            self.campaign_index.remove(campaign_id);
        }
        Some(group)
    }

    pub fn get(&self, id: GroupId) -> Option<&CampaignGroup> {
        self.groups.get(&id)
    }

    pub fn all_groups(&self) -> impl Iterator<Item = &CampaignGroup> {
        self.groups.values()
    }

    /// Move a campaign into a group, removing it from any previous group
    pub fn assign(&mut self, id: GroupId, campaign_id: &str) -> Result<(), ValidationError> {
        if !self.groups.contains_key(&id) {
            return Err(ValidationError::UnknownGroup(id));
        }

        self.unassign(campaign_id);
        if let Some(group) = self.groups.get_mut(&id) {
            group.campaign_ids.push(campaign_id.to_string());
            group.modified_at = Utc::now();
        }
        self.campaign_index.insert(campaign_id.to_string(), id);
        Ok(())
    }

    /// Remove a campaign from its group, if any
    pub fn unassign(&mut self, campaign_id: &str) -> Option<GroupId> {
        let id = self.campaign_index.remove(campaign_id)?;
        if let Some(group) = self.groups.get_mut(&id) {
            group.campaign_ids.retain(|c| c != campaign_id);
            group.modified_at = Utc::now();
        }
        Some(id)
    }

    /// The group a campaign belongs to
    pub fn group_for_campaign(&self, campaign_id: &str) -> Option<&CampaignGroup> {
        self.campaign_index
            .get(campaign_id)
            .and_then(|id| self.groups.get(id))
    }

    /// Search groups by name
    pub fn search(&self, query: &str) -> Vec<&CampaignGroup> {
        let query_lower = query.to_lowercase();
        self.groups
            .values()
            .filter(|group| group.name.to_lowercase().contains(&query_lower))
            .collect()
    }

    /// Rebuild the campaign index after loading from storage
    pub fn rebuild_index(&mut self) {
        self.campaign_index = self
            .groups
            .values()
            .flat_map(|group| {
                group
                    .campaign_ids
                    .iter()
                    .map(move |campaign_id| (campaign_id.clone(), group.id))
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> GroupSettings {
        GroupSettings {
            target_acos: 30.0,
            bid_floor: Some(0.2),
            bid_ceiling: Some(2.5),
        }
    }

    #[test]
    fn test_group_creation_and_assignment() {
        let mut manager = GroupManager::new();
        let scale = manager.create_group("Scale", settings());
        let defend = manager.create_group("Defend", GroupSettings::default());

        manager.assign(scale, "c-1").unwrap();
        assert_eq!(manager.group_for_campaign("c-1").unwrap().name, "Scale");

        manager.assign(defend, "c-1").unwrap();
        assert_eq!(manager.group_for_campaign("c-1").unwrap().id, defend);
        assert!(manager.get(scale).unwrap().campaign_ids.is_empty());
    }

    #[test]
    fn test_updated_settings_change_bid_limits() {
        let mut manager = GroupManager::new();
        let id = manager.create_group("Scale", settings());
        manager.assign(id, "c-1").unwrap();
        assert_eq!(manager.group_for_campaign("c-1").unwrap().clamp_bid(4.0), 2.5);

        manager
            .update_settings(
                id,
                GroupSettings {
                    target_acos: 25.0,
                    bid_floor: None,
                    bid_ceiling: Some(1.5),
                },
            )
            .unwrap();
        let group = manager.group_for_campaign("c-1").unwrap();
        assert_eq!(group.target_acos, 25.0);
        assert_eq!(group.clamp_bid(4.0), 1.5);
        assert_eq!(group.clamp_bid(0.05), 0.05);

        let missing = Uuid::new_v4();
        assert_eq!(
            manager.update_settings(missing, settings()),
            Err(ValidationError::UnknownGroup(missing))
        );
    }

    #[test]
    fn test_unknown_group() {
        let mut manager = GroupManager::new();
        let missing = Uuid::new_v4();
        assert_eq!(
            manager.assign(missing, "c-1"),
            Err(ValidationError::UnknownGroup(missing))
        );
    }

    #[test]
    fn test_delete_ungroups_campaigns() {
        let mut manager = GroupManager::new();
        let id = manager.create_group("Scale", settings());
        manager.assign(id, "c-1").unwrap();

        assert!(manager.delete_group(id).is_some());
        assert!(manager.group_for_campaign("c-1").is_none());
    }

    #[test]
    fn test_clamp_bid() {
        let mut manager = GroupManager::new();
        let id = manager.create_group("Scale", settings());
        let group = manager.get(id).unwrap();

        assert_eq!(group.clamp_bid(0.05), 0.2);
        assert_eq!(group.clamp_bid(1.0), 1.0);
        assert_eq!(group.clamp_bid(9.0), 2.5);
    }

    #[test]
    fn test_search_and_rebuild() {
        let mut manager = GroupManager::new();
        let id = manager.create_group("Brand Defense", settings());
        manager.create_group("Generic", settings());
        manager.assign(id, "c-9").unwrap();

        assert_eq!(manager.search("brand").len(), 1);

        let json = serde_json::to_string(&manager).unwrap();
        let mut restored: GroupManager = serde_json::from_str(&json).unwrap();
        assert!(restored.group_for_campaign("c-9").is_none());
        restored.rebuild_index();
        assert_eq!(restored.group_for_campaign("c-9").unwrap().id, id);
    }
}
