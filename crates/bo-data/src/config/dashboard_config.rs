//! Dashboard configuration loaded from a JSON file

use std::path::Path;
use std::time::Duration;

use bo_core::{DatePreset, NullConfig, SortConfig};
use serde::{Deserialize, Serialize};

use crate::request::SERVER_SIDE_COLUMNS;
use crate::DataError;

/// Debounce applied when no configuration overrides it
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Upper bound on the debounce; anything longer feels like a hang
pub const MAX_DEBOUNCE: Duration = Duration::from_secs(5);

/// An advertising account the dashboard can read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub profile_id: String,
    pub name: String,
    #[serde(default)]
    pub marketplace: Option<String>,
}

/// Configuration for a dashboard session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardConfig {
    /// Quiet period before a parameter change triggers a fetch
    #[serde(with = "humantime_duration")]
    pub debounce: Duration,

    /// Markers that count as empty cells
    pub null_values: NullConfig,

    /// Filter columns the backend evaluates itself
    pub server_side_columns: Vec<String>,

    /// Sort applied when a session starts
    pub default_sort: Option<SortConfig>,

    /// Date range applied when a session starts
    pub default_preset: DatePreset,

    /// Known connections
    pub connections: Vec<Connection>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            null_values: NullConfig::default(),
            server_side_columns: SERVER_SIDE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            default_sort: Some(SortConfig::desc("spend")),
            default_preset: DatePreset::Last30Days,
            connections: Vec::new(),
        }
    }
}

impl DashboardConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let config: DashboardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from disk; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, DataError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no dashboard config, using defaults");
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<(), DataError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.debounce > MAX_DEBOUNCE {
            return Err(DataError::Config(format!(
                "debounce {} exceeds {}",
                humantime::format_duration(self.debounce),
                humantime::format_duration(MAX_DEBOUNCE)
            )));
        }
        if let Some(duplicate) = self
            .connections
            .iter()
            .enumerate()
            .find(|(i, c)| self.connections[..*i].iter().any(|o| o.profile_id == c.profile_id))
            .map(|(_, c)| c)
        {
            return Err(DataError::Config(format!(
                "profile {} is configured twice",
                duplicate.profile_id
            )));
        }
        Ok(())
    }

    /// Look up a connection by profile id
    pub fn connection(&self, profile_id: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.profile_id == profile_id)
    }

    /// Whether filters on `column` are pushed to the backend
    pub fn is_server_side(&self, column: &str) -> bool {
        self.server_side_columns.iter().any(|c| c == column)
    }
}

/// Serialize durations as humantime strings such as `"300ms"`
mod humantime_duration {
    use std::time::Duration;

    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(D::Error::custom)
    }
}
