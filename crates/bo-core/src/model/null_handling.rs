//! Empty-value markers used by date filters and cell formatting

use serde::{Deserialize, Serialize};

use super::CellValue;

/// Markers that count as "no value" in a cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NullConfig {
    /// Patterns to treat as empty
    pub patterns: Vec<String>,

    /// Whether to trim whitespace before checking
    pub trim_whitespace: bool,

    /// Case sensitive matching
    pub case_sensitive: bool,
}

impl Default for NullConfig {
    fn default() -> Self {
        Self {
            patterns: vec![
                String::new(),
                "Never".to_string(),
                "-".to_string(),
                "N/A".to_string(),
                "null".to_string(),
            ],
            trim_whitespace: true,
            case_sensitive: false,
        }
    }
}

impl NullConfig {
    /// Check if a raw value should be treated as empty
    pub fn is_null(&self, value: &str) -> bool {
        let test_value = if self.trim_whitespace {
            value.trim()
        } else {
            value
        };

        self.patterns.iter().any(|pattern| {
            if self.case_sensitive {
                test_value == pattern
            } else {
                test_value.eq_ignore_ascii_case(pattern)
            }
        })
    }

    /// Check a cell; `Empty` always counts, numbers never do
    pub fn is_null_cell(&self, cell: &CellValue<'_>) -> bool {
        match cell {
            CellValue::Empty => true,
            CellValue::Text(text) => self.is_null(text),
            CellValue::Number(_) => false,
        }
    }

    /// Add a null pattern
    pub fn add_pattern(&mut self, pattern: String) {
        if !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
    }

    /// Remove a null pattern
    pub fn remove_pattern(&mut self, pattern: &str) {
        self.patterns.retain(|p| p != pattern);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_markers() {
        let config = NullConfig::default();
        assert!(config.is_null("Never"));
        assert!(config.is_null("  never "));
        assert!(config.is_null(""));
        assert!(!config.is_null("2025-03-01"));
    }

    #[test]
    fn test_case_sensitive_markers() {
        let mut config = NullConfig {
            case_sensitive: true,
            ..Default::default()
        };
        config.add_pattern("none".to_string());
        assert!(config.is_null("none"));
        assert!(!config.is_null("NEVER"));

        config.remove_pattern("none");
        assert!(!config.is_null("none"));
    }

    #[test]
    fn test_cells() {
        let config = NullConfig::default();
        assert!(config.is_null_cell(&CellValue::Empty));
        assert!(config.is_null_cell(&CellValue::Text("N/A")));
        assert!(!config.is_null_cell(&CellValue::Number(0.0)));
    }
}
