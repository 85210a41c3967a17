//! Single-column row ordering

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::{CellValue, Row};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Active sort of the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: String,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }

    pub fn asc(key: impl Into<String>) -> Self {
        Self::new(key, SortDirection::Asc)
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self::new(key, SortDirection::Desc)
    }

    /// Header click: flip when `key` is already active, otherwise sort it ascending
    pub fn toggle(current: Option<&SortConfig>, key: &str) -> SortConfig {
        match current {
            Some(config) if config.key == key => SortConfig::new(key, config.direction.flipped()),
            _ => SortConfig::asc(key),
        }
    }

    /// Parse `key` or `key:asc` / `key:desc`
    pub fn parse(text: &str) -> Option<SortConfig> {
        let (key, direction) = match text.split_once(':') {
            Some((key, "asc")) => (key, SortDirection::Asc),
            Some((key, "desc")) => (key, SortDirection::Desc),
            Some(_) => return None,
            None => (text, SortDirection::Asc),
        };
        let key = key.trim();
        (!key.is_empty()).then(|| SortConfig::new(key, direction))
    }
}

/// Order two rows by the configured column.
///
/// Two text cells compare case-insensitively with the raw text breaking
/// ties; two numeric cells compare numerically. Otherwise numbers rank
/// before text and text before empty cells. `desc` reverses every case, so
/// empty cells lead a descending sort.
pub fn compare<R: Row + ?Sized>(a: &R, b: &R, config: &SortConfig) -> Ordering {
    let left = a.cell(&config.key);
    let right = b.cell(&config.key);

    let ordering = match (left, right) {
        (CellValue::Text(x), CellValue::Text(y)) => compare_text(x, y),
        (CellValue::Number(x), CellValue::Number(y)) => x.total_cmp(&y),
        (x, y) => rank(&x).cmp(&rank(&y)),
    };
    config.direction.apply(ordering)
}

fn rank(cell: &CellValue<'_>) -> u8 {
    match cell {
        CellValue::Number(_) => 0,
        CellValue::Text(_) => 1,
        CellValue::Empty => 2,
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Stable sort in place; rows with equal keys keep their input order
pub fn sort_rows<R: Row>(rows: &mut [R], config: &SortConfig) {
    rows.sort_by(|a, b| compare(a, b, config));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CampaignRow;

    fn rows() -> Vec<CampaignRow> {
        vec![
            CampaignRow {
                spend: 30.0,
                ..CampaignRow::new("1", "banana")
            },
            CampaignRow {
                spend: 10.0,
                ..CampaignRow::new("2", "Apple")
            },
            CampaignRow {
                spend: 20.0,
                ..CampaignRow::new("3", "cherry")
            },
        ]
    }

    fn ids(rows: &[&CampaignRow]) -> Vec<String> {
        rows.iter().map(|row| row.id.clone()).collect()
    }

    #[test]
    fn test_numeric_sort_both_directions() {
        let data = rows();
        let mut view: Vec<&CampaignRow> = data.iter().collect();

        sort_rows(&mut view, &SortConfig::asc("spend"));
        assert_eq!(ids(&view), vec!["2", "3", "1"]);

        sort_rows(&mut view, &SortConfig::desc("spend"));
        assert_eq!(ids(&view), vec!["1", "3", "2"]);
    }

    #[test]
    fn test_text_sort_is_case_insensitive() {
        let data = rows();
        let mut view: Vec<&CampaignRow> = data.iter().collect();

        sort_rows(&mut view, &SortConfig::asc("campaign"));
        assert_eq!(ids(&view), vec!["2", "1", "3"]);
    }

    #[test]
    fn test_flipping_direction_reverses_distinct_keys() {
        let data = rows();
        for key in ["spend", "campaign"] {
            let asc = SortConfig::asc(key);
            let desc = SortConfig::desc(key);
            for a in &data {
                for b in &data {
                    if a.id != b.id {
                        assert_eq!(compare(a, b, &asc), compare(a, b, &desc).reverse());
                    }
                }
            }
        }
    }

    #[test]
    fn test_ties_keep_input_order() {
        let data = vec![
            CampaignRow {
                spend: 5.0,
                ..CampaignRow::new("a", "x")
            },
            CampaignRow {
                spend: 5.0,
                ..CampaignRow::new("b", "y")
            },
            CampaignRow {
                spend: 9.0,
                ..CampaignRow::new("c", "z")
            },
        ];
        let mut view: Vec<&CampaignRow> = data.iter().collect();
        sort_rows(&mut view, &SortConfig::desc("spend"));
        assert_eq!(ids(&view), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_empty_cells_follow_direction() {
        let mut data = rows();
        data[0].opt_group = Some("Scale".to_string());
        data[2].opt_group = Some("Defend".to_string());
        let mut view: Vec<&CampaignRow> = data.iter().collect();

        sort_rows(&mut view, &SortConfig::asc("optGroup"));
        assert_eq!(ids(&view), vec!["3", "1", "2"]);
        sort_rows(&mut view, &SortConfig::desc("optGroup"));
        assert_eq!(ids(&view), vec!["2", "1", "3"]);
    }

    #[test]
    fn test_flipping_direction_reverses_mixed_cells() {
        let mut data = rows();
        data[0].opt_group = Some("Scale".to_string());
        data[1].last_optimized = Some("2025-03-01".to_string());
        for key in ["optGroup", "lastOptimized", "endDate"] {
            let asc = SortConfig::asc(key);
            let desc = SortConfig::desc(key);
            for a in &data {
                for b in &data {
                    assert_eq!(compare(a, b, &asc), compare(a, b, &desc).reverse(), "{key}");
                }
            }
        }

        let scale = &data[0];
        let ungrouped = &data[1];
        assert_eq!(compare(scale, ungrouped, &SortConfig::asc("optGroup")), Ordering::Less);
        assert_eq!(compare(scale, ungrouped, &SortConfig::desc("optGroup")), Ordering::Greater);
    }

    #[test]
    fn test_toggle_and_parse() {
        let first = SortConfig::toggle(None, "spend");
        assert_eq!(first, SortConfig::asc("spend"));
        let second = SortConfig::toggle(Some(&first), "spend");
        assert_eq!(second, SortConfig::desc("spend"));
        let other = SortConfig::toggle(Some(&second), "acos");
        assert_eq!(other, SortConfig::asc("acos"));

        assert_eq!(SortConfig::parse("spend:desc"), Some(SortConfig::desc("spend")));
        assert_eq!(SortConfig::parse("acos"), Some(SortConfig::asc("acos")));
        assert_eq!(SortConfig::parse("acos:sideways"), None);
    }
}
