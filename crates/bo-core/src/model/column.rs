//! Table column descriptors

use serde::{Deserialize, Serialize};

/// Selection column pinned to the far left
pub const CHECKBOX_COLUMN: &str = "checkbox";

/// Campaign identity column; always frozen while visible
pub const CAMPAIGN_COLUMN: &str = "campaign";

/// Describes one column of the campaigns table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    /// Column key, also used to look up row cells
    pub id: String,
    pub label: String,
    /// Grouping shown in the customization dialog
    pub category: String,
    pub width: f32,
    pub min_width: f32,
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Required columns can never be hidden
    #[serde(default)]
    pub required: bool,
    pub order: usize,
    #[serde(default)]
    pub frozen: bool,
}

fn default_true() -> bool {
    true
}

impl ColumnDefinition {
    /// Create a visible, scrollable column
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            category: category.into(),
            width: 120.0,
            min_width: 60.0,
            visible: true,
            required: false,
            order: 0,
            frozen: false,
        }
    }

    pub fn with_width(mut self, width: f32, min_width: f32) -> Self {
        self.min_width = min_width;
        self.width = width.max(min_width);
        self
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.visible = true;
        self
    }

    pub fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = self.required;
        self
    }

    /// Whether the column is rendered at all; required columns always are
    pub fn is_shown(&self) -> bool {
        self.visible || self.required
    }
}

/// The static column list a fresh session starts from
pub fn default_columns() -> Vec<ColumnDefinition> {
    let columns = vec![
        ColumnDefinition::new(CHECKBOX_COLUMN, "", "selection")
            .with_width(48.0, 48.0)
            .required()
            .frozen(),
        ColumnDefinition::new(CAMPAIGN_COLUMN, "Campaign", "identity")
            .with_width(260.0, 160.0)
            .required()
            .frozen(),
        ColumnDefinition::new("adType", "Ad Type", "identity").with_width(90.0, 70.0),
        ColumnDefinition::new("state", "State", "identity").with_width(100.0, 80.0),
        ColumnDefinition::new("optGroup", "Opt Group", "identity").with_width(140.0, 90.0),
        ColumnDefinition::new("impressions", "Impressions", "traffic"),
        ColumnDefinition::new("clicks", "Clicks", "traffic").with_width(100.0, 60.0),
        ColumnDefinition::new("orders", "Orders", "conversion").with_width(100.0, 60.0),
        ColumnDefinition::new("units", "Units", "conversion").with_width(90.0, 60.0).hidden(),
        ColumnDefinition::new("ctr", "CTR", "traffic").with_width(90.0, 60.0),
        ColumnDefinition::new("cvr", "CVR", "conversion").with_width(90.0, 60.0),
        ColumnDefinition::new("cpc", "CPC", "cost").with_width(90.0, 60.0),
        ColumnDefinition::new("spend", "Spend", "cost"),
        ColumnDefinition::new("sales", "Sales", "revenue"),
        ColumnDefinition::new("acos", "ACOS", "revenue").with_width(90.0, 60.0),
        ColumnDefinition::new("rpc", "RPC", "revenue").with_width(90.0, 60.0).hidden(),
        ColumnDefinition::new("roas", "ROAS", "revenue").with_width(90.0, 60.0),
    ];

    columns
        .into_iter()
        .enumerate()
        .map(|(order, column)| column.with_order(order))
        .collect()
}
