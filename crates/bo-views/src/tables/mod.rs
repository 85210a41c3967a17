//! Table view implementation

pub mod customize;
pub mod layout;

use bo_core::model::CHECKBOX_COLUMN;
use bo_core::staging::StagingManager;
use bo_core::{CellValue, ColumnDefinition, Row};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub use customize::{
    compute_insertion_plan, ColumnCustomizer, ColumnLists, DragSource, InsertionPlan,
    PointerTarget, Section,
};
pub use layout::ColumnLayout;

const MONEY_COLUMNS: &[&str] = &["budget", "bid", "cpc", "spend", "sales", "rpc"];
const PERCENT_COLUMNS: &[&str] = &["ctr", "cvr", "acos"];
const COUNT_COLUMNS: &[&str] = &["impressions", "clicks", "orders", "units"];

/// Configuration for table views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub currency_symbol: String,
    /// Text shown for empty cells
    pub placeholder: String,
    /// Cap on rendered rows; `None` renders everything
    pub max_rows_displayed: Option<usize>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            placeholder: "-".to_string(),
            max_rows_displayed: None,
        }
    }
}

/// A column as it is rendered
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedColumn {
    pub id: String,
    pub label: String,
    pub width: f32,
    /// Sticky left offset; only frozen columns have one
    pub sticky_offset: Option<f32>,
}

impl RenderedColumn {
    fn from_definition(column: &ColumnDefinition, sticky_offset: Option<f32>) -> Self {
        Self {
            id: column.id.clone(),
            label: column.label.clone(),
            width: column.width,
            sticky_offset,
        }
    }
}

/// One rendered row; `cells` follow the frozen-then-scrollable column order
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub id: String,
    pub selected: bool,
    pub cells: Vec<String>,
}

/// Everything a renderer needs to draw the campaigns table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableModel {
    pub frozen: Vec<RenderedColumn>,
    pub scrollable: Vec<RenderedColumn>,
    pub frozen_width: f32,
    pub rows: Vec<TableRow>,
    /// Rows dropped by `max_rows_displayed`
    pub truncated: usize,
}

impl TableModel {
    /// All rendered columns, frozen first
    pub fn columns(&self) -> impl Iterator<Item = &RenderedColumn> {
        self.frozen.iter().chain(self.scrollable.iter())
    }

    pub fn column_index(&self, id: &str) -> Option<usize> {
        self.columns().position(|c| c.id == id)
    }

    /// Cell text of a row by column id
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.cells.get(index).map(String::as_str)
    }
}

/// Turns rows and a column layout into a [`TableModel`]
#[derive(Debug, Clone, Default)]
pub struct TableView {
    pub config: TableConfig,
}

impl TableView {
    pub fn new(config: TableConfig) -> Self {
        Self { config }
    }

    /// Render `rows` in the given order
    pub fn build<R: Row>(
        &self,
        rows: &[R],
        layout: &ColumnLayout,
        staging: &StagingManager,
    ) -> TableModel {
        let frozen: Vec<RenderedColumn> = layout
            .frozen_with_offsets()
            .map(|(column, offset)| RenderedColumn::from_definition(column, Some(offset)))
            .collect();
        let scrollable: Vec<RenderedColumn> = layout
            .scrollable_columns()
            .map(|column| RenderedColumn::from_definition(column, None))
            .collect();

        let limit = self.config.max_rows_displayed.unwrap_or(usize::MAX);
        let selection = staging.selection();
        let rendered_rows = rows
            .iter()
            .take(limit)
            .map(|row| {
                let id = row.row_id().to_string();
                let selected = selection.contains(&id);
                let cells = frozen
                    .iter()
                    .chain(scrollable.iter())
                    .map(|column| {
                        if column.id == CHECKBOX_COLUMN {
                            checkbox(selected).to_string()
                        } else {
                            self.format_cell(&column.id, row.cell(&column.id))
                        }
                    })
                    .collect();
                TableRow { id, selected, cells }
            })
            .collect();

        TableModel {
            frozen,
            scrollable,
            frozen_width: layout.frozen_width(),
            rows: rendered_rows,
            truncated: rows.len().saturating_sub(limit),
        }
    }

    /// Format a cell for display: money with two decimals, percentages
    /// with a `%` suffix, counts with thousands separators
    pub fn format_cell(&self, column: &str, cell: CellValue<'_>) -> String {
        match cell {
            CellValue::Empty => self.config.placeholder.clone(),
            CellValue::Text(text) => text.to_string(),
            CellValue::Number(value) if MONEY_COLUMNS.contains(&column) => {
                let sign = if value < 0.0 { "-" } else { "" };
                format!("{sign}{}{}", self.config.currency_symbol, group_thousands(value.abs(), 2))
            }
            CellValue::Number(value) if PERCENT_COLUMNS.contains(&column) => {
                format!("{value:.2}%")
            }
            CellValue::Number(value) if COUNT_COLUMNS.contains(&column) => {
                group_thousands(value, 0)
            }
            CellValue::Number(value) => format!("{value:.2}"),
        }
    }

    pub fn save_config(&self) -> Value {
        json!({
            "currency_symbol": self.config.currency_symbol,
            "placeholder": self.config.placeholder,
            "max_rows_displayed": self.config.max_rows_displayed,
        })
    }

    pub fn load_config(&mut self, config: Value) {
        match serde_json::from_value::<TableConfig>(config) {
            Ok(config) => self.config = config,
            Err(error) => tracing::warn!(%error, "ignoring invalid table config"),
        }
    }
}

fn checkbox(selected: bool) -> &'static str {
    if selected {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Fixed-point formatting with `,` between thousands
fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (formatted.as_str(), None),
    };
    let (sign, digits) = match integer.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", integer),
    };

    let mut grouped = String::with_capacity(formatted.len() + digits.len() / 3);
    grouped.push_str(sign);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}
