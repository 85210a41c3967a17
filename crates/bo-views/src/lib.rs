//! View layer of the bid optimizer: column layout and customization, the
//! campaigns table model, export, summary statistics and the dashboard
//! controller tying them to the fetch coordinator.

pub mod dashboard;
pub mod export;
pub mod stats;
pub mod tables;

use bo_core::ValidationError;
use thiserror::Error;

pub use dashboard::Dashboard;
pub use export::{export_csv, export_csv_file, ExportOptions};
pub use stats::{ColumnStats, NumericStats, SummaryStats};
pub use tables::{
    compute_insertion_plan, ColumnCustomizer, ColumnLayout, DragSource, InsertionPlan,
    PointerTarget, RenderedColumn, Section, TableConfig, TableModel, TableRow, TableView,
};

/// Errors raised by view operations
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("column `{0}` is required and cannot be hidden")]
    RequiredColumn(String),

    #[error("column `{0}` moved since the drop was planned")]
    StalePlan(String),

    #[error("unknown connection `{0}`")]
    UnknownConnection(String),

    #[error("no connection selected")]
    NoConnection,

    #[error("campaign `{0}` is not in the current report")]
    UnknownCampaign(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
