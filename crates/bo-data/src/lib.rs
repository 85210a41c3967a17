//! Data access for the bid optimizer: report requests, campaign sources
//! and the debounced fetch coordinator

pub mod config;
pub mod fetch;
pub mod request;
pub mod sources;

use tokio::task::JoinError;
use thiserror::Error;

// Re-exports
pub use config::DashboardConfig;
pub use fetch::{FetchCoordinator, FetchPhase, FetchState};
pub use request::{split_filters, ReportRequest, ServerFilter};
pub use sources::{CampaignSource, CsvSource, MemorySource};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The request was superseded or cancelled; never shown to the user
    #[error("request aborted")]
    Aborted,

    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("Join error: {0}")]
    Join(#[from] JoinError),
}

impl DataError {
    /// Aborted requests are dropped silently instead of surfacing an error
    pub fn is_aborted(&self) -> bool {
        matches!(self, DataError::Aborted)
    }
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => {
                DataError::Io(std::io::Error::new(io_err.kind(), error.to_string()))
            }
            _ => DataError::Csv(error.to_string()),
        }
    }
}
