pub mod csv_source;
pub mod memory_source;

pub use csv_source::CsvSource;
pub use memory_source::{DailyRecord, MemorySource};

use async_trait::async_trait;
use bo_core::CampaignReport;
use tokio_util::sync::CancellationToken;

use crate::request::ReportRequest;
use crate::DataError;

/// Trait for campaign report backends
#[async_trait]
pub trait CampaignSource: Send + Sync {
    /// Fetch a report. Implementations observe `cancel` and return
    /// `DataError::Aborted` once it fires.
    async fn fetch(
        &self,
        request: &ReportRequest,
        cancel: CancellationToken,
    ) -> Result<CampaignReport, DataError>;

    /// Get the source name/path
    fn source_name(&self) -> &str;
}
