use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bo_core::{CampaignReport, NullConfig};
use csv::{ReaderBuilder, Trim};
use tokio_util::sync::CancellationToken;

use super::memory_source::{DailyRecord, MemorySource};
use super::CampaignSource;
use crate::request::ReportRequest;
use crate::DataError;

/// Campaign source backed by a CSV export of daily records.
///
/// Headers are the camelCase field names of [`DailyRecord`]; `date`,
/// `campaignId` and `campaignName` are required, the rest default.
pub struct CsvSource {
    path: PathBuf,
    name: String,
    inner: MemorySource,
}

impl CsvSource {
    /// Read the whole file on a blocking thread
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, DataError> {
        let path = path.into();
        let records = tokio::task::spawn_blocking({
            let path = path.clone();
            move || Self::read_records(&path)
        })
        .await??;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        tracing::info!(path = %path.display(), records = records.len(), "loaded campaign CSV");

        Ok(Self {
            inner: MemorySource::new(name.clone(), records),
            path,
            name,
        })
    }

    fn read_records(path: &Path) -> Result<Vec<DailyRecord>, DataError> {
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(BufReader::new(file));

        let mut records = Vec::new();
        for (line, result) in reader.deserialize::<DailyRecord>().enumerate() {
            let record = result.map_err(|e| DataError::Csv(format!("record {}: {e}", line + 1)))?;
            records.push(record);
        }
        Ok(records)
    }

    pub fn with_null_config(mut self, nulls: NullConfig) -> Self {
        self.inner = self.inner.with_null_config(nulls);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record_count(&self) -> usize {
        self.inner.record_count()
    }
}

#[async_trait]
impl CampaignSource for CsvSource {
    async fn fetch(
        &self,
        request: &ReportRequest,
        cancel: CancellationToken,
    ) -> Result<CampaignReport, DataError> {
        self.inner.fetch(request, cancel).await
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}
