pub mod archive;
pub mod header;
pub mod normalize;
pub mod reader;

pub use archive::archive_upload;
pub use header::{map_header, ColumnMap, Field};
pub use normalize::{parse_date, parse_number, RowNormalizer, SkipReason};
pub use reader::{CsvRows, RowOutcome, SkippedRow};

use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use common::{Error, Result, TradeRecord, TradeStore};

/// Result of ingesting one file. `inserted` is the externally visible
/// success signal; `skipped` keeps the per-row detail for inspection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub inserted: u64,
    pub skipped: Vec<SkippedRow>,
}

impl IngestReport {
    pub fn rows_read(&self) -> u64 {
        self.inserted + self.skipped.len() as u64
    }
}

/// Reads a CSV file, normalizes each row and writes accepted records to the
/// trade store in batches.
///
/// A failing batch stops the run with the store error; batches already
/// written stay in the store.
#[derive(Debug, Clone)]
pub struct Ingestor {
    batch_size: usize,
}

impl Ingestor {
    pub const DEFAULT_BATCH_SIZE: usize = 500;

    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub async fn ingest<R: Read + Send>(
        &self,
        store: &dyn TradeStore,
        source: R,
        default_sector: Option<&str>,
    ) -> Result<IngestReport> {
        let rows = CsvRows::new(source, default_sector)?;

        let mut report = IngestReport::default();
        let mut batch: Vec<TradeRecord> = Vec::with_capacity(self.batch_size);

        for outcome in rows {
            match outcome {
                RowOutcome::Accepted(record) => batch.push(record),
                RowOutcome::Skipped(skip) => report.skipped.push(skip),
            }
            if batch.len() >= self.batch_size {
                report.inserted += store.bulk_insert(&batch).await?;
                batch.clear();
                info!(
                    rows_read = report.rows_read(),
                    inserted = report.inserted,
                    "Ingest progress"
                );
            }
        }
        if !batch.is_empty() {
            report.inserted += store.bulk_insert(&batch).await?;
        }

        if !report.skipped.is_empty() {
            warn!(skipped = report.skipped.len(), "Rows skipped during ingest");
        }
        info!(inserted = report.inserted, rows_read = report.rows_read(), "Ingest complete");
        Ok(report)
    }

    /// Ingest a CSV file from disk. The file is read without blocking the
    /// runtime, then parsed from memory.
    pub async fn ingest_path(
        &self,
        store: &dyn TradeStore,
        path: &Path,
        default_sector: Option<&str>,
    ) -> Result<IngestReport> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::Unreadable(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), bytes = bytes.len(), "Ingesting file");
        self.ingest(store, bytes.as_slice(), default_sector).await
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BATCH_SIZE)
    }
}
