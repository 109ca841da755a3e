//! Report generation service.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use super::plan::{DateRange, ReportRequest};
use crate::cashflow::{CashflowReport, Movement, xlsx};
use crate::iiko::{IikoClient, IikoError};

/// Errors that can occur while generating a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("iiko request failed: {0}")]
    Iiko(#[from] IikoError),

    #[error("Failed to write spreadsheet: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report task failed: {0}")]
    Task(String),
}

/// Source of cash movements for a date range.
#[async_trait]
pub trait OlapSource: Send + Sync {
    async fn fetch_movements(&self, range: DateRange) -> Result<Vec<Movement>, ReportError>;
}

/// Movements pulled from iiko, by preset when one is configured.
#[derive(Debug)]
pub struct IikoSource {
    client: IikoClient,
}

impl IikoSource {
    #[must_use]
    pub const fn new(client: IikoClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OlapSource for IikoSource {
    async fn fetch_movements(&self, range: DateRange) -> Result<Vec<Movement>, ReportError> {
        let rows = match self.client.config().olap_preset_id.as_deref() {
            Some(preset_id) => {
                self.client
                    .fetch_olap_by_preset(preset_id, range.from, range.to)
                    .await?
            }
            // TRANSACTIONS takes inclusive days
            None => {
                self.client
                    .fetch_olap_transactions(range.from, range.last_day())
                    .await?
            }
        };
        debug!("Fetched {} OLAP rows for {}", rows.len(), range);
        Ok(rows.iter().map(Movement::from_row).collect())
    }
}

/// A spreadsheet ready to be sent.
///
/// Each report lives in its own directory under the output dir, so
/// concurrent requests for the same start date never share a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReport {
    pub path: PathBuf,
    pub caption: String,
    dir: PathBuf,
}

impl GeneratedReport {
    /// Directory holding this report only.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deletes the report together with its directory.
    pub async fn remove(&self) -> std::io::Result<()> {
        tokio::fs::remove_dir_all(&self.dir).await
    }
}

/// Builds cash-flow reports and writes them as spreadsheets.
#[derive(Clone)]
pub struct ReportService {
    source: Arc<dyn OlapSource>,
    output_dir: PathBuf,
}

impl ReportService {
    #[must_use]
    pub fn new(source: Arc<dyn OlapSource>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            output_dir: output_dir.into(),
        }
    }

    /// Fetches the previous day and the requested range.
    pub async fn build(&self, request: &ReportRequest) -> Result<CashflowReport, ReportError> {
        let plan = request.plan();
        let previous = self.source.fetch_movements(plan.previous).await?;
        let current = self.source.fetch_movements(plan.current).await?;
        Ok(CashflowReport::new(
            plan.current.from,
            plan.current.to,
            &previous,
            current,
        ))
    }

    /// Builds the report and writes it with [`ReportService::write`].
    pub async fn generate(&self, request: &ReportRequest) -> Result<GeneratedReport, ReportError> {
        let report = self.build(request).await?;
        self.write(request, report).await
    }

    /// Writes `"{from}_ДДС.xlsx"` into a fresh directory under the output dir.
    pub async fn write(
        &self,
        request: &ReportRequest,
        report: CashflowReport,
    ) -> Result<GeneratedReport, ReportError> {
        let output_dir = self.output_dir.clone();
        let file_name = request.plan().file_name();

        let (dir, path) = tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&output_dir)?;
            let dir = tempfile::Builder::new()
                .prefix("report-")
                .keep(true)
                .tempdir_in(&output_dir)?
                .path()
                .to_path_buf();
            let path = xlsx::export_cashflow(&report, dir.join(file_name))?;
            Ok::<_, ReportError>((dir, path))
        })
        .await
        .map_err(|e| ReportError::Task(e.to_string()))??;

        info!("Report written to {}", path.display());
        Ok(GeneratedReport {
            path,
            caption: request.caption(),
            dir,
        })
    }
}

impl std::fmt::Debug for ReportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportService")
            .field("output_dir", &self.output_dir)
            .finish_non_exhaustive()
    }
}
