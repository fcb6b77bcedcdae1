// Audit interactor - Drives the per-file pipeline over a music library

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::app::explicit_resolver::ExplicitResolver;
use crate::domain::errors::{StoreError, TrackFailure};
use crate::domain::model::*;
use crate::error::{LocatorError, LocatorResult};
use crate::ports::*;
use crate::probe::normalizer::normalize;

/// Output format of a rendered summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SummaryFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

/// Request for one audit run
#[derive(Debug, Clone)]
pub struct AuditRequest {
    pub root: PathBuf,
    /// Pause after each track that reached the catalog
    pub sleep: Duration,
}

impl AuditRequest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sleep: Duration::from_millis(1000),
        }
    }

    pub fn with_sleep_ms(mut self, sleep_ms: u64) -> Self {
        self.sleep = Duration::from_millis(sleep_ms);
        self
    }
}

/// What happened to one file, and whether remote calls were made for it
struct FileResult {
    outcome: TrackOutcome,
    reached_catalog: bool,
}

impl FileResult {
    fn local(outcome: TrackOutcome) -> Self {
        Self {
            outcome,
            reached_catalog: false,
        }
    }

    fn remote(outcome: TrackOutcome) -> Self {
        Self {
            outcome,
            reached_catalog: true,
        }
    }
}

/// Interactor for the library audit use case
pub struct AuditInteractor {
    probe_port: Arc<dyn ProbePort>,
    catalog_port: Arc<dyn CatalogPort>,
    store_port: Arc<dyn TrackStorePort>,
    library_port: Arc<dyn LibraryPort>,
    resolver: ExplicitResolver,
}

impl AuditInteractor {
    /// Create new audit interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        catalog_port: Arc<dyn CatalogPort>,
        store_port: Arc<dyn TrackStorePort>,
        library_port: Arc<dyn LibraryPort>,
    ) -> Self {
        Self {
            resolver: ExplicitResolver::new(Arc::clone(&catalog_port)),
            probe_port,
            catalog_port,
            store_port,
            library_port,
        }
    }

    /// Run the pipeline for every file under the requested root
    ///
    /// Per-file failures are logged and counted. A store failure other than
    /// a duplicate key stops the loop and is reported through
    /// [`AuditSummary::aborted`]. The store is closed on every path.
    pub async fn execute(&self, request: AuditRequest) -> LocatorResult<AuditSummary> {
        let files = match self.library_port.enumerate(&request.root).await {
            Ok(files) => files,
            Err(e) => {
                self.close_store().await;
                return Err(LocatorError::Scan(e));
            }
        };

        info!(root = %request.root.display(), count = files.len(), "Starting audit");
        let mut summary = AuditSummary {
            files_found: files.len(),
            ..AuditSummary::default()
        };

        for (position, path) in files.iter().enumerate() {
            info!(path = %path.display(), "Starting lookup");
            match self.process_file(path).await {
                Ok(result) => {
                    summary.record(&result.outcome);
                    let is_last = position + 1 == files.len();
                    if result.reached_catalog && !is_last && !request.sleep.is_zero() {
                        tokio::time::sleep(request.sleep).await;
                    }
                }
                Err(e) => {
                    error!(path = %path.display(), "Aborting audit: {}", e);
                    summary.abort(e.to_string());
                    break;
                }
            }
        }

        match self.store_port.close().await {
            Err(e) if !summary.aborted => return Err(LocatorError::Store(e)),
            Err(e) => error!("Failed to close track store: {}", e),
            Ok(()) => {}
        }

        info!(
            found = summary.files_found,
            recorded = summary.recorded,
            already_processed = summary.already_processed,
            failed = summary.failed,
            flagged = summary.flagged.len(),
            aborted = summary.aborted,
            "Audit finished"
        );
        Ok(summary)
    }

    /// Probe, normalize, dedup, look up, resolve and persist one file
    ///
    /// Only store errors escape; everything else becomes an outcome.
    async fn process_file(&self, path: &Path) -> Result<FileResult, StoreError> {
        let metadata = match self.read_metadata(path).await {
            Ok(metadata) => metadata,
            Err(failure) => return Ok(FileResult::local(self.failed(path, failure))),
        };

        debug!(
            path = %path.display(),
            artist = %metadata.artist,
            title = %metadata.title,
            year = %metadata.year,
            "Read track tags"
        );
        let Some(isrc) = metadata.isrc else {
            return Ok(FileResult::local(self.failed(path, TrackFailure::MissingIsrc)));
        };

        if self.store_port.contains(&isrc).await? {
            info!(path = %path.display(), isrc = %isrc, "Song already in db. Skipping");
            return Ok(FileResult::local(TrackOutcome::AlreadyProcessed(isrc)));
        }

        let record = match self.catalog_port.lookup_isrc(&isrc).await {
            Ok(record) => record,
            Err(e) => return Ok(FileResult::remote(self.failed(path, e.into()))),
        };

        let explicit_exists = match self.resolver.resolve(&record).await {
            Ok(exists) => exists,
            Err(e) => return Ok(FileResult::remote(self.failed(path, e.into()))),
        };

        let row = ProcessedTrackRow::new(isrc, record, explicit_exists, path.display().to_string());
        let inserted = self.store_port.insert(&row).await;
        match inserted {
            Ok(()) => {
                info!(
                    path = %path.display(),
                    isrc = %row.isrc,
                    explicit_exists,
                    flagged = row.is_flagged(),
                    "Finished lookup"
                );
                Ok(FileResult::remote(TrackOutcome::Recorded(row)))
            }
            Err(StoreError::Duplicate(_)) => {
                info!(path = %path.display(), isrc = %row.isrc, "Song already in db. Skipping");
                Ok(FileResult::remote(TrackOutcome::AlreadyProcessed(row.isrc)))
            }
            Err(e) => Err(e),
        }
    }

    async fn read_metadata(&self, path: &Path) -> Result<TrackMetadata, TrackFailure> {
        let result = self.probe_port.probe(path.as_os_str()).await?;
        Ok(normalize(&result, path)?)
    }

    fn failed(&self, path: &Path, failure: TrackFailure) -> TrackOutcome {
        warn!(path = %path.display(), "Skipping file: {}", failure);
        TrackOutcome::Failed(failure.to_string())
    }

    async fn close_store(&self) {
        if let Err(e) = self.store_port.close().await {
            error!("Failed to close track store: {}", e);
        }
    }

    /// Render a summary in the requested format
    pub fn render(&self, summary: &AuditSummary, format: SummaryFormat) -> LocatorResult<String> {
        render_summary(summary, format)
    }
}

pub fn render_summary(summary: &AuditSummary, format: SummaryFormat) -> LocatorResult<String> {
    match format {
        SummaryFormat::Json => format_as_json(summary),
        SummaryFormat::Yaml => format_as_yaml(summary),
        SummaryFormat::Text => Ok(format_as_text(summary)),
    }
}

fn format_as_json(summary: &AuditSummary) -> LocatorResult<String> {
    serde_json::to_string_pretty(summary)
        .map_err(|e| LocatorError::Render(format!("JSON serialization failed: {}", e)))
}

fn format_as_yaml(summary: &AuditSummary) -> LocatorResult<String> {
    serde_yaml::to_string(summary)
        .map_err(|e| LocatorError::Render(format!("YAML serialization failed: {}", e)))
}

fn format_as_text(summary: &AuditSummary) -> String {
    let mut output = String::new();

    output.push_str("Library Audit Summary:\n");
    output.push_str(&format!("  Files found: {}\n", summary.files_found));
    output.push_str(&format!("  Recorded: {}\n", summary.recorded));
    output.push_str(&format!("  Already processed: {}\n", summary.already_processed));
    output.push_str(&format!("  Failed: {}\n", summary.failed));

    if summary.aborted {
        output.push_str(&format!(
            "  Aborted: {} ({} files not processed)\n",
            summary.abort_reason.as_deref().unwrap_or("unknown error"),
            summary.unprocessed()
        ));
    }

    if !summary.flagged.is_empty() {
        output.push_str(&format!(
            "\nClean tracks with an explicit version ({}):\n",
            summary.flagged.len()
        ));
        for track in &summary.flagged {
            output.push_str(&format!(
                "  {} - {} [{}]\n    {}\n",
                track.artist, track.title, track.isrc, track.file_path
            ));
        }
    }

    output
}
