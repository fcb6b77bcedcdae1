// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::errors::CatalogError;


/// String the catalog uses for a truthy explicit flag
pub const EXPLICIT_MARKER: &str = "True";

/// International Standard Recording Code
///
/// Stored trimmed, upper-cased and without separators so that
/// `us-abc-20-00001` and `USABC2000001` dedup to the same row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Isrc(String);

impl Isrc {
    /// Normalize a raw tag value; blank input yields `None`
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .flat_map(char::to_uppercase)
            .collect();
        if cleaned.is_empty() {
            None
        } else {
            Some(Self(cleaned))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Isrc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Flat tag record read from a file's first audio stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackMetadata {
    pub artist: String,
    pub title: String,
    pub year: String,
    pub album_artist: String,
    /// `None` when the stream carries no ISRC tag
    pub isrc: Option<Isrc>,
    pub file_path: PathBuf,
}

/// One recording as returned by the catalog
///
/// Every field must be present in the response item; a missing field is a
/// construction error. Values are kept in the catalog's string form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    #[serde(deserialize_with = "stringly")]
    pub duration: String,
    #[serde(deserialize_with = "stringly")]
    pub recording_version: String,
    #[serde(deserialize_with = "stringly")]
    pub is_valid_isrc: String,
    #[serde(deserialize_with = "stringly")]
    pub recording_year: String,
    #[serde(deserialize_with = "stringly")]
    pub recording_artist_name: String,
    #[serde(deserialize_with = "stringly")]
    pub is_explicit: String,
    #[serde(deserialize_with = "stringly")]
    pub isrc: String,
    #[serde(deserialize_with = "stringly")]
    pub isrc_failure_code: String,
    #[serde(deserialize_with = "stringly")]
    pub recording_title: String,
    #[serde(deserialize_with = "stringly")]
    pub id: String,
}

impl CatalogRecord {
    /// Build a record from one item of the catalog's `recordings` list
    pub fn from_json(item: Value) -> Result<Self, CatalogError> {
        serde_json::from_value(item).map_err(CatalogError::MalformedRecord)
    }

    /// Whether the catalog flags this recording as explicit
    pub fn is_explicit(&self) -> bool {
        self.is_explicit == EXPLICIT_MARKER
    }
}

/// Render a scalar JSON value the way the catalog's own string fields look
pub fn catalog_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn stringly<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(catalog_string(&value))
}

/// Parameters of a fuzzy search for an explicit counterpart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitSearch {
    pub artist: String,
    pub title: String,
    pub year: String,
}

impl From<&CatalogRecord> for ExplicitSearch {
    fn from(record: &CatalogRecord) -> Self {
        Self {
            artist: record.recording_artist_name.clone(),
            title: record.recording_title.clone(),
            year: record.recording_year.clone(),
        }
    }
}

/// The row persisted per processed track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedTrackRow {
    /// ISRC read from the file's tags; the dedup key
    pub isrc: Isrc,
    pub catalog: CatalogRecord,
    pub explicit_version_exists: bool,
    pub file_path: String,
    pub processed_at: DateTime<Utc>,
}

impl ProcessedTrackRow {
    pub fn new(
        isrc: Isrc,
        catalog: CatalogRecord,
        explicit_version_exists: bool,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            isrc,
            catalog,
            explicit_version_exists,
            file_path: file_path.into(),
            processed_at: Utc::now(),
        }
    }

    /// A clean recording in the library while an explicit one is cataloged
    pub fn is_flagged(&self) -> bool {
        !self.catalog.is_explicit() && self.explicit_version_exists
    }
}

/// Result of running the pipeline for one file
#[derive(Debug)]
pub enum TrackOutcome {
    Recorded(ProcessedTrackRow),
    AlreadyProcessed(Isrc),
    Failed(String),
}

/// Totals for one audit run
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditSummary {
    pub files_found: usize,
    pub recorded: usize,
    pub already_processed: usize,
    pub failed: usize,
    /// Clean tracks for which an explicit version exists
    pub flagged: Vec<FlaggedTrack>,
    pub aborted: bool,
    /// Why the run stopped early
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort_reason: Option<String>,
}

impl AuditSummary {
    pub fn record(&mut self, outcome: &TrackOutcome) {
        match outcome {
            TrackOutcome::Recorded(row) => {
                self.recorded += 1;
                if row.is_flagged() {
                    self.flagged.push(FlaggedTrack::from(row));
                }
            }
            TrackOutcome::AlreadyProcessed(_) => self.already_processed += 1,
            TrackOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Mark the run as stopped by a fatal error
    pub fn abort(&mut self, reason: impl Into<String>) {
        self.aborted = true;
        self.abort_reason = Some(reason.into());
    }

    /// Files that were enumerated but never reached an outcome
    pub fn unprocessed(&self) -> usize {
        self.files_found
            .saturating_sub(self.recorded + self.already_processed + self.failed)
    }
}

/// Summary line for a flagged track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlaggedTrack {
    pub isrc: Isrc,
    pub artist: String,
    pub title: String,
    pub file_path: String,
}

impl From<&ProcessedTrackRow> for FlaggedTrack {
    fn from(row: &ProcessedTrackRow) -> Self {
        Self {
            isrc: row.isrc.clone(),
            artist: row.catalog.recording_artist_name.clone(),
            title: row.catalog.recording_title.clone(),
            file_path: row.file_path.clone(),
        }
    }
}
