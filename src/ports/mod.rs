// Ports - Interface definitions (contracts)

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::probe::ProbeResult;

/// Port for extracting structured metadata from a media file or stream URL
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Run one probe against `target` and return the typed result
    ///
    /// `target` reaches the prober unchanged, so non-UTF-8 file names work.
    async fn probe(&self, target: &OsStr) -> Result<ProbeResult, ProbeError>;
}

/// Port for the remote recording catalog
#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// Exact lookup by ISRC; the first match is returned
    async fn lookup_isrc(&self, isrc: &Isrc) -> Result<CatalogRecord, CatalogError>;

    /// Fuzzy search by artist, title and year for any explicit recording
    ///
    /// An unparseable response reports `false`.
    async fn explicit_version_exists(&self, search: &ExplicitSearch) -> Result<bool, CatalogError>;
}

/// Port for the processed-track store, keyed by ISRC
#[async_trait]
pub trait TrackStorePort: Send + Sync {
    /// Whether a row exists for `isrc`
    async fn contains(&self, isrc: &Isrc) -> Result<bool, StoreError>;

    /// Append one row; a second row for the same ISRC is `StoreError::Duplicate`
    async fn insert(&self, row: &ProcessedTrackRow) -> Result<(), StoreError>;

    /// Flush and close; later calls fail with `StoreError::Closed`
    async fn close(&self) -> Result<(), StoreError>;
}

/// Port for enumerating candidate audio files under a root directory
#[async_trait]
pub trait LibraryPort: Send + Sync {
    /// Every recognized file under `root`, in a stable order
    async fn enumerate(&self, root: &Path) -> Result<Vec<PathBuf>, ScanError>;
}
