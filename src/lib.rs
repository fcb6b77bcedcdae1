//! Clean Locator Library
//!
//! Audits a music library for clean edits of recordings that also exist in
//! an explicit version. Each audio file is probed with ffprobe, its ISRC is
//! looked up in a recording catalog, and the result is kept in a SQLite
//! store so that later runs skip tracks already seen.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod ports;
pub mod probe;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::{CatalogError, NormalizeError, ProbeError, StoreError};
pub use domain::model::{AuditSummary, CatalogRecord, Isrc, ProcessedTrackRow, TrackMetadata};
pub use error::{LocatorError, LocatorResult};
pub use probe::ProbeResult;
