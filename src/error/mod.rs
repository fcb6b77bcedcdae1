//! Error handling module for Clean Locator

use thiserror::Error;

use crate::domain::errors::{CatalogError, ConfigError, ProbeError, ScanError, StoreError};

/// Main error type for Clean Locator operations
#[derive(Error, Debug)]
pub enum LocatorError {
    /// Configuration could not be loaded or is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The probe command could not be set up
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// The catalog client could not be set up
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Track store failure that ends the run
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The library root could not be scanned
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Summary rendering failed
    #[error("Failed to render summary: {0}")]
    Render(String),
}

/// Result type alias for Clean Locator operations
pub type LocatorResult<T> = std::result::Result<T, LocatorError>;
