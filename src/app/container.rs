use std::sync::Arc;

use crate::adapters::toml_config::AppConfig;
use crate::adapters::{FfprobeAdapter, HttpCatalogClient, SqliteTrackStore, WalkDirLibrary};
use crate::app::audit_interactor::AuditInteractor;
use crate::error::LocatorResult;
use crate::ports::{CatalogPort, LibraryPort, ProbePort, TrackStorePort};

pub trait AppContainer: Send + Sync {
    fn audit_interactor(&self) -> Arc<AuditInteractor>;
}

/// Wires the production adapters to the audit interactor
pub struct DefaultAppContainer {
    audit_interactor: Arc<AuditInteractor>,
}

impl DefaultAppContainer {
    pub fn new(config: &AppConfig) -> LocatorResult<Self> {
        let probe_port = Arc::new(FfprobeAdapter::from_config(&config.probe)?);
        let catalog_port = Arc::new(HttpCatalogClient::new(&config.catalog)?);
        let store_port = Arc::new(SqliteTrackStore::open(&config.store.database)?);
        let library_port = Arc::new(WalkDirLibrary::new(config.scan.matcher()));

        let audit_interactor = Arc::new(AuditInteractor::new(
            probe_port as Arc<dyn ProbePort>,
            catalog_port as Arc<dyn CatalogPort>,
            store_port as Arc<dyn TrackStorePort>,
            library_port as Arc<dyn LibraryPort>,
        ));

        Ok(Self { audit_interactor })
    }
}

impl AppContainer for DefaultAppContainer {
    fn audit_interactor(&self) -> Arc<AuditInteractor> {
        Arc::clone(&self.audit_interactor)
    }
}
