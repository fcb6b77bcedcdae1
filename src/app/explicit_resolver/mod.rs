// Explicit resolver - Decides whether an explicit version of a recording exists

use std::sync::Arc;

use tracing::debug;

use crate::domain::errors::CatalogError;
use crate::domain::model::CatalogRecord;
use crate::domain::rules::ExplicitDecision;
use crate::ports::CatalogPort;

pub struct ExplicitResolver {
    catalog_port: Arc<dyn CatalogPort>,
}

impl ExplicitResolver {
    pub fn new(catalog_port: Arc<dyn CatalogPort>) -> Self {
        Self { catalog_port }
    }

    /// An explicit recording answers for itself; a clean one needs a search
    pub async fn resolve(&self, record: &CatalogRecord) -> Result<bool, CatalogError> {
        match ExplicitDecision::for_record(record) {
            ExplicitDecision::AlreadyExplicit => Ok(true),
            ExplicitDecision::SearchRequired(search) => {
                debug!(
                    artist = %search.artist,
                    title = %search.title,
                    year = %search.year,
                    "Searching catalog for an explicit version"
                );
                self.catalog_port.explicit_version_exists(&search).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ExplicitSearch, Isrc};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct RecordingCatalog {
        searches: Mutex<Vec<ExplicitSearch>>,
        answer: bool,
    }

    #[async_trait]
    impl CatalogPort for RecordingCatalog {
        async fn lookup_isrc(&self, isrc: &Isrc) -> Result<CatalogRecord, CatalogError> {
            Err(CatalogError::NotFound(isrc.to_string()))
        }

        async fn explicit_version_exists(&self, search: &ExplicitSearch) -> Result<bool, CatalogError> {
            self.searches.lock().unwrap().push(search.clone());
            Ok(self.answer)
        }
    }

    fn record(explicit: &str) -> CatalogRecord {
        CatalogRecord::from_json(json!({
            "duration": "200",
            "recordingVersion": "Radio Edit",
            "isValidIsrc": "True",
            "recordingYear": "2020",
            "recordingArtistName": "A",
            "isExplicit": explicit,
            "isrc": "X1",
            "isrcFailureCode": "",
            "recordingTitle": "T",
            "id": "1"
        }))
        .unwrap()
    }

    fn resolver(answer: bool) -> (ExplicitResolver, Arc<RecordingCatalog>) {
        let catalog = Arc::new(RecordingCatalog {
            searches: Mutex::new(Vec::new()),
            answer,
        });
        (ExplicitResolver::new(catalog.clone()), catalog)
    }

    #[tokio::test]
    async fn test_explicit_record_skips_search() {
        let (resolver, catalog) = resolver(false);
        assert!(resolver.resolve(&record("True")).await.unwrap());
        assert!(catalog.searches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clean_record_searches_by_artist_title_year() {
        let (resolver, catalog) = resolver(true);
        assert!(resolver.resolve(&record("False")).await.unwrap());

        let searches = catalog.searches.lock().unwrap();
        assert_eq!(
            *searches,
            vec![ExplicitSearch {
                artist: "A".to_string(),
                title: "T".to_string(),
                year: "2020".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_clean_record_without_explicit_counterpart() {
        let (resolver, _) = resolver(false);
        assert!(!resolver.resolve(&record("False")).await.unwrap());
    }
}
