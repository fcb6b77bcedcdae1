//! HTTP client for the recording catalog
//!
//! Both lookups are a single authenticated POST with a JSON body against the
//! same endpoint; the response carries a `recordings` list.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::adapters::toml_config::CatalogConfig;
use crate::domain::errors::CatalogError;
use crate::domain::model::{CatalogRecord, ExplicitSearch, Isrc};
use crate::domain::rules::any_explicit;
use crate::ports::CatalogPort;

const USER_AGENT: &str = concat!("clean-locator/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct RecordingsResponse {
    recordings: Vec<Value>,
}

/// Request body for an exact ISRC lookup
pub fn lookup_payload(isrc: &Isrc, page_size: u32) -> Value {
    json!({
        "searchFields": { "isrc": isrc.as_str() },
        "start": 0,
        "number": page_size,
        "showReleases": false
    })
}

/// Request body for a fuzzy artist/title/year search, built fresh per call
pub fn search_payload(search: &ExplicitSearch, page_size: u32) -> Value {
    json!({
        "searchFields": {
            "recordingArtistName": { "value": search.artist },
            "recordingTitle": { "value": search.title },
            "releaseName": { "value": "" },
            "releaseYear": "",
            "recordingVersion": { "value": "" },
            "recordingYear": search.year,
            "recordingType": ""
        },
        "start": 0,
        "number": page_size,
        "showReleases": false
    })
}

fn parse_recordings(body: &str) -> Result<Vec<Value>, CatalogError> {
    serde_json::from_str::<RecordingsResponse>(body)
        .map(|response| response.recordings)
        .map_err(|source| CatalogError::ResponseParse {
            source,
            body: body.to_string(),
        })
}

/// First recording of a lookup response
pub fn parse_lookup(isrc: &Isrc, body: &str) -> Result<CatalogRecord, CatalogError> {
    let first = parse_recordings(body)?
        .into_iter()
        .next()
        .ok_or_else(|| CatalogError::NotFound(isrc.to_string()))?;
    CatalogRecord::from_json(first)
}

/// Whether any recording of a search response is explicit; unparseable means no
pub fn parse_search(body: &str) -> bool {
    match parse_recordings(body) {
        Ok(recordings) => any_explicit(&recordings),
        Err(e) => {
            warn!("Could not parse catalog search response: {}", e);
            false
        }
    }
}

/// reqwest-backed catalog client
pub struct HttpCatalogClient {
    http_client: reqwest::Client,
    endpoint: String,
    authorization: String,
    lookup_page_size: u32,
    search_page_size: u32,
}

impl HttpCatalogClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(CatalogError::ClientBuild)?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            authorization: format!(
                "{} {}",
                config.auth_scheme,
                config.token.as_deref().unwrap_or_default()
            ),
            lookup_page_size: config.lookup_page_size,
            search_page_size: config.search_page_size,
        })
    }

    /// POST `payload` and return the body of a successful response
    async fn post(&self, payload: &Value) -> Result<String, CatalogError> {
        debug!(endpoint = %self.endpoint, payload = %payload, "Catalog request");

        let response = self
            .http_client
            .post(&self.endpoint)
            .header(AUTHORIZATION, &self.authorization)
            .json(payload)
            .send()
            .await
            .map_err(CatalogError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(CatalogError::Transport)?;
        debug!(status = status.as_u16(), body = %body, "Catalog response");

        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl CatalogPort for HttpCatalogClient {
    async fn lookup_isrc(&self, isrc: &Isrc) -> Result<CatalogRecord, CatalogError> {
        let body = self
            .post(&lookup_payload(isrc, self.lookup_page_size))
            .await?;
        parse_lookup(isrc, &body)
    }

    async fn explicit_version_exists(&self, search: &ExplicitSearch) -> Result<bool, CatalogError> {
        let body = self
            .post(&search_payload(search, self.search_page_size))
            .await?;
        Ok(parse_search(&body))
    }
}
