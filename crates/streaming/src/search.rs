use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;
use url::Url;

use crate::error::StreamingError;
use crate::fetch::{Fetch, resolve_href};

/// Environment variable naming the natural-language search service.
pub const SEARCH_API_ENV: &str = "STAC_NATURAL_QUERY_API";

/// Path of the search endpoint, joined onto the configured base address.
pub const SEARCH_PATH: &str = "search";

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    catalog_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

/// One ranked hit from the natural-language collection search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SearchResult {
    pub fn label(&self) -> String {
        match (&self.collection_id, &self.explanation) {
            (Some(id), Some(why)) => format!("{id}: {why}"),
            (Some(id), None) => id.clone(),
            (None, Some(why)) => why.clone(),
            (None, None) => Value::Object(self.fields.clone()).to_string(),
        }
    }
}

/// Client for the free-text collection search service.
#[derive(Clone)]
pub struct NaturalLanguageSearch {
    fetcher: Arc<dyn Fetch>,
    base_url: Option<Url>,
}

impl NaturalLanguageSearch {
    pub fn new(fetcher: Arc<dyn Fetch>, base_url: Option<Url>) -> Self {
        Self { fetcher, base_url }
    }

    /// Endpoint URL, or `ConfigurationMissing` when no base is configured.
    pub fn endpoint(&self) -> Result<Url, StreamingError> {
        let base = self
            .base_url
            .as_ref()
            .ok_or(StreamingError::ConfigurationMissing(SEARCH_API_ENV))?;
        resolve_href(Some(base), SEARCH_PATH)
    }

    pub async fn search(
        &self,
        query: &str,
        catalog_href: &str,
    ) -> Result<Vec<SearchResult>, StreamingError> {
        let url = self.endpoint()?;
        let body = serde_json::to_value(SearchRequest {
            query,
            catalog_url: catalog_href,
        })
        .map_err(|e| StreamingError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        info!("natural language search for {query:?} in {catalog_href}");
        let bytes = self.fetcher.post_json(url.clone(), body).await?;
        let response: SearchResponse =
            serde_json::from_slice(&bytes).map_err(|e| StreamingError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(response.results)
    }
}
