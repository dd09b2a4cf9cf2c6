//! Transport seam for document retrieval.
//!
//! Everything above this module talks to the network through [`Fetch`], so
//! the loader, paginator and search client can run against
//! [`MemoryFetcher`] in tests and offline sessions.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use tracing::debug;
use url::Url;

use crate::error::StreamingError;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Byte-level HTTP access.
///
/// Methods return boxed futures for dyn-compatibility. A non-success status is
/// reported as [`StreamingError::Retrieval`], never as a body.
pub trait Fetch: Send + Sync {
    fn get(&self, url: Url) -> BoxFuture<'_, Result<Vec<u8>, StreamingError>>;

    fn post_json(
        &self,
        url: Url,
        body: serde_json::Value,
    ) -> BoxFuture<'_, Result<Vec<u8>, StreamingError>>;
}

/// Resolves `href` against `base`, or parses it as absolute when there is no base.
pub fn resolve_href(base: Option<&Url>, href: &str) -> Result<Url, StreamingError> {
    let resolved = match base {
        Some(base) => base.join(href),
        None => Url::parse(href),
    };
    resolved.map_err(|e| StreamingError::InvalidLocator {
        href: href.to_string(),
        message: e.to_string(),
    })
}

#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: Url) -> BoxFuture<'_, Result<Vec<u8>, StreamingError>> {
        Box::pin(async move {
            debug!("GET {url}");
            let resp = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| StreamingError::retrieval(url.as_str(), e))?;
            read_body(&url, resp).await
        })
    }

    fn post_json(
        &self,
        url: Url,
        body: serde_json::Value,
    ) -> BoxFuture<'_, Result<Vec<u8>, StreamingError>> {
        Box::pin(async move {
            debug!("POST {url}");
            let resp = self
                .client
                .post(url.clone())
                .json(&body)
                .send()
                .await
                .map_err(|e| StreamingError::retrieval(url.as_str(), e))?;
            read_body(&url, resp).await
        })
    }
}

async fn read_body(url: &Url, resp: reqwest::Response) -> Result<Vec<u8>, StreamingError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(StreamingError::retrieval(url.as_str(), status));
    }
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| StreamingError::retrieval(url.as_str(), e))?;
    Ok(bytes.to_vec())
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
enum Canned {
    Body(Vec<u8>),
    Failure(String),
}

/// In-memory [`Fetch`] serving canned responses by exact URL.
///
/// Unknown URLs fail like a 404. Every request is recorded in arrival order.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    responses: Mutex<HashMap<String, Canned>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bytes(self, url: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(url, Canned::Body(bytes.into()));
        self
    }

    pub fn with_json(self, url: &str, value: serde_json::Value) -> Self {
        self.with_bytes(url, value.to_string())
    }

    pub fn with_failure(self, url: &str, message: impl Into<String>) -> Self {
        self.insert(url, Canned::Failure(message.into()));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn insert(&self, url: &str, canned: Canned) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(normalize(url), canned);
        }
    }

    fn respond(
        &self,
        method: &'static str,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<Vec<u8>, StreamingError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                method,
                url: url.to_string(),
                body,
            });
        }
        let canned = self
            .responses
            .lock()
            .ok()
            .and_then(|responses| responses.get(url.as_str()).cloned());
        match canned {
            Some(Canned::Body(bytes)) => Ok(bytes),
            Some(Canned::Failure(message)) => Err(StreamingError::retrieval(url.as_str(), message)),
            None => Err(StreamingError::retrieval(url.as_str(), "404 Not Found")),
        }
    }
}

impl Fetch for MemoryFetcher {
    fn get(&self, url: Url) -> BoxFuture<'_, Result<Vec<u8>, StreamingError>> {
        Box::pin(std::future::ready(self.respond("GET", url, None)))
    }

    fn post_json(
        &self,
        url: Url,
        body: serde_json::Value,
    ) -> BoxFuture<'_, Result<Vec<u8>, StreamingError>> {
        Box::pin(std::future::ready(self.respond("POST", url, Some(body))))
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolve_joins_relative_against_base() {
        let base = Url::parse("https://example.com/stac/catalog.json").unwrap();
        let url = resolve_href(Some(&base), "collections?page=2").unwrap();
        assert_eq!(url.as_str(), "https://example.com/stac/collections?page=2");

        let absolute = resolve_href(Some(&base), "https://other.org/c").unwrap();
        assert_eq!(absolute.as_str(), "https://other.org/c");
    }

    #[test]
    fn resolve_without_base_needs_absolute() {
        let err = resolve_href(None, "collections").unwrap_err();
        assert!(matches!(err, StreamingError::InvalidLocator { .. }));
    }

    #[tokio::test]
    async fn memory_fetcher_serves_and_records() {
        let fetcher = MemoryFetcher::new()
            .with_json("https://example.com", json!({"ok": true}))
            .with_failure("https://example.com/down", "connection refused");

        let body = fetcher
            .get(Url::parse("https://example.com/").unwrap())
            .await
            .unwrap();
        assert_eq!(body, br#"{"ok":true}"#.to_vec());

        let err = fetcher
            .get(Url::parse("https://example.com/down").unwrap())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "request to https://example.com/down failed: connection refused"
        );

        let missing = fetcher
            .post_json(Url::parse("https://example.com/nope").unwrap(), json!({}))
            .await;
        assert!(missing.is_err());

        let requests = fetcher.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[2].method, "POST");
        assert_eq!(requests[2].body, Some(json!({})));
    }
}
