use std::path::{Path, PathBuf};
use std::sync::Arc;

use catalog::{ColumnarEntry, ColumnarStore, StacValue, is_columnar_href};
use tracing::{debug, info};
use url::Url;

use crate::error::StreamingError;
use crate::fetch::{BoxFuture, Fetch};

/// Where a value comes from.
///
/// Anything that parses as an absolute URL is fetched; everything else names a
/// locally provided file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Remote { href: String, url: Url },
    Local { href: String },
}

impl Locator {
    pub fn parse(href: &str) -> Self {
        match Url::parse(href) {
            Ok(url) => Locator::Remote {
                href: href.to_string(),
                url,
            },
            Err(_) => Locator::Local {
                href: href.to_string(),
            },
        }
    }

    pub fn href(&self) -> &str {
        match self {
            Locator::Remote { href, .. } | Locator::Local { href } => href,
        }
    }

    pub fn url(&self) -> Option<&Url> {
        match self {
            Locator::Remote { url, .. } => Some(url),
            Locator::Local { .. } => None,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Locator::Remote { .. })
    }

    /// Path component used for the columnar check; the query string is ignored.
    fn path(&self) -> &str {
        match self {
            Locator::Remote { url, .. } => url.path(),
            Locator::Local { href } => href,
        }
    }

    pub fn is_columnar(&self) -> bool {
        is_columnar_href(self.path())
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.href())
    }
}

/// A locally provided file, standing in for network retrieval.
pub trait ByteSource: Send + Sync {
    fn name(&self) -> &str;
    fn read(&self) -> BoxFuture<'_, Result<Vec<u8>, StreamingError>>;
}

#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    bytes: Vec<u8>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl ByteSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> BoxFuture<'_, Result<Vec<u8>, StreamingError>> {
        Box::pin(std::future::ready(Ok(self.bytes.clone())))
    }
}

#[derive(Debug, Clone)]
pub struct DiskFile {
    path: PathBuf,
    name: String,
}

impl DiskFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path.to_string_lossy().into_owned();
        Self { path, name }
    }
}

impl ByteSource for DiskFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> BoxFuture<'_, Result<Vec<u8>, StreamingError>> {
        Box::pin(async move {
            tokio::fs::read(&self.path)
                .await
                .map_err(|e| StreamingError::retrieval(self.name.as_str(), e))
        })
    }
}

/// Raw columnar bytes waiting to be registered under their locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnarPayload {
    pub path: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedValue {
    pub value: StacValue,
    pub columnar: Option<ColumnarPayload>,
}

impl LoadedValue {
    pub fn columnar_path(&self) -> Option<&str> {
        self.columnar.as_ref().map(|c| c.path.as_str())
    }

    /// Moves the columnar bytes, if any, into `store`.
    ///
    /// The placeholder value is left untouched whether or not this succeeds.
    pub fn register_columnar(
        &mut self,
        store: &mut dyn ColumnarStore,
    ) -> Result<Option<ColumnarEntry>, StreamingError> {
        let Some(payload) = self.columnar.as_mut() else {
            return Ok(None);
        };
        let bytes = std::mem::take(&mut payload.bytes);
        let entry = store.register(&payload.path, bytes)?;
        debug!(
            "registered {} ({} bytes, {})",
            entry.locator, entry.byte_len, entry.content_hash
        );
        Ok(Some(entry))
    }
}

/// Turns a locator into a [`StacValue`].
#[derive(Clone)]
pub struct ValueLoader {
    fetcher: Arc<dyn Fetch>,
}

impl ValueLoader {
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self { fetcher }
    }

    pub async fn load(
        &self,
        locator: &Locator,
        local: Option<&dyn ByteSource>,
    ) -> Result<LoadedValue, StreamingError> {
        info!("loading {locator}");
        match locator {
            Locator::Remote { url, .. } => {
                let bytes = self.fetcher.get(url.clone()).await?;
                if locator.is_columnar() {
                    return Ok(columnar_value(locator, bytes));
                }
                let value = StacValue::from_json_bytes(&bytes)
                    .map_err(|e| StreamingError::decode(url.as_str(), e))?;
                Ok(LoadedValue {
                    value,
                    columnar: None,
                })
            }
            Locator::Local { href } => {
                let source = local.ok_or_else(|| StreamingError::LocalSourceUnavailable {
                    locator: href.clone(),
                })?;
                let bytes = source.read().await?;
                if locator.is_columnar() {
                    return Ok(columnar_value(locator, bytes));
                }
                let mut value = StacValue::from_json_bytes(&bytes)
                    .map_err(|e| StreamingError::decode(href.as_str(), e))?;
                if !value.has_id() {
                    value.id = Some(href.clone());
                }
                Ok(LoadedValue {
                    value,
                    columnar: None,
                })
            }
        }
    }
}

fn columnar_value(locator: &Locator, bytes: Vec<u8>) -> LoadedValue {
    LoadedValue {
        value: StacValue::geoparquet_placeholder(locator.path()),
        columnar: Some(ColumnarPayload {
            path: locator.href().to_string(),
            bytes,
        }),
    }
}
