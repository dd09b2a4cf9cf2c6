use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// Registry record for a columnar (stac-geoparquet) file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnarEntry {
    /// Locator the bytes were loaded from; also the query-side table path.
    pub locator: String,
    pub byte_len: usize,
    /// blake3 hex digest of the registered bytes.
    pub content_hash: String,
}

/// Queryable in-memory home for columnar bytes, keyed by locator.
///
/// The viewer never decodes rows itself; it only makes the bytes reachable by
/// whatever query engine renders them.
pub trait ColumnarStore {
    fn register(&mut self, locator: &str, bytes: Vec<u8>) -> Result<ColumnarEntry, CatalogError>;
    fn entry(&self, locator: &str) -> Result<Option<ColumnarEntry>, CatalogError>;
    fn bytes(&self, locator: &str) -> Result<Option<Vec<u8>>, CatalogError>;
    fn list(&self) -> Result<Vec<ColumnarEntry>, CatalogError>;
    fn unregister(&mut self, locator: &str) -> Result<bool, CatalogError>;
}

pub fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

#[derive(Debug, Clone)]
struct RegisteredFile {
    entry: ColumnarEntry,
    bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct InMemoryColumnarStore {
    files: BTreeMap<String, RegisteredFile>,
    /// Upper bound on a single registration; `None` is unbounded.
    max_file_bytes: Option<usize>,
}

impl InMemoryColumnarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_file_bytes(max_file_bytes: usize) -> Self {
        Self {
            files: BTreeMap::new(),
            max_file_bytes: Some(max_file_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ColumnarStore for InMemoryColumnarStore {
    fn register(&mut self, locator: &str, bytes: Vec<u8>) -> Result<ColumnarEntry, CatalogError> {
        if let Some(max) = self.max_file_bytes {
            if bytes.len() > max {
                return Err(CatalogError::Storage(format!(
                    "{locator} is {} bytes, limit is {max}",
                    bytes.len()
                )));
            }
        }

        let entry = ColumnarEntry {
            locator: locator.to_string(),
            byte_len: bytes.len(),
            content_hash: content_hash(&bytes),
        };
        self.files.insert(
            locator.to_string(),
            RegisteredFile {
                entry: entry.clone(),
                bytes,
            },
        );
        Ok(entry)
    }

    fn entry(&self, locator: &str) -> Result<Option<ColumnarEntry>, CatalogError> {
        Ok(self.files.get(locator).map(|f| f.entry.clone()))
    }

    fn bytes(&self, locator: &str) -> Result<Option<Vec<u8>>, CatalogError> {
        Ok(self.files.get(locator).map(|f| f.bytes.clone()))
    }

    fn list(&self) -> Result<Vec<ColumnarEntry>, CatalogError> {
        Ok(self.files.values().map(|f| f.entry.clone()).collect())
    }

    fn unregister(&mut self, locator: &str) -> Result<bool, CatalogError> {
        Ok(self.files.remove(locator).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn register_then_read_back() {
        let mut store = InMemoryColumnarStore::new();
        let entry = store.register("items.parquet", b"PAR1....PAR1".to_vec()).unwrap();
        assert_eq!(entry.byte_len, 12);
        assert_eq!(entry.content_hash, content_hash(b"PAR1....PAR1"));

        assert_eq!(store.entry("items.parquet").unwrap(), Some(entry));
        assert_eq!(
            store.bytes("items.parquet").unwrap().as_deref(),
            Some(&b"PAR1....PAR1"[..])
        );
        assert_eq!(store.bytes("other.parquet").unwrap(), None);
    }

    #[test]
    fn re_registering_replaces_bytes() {
        let mut store = InMemoryColumnarStore::new();
        store.register("a.parquet", vec![1, 2, 3]).unwrap();
        let second = store.register("a.parquet", vec![4]).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.entry("a.parquet").unwrap(), Some(second));
    }

    #[test]
    fn list_is_ordered_by_locator() {
        let mut store = InMemoryColumnarStore::new();
        store.register("b.parquet", vec![]).unwrap();
        store.register("a.parquet", vec![]).unwrap();
        let locators: Vec<String> = store.list().unwrap().into_iter().map(|e| e.locator).collect();
        assert_eq!(locators, vec!["a.parquet", "b.parquet"]);
    }

    #[test]
    fn oversized_file_is_rejected() {
        let mut store = InMemoryColumnarStore::with_max_file_bytes(2);
        let err = store.register("big.parquet", vec![0; 3]).unwrap_err();
        assert!(matches!(err, CatalogError::Storage(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn unregister_reports_presence() {
        let mut store = InMemoryColumnarStore::new();
        store.register("a.parquet", vec![1]).unwrap();
        assert!(store.unregister("a.parquet").unwrap());
        assert!(!store.unregister("a.parquet").unwrap());
    }
}
