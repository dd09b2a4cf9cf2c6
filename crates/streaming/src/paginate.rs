use std::collections::HashSet;
use std::sync::Arc;

use catalog::{Collection, CollectionsPage, StacValue, rel};
use tracing::{debug, warn};
use url::Url;

use crate::error::StreamingError;
use crate::fetch::{Fetch, resolve_href};

pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Bounds on how far a `next` chain is followed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PaginationPolicy {
    pub max_pages: usize,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Lazy cursor over a catalog's paginated collection listing.
///
/// Pages are fetched strictly one after another; each call to
/// [`CollectionPages::next_page`] requests exactly one page and yields the
/// collections accumulated so far. A failed page ends the cursor but keeps
/// everything accumulated before it.
pub struct CollectionPages {
    fetcher: Arc<dyn Fetch>,
    next: Option<Url>,
    visited: HashSet<Url>,
    collections: Vec<Collection>,
    pages: usize,
    policy: PaginationPolicy,
}

impl CollectionPages {
    /// Starts at the catalog's `data` link.
    ///
    /// Returns `Ok(None)` when the catalog has no `data` link. A relative href
    /// is resolved against `base` (where the catalog was loaded from), falling
    /// back to the catalog's own `self` link.
    pub fn start(
        fetcher: Arc<dyn Fetch>,
        catalog: &StacValue,
        base: Option<&Url>,
        policy: PaginationPolicy,
    ) -> Result<Option<Self>, StreamingError> {
        let Some(data) = catalog.link(rel::DATA) else {
            return Ok(None);
        };
        let self_url = catalog
            .link(rel::SELF)
            .and_then(|link| Url::parse(&link.href).ok());
        let base = base.cloned().or(self_url);
        let first = resolve_href(base.as_ref(), &data.href)?;

        Ok(Some(Self {
            fetcher,
            next: Some(first),
            visited: HashSet::new(),
            collections: Vec::new(),
            pages: 0,
            policy,
        }))
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    pub fn is_finished(&self) -> bool {
        self.next.is_none()
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn into_collections(self) -> Vec<Collection> {
        self.collections
    }

    /// Fetches the next page.
    ///
    /// Returns `Ok(None)` once the chain has ended.
    pub async fn next_page(&mut self) -> Result<Option<&[Collection]>, StreamingError> {
        let Some(url) = self.next.take() else {
            return Ok(None);
        };
        if self.pages >= self.policy.max_pages {
            warn!("giving up on {url}: page limit {} reached", self.policy.max_pages);
            return Err(StreamingError::PageLimit {
                limit: self.policy.max_pages,
            });
        }
        if !self.visited.insert(url.clone()) {
            warn!("next link cycles back to {url}");
            return Err(StreamingError::PaginationCycle {
                url: url.to_string(),
            });
        }

        let bytes = self.fetcher.get(url.clone()).await?;
        let page = CollectionsPage::from_json_bytes(&bytes)
            .map_err(|e| StreamingError::decode(url.as_str(), e))?;
        let next_href = page.next_link().map(|link| link.href.clone());

        self.pages += 1;
        self.collections.extend(page.collections);
        debug!(
            page = self.pages,
            total = self.collections.len(),
            "fetched collections page {url}"
        );

        if let Some(href) = next_href {
            self.next = Some(resolve_href(Some(&url), &href)?);
        }
        Ok(Some(self.collections.as_slice()))
    }
}
