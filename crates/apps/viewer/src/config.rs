use std::env;

use streaming::{PaginationPolicy, SEARCH_API_ENV};
use tracing::warn;
use url::Url;

pub const MAX_PAGES_ENV: &str = "STAC_MAX_PAGES";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerConfig {
    /// Base address of the natural-language search service.
    pub search_api: Option<Url>,
    pub pagination: PaginationPolicy,
}

impl ViewerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key/value source; unset or unparsable values
    /// fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let search_api = lookup(SEARCH_API_ENV).and_then(|raw| match Url::parse(raw.trim()) {
            Ok(url) => Some(url),
            Err(err) => {
                warn!("ignoring {SEARCH_API_ENV}={raw:?}: {err}");
                None
            }
        });
        let max_pages = lookup(MAX_PAGES_ENV)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(PaginationPolicy::default().max_pages);

        Self {
            search_api,
            pagination: PaginationPolicy { max_pages },
        }
    }
}
