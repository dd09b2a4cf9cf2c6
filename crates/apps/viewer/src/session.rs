//! One viewing session: the loaded value, its collections, the search panel
//! and the application state that ties them to the map.
//!
//! Async work follows a `begin_* -> run -> complete_*` shape. `begin_*`
//! records intent and hands back a job that owns everything it needs, so the
//! session is never borrowed across a network wait. `complete_*` checks the
//! job's generation token and drops results from superseded work.

use std::sync::Arc;

use catalog::{Collection, ColumnarStore, InMemoryColumnarStore, StacValue};
use runtime::{Generation, GenerationToken, NoticeBus};
use scene::{AppAction, AppState, AppStore, MapLayer, map_layers, selected_collections};
use streaming::{
    ByteSource, CollectionPages, Fetch, LoadedValue, Locator, NaturalLanguageSearch,
    SearchResult, StreamingError, ValueLoader,
};
use tracing::{debug, info};

use crate::config::ViewerConfig;
use crate::display::{SearchPanels, ValueView};

pub const LOAD_ERROR_TITLE: &str = "Error while loading STAC value";
pub const COLLECTIONS_ERROR_TITLE: &str = "Error while loading collections";
pub const SEARCH_ERROR_TITLE: &str = "Error while searching";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadStatus {
    pub href: Option<String>,
    pub value: Option<StacValue>,
    pub columnar_path: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionsStatus {
    pub loading: bool,
    pub pages: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStatus {
    pub query: Option<String>,
    /// `None` while loading and after a failure; never a partial list.
    pub results: Option<Vec<SearchResult>>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct LoadJob {
    token: GenerationToken,
    locator: Locator,
    local: Option<Box<dyn ByteSource>>,
    loader: ValueLoader,
}

impl LoadJob {
    pub async fn run(self) -> LoadCompletion {
        let result = self.loader.load(&self.locator, self.local.as_deref()).await;
        LoadCompletion {
            token: self.token,
            locator: self.locator,
            result,
        }
    }
}

pub struct LoadCompletion {
    token: GenerationToken,
    locator: Locator,
    result: Result<LoadedValue, StreamingError>,
}

pub struct CollectionsJob {
    token: GenerationToken,
    pages: CollectionPages,
}

impl CollectionsJob {
    /// Fetches one more page; `None` once the chain has ended.
    pub async fn next_update(&mut self) -> Option<CollectionsUpdate> {
        let collections = match self.pages.next_page().await {
            Ok(Some(so_far)) => so_far.to_vec(),
            Ok(None) => return None,
            Err(err) => {
                return Some(CollectionsUpdate {
                    token: self.token.clone(),
                    collections: self.pages.collections().to_vec(),
                    pages: self.pages.pages_fetched(),
                    finished: true,
                    error: Some(err),
                });
            }
        };
        Some(CollectionsUpdate {
            token: self.token.clone(),
            collections,
            pages: self.pages.pages_fetched(),
            finished: self.pages.is_finished(),
            error: None,
        })
    }
}

/// Snapshot of the accumulated collections after one page.
pub struct CollectionsUpdate {
    token: GenerationToken,
    collections: Vec<Collection>,
    pages: usize,
    finished: bool,
    error: Option<StreamingError>,
}

pub struct SearchJob {
    token: GenerationToken,
    client: NaturalLanguageSearch,
    query: String,
    catalog_href: String,
}

impl SearchJob {
    pub async fn run(self) -> SearchCompletion {
        let result = self.client.search(&self.query, &self.catalog_href).await;
        SearchCompletion {
            token: self.token,
            result,
        }
    }
}

pub struct SearchCompletion {
    token: GenerationToken,
    result: Result<Vec<SearchResult>, StreamingError>,
}

pub struct ViewerSession {
    fetcher: Arc<dyn Fetch>,
    config: ViewerConfig,
    store: AppStore,
    columnar: Box<dyn ColumnarStore>,
    notices: NoticeBus,
    loads: Generation,
    searches: Generation,
    load: LoadStatus,
    collections: CollectionsStatus,
    search: SearchStatus,
}

impl ViewerSession {
    pub fn new(fetcher: Arc<dyn Fetch>, config: ViewerConfig) -> Self {
        Self {
            fetcher,
            config,
            store: AppStore::new(),
            columnar: Box::new(InMemoryColumnarStore::new()),
            notices: NoticeBus::new(),
            loads: Generation::new(),
            searches: Generation::new(),
            load: LoadStatus::default(),
            collections: CollectionsStatus::default(),
            search: SearchStatus::default(),
        }
    }

    pub fn with_columnar_store(mut self, store: Box<dyn ColumnarStore>) -> Self {
        self.columnar = store;
        self
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn dispatch(&mut self, action: AppAction) {
        self.store.dispatch(action);
    }

    pub fn load_status(&self) -> &LoadStatus {
        &self.load
    }

    pub fn collections_status(&self) -> &CollectionsStatus {
        &self.collections
    }

    pub fn search_status(&self) -> &SearchStatus {
        &self.search
    }

    pub fn notices(&self) -> &NoticeBus {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeBus {
        &mut self.notices
    }

    pub fn columnar(&self) -> &dyn ColumnarStore {
        self.columnar.as_ref()
    }

    pub fn map_layers(&self) -> Vec<MapLayer> {
        map_layers(self.store.state())
    }

    pub fn selected_collections(&self) -> Vec<&Collection> {
        selected_collections(self.store.state())
    }

    pub fn view(&self) -> Option<ValueView> {
        let value = self.load.value.as_ref()?;
        let href = self.load.href.as_deref().unwrap_or_default();
        Some(ValueView::classify(
            value,
            href,
            self.load.columnar_path.as_deref(),
        ))
    }

    pub fn search_panels(&self) -> Option<SearchPanels> {
        self.load.value.as_ref().map(SearchPanels::for_value)
    }

    /// Starts loading `href`, superseding any load still in flight.
    ///
    /// The application state is discarded immediately.
    pub fn begin_load(&mut self, href: &str, local: Option<Box<dyn ByteSource>>) -> LoadJob {
        let token = self.loads.advance();
        self.store.reset();
        self.store.dispatch(AppAction::DeselectAllCollections);
        self.load = LoadStatus {
            href: Some(href.to_string()),
            loading: true,
            ..LoadStatus::default()
        };
        self.collections = CollectionsStatus::default();

        LoadJob {
            token,
            locator: Locator::parse(href),
            local,
            loader: ValueLoader::new(Arc::clone(&self.fetcher)),
        }
    }

    /// Publishes a finished load. Returns `false` if it was superseded.
    pub fn complete_load(&mut self, completion: LoadCompletion) -> bool {
        if completion.token.is_stale() {
            info!("discarding stale load of {}", completion.locator);
            return false;
        }

        self.load.loading = false;
        match completion.result {
            Ok(mut loaded) => {
                if let Err(err) = loaded.register_columnar(self.columnar.as_mut()) {
                    self.fail_load(&completion.locator, err);
                }
                if let Some(layer) = MapLayer::for_value(&loaded.value, loaded.columnar_path()) {
                    self.store.dispatch(AppAction::SetLayer(layer));
                }
                self.load.columnar_path = loaded.columnar_path().map(str::to_string);
                self.load.value = Some(loaded.value);
                info!("loaded {}", completion.locator);
            }
            Err(err) => self.fail_load(&completion.locator, err),
        }
        true
    }

    fn fail_load(&mut self, locator: &Locator, err: StreamingError) {
        let message = format!("{locator}: {err}");
        self.notices.error(LOAD_ERROR_TITLE, message.clone());
        self.load.error = Some(message);
    }

    /// Starts paging through the loaded catalog's collections.
    ///
    /// Returns `None` when there is nothing to page through. The job belongs to
    /// the current load and is superseded by the next one.
    pub fn begin_collections(&mut self) -> Option<CollectionsJob> {
        let value = self.load.value.as_ref()?;
        let base = self
            .load
            .href
            .as_deref()
            .and_then(|href| Locator::parse(href).url().cloned());

        match CollectionPages::start(
            Arc::clone(&self.fetcher),
            value,
            base.as_ref(),
            self.config.pagination,
        ) {
            Ok(Some(pages)) => {
                self.collections = CollectionsStatus {
                    loading: true,
                    ..CollectionsStatus::default()
                };
                Some(CollectionsJob {
                    token: self.loads.token(),
                    pages,
                })
            }
            Ok(None) => {
                self.collections = CollectionsStatus::default();
                None
            }
            Err(err) => {
                self.fail_collections(err);
                None
            }
        }
    }

    /// Publishes one page worth of progress. Returns `false` if superseded.
    pub fn apply_collections(&mut self, update: CollectionsUpdate) -> bool {
        if update.token.is_stale() {
            debug!("discarding collections page from a superseded load");
            return false;
        }

        self.collections.pages = update.pages;
        self.store
            .dispatch(AppAction::SetCollections(update.collections));
        if let Some(err) = update.error {
            self.fail_collections(err);
        }
        if update.finished {
            self.collections.loading = false;
        }
        true
    }

    fn fail_collections(&mut self, err: StreamingError) {
        let message = err.to_string();
        self.notices.error(COLLECTIONS_ERROR_TITLE, message.clone());
        self.collections.loading = false;
        self.collections.error = Some(message);
    }

    /// Starts a natural-language search, superseding any search in flight.
    pub fn begin_search(&mut self, query: &str, catalog_href: &str) -> SearchJob {
        let token = self.searches.advance();
        self.search = SearchStatus {
            query: Some(query.to_string()),
            loading: true,
            ..SearchStatus::default()
        };
        SearchJob {
            token,
            client: NaturalLanguageSearch::new(
                Arc::clone(&self.fetcher),
                self.config.search_api.clone(),
            ),
            query: query.to_string(),
            catalog_href: catalog_href.to_string(),
        }
    }

    pub fn complete_search(&mut self, completion: SearchCompletion) -> bool {
        if completion.token.is_stale() {
            debug!("discarding superseded search");
            return false;
        }

        self.search.loading = false;
        match completion.result {
            Ok(results) => {
                info!("search returned {} results", results.len());
                self.search.results = Some(results);
            }
            Err(err) => {
                let message = err.to_string();
                self.notices.error(SEARCH_ERROR_TITLE, message.clone());
                self.search.results = None;
                self.search.error = Some(message);
            }
        }
        true
    }

    /// Loads `href` and then pages through its collections, publishing each
    /// page as it arrives.
    pub async fn open(&mut self, href: &str, local: Option<Box<dyn ByteSource>>) {
        let completion = self.begin_load(href, local).run().await;
        if self.complete_load(completion) {
            self.load_collections().await;
        }
    }

    pub async fn load_collections(&mut self) {
        let Some(mut job) = self.begin_collections() else {
            return;
        };
        while let Some(update) = job.next_update().await {
            if !self.apply_collections(update) {
                break;
            }
        }
    }

    pub async fn search(&mut self, query: &str, catalog_href: &str) {
        let completion = self.begin_search(query, catalog_href).run().await;
        self.complete_search(completion);
    }
}
