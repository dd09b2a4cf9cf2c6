use catalog::Collection;
use tracing::debug;

use crate::layer::MapLayer;
use crate::selection::CollectionSelection;

/// Everything the viewer's panels and map agree on for one loaded value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub layer: Option<MapLayer>,
    pub picked_layer: Option<MapLayer>,
    pub collections: Vec<Collection>,
    pub selected_collection_ids: CollectionSelection,
}

/// The only ways [`AppState`] may change.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    SetLayer(MapLayer),
    SetPickedLayer(Option<MapLayer>),
    SetCollections(Vec<Collection>),
    SelectCollection(String),
    SetSelectedCollectionIds(CollectionSelection),
    DeselectCollection(String),
    DeselectAllCollections,
}

impl AppAction {
    pub fn name(&self) -> &'static str {
        match self {
            AppAction::SetLayer(_) => "set-layer",
            AppAction::SetPickedLayer(_) => "set-picked-layer",
            AppAction::SetCollections(_) => "set-collections",
            AppAction::SelectCollection(_) => "select-collection",
            AppAction::SetSelectedCollectionIds(_) => "set-selected-collection-ids",
            AppAction::DeselectCollection(_) => "deselect-collection",
            AppAction::DeselectAllCollections => "deselect-all-collections",
        }
    }
}

/// Pure transition function.
pub fn reduce(mut state: AppState, action: AppAction) -> AppState {
    match action {
        AppAction::SetLayer(layer) => state.layer = Some(layer),
        AppAction::SetPickedLayer(layer) => state.picked_layer = layer,
        AppAction::SetCollections(collections) => state.collections = collections,
        AppAction::SelectCollection(id) => {
            state.selected_collection_ids.insert(id);
        }
        AppAction::SetSelectedCollectionIds(ids) => state.selected_collection_ids = ids,
        AppAction::DeselectCollection(id) => {
            state.selected_collection_ids.remove(&id);
        }
        AppAction::DeselectAllCollections => state.selected_collection_ids.clear(),
    }
    state
}

/// Owner of the single [`AppState`] for a viewing session.
#[derive(Debug, Default)]
pub struct AppStore {
    state: AppState,
    dispatched: u64,
}

impl AppStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Number of actions applied since creation.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    pub fn dispatch(&mut self, action: AppAction) {
        debug!(action = action.name(), "dispatch");
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
        self.dispatched += 1;
    }

    /// Discards the current state; used when a new top-level value starts loading.
    pub fn reset(&mut self) {
        self.state = AppState::default();
    }
}
