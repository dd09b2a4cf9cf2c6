//! Views computed from [`AppState`]; nothing here mutates state.

use catalog::{Bbox, Collection, collections_extent};

use crate::layer::{MapLayer, PICKED_LAYER_ID, SELECTED_COLLECTIONS_LAYER_ID, VALUE_LAYER_ID};
use crate::state::AppState;

/// Collections whose id is selected, in collection-list order.
///
/// Selected ids with no matching collection (left over from an earlier
/// listing) are silently dropped.
pub fn selected_collections(state: &AppState) -> Vec<&Collection> {
    state
        .collections
        .iter()
        .filter(|c| state.selected_collection_ids.contains(&c.id))
        .collect()
}

/// Layers handed to the map, bottom to top: picked, selected collections, value.
pub fn map_layers(state: &AppState) -> Vec<MapLayer> {
    let mut layers = Vec::new();
    if let Some(picked) = &state.picked_layer {
        layers.push(picked.with_id(PICKED_LAYER_ID));
    }
    let selected = selected_collections(state);
    if !selected.is_empty() {
        layers.push(MapLayer::collections(selected, true).with_id(SELECTED_COLLECTIONS_LAYER_ID));
    }
    if let Some(layer) = &state.layer {
        layers.push(layer.with_id(VALUE_LAYER_ID));
    }
    layers
}

/// Bounds to fit the map to for the current selection.
pub fn selected_extent(state: &AppState) -> Option<Bbox> {
    collections_extent(selected_collections(state))
}

/// Case-insensitive substring match on title or id.
pub fn filter_collections<'a>(collections: &'a [Collection], query: &str) -> Vec<&'a Collection> {
    let needle = query.to_lowercase();
    collections
        .iter()
        .filter(|c| {
            c.id.to_lowercase().contains(&needle)
                || c.title
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Short summary of how many collections are selected.
pub fn selection_label(count: usize) -> String {
    match count {
        0 => "Select one or more collections".to_string(),
        1 => "1 collection selected".to_string(),
        n => format!("{n} collections selected"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerSource;
    use crate::state::{AppAction, reduce};
    use pretty_assertions::assert_eq;

    fn state_with(ids: &[&str], selected: &[&str]) -> AppState {
        AppState {
            collections: ids
                .iter()
                .map(|id| Collection::new(*id).with_bbox([0.0, 0.0, 1.0, 1.0]))
                .collect(),
            selected_collection_ids: selected.iter().copied().collect(),
            ..AppState::default()
        }
    }

    #[test]
    fn stale_selected_ids_are_dropped() {
        let state = state_with(&["a", "b"], &["a", "c"]);
        let selected: Vec<&str> = selected_collections(&state)
            .into_iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(selected, vec!["a"]);
    }

    #[test]
    fn selection_follows_collection_order() {
        let state = state_with(&["z", "a", "m"], &["a", "z"]);
        let selected: Vec<&str> = selected_collections(&state)
            .into_iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(selected, vec!["z", "a"]);
    }

    #[test]
    fn map_layers_are_ordered_and_renamed() {
        let value_layer = MapLayer::new("whatever", LayerSource::Features(Vec::new()));
        let picked = MapLayer::new("hover", LayerSource::Features(Vec::new()));
        let state = state_with(&["a"], &["a"]);
        let state = reduce(state, AppAction::SetLayer(value_layer));
        let state = reduce(state, AppAction::SetPickedLayer(Some(picked)));

        let ids: Vec<String> = map_layers(&state).into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["picked", "selected-collections", "layer"]);
    }

    #[test]
    fn no_selection_means_no_collections_layer() {
        let state = state_with(&["a"], &["gone"]);
        assert!(map_layers(&state).is_empty());
        assert!(selected_extent(&state).is_none());
    }

    #[test]
    fn selected_extent_unions_selection() {
        let mut state = state_with(&["a"], &["a", "b"]);
        state
            .collections
            .push(Collection::new("b").with_bbox([-5.0, -5.0, 0.5, 0.5]));
        assert_eq!(
            selected_extent(&state),
            Some(Bbox::new(-5.0, -5.0, 1.0, 1.0))
        );
    }

    #[test]
    fn filter_matches_title_or_id_case_insensitively() {
        let collections = vec![
            Collection::new("sentinel-2-l2a").with_title("Sentinel-2 Level-2A"),
            Collection::new("landsat-c2-l2").with_title("Landsat Collection 2"),
            Collection::new("naip"),
        ];
        let hits: Vec<&str> = filter_collections(&collections, "SENTINEL")
            .into_iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(hits, vec!["sentinel-2-l2a"]);

        let hits = filter_collections(&collections, "collection 2");
        assert_eq!(hits.len(), 1);
        assert_eq!(filter_collections(&collections, "").len(), 3);
    }

    #[test]
    fn labels_pluralize() {
        assert_eq!(selection_label(0), "Select one or more collections");
        assert_eq!(selection_label(1), "1 collection selected");
        assert_eq!(selection_label(3), "3 collections selected");
    }
}
