use catalog::{Bbox, Collection, StacValue, ValueKind};

pub const PICKED_LAYER_ID: &str = "picked";
pub const SELECTED_COLLECTIONS_LAYER_ID: &str = "selected-collections";
pub const VALUE_LAYER_ID: &str = "layer";

/// What a map layer draws. Rendering itself belongs to the map library.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerSource {
    /// GeoJSON features drawn as-is.
    Features(Vec<serde_json::Value>),
    /// A registered columnar file, queried by the renderer under `path`.
    Columnar { path: String },
    /// Collection extents drawn as boxes.
    Bounds { boxes: Vec<Bbox>, filled: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapLayer {
    pub id: String,
    pub source: LayerSource,
}

impl MapLayer {
    pub fn new(id: impl Into<String>, source: LayerSource) -> Self {
        Self {
            id: id.into(),
            source,
        }
    }

    /// Same layer under another id.
    pub fn with_id(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: self.source.clone(),
        }
    }

    /// Layer showing a loaded value, if the value has anything to draw.
    ///
    /// Catalogs and values with an unrecognized type draw nothing. An Item
    /// without geometry falls back to its `bbox`.
    pub fn for_value(value: &StacValue, columnar_path: Option<&str>) -> Option<Self> {
        if let Some(path) = columnar_path {
            return Some(Self::new(
                VALUE_LAYER_ID,
                LayerSource::Columnar {
                    path: path.to_string(),
                },
            ));
        }
        let source = match value.kind().ok()? {
            ValueKind::Catalog => return None,
            ValueKind::Item => match value.bbox() {
                Some(bbox) if !value.has_geometry() => LayerSource::Bounds {
                    boxes: vec![bbox],
                    filled: false,
                },
                _ => LayerSource::Features(vec![serde_json::to_value(value).ok()?]),
            },
            ValueKind::ItemCollection => LayerSource::Features(value.features().to_vec()),
            ValueKind::Collection => {
                let bbox = value.to_collection().ok()?.bbox()?;
                LayerSource::Bounds {
                    boxes: vec![bbox],
                    filled: false,
                }
            }
        };
        Some(Self::new(VALUE_LAYER_ID, source))
    }

    /// Box layer over the extents of `collections`; those without one are skipped.
    pub fn collections<'a, I>(collections: I, filled: bool) -> Self
    where
        I: IntoIterator<Item = &'a Collection>,
    {
        let boxes = collections.into_iter().filter_map(Collection::bbox).collect();
        Self::new("collections", LayerSource::Bounds { boxes, filled })
    }
}
