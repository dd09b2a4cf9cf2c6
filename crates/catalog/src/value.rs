use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::CatalogError;
use crate::extent::Bbox;
use crate::link::{Link, find_link, links_with_rel};

/// File extension that marks a stac-geoparquet (columnar) reference.
pub const COLUMNAR_EXTENSION: &str = ".parquet";

pub const GEOPARQUET_DESCRIPTION: &str = "A stac-geoparquet file";

/// The four value shapes a viewer knows how to present.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Catalog,
    Collection,
    Item,
    ItemCollection,
}

impl ValueKind {
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        match tag {
            "Catalog" => Some(ValueKind::Catalog),
            "Collection" => Some(ValueKind::Collection),
            "Feature" => Some(ValueKind::Item),
            "FeatureCollection" => Some(ValueKind::ItemCollection),
            _ => None,
        }
    }

    pub fn type_tag(self) -> &'static str {
        match self {
            ValueKind::Catalog => "Catalog",
            ValueKind::Collection => "Collection",
            ValueKind::Item => "Feature",
            ValueKind::ItemCollection => "FeatureCollection",
        }
    }
}

/// A value whose `type` field is none of the recognized tags.
///
/// Loading such a value succeeds; only presentation rejects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedType {
    pub type_tag: String,
}

impl std::fmt::Display for UnrecognizedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid type field: {}", self.type_tag)
    }
}

impl std::error::Error for UnrecognizedType {}

/// A loaded STAC document.
///
/// Only the fields the viewer reasons about are typed; everything else is kept
/// verbatim in `fields` so a value survives a load/serialize cycle untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StacValue {
    /// Raw `type` field. A non-string tag is kept as its JSON text.
    #[serde(rename = "type", default, deserialize_with = "tag_from_any")]
    pub type_tag: String,
    #[serde(
        default,
        deserialize_with = "id_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

fn tag_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(tag) => tag,
        other => other.to_string(),
    })
}

fn id_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(id) => Some(id),
        other => Some(other.to_string()),
    })
}

impl StacValue {
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, CatalogError> {
        serde_json::from_slice(bytes).map_err(|e| CatalogError::Decode(e.to_string()))
    }

    /// Placeholder ItemCollection standing in for a columnar file.
    ///
    /// The file's rows are never decoded here; the title is the final path
    /// segment of `href`.
    pub fn geoparquet_placeholder(href: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("features".to_string(), Value::Array(Vec::new()));
        Self {
            type_tag: ValueKind::ItemCollection.type_tag().to_string(),
            id: None,
            title: Some(last_path_segment(href).to_string()),
            description: Some(GEOPARQUET_DESCRIPTION.to_string()),
            links: Vec::new(),
            fields,
        }
    }

    pub fn kind(&self) -> Result<ValueKind, UnrecognizedType> {
        ValueKind::from_type_tag(&self.type_tag).ok_or_else(|| UnrecognizedType {
            type_tag: self.type_tag.clone(),
        })
    }

    pub fn has_id(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    pub fn link(&self, rel: &str) -> Option<&Link> {
        find_link(&self.links, rel)
    }

    pub fn links_with_rel<'a>(&'a self, rel: &'a str) -> impl Iterator<Item = &'a Link> + 'a {
        links_with_rel(&self.links, rel)
    }

    /// GeoJSON features of an Item Collection. Empty for other kinds.
    pub fn features(&self) -> &[Value] {
        self.fields
            .get("features")
            .and_then(|f| f.as_array())
            .map(|f| f.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_geometry(&self) -> bool {
        self.fields.get("geometry").is_some_and(|g| !g.is_null())
    }

    /// Top-level `bbox` of an Item, if present and well-formed.
    pub fn bbox(&self) -> Option<Bbox> {
        let values: Vec<f64> = self
            .fields
            .get("bbox")?
            .as_array()?
            .iter()
            .map(|v| v.as_f64())
            .collect::<Option<_>>()?;
        Bbox::from_slice(&values)
    }

    /// Reinterpret a `Collection` value as a typed [`Collection`].
    pub fn to_collection(&self) -> Result<Collection, CatalogError> {
        let raw = serde_json::to_value(self).map_err(|e| CatalogError::Decode(e.to_string()))?;
        serde_json::from_value(raw).map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

pub fn is_columnar_href(href: &str) -> bool {
    href.ends_with(COLUMNAR_EXTENSION)
}

fn last_path_segment(href: &str) -> &str {
    href.rsplit('/').next().unwrap_or(href)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<Extent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Collection {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            extent: None,
            links: Vec::new(),
            fields: Map::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_bbox(mut self, bbox: [f64; 4]) -> Self {
        self.extent = Some(Extent {
            spatial: Some(SpatialExtent {
                bbox: vec![bbox.to_vec()],
            }),
            fields: Map::new(),
        });
        self
    }

    /// Title when present, otherwise the id.
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    /// Overall spatial extent: the first bbox of `extent.spatial.bbox`.
    pub fn bbox(&self) -> Option<Bbox> {
        let first = self.extent.as_ref()?.spatial.as_ref()?.bbox.first()?;
        Bbox::from_slice(first)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spatial: Option<SpatialExtent>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialExtent {
    #[serde(default)]
    pub bbox: Vec<Vec<f64>>,
}

/// One page of a paginated collection listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionsPage {
    pub collections: Vec<Collection>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl CollectionsPage {
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, CatalogError> {
        serde_json::from_slice(bytes).map_err(|e| CatalogError::Decode(e.to_string()))
    }

    pub fn next_link(&self) -> Option<&Link> {
        find_link(&self.links, crate::link::rel::NEXT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn recognized_tags_load_with_their_kind() {
        for (tag, kind) in [
            ("Catalog", ValueKind::Catalog),
            ("Collection", ValueKind::Collection),
            ("Feature", ValueKind::Item),
            ("FeatureCollection", ValueKind::ItemCollection),
        ] {
            let raw = format!(r#"{{"type":"{tag}","id":"x","links":[]}}"#);
            let value = StacValue::from_json_bytes(raw.as_bytes()).unwrap();
            assert_eq!(value.type_tag, tag);
            assert_eq!(value.kind(), Ok(kind));
        }
    }

    #[test]
    fn unrecognized_tag_still_decodes() {
        let value = StacValue::from_json_bytes(br#"{"type":"Banana","id":"b"}"#).unwrap();
        let err = value.kind().unwrap_err();
        assert_eq!(err.type_tag, "Banana");
        assert_eq!(err.to_string(), "invalid type field: Banana");

        let untyped = StacValue::from_json_bytes(br#"{"id":"b"}"#).unwrap();
        assert!(untyped.kind().is_err());
    }

    #[test]
    fn non_string_type_decodes_and_is_unrecognized() {
        let value = StacValue::from_json_bytes(br#"{"type":42,"id":"x"}"#).unwrap();
        assert_eq!(value.type_tag, "42");
        assert_eq!(value.kind().unwrap_err().to_string(), "invalid type field: 42");

        let value = StacValue::from_json_bytes(br#"{"type":null}"#).unwrap();
        assert_eq!(value.kind().unwrap_err().type_tag, "null");
    }

    #[test]
    fn non_string_id_is_kept_as_text() {
        let value = StacValue::from_json_bytes(br#"{"type":"Feature","id":7}"#).unwrap();
        assert_eq!(value.id.as_deref(), Some("7"));
        assert!(value.has_id());

        let value = StacValue::from_json_bytes(br#"{"type":"Feature","id":null}"#).unwrap();
        assert_eq!(value.id, None);
    }

    #[test]
    fn item_bbox_and_geometry() {
        let value = StacValue::from_json_bytes(
            br#"{"type":"Feature","geometry":null,"bbox":[-1,-2,3,4]}"#,
        )
        .unwrap();
        assert!(!value.has_geometry());
        assert_eq!(value.bbox(), Some(Bbox::new(-1.0, -2.0, 3.0, 4.0)));

        let value = StacValue::from_json_bytes(
            br#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"bbox":"bad"}"#,
        )
        .unwrap();
        assert!(value.has_geometry());
        assert_eq!(value.bbox(), None);
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = StacValue::from_json_bytes(b"{not json").unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
    }

    #[test]
    fn unknown_fields_are_preserved() {
        let raw = br#"{"type":"Catalog","id":"c","stac_version":"1.0.0","links":[{"rel":"data","href":"collections"}]}"#;
        let value = StacValue::from_json_bytes(raw).unwrap();
        assert_eq!(value.fields.get("stac_version"), Some(&Value::from("1.0.0")));
        assert_eq!(value.link("data").map(|l| l.href.as_str()), Some("collections"));

        let back: Value = serde_json::to_value(&value).unwrap();
        assert_eq!(back["stac_version"], "1.0.0");
        assert_eq!(back["type"], "Catalog");
    }

    #[test]
    fn geoparquet_placeholder_uses_last_segment() {
        let value = StacValue::geoparquet_placeholder("https://example.com/data/items.parquet");
        assert_eq!(value.kind(), Ok(ValueKind::ItemCollection));
        assert_eq!(value.title.as_deref(), Some("items.parquet"));
        assert_eq!(value.description.as_deref(), Some(GEOPARQUET_DESCRIPTION));
        assert!(value.features().is_empty());
        assert!(value.id.is_none());

        let local = StacValue::geoparquet_placeholder("items.parquet");
        assert_eq!(local.title.as_deref(), Some("items.parquet"));
    }

    #[test]
    fn columnar_detection_is_by_suffix() {
        assert!(is_columnar_href("https://example.com/a.parquet"));
        assert!(!is_columnar_href("https://example.com/a.parquet.json"));
    }

    #[test]
    fn empty_id_does_not_count() {
        let mut value = StacValue::from_json_bytes(br#"{"type":"Catalog","id":""}"#).unwrap();
        assert!(!value.has_id());
        value.id = Some("x".to_string());
        assert!(value.has_id());
    }

    #[test]
    fn collection_bbox_reads_first_box() {
        let raw = br#"{"id":"c","extent":{"spatial":{"bbox":[[-10,-5,10,5],[0,0,1,1]]},"temporal":{"interval":[[null,null]]}}}"#;
        let collection: Collection = serde_json::from_slice(raw).unwrap();
        let bbox = collection.bbox().expect("bbox");
        assert_eq!(bbox, Bbox::new(-10.0, -5.0, 10.0, 5.0));
        assert_eq!(collection.display_name(), "c");
        assert!(collection.extent.unwrap().fields.contains_key("temporal"));
    }

    #[test]
    fn page_without_links_has_no_next() {
        let page = CollectionsPage::from_json_bytes(br#"{"collections":[{"id":"a"}]}"#).unwrap();
        assert_eq!(page.collections.len(), 1);
        assert!(page.next_link().is_none());

        assert!(CollectionsPage::from_json_bytes(br#"{"links":[]}"#).is_err());
    }

    #[test]
    fn collection_value_converts_to_typed_collection() {
        let raw = br#"{"type":"Collection","id":"landsat","title":"Landsat","extent":{"spatial":{"bbox":[[0,0,1,1]]}}}"#;
        let value = StacValue::from_json_bytes(raw).unwrap();
        let collection = value.to_collection().unwrap();
        assert_eq!(collection.id, "landsat");
        assert_eq!(collection.display_name(), "Landsat");
        assert!(collection.bbox().is_some());
    }
}
