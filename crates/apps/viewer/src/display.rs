use catalog::{Link, StacValue, ValueKind, rel};

/// How the value panel presents a loaded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueView {
    Catalog,
    Collection,
    Item,
    ItemCollection { columnar_path: Option<String> },
    /// The value loaded but its `type` is not one the viewer understands.
    Invalid { message: String },
}

impl ValueView {
    pub fn classify(value: &StacValue, href: &str, columnar_path: Option<&str>) -> Self {
        match value.kind() {
            Ok(ValueKind::Catalog) => ValueView::Catalog,
            Ok(ValueKind::Collection) => ValueView::Collection,
            Ok(ValueKind::Item) => ValueView::Item,
            Ok(ValueKind::ItemCollection) => ValueView::ItemCollection {
                columnar_path: columnar_path.map(str::to_string),
            },
            Err(err) => ValueView::Invalid {
                message: format!("STAC value at {href} has an invalid type field: {}", err.type_tag),
            },
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            ValueView::Catalog => "Catalog",
            ValueView::Collection => "Collection",
            ValueView::Item => "Item",
            ValueView::ItemCollection { .. } => "Item collection",
            ValueView::Invalid { .. } => "Invalid STAC value",
        }
    }
}

/// Which search panels a value offers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPanels {
    /// `search` links of the value, for item search.
    pub item_search: Vec<Link>,
    /// Catalog URL handed to the natural-language collection search.
    pub natural_language_catalog: Option<String>,
}

impl SearchPanels {
    pub fn for_value(value: &StacValue) -> Self {
        let item_search = value.links_with_rel(rel::SEARCH).cloned().collect();
        let natural_language_catalog = match value.kind() {
            Ok(ValueKind::Catalog) => value.link(rel::SELF).map(|link| link.href.clone()),
            _ => None,
        };
        Self {
            item_search,
            natural_language_catalog,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item_search.is_empty() && self.natural_language_catalog.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn value(raw: &str) -> StacValue {
        StacValue::from_json_bytes(raw.as_bytes()).unwrap()
    }

    #[test]
    fn classifies_recognized_kinds() {
        assert_eq!(
            ValueView::classify(&value(r#"{"type":"Catalog"}"#), "c.json", None),
            ValueView::Catalog
        );
        assert_eq!(
            ValueView::classify(
                &StacValue::geoparquet_placeholder("a.parquet"),
                "a.parquet",
                Some("a.parquet")
            ),
            ValueView::ItemCollection {
                columnar_path: Some("a.parquet".to_string())
            }
        );
    }

    #[test]
    fn invalid_type_reports_inline() {
        let view = ValueView::classify(
            &value(r#"{"type":"Banana","id":"x"}"#),
            "https://example.com/x.json",
            None,
        );
        assert_eq!(
            view,
            ValueView::Invalid {
                message: "STAC value at https://example.com/x.json has an invalid type field: Banana"
                    .to_string()
            }
        );
        assert_eq!(view.heading(), "Invalid STAC value");
    }

    #[test]
    fn catalog_with_self_link_offers_both_searches() {
        let panels = SearchPanels::for_value(&value(
            r#"{"type":"Catalog","links":[
                {"rel":"self","href":"https://example.com/catalog.json"},
                {"rel":"search","href":"https://example.com/search","method":"GET"},
                {"rel":"search","href":"https://example.com/search","method":"POST"}
            ]}"#,
        ));
        assert_eq!(panels.item_search.len(), 2);
        assert_eq!(
            panels.natural_language_catalog.as_deref(),
            Some("https://example.com/catalog.json")
        );
    }

    #[test]
    fn collection_never_offers_natural_language_search() {
        let panels = SearchPanels::for_value(&value(
            r#"{"type":"Collection","links":[{"rel":"self","href":"https://example.com/c.json"}]}"#,
        ));
        assert!(panels.is_empty());
    }
}
