use serde::{Deserialize, Serialize};

/// Well-known link relations used for hypermedia navigation.
pub mod rel {
    pub const DATA: &str = "data";
    pub const NEXT: &str = "next";
    pub const SEARCH: &str = "search";
    pub const SELF: &str = "self";
}

/// A relation-typed reference to another resource.
///
/// `href` may be absolute or relative; resolution against a base is left to
/// the caller since only the fetching layer knows where a document came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            media_type: None,
            title: None,
            method: None,
            body: None,
        }
    }

    pub fn is_rel(&self, rel: &str) -> bool {
        self.rel == rel
    }
}

/// First link with the given relation, in document order.
pub fn find_link<'a>(links: &'a [Link], rel: &str) -> Option<&'a Link> {
    links.iter().find(|link| link.is_rel(rel))
}

pub fn links_with_rel<'a>(links: &'a [Link], rel: &'a str) -> impl Iterator<Item = &'a Link> + 'a {
    links.iter().filter(move |link| link.is_rel(rel))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> Vec<Link> {
        vec![
            Link::new(rel::SELF, "https://example.com/catalog.json"),
            Link::new(rel::SEARCH, "https://example.com/search"),
            Link::new(rel::SEARCH, "https://example.com/search?alt=1"),
        ]
    }

    #[test]
    fn find_returns_first_match() {
        let links = links();
        let found = find_link(&links, rel::SEARCH).expect("search link");
        assert_eq!(found.href, "https://example.com/search");
        assert!(find_link(&links, rel::NEXT).is_none());
    }

    #[test]
    fn filter_keeps_every_shared_relation() {
        let links = links();
        assert_eq!(links_with_rel(&links, rel::SEARCH).count(), 2);
    }

    #[test]
    fn optional_fields_are_tolerated() {
        let link: Link = serde_json::from_str(
            r#"{"rel":"next","href":"?page=2","type":"application/json","method":"GET"}"#,
        )
        .unwrap();
        assert_eq!(link.media_type.as_deref(), Some("application/json"));
        assert!(link.body.is_none());

        let json = serde_json::to_string(&Link::new("data", "collections")).unwrap();
        assert_eq!(json, r#"{"rel":"data","href":"collections"}"#);
    }
}
