pub mod columnar;
pub mod extent;
pub mod link;
pub mod value;

pub use columnar::*;
pub use extent::*;
pub use link::*;
pub use value::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    NotFound,
    Decode(String),
    Storage(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::NotFound => write!(f, "catalog entry not found"),
            CatalogError::Decode(msg) => write!(f, "invalid STAC JSON: {msg}"),
            CatalogError::Storage(msg) => write!(f, "columnar storage error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}
