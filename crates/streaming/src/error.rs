use catalog::CatalogError;

/// Failures of the fetching layer.
///
/// Every variant renders to a single human-readable line; the viewer surfaces
/// that line as-is rather than propagating the error further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamingError {
    InvalidLocator { href: String, message: String },
    Retrieval { url: String, message: String },
    Decode { url: String, message: String },
    ConfigurationMissing(&'static str),
    LocalSourceUnavailable { locator: String },
    PaginationCycle { url: String },
    PageLimit { limit: usize },
    Storage(String),
}

impl StreamingError {
    pub fn retrieval(url: impl Into<String>, message: impl ToString) -> Self {
        StreamingError::Retrieval {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn decode(url: impl Into<String>, err: CatalogError) -> Self {
        let message = match err {
            CatalogError::Decode(msg) => msg,
            other => other.to_string(),
        };
        StreamingError::Decode {
            url: url.into(),
            message,
        }
    }
}

impl std::fmt::Display for StreamingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamingError::InvalidLocator { href, message } => {
                write!(f, "cannot resolve {href}: {message}")
            }
            StreamingError::Retrieval { url, message } => {
                write!(f, "request to {url} failed: {message}")
            }
            StreamingError::Decode { url, message } => {
                write!(f, "invalid JSON from {url}: {message}")
            }
            StreamingError::ConfigurationMissing(key) => {
                write!(f, "{key} is not configured")
            }
            StreamingError::LocalSourceUnavailable { locator } => {
                write!(f, "no local file provided for {locator}")
            }
            StreamingError::PaginationCycle { url } => {
                write!(f, "pagination revisited {url}")
            }
            StreamingError::PageLimit { limit } => {
                write!(f, "pagination stopped after {limit} pages")
            }
            StreamingError::Storage(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for StreamingError {}

impl From<CatalogError> for StreamingError {
    fn from(err: CatalogError) -> Self {
        StreamingError::Storage(err.to_string())
    }
}
