//! Error types for content binding.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Non-success HTTP status, or a data file that does not exist.
    #[error("request for {path} failed{}", status.map(|s| format!(" with status {s}")).unwrap_or_default())]
    Request { path: String, status: Option<u16> },

    /// Transport failure before any status was received.
    #[error("request for {path} failed: {source}")]
    Network {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// Body was not JSON, or JSON of the wrong shape.
    #[error("malformed data in {path}: {reason}")]
    MalformedData { path: String, reason: String },

    /// The renderer's target is absent from the page.
    #[error("container not found: {0}")]
    MissingContainer(String),

    /// The target exists but cannot hold content (`<img>`, `<br/>`, ...).
    #[error("element cannot hold content: {0}")]
    NotAContainer(String),

    #[error("invalid selector: {0}")]
    Selector(String),

    #[error("HTML parse error: {0}")]
    Html(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn request<S: Into<String>>(path: S, status: Option<u16>) -> Self {
        Error::Request {
            path: path.into(),
            status,
        }
    }

    pub fn malformed<S: Into<String>, R: ToString>(path: S, reason: R) -> Self {
        Error::MalformedData {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Fetch-path failures are isolated per section; everything else is a
    /// problem with the page or the configuration.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Error::Request { .. } | Error::Network { .. } | Error::MalformedData { .. }
        )
    }
}
