//! Fetching JSON data files, over HTTP or from a local site directory.

use crate::error::{Error, Result};
use async_trait::async_trait;
use diagnostics::*;
use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

const TIMEOUT_SECONDS: u64 = 60;

/// Where data files come from. Paths are site-root-relative, as produced
/// by [`crate::paths::PathResolver::resolve`].
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Retrieve and decode one JSON document, bypassing any cache.
    async fn fetch(&self, path: &str) -> Result<Value>;

    /// Human-readable location of a path, for logs and reports.
    fn describe(&self, path: &str) -> String;
}

/// Async HTTP source rooted at a base URL.
pub struct HttpSource {
    http_client: reqwest::Client,
    base: Url,
}

impl HttpSource {
    pub fn new(base: &str) -> Result<Self> {
        let mut base = Url::parse(base)
            .map_err(|e| Error::Config(format!("invalid base URL '{}': {}", base, e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!("'{}' cannot be used as a base URL", base)));
        }
        // Without a trailing slash, join() would replace the last segment
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECONDS))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client, base })
    }

    pub fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::Config(format!("cannot join '{}' to {}: {}", path, self.base, e)))
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<Value> {
        let url = self.url(path)?;
        debug!("GET {url}", url: url.as_str());

        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| Error::Network {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::request(path, Some(status.as_u16())));
        }

        let body = response.text().await.map_err(|source| Error::Network {
            path: path.to_string(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|e| Error::malformed(path, e))
    }

    fn describe(&self, path: &str) -> String {
        self.url(path)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| path.to_string())
    }
}

/// Reads data files from a directory on disk, normally the site root.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn file(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

#[async_trait]
impl DataSource for DirSource {
    async fn fetch(&self, path: &str) -> Result<Value> {
        let file = self.file(path);
        debug!("read {file}", file: file.display().to_string());

        let body = match tokio::fs::read_to_string(&file).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::request(path, None));
            }
            Err(e) => return Err(Error::Io(e)),
        };
        serde_json::from_str(&body).map_err(|e| Error::malformed(path, e))
    }

    fn describe(&self, path: &str) -> String {
        self.file(path).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_construction() {
        let src = HttpSource::new("https://lab.example.org/site").unwrap();
        assert_eq!(
            src.url("data/news.json").unwrap().as_str(),
            "https://lab.example.org/site/data/news.json"
        );
        assert_eq!(
            src.url("/data/news.json").unwrap().as_str(),
            "https://lab.example.org/site/data/news.json"
        );

        let src = HttpSource::new("http://127.0.0.1:8080/").unwrap();
        assert_eq!(src.describe("data/tools.json"), "http://127.0.0.1:8080/data/tools.json");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(HttpSource::new("not a url"), Err(Error::Config(_))));
        assert!(matches!(HttpSource::new("mailto:x@y.z"), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_dir_source_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data/tools.json"), "[{\"label\": \"A\"}]").unwrap();
        std::fs::write(dir.path().join("data/news.json"), "{not json").unwrap();

        let src = DirSource::new(dir.path());
        let tools = src.fetch("data/tools.json").await.unwrap();
        assert_eq!(tools[0]["label"], "A");

        let err = src.fetch("data/positions.json").await.unwrap_err();
        assert!(matches!(err, Error::Request { status: None, .. }));

        let err = src.fetch("data/news.json").await.unwrap_err();
        assert!(matches!(err, Error::MalformedData { .. }));
    }
}
