use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use warp::Filter;
use warp::http::{Response, StatusCode};

/// Fixture site served by the mock server and copied by the build tests.
pub fn fixture_site() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/test_data/site")
}

/// One request seen by the server.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub file: String,
    pub cache_control: Option<String>,
    pub pragma: Option<String>,
}

/// Serves `data/*.json` from the fixture site over HTTP.
pub struct MockDataServer {
    port: u16,
    files: HashMap<String, String>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    server_handle: Option<tokio::task::JoinHandle<()>>,
}

impl MockDataServer {
    /// Create a new mock server (but don't start it yet)
    pub async fn new() -> Result<Self> {
        let data_dir = fixture_site().join("data");
        let mut files = HashMap::new();

        let mut entries = tokio::fs::read_dir(&data_dir)
            .await
            .with_context(|| format!("Failed to read data directory {:?}", data_dir))?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let name = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .context("Invalid file name")?
                    .to_string();
                let body = tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {:?}", path))?;
                files.insert(name, body);
            }
        }

        Ok(MockDataServer {
            port: 0,
            files,
            seen: Arc::new(Mutex::new(Vec::new())),
            server_handle: None,
        })
    }

    /// Answer 404 for this file.
    pub fn without(mut self, file: &str) -> Self {
        self.files.remove(file);
        self
    }

    /// Serve this body for the file instead of the fixture.
    pub fn with_body(mut self, file: &str, body: &str) -> Self {
        self.files.insert(file.to_string(), body.to_string());
        self
    }

    /// Start the mock server and return the base URL
    pub async fn start(&mut self) -> Result<String> {
        let files = Arc::new(self.files.clone());
        let seen = self.seen.clone();

        let data = warp::path!("data" / String)
            .and(warp::get())
            .and(warp::header::optional::<String>("cache-control"))
            .and(warp::header::optional::<String>("pragma"))
            .map(move |file: String, cache_control: Option<String>, pragma: Option<String>| {
                if let Ok(mut seen) = seen.lock() {
                    seen.push(SeenRequest {
                        file: file.clone(),
                        cache_control,
                        pragma,
                    });
                }
                let (status, body) = match files.get(&file) {
                    Some(body) => (StatusCode::OK, body.clone()),
                    None => (StatusCode::NOT_FOUND, "not found".to_string()),
                };
                Response::builder()
                    .status(status)
                    .header("content-type", "application/json")
                    .body(body)
                    .unwrap_or_default()
            });

        // Start server on random port
        let (addr, server) = warp::serve(data).bind_ephemeral(([127, 0, 0, 1], 0));
        self.port = addr.port();

        let handle = tokio::spawn(server);
        self.server_handle = Some(handle);

        // Wait a bit for server to be ready
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        Ok(format!("http://127.0.0.1:{}/", self.port))
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Stop the mock server
    pub async fn stop(&mut self) {
        if let Some(handle) = self.server_handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for MockDataServer {
    fn drop(&mut self) {
        if let Some(handle) = &self.server_handle {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_startup() {
        let mut server = MockDataServer::new().await.unwrap();
        assert_eq!(server.files.len(), 6);
        let base_url = server.start().await.unwrap();

        assert!(base_url.starts_with("http://127.0.0.1:"));
        assert!(server.port > 0);

        server.stop().await;
    }
}
