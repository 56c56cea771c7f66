//! Remote data acquisition.
//!
//! Fetchers only move bytes; decoding and state changes belong to the
//! controller. A non-success status and a transport failure are reported
//! the same way, as an [`AcquisitionError`].

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ureq::Agent;

/// Errors that can occur while acquiring item data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquisitionError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid payload: {0}")]
    Payload(String),
}

/// Source of raw JSON bodies for a locator.
pub trait Fetcher: Send + Sync {
    /// Fetch the body behind `locator`.
    fn fetch(&self, locator: &str) -> impl Future<Output = Result<String, AcquisitionError>> + Send;
}

/// Fetches over HTTP(S) with a GET request.
#[derive(Clone)]
pub struct HttpFetcher {
    agent: Agent,
}

impl HttpFetcher {
    /// Create a fetcher with an optional global timeout.
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(timeout)
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, locator: &str) -> Result<String, AcquisitionError> {
        let agent = self.agent.clone();
        let url = locator.to_string();

        tokio::task::spawn_blocking(move || get_json(&agent, &url))
            .await
            .map_err(|e| AcquisitionError::Transport {
                url: locator.to_string(),
                message: e.to_string(),
            })?
    }
}

/// Blocking GET returning the body of a 2xx response.
fn get_json(agent: &Agent, url: &str) -> Result<String, AcquisitionError> {
    let transport = |e: ureq::Error| AcquisitionError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    };

    let response = agent
        .get(url)
        .header("Accept", "application/json")
        .call()
        .map_err(transport)?;

    let status = response.status().as_u16();
    if !(200..300).contains(&status) {
        return Err(AcquisitionError::Status {
            url: url.to_string(),
            status,
        });
    }

    let mut body = response.into_body();
    body.read_to_string().map_err(transport)
}

/// Reads JSON files relative to a base directory.
///
/// Locators may carry a `file://` prefix; a leading `/` is taken relative to
/// the base directory, the way a site root would resolve it.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    base_dir: PathBuf,
}

impl FileFetcher {
    /// Create a fetcher rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Resolve a locator to a filesystem path.
    pub fn resolve(&self, locator: &str) -> PathBuf {
        let relative = locator.strip_prefix("file://").unwrap_or(locator);
        let relative = relative.split(['?', '#']).next().unwrap_or(relative);
        self.base_dir.join(Path::new(relative.trim_start_matches('/')))
    }
}

impl Fetcher for FileFetcher {
    async fn fetch(&self, locator: &str) -> Result<String, AcquisitionError> {
        let path = self.resolve(locator);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AcquisitionError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }
}

/// Dispatches `http://` and `https://` locators to HTTP, everything else to files.
#[derive(Clone)]
pub struct SourceFetcher {
    http: HttpFetcher,
    files: FileFetcher,
}

impl SourceFetcher {
    /// Create a dispatching fetcher.
    pub fn new(http: HttpFetcher, files: FileFetcher) -> Self {
        Self { http, files }
    }
}

/// Whether a locator should go over the network.
pub fn is_remote(locator: &str) -> bool {
    let lower = locator.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

impl Fetcher for SourceFetcher {
    async fn fetch(&self, locator: &str) -> Result<String, AcquisitionError> {
        if is_remote(locator) {
            self.http.fetch(locator).await
        } else {
            self.files.fetch(locator).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn resolves_file_locators() {
        let fetcher = FileFetcher::new("/site");

        assert_eq!(fetcher.resolve("data/items.json"), PathBuf::from("/site/data/items.json"));
        assert_eq!(fetcher.resolve("/items.json"), PathBuf::from("/site/items.json"));
        assert_eq!(fetcher.resolve("file://items.json?v=2"), PathBuf::from("/site/items.json"));
    }

    #[test]
    fn classifies_remote_locators() {
        assert!(is_remote("https://api.example.com/items"));
        assert!(is_remote("HTTP://example.com"));
        assert!(!is_remote("/items.json"));
        assert!(!is_remote("file://items.json"));
    }

    #[tokio::test]
    async fn reads_local_files() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("items.json"), r#"[{"id":1}]"#).unwrap();

        let fetcher = FileFetcher::new(temp.path());
        let body = fetcher.fetch("items.json").await.unwrap();

        assert_eq!(body, r#"[{"id":1}]"#);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let temp = tempdir().unwrap();

        let fetcher = FileFetcher::new(temp.path());
        let result = fetcher.fetch("missing.json").await;

        assert!(matches!(result, Err(AcquisitionError::Io { .. })));
    }
}
