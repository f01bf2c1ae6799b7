use image::DynamicImage;
use std::future::Future;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Image decode error: {0}")]
    Decode(String),
}

/// Async HTTP GET abstraction so tests can inject canned responses instead of
/// hitting the icon host or the tile server.
pub trait AsyncHttpClient: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Some tile servers reject requests without a User-Agent.
const USER_AGENT: &str = "tagofy/0.1 (+https://github.com/tagofy/tagofy)";

/// Real HTTP client backed by reqwest with a fetch timeout; timeouts surface
/// as `FetchError::Http` like any other failure.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for HttpFetcher {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        trace!(url = url, "HTTP GET request starting");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Http(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FetchError::Http(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| FetchError::Http(format!("Failed to read response: {}", e)))
    }
}

/// Fetch and decode a remote raster. Callers absorb the error into a
/// deterministic placeholder; nothing here retries.
pub async fn fetch_image<C: AsyncHttpClient>(
    client: &C,
    url: &str,
) -> Result<DynamicImage, FetchError> {
    let bytes = client.get(url).await?;
    debug!(url = url, bytes = bytes.len(), "asset downloaded");
    image::load_from_memory(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
}

/// Client for offline runs: every fetch fails, so callers fall back to the
/// deterministic placeholder visuals without touching the network.
pub struct OfflineClient;

impl AsyncHttpClient for OfflineClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::Http(format!("offline mode, not fetching {}", url)))
    }
}

/// Canned-response client for tests. Lives outside `#[cfg(test)]` so the
/// integration tests in `tests/` can use it too.
#[derive(Clone)]
pub struct MockHttpClient {
    pub response: Result<Vec<u8>, FetchError>,
}

impl AsyncHttpClient for MockHttpClient {
    async fn get(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
        self.response.clone()
    }
}
