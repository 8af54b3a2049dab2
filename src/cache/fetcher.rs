//! Cached HTTP fetcher
//!
//! `CachedFetcher` owns the in-memory cache for the lifetime of a session. It
//! is loaded once from the `CacheStore` when the fetcher is built, consulted
//! on every request, and written back in full after every miss.

use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use super::store::{CacheMap, CacheStore};

/// Pause before every request that misses the cache
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);

/// Errors that can occur when fetching a URL
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Cache file could not be written
    #[error("Failed to write cache: {0}")]
    Cache(#[from] std::io::Error),
}

impl FetchError {
    /// Replaces the requested URL with the cache key in the error
    ///
    /// The URL may carry a credential; the key never does.
    fn naming_key(self, key: &str) -> Self {
        match self {
            FetchError::Request(e) => FetchError::Request(e.without_url()),
            FetchError::Status { status, .. } => FetchError::Status {
                url: key.to_string(),
                status,
            },
            other => other,
        }
    }
}

/// Performs a plain GET and returns the body text
///
/// This is the seam between the cache and the network.
pub trait Transport {
    /// Fetches `url` and returns the response body
    fn get_text(&self, url: &str) -> impl Future<Output = Result<String, FetchError>>;
}

/// Transport backed by a reqwest client with default settings
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new HttpTransport with a default client
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new HttpTransport with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Fetches URLs through the persisted response cache
#[derive(Debug)]
pub struct CachedFetcher<T = HttpTransport> {
    transport: T,
    store: CacheStore,
    cache: CacheMap,
    delay: Duration,
}

impl<T: Transport> CachedFetcher<T> {
    /// Creates a fetcher and loads the current cache contents from `store`
    pub fn new(transport: T, store: CacheStore) -> Self {
        let cache = store.load();
        info!(path = %store.path().display(), entries = cache.len(), "loaded response cache");
        Self {
            transport,
            store,
            cache,
            delay: DEFAULT_REQUEST_DELAY,
        }
    }

    /// Sets the pause taken before each cache miss
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the body for `url`, from the cache if present
    pub async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        self.fetch_keyed(url, url).await
    }

    /// Returns the body stored under `key`, or requests `url` and stores it
    ///
    /// The key and the URL differ only when the URL carries a secret that
    /// must not be persisted.
    ///
    /// # Arguments
    /// * `key` - Cache key the response is stored under
    /// * `url` - URL requested on a cache miss
    ///
    /// # Returns
    /// * `Ok(String)` - The raw response body
    /// * `Err(FetchError)` - If the request fails or the cache cannot be saved;
    ///   errors name `key`, never `url`
    pub async fn fetch_keyed(&mut self, key: &str, url: &str) -> Result<String, FetchError> {
        if let Some(body) = self.cache.get(key) {
            info!(key, "using cache");
            return Ok(body.clone());
        }

        info!(key, "fetching");
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let body = self
            .transport
            .get_text(url)
            .await
            .map_err(|e| e.naming_key(key))?;

        self.cache.insert(key.to_string(), body.clone());
        if let Err(e) = self.store.save(&self.cache) {
            // Memory must not hold what the file does not
            self.cache.remove(key);
            return Err(e.into());
        }

        Ok(body)
    }

    /// Whether a response is already stored under `key`
    pub fn is_cached(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

/// In-memory transport serving fixed pages and recording every request
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    pages: std::collections::HashMap<String, String>,
    requests: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

#[cfg(test)]
impl Transport for ScriptedTransport {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}
