//! WebCache: page fetches with per-URL access counting and short-lived caching
//!
//! Store layout:
//! - `count:{url}`: number of `get_page` calls for the URL, never expires
//! - `cached:{url}`: last fetched body, evicted by the store after the TTL
//!
//! A cached page is served as-is until the store drops it; reading it does
//! not extend its lifetime.

use std::time::Duration;

use echostore::{KvStore, RedisStore};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::replay;
use crate::stats::FetchStats;

/// How long a fetched page stays cached
pub const PAGE_TTL: Duration = Duration::from_secs(10);

/// Default request timeout for [`HttpFetcher`]
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Key of the access counter for `url`
pub fn count_key(url: &str) -> String {
    format!("count:{}", url)
}

/// Key of the cached body for `url`
pub fn cached_key(url: &str) -> String {
    format!("cached:{}", url)
}

/// Source of page bodies
pub trait Fetcher: Send + Sync {
    /// Fetch the body of `url` as text
    fn fetch(&self, url: &str) -> Result<String>;
}

impl<F> Fetcher for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn fetch(&self, url: &str) -> Result<String> {
        self(url)
    }
}

/// Blocking HTTP GET fetcher
///
/// Returns the body for any response status; only transport failures and
/// timeouts are errors.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a fetcher whose requests give up after `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        Ok(self.client.get(url).send()?.text()?)
    }
}

/// Page cache over a key-value store
pub struct WebCache<S: KvStore, F: Fetcher> {
    store: S,
    fetcher: F,
    ttl: Duration,
    stats: FetchStats,
}

impl<S: KvStore, F: Fetcher> WebCache<S, F> {
    /// Create a page cache. Unlike the instrumented cache this does not
    /// flush the store.
    pub fn new(store: S, fetcher: F) -> Self {
        Self {
            store,
            fetcher,
            ttl: PAGE_TTL,
            stats: FetchStats::new(),
        }
    }

    /// Override how long fetched pages stay cached
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Get the body of `url`, from the store when cached
    ///
    /// The access counter is incremented before anything else, so failed
    /// fetches are counted too.
    ///
    /// # Arguments
    /// * `url` - Page address
    ///
    /// # Returns
    /// * `Result<String>` - Page body
    pub fn get_page(&self, url: &str) -> Result<String> {
        let accesses = self.store.incr(&count_key(url))?;
        let cached = cached_key(url);

        if let Some(raw) = self.store.get(&cached)? {
            self.stats.record_hit();
            debug!(url, accesses, "page served from cache");
            return String::from_utf8(raw)
                .map_err(|e| Error::Decode(format!("cached page for '{}': {}", url, e)));
        }

        self.stats.record_miss();
        debug!(url, accesses, "page not cached, fetching");

        let body = match self.fetcher.fetch(url) {
            Ok(body) => body,
            Err(e) => {
                self.stats.record_failure();
                warn!("Fetch of {} failed: {}", url, e);
                return Err(e);
            }
        };

        self.store.set_ex(&cached, self.ttl, body.as_bytes())?;
        Ok(body)
    }

    /// Number of `get_page` calls recorded for `url`
    pub fn access_count(&self, url: &str) -> Result<u64> {
        replay::call_count(&self.store, &count_key(url))
    }

    /// Configured page TTL
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Process-local hit/miss statistics
    pub fn stats(&self) -> &FetchStats {
        &self.stats
    }

    /// Underlying store
    pub fn backend(&self) -> &S {
        &self.store
    }
}

impl WebCache<RedisStore, HttpFetcher> {
    /// Connect to a Redis server and fetch over HTTP
    pub fn connect(url: &str) -> Result<Self> {
        Ok(Self::new(RedisStore::open(url)?, HttpFetcher::new()?))
    }
}
