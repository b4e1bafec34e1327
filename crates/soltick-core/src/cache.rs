//! In-memory TTL cache for expensive provider lookups.
//!
//! Entries expire lazily: an expired entry is indistinguishable from a missing
//! one and is only physically removed by [`CacheStore::clear_expired`] or by
//! being overwritten. Time is read from `tokio::time::Instant`, so a paused
//! test runtime can advance it deterministically.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::debug;

/// Default entry lifetime (five minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<String, CacheEntry>,
    default_ttl: Duration,
}

impl CacheInner {
    fn new(default_ttl: Duration) -> Self {
        Self {
            map: HashMap::new(),
            default_ttl,
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).and_then(|entry| {
            if Instant::now() < entry.expires_at {
                Some(entry.body.clone())
            } else {
                None
            }
        })
    }

    fn put(&mut self, key: String, body: String, ttl_override: Option<Duration>) {
        let ttl = ttl_override.unwrap_or(self.default_ttl);
        let expires_at = Instant::now() + ttl;
        self.map.insert(key, CacheEntry { body, expires_at });
    }

    fn clear_expired(&mut self) {
        let now = Instant::now();
        self.map.retain(|_, entry| entry.expires_at > now);
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

/// Thread-safe in-memory cache shared by every adapter of a resolver.
#[derive(Debug, Clone)]
pub struct CacheStore {
    inner: Arc<RwLock<CacheInner>>,
    fill_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl CacheStore {
    /// Create a new cache store with a default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CacheInner::new(default_ttl))),
            fill_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create a cache store with a default TTL of 5 minutes.
    pub fn with_default_ttl() -> Self {
        Self::new(DEFAULT_TTL)
    }

    /// Create a disabled cache; every `put` is dropped.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Get a cached value if it exists and hasn't expired.
    pub async fn get(&self, key: &str) -> Option<String> {
        let store = self.inner.read().await;
        store.get(key)
    }

    /// Put a value into the cache, overwriting any previous entry.
    ///
    /// `ttl_override` replaces the default TTL for this entry. No-op when the
    /// cache is disabled.
    pub async fn put(&self, key: String, body: String, ttl_override: Option<Duration>) {
        let mut store = self.inner.write().await;

        if store.default_ttl == Duration::ZERO {
            return;
        }

        store.put(key, body, ttl_override);
    }

    /// Return the cached value for `key`, or run `fetch` and cache its success.
    ///
    /// Population of one key is serialized: concurrent callers for the same
    /// key wait for the first fetch and then read its result instead of
    /// fetching again. Reads and fills of other keys are not blocked. Failed
    /// fetches are never cached.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: &str, fetch: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        if let Some(hit) = self.get(key).await {
            debug!(key, "cache hit");
            return Ok(hit);
        }

        let key_lock = {
            let mut locks = self.fill_locks.lock().await;
            locks
                .entry(key.to_owned())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _guard = key_lock.lock().await;

        // Another caller may have filled the key while we waited.
        if let Some(hit) = self.get(key).await {
            debug!(key, "cache filled by concurrent caller");
            return Ok(hit);
        }

        debug!(key, "cache miss");
        let body = fetch().await?;
        self.put(key.to_owned(), body.clone(), None).await;
        Ok(body)
    }

    /// Remove expired entries from the cache.
    pub async fn clear_expired(&self) {
        let mut store = self.inner.write().await;
        store.clear_expired();
    }

    /// Number of stored entries, including expired ones not yet cleared.
    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Check if the cache is disabled (TTL is ZERO).
    pub async fn is_disabled(&self) -> bool {
        let store = self.inner.read().await;
        store.default_ttl == Duration::ZERO
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::with_default_ttl()
    }
}
