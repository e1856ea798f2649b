//! Per-resource query cache using moka.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use moka::future::Cache;
use tracing::debug;

use hrms_core::config::CachePolicy;
use hrms_core::error::AppError;
use hrms_core::result::AppResult;

use crate::keys::generation_key;

/// A cached query result.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The fetched data.
    pub value: V,
    /// When the data was fetched.
    pub fetched_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
        }
    }

    /// Returns `true` once the entry is older than `stale_after`.
    pub fn is_stale(&self, stale_after: Duration) -> bool {
        self.fetched_at.elapsed() >= stale_after
    }
}

/// Non-blocking view of a query for the presentation layer.
#[derive(Debug, Clone)]
pub struct QueryState<V> {
    /// Last fetched data, fresh or stale.
    pub data: Option<V>,
    /// A fetch for this key is in flight.
    pub is_loading: bool,
    /// The data is past its staleness window.
    pub is_stale: bool,
    /// Error of the last failed fetch, cleared by the next success.
    pub error: Option<AppError>,
}

/// Marks a key as loading for as long as it is alive.
///
/// Counted per key so overlapping fetches keep the flag until the last one
/// finishes or is dropped.
struct LoadingGuard {
    in_flight: Arc<DashMap<String, usize>>,
    key: String,
}

impl LoadingGuard {
    fn new(in_flight: &Arc<DashMap<String, usize>>, key: &str) -> Self {
        *in_flight.entry(key.to_string()).or_insert(0) += 1;
        Self {
            in_flight: Arc::clone(in_flight),
            key: key.to_string(),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.in_flight.remove_if_mut(&self.key, |_, count| {
            *count -= 1;
            *count == 0
        });
    }
}

/// Query cache for one resource.
///
/// Invalidation bumps a generation counter that is part of every stored
/// key, so a fetch that started before a mutation can never repopulate
/// the cache with pre-mutation data.
#[derive(Clone)]
pub struct ResourceCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    resource: Arc<str>,
    policy: CachePolicy,
    entries: Cache<String, CacheEntry<V>>,
    generation: Arc<AtomicU64>,
    in_flight: Arc<DashMap<String, usize>>,
    errors: Arc<DashMap<String, AppError>>,
}

impl<V> std::fmt::Debug for ResourceCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("resource", &self.resource)
            .field("policy", &self.policy)
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish()
    }
}

impl<V> ResourceCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache for `resource` using the given windows.
    pub fn new(resource: &str, policy: CachePolicy) -> Self {
        let entries = Cache::builder()
            .max_capacity(policy.max_capacity)
            .time_to_idle(policy.expire_after())
            .build();

        Self {
            resource: Arc::from(resource),
            policy,
            entries,
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Arc::new(DashMap::new()),
            errors: Arc::new(DashMap::new()),
        }
    }

    /// The resource this cache belongs to.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The staleness/eviction policy.
    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    fn stored_key(&self, key: &str) -> String {
        generation_key(self.generation.load(Ordering::SeqCst), key)
    }

    /// Return the cached entry for `key`, stale or not.
    pub async fn peek(&self, key: &str) -> Option<CacheEntry<V>> {
        self.entries.get(&self.stored_key(key)).await
    }

    /// Return cached data for `key` only if it is still fresh.
    pub async fn get_fresh(&self, key: &str) -> Option<V> {
        self.peek(key)
            .await
            .filter(|entry| !entry.is_stale(self.policy.stale_after()))
            .map(|entry| entry.value)
    }

    /// Return fresh cached data, or run `fetch` and cache its result.
    ///
    /// Concurrent callers for the same key share one fetch. A failed fetch
    /// leaves any previous entry untouched.
    pub async fn get_or_fetch<F>(&self, key: &str, fetch: F) -> AppResult<V>
    where
        F: Future<Output = AppResult<V>> + Send,
    {
        let stored = self.stored_key(key);

        if let Some(entry) = self.entries.get(&stored).await {
            if !entry.is_stale(self.policy.stale_after()) {
                debug!(resource = %self.resource, key, "Cache hit");
                return Ok(entry.value);
            }
            debug!(resource = %self.resource, key, "Cache entry stale, refetching");
        } else {
            debug!(resource = %self.resource, key, "Cache miss");
        }

        let loading = LoadingGuard::new(&self.in_flight, key);
        let result = self.refetch(&stored, fetch).await;
        drop(loading);

        match result {
            Ok(value) => {
                self.errors.remove(key);
                Ok(value)
            }
            Err(e) => {
                self.errors.insert(key.to_string(), e.clone());
                Err(e)
            }
        }
    }

    async fn refetch<F>(&self, stored: &str, fetch: F) -> AppResult<V>
    where
        F: Future<Output = AppResult<V>> + Send,
    {
        let previous = self.entries.get(stored).await;
        if previous.is_some() {
            self.entries.invalidate(stored).await;
        }

        let loaded = self
            .entries
            .try_get_with(stored.to_string(), async move {
                fetch.await.map(CacheEntry::new)
            })
            .await;

        match loaded {
            Ok(entry) => Ok(entry.value),
            Err(e) => {
                // Put the old data back so readers keep seeing it.
                if let Some(previous) = previous {
                    self.entries.insert(stored.to_string(), previous).await;
                }
                Err((*e).clone())
            }
        }
    }

    /// Non-blocking view of `key`.
    pub async fn snapshot(&self, key: &str) -> QueryState<V> {
        let entry = self.peek(key).await;
        QueryState {
            is_stale: entry
                .as_ref()
                .map(|e| e.is_stale(self.policy.stale_after()))
                .unwrap_or(false),
            data: entry.map(|e| e.value),
            is_loading: self.in_flight.contains_key(key),
            error: self.errors.get(key).map(|e| e.value().clone()),
        }
    }

    /// Force every cached query of this resource to refetch on next read.
    pub fn invalidate_all(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.entries.invalidate_all();
        self.errors.clear();
        debug!(resource = %self.resource, generation, "Cache invalidated");
    }

    /// Drop fresh status of `key` if window-focus refetching is enabled.
    ///
    /// Returns `true` if the next read will refetch.
    pub async fn on_focus(&self, key: &str) -> bool {
        if !self.policy.refetch_on_focus {
            return false;
        }
        match self.peek(key).await {
            Some(entry) if entry.is_stale(self.policy.stale_after()) => {
                self.entries.invalidate(&self.stored_key(key)).await;
                true
            }
            _ => false,
        }
    }

    /// Number of live entries, after running moka's pending maintenance.
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}
