//! The query cache
//!
//! One [`EntryState`] per [`QueryKey`], living in a process-wide map that
//! only this layer writes. Values are type-erased (`Arc<dyn Any>`) and
//! downcast on read, so one cache serves every entity type.
//!
//! Concurrency model: entry bookkeeping happens in short synchronous
//! critical sections; fetches run as spawned tasks shared through
//! [`futures::future::Shared`], so concurrent readers of one key await one
//! transport call and a reader dropping out never cancels the flight.

use crate::config::{CacheConfig, MutationOptions, RetryPolicy};
use crate::status::QueryStatus;
use dashmap::DashMap;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};
use vantage_client::ClientError;
use vantage_key::QueryKey;

type ErasedValue = Arc<dyn Any + Send + Sync>;
type FetchResult = Result<ErasedValue, ClientError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;
type ErasedFetcher = Arc<dyn Fn() -> BoxFuture<'static, FetchResult> + Send + Sync>;
type Entries = Arc<DashMap<QueryKey, EntryState>>;

/// Per-read overrides
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Staleness threshold for this read; `None` uses the cache default
    pub stale_after: Option<Duration>,
}

/// What a read hands back to the caller
#[derive(Debug)]
pub struct ReadResult<T> {
    /// Last-known value, if any
    pub data: Option<Arc<T>>,
    /// Entry status at return time
    pub status: QueryStatus,
    /// Last fetch error, if the read surfaced one
    pub error: Option<ClientError>,
    /// Whether `data` is served stale while a revalidation runs
    pub is_stale: bool,
}

impl<T> Clone for ReadResult<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            status: self.status,
            error: self.error.clone(),
            is_stale: self.is_stale,
        }
    }
}

impl<T> ReadResult<T> {
    /// Whether a fetch is in flight
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    /// Whether the read surfaced an error
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    /// Whether the read delivered a value
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }
}

/// RAII subscription marker; dropping it releases the entry for GC
pub struct Subscription {
    entries: Entries,
    key: QueryKey,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(mut entry) = self.entries.get_mut(&self.key) {
            entry.subscribers = entry.subscribers.saturating_sub(1);
            if entry.subscribers == 0 {
                entry.idle_since = Instant::now();
            }
        }
    }
}

struct EntryState {
    value: Option<ErasedValue>,
    status: QueryStatus,
    error: Option<ClientError>,
    fetched_at: Option<Instant>,
    stale: bool,
    /// Bumped on every invalidation; a fetch that started under an older
    /// generation may not mark the entry fresh
    generation: u64,
    subscribers: usize,
    idle_since: Instant,
    inflight: Option<SharedFetch>,
    fetcher: Option<ErasedFetcher>,
}

impl EntryState {
    fn new(now: Instant) -> Self {
        Self {
            value: None,
            status: QueryStatus::Idle,
            error: None,
            fetched_at: None,
            stale: false,
            generation: 0,
            subscribers: 0,
            idle_since: now,
            inflight: None,
            fetcher: None,
        }
    }

    fn transition(&mut self, to: QueryStatus) {
        debug_assert!(
            crate::status::validate_transition(self.status, to).is_ok(),
            "illegal status transition {:?} -> {:?}",
            self.status,
            to
        );
        self.status = to;
    }

    fn is_fresh(&self, now: Instant, stale_after: Duration) -> bool {
        !self.stale && self.fetched_at.is_some_and(|at| now.duration_since(at) < stale_after)
    }
}

/// Process-wide cache of server reads, keyed by [`QueryKey`]
pub struct QueryCache {
    entries: Entries,
    config: CacheConfig,
}

impl QueryCache {
    /// Create a cache with the given configuration
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self { entries: Arc::new(DashMap::new()), config }
    }

    /// Create a cache with default configuration
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Read through the cache
    ///
    /// - fresh entry: immediate hit, no transport
    /// - stale entry: immediate hit plus background revalidation
    /// - in-flight entry: awaits the existing flight (one transport call
    ///   per key, however many concurrent callers)
    /// - idle/failed entry: starts a fetch (with retry) and awaits it
    ///
    /// `fetcher` is stored so later invalidations can refetch without a
    /// caller present; it must be safe to call repeatedly.
    pub async fn read<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> ReadResult<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        self.read_with(key, fetcher, ReadOptions::default()).await
    }

    /// [`QueryCache::read`] with per-read overrides
    pub async fn read_with<T, F, Fut>(
        &self,
        key: &QueryKey,
        fetcher: F,
        options: ReadOptions,
    ) -> ReadResult<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        let erased = erase_fetcher(fetcher);
        let stale_after = options.stale_after.unwrap_or(self.config.stale_after);
        let now = Instant::now();

        // all bookkeeping under the entry lock; awaiting happens after
        let outcome = {
            let mut entry =
                self.entries.entry(key.clone()).or_insert_with(|| EntryState::new(now));
            entry.fetcher = Some(erased);

            if entry.status == QueryStatus::Success && entry.is_fresh(now, stale_after) {
                debug!(key = %key, "cache hit");
                Outcome::Hit(ReadResult {
                    data: downcast::<T>(entry.value.clone()),
                    status: QueryStatus::Success,
                    error: None,
                    is_stale: false,
                })
            } else if let Some(inflight) = entry.inflight.clone() {
                if entry.value.is_some() {
                    // stale-while-revalidate already in progress
                    Outcome::Hit(ReadResult {
                        data: downcast::<T>(entry.value.clone()),
                        status: entry.status,
                        error: None,
                        is_stale: true,
                    })
                } else {
                    Outcome::Wait(inflight)
                }
            } else if entry.status == QueryStatus::Success {
                // stale hit: serve what we have, revalidate in the background
                debug!(key = %key, "stale hit, revalidating");
                let fetcher = entry.fetcher.clone();
                if let Some(fetcher) = fetcher {
                    spawn_fetch(&self.entries, &self.config.retry, key, &mut entry, fetcher);
                }
                Outcome::Hit(ReadResult {
                    data: downcast::<T>(entry.value.clone()),
                    status: entry.status,
                    error: None,
                    is_stale: true,
                })
            } else {
                let fetcher = entry.fetcher.clone().unwrap_or_else(unreachable_fetcher);
                Outcome::Wait(spawn_fetch(
                    &self.entries,
                    &self.config.retry,
                    key,
                    &mut entry,
                    fetcher,
                ))
            }
        };

        match outcome {
            Outcome::Hit(result) => result,
            Outcome::Wait(shared) => await_fetch::<T>(shared).await,
        }
    }

    /// Run a mutation; on success, invalidate the listed key prefixes
    ///
    /// Invalidation is applied (and subscribed refetches are started)
    /// before this returns, so a read issued after a successful mutation
    /// never observes a pre-mutation entry marked fresh. On failure the
    /// cache is untouched and the error goes to the caller.
    ///
    /// # Errors
    /// Whatever the mutation future returns; never retried here.
    pub async fn mutate<T, Fut>(
        &self,
        operation: Fut,
        options: MutationOptions,
    ) -> Result<T, ClientError>
    where
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let value = operation.await?;
        for prefix in &options.invalidate {
            self.invalidate_prefix(prefix);
        }
        Ok(value)
    }

    /// Mark one entry stale; refetch now if it has subscribers
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(mut entry) = self.entries.get_mut(key) {
            invalidate_entry(&self.entries, &self.config.retry, key, &mut entry);
        }
    }

    /// [`QueryCache::invalidate`] for every entry under a key prefix
    pub fn invalidate_prefix(&self, prefix: &QueryKey) {
        let matching: Vec<QueryKey> = self
            .entries
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| e.key().clone())
            .collect();
        debug!(prefix = %prefix, count = matching.len(), "invalidating");
        for key in matching {
            if let Some(mut entry) = self.entries.get_mut(&key) {
                invalidate_entry(&self.entries, &self.config.retry, &key, &mut entry);
            }
        }
    }

    /// Drop one entry entirely (a deleted entity's key must not serve a
    /// stale ghost; the next read misses and refetches from scratch)
    pub fn remove(&self, key: &QueryKey) {
        self.entries.remove(key);
    }

    /// [`QueryCache::remove`] for every entry under a key prefix
    pub fn remove_prefix(&self, prefix: &QueryKey) {
        self.entries.retain(|key, _| !key.starts_with(prefix));
    }

    /// Explicitly refetch a key using its stored fetcher
    ///
    /// Joins an existing flight if one is running. `None` when the key was
    /// never read (nothing to refetch with).
    pub async fn refetch<T: Send + Sync + 'static>(
        &self,
        key: &QueryKey,
    ) -> Option<ReadResult<T>> {
        let shared = {
            let mut entry = self.entries.get_mut(key)?;
            if let Some(inflight) = entry.inflight.clone() {
                inflight
            } else {
                let fetcher = entry.fetcher.clone()?;
                spawn_fetch(&self.entries, &self.config.retry, key, &mut entry, fetcher)
            }
        };
        Some(await_fetch::<T>(shared).await)
    }

    /// Register interest in a key; the entry survives GC while any
    /// subscription is alive, and invalidation refetches subscribed keys
    #[must_use]
    pub fn subscribe(&self, key: &QueryKey) -> Subscription {
        let now = Instant::now();
        let mut entry = self.entries.entry(key.clone()).or_insert_with(|| EntryState::new(now));
        entry.subscribers += 1;
        Subscription { entries: Arc::clone(&self.entries), key: key.clone() }
    }

    /// Evict entries idle (zero subscribers, no flight) past the GC
    /// threshold; returns how many were removed
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let gc_after = self.config.gc_after;
        let before = self.entries.len();
        self.entries.retain(|_, entry| {
            !(entry.subscribers == 0
                && entry.inflight.is_none()
                && now.duration_since(entry.idle_since) >= gc_after)
        });
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!(evicted, "cache sweep");
        }
        evicted
    }

    /// Run [`QueryCache::sweep`] on an interval until the handle is aborted
    pub fn spawn_gc(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            tick.tick().await; // immediate first tick
            loop {
                tick.tick().await;
                cache.sweep();
            }
        })
    }

    /// Status of a key, if an entry exists
    #[must_use]
    pub fn status_of(&self, key: &QueryKey) -> Option<QueryStatus> {
        self.entries.get(key).map(|e| e.status)
    }

    /// Last-known value without touching status or triggering a fetch
    #[must_use]
    pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let entry = self.entries.get(key)?;
        downcast::<T>(entry.value.clone())
    }

    /// Whether a key's entry is currently marked stale
    #[must_use]
    pub fn is_stale(&self, key: &QueryKey) -> Option<bool> {
        self.entries.get(key).map(|e| e.stale)
    }

    /// Number of live entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

enum Outcome<T> {
    Hit(ReadResult<T>),
    Wait(SharedFetch),
}

fn erase_fetcher<T, F, Fut>(fetcher: F) -> ErasedFetcher
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
{
    Arc::new(move || {
        let fut = fetcher();
        async move { fut.await.map(|value| Arc::new(value) as ErasedValue) }.boxed()
    })
}

/// Placeholder for the impossible no-fetcher case on the spawn path;
/// `read_with` always stores a fetcher first
fn unreachable_fetcher() -> ErasedFetcher {
    Arc::new(|| {
        async { Err(ClientError::Unknown("no fetcher registered".to_string())) }.boxed()
    })
}

fn downcast<T: Send + Sync + 'static>(value: Option<ErasedValue>) -> Option<Arc<T>> {
    match value?.downcast::<T>() {
        Ok(typed) => Some(typed),
        Err(_) => {
            warn!("cache entry value did not match the requested type");
            None
        }
    }
}

async fn await_fetch<T: Send + Sync + 'static>(shared: SharedFetch) -> ReadResult<T> {
    match shared.await {
        Ok(value) => ReadResult {
            data: downcast::<T>(Some(value)),
            status: QueryStatus::Success,
            error: None,
            is_stale: false,
        },
        Err(err) => ReadResult {
            data: None,
            status: QueryStatus::Error,
            error: Some(err),
            is_stale: false,
        },
    }
}

/// Start a fetch for `key`, recording it as the entry's single flight
///
/// The flight is spawned so it completes even if every awaiting reader
/// drops (an unmounting component unsubscribes, it does not cancel).
fn spawn_fetch(
    entries: &Entries,
    retry: &RetryPolicy,
    key: &QueryKey,
    entry: &mut EntryState,
    fetcher: ErasedFetcher,
) -> SharedFetch {
    entry.transition(QueryStatus::Loading);
    let generation = entry.generation;

    let shared = {
        let entries = Arc::clone(entries);
        let retry = retry.clone();
        let key = key.clone();
        async move {
            let result = fetch_with_retry(&fetcher, &retry).await;
            complete_fetch(&entries, &retry, &key, generation, &result);
            result
        }
        .boxed()
        .shared()
    };
    entry.inflight = Some(shared.clone());
    // detached driver task: the flight finishes even with no readers left
    let _ = tokio::spawn(shared.clone());
    shared
}

/// Write a finished fetch back into its entry
///
/// A flight that started before the entry's latest invalidation may not
/// mark it fresh: its value lands stale-flagged, and subscribed entries
/// chain straight into a new fetch. This is what orders mutation
/// invalidation before any dependent refetch's observable result.
fn complete_fetch(
    entries: &Entries,
    retry: &RetryPolicy,
    key: &QueryKey,
    generation: u64,
    result: &FetchResult,
) {
    let Some(mut entry) = entries.get_mut(key) else {
        return; // evicted while in flight
    };
    let superseded = entry.generation != generation;
    entry.inflight = None;

    match result {
        Ok(value) => {
            entry.transition(QueryStatus::Success);
            entry.value = Some(Arc::clone(value));
            entry.error = None;
            entry.fetched_at = Some(Instant::now());
            entry.stale = superseded;
        }
        Err(err) => {
            entry.transition(QueryStatus::Error);
            entry.error = Some(err.clone());
        }
    }

    if superseded && entry.subscribers > 0 {
        if let Some(fetcher) = entry.fetcher.clone() {
            debug!(key = %key, "flight superseded by invalidation, refetching");
            spawn_fetch(entries, retry, key, &mut entry, fetcher);
        }
    }
}

fn invalidate_entry(
    entries: &Entries,
    retry: &RetryPolicy,
    key: &QueryKey,
    entry: &mut EntryState,
) {
    entry.generation += 1;
    entry.stale = true;

    if entry.inflight.is_some() {
        // the running flight is now superseded; completion will chain
        return;
    }
    if entry.subscribers > 0 {
        if let Some(fetcher) = entry.fetcher.clone() {
            spawn_fetch(entries, retry, key, entry, fetcher);
        }
    }
}

async fn fetch_with_retry(fetcher: &ErasedFetcher, retry: &RetryPolicy) -> FetchResult {
    let mut attempt = 1u32;
    loop {
        match (fetcher.as_ref())().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < retry.max_attempts => {
                let delay = retry.delay_for(attempt);
                warn!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "transient fetch failure, backing off");
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
