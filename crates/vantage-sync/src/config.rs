//! Cache configuration

use std::time::Duration;
use vantage_key::QueryKey;

/// Retry policy for read fetches
///
/// Applies to transient transport errors only; validation and not-found
/// failures abort immediately. Mutations are never auto-retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each attempt
    pub base_delay: Duration,
    /// Ceiling for the backoff delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// No retries at all
    #[must_use]
    pub fn none() -> Self {
        Self { max_attempts: 1, ..Self::default() }
    }

    /// Backoff delay before retrying after attempt `attempt` (1-based)
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Cache-wide tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Age after which a success entry is served stale and revalidated
    pub stale_after: Duration,
    /// Idle time (zero subscribers) after which an entry is evicted
    pub gc_after: Duration,
    /// Retry policy for read fetches
    pub retry: RetryPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(30),
            gc_after: Duration::from_secs(300),
            retry: RetryPolicy::default(),
        }
    }
}

impl CacheConfig {
    /// Default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a staleness threshold
    #[inline]
    #[must_use]
    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// With a garbage-collection threshold
    #[inline]
    #[must_use]
    pub fn with_gc_after(mut self, gc_after: Duration) -> Self {
        self.gc_after = gc_after;
        self
    }

    /// With a retry policy
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// What a mutation invalidates on success
#[derive(Debug, Clone, Default)]
pub struct MutationOptions {
    /// Key prefixes marked stale (and refetched where subscribed)
    pub invalidate: Vec<QueryKey>,
}

impl MutationOptions {
    /// No invalidation
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate the given key prefixes on success
    #[must_use]
    pub fn invalidating(keys: Vec<QueryKey>) -> Self {
        Self { invalidate: keys }
    }
}
