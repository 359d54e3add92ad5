//! Per-domain request spacing for polite fetching.
//!
//! Wraps any [`Fetcher`] so that consecutive requests to the same host are
//! at least `delay` (+ jitter) apart, no matter how many scrape tasks share
//! the fetcher.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use pkgdoc_core::throttle::{ThrottledFetcher, ThrottleConfig};
//!
//! # use pkgdoc_core::traits::Fetcher;
//! # #[derive(Clone)] struct MyFetcher;
//! # impl Fetcher for MyFetcher {
//! #     async fn fetch(&self, _: &str) -> Result<String, pkgdoc_core::error::AppError> { todo!() }
//! # }
//! let config = ThrottleConfig::new(Duration::from_secs(2))
//!     .with_jitter(Duration::from_millis(500));
//! let fetcher = ThrottledFetcher::new(MyFetcher, config);
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use url::Url;

use crate::error::AppError;
use crate::traits::Fetcher;

/// Configuration for the throttled fetcher.
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Minimum spacing between requests to the same domain.
    pub delay: Duration,

    /// Maximum random jitter added on top of `delay` (uniform [0, jitter)).
    /// Set to `Duration::ZERO` to disable.
    pub jitter: Duration,
}

impl ThrottleConfig {
    /// Create a new config with the given per-domain delay and no jitter.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            jitter: Duration::ZERO,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    fn effective_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.delay;
        }
        let jitter_ms = rand_jitter_ms(self.jitter.as_millis() as u64);
        self.delay + Duration::from_millis(jitter_ms)
    }
}

impl Default for ThrottleConfig {
    /// 2 second delay, 500ms jitter.
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(2),
            jitter: Duration::from_millis(500),
        }
    }
}

/// A [`Fetcher`] wrapper that enforces per-domain spacing.
///
/// Each call reserves the next free slot for its domain while holding the
/// lock, then sleeps until that slot without it. Concurrent callers for the
/// same domain therefore queue up one `delay` apart instead of all waking at
/// once.
#[derive(Clone)]
pub struct ThrottledFetcher<F> {
    inner: F,
    config: ThrottleConfig,
    /// Earliest time the next request to each domain may start.
    next_slot: Arc<Mutex<HashMap<String, Instant>>>,
}

impl<F: Fetcher> ThrottledFetcher<F> {
    pub fn new(inner: F, config: ThrottleConfig) -> Self {
        Self {
            inner,
            config,
            next_slot: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Extract the domain key from a URL (scheme://host:port).
    fn domain_key(url_str: &str) -> Option<String> {
        let url = Url::parse(url_str).ok()?;
        let host = url.host_str()?;
        let port = url
            .port_or_known_default()
            .map(|p| format!(":{p}"))
            .unwrap_or_default();
        Some(format!("{}://{}{}", url.scheme(), host, port))
    }

    /// Claim a start time for `domain` and push the next slot forward.
    async fn reserve(&self, domain: &str) -> Instant {
        let mut slots = self.next_slot.lock().await;
        let now = Instant::now();
        let start = match slots.get(domain) {
            Some(&next) if next > now => next,
            _ => now,
        };
        slots.insert(domain.to_string(), start + self.config.effective_delay());
        start
    }
}

impl<F: Fetcher> Fetcher for ThrottledFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        if let Some(domain) = Self::domain_key(url) {
            let start = self.reserve(&domain).await;
            let wait = start.saturating_duration_since(Instant::now());
            if !wait.is_zero() {
                tracing::debug!(
                    domain = %domain,
                    sleep_ms = %wait.as_millis(),
                    "Throttling request"
                );
                tokio::time::sleep_until(start).await;
            }
        }
        self.inner.fetch(url).await
    }
}

// xorshift seeded from the clock; jitter only, not crypto.
fn rand_jitter_ms(max_ms: u64) -> u64 {
    if max_ms == 0 {
        return 0;
    }
    let mut x = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x % max_ms
}
