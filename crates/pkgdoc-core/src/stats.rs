use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Shared scrape counters. Cheap to update from many tasks at once.
#[derive(Debug)]
pub struct ScrapeStats {
    pages_scraped: AtomicU64,
    requests_made: AtomicU64,
    cache_hits: AtomicU64,
    errors: AtomicU64,
    started: Instant,
}

/// Point-in-time copy of [`ScrapeStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub pages_scraped: u64,
    pub requests_made: u64,
    pub cache_hits: u64,
    pub errors: u64,
    pub elapsed: Duration,
}

impl ScrapeStats {
    pub fn new() -> Self {
        Self {
            pages_scraped: AtomicU64::new(0),
            requests_made: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub(crate) fn record_page(&self) {
        self.pages_scraped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_request(&self) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_scraped: self.pages_scraped.load(Ordering::Relaxed),
            requests_made: self.requests_made.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            elapsed: self.started.elapsed(),
        }
    }
}

impl Default for ScrapeStats {
    fn default() -> Self {
        Self::new()
    }
}
