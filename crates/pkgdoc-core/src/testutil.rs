//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::AppError;
use crate::models::{Document, Package, PageExtraction};
use crate::reporter::{ScrapeEvent, ScrapeReporter};
use crate::traits::{Cleaner, Extractor, Fetcher, PackageCache};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum Route {
    Page(String),
    Failure(String),
}

/// Mock fetcher answering per URL, with an optional fallback for every
/// other URL. Unrouted URLs fail with `HTTP 404`.
#[derive(Clone, Default)]
pub struct MockFetcher {
    routes: Arc<Mutex<HashMap<String, Route>>>,
    fallback: Option<Route>,
    delay: Duration,
    calls: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockFetcher {
    /// Every URL returns `html`.
    pub fn new(html: &str) -> Self {
        Self {
            fallback: Some(Route::Page(html.to_string())),
            ..Self::default()
        }
    }

    /// Every URL fails with `reason`.
    pub fn with_error(reason: &str) -> Self {
        Self {
            fallback: Some(Route::Failure(reason.to_string())),
            ..Self::default()
        }
    }

    /// No routes; every URL fails until pages are added.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Page(html.to_string()));
        self
    }

    pub fn with_failure(self, url: &str, reason: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Failure(reason.to_string()));
        self
    }

    /// Sleep this long inside every fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// URLs fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Highest number of fetches observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let route = self
            .routes
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .or_else(|| self.fallback.clone());
        match route {
            Some(Route::Page(html)) => Ok(html),
            Some(Route::Failure(reason)) => Err(AppError::fetch_failed(url, reason)),
            None => Err(AppError::fetch_failed(url, "HTTP 404")),
        }
    }
}

// ---------------------------------------------------------------------------
// MockExtractor
// ---------------------------------------------------------------------------

/// Mock extractor that treats the whole page body as the package name.
///
/// A blank page yields [`AppError::NoDataFound`]. The parsed import path is
/// always `"parsed/import/path"` so callers can check it gets overridden.
#[derive(Clone, Default)]
pub struct MockExtractor {
    calls: Arc<AtomicUsize>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Extractor for MockExtractor {
    fn extract(&self, html: &str) -> PageExtraction {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = html.trim();
        let package = if name.is_empty() {
            Err(AppError::NoDataFound)
        } else {
            Ok(Package {
                name: name.to_string(),
                import_path: "parsed/import/path".to_string(),
                ..Package::default()
            })
        };
        PageExtraction {
            raw_html: html.to_string(),
            package,
        }
    }
}

// ---------------------------------------------------------------------------
// MockCleaner
// ---------------------------------------------------------------------------

/// Mock cleaner that returns the input unchanged.
#[derive(Clone, Default)]
pub struct MockCleaner;

impl Cleaner for MockCleaner {
    fn clean(&self, html: &str) -> String {
        html.to_string()
    }
}

// ---------------------------------------------------------------------------
// MockCache
// ---------------------------------------------------------------------------

/// In-memory cache that records every upsert.
#[derive(Clone)]
pub struct MockCache {
    enabled: bool,
    fail_reads: bool,
    fail_writes: bool,
    documents: Arc<Mutex<HashMap<String, Document>>>,
    pub upserts: Arc<Mutex<Vec<Document>>>,
    lookups: Arc<AtomicUsize>,
}

impl MockCache {
    pub fn empty() -> Self {
        Self {
            enabled: true,
            fail_reads: false,
            fail_writes: false,
            documents: Arc::new(Mutex::new(HashMap::new())),
            upserts: Arc::new(Mutex::new(Vec::new())),
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_document(document: Document) -> Self {
        let cache = Self::empty();
        cache
            .documents
            .lock()
            .unwrap()
            .insert(document.id.clone(), document);
        cache
    }

    /// Every lookup and upsert fails.
    pub fn failing() -> Self {
        Self {
            fail_reads: true,
            fail_writes: true,
            ..Self::empty()
        }
    }

    /// Lookups work, upserts fail.
    pub fn read_only() -> Self {
        Self {
            fail_writes: true,
            ..Self::empty()
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::empty()
        }
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn upserted_ids(&self) -> Vec<String> {
        self.upserts
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.id.clone())
            .collect()
    }
}

impl PackageCache for MockCache {
    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Document>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(AppError::CacheUnavailable("mock read failure".into()));
        }
        Ok(self.documents.lock().unwrap().get(id).cloned())
    }

    async fn upsert(&self, document: &Document) -> Result<(), AppError> {
        if self.fail_writes {
            return Err(AppError::CacheUnavailable("mock write failure".into()));
        }
        self.upserts.lock().unwrap().push(document.clone());
        self.documents
            .lock()
            .unwrap()
            .insert(document.id.clone(), document.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockReporter
// ---------------------------------------------------------------------------

/// Records a short tag per event, e.g. `"hit:fmt"` or `"failed:a"`.
#[derive(Clone, Default)]
pub struct MockReporter {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl MockReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ScrapeReporter for MockReporter {
    fn report(&self, event: ScrapeEvent<'_>) {
        let tag = match event {
            ScrapeEvent::BatchStarted { total, .. } => format!("started:{total}"),
            ScrapeEvent::CacheHit { identifier } => format!("hit:{identifier}"),
            ScrapeEvent::CacheMiss { identifier } => format!("miss:{identifier}"),
            ScrapeEvent::CacheError { identifier, .. } => format!("cache_error:{identifier}"),
            ScrapeEvent::Fetching { identifier, .. } => format!("fetching:{identifier}"),
            ScrapeEvent::Scraped { identifier, .. } => format!("scraped:{identifier}"),
            ScrapeEvent::CacheWriteFailed { identifier, .. } => {
                format!("cache_write_failed:{identifier}")
            }
            ScrapeEvent::Failed { identifier, .. } => format!("failed:{identifier}"),
            ScrapeEvent::Skipped { identifier } => format!("skipped:{identifier}"),
            ScrapeEvent::BatchFinished {
                succeeded, failed, ..
            } => format!("finished:{succeeded}/{failed}"),
        };
        self.events.lock().unwrap().push(tag);
    }
}
