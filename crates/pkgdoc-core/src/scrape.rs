use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::identifier::{DEFAULT_BASE_URL, normalize_identifier, package_url};
use crate::models::{Document, PackageSource, ScrapedPackage};
use crate::reporter::{ScrapeEvent, ScrapeReporter, TracingReporter};
use crate::stats::{ScrapeStats, StatsSnapshot};
use crate::traits::{Extractor, Fetcher, PackageCache};

/// How a batch is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrapeMode {
    /// One task per identifier, bounded by `max_concurrency`.
    #[default]
    Parallel,
    /// Strictly one identifier at a time, in input order.
    Sequential,
}

/// Orchestrator settings.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Upper bound on in-flight scrapes across the whole service. Minimum 1.
    pub max_concurrency: usize,
    pub mode: ScrapeMode,
    /// Documentation host; overridable for tests.
    pub base_url: String,
}

impl ScrapeConfig {
    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_mode(mut self, mode: ScrapeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 2,
            mode: ScrapeMode::Parallel,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// One identifier that did not produce a package.
#[derive(Debug)]
pub struct ScrapeFailure {
    /// The identifier exactly as the caller passed it.
    pub identifier: String,
    pub error: AppError,
}

/// Best-effort result of [`ScrapeService::scrape_many`].
#[derive(Debug)]
pub struct BatchOutcome {
    /// Successful packages, in completion order (input order when sequential).
    pub packages: Vec<ScrapedPackage>,
    /// Failed identifiers, in completion order.
    pub failures: Vec<ScrapeFailure>,
    /// Service counters at the end of the batch. Cumulative across batches
    /// run on the same service.
    pub stats: StatsSnapshot,
}

impl BatchOutcome {
    /// The first failure observed, if any. Advisory only.
    pub fn first_error(&self) -> Option<&ScrapeFailure> {
        self.failures.first()
    }
}

/// Orchestrates the scrape pipeline: cache lookup → fetch → extract → cache write.
///
/// Generic over all external dependencies via traits, enabling dependency injection
/// and testability without real HTTP or database calls. Clones share the
/// concurrency gate, counters and reporter.
pub struct ScrapeService<F, E, S>
where
    F: Fetcher,
    E: Extractor,
    S: PackageCache,
{
    fetcher: F,
    extractor: E,
    cache: Option<S>,
    config: ScrapeConfig,
    gate: Arc<Semaphore>,
    stats: Arc<ScrapeStats>,
    reporter: Arc<dyn ScrapeReporter>,
}

impl<F, E, S> Clone for ScrapeService<F, E, S>
where
    F: Fetcher,
    E: Extractor,
    S: PackageCache,
{
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            extractor: self.extractor.clone(),
            cache: self.cache.clone(),
            config: self.config.clone(),
            gate: Arc::clone(&self.gate),
            stats: Arc::clone(&self.stats),
            reporter: Arc::clone(&self.reporter),
        }
    }
}

impl<F, E, S> ScrapeService<F, E, S>
where
    F: Fetcher,
    E: Extractor,
    S: PackageCache,
{
    /// Create a new ScrapeService without a cache.
    pub fn new(fetcher: F, extractor: E, config: ScrapeConfig) -> Self {
        let permits = config.max_concurrency.max(1);
        Self {
            fetcher,
            extractor,
            cache: None,
            config,
            gate: Arc::new(Semaphore::new(permits)),
            stats: Arc::new(ScrapeStats::new()),
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Create a new ScrapeService backed by a read-through cache.
    pub fn with_cache(fetcher: F, extractor: E, cache: S, config: ScrapeConfig) -> Self {
        let mut service = Self::new(fetcher, extractor, config);
        service.cache = Some(cache);
        service
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ScrapeReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_stats(mut self, stats: Arc<ScrapeStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    fn active_cache(&self) -> Option<&S> {
        self.cache.as_ref().filter(|c| c.enabled())
    }

    /// Scrape a single package, waiting for a concurrency permit first.
    pub async fn scrape_one(&self, identifier: &str) -> Result<ScrapedPackage, AppError> {
        let _permit = self.acquire().await?;
        self.run(identifier).await
    }

    async fn acquire(&self) -> Result<OwnedSemaphorePermit, AppError> {
        Arc::clone(&self.gate)
            .acquire_owned()
            .await
            .map_err(|_| AppError::Cancelled)
    }

    /// Runs the pipeline and records the failure, if any.
    async fn run(&self, identifier: &str) -> Result<ScrapedPackage, AppError> {
        let result = self.pipeline(identifier).await;
        if let Err(error) = &result {
            if error.counts_as_scrape_error() {
                self.stats.record_error();
            }
            self.reporter.report(ScrapeEvent::Failed { identifier, error });
        }
        result
    }

    /// 1. Normalise the identifier
    /// 2. Cache lookup (a hit short-circuits everything below)
    /// 3. Fetch the page
    /// 4. Extract, then stamp import path and scrape time
    /// 5. Cache write (best effort)
    async fn pipeline(&self, raw: &str) -> Result<ScrapedPackage, AppError> {
        let identifier = normalize_identifier(raw)?;

        // 1 & 2. Normalise + cache lookup
        if let Some(cache) = self.active_cache() {
            match cache.get_by_id(&identifier).await {
                Ok(Some(doc)) => {
                    self.stats.record_cache_hit();
                    self.reporter.report(ScrapeEvent::CacheHit {
                        identifier: &identifier,
                    });
                    return Ok(self.cached_package(&identifier, doc));
                }
                Ok(None) => self.reporter.report(ScrapeEvent::CacheMiss {
                    identifier: &identifier,
                }),
                Err(error) => self.reporter.report(ScrapeEvent::CacheError {
                    identifier: &identifier,
                    error: &error,
                }),
            }
        }

        // 3. Fetch
        let url = package_url(&self.config.base_url, &identifier);
        self.reporter.report(ScrapeEvent::Fetching {
            identifier: &identifier,
            url: &url,
        });
        self.stats.record_request();
        let html = self.fetcher.fetch(&url).await?;

        // 4. Extract
        let extraction = self.extractor.extract(&html);
        let mut package = extraction.package?;
        package.import_path = identifier.clone();
        package.scraped_at = Some(Utc::now());
        self.stats.record_page();

        self.reporter.report(ScrapeEvent::Scraped {
            identifier: &identifier,
            source: PackageSource::Fetched,
            functions: package.functions.len(),
            types: package.types.len(),
        });

        // 5. Cache write
        if let Some(cache) = self.active_cache() {
            let doc = Document::new(identifier.clone(), package.clone(), extraction.raw_html.clone());
            if let Err(error) = cache.upsert(&doc).await {
                self.reporter.report(ScrapeEvent::CacheWriteFailed {
                    identifier: &identifier,
                    error: &error,
                });
            }
        }

        Ok(ScrapedPackage {
            package,
            raw_html: extraction.raw_html,
            source: PackageSource::Fetched,
        })
    }

    fn cached_package(&self, identifier: &str, doc: Document) -> ScrapedPackage {
        let mut package = doc.package;
        if package.import_path.is_empty() {
            package.import_path = identifier.to_string();
        }
        self.reporter.report(ScrapeEvent::Scraped {
            identifier,
            source: PackageSource::Cache,
            functions: package.functions.len(),
            types: package.types.len(),
        });
        ScrapedPackage {
            package,
            raw_html: doc.raw_html,
            source: PackageSource::Cache,
        }
    }
}

impl<F, E, S> ScrapeService<F, E, S>
where
    F: Fetcher + 'static,
    E: Extractor + 'static,
    S: PackageCache + 'static,
{
    /// Scrape every identifier, tolerating individual failures.
    ///
    /// Returns [`AppError::EmptyInput`] for an empty list and
    /// [`AppError::AllFailed`] when nothing succeeded. Identifiers still waiting
    /// for a permit when `cancel` fires are recorded as [`AppError::Cancelled`].
    pub async fn scrape_many(
        &self,
        identifiers: &[String],
        cancel: CancellationToken,
    ) -> Result<BatchOutcome, AppError> {
        if identifiers.is_empty() {
            return Err(AppError::EmptyInput);
        }

        self.reporter.report(ScrapeEvent::BatchStarted {
            total: identifiers.len(),
            mode: self.config.mode,
            max_concurrency: self.config.max_concurrency,
        });

        let results = match self.config.mode {
            ScrapeMode::Sequential => self.run_sequential(identifiers, &cancel).await,
            ScrapeMode::Parallel => self.run_parallel(identifiers, &cancel).await,
        };

        let mut packages = Vec::new();
        let mut failures = Vec::new();
        for (identifier, result) in results {
            match result {
                Ok(pkg) => packages.push(pkg),
                Err(error) => failures.push(ScrapeFailure { identifier, error }),
            }
        }

        let stats = self.stats.snapshot();
        self.reporter.report(ScrapeEvent::BatchFinished {
            succeeded: packages.len(),
            failed: failures.len(),
            stats: &stats,
        });

        if packages.is_empty() {
            let attempted = failures.len();
            let first = failures
                .into_iter()
                .next()
                .map(|f| f.error)
                .unwrap_or(AppError::EmptyInput);
            return Err(AppError::AllFailed {
                attempted,
                first: Box::new(first),
            });
        }

        Ok(BatchOutcome {
            packages,
            failures,
            stats,
        })
    }

    async fn run_sequential(
        &self,
        identifiers: &[String],
        cancel: &CancellationToken,
    ) -> Vec<(String, Result<ScrapedPackage, AppError>)> {
        let mut results = Vec::with_capacity(identifiers.len());
        for identifier in identifiers {
            let result = if cancel.is_cancelled() {
                self.reporter.report(ScrapeEvent::Skipped { identifier });
                Err(AppError::Cancelled)
            } else {
                self.scrape_one(identifier).await
            };
            results.push((identifier.clone(), result));
        }
        results
    }

    async fn run_parallel(
        &self,
        identifiers: &[String],
        cancel: &CancellationToken,
    ) -> Vec<(String, Result<ScrapedPackage, AppError>)> {
        let mut tasks = JoinSet::new();
        let mut pending = HashMap::with_capacity(identifiers.len());

        for identifier in identifiers {
            let service = self.clone();
            let cancel = cancel.clone();
            let id = identifier.clone();
            let handle = tasks.spawn(async move {
                let permit = tokio::select! {
                    biased;
                    () = cancel.cancelled() => None,
                    permit = service.acquire() => permit.ok(),
                };
                // Cancellation may have fired while we held the last permit.
                let Some(_permit) = permit.filter(|_| !cancel.is_cancelled()) else {
                    service.reporter.report(ScrapeEvent::Skipped { identifier: &id });
                    return Err(AppError::Cancelled);
                };
                service.run(&id).await
            });
            pending.insert(handle.id(), identifier.clone());
        }

        let mut results = Vec::with_capacity(identifiers.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((task_id, result)) => {
                    let identifier = pending.remove(&task_id).unwrap_or_default();
                    results.push((identifier, result));
                }
                Err(join_error) => {
                    let identifier = pending.remove(&join_error.id()).unwrap_or_default();
                    tracing::error!(%identifier, error = %join_error, "Scrape task aborted");
                    self.stats.record_error();
                    results.push((
                        identifier,
                        Err(AppError::Generic(format!("scrape task aborted: {join_error}"))),
                    ));
                }
            }
        }
        results
    }
}
