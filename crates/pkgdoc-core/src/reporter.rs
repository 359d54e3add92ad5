use crate::error::AppError;
use crate::models::PackageSource;
use crate::scrape::ScrapeMode;
use crate::stats::StatsSnapshot;

/// Events emitted by the scrape orchestrator for monitoring/logging.
#[derive(Debug, Clone, Copy)]
pub enum ScrapeEvent<'a> {
    BatchStarted {
        total: usize,
        mode: ScrapeMode,
        max_concurrency: usize,
    },
    CacheHit {
        identifier: &'a str,
    },
    CacheMiss {
        identifier: &'a str,
    },
    CacheError {
        identifier: &'a str,
        error: &'a AppError,
    },
    Fetching {
        identifier: &'a str,
        url: &'a str,
    },
    Scraped {
        identifier: &'a str,
        source: PackageSource,
        functions: usize,
        types: usize,
    },
    CacheWriteFailed {
        identifier: &'a str,
        error: &'a AppError,
    },
    Failed {
        identifier: &'a str,
        error: &'a AppError,
    },
    Skipped {
        identifier: &'a str,
    },
    BatchFinished {
        succeeded: usize,
        failed: usize,
        stats: &'a StatsSnapshot,
    },
}

/// Trait for receiving scrape events (decoupled logging).
pub trait ScrapeReporter: Send + Sync {
    fn report(&self, event: ScrapeEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ScrapeReporter for TracingReporter {
    fn report(&self, event: ScrapeEvent<'_>) {
        match event {
            ScrapeEvent::BatchStarted {
                total,
                mode,
                max_concurrency,
            } => {
                tracing::info!(%total, ?mode, %max_concurrency, "Starting scrape batch");
            }
            ScrapeEvent::CacheHit { identifier } => {
                tracing::info!(%identifier, "Found in cache");
            }
            ScrapeEvent::CacheMiss { identifier } => {
                tracing::debug!(%identifier, "Cache miss");
            }
            ScrapeEvent::CacheError { identifier, error } => {
                tracing::warn!(%identifier, %error, "Cache lookup failed, fetching instead");
            }
            ScrapeEvent::Fetching { identifier, url } => {
                tracing::info!(%identifier, %url, "Fetching package page");
            }
            ScrapeEvent::Scraped {
                identifier,
                source,
                functions,
                types,
            } => {
                tracing::info!(%identifier, ?source, %functions, %types, "Package scraped");
            }
            ScrapeEvent::CacheWriteFailed { identifier, error } => {
                tracing::warn!(%identifier, %error, "Failed to cache package");
            }
            ScrapeEvent::Failed { identifier, error } => {
                tracing::error!(%identifier, %error, "Failed to scrape package");
            }
            ScrapeEvent::Skipped { identifier } => {
                tracing::debug!(%identifier, "Skipped after cancellation");
            }
            ScrapeEvent::BatchFinished {
                succeeded,
                failed,
                stats,
            } => {
                tracing::info!(
                    %succeeded,
                    %failed,
                    requests = stats.requests_made,
                    cache_hits = stats.cache_hits,
                    errors = stats.errors,
                    duration_ms = stats.elapsed.as_millis() as u64,
                    "Scrape batch finished"
                );
            }
        }
    }
}
