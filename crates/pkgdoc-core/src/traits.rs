use std::future::Future;

use crate::error::AppError;
use crate::models::{Document, PageExtraction};

/// Fetches raw HTML content from a URL.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Reduces an HTML fragment to Markdown.
///
/// Implementations are total: malformed input degrades the output, it never
/// produces an error.
pub trait Cleaner: Send + Sync + Clone {
    fn clean(&self, html: &str) -> String;
}

/// Turns a documentation page into a structured [`Package`](crate::models::Package).
///
/// Synchronous on purpose: the parsed DOM is not `Send` and must not be held
/// across an await point.
pub trait Extractor: Send + Sync + Clone {
    fn extract(&self, html: &str) -> PageExtraction;
}

/// Read-through document cache keyed by import path.
pub trait PackageCache: Send + Sync + Clone {
    /// A disabled cache is skipped entirely by the orchestrator.
    fn enabled(&self) -> bool {
        true
    }

    /// Look up a cached document. `Ok(None)` is a miss.
    fn get_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Document>, AppError>> + Send;

    /// Insert or replace the document with the same id.
    fn upsert(&self, document: &Document) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// A no-op PackageCache for use when caching is not configured.
#[derive(Debug, Clone)]
pub struct NullCache;

impl PackageCache for NullCache {
    fn enabled(&self) -> bool {
        false
    }

    async fn get_by_id(&self, _id: &str) -> Result<Option<Document>, AppError> {
        Ok(None)
    }

    async fn upsert(&self, _document: &Document) -> Result<(), AppError> {
        Ok(())
    }
}
