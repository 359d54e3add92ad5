pub mod error;
pub mod identifier;
pub mod models;
pub mod render;
pub mod reporter;
pub mod scrape;
pub mod stats;
pub mod throttle;
pub mod traits;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use error::AppError;
pub use models::{Document, Package, PageExtraction, ScrapedPackage, compute_hash};
pub use scrape::{BatchOutcome, ScrapeConfig, ScrapeFailure, ScrapeMode, ScrapeService};
pub use traits::{Cleaner, Extractor, Fetcher, NullCache, PackageCache};
