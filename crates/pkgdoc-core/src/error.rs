use thiserror::Error;

/// Application-wide error types for pkgdoc.
#[derive(Error, Debug)]
pub enum AppError {
    /// A batch was requested with no identifiers at all.
    #[error("no package identifiers given")]
    EmptyInput,

    /// An identifier was blank or otherwise unusable.
    #[error("invalid package identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Fetching a page failed (transport, non-2xx status, timeout, blocked host).
    #[error("fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    /// The page carried neither a package name nor an import path.
    #[error("no package data found")]
    NoDataFound,

    /// The cache backend could not be reached or returned garbage.
    #[error("cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Every identifier in a batch failed.
    #[error("all {attempted} package(s) failed; first error: {first}")]
    AllFailed { attempted: usize, first: Box<AppError> },

    /// The batch was cancelled before this identifier ran.
    #[error("cancelled")]
    Cancelled,

    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Shorthand for [`AppError::FetchFailed`].
    pub fn fetch_failed(url: &str, reason: impl Into<String>) -> Self {
        AppError::FetchFailed {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error counts against the scrape error counter.
    pub(crate) fn counts_as_scrape_error(&self) -> bool {
        !matches!(self, AppError::Cancelled | AppError::InvalidIdentifier(_))
    }
}
