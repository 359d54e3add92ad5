use std::time::Duration;

use pkgdoc_core::error::AppError;
use pkgdoc_core::traits::Fetcher;
use reqwest::Client;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = concat!(
    "pkgdoc/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/pkgdoc/pkgdoc)"
);

/// Settings for [`ReqwestFetcher`].
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub user_agent: String,
    pub timeout: Duration,
    /// Hosts requests may go to. Empty means any host.
    pub allowed_hosts: Vec<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            allowed_hosts: vec!["pkg.go.dev".to_string()],
        }
    }
}

/// HTTP fetcher using reqwest.
///
/// Downloads raw HTML with a fixed User-Agent and timeout. Only `http`/`https`
/// URLs on an allowed host are requested; use [`allow_any_host`](Self::allow_any_host)
/// to lift the host restriction (e.g., against a local mock server).
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout_secs: u64,
    allowed_hosts: Vec<String>,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_config(FetcherConfig::default())
    }

    pub fn with_config(config: FetcherConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout_secs: config.timeout.as_secs(),
            allowed_hosts: config.allowed_hosts,
        })
    }

    /// Allow requests to any host.
    pub fn allow_any_host(mut self) -> Self {
        self.allowed_hosts.clear();
        self
    }

    fn check_url(&self, url: &str) -> Result<(), AppError> {
        let parsed = Url::parse(url).map_err(|e| AppError::fetch_failed(url, format!("Invalid URL: {e}")))?;

        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(AppError::fetch_failed(
                    url,
                    format!("URL scheme '{scheme}' is not allowed (only http/https)"),
                ));
            }
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| AppError::fetch_failed(url, "URL has no host"))?;
        if !self.allowed_hosts.is_empty() && !self.allowed_hosts.iter().any(|h| h == host) {
            return Err(AppError::fetch_failed(
                url,
                format!("host '{host}' is not allowed"),
            ));
        }
        Ok(())
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.check_url(url)?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::fetch_failed(url, format!("timed out after {}s", self.timeout_secs))
            } else if e.is_connect() {
                AppError::fetch_failed(url, format!("connection failed: {e}"))
            } else {
                AppError::fetch_failed(url, e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch_failed(url, format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::fetch_failed(url, format!("Failed to read response body: {e}")))?;
        tracing::debug!(%url, bytes = body.len(), "Fetched page");
        Ok(body)
    }
}
