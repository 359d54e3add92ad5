mod output;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use url::Url;

use pkgdoc_client::{FetcherConfig, PkgSiteExtractor, ReqwestFetcher};
use pkgdoc_core::identifier::DEFAULT_BASE_URL;
use pkgdoc_core::throttle::{ThrottleConfig, ThrottledFetcher};
use pkgdoc_core::{BatchOutcome, ScrapeConfig, ScrapeMode, ScrapeService};
use pkgdoc_db::{Database, DatabaseConfig, PackageStore};

#[derive(Parser)]
#[command(
    name = "pkgdoc",
    version,
    about = "Scrape Go package documentation from pkg.go.dev into Markdown"
)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape one or more packages
    Scrape(ScrapeArgs),
}

#[derive(Args)]
struct ScrapeArgs {
    /// Import paths or pkg.go.dev URLs (e.g. github.com/spf13/cobra)
    #[arg(required = true)]
    packages: Vec<String>,

    /// Write <import path>.md and <import path>_raw.txt here instead of printing Markdown
    #[arg(short, long, env = "PKGDOC_OUTPUT_DIR")]
    output: Option<PathBuf>,

    /// Maximum packages scraped at once
    #[arg(long, env = "PKGDOC_CONCURRENCY", default_value_t = 2)]
    concurrency: usize,

    /// Scrape one package at a time, in input order
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Minimum delay between requests to the same host, in milliseconds
    #[arg(long, env = "PKGDOC_DELAY_MS", default_value_t = 2000)]
    delay_ms: u64,

    /// Per-request timeout in seconds
    #[arg(long, env = "PKGDOC_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Documentation host
    #[arg(long, env = "PKGDOC_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Skip the PostgreSQL cache even if DATABASE_URL is set
    #[arg(long, default_value_t = false)]
    no_cache: bool,
}

type Service = ScrapeService<ThrottledFetcher<ReqwestFetcher>, PkgSiteExtractor, PackageStore>;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let directive = if cli.verbose { "pkgdoc=debug" } else { "pkgdoc=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scrape(args) => cmd_scrape(args).await,
    }
}

async fn cmd_scrape(args: ScrapeArgs) -> Result<()> {
    let service = build_service(&args).await?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight packages");
            on_signal.cancel();
        }
    });

    let outcome = service
        .scrape_many(&args.packages, cancel)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    report_failures(&outcome, args.packages.len());

    match &args.output {
        Some(dir) => {
            for scraped in &outcome.packages {
                let files = output::write_package(dir, scraped)?;
                tracing::info!(
                    package = %scraped.package.import_path,
                    markdown = %files.markdown.display(),
                    raw = %files.raw.display(),
                    "Wrote package"
                );
            }
        }
        None => output::print_packages(&mut std::io::stdout().lock(), &outcome.packages)?,
    }

    Ok(())
}

async fn build_service(args: &ScrapeArgs) -> Result<Service> {
    let base = Url::parse(&args.base_url)
        .with_context(|| format!("Invalid base URL: {}", args.base_url))?;
    let host = base
        .host_str()
        .with_context(|| format!("Base URL has no host: {}", args.base_url))?;

    let fetcher = ReqwestFetcher::with_config(FetcherConfig {
        timeout: Duration::from_secs(args.timeout_secs),
        allowed_hosts: vec![host.to_string()],
        ..FetcherConfig::default()
    })
    .map_err(|e| anyhow::anyhow!(e))?;

    let throttle = if args.delay_ms == 0 {
        ThrottleConfig::new(Duration::ZERO)
    } else {
        ThrottleConfig::new(Duration::from_millis(args.delay_ms))
            .with_jitter(ThrottleConfig::default().jitter)
    };
    let fetcher = ThrottledFetcher::new(fetcher, throttle);

    let mode = if args.sequential {
        ScrapeMode::Sequential
    } else {
        ScrapeMode::Parallel
    };
    let config = ScrapeConfig::default()
        .with_concurrency(args.concurrency)
        .with_mode(mode)
        .with_base_url(args.base_url.trim_end_matches('/'));

    let extractor = PkgSiteExtractor::default();
    let service = match connect_cache(args.no_cache).await {
        Some(store) => ScrapeService::with_cache(fetcher, extractor, store, config),
        None => ScrapeService::new(fetcher, extractor, config),
    };
    Ok(service)
}

/// The cache is optional: any problem reaching it downgrades to uncached scraping.
async fn connect_cache(no_cache: bool) -> Option<PackageStore> {
    if no_cache {
        tracing::info!("Cache disabled by --no-cache");
        return None;
    }

    let config = match DatabaseConfig::from_env_optional() {
        Ok(Some(config)) => config,
        Ok(None) => {
            tracing::debug!("DATABASE_URL not set, scraping without cache");
            return None;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Invalid cache configuration, scraping without cache");
            return None;
        }
    };

    let db = match Database::connect(&config).await {
        Ok(db) => db,
        Err(e) => {
            tracing::warn!(error = %e, "Cache unavailable, scraping without cache");
            return None;
        }
    };
    if let Err(e) = db.migrate().await {
        tracing::warn!(error = %e, "Cache migration failed, scraping without cache");
        return None;
    }

    tracing::info!(max_connections = config.max_connections, "Package cache connected");
    Some(db.package_store())
}

fn report_failures(outcome: &BatchOutcome, total: usize) {
    if outcome.failures.is_empty() {
        return;
    }
    eprintln!("{} of {total} packages failed:", outcome.failures.len());
    for failure in &outcome.failures {
        eprintln!("  {}: {}", failure.identifier, failure.error);
    }
}
