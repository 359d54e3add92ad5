use pkgdoc_client::{MarkdownReducer, PkgSiteExtractor};
use pkgdoc_core::error::AppError;
use pkgdoc_core::models::PackageSource;
use pkgdoc_core::render::render_markdown;
use pkgdoc_core::testutil::{MockCache, MockFetcher};
use pkgdoc_core::{NullCache, ScrapeConfig, ScrapeMode, ScrapeService};
use tokio_util::sync::CancellationToken;

const COBRA: &str = include_str!("fixtures/cobra.html");
const COBRA_URL: &str = "https://pkg.go.dev/github.com/spf13/cobra";

fn service(fetcher: MockFetcher) -> ScrapeService<MockFetcher, PkgSiteExtractor, NullCache> {
    ScrapeService::new(fetcher, PkgSiteExtractor::default(), ScrapeConfig::default())
}

#[tokio::test]
async fn scrapes_fixture_end_to_end() {
    let svc = service(MockFetcher::empty().with_page(COBRA_URL, COBRA));

    let scraped = svc.scrape_one("github.com/spf13/cobra").await.unwrap();
    let pkg = &scraped.package;

    assert_eq!(scraped.source, PackageSource::Fetched);
    assert_eq!(scraped.raw_html, COBRA);
    assert_eq!(pkg.name, "cobra");
    assert_eq!(pkg.import_path, "github.com/spf13/cobra");
    assert_eq!(pkg.version, "v1.8.0");
    assert!(pkg.is_latest);
    assert_eq!(pkg.imports, 13);
    assert_eq!(pkg.imported_by, 177680);
    assert_eq!(
        pkg.license_url,
        "https://pkg.go.dev/github.com/spf13/cobra?tab=licenses"
    );
    assert!(pkg.scraped_at.is_some());

    assert_eq!(pkg.constants.len(), 1);
    assert_eq!(pkg.constants[0].name, "const-block-1");
    assert_eq!(pkg.variables[0].name, "EnablePrefixMatching");
    assert_eq!(pkg.functions.len(), 1);
    assert_eq!(pkg.functions[0].name, "Execute");
    assert_eq!(pkg.functions[0].signature, "func Execute() error");

    assert!(pkg.processed_readme.starts_with("## Overview"));
    assert!(
        pkg.processed_readme
            .contains("```go\ngo get -u github.com/spf13/cobra@latest\n```")
    );

    let md = render_markdown(pkg);
    assert!(md.contains("cobra"));
    assert!(md.contains("Execute"));
}

#[tokio::test]
async fn single_function_page_through_batch() {
    let html = r#"<html><head><title>cobra package - github.com/spf13/cobra - Go Packages</title></head><body>
        <section class="Documentation-functions">
          <div class="Documentation-function">
            <h4 id="Execute" data-kind="function">func Execute</h4>
            <div class="Documentation-declaration"><pre>func Execute() error</pre></div>
          </div>
        </section></body></html>"#;
    let svc = service(MockFetcher::empty().with_page(COBRA_URL, html));

    let outcome = svc
        .scrape_many(&["github.com/spf13/cobra".to_string()], CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.packages.len(), 1);
    let functions = &outcome.packages[0].package.functions;
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].name, "Execute");
    assert!(outcome.failures.is_empty());
}

#[tokio::test]
async fn partial_failure_keeps_successes() {
    let fetcher = MockFetcher::empty()
        .with_failure("https://pkg.go.dev/a", "connection reset")
        .with_page("https://pkg.go.dev/b", COBRA);
    let svc = ScrapeService::<_, _, NullCache>::new(
        fetcher,
        PkgSiteExtractor::default(),
        ScrapeConfig::default().with_mode(ScrapeMode::Sequential),
    );

    let outcome = svc
        .scrape_many(&["a".to_string(), "b".to_string()], CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.packages.len(), 1);
    assert_eq!(outcome.packages[0].package.import_path, "b");
    let first = outcome.first_error().unwrap();
    assert_eq!(first.identifier, "a");
    assert!(matches!(first.error, AppError::FetchFailed { .. }));
    assert_eq!(outcome.stats.errors, 1);
    assert_eq!(outcome.stats.pages_scraped, 1);
}

#[tokio::test]
async fn second_scrape_is_served_from_cache() {
    let fetcher = MockFetcher::empty().with_page(COBRA_URL, COBRA);
    let cache = MockCache::empty();
    let svc = ScrapeService::with_cache(
        fetcher.clone(),
        PkgSiteExtractor::new(MarkdownReducer),
        cache.clone(),
        ScrapeConfig::default(),
    );

    let first = svc.scrape_one("github.com/spf13/cobra").await.unwrap();
    assert_eq!(cache.upserted_ids(), vec!["github.com/spf13/cobra"]);

    let second = svc.scrape_one("github.com/spf13/cobra").await.unwrap();
    assert_eq!(second.source, PackageSource::Cache);
    assert_eq!(second.package.functions, first.package.functions);
    assert_eq!(fetcher.call_count(), 1);
    assert_eq!(svc.stats().cache_hits, 1);
}

#[tokio::test]
async fn page_without_package_data_fails() {
    let svc = service(MockFetcher::empty().with_page(COBRA_URL, "<html><body>404</body></html>"));
    let err = svc.scrape_one("github.com/spf13/cobra").await.unwrap_err();
    assert!(matches!(err, AppError::NoDataFound));
}
