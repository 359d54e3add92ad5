//! Structural extraction of pkg.go.dev pages.

mod declarations;
mod fields;

use pkgdoc_core::error::AppError;
use pkgdoc_core::models::{Package, PageExtraction};
use pkgdoc_core::traits::{Cleaner, Extractor};
use scraper::Html;

use crate::reducer::MarkdownReducer;

pub use fields::parse_labeled_count;

/// Extracts a [`Package`] from a rendered pkg.go.dev documentation page.
///
/// Each field tries a list of selectors in order; the README is reduced to
/// Markdown with the configured [`Cleaner`]. A page that yields neither a
/// name nor an import path is reported as [`AppError::NoDataFound`].
#[derive(Debug, Clone)]
pub struct PkgSiteExtractor<C: Cleaner = MarkdownReducer> {
    cleaner: C,
}

impl<C: Cleaner> PkgSiteExtractor<C> {
    pub fn new(cleaner: C) -> Self {
        Self { cleaner }
    }

    fn parse(&self, html: &str) -> Result<Package, AppError> {
        let doc = Html::parse_document(html);
        let mut pkg = Package::default();

        fields::apply_all(&doc, &mut pkg);

        if let Some(readme) = fields::readme_html(&doc) {
            pkg.processed_readme = self.cleaner.clean(&readme);
            pkg.readme = readme;
        }

        pkg.constants = declarations::constants(&doc);
        pkg.variables = declarations::variables(&doc);
        pkg.functions = declarations::functions(&doc);
        pkg.types = declarations::types(&doc);
        pkg.examples = declarations::package_examples(&doc);

        if pkg.name.is_empty() && pkg.import_path.is_empty() {
            return Err(AppError::NoDataFound);
        }

        tracing::debug!(
            name = %pkg.name,
            functions = pkg.functions.len(),
            types = pkg.types.len(),
            constants = pkg.constants.len(),
            variables = pkg.variables.len(),
            "Extracted package"
        );
        Ok(pkg)
    }
}

impl Default for PkgSiteExtractor<MarkdownReducer> {
    fn default() -> Self {
        Self::new(MarkdownReducer)
    }
}

impl<C: Cleaner> Extractor for PkgSiteExtractor<C> {
    fn extract(&self, html: &str) -> PageExtraction {
        PageExtraction {
            raw_html: html.to_string(),
            package: self.parse(html),
        }
    }
}
