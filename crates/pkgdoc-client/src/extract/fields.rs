//! Header and overview fields.
//!
//! Each field is a [`FieldSpec`]: an ordered list of lookups tried against the
//! document until one yields a value. A field with no match keeps its empty
//! default.

use pkgdoc_core::models::Package;
use scraper::{ElementRef, Html, Selector};

use crate::consts::{
    BREADCRUMB_CURRENT, COMMIT_TIME, IMPORTED_BY_LINK, IMPORTS_LINK, LATEST_BADGE, LICENSE_LINK,
    META_DESCRIPTION, META_MODULE_LINK, MODULE_LINK, OVERVIEW_PARAGRAPH, README_CONTENT,
    REPO_LINK, SITE_ORIGIN, TITLE, TITLE_HEADING, VERSION_ARIA, VERSION_TEXT,
};

type Lookup<T> = fn(&Html) -> Option<T>;

pub(crate) struct FieldSpec<T: 'static> {
    name: &'static str,
    lookups: &'static [Lookup<T>],
    assign: fn(&mut Package, T),
}

impl<T> FieldSpec<T> {
    fn apply(&self, doc: &Html, pkg: &mut Package) {
        match self.lookups.iter().find_map(|lookup| lookup(doc)) {
            Some(value) => (self.assign)(pkg, value),
            None => tracing::trace!(field = self.name, "no match"),
        }
    }
}

static TEXT_FIELDS: &[FieldSpec<String>] = &[
    FieldSpec {
        name: "name",
        lookups: &[
            |d: &Html| first_text(d, &TITLE_HEADING),
            |d: &Html| title_segments(d).map(|(name, _)| name),
        ],
        assign: |p: &mut Package, v: String| p.name = v,
    },
    FieldSpec {
        name: "import_path",
        lookups: &[
            |d: &Html| first_text(d, &BREADCRUMB_CURRENT),
            |d: &Html| title_segments(d).and_then(|(_, path)| path),
        ],
        assign: |p: &mut Package, v: String| p.import_path = v,
    },
    FieldSpec {
        name: "module",
        lookups: &[
            |d: &Html| first_text(d, &MODULE_LINK).map(|t| strip_label(&t, &["Module:"])),
            |d: &Html| first_text(d, &META_MODULE_LINK),
        ],
        assign: |p: &mut Package, v: String| p.module = v,
    },
    FieldSpec {
        name: "version",
        lookups: &[
            |d: &Html| {
                first_attr(d, &VERSION_ARIA, "aria-label")
                    .and_then(|label| non_empty(label.strip_prefix("Version: ")?.trim()))
            },
            |d: &Html| first_text(d, &VERSION_TEXT).map(|t| strip_label(&t, &["Version:"])),
        ],
        assign: |p: &mut Package, v: String| p.version = v,
    },
    FieldSpec {
        name: "published",
        lookups: &[|d: &Html| {
            first_text(d, &COMMIT_TIME).and_then(|t| non_empty(&strip_label(&t, &["Published:"])))
        }],
        assign: |p: &mut Package, v: String| p.published = v,
    },
    FieldSpec {
        name: "repository",
        lookups: &[|d: &Html| first_attr(d, &REPO_LINK, "href")],
        assign: |p: &mut Package, v: String| p.repository = v,
    },
    FieldSpec {
        name: "description",
        lookups: &[
            |d: &Html| first_text(d, &OVERVIEW_PARAGRAPH),
            |d: &Html| first_attr(d, &META_DESCRIPTION, "content"),
        ],
        assign: |p: &mut Package, v: String| p.description = v,
    },
    FieldSpec {
        name: "synopsis",
        lookups: &[|d: &Html| first_attr(d, &META_DESCRIPTION, "content")],
        assign: |p: &mut Package, v: String| p.synopsis = v,
    },
];

static COUNT_FIELDS: &[FieldSpec<u64>] = &[
    FieldSpec {
        name: "imports",
        lookups: &[|d: &Html| labeled_count(d, &IMPORTS_LINK, &["Imports:"])],
        assign: |p: &mut Package, v: u64| p.imports = v,
    },
    FieldSpec {
        name: "imported_by",
        lookups: &[|d: &Html| labeled_count(d, &IMPORTED_BY_LINK, &["Imported By:", "Imported by:"])],
        assign: |p: &mut Package, v: u64| p.imported_by = v,
    },
];

static FLAG_FIELDS: &[FieldSpec<bool>] = &[FieldSpec {
    name: "is_latest",
    lookups: &[|d: &Html| {
        d.select(&LATEST_BADGE)
            .any(|el| text_of(el).contains("Latest"))
            .then_some(true)
    }],
    assign: |p: &mut Package, v: bool| p.is_latest = v,
}];

static LICENSE_FIELDS: &[FieldSpec<(String, String)>] = &[FieldSpec {
    name: "license",
    lookups: &[license],
    assign: |p: &mut Package, (name, url): (String, String)| {
        p.license = name;
        p.license_url = url;
    },
}];

/// Run every header/overview field spec against the document.
pub(crate) fn apply_all(doc: &Html, pkg: &mut Package) {
    for spec in TEXT_FIELDS {
        spec.apply(doc, pkg);
    }
    for spec in COUNT_FIELDS {
        spec.apply(doc, pkg);
    }
    for spec in FLAG_FIELDS {
        spec.apply(doc, pkg);
    }
    for spec in LICENSE_FIELDS {
        spec.apply(doc, pkg);
    }
}

/// Inner markup of the README subtree, if present.
pub(crate) fn readme_html(doc: &Html) -> Option<String> {
    doc.select(&README_CONTENT)
        .next()
        .map(|el| el.inner_html())
        .filter(|html| !html.trim().is_empty())
}

/// Parse `"<Label>: <number>"`, ignoring thousands separators.
///
/// Returns `None` when no label matches or the number does not parse; the
/// caller then leaves the count at zero.
pub fn parse_labeled_count(value: &str, labels: &[&str]) -> Option<u64> {
    let value = value.trim();
    let rest = labels.iter().find_map(|label| value.strip_prefix(label))?;
    rest.trim().replace(',', "").parse().ok()
}

fn labeled_count(doc: &Html, selector: &Selector, labels: &[&str]) -> Option<u64> {
    let el = doc.select(selector).next()?;
    let aria = el.value().attr("aria-label").unwrap_or_default();
    [aria.to_string(), text_of(el)]
        .iter()
        .find_map(|candidate| parse_labeled_count(candidate, labels))
}

/// First license link with a non-empty name; relative hrefs are made absolute.
fn license(doc: &Html) -> Option<(String, String)> {
    doc.select(&LICENSE_LINK).find_map(|el| {
        let name = non_empty(&text_of(el))?;
        let url = match el.value().attr("href").map(str::trim) {
            Some(href) if href.starts_with('/') => format!("{SITE_ORIGIN}{href}"),
            Some(href) => href.to_string(),
            None => String::new(),
        };
        Some((name, url))
    })
}

/// `"cobra package - github.com/spf13/cobra - Go Packages"` → name, import path.
fn title_segments(doc: &Html) -> Option<(String, Option<String>)> {
    let title = first_text(doc, &TITLE)?;
    let (name, rest) = title.split_once(" package - ")?;
    let path = rest
        .strip_suffix(" - Go Packages")
        .unwrap_or(rest)
        .trim();
    Some((non_empty(name)?, non_empty(path)))
}

/// Whitespace-collapsed text of an element.
pub(crate) fn text_of(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector).find_map(|el| non_empty(&text_of(el)))
}

fn first_attr(doc: &Html, selector: &Selector, attr: &str) -> Option<String> {
    doc.select(selector)
        .find_map(|el| non_empty(el.value().attr(attr)?.trim()))
}

fn strip_label(text: &str, labels: &[&str]) -> String {
    labels
        .iter()
        .find_map(|label| text.strip_prefix(label))
        .unwrap_or(text)
        .trim()
        .to_string()
}

pub(crate) fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> Package {
        let doc = Html::parse_document(html);
        let mut pkg = Package::default();
        apply_all(&doc, &mut pkg);
        pkg
    }

    #[test]
    fn labeled_counts() {
        let labels = &["Imported By:", "Imported by:"];
        assert_eq!(parse_labeled_count("Imported By: 177,680", labels), Some(177680));
        assert_eq!(parse_labeled_count("Imported by: 3", labels), Some(3));
        assert_eq!(parse_labeled_count("Imported By: N/A", labels), None);
        assert_eq!(parse_labeled_count("Imports: 5", labels), None);
    }

    #[test]
    fn primary_selectors() {
        let pkg = extract(
            r#"<html><head><title>ignored package - ignored - Go Packages</title></head><body>
            <h1 class="UnitHeader-titleHeading"> cobra </h1>
            <span class="UnitHeader-breadcrumbCurrent">github.com/spf13/cobra</span>
            <a aria-label="Version: v1.8.0" href="?tab=versions">Version: v1.8.0</a>
            <span class="DetailsHeader-span--latest">Latest</span>
            <span data-test-id="UnitHeader-commitTime">Published: Nov 30, 2023</span>
            <span data-test-id="UnitHeader-licenses"><a href="/github.com/spf13/cobra?tab=licenses">Apache-2.0</a></span>
            <span data-test-id="UnitHeader-imports"><a aria-label="Imports: 7">Imports: 7</a></span>
            <span data-test-id="UnitHeader-importedby"><a aria-label="Imported By: 177,680">Imported by: 177,680</a></span>
            <div class="UnitMeta-repo"><a href="https://github.com/spf13/cobra">github.com/spf13/cobra</a></div>
            <section class="Documentation-overview"><p>Package cobra is a commander.</p></section>
            </body></html>"#,
        );
        assert_eq!(pkg.name, "cobra");
        assert_eq!(pkg.import_path, "github.com/spf13/cobra");
        assert_eq!(pkg.version, "v1.8.0");
        assert!(pkg.is_latest);
        assert_eq!(pkg.published, "Nov 30, 2023");
        assert_eq!(pkg.license, "Apache-2.0");
        assert_eq!(
            pkg.license_url,
            "https://pkg.go.dev/github.com/spf13/cobra?tab=licenses"
        );
        assert_eq!(pkg.imports, 7);
        assert_eq!(pkg.imported_by, 177680);
        assert_eq!(pkg.repository, "https://github.com/spf13/cobra");
        assert_eq!(pkg.description, "Package cobra is a commander.");
    }

    #[test]
    fn fallbacks_from_title_and_meta() {
        let pkg = extract(
            r#"<html><head>
            <title>yaml package - gopkg.in/yaml.v3 - Go Packages</title>
            <meta name="description" content="Package yaml implements YAML support.">
            </head><body>
            <div data-test-id="UnitHeader-version"><a>Version: v3.0.1</a></div>
            </body></html>"#,
        );
        assert_eq!(pkg.name, "yaml");
        assert_eq!(pkg.import_path, "gopkg.in/yaml.v3");
        assert_eq!(pkg.version, "v3.0.1");
        assert_eq!(pkg.description, "Package yaml implements YAML support.");
        assert_eq!(pkg.synopsis, "Package yaml implements YAML support.");
    }

    #[test]
    fn unparsable_count_stays_zero() {
        let pkg = extract(
            r#"<span data-test-id="UnitHeader-importedby"><a aria-label="Imported By: N/A">Imported By: N/A</a></span>"#,
        );
        assert_eq!(pkg.imported_by, 0);
    }

    #[test]
    fn count_falls_back_to_text_without_aria_label() {
        let pkg = extract(r#"<span data-test-id="UnitHeader-imports"><a>Imports: 1,024</a></span>"#);
        assert_eq!(pkg.imports, 1024);
    }

    #[test]
    fn first_non_empty_license_wins() {
        let pkg = extract(
            r#"<a data-test-id="UnitHeader-license" href="/a"> </a>
               <div class="UnitHeader-license"><a href="https://example.com/MIT">MIT</a></div>
               <div class="UnitHeader-license"><a href="/bsd">BSD-3-Clause</a></div>"#,
        );
        assert_eq!(pkg.license, "MIT");
        assert_eq!(pkg.license_url, "https://example.com/MIT");
    }

    #[test]
    fn first_repository_link_wins() {
        let pkg = extract(
            r#"<div class="UnitMeta-repo"><a href=" ">blank</a></div>
               <div class="UnitMeta-repo"><a href="https://github.com/spf13/cobra">cobra</a></div>
               <div class="UnitMeta-repo"><a href="https://gitlab.com/mirror/cobra">mirror</a></div>"#,
        );
        assert_eq!(pkg.repository, "https://github.com/spf13/cobra");
    }

    #[test]
    fn latest_badge_requires_label_text() {
        let pkg = extract(r#"<span class="UnitHeader-badge--latest">Latest version</span>"#);
        assert!(pkg.is_latest);
        let pkg = extract(r#"<span class="UnitHeader-badge--latest">v2</span>"#);
        assert!(!pkg.is_latest);
    }

    #[test]
    fn missing_fields_stay_empty() {
        let pkg = extract("<html><body><p>nothing here</p></body></html>");
        assert_eq!(pkg, Package::default());
    }
}
