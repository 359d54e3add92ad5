use std::fmt::{self, Write};

use crate::identifier::{DEFAULT_BASE_URL, package_url};
use crate::models::{Package, compute_hash};

use super::format_timestamp;

/// Render the raw-capture document for a package.
pub fn render_raw(pkg: &Package, raw_html: &str) -> String {
    let mut out = String::with_capacity(raw_html.len() + 512);
    // fmt::Write for String is infallible.
    let _ = write_raw(&mut out, pkg, raw_html);
    out
}

pub fn write_raw<W: Write>(w: &mut W, pkg: &Package, raw_html: &str) -> fmt::Result {
    writeln!(w, "=== RAW WEB SCRAPE DATA ===")?;
    writeln!(w, "Package: {}", pkg.name)?;
    writeln!(w, "Import Path: {}", pkg.import_path)?;
    writeln!(w, "Scraped At: {}", format_timestamp(pkg.scraped_at))?;
    writeln!(
        w,
        "Source URL: {}",
        package_url(DEFAULT_BASE_URL, &pkg.import_path)
    )?;
    if !raw_html.is_empty() {
        writeln!(w, "Content SHA-256: {}", compute_hash(raw_html))?;
    }
    writeln!(w, "================================\n")?;

    if raw_html.is_empty() {
        writeln!(w, "=== NO RAW CONTENT AVAILABLE ===")?;
        writeln!(w, "Raw HTML content was not captured during scraping.")?;
        writeln!(w, "===================================")
    } else {
        writeln!(w, "=== RAW HTML CONTENT ===")?;
        w.write_str(raw_html)?;
        writeln!(w, "\n=========================")
    }
}
