use std::io::Write;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use pkgdoc_core::ScrapedPackage;
use pkgdoc_core::render::{render_markdown, render_raw};

/// Files written for one package.
#[derive(Debug)]
pub struct WrittenFiles {
    pub markdown: PathBuf,
    pub raw: PathBuf,
}

/// `<dir>/<import path>.md`. Import path separators become directories;
/// `.`/`..` segments are dropped so output never escapes `dir`.
pub fn markdown_path(dir: &Path, import_path: &str) -> PathBuf {
    dir.join(with_suffix(relative_stem(import_path), ".md"))
}

/// `<dir>/<import path>_raw.txt`.
pub fn raw_path(dir: &Path, import_path: &str) -> PathBuf {
    dir.join(with_suffix(relative_stem(import_path), "_raw.txt"))
}

fn relative_stem(import_path: &str) -> PathBuf {
    let stem: PathBuf = Path::new(import_path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();
    if stem.as_os_str().is_empty() {
        PathBuf::from("package")
    } else {
        stem
    }
}

// `yaml.v3` must stay `yaml.v3.md`, so this appends rather than setting an extension.
fn with_suffix(stem: PathBuf, suffix: &str) -> PathBuf {
    let mut s = stem.into_os_string();
    s.push(suffix);
    PathBuf::from(s)
}

/// Write the Markdown and raw renderings of a package under `dir`.
pub fn write_package(dir: &Path, scraped: &ScrapedPackage) -> Result<WrittenFiles> {
    let import_path = &scraped.package.import_path;
    let files = WrittenFiles {
        markdown: markdown_path(dir, import_path),
        raw: raw_path(dir, import_path),
    };

    write_file(&files.markdown, &render_markdown(&scraped.package))?;
    write_file(&files.raw, &render_raw(&scraped.package, &scraped.raw_html))?;
    Ok(files)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// Print the Markdown rendering of every package, separated by rules.
pub fn print_packages<W: Write>(out: &mut W, packages: &[ScrapedPackage]) -> Result<()> {
    for (i, scraped) in packages.iter().enumerate() {
        if i > 0 {
            writeln!(out, "\n---\n")?;
        }
        out.write_all(render_markdown(&scraped.package).as_bytes())?;
    }
    out.flush().context("Failed to flush stdout")
}

#[cfg(test)]
mod tests {
    use pkgdoc_core::models::{Package, PackageSource};

    use super::*;

    fn scraped(import_path: &str, raw_html: &str) -> ScrapedPackage {
        ScrapedPackage {
            package: Package {
                name: import_path.rsplit('/').next().unwrap_or_default().into(),
                import_path: import_path.into(),
                ..Package::default()
            },
            raw_html: raw_html.into(),
            source: PackageSource::Fetched,
        }
    }

    #[test]
    fn paths_follow_import_path() {
        let dir = Path::new("/out");
        assert_eq!(
            markdown_path(dir, "github.com/spf13/cobra"),
            PathBuf::from("/out/github.com/spf13/cobra.md")
        );
        assert_eq!(
            raw_path(dir, "gopkg.in/yaml.v3"),
            PathBuf::from("/out/gopkg.in/yaml.v3_raw.txt")
        );
    }

    #[test]
    fn paths_never_escape_output_dir() {
        let dir = Path::new("/out");
        assert_eq!(markdown_path(dir, "../../etc/passwd"), PathBuf::from("/out/etc/passwd.md"));
        assert_eq!(markdown_path(dir, "/abs/pkg"), PathBuf::from("/out/abs/pkg.md"));
        assert_eq!(markdown_path(dir, ".."), PathBuf::from("/out/package.md"));
    }

    #[test]
    fn writes_both_files_with_nested_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let files = write_package(tmp.path(), &scraped("github.com/spf13/cobra", "<html>x</html>")).unwrap();

        let md = std::fs::read_to_string(&files.markdown).unwrap();
        assert!(md.starts_with("# cobra package - github.com/spf13/cobra"));

        let raw = std::fs::read_to_string(&files.raw).unwrap();
        assert!(raw.starts_with("=== RAW WEB SCRAPE DATA ==="));
        assert!(raw.contains("<html>x</html>"));
        assert!(files.raw.ends_with("github.com/spf13/cobra_raw.txt"));
    }

    #[test]
    fn rewrite_overwrites_previous_output() {
        let tmp = tempfile::tempdir().unwrap();
        write_package(tmp.path(), &scraped("fmt", "<p>old</p>")).unwrap();
        let files = write_package(tmp.path(), &scraped("fmt", "<p>new</p>")).unwrap();

        let raw = std::fs::read_to_string(files.raw).unwrap();
        assert!(raw.contains("<p>new</p>"));
        assert!(!raw.contains("<p>old</p>"));
    }

    #[test]
    fn prints_packages_separated_by_rules() {
        let mut out = Vec::new();
        print_packages(&mut out, &[scraped("fmt", ""), scraped("os", "")]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("# fmt package - fmt"));
        assert!(text.contains("\n---\n"));
        assert!(text.contains("# os package - os"));
    }
}
