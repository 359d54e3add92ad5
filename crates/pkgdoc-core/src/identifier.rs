//! Package identifier normalisation.

use crate::error::AppError;

/// Documentation host all identifiers are resolved against.
pub const DEFAULT_BASE_URL: &str = "https://pkg.go.dev";

/// Normalise user input into a bare import path.
///
/// Accepts either an import path (`github.com/spf13/cobra`) or a full page
/// URL (`https://pkg.go.dev/github.com/spf13/cobra/`). Surrounding whitespace
/// and trailing slashes are removed. Only an empty result is rejected; any
/// other malformed path is left for the fetch to fail on.
pub fn normalize_identifier(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    let path = trimmed
        .strip_prefix("https://pkg.go.dev/")
        .or_else(|| trimmed.strip_prefix("http://pkg.go.dev/"))
        .or_else(|| trimmed.strip_prefix("pkg.go.dev/"))
        .unwrap_or(trimmed)
        .trim_end_matches('/');

    if path.is_empty() {
        return Err(AppError::InvalidIdentifier(raw.to_string()));
    }
    Ok(path.to_string())
}

/// Build the documentation page URL for a normalised identifier.
pub fn package_url(base_url: &str, identifier: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_import_path_is_kept() {
        assert_eq!(
            normalize_identifier("github.com/spf13/cobra").unwrap(),
            "github.com/spf13/cobra"
        );
    }

    #[test]
    fn page_url_is_stripped() {
        assert_eq!(
            normalize_identifier("https://pkg.go.dev/github.com/spf13/cobra/").unwrap(),
            "github.com/spf13/cobra"
        );
        assert_eq!(normalize_identifier("  pkg.go.dev/fmt ").unwrap(), "fmt");
    }

    #[test]
    fn blank_identifiers_are_rejected() {
        assert!(matches!(
            normalize_identifier("   "),
            Err(AppError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            normalize_identifier("https://pkg.go.dev/"),
            Err(AppError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn inner_whitespace_is_passed_through() {
        assert_eq!(
            normalize_identifier(" github.com/a b ").unwrap(),
            "github.com/a b"
        );
    }

    #[test]
    fn package_url_joins_without_double_slash() {
        assert_eq!(
            package_url("https://pkg.go.dev/", "fmt"),
            "https://pkg.go.dev/fmt"
        );
        assert_eq!(
            package_url("http://127.0.0.1:9000", "github.com/a/b"),
            "http://127.0.0.1:9000/github.com/a/b"
        );
    }
}
