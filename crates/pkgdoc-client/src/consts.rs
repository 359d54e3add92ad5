use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> =
            LazyLock::new(|| Selector::parse($css).expect(concat!("invalid selector ", stringify!($name))));
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($regex).expect(concat!("invalid regex ", stringify!($name))));
    };
}

pub(crate) const SITE_ORIGIN: &str = "https://pkg.go.dev";

// Page header.
selector!(TITLE, "title");
selector!(TITLE_HEADING, "h1.UnitHeader-titleHeading");
selector!(BREADCRUMB_CURRENT, ".UnitHeader-breadcrumbCurrent");
selector!(
    MODULE_LINK,
    "[data-test-id='UnitHeader-module'] a, a[data-test-id='UnitHeader-module']"
);
selector!(META_MODULE_LINK, ".UnitMeta-module a");
selector!(VERSION_ARIA, "a[aria-label^='Version: ']");
selector!(VERSION_TEXT, "[data-test-id='UnitHeader-version'] a");
selector!(
    LATEST_BADGE,
    ".DetailsHeader-badge--latest, .UnitHeader-badge--latest, .DetailsHeader-span--latest"
);
selector!(COMMIT_TIME, "[data-test-id='UnitHeader-commitTime']");
selector!(
    LICENSE_LINK,
    "a[data-test-id='UnitHeader-license'], [data-test-id='UnitHeader-licenses'] a, .UnitHeader-license a"
);
selector!(IMPORTS_LINK, "[data-test-id='UnitHeader-imports'] a");
selector!(IMPORTED_BY_LINK, "[data-test-id='UnitHeader-importedby'] a");
selector!(REPO_LINK, ".UnitMeta-repo a");
selector!(META_DESCRIPTION, "meta[name='description']");

// Overview and README.
selector!(OVERVIEW_PARAGRAPH, ".Documentation-overview p");
selector!(README_CONTENT, ".UnitReadme-content .Overview-readmeContent");
selector!(OVERVIEW_EXAMPLE, ".Documentation-overview .Documentation-exampleDetails");

// Declarations.
selector!(CONSTANT_BLOCK, ".Documentation-constants .Documentation-declaration");
selector!(VARIABLE_BLOCK, ".Documentation-variables .Documentation-declaration");
selector!(DECLARATION_CLASS, ".Documentation-declaration");
selector!(CONSTANT_NAME, "span[id][data-kind='constant']");
selector!(VARIABLE_NAME, "span[id][data-kind='variable']");
selector!(FUNCTION_BLOCK, ".Documentation-functions .Documentation-function");
selector!(TYPE_BLOCK, ".Documentation-types .Documentation-type");
selector!(TYPE_METHOD, ".Documentation-typeMethod");
selector!(TYPE_FUNC, ".Documentation-typeFunc");
selector!(DECLARATION_PRE, ".Documentation-declaration pre");
selector!(HEADER, "h4");
selector!(PRE, "pre");
selector!(PARAGRAPH, "p");
selector!(SINCE_VERSION, ".Documentation-sinceVersionVersion");
selector!(SINCE, ".Documentation-sinceVersion");
selector!(DEPRECATED_TAG, ".Documentation-deprecatedTag");

// Examples.
selector!(EXAMPLE, ".Documentation-exampleDetails");
selector!(EXAMPLE_HEADER, ".Documentation-exampleDetailsHeader, summary");
selector!(EXAMPLE_CODE, ".Documentation-exampleCode");
selector!(EXAMPLE_OUTPUT, ".Documentation-exampleOutput");

// Containment boundaries: matches nested inside these never belong to the
// enclosing block.
selector!(TYPE_BOUNDARY, ".Documentation-typeFunc, .Documentation-typeMethod, .Documentation-exampleDetails");

// Declaration text.
regex!(FUNC_NAME_REGEX, r"^func\s*(?:\([^)]*\)\s*)?([A-Za-z_]\w*)");
regex!(RECEIVER_REGEX, r"^func\s*\(\s*(?:[A-Za-z_]\w*\s+)?([^)]+?)\s*\)");
regex!(TYPE_HEAD_REGEX, r"^type\s+([A-Za-z_]\w*)(?:\[[^\]]*\])?\s*(=)?\s*([A-Za-z_]\w*)?");
regex!(CONST_HEAD_REGEX, r"^const\s+([A-Za-z_]\w*)(?:\s+([^=]+?))?\s*=");
regex!(VAR_HEAD_REGEX, r"^var\s+([A-Za-z_]\w*)");

// Markdown reduction, applied in this order.
regex!(PRE_CODE_REGEX, r"(?is)<pre[^>]*>\s*<code([^>]*)>(.*?)</code>\s*</pre>");
regex!(LANGUAGE_REGEX, r"(?i)language-([\w+-]+)");
regex!(HEADING_REGEX, r"(?is)<h([1-6])(?:\s[^>]*)?>(.*?)</h([1-6])\s*>");
regex!(ANCHOR_REGEX, r#"(?is)<a[^>]*\shref="([^"]+)"[^>]*>(.*?)</a>"#);
regex!(IMG_ALT_SRC_REGEX, r#"(?is)<img[^>]*\salt="([^"]*)"[^>]*\ssrc="([^"]+)"[^>]*/?>"#);
regex!(IMG_SRC_ALT_REGEX, r#"(?is)<img[^>]*\ssrc="([^"]+)"[^>]*\salt="([^"]*)"[^>]*/?>"#);
regex!(IMG_SRC_REGEX, r#"(?is)<img[^>]*\ssrc="([^"]+)"[^>]*/?>"#);
regex!(INLINE_CODE_REGEX, r"(?is)<code(?:\s[^>]*)?>(.*?)</code>");
regex!(
    BLOCK_TAG_REGEX,
    r"(?i)<(/?)(p|br|strong|b|em|i|ul|ol|li|blockquote|hr)(?:\s[^>]*)?\s*/?>"
);
regex!(ANY_TAG_REGEX, r"(?s)<[A-Za-z/!][^<>]*>");
regex!(BLANK_RUN_REGEX, r"\n{3,}");
