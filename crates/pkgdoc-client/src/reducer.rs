use std::borrow::Cow;

use pkgdoc_core::traits::Cleaner;
use regex::Captures;

use crate::consts::{
    ANCHOR_REGEX, ANY_TAG_REGEX, BLANK_RUN_REGEX, BLOCK_TAG_REGEX, HEADING_REGEX,
    IMG_ALT_SRC_REGEX, IMG_SRC_ALT_REGEX, IMG_SRC_REGEX, INLINE_CODE_REGEX, LANGUAGE_REGEX,
    PRE_CODE_REGEX,
};

/// Entity table. `&amp;` goes last so `&amp;lt;` survives one pass as `&lt;`.
const ENTITIES: &[(&str, &str)] = &[
    ("&quot;", "\""),
    ("&#34;", "\""),
    ("&apos;", "'"),
    ("&#39;", "'"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&nbsp;", " "),
    ("&amp;", "&"),
];

/// Best-effort HTML-to-Markdown reducer for README fragments.
///
/// A fixed sequence of regex rewrites, not a parser: headings, links, images,
/// code, emphasis and list markers survive, everything else is stripped.
/// Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownReducer;

impl MarkdownReducer {
    pub fn new() -> Self {
        Self
    }

    pub fn reduce(&self, html: &str) -> String {
        if html.trim().is_empty() || !looks_like_markup(html) {
            return html.to_string();
        }

        let text = html.replace("\r\n", "\n");
        let text = unescape_entities(&text);
        let text = PRE_CODE_REGEX.replace_all(&text, fence_code_block);
        let text = HEADING_REGEX.replace_all(&text, |caps: &Captures| {
            if caps[1] != caps[3] {
                return caps[0].to_string();
            }
            let level = caps[1].parse::<usize>().unwrap_or(1);
            format!("{} {}\n\n", "#".repeat(level), &caps[2])
        });
        let text = ANCHOR_REGEX.replace_all(&text, "[$2]($1)");
        let text = IMG_ALT_SRC_REGEX.replace_all(&text, "![$1]($2)");
        let text = IMG_SRC_ALT_REGEX.replace_all(&text, "![$2]($1)");
        let text = IMG_SRC_REGEX.replace_all(&text, "![]($1)");
        let text = INLINE_CODE_REGEX.replace_all(&text, "`$1`");
        let text = BLOCK_TAG_REGEX.replace_all(&text, |caps: &Captures| {
            block_tag_markdown(&caps[2], !caps[1].is_empty())
        });
        let text = ANY_TAG_REGEX.replace_all(&text, "");
        let text = unescape_entities(&text);
        let text = BLANK_RUN_REGEX.replace_all(&text, "\n\n");

        text.trim().to_string()
    }
}

impl Cleaner for MarkdownReducer {
    fn clean(&self, html: &str) -> String {
        self.reduce(html)
    }
}

fn looks_like_markup(s: &str) -> bool {
    ENTITIES.iter().any(|(entity, _)| s.contains(entity)) || ANY_TAG_REGEX.is_match(s)
}

fn unescape_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    let mut out = s.to_string();
    for (entity, replacement) in ENTITIES {
        if out.contains(entity) {
            out = out.replace(entity, replacement);
        }
    }
    Cow::Owned(out)
}

fn fence_code_block(caps: &Captures) -> String {
    let lang = LANGUAGE_REGEX
        .captures(&caps[1])
        .map(|c| c[1].to_ascii_lowercase())
        .unwrap_or_default();
    let code = unescape_entities(&caps[2]);
    format!("```{lang}\n{code}\n```\n\n")
}

fn block_tag_markdown(tag: &str, closing: bool) -> &'static str {
    match (tag.to_ascii_lowercase().as_str(), closing) {
        ("p", false) => "\n",
        ("p", true) => "\n\n",
        ("br", _) => "\n",
        ("strong" | "b", _) => "**",
        ("em" | "i", _) => "*",
        ("ul" | "ol", _) => "\n",
        ("li", false) => "- ",
        ("li", true) => "\n",
        ("blockquote", false) => "> ",
        ("blockquote", true) => "\n",
        ("hr", _) => "\n---\n",
        _ => "",
    }
}
