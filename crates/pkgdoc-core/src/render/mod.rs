//! Output encodings for scraped packages.
//!
//! Both renderers accept any [`Package`](crate::models::Package): absent data
//! is always the empty value, so every record is safe to render.

mod markdown;
mod raw;

pub use markdown::{render_markdown, write_markdown};
pub use raw::{render_raw, write_raw};

use chrono::{DateTime, Utc};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// `177680` → `"177,680"`.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
