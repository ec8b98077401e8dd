//! Plain-text rendering of stored page HTML.
//!
//! Page content is whatever HTML the editor produced. The terminal surfaces
//! and search need readable text, so block boundaries become line breaks,
//! list items get a bullet, and every other tag is dropped.

use regex::Regex;
use std::sync::OnceLock;

fn block_end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)</(p|h[1-6]|li|blockquote|pre|tr|table|ul|ol|div)\s*>|<br\s*/?>")
            .expect("valid block regex")
    })
}

fn list_item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<li(\s[^>]*)?>").expect("valid list item regex"))
}

fn cell_end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</(td|th)\s*>").expect("valid cell regex"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"))
}

/// Convert editor HTML to plain text.
pub fn to_plain_text(html: &str) -> String {
    let text = list_item_re().replace_all(html, "- ");
    let text = cell_end_re().replace_all(&text, " | ");
    let text = block_end_re().replace_all(&text, "\n");
    let text = tag_re().replace_all(&text, "");
    let text = decode_entities(&text);

    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 || out.is_empty() {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim_end().to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        // Last, so "&amp;lt;" decodes to "&lt;" and not "<"
        .replace("&amp;", "&")
}
