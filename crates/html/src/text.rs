//! # Leading Text Extraction
//!
//! Writers put a short labeled block ("Title: ...", "Writer(s): ...") at the top of
//! each document. This module reduces the first few paragraphs of the export to plain
//! text lines so the block can be matched line by line.

use lazy_static::lazy_static;
use regex::Regex;

/// Number of paragraph chunks scanned for the metadata block.
pub const METADATA_PARAGRAPHS: usize = 6;

lazy_static! {
    static ref RE_HEAD: Regex = Regex::new(r"(?is)<head\b[^>]*>.*?</head\s*>").unwrap();
    static ref RE_STYLE_OR_SCRIPT: Regex =
        Regex::new(r"(?is)<(?:style|script)\b[^>]*>.*?</(?:style|script)\s*>").unwrap();
    static ref RE_PARAGRAPH_BOUNDARY: Regex = Regex::new(r"(?i)</p>\s*<p[^>]*>").unwrap();
    static ref RE_LINE_BREAK: Regex = Regex::new(r"(?i)<br\b[^>]*>").unwrap();
    static ref RE_TAG: Regex = Regex::new(r"<.*?>").unwrap();
}

/// Returns the trimmed, non-empty text lines of the first `max_paragraphs` paragraphs.
///
/// The last chunk holds whatever follows the final boundary, so text past the metadata
/// block can show up in it; callers match lines against labels and ignore the rest.
pub fn leading_text_lines(markup: &str, max_paragraphs: usize) -> Vec<String> {
    let without_head = RE_HEAD.replace_all(markup, "");
    let without_code = RE_STYLE_OR_SCRIPT.replace_all(&without_head, "");

    RE_PARAGRAPH_BOUNDARY
        .splitn(&without_code, max_paragraphs.max(1))
        .flat_map(|chunk| {
            let with_breaks = RE_LINE_BREAK.replace_all(chunk, "\n");
            let text = decode_entities(&RE_TAG.replace_all(&with_breaks, ""));
            text.trim()
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Decodes the handful of entities the exporter emits in running text.
pub fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
