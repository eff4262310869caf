//! # Metadata Block Parsing
//!
//! Reads labeled lines such as `Title: ...` and `Writer(s): ...` from the first
//! paragraphs of an exported document.

use crate::types::{DateValue, ParsedMetadata};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use newsletter_html::{leading_text_lines, METADATA_PARAGRAPHS};
use regex::Regex;
use tracing::{debug, warn};

/// Format of the `Date:` line, e.g. `9/3/24`.
pub const METADATA_DATE_FORMAT: &str = "%m/%d/%y";

/// Stores a captured value. Returns `false` to treat the line as unmatched.
type Setter = fn(&mut ParsedMetadata, &str) -> bool;

struct LabelRule {
    pattern: &'static Regex,
    set: Setter,
}

lazy_static! {
    static ref RE_TITLE: Regex = Regex::new(r"(?i)^Title:\s*(.+)$").unwrap();
    static ref RE_WRITER: Regex = Regex::new(r"(?i)^Writer\(s\):\s*(.+)$").unwrap();
    static ref RE_DATE: Regex = Regex::new(r"(?i)^Date:\s*(.+)$").unwrap();
    static ref RE_ISSUE: Regex = Regex::new(r"(?i)^Issue:\s*(\d+)$").unwrap();
    static ref RE_TYPE: Regex = Regex::new(r"(?i)^Type of Article:\s*(.+)$").unwrap();

    /// Tried in order; the first rule that accepts a line wins.
    static ref LABEL_RULES: [LabelRule; 5] = [
        LabelRule { pattern: &RE_TITLE, set: set_title },
        LabelRule { pattern: &RE_WRITER, set: set_writer },
        LabelRule { pattern: &RE_DATE, set: set_date },
        LabelRule { pattern: &RE_ISSUE, set: set_issue },
        LabelRule { pattern: &RE_TYPE, set: set_article_type },
    ];
}

fn set_title(meta: &mut ParsedMetadata, value: &str) -> bool {
    meta.title = Some(value.to_string());
    true
}

fn set_writer(meta: &mut ParsedMetadata, value: &str) -> bool {
    meta.writer = Some(value.to_string());
    true
}

fn set_date(meta: &mut ParsedMetadata, value: &str) -> bool {
    meta.date = Some(match NaiveDate::parse_from_str(value, METADATA_DATE_FORMAT) {
        Ok(date) => DateValue::Date(date),
        Err(_) => {
            warn!("Could not parse date '{value}', keeping the raw text.");
            meta.warnings
                .push(format!("Could not parse date '{value}'."));
            DateValue::Raw(value.to_string())
        }
    });
    true
}

fn set_issue(meta: &mut ParsedMetadata, value: &str) -> bool {
    match value.parse::<u32>() {
        Ok(issue) => {
            meta.issue_number = Some(issue);
            true
        }
        Err(_) => false,
    }
}

fn set_article_type(meta: &mut ParsedMetadata, value: &str) -> bool {
    meta.article_type = Some(value.to_string());
    true
}

/// Parses the metadata block at the top of an exported document.
///
/// Never fails: lines that match no label are skipped, and a document without a
/// metadata block yields an empty record. When a label appears twice the later line wins.
pub fn parse_metadata(markup: &str) -> ParsedMetadata {
    let mut meta = ParsedMetadata::default();

    for line in leading_text_lines(markup, METADATA_PARAGRAPHS) {
        for rule in LABEL_RULES.iter() {
            let Some(value) = rule.pattern.captures(&line).and_then(|c| c.get(1)) else {
                continue;
            };
            if (rule.set)(&mut meta, value.as_str()) {
                break;
            }
        }
    }

    debug!(?meta, "Parsed document metadata");
    meta
}
