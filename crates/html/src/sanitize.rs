//! # Export Sanitizer
//!
//! The exported page carries a full document skeleton, a generated stylesheet and
//! inline styling on nearly every element. This module strips that scaffolding while
//! keeping emphasis, alignment and the footnote structure readers rely on.
//!
//! The work is split into [`SANITIZE_STEPS`], an ordered list of small pure functions.
//! Order matters: emphasis spans must be converted before style attributes are
//! dropped, and footnote ids must be normalized before the id filter runs.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::trace;

/// Ids starting with this prefix belong to footnote anchors (`ftnt1`, `ftnt_ref1`).
pub const FOOTNOTE_ID_PREFIX: &str = "ftnt";

lazy_static! {
    static ref RE_DOCTYPE: Regex = Regex::new(r"(?i)\A\s*<!DOCTYPE[^>]*>").unwrap();
    static ref RE_STYLE_BLOCK: Regex = Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").unwrap();
    static ref RE_DOCUMENT_TAG: Regex = Regex::new(r"(?i)</?(?:html|head)\b[^>]*>").unwrap();
    static ref RE_META_TAG: Regex = Regex::new(r"(?i)<meta\b[^>]*>").unwrap();
    static ref RE_BODY: Regex = Regex::new(r"(?is)<body\b[^>]*>(.*)</body\s*>").unwrap();

    static ref RE_SPAN: Regex = Regex::new(r"(?is)<span\b([^>]*)>(.*?)</span\s*>").unwrap();
    static ref RE_STYLE_VALUE: Regex = Regex::new(r#"(?i)\bstyle\s*=\s*"([^"]*)""#).unwrap();
    static ref RE_ITALIC: Regex = Regex::new(r"(?i)font-style\s*:\s*italic").unwrap();
    static ref RE_BOLD: Regex = Regex::new(r"(?i)font-weight\s*:\s*(?:700|bold)\b").unwrap();

    static ref RE_STYLE_ATTR: Regex = Regex::new(r#"(?i)\s+style\s*=\s*"([^"]*)""#).unwrap();
    static ref RE_TEXT_ALIGN: Regex = Regex::new(r#"(?i)text-align\s*:\s*[^;"]+"#).unwrap();
    static ref RE_CLASS_ATTR: Regex = Regex::new(r#"(?i)\s+class\s*=\s*"[^"]*""#).unwrap();
    static ref RE_ID_ATTR: Regex = Regex::new(r#"(?i)\s+id\s*=\s*"([^"]*)""#).unwrap();

    static ref RE_SUP_LINK_REF: Regex =
        Regex::new(r"(?is)<sup>\s*<a\b([^>]*)>\s*\[(\d+)\]\s*</a>\s*</sup>").unwrap();
    static ref RE_SUP_BARE_REF: Regex = Regex::new(r"(?i)<sup>\s*\[(\d+)\]\s*</sup>").unwrap();
    static ref RE_ANCHOR_REF: Regex = Regex::new(r"(?is)<a\b([^>]*)>\s*\[(\d+)\]\s*</a>").unwrap();

    static ref RE_RULE: Regex = Regex::new(r"(?i)<hr\b[^>]*>").unwrap();
    static ref RE_EMPTY_ELEMENT: Regex =
        Regex::new(r"<([a-zA-Z][a-zA-Z0-9]*)\b[^>]*>\s*</([a-zA-Z][a-zA-Z0-9]*)\s*>").unwrap();
    static ref RE_BLANK_LINES: Regex = Regex::new(r"(?:[ \t]*\r?\n){3,}").unwrap();
    static ref RE_PARAGRAPH_OPEN_SPACE: Regex = Regex::new(r"(?i)(<p\b[^>]*>)\s+").unwrap();
    static ref RE_PARAGRAPH_CLOSE_SPACE: Regex = Regex::new(r"(?i)\s+(</p\s*>)").unwrap();
}

/// A named transformation in the sanitize pipeline.
#[derive(Clone, Copy)]
pub struct SanitizeStep {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

impl std::fmt::Debug for SanitizeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SanitizeStep")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The sanitize pipeline, in the order it must run.
pub const SANITIZE_STEPS: [SanitizeStep; 15] = [
    SanitizeStep { name: "strip_doctype", apply: strip_doctype },
    SanitizeStep { name: "strip_style_blocks", apply: strip_style_blocks },
    SanitizeStep { name: "strip_document_tags", apply: strip_document_tags },
    SanitizeStep { name: "strip_meta_tags", apply: strip_meta_tags },
    SanitizeStep { name: "unwrap_body", apply: unwrap_body },
    SanitizeStep { name: "convert_emphasis_spans", apply: convert_emphasis_spans },
    SanitizeStep { name: "strip_style_attributes", apply: strip_style_attributes },
    SanitizeStep { name: "strip_class_attributes", apply: strip_class_attributes },
    SanitizeStep { name: "normalize_footnote_refs", apply: normalize_footnote_refs },
    SanitizeStep { name: "strip_id_attributes", apply: strip_id_attributes },
    SanitizeStep { name: "wrap_footnotes", apply: wrap_footnotes },
    SanitizeStep { name: "remove_empty_elements", apply: remove_empty_elements },
    SanitizeStep { name: "collapse_blank_lines", apply: collapse_blank_lines },
    SanitizeStep { name: "trim_paragraphs", apply: trim_paragraphs },
    SanitizeStep { name: "normalize_rules", apply: normalize_rules },
];

/// Runs every step of [`SANITIZE_STEPS`] over the exported markup.
///
/// Deterministic and infallible: malformed input simply comes out less tidy.
pub fn sanitize(markup: &str) -> String {
    SANITIZE_STEPS
        .iter()
        .fold(markup.to_string(), |current, step| {
            let next = (step.apply)(&current);
            trace!(step = step.name, before = current.len(), after = next.len());
            next
        })
}

/// Removes a leading `<!DOCTYPE ...>` declaration.
pub fn strip_doctype(markup: &str) -> String {
    RE_DOCTYPE.replace(markup, "").into_owned()
}

/// Removes embedded `<style>` blocks together with their content.
pub fn strip_style_blocks(markup: &str) -> String {
    RE_STYLE_BLOCK.replace_all(markup, "").into_owned()
}

/// Removes `<html>` and `<head>` open/close tags, leaving anything between them.
pub fn strip_document_tags(markup: &str) -> String {
    RE_DOCUMENT_TAG.replace_all(markup, "").into_owned()
}

pub fn strip_meta_tags(markup: &str) -> String {
    RE_META_TAG.replace_all(markup, "").into_owned()
}

/// Keeps only what sits between `<body ...>` and `</body>`.
///
/// Markup without a body element is returned unchanged.
pub fn unwrap_body(markup: &str) -> String {
    match RE_BODY.captures(markup) {
        Some(caps) => caps[1].to_string(),
        None => markup.to_string(),
    }
}

/// Rewrites inline-styled spans as `<em>` / `<strong>`.
///
/// Spans whose style declares neither italic nor bold weight are left alone; the
/// style-attribute pass takes care of them.
pub fn convert_emphasis_spans(markup: &str) -> String {
    RE_SPAN
        .replace_all(markup, |caps: &Captures| {
            let style = RE_STYLE_VALUE
                .captures(&caps[1])
                .map(|c| c[1].to_string())
                .unwrap_or_default();
            let italic = RE_ITALIC.is_match(&style);
            let bold = RE_BOLD.is_match(&style);
            let inner = &caps[2];
            match (italic, bold) {
                (true, true) => format!("<strong><em>{inner}</em></strong>"),
                (true, false) => format!("<em>{inner}</em>"),
                (false, true) => format!("<strong>{inner}</strong>"),
                (false, false) => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Drops `style` attributes, keeping a `text-align` declaration when there is one.
pub fn strip_style_attributes(markup: &str) -> String {
    RE_STYLE_ATTR
        .replace_all(markup, |caps: &Captures| match RE_TEXT_ALIGN.find(&caps[1]) {
            Some(align) => format!(r#" style="{}""#, align.as_str().trim()),
            None => String::new(),
        })
        .into_owned()
}

pub fn strip_class_attributes(markup: &str) -> String {
    RE_CLASS_ATTR.replace_all(markup, "").into_owned()
}

/// Drops the square brackets Google Docs puts around footnote numbers.
///
/// Link targets and anchor attributes are kept, so `<sup><a href="#ftnt3">[3]</a></sup>`
/// becomes `<sup><a href="#ftnt3">3</a></sup>`.
pub fn normalize_footnote_refs(markup: &str) -> String {
    let linked = RE_SUP_LINK_REF.replace_all(markup, "<sup><a${1}>${2}</a></sup>");
    let bare = RE_SUP_BARE_REF.replace_all(&linked, "<sup>${1}</sup>");
    RE_ANCHOR_REF
        .replace_all(&bare, "<a${1}>${2}</a>")
        .into_owned()
}

/// Drops every `id` attribute except footnote anchors.
pub fn strip_id_attributes(markup: &str) -> String {
    RE_ID_ATTR
        .replace_all(markup, |caps: &Captures| {
            if caps[1].starts_with(FOOTNOTE_ID_PREFIX) {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

/// Wraps everything from the first horizontal rule to the end in a footnotes container.
pub fn wrap_footnotes(markup: &str) -> String {
    match RE_RULE.find(markup) {
        Some(rule) => {
            let (body, notes) = markup.split_at(rule.start());
            format!(r#"{body}<div class="footnotes">{notes}</div>"#)
        }
        None => markup.to_string(),
    }
}

/// Removes `<tag ...></tag>` pairs with nothing but whitespace inside.
///
/// Repeats until nothing changes, so `<p><span> </span></p>` disappears entirely.
pub fn remove_empty_elements(markup: &str) -> String {
    let mut current = markup.to_string();
    loop {
        let next = RE_EMPTY_ELEMENT
            .replace_all(&current, |caps: &Captures| {
                if caps[1].eq_ignore_ascii_case(&caps[2]) {
                    String::new()
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Collapses runs of three or more line breaks into exactly two.
pub fn collapse_blank_lines(markup: &str) -> String {
    RE_BLANK_LINES.replace_all(markup, "\n\n").into_owned()
}

/// Trims whitespace just inside `<p>` and `</p>`.
pub fn trim_paragraphs(markup: &str) -> String {
    let opened = RE_PARAGRAPH_OPEN_SPACE.replace_all(markup, "${1}");
    RE_PARAGRAPH_CLOSE_SPACE
        .replace_all(&opened, "${1}")
        .into_owned()
}

/// Rewrites every horizontal rule as a bare `<hr>`.
pub fn normalize_rules(markup: &str) -> String {
    RE_RULE.replace_all(markup, "<hr>").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_doctype_only_when_leading() {
        assert_eq!(strip_doctype("<!DOCTYPE html><p>a</p>"), "<p>a</p>");
        assert_eq!(strip_doctype("  <!doctype html>\n<p>a</p>"), "\n<p>a</p>");
        assert_eq!(
            strip_doctype("<p>a</p><!DOCTYPE html>"),
            "<p>a</p><!DOCTYPE html>"
        );
    }

    #[test]
    fn test_strip_style_blocks_spans_lines() {
        let input = "<head><style type=\"text/css\">\n.c1{color:red}\n</style></head>";
        assert_eq!(strip_style_blocks(input), "<head></head>");
    }

    #[test]
    fn test_strip_document_tags_keeps_head_content_and_header() {
        let input = "<html><head><title>T</title></head><header>h</header></html>";
        assert_eq!(
            strip_document_tags(input),
            "<title>T</title><header>h</header>"
        );
    }

    #[test]
    fn test_strip_meta_tags() {
        let input = r#"<meta content="text/html; charset=UTF-8" http-equiv="content-type"><p>x</p>"#;
        assert_eq!(strip_meta_tags(input), "<p>x</p>");
    }

    #[test]
    fn test_unwrap_body() {
        assert_eq!(
            unwrap_body(r#"<title>T</title><body class="c4 doc-content"><p>x</p></body>"#),
            "<p>x</p>"
        );
        assert_eq!(unwrap_body("<p>no body</p>"), "<p>no body</p>");
    }

    #[test]
    fn test_convert_emphasis_spans() {
        assert_eq!(
            convert_emphasis_spans(r#"<span style="font-style:italic">hi</span>"#),
            "<em>hi</em>"
        );
        assert_eq!(
            convert_emphasis_spans(r#"<span style="color:#000;font-weight:700">b</span>"#),
            "<strong>b</strong>"
        );
        assert_eq!(
            convert_emphasis_spans(r#"<span style="font-weight: bold; font-style: italic">x</span>"#),
            "<strong><em>x</em></strong>"
        );
        let plain = r#"<span style="font-weight:400">p</span>"#;
        assert_eq!(convert_emphasis_spans(plain), plain);
    }

    #[test]
    fn test_strip_style_attributes_keeps_text_align() {
        assert_eq!(
            strip_style_attributes(r#"<p style="margin:0;text-align:center;color:red">x</p>"#),
            r#"<p style="text-align:center">x</p>"#
        );
        assert_eq!(
            strip_style_attributes(r#"<span style="color:red">x</span>"#),
            "<span>x</span>"
        );
    }

    #[test]
    fn test_strip_class_attributes() {
        assert_eq!(
            strip_class_attributes(r#"<p class="c1 c2"><span class="c0">x</span></p>"#),
            "<p><span>x</span></p>"
        );
    }

    #[test]
    fn test_normalize_footnote_refs() {
        assert_eq!(
            normalize_footnote_refs(r##"<sup><a href="#x">[3]</a></sup>"##),
            r##"<sup><a href="#x">3</a></sup>"##
        );
        assert_eq!(normalize_footnote_refs("<sup>[12]</sup>"), "<sup>12</sup>");
        assert_eq!(
            normalize_footnote_refs(r##"<a href="#ftnt_ref1" id="ftnt1">[1]</a>"##),
            r##"<a href="#ftnt_ref1" id="ftnt1">1</a>"##
        );
        assert_eq!(
            normalize_footnote_refs("<p>see [4] above</p>"),
            "<p>see [4] above</p>"
        );
    }

    #[test]
    fn test_strip_id_attributes_keeps_footnote_anchors() {
        assert_eq!(
            strip_id_attributes(r##"<h1 id="h.abc">T</h1><a href="#ftnt1" id="ftnt_ref1">1</a>"##),
            r##"<h1>T</h1><a href="#ftnt1" id="ftnt_ref1">1</a>"##
        );
    }

    #[test]
    fn test_wrap_footnotes_from_first_rule() {
        assert_eq!(
            wrap_footnotes("<p>a</p><hr class=\"x\"><div>n1</div><hr><div>n2</div>"),
            "<p>a</p><div class=\"footnotes\"><hr class=\"x\"><div>n1</div><hr><div>n2</div></div>"
        );
        assert_eq!(wrap_footnotes("<p>a</p>"), "<p>a</p>");
    }

    #[test]
    fn test_remove_empty_elements_nested() {
        assert_eq!(
            remove_empty_elements("<p>a</p><p><span> </span></p><div>\n</div>"),
            "<p>a</p>"
        );
        assert_eq!(remove_empty_elements("<b></i>"), "<b></i>");
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n  \n\t\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_trim_paragraphs_leaves_pre_alone() {
        assert_eq!(
            trim_paragraphs("<p style=\"text-align:center\">  x \n</p><pre>  y</pre>"),
            "<p style=\"text-align:center\">x</p><pre>  y</pre>"
        );
    }

    #[test]
    fn test_normalize_rules() {
        assert_eq!(normalize_rules(r#"<hr style="x"/><hr>"#), "<hr><hr>");
    }

    #[test]
    fn test_steps_are_in_documented_order() {
        let names: Vec<&str> = SANITIZE_STEPS.iter().map(|s| s.name).collect();
        assert_eq!(names.first(), Some(&"strip_doctype"));
        let emphasis = names.iter().position(|n| *n == "convert_emphasis_spans");
        let styles = names.iter().position(|n| *n == "strip_style_attributes");
        assert!(emphasis < styles);
        let footnotes = names.iter().position(|n| *n == "normalize_footnote_refs");
        let ids = names.iter().position(|n| *n == "strip_id_attributes");
        assert!(footnotes < ids);
        assert_eq!(names.last(), Some(&"normalize_rules"));
    }
}
