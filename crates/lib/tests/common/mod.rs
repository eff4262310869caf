#![allow(dead_code)]
//! # Common Test Utilities

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the tracing subscriber once per test binary.
pub fn setup_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt().with_test_writer().init();
    });
}

/// An export shaped like Google Docs output: a head with styles, a metadata block, a body
/// paragraph with a footnote marker and a footnote section after a rule.
pub fn exported_doc(title: &str, writer: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html><html><head><meta content=\"text/html; charset=UTF-8\" http-equiv=\"content-type\">",
            "<style type=\"text/css\">.c1{{font-weight:700}}</style></head>",
            "<body class=\"c4 doc-content\">",
            "<p class=\"c2\"><span class=\"c1\">Title: {title}</span></p>",
            "<p class=\"c2\"><span>Writer(s): {writer}</span></p>",
            "<p class=\"c2\"><span>Date: 9/3/24</span></p>",
            "<p class=\"c2\"><span>Issue: 4</span></p>",
            "<p class=\"c2\"><span>Type of Article: Feature</span></p>",
            "<p class=\"c2\"><span style=\"font-style:italic\">Once</span><span> upon a time.</span>",
            "<sup><a href=\"#ftnt1\" id=\"ftnt_ref1\">[1]</a></sup></p>",
            "<hr class=\"c5\"><div><p class=\"c3\"><a href=\"#ftnt_ref1\" id=\"ftnt1\">[1]</a>",
            "<span> A source.</span></p></div></body></html>"
        ),
        title = title,
        writer = writer
    )
}
