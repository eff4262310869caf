//! URL slug helpers.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_SLUG_DISALLOWED: Regex = Regex::new(r"[^a-zA-Z0-9_\s-]").unwrap();
    static ref RE_SLUG_SEPARATORS: Regex = Regex::new(r"[-\s]+").unwrap();
}

/// Converts free text into an ASCII, lowercase, hyphen-separated slug.
///
/// Characters outside ASCII letters, digits, `_`, `-` and whitespace are dropped, so
/// `"Café & Co."` becomes `"caf-co"`.
pub fn slugify(text: &str) -> String {
    let kept = RE_SLUG_DISALLOWED.replace_all(text, "");
    let lowered = kept.to_lowercase();
    RE_SLUG_SEPARATORS
        .replace_all(lowered.trim(), "-")
        .trim_matches(|c| c == '-' || c == '_')
        .to_string()
}

/// Truncates to at most `max_chars` characters, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
