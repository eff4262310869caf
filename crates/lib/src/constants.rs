//! # Shared Constants
//!
//! Limits and placeholder values shared by the store, the importer and the server.

/// The default path for the main application SQLite database.
pub const DEFAULT_DB_FILE: &str = "db/newsletter.db";

/// Maximum length, in characters, of an article's `short_title` slug.
pub const SHORT_TITLE_MAX_LEN: usize = 100;

/// Maximum length, in characters, of an author's slug.
pub const AUTHOR_SLUG_MAX_LEN: usize = 255;

/// Slug given to articles that have neither a short title nor a title.
pub const UNTITLED_SLUG: &str = "untitled";
