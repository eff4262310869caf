//! # SQLite Schema and Queries
//!
//! This module centralizes SQL strings for the SQLite provider so the record stores stay
//! free of schema details.

/// Columns of the `articles` table in the order `articles::article_from_row` reads them.
///
/// Qualified with the table name so the list can be used in joins.
pub const ARTICLE_COLUMNS: &str = "articles.id, articles.title, articles.writer, \
    articles.date, articles.volume_number, articles.issue_number, articles.short_title, \
    articles.preview_text, articles.article_type, articles.doc_url, articles.doc_id, \
    articles.content_html, articles.is_current_issue, articles.display_order, \
    articles.created_at, articles.updated_at";

/// Columns of the `authors` table in the order `authors::author_from_row` reads them.
pub const AUTHOR_COLUMNS: &str =
    "authors.id, authors.name, authors.slug, authors.role, authors.bio";

pub const CREATE_AUTHORS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS authors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        slug TEXT NOT NULL UNIQUE,
        role TEXT NOT NULL DEFAULT 'contributor',
        bio TEXT NOT NULL DEFAULT ''
    );
";

pub const CREATE_ARTICLES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL DEFAULT '',
        writer TEXT NOT NULL DEFAULT '',
        date TEXT,
        volume_number INTEGER NOT NULL DEFAULT 1,
        issue_number INTEGER NOT NULL DEFAULT 1,
        short_title TEXT NOT NULL,
        preview_text TEXT NOT NULL DEFAULT '',
        article_type TEXT NOT NULL DEFAULT 'news',
        doc_url TEXT NOT NULL DEFAULT '',
        doc_id TEXT,
        content_html TEXT NOT NULL DEFAULT '',
        is_current_issue INTEGER NOT NULL DEFAULT 0,
        display_order INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
";

pub const CREATE_ARTICLE_AUTHORS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS article_authors (
        article_id INTEGER NOT NULL,
        author_id INTEGER NOT NULL
    );
";

pub const CREATE_ARTICLE_AUTHORS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_article_authors_article ON article_authors(article_id);";

pub const CREATE_ARTICLES_ISSUE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_articles_issue ON articles(volume_number, issue_number);";

/// All statements needed to bring a fresh database up to the current schema.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[
    CREATE_AUTHORS_TABLE,
    CREATE_ARTICLES_TABLE,
    CREATE_ARTICLE_AUTHORS_TABLE,
    CREATE_ARTICLE_AUTHORS_INDEX,
    CREATE_ARTICLES_ISSUE_INDEX,
];
