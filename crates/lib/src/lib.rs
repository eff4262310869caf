//! # Newsletter
//!
//! Core library of the newsletter site: the article and author store, the issue grouping
//! used by the public pages, and the Google Docs import pipeline.
//!
//! The HTTP surface lives in `newsletter-server`, the Drive client in `newsletter-gdocs`
//! and the markup cleanup in `newsletter-html`.

pub mod articles;
pub mod authors;
pub mod constants;
pub mod errors;
pub mod ingest;
pub mod presentation;
pub mod providers;
pub mod slug;
pub mod types;

pub use errors::StoreError;
pub use ingest::{
    DocImporter, DocumentFetcher, FetchError, ImportError, ImportOutcome, ImportReport,
    ImportSuccess,
};
pub use presentation::{group_by_volume_issue, IssueGroup, VolumeGroup};
pub use providers::db::sqlite::SqliteProvider;
pub use types::{
    Article, ArticleDraft, ArticleFilter, ArticleType, Author, AuthorDraft, AuthorRole,
    AuthorSummary, DateValue, DocumentId, ParsedMetadata,
};
