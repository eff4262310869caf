//! # Import Orchestration
//!
//! Fetches each article's document, reads its metadata block, sanitizes the markup and
//! writes the result back. Batches run one article at a time and a failure only affects
//! the article it happened on.

use crate::{
    articles::{get_article, save_article},
    errors::StoreError,
    ingest::{
        metadata::parse_metadata,
        traits::{DocumentFetcher, FetchError},
    },
    providers::db::sqlite::SqliteProvider,
    types::{Article, ArticleType, DateValue, DocumentId, ParsedMetadata},
};
use newsletter_html::sanitize;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Article {0} does not exist.")]
    ArticleNotFound(i64),

    /// Carries the article's display string.
    #[error("Article {0} has no doc_id to fetch.")]
    MissingIdentifier(String),

    #[error("Could not fetch doc {doc_id}: {source}.")]
    Fetch {
        doc_id: DocumentId,
        #[source]
        source: FetchError,
    },

    #[error("Could not save the imported article: {0}")]
    Store(#[from] StoreError),
}

/// A successfully imported article.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSuccess {
    pub article_id: i64,
    pub title: String,
    /// Things worth telling the editor that did not stop the import.
    pub notes: Vec<String>,
}

/// The report line for one requested article.
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub article_id: i64,
    pub success: bool,
    pub message: String,
    pub notes: Vec<String>,
}

impl ImportOutcome {
    fn from_result(article_id: i64, result: Result<ImportSuccess, ImportError>) -> Self {
        match result {
            Ok(done) => Self {
                article_id,
                success: true,
                message: format!("Fetched & updated {}.", done.title),
                notes: done.notes,
            },
            Err(e) => Self {
                article_id,
                success: false,
                message: e.to_string(),
                notes: Vec::new(),
            },
        }
    }
}

/// One outcome per requested id, in request order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub outcomes: Vec<ImportOutcome>,
}

impl ImportReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Runs document imports against a store with a given fetcher.
pub struct DocImporter<'a> {
    store: &'a SqliteProvider,
    fetcher: &'a dyn DocumentFetcher,
}

impl<'a> DocImporter<'a> {
    pub fn new(store: &'a SqliteProvider, fetcher: &'a dyn DocumentFetcher) -> Self {
        Self { store, fetcher }
    }

    /// Imports one article. On any error the stored article is left unchanged.
    pub async fn import_article(&self, article_id: i64) -> Result<ImportSuccess, ImportError> {
        let conn = self.store.connect()?;
        let mut article = get_article(&conn, article_id)
            .await?
            .ok_or(ImportError::ArticleNotFound(article_id))?;

        let doc_id = article
            .doc_id
            .clone()
            .ok_or_else(|| ImportError::MissingIdentifier(article.to_string()))?;

        info!("Fetching doc {doc_id} for article {article_id}");
        let markup = self
            .fetcher
            .export_html(&doc_id)
            .await
            .map_err(|source| {
                error!("Failed to fetch doc {doc_id}: {source}");
                ImportError::Fetch {
                    doc_id: doc_id.clone(),
                    source,
                }
            })?;

        let metadata = parse_metadata(&markup);
        let content_html = sanitize(&markup);
        let notes = apply_metadata(&mut article, metadata, content_html);

        save_article(&conn, &mut article).await?;
        info!("Imported doc {doc_id} into article {article_id} ({article})");

        Ok(ImportSuccess {
            article_id,
            title: article.title,
            notes,
        })
    }

    /// Imports each article in turn, collecting one outcome per id.
    pub async fn import_batch(&self, article_ids: &[i64]) -> ImportReport {
        let mut report = ImportReport::default();
        for &id in article_ids {
            let result = self.import_article(id).await;
            if let Err(e) = &result {
                warn!("Import of article {id} failed: {e}");
            }
            report.outcomes.push(ImportOutcome::from_result(id, result));
        }
        info!(
            "Import finished: {} succeeded, {} failed.",
            report.succeeded(),
            report.failed()
        );
        report
    }
}

/// Copies parsed metadata and sanitized content onto an article.
///
/// Title, writer and type are only filled from non-empty values. A structured date and
/// an issue number always overwrite. The content is always replaced. Returns notes for
/// the editor.
pub fn apply_metadata(
    article: &mut Article,
    metadata: ParsedMetadata,
    content_html: String,
) -> Vec<String> {
    let mut notes = Vec::new();
    if metadata.is_empty() {
        notes.push("No metadata lines found.".to_string());
    }

    if let Some(title) = metadata.title.filter(|t| !t.trim().is_empty()) {
        article.title = title;
    }
    if let Some(writer) = metadata.writer.filter(|w| !w.trim().is_empty()) {
        article.writer = writer;
    }

    match metadata.date {
        Some(DateValue::Date(date)) => article.date = Some(date),
        Some(DateValue::Raw(raw)) => {
            notes.push(format!("Date '{raw}' was not recognized; kept the existing date."))
        }
        None => {}
    }

    if let Some(issue) = metadata.issue_number {
        article.issue_number = issue;
    }

    if let Some(label) = metadata.article_type.filter(|t| !t.trim().is_empty()) {
        article.article_type = match ArticleType::from_label(&label) {
            Some(article_type) => article_type,
            None => {
                warn!("Unknown article type '{label}', storing as other.");
                notes.push(format!("Unknown article type '{label}'; stored as Other."));
                ArticleType::Other
            }
        };
    }

    article.content_html = content_html;
    notes
}
