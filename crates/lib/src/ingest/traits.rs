use crate::types::DocumentId;
use async_trait::async_trait;
use thiserror::Error;

/// Why a document could not be exported.
///
/// Fetcher implementations map their transport and status errors into these variants.
/// The importer reports all of them the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("authorization failed: {0}")]
    Auth(String),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(String),
}

/// A source of exported document markup.
///
/// Implemented by the Google Drive client and by in-memory fakes in tests.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Exports the document as HTML. Called once per import, without retries.
    async fn export_html(&self, id: &DocumentId) -> Result<String, FetchError>;
}
