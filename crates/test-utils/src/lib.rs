use anyhow::Result;
use async_trait::async_trait;
use newsletter::{
    articles::create_article, ArticleDraft, DocumentFetcher, DocumentId, FetchError,
    SqliteProvider,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use turso::Connection;

// --- Test Setup ---

/// A helper struct to manage database creation for each test.
pub struct TestSetup {
    pub store: SqliteProvider,
}

impl TestSetup {
    /// Creates a new, isolated in-memory database and initializes the schema.
    pub async fn new() -> Result<Self> {
        let store = SqliteProvider::new(":memory:").await?;
        store.initialize_schema().await?;
        Ok(Self { store })
    }

    pub fn conn(&self) -> Result<Connection> {
        Ok(self.store.connect()?)
    }

    /// Inserts an article pointing at `doc_url` and returns its id.
    pub async fn add_article(&self, title: &str, doc_url: &str) -> Result<i64> {
        let conn = self.conn()?;
        let article = create_article(
            &conn,
            ArticleDraft {
                title: title.to_string(),
                doc_url: doc_url.to_string(),
                ..Default::default()
            },
        )
        .await?;
        Ok(article.id)
    }
}

/// The sharing URL of a Google Doc with the given id.
pub fn doc_url(id: &str) -> String {
    format!("https://docs.google.com/document/d/{id}/edit")
}

// --- Mock Document Fetcher ---

/// A `DocumentFetcher` that serves programmed markup and records every requested id.
///
/// Ids without a programmed response fail with `FetchError::NotFound`.
#[derive(Clone, Debug, Default)]
pub struct MockFetcher {
    responses: Arc<Mutex<HashMap<String, Result<String, FetchError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `markup` for the document `id`.
    pub fn add_document(&self, id: &str, markup: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(id.to_string(), Ok(markup.to_string()));
    }

    /// Makes every export of `id` fail with `error`.
    pub fn add_failure(&self, id: &str, error: FetchError) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(id.to_string(), Err(error));
    }

    /// Retrieves the requested ids, in call order.
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentFetcher for MockFetcher {
    async fn export_html(&self, id: &DocumentId) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(id.as_str().to_string());

        let responses = self.responses.lock().unwrap();
        match responses.get(id.as_str()) {
            Some(response) => response.clone(),
            None => Err(FetchError::NotFound(format!(
                "MockFetcher: no document programmed for '{id}'"
            ))),
        }
    }
}
