//! # `newsletter-gdocs`: Google Drive Document Export
//!
//! Implements `newsletter::ingest::DocumentFetcher` on top of the Drive v3
//! `files.export` endpoint. The client is built from an explicit `DriveConfig`, so the
//! API base URL can point at a mock server in tests.

pub mod auth;

use async_trait::async_trait;
use auth::{ServiceAccountKey, TokenSource};
use newsletter::{DocumentFetcher, DocumentId, FetchError};
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Public Drive v3 endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
/// Read-only Drive scope, enough to export documents.
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const EXPORT_MIME_TYPE: &str = "text/html";

// --- Error Definitions ---

#[derive(Error, Debug, Clone)]
pub enum DriveError {
    #[error("Invalid credentials: {0}")]
    Credentials(String),
    #[error("Authorization rejected: {0}")]
    Unauthorized(String),
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for DriveError {
    fn from(err: reqwest::Error) -> Self {
        DriveError::Request(err.to_string())
    }
}

/// A helper to convert the specific `DriveError` into the importer's `FetchError`.
impl From<DriveError> for FetchError {
    fn from(err: DriveError) -> Self {
        match err {
            DriveError::Credentials(msg) | DriveError::Unauthorized(msg) => FetchError::Auth(msg),
            DriveError::NotFound(msg) => FetchError::NotFound(msg),
            DriveError::Request(msg) => FetchError::Network(msg),
        }
    }
}

// --- Configuration ---

/// How the client authenticates against Drive.
#[derive(Debug, Clone)]
pub enum DriveCredentials {
    /// A ready-made OAuth access token, sent as is.
    AccessToken(String),
    /// A service account key exchanged for short-lived access tokens.
    ServiceAccount {
        key: ServiceAccountKey,
        scopes: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct DriveConfig {
    pub api_base_url: String,
    pub credentials: DriveCredentials,
    pub timeout: Duration,
}

impl DriveConfig {
    pub fn with_access_token(token: impl Into<String>) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            credentials: DriveCredentials::AccessToken(token.into()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Uses a service account with the given scopes, or the read-only Drive scope when
    /// `scopes` is empty.
    pub fn with_service_account(key: ServiceAccountKey, scopes: Vec<String>) -> Self {
        let scopes = if scopes.is_empty() {
            vec![DEFAULT_SCOPE.to_string()]
        } else {
            scopes
        };
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            credentials: DriveCredentials::ServiceAccount { key, scopes },
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// --- Public Helper Functions ---

/// Builds the export URL for a document.
pub fn construct_export_url(api_base_url: &str, id: &DocumentId) -> String {
    format!(
        "{}/files/{}/export?mimeType={}",
        api_base_url.trim_end_matches('/'),
        id,
        EXPORT_MIME_TYPE
    )
}

// --- Fetcher Implementation ---

/// Exports Google Docs as HTML through the Drive API.
pub struct DriveFetcher {
    client: reqwest::Client,
    api_base_url: String,
    tokens: TokenSource,
}

impl DriveFetcher {
    pub fn new(config: DriveConfig) -> Result<Self, DriveError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        let tokens = TokenSource::new(config.credentials);
        Ok(Self {
            client,
            api_base_url: config.api_base_url,
            tokens,
        })
    }

    /// Downloads the document's HTML export. Invalid UTF-8 is replaced, not rejected.
    pub async fn download_html(&self, id: &DocumentId) -> Result<String, DriveError> {
        let token = self.tokens.access_token(&self.client).await?;
        let export_url = construct_export_url(&self.api_base_url, id);
        info!("Exporting Google Doc {id} as HTML");

        let response = self
            .client
            .get(&export_url)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = format!("export of {id} returned {status}");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DriveError::Unauthorized(detail),
                StatusCode::NOT_FOUND => DriveError::NotFound(detail),
                _ => DriveError::Request(detail),
            });
        }

        let bytes = response.bytes().await?;
        debug!("Exported {} bytes for doc {id}", bytes.len());
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait]
impl DocumentFetcher for DriveFetcher {
    async fn export_html(&self, id: &DocumentId) -> Result<String, FetchError> {
        self.download_html(id).await.map_err(FetchError::from)
    }
}
