//! # Application State
//!
//! The shared state handed to every request handler: the configuration, the article
//! store and the document fetcher used by imports.

use crate::config::{AppConfig, GoogleConfig};
use async_trait::async_trait;
use newsletter::{DocumentFetcher, DocumentId, FetchError, SqliteProvider};
use newsletter_gdocs::{auth::ServiceAccountKey, DriveConfig, DriveFetcher};
use std::{path::Path, sync::Arc, time::Duration};
use tracing::{info, warn};

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    pub store: Arc<SqliteProvider>,
    /// Exports Google Docs for the import endpoint.
    pub fetcher: Arc<dyn DocumentFetcher>,
}

/// Builds the shared application state from the configuration.
///
/// Opens the database (creating its directory when needed), makes sure the schema
/// exists and sets up the Drive client from the `google` section.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    if let Some(parent) = Path::new(&config.db_url).parent() {
        if !parent.as_os_str().is_empty() && config.db_url != ":memory:" {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let store = SqliteProvider::new(&config.db_url).await?;
    store.initialize_schema().await?;

    let fetcher = build_fetcher(&config.google).await?;

    if non_empty(&config.admin_token).is_none() {
        warn!("No admin_token configured; all admin requests will be rejected.");
    }

    Ok(AppState {
        config: Arc::new(config),
        store: Arc::new(store),
        fetcher,
    })
}

/// Picks the Drive credentials: an access token first, then a service account key file.
async fn build_fetcher(google: &GoogleConfig) -> anyhow::Result<Arc<dyn DocumentFetcher>> {
    let drive_config = if let Some(token) = non_empty(&google.access_token) {
        info!("Using a static access token for Google Drive.");
        DriveConfig::with_access_token(token)
    } else if let Some(path) = non_empty(&google.credentials_file) {
        info!("Using service account key '{path}' for Google Drive.");
        let key = ServiceAccountKey::from_file(path).await?;
        DriveConfig::with_service_account(key, google.scopes.clone())
    } else {
        warn!("No Google credentials configured; document imports will fail.");
        return Ok(Arc::new(UnconfiguredFetcher));
    };

    let drive_config = drive_config
        .api_base_url(google.api_base_url.clone())
        .timeout(Duration::from_secs(google.timeout_secs));
    Ok(Arc::new(DriveFetcher::new(drive_config)?))
}

/// Treats unset and blank values (e.g. an unset `${VAR}` in the YAML) the same way.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Stands in for the Drive client when no credentials are configured, so the public
/// site still runs.
struct UnconfiguredFetcher;

#[async_trait]
impl DocumentFetcher for UnconfiguredFetcher {
    async fn export_html(&self, _id: &DocumentId) -> Result<String, FetchError> {
        Err(FetchError::Auth("no Google credentials configured".to_string()))
    }
}
