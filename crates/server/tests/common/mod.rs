//! # Common Test Utilities
//!
//! `TestApp` spawns the real server on a random port, backed by a temporary SQLite file
//! and a wiremock server standing in for the Google Drive API.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use newsletter::{articles::create_article, Article, ArticleDraft};
use newsletter_server::{
    config, router,
    state::{build_app_state, AppState},
};
use reqwest::{Client, RequestBuilder};
use serde_json::json;
use std::{fs::File, io::Write, net::SocketAddr, path::PathBuf};
use tempfile::{tempdir, NamedTempFile, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

pub const ADMIN_TOKEN: &str = "test-admin-token";
pub const DRIVE_TOKEN: &str = "test-drive-token";

// --- Full Application Test Harness ---

pub struct TestApp {
    pub address: String,
    pub client: Client,
    /// Plays the Drive export API.
    pub mock_server: MockServer,
    pub db_path: PathBuf,
    pub app_state: AppState,
    _db_file: Option<NamedTempFile>,
    _config_dir: Option<TempDir>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the application server and returns a `TestApp` instance.
    pub async fn spawn() -> Result<Self> {
        let mock_server = MockServer::start().await;
        let db_file = NamedTempFile::new()?;
        let db_path = db_file.path().to_path_buf();

        let config_dir = tempdir()?;
        let config_path = config_dir.path().join("config.yml");
        let config_content = serde_yaml::to_string(&json!({
            "port": 0,
            "db_url": db_path.to_string_lossy(),
            "admin_token": ADMIN_TOKEN,
            "google": {
                "api_base_url": mock_server.uri(),
                "access_token": DRIVE_TOKEN,
                "timeout_secs": 5,
            },
        }))?;
        let mut file = File::create(&config_path)?;
        file.write_all(config_content.as_bytes())?;

        let config_path = config_path.to_string_lossy().to_string();
        let config = config::get_config(Some(&config_path))?;
        let app_state = build_app_state(config).await?;

        let mut app = TestApp::spawn_with_state(app_state, mock_server).await?;
        app._db_file = Some(db_file);
        app._config_dir = Some(config_dir);
        Ok(app)
    }

    pub async fn spawn_with_state(app_state: AppState, mock_server: MockServer) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let db_path = PathBuf::from(&app_state.config.db_url);
        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            db_path,
            app_state: app_state_for_harness,
            _db_file: None,
            _config_dir: None,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn admin_get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(ADMIN_TOKEN)
    }

    pub fn admin_post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(ADMIN_TOKEN)
    }

    pub fn admin_put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(ADMIN_TOKEN)
    }

    /// Inserts an article straight into the store.
    pub async fn seed_article(&self, draft: ArticleDraft) -> Result<Article> {
        let conn = self.app_state.store.connect()?;
        Ok(create_article(&conn, draft).await?)
    }

    /// Serves `markup` as the HTML export of the document `doc_id`.
    pub async fn mount_doc(&self, doc_id: &str, markup: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/files/{doc_id}/export")))
            .and(query_param("mimeType", "text/html"))
            .and(header("Authorization", format!("Bearer {DRIVE_TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string(markup))
            .mount(&self.mock_server)
            .await;
    }

    /// Makes exports of `doc_id` answer with `status`.
    pub async fn mount_doc_status(&self, doc_id: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("/files/{doc_id}/export")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.mock_server)
            .await;
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// A Google Docs export with a metadata block, some body text and one footnote.
pub fn exported_doc(title: &str, writer: &str) -> String {
    format!(
        concat!(
            "<html><head><meta charset=\"utf-8\"><style>.c1{{font-weight:700}}</style></head>",
            "<body class=\"c4\">",
            "<p class=\"c1\"><span>Title: {}</span></p>",
            "<p class=\"c1\"><span>Writer(s): {}</span></p>",
            "<p class=\"c1\"><span>Date: 9/3/24</span></p>",
            "<p class=\"c1\"><span>Issue: 4</span></p>",
            "<p class=\"c1\"><span>Type of Article: Op-Ed</span></p>",
            "<p class=\"c2\"><span style=\"font-style:italic\">Opening</span><span> line.</span>",
            "<sup><a href=\"#ftnt1\" id=\"ftnt_ref1\">[1]</a></sup></p>",
            "<hr class=\"c5\"><div><p><a href=\"#ftnt_ref1\" id=\"ftnt1\">[1]</a>",
            "<span> A source.</span></p></div></body></html>"
        ),
        title, writer
    )
}
