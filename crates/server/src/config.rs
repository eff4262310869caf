//! # Application Configuration
//!
//! Loads the server configuration from a `config.yml` file layered with environment
//! variables. `${VAR}` references inside the YAML are expanded before parsing.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The path to the SQLite database file. Loaded from `DB_URL` env var.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// Bearer token required by the `/admin` routes. Without one, every admin request
    /// is rejected.
    #[serde(default)]
    pub admin_token: Option<String>,
    /// Google Drive access used by the document import.
    #[serde(default)]
    pub google: GoogleConfig,
}

fn default_port() -> u16 {
    8080
}

fn default_db_url() -> String {
    newsletter::constants::DEFAULT_DB_FILE.to_string()
}

/// Credentials and endpoint for the Drive export API.
///
/// `access_token` wins over `credentials_file` when both are set.
#[derive(Debug, Deserialize, Clone)]
pub struct GoogleConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Path to a service account key file.
    #[serde(default)]
    pub credentials_file: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            credentials_file: None,
            access_token: None,
            scopes: Vec::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_base_url() -> String {
    newsletter_gdocs::DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    newsletter_gdocs::DEFAULT_TIMEOUT_SECS
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// - Top-level keys like `port` and `db_url` are overridden by `PORT` and `DB_URL`.
/// - Nested keys are overridden by `NEWSLETTER_...` variables
///   (e.g. `NEWSLETTER_GOOGLE__ACCESS_TOKEN`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let config_path = match config_path_override {
        Some(path) => path.to_string(),
        None => format!("{}/config.yml", env!("CARGO_MANIFEST_DIR")),
    };

    let content = read_and_substitute(&config_path)?.ok_or_else(|| {
        ConfigError::NotFound(format!(
            "Config file not found at '{config_path}'. Copy config.yml next to the server crate or pass a path."
        ))
    })?;
    info!("Loading configuration from '{config_path}'.");

    let settings = ConfigBuilder::builder()
        .add_source(File::from_str(&content, FileFormat::Yaml))
        // Top-level keys such as PORT and DB_URL.
        .add_source(Environment::default())
        // Nested overrides.
        .add_source(
            Environment::with_prefix("NEWSLETTER")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<AppConfig>().map_err(ConfigError::from)
}
