//! # Drive Access Tokens
//!
//! Static tokens are used as given. Service accounts sign an RS256 JWT assertion and
//! trade it at the key's `token_uri` for an access token, which is cached until shortly
//! before it expires.

use crate::{DriveCredentials, DriveError};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path};
use tokio::sync::Mutex;
use tracing::{debug, info};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Lifetime requested for each signed assertion, in seconds.
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this many seconds before they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The fields of a Google service account key file used for the token exchange.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, DriveError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            DriveError::Credentials(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, DriveError> {
        serde_json::from_str(raw)
            .map_err(|e| DriveError::Credentials(format!("malformed service account key: {e}")))
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

struct CachedToken {
    access_token: String,
    /// Unix seconds after which the token must not be reused.
    refresh_after: i64,
}

pub(crate) struct TokenSource {
    credentials: DriveCredentials,
    cache: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub(crate) fn new(credentials: DriveCredentials) -> Self {
        Self {
            credentials,
            cache: Mutex::new(None),
        }
    }

    /// Returns a bearer token, exchanging a fresh assertion when the cached one is stale.
    pub(crate) async fn access_token(&self, client: &reqwest::Client) -> Result<String, DriveError> {
        let (key, scopes) = match &self.credentials {
            DriveCredentials::AccessToken(token) => return Ok(token.clone()),
            DriveCredentials::ServiceAccount { key, scopes } => (key, scopes),
        };

        let mut cache = self.cache.lock().await;
        let now = Utc::now().timestamp();
        if let Some(cached) = cache.as_ref().filter(|c| c.refresh_after > now) {
            debug!("Reusing cached Drive access token");
            return Ok(cached.access_token.clone());
        }

        let assertion = sign_assertion(key, scopes, now)?;
        info!("Requesting Drive access token for {}", key.client_email);
        let response = client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::Unauthorized(format!(
                "token exchange returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| DriveError::Unauthorized(format!("unexpected token response: {e}")))?;
        let lifetime = token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        *cache = Some(CachedToken {
            access_token: token.access_token.clone(),
            refresh_after: now + lifetime - EXPIRY_MARGIN_SECS,
        });
        Ok(token.access_token)
    }
}

/// Signs the JWT assertion for the token exchange.
fn sign_assertion(key: &ServiceAccountKey, scopes: &[String], now: i64) -> Result<String, DriveError> {
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: scopes.join(" "),
        aud: &key.token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| DriveError::Credentials(format!("invalid private key: {e}")))?;
    encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| DriveError::Credentials(format!("cannot sign assertion: {e}")))
}
