//! # Authentication Middleware
//!
//! Provides the `AdminToken` extractor guarding the `/admin` routes. A request passes
//! only when it carries `Authorization: Bearer <token>` matching the configured
//! `admin_token`.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde_json::json;
use tracing::{debug, warn};

use crate::state::{non_empty, AppState};

/// Proof that the request was made by an administrator.
#[derive(Debug, Clone, Copy)]
pub struct AdminToken;

/// A custom rejection type for authentication failures.
pub struct AuthError(StatusCode, String);

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

impl FromRequestParts<AppState> for AdminToken {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer_header =
            Option::<TypedHeader<Authorization<Bearer>>>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    warn!("Malformed Authorization header: {}", e);
                    AuthError(
                        StatusCode::UNAUTHORIZED,
                        "Invalid Authorization header format.".to_string(),
                    )
                })?;

        let Some(TypedHeader(Authorization(bearer))) = bearer_header else {
            debug!("Admin request without an Authorization header.");
            return Err(unauthorized());
        };

        match non_empty(&state.config.admin_token) {
            Some(expected) if bearer.token() == expected => Ok(AdminToken),
            _ => {
                warn!("Rejected admin request with an invalid token.");
                Err(unauthorized())
            }
        }
    }
}

fn unauthorized() -> AuthError {
    AuthError(
        StatusCode::UNAUTHORIZED,
        "Missing or invalid admin token.".to_string(),
    )
}
