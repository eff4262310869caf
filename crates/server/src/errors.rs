use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use newsletter::StoreError;
use serde_json::json;
use tracing::error;

/// A custom error type for the server application.
///
/// Each variant maps to an HTTP status; the body is always `{ "error": "..." }`.
#[derive(Debug)]
pub enum AppError {
    /// Errors from the article and author store.
    Store(StoreError),
    /// The requested record does not exist.
    NotFound(String),
    /// The request could not be understood.
    BadRequest(String),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Store(err) => match err {
                StoreError::NotFound(msg) => (StatusCode::NOT_FOUND, format!("Not found: {msg}")),
                StoreError::Conflict(msg) => (StatusCode::CONFLICT, msg),
                StoreError::InvalidData(msg) => (StatusCode::BAD_REQUEST, msg),
                other => {
                    error!("StoreError: {:?}", other);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "A storage error occurred.".to_string(),
                    )
                }
            },
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_status_codes() {
        let cases = [
            (StoreError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (StoreError::Conflict("x".into()), StatusCode::CONFLICT),
            (StoreError::InvalidData("x".into()), StatusCode::BAD_REQUEST),
            (
                StoreError::Connection("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(AppError::from(err).into_response().status(), expected);
        }
    }

    #[test]
    fn test_bad_request_status() {
        let response = AppError::BadRequest("nope".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
