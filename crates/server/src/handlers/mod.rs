//! # API Route Handlers
//!
//! `public` serves the reader-facing pages; `admin` holds the editor endpoints behind
//! the admin token.

pub mod admin;
pub mod public;

pub use admin::*;
pub use public::*;

use super::types::{ApiResponse, DebugParams};
use axum::{extract::Query, Json};
use serde_json::Value;

/// Wraps a result in the standard `ApiResponse`.
pub(crate) fn wrap<T>(result: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        debug: None,
        result,
    })
}

/// Like `wrap`, but attaches `debug_info` when the request asked for `?debug=true`.
pub(crate) fn wrap_response<T>(
    result: T,
    debug_params: Query<DebugParams>,
    debug_info: Option<Value>,
) -> Json<ApiResponse<T>> {
    let debug = if debug_params.debug.unwrap_or(false) {
        debug_info
    } else {
        None
    };
    Json(ApiResponse { debug, result })
}
