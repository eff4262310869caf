//! # Admin Route Handlers
//!
//! Editor endpoints for managing articles and authors and for running document imports.
//! Every handler takes an `AdminToken`, so requests without the configured bearer token
//! are rejected before reaching the store.

use super::{wrap, wrap_response};
use crate::{
    auth::middleware::AdminToken,
    errors::AppError,
    state::AppState,
    types::{
        ApiResponse, ArticleIdsRequest, ArticleListQuery, AuthorIdsRequest, DebugParams,
        UpdatedCount,
    },
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use newsletter::{
    articles::{
        authors_for_article, create_article, search_articles, set_article_authors,
        set_current_issue, update_article,
    },
    authors::{create_author, list_authors_with_counts},
    Article, ArticleDraft, ArticleFilter, ArticleType, Author, AuthorDraft, AuthorSummary,
    DocImporter, ImportReport,
};
use serde_json::json;
use tracing::info;

// --- Articles ---

/// Lists articles matching the query, most recently edited first.
pub async fn list_articles_handler(
    State(app_state): State<AppState>,
    _admin: AdminToken,
    Query(query): Query<ArticleListQuery>,
) -> Result<Json<ApiResponse<Vec<Article>>>, AppError> {
    let filter = parse_filter(query)?;
    let conn = app_state.store.connect()?;
    Ok(wrap(search_articles(&conn, &filter).await?))
}

/// Turns raw query parameters into a filter. Blank values are ignored.
fn parse_filter(query: ArticleListQuery) -> Result<ArticleFilter, AppError> {
    let blank_to_none = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    let article_type = match blank_to_none(query.article_type) {
        Some(raw) => Some(
            ArticleType::from_code(&raw)
                .or_else(|| ArticleType::from_label(&raw))
                .ok_or_else(|| AppError::BadRequest(format!("Unknown article type '{raw}'.")))?,
        ),
        None => None,
    };

    let is_current_issue = match blank_to_none(query.is_current_issue).as_deref() {
        Some("true") | Some("1") => Some(true),
        Some("false") | Some("0") => Some(false),
        Some(other) => {
            return Err(AppError::BadRequest(format!(
                "is_current_issue must be true or false, got '{other}'."
            )))
        }
        None => None,
    };

    Ok(ArticleFilter {
        q: blank_to_none(query.q),
        article_type,
        is_current_issue,
    })
}

pub async fn create_article_handler(
    State(app_state): State<AppState>,
    _admin: AdminToken,
    Json(draft): Json<ArticleDraft>,
) -> Result<(StatusCode, Json<ApiResponse<Article>>), AppError> {
    let conn = app_state.store.connect()?;
    let article = create_article(&conn, draft).await?;
    info!("Created article {} ({article})", article.id);
    Ok((StatusCode::CREATED, wrap(article)))
}

pub async fn update_article_handler(
    State(app_state): State<AppState>,
    _admin: AdminToken,
    Path(id): Path<i64>,
    Json(draft): Json<ArticleDraft>,
) -> Result<Json<ApiResponse<Article>>, AppError> {
    let conn = app_state.store.connect()?;
    let article = update_article(&conn, id, draft).await?;
    info!("Updated article {id} ({article})");
    Ok(wrap(article))
}

/// Replaces the authors credited on an article and returns the new list.
pub async fn set_article_authors_handler(
    State(app_state): State<AppState>,
    _admin: AdminToken,
    Path(id): Path<i64>,
    Json(payload): Json<AuthorIdsRequest>,
) -> Result<Json<ApiResponse<Vec<Author>>>, AppError> {
    let conn = app_state.store.connect()?;
    set_article_authors(&conn, id, &payload.author_ids).await?;
    Ok(wrap(authors_for_article(&conn, id).await?))
}

/// Imports the Google Doc behind each requested article.
///
/// Always answers 200 with one outcome per id; failures are reported per article.
pub async fn import_articles_handler(
    State(app_state): State<AppState>,
    _admin: AdminToken,
    debug_params: Query<DebugParams>,
    Json(payload): Json<ArticleIdsRequest>,
) -> Result<Json<ApiResponse<ImportReport>>, AppError> {
    info!("Import requested for {} article(s)", payload.ids.len());
    let importer = DocImporter::new(&app_state.store, app_state.fetcher.as_ref());
    let report = importer.import_batch(&payload.ids).await;

    let debug_info = json!({
        "requested": payload.ids.len(),
        "succeeded": report.succeeded(),
        "failed": report.failed(),
    });
    Ok(wrap_response(report, debug_params, Some(debug_info)))
}

pub async fn mark_current_handler(
    State(app_state): State<AppState>,
    _admin: AdminToken,
    Json(payload): Json<ArticleIdsRequest>,
) -> Result<Json<ApiResponse<UpdatedCount>>, AppError> {
    mark_issue_status(&app_state, &payload.ids, true).await
}

pub async fn mark_past_handler(
    State(app_state): State<AppState>,
    _admin: AdminToken,
    Json(payload): Json<ArticleIdsRequest>,
) -> Result<Json<ApiResponse<UpdatedCount>>, AppError> {
    mark_issue_status(&app_state, &payload.ids, false).await
}

async fn mark_issue_status(
    app_state: &AppState,
    ids: &[i64],
    is_current_issue: bool,
) -> Result<Json<ApiResponse<UpdatedCount>>, AppError> {
    let conn = app_state.store.connect()?;
    let updated = set_current_issue(&conn, ids, is_current_issue).await?;
    Ok(wrap(UpdatedCount { updated }))
}

// --- Authors ---

/// All authors with how many articles each is credited on.
pub async fn list_author_summaries_handler(
    State(app_state): State<AppState>,
    _admin: AdminToken,
) -> Result<Json<ApiResponse<Vec<AuthorSummary>>>, AppError> {
    let conn = app_state.store.connect()?;
    Ok(wrap(list_authors_with_counts(&conn).await?))
}

pub async fn create_author_handler(
    State(app_state): State<AppState>,
    _admin: AdminToken,
    Json(draft): Json<AuthorDraft>,
) -> Result<(StatusCode, Json<ApiResponse<Author>>), AppError> {
    let conn = app_state.store.connect()?;
    let author = create_author(&conn, draft).await?;
    info!("Created author {} ({})", author.id, author.slug);
    Ok((StatusCode::CREATED, wrap(author)))
}
