//! # Public Route Handlers
//!
//! Read-only pages of the site: the current and past issues, single articles and the
//! staff listing.

use super::wrap;
use crate::{
    errors::AppError,
    state::AppState,
    types::{ApiResponse, ArticleView, AuthorPage},
};
use axum::{
    extract::{Path, State},
    Json,
};
use newsletter::{
    articles::{authors_for_article, get_article, get_article_by_path, list_articles_by_issue_status},
    authors::{articles_by_author, get_author_by_slug, list_authors},
    group_by_volume_issue, Article, Author, VolumeGroup,
};
use tracing::info;
use turso::Connection;

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Articles of the current issue, grouped by volume and issue.
pub async fn current_issue_handler(
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<VolumeGroup>>>, AppError> {
    issue_groups(&app_state, true).await
}

/// Everything no longer in the current issue.
pub async fn past_issues_handler(
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<VolumeGroup>>>, AppError> {
    issue_groups(&app_state, false).await
}

async fn issue_groups(
    app_state: &AppState,
    is_current_issue: bool,
) -> Result<Json<ApiResponse<Vec<VolumeGroup>>>, AppError> {
    let conn = app_state.store.connect()?;
    let articles = list_articles_by_issue_status(&conn, is_current_issue).await?;
    Ok(wrap(group_by_volume_issue(articles)))
}

pub async fn article_handler(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ArticleView>>, AppError> {
    let conn = app_state.store.connect()?;
    let article = get_article(&conn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Article {id} not found.")))?;
    Ok(wrap(article_view(&conn, article).await?))
}

/// Looks an article up by its public path, `/{volume}/{issue}/{short_title}/`.
pub async fn article_by_path_handler(
    State(app_state): State<AppState>,
    Path((volume, issue, short_title)): Path<(u32, u32, String)>,
) -> Result<Json<ApiResponse<ArticleView>>, AppError> {
    info!("Looking up article at /{volume}/{issue}/{short_title}/");
    let conn = app_state.store.connect()?;
    let article = get_article_by_path(&conn, volume, issue, &short_title)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No article at /{volume}/{issue}/{short_title}/."
            ))
        })?;
    Ok(wrap(article_view(&conn, article).await?))
}

async fn article_view(conn: &Connection, article: Article) -> Result<ArticleView, AppError> {
    let authors = authors_for_article(conn, article.id).await?;
    Ok(ArticleView {
        path: article.public_path(),
        article,
        authors,
    })
}

pub async fn authors_handler(
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Author>>>, AppError> {
    let conn = app_state.store.connect()?;
    Ok(wrap(list_authors(&conn).await?))
}

/// An author and the articles credited to them, newest first.
pub async fn author_handler(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<AuthorPage>>, AppError> {
    let conn = app_state.store.connect()?;
    let author = get_author_by_slug(&conn, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author '{slug}' not found.")))?;
    let articles = articles_by_author(&conn, author.id).await?;
    Ok(wrap(AuthorPage { author, articles }))
}
