use super::{handlers, state::AppState};
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    let admin = Router::new()
        .route(
            "/articles",
            get(handlers::list_articles_handler).post(handlers::create_article_handler),
        )
        .route("/articles/import", post(handlers::import_articles_handler))
        .route(
            "/articles/mark_current",
            post(handlers::mark_current_handler),
        )
        .route("/articles/mark_past", post(handlers::mark_past_handler))
        .route("/articles/{id}", put(handlers::update_article_handler))
        .route(
            "/articles/{id}/authors",
            put(handlers::set_article_authors_handler),
        )
        .route(
            "/authors",
            get(handlers::list_author_summaries_handler).post(handlers::create_author_handler),
        );

    Router::new()
        .route("/", get(handlers::current_issue_handler))
        .route("/health", get(handlers::health_check))
        .route("/past", get(handlers::past_issues_handler))
        .route("/article/{id}", get(handlers::article_handler))
        .route("/authors", get(handlers::authors_handler))
        .route("/author/{slug}", get(handlers::author_handler))
        .route(
            "/{volume}/{issue}/{short_title}",
            get(handlers::article_by_path_handler),
        )
        .route(
            "/{volume}/{issue}/{short_title}/",
            get(handlers::article_by_path_handler),
        )
        .nest("/admin", admin)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
