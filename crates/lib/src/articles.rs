//! # Article Store
//!
//! Reads and writes rows of the `articles` table. Every write goes through
//! `Article::prepare_for_save`, so derived fields (`doc_id`, `short_title`) hold no matter
//! which path changed the record.

use crate::{
    errors::StoreError,
    providers::db::sqlite::{
        date_at, format_timestamp, integer_at, optional_text_at, sql, text_at,
        timestamp_at, u32_at, DATE_FORMAT,
    },
    types::{Article, ArticleDraft, ArticleFilter, ArticleType, Author, DocumentId},
};
use chrono::{SubsecRound, Utc};
use tracing::{debug, info};
use turso::{Connection, Row, Value as TursoValue};

pub(crate) fn article_from_row(row: &Row) -> Result<Article, StoreError> {
    let type_code = text_at(row, 8)?;
    let article_type = ArticleType::from_code(&type_code)
        .ok_or_else(|| StoreError::InvalidData(format!("unknown article type '{type_code}'")))?;

    Ok(Article {
        id: integer_at(row, 0)?,
        title: text_at(row, 1)?,
        writer: text_at(row, 2)?,
        date: date_at(row, 3)?,
        volume_number: u32_at(row, 4)?,
        issue_number: u32_at(row, 5)?,
        short_title: text_at(row, 6)?,
        preview_text: text_at(row, 7)?,
        article_type,
        doc_url: text_at(row, 9)?,
        doc_id: optional_text_at(row, 10)?.map(DocumentId::new),
        content_html: text_at(row, 11)?,
        is_current_issue: integer_at(row, 12)? != 0,
        display_order: integer_at(row, 13)?,
        created_at: timestamp_at(row, 14)?,
        updated_at: timestamp_at(row, 15)?,
    })
}

/// Values bound to the writable columns, in `INSERT`/`UPDATE` order.
fn writable_values(article: &Article) -> Vec<TursoValue> {
    vec![
        TursoValue::Text(article.title.clone()),
        TursoValue::Text(article.writer.clone()),
        article
            .date
            .map(|d| TursoValue::Text(d.format(DATE_FORMAT).to_string()))
            .unwrap_or(TursoValue::Null),
        TursoValue::Integer(article.volume_number as i64),
        TursoValue::Integer(article.issue_number as i64),
        TursoValue::Text(article.short_title.clone()),
        TursoValue::Text(article.preview_text.clone()),
        TursoValue::Text(article.article_type.code().to_string()),
        TursoValue::Text(article.doc_url.clone()),
        article
            .doc_id
            .as_ref()
            .map(|id| TursoValue::Text(id.as_str().to_string()))
            .unwrap_or(TursoValue::Null),
        TursoValue::Text(article.content_html.clone()),
        TursoValue::Integer(article.is_current_issue as i64),
        TursoValue::Integer(article.display_order),
        TursoValue::Text(format_timestamp(&article.updated_at)),
    ]
}

async fn query_articles(
    conn: &Connection,
    sql: &str,
    params: Vec<TursoValue>,
) -> Result<Vec<Article>, StoreError> {
    let mut rows = if params.is_empty() {
        conn.query(sql, ()).await?
    } else {
        conn.query(sql, params).await?
    };
    let mut articles = Vec::new();
    while let Some(row) = rows.next().await? {
        articles.push(article_from_row(&row)?);
    }
    Ok(articles)
}

/// Inserts a new article built from admin input and returns it with its id.
pub async fn create_article(conn: &Connection, draft: ArticleDraft) -> Result<Article, StoreError> {
    let mut article = Article::from_draft(draft);
    article.prepare_for_save();

    let mut params = writable_values(&article);
    params.push(TursoValue::Text(format_timestamp(&article.created_at)));

    let mut rows = conn
        .query(
            "INSERT INTO articles (title, writer, date, volume_number, issue_number, \
             short_title, preview_text, article_type, doc_url, doc_id, content_html, \
             is_current_issue, display_order, updated_at, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15) \
             RETURNING id",
            params,
        )
        .await?;
    article.id = match rows.next().await? {
        Some(row) => integer_at(&row, 0)?,
        None => {
            return Err(StoreError::InvalidData(
                "insert did not return an id".to_string(),
            ))
        }
    };

    info!("Created article {} ({})", article.id, article);
    Ok(article)
}

/// Writes every field of an existing article back to the store.
///
/// Derived fields are recomputed and `updated_at` is refreshed on the passed value.
pub async fn save_article(conn: &Connection, article: &mut Article) -> Result<(), StoreError> {
    article.prepare_for_save();
    // Stored with microsecond precision.
    article.updated_at = Utc::now().trunc_subsecs(6);

    let mut params = writable_values(article);
    params.push(TursoValue::Integer(article.id));

    let changed = conn
        .execute(
            "UPDATE articles SET title = ?1, writer = ?2, date = ?3, volume_number = ?4, \
             issue_number = ?5, short_title = ?6, preview_text = ?7, article_type = ?8, \
             doc_url = ?9, doc_id = ?10, content_html = ?11, is_current_issue = ?12, \
             display_order = ?13, updated_at = ?14 WHERE id = ?15",
            params,
        )
        .await?;
    if changed == 0 {
        return Err(StoreError::NotFound(format!("article {}", article.id)));
    }

    debug!("Saved article {}", article.id);
    Ok(())
}

/// Applies admin input to an existing article. Imported content is left alone.
pub async fn update_article(
    conn: &Connection,
    id: i64,
    draft: ArticleDraft,
) -> Result<Article, StoreError> {
    let mut article = get_article(conn, id)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("article {id}")))?;
    article.apply_draft(draft);
    save_article(conn, &mut article).await?;
    Ok(article)
}

pub async fn get_article(conn: &Connection, id: i64) -> Result<Option<Article>, StoreError> {
    let sql = format!(
        "SELECT {} FROM articles WHERE articles.id = ?1",
        sql::ARTICLE_COLUMNS
    );
    let articles = query_articles(conn, &sql, vec![TursoValue::Integer(id)]).await?;
    Ok(articles.into_iter().next())
}

/// Looks an article up by its public path. The oldest match wins if slugs collide.
pub async fn get_article_by_path(
    conn: &Connection,
    volume_number: u32,
    issue_number: u32,
    short_title: &str,
) -> Result<Option<Article>, StoreError> {
    let sql = format!(
        "SELECT {} FROM articles \
         WHERE articles.volume_number = ?1 AND articles.issue_number = ?2 \
         AND articles.short_title = ?3 ORDER BY articles.id LIMIT 1",
        sql::ARTICLE_COLUMNS
    );
    let params = vec![
        TursoValue::Integer(volume_number as i64),
        TursoValue::Integer(issue_number as i64),
        TursoValue::Text(short_title.to_string()),
    ];
    let articles = query_articles(conn, &sql, params).await?;
    Ok(articles.into_iter().next())
}

/// All articles of the current issue (`true`) or of past issues (`false`), unordered.
pub async fn list_articles_by_issue_status(
    conn: &Connection,
    is_current_issue: bool,
) -> Result<Vec<Article>, StoreError> {
    let sql = format!(
        "SELECT {} FROM articles WHERE articles.is_current_issue = ?1",
        sql::ARTICLE_COLUMNS
    );
    query_articles(
        conn,
        &sql,
        vec![TursoValue::Integer(is_current_issue as i64)],
    )
    .await
}

/// The admin list: optional text search and filters, most recently updated first.
pub async fn search_articles(
    conn: &Connection,
    filter: &ArticleFilter,
) -> Result<Vec<Article>, StoreError> {
    let mut conditions = Vec::new();
    let mut params: Vec<TursoValue> = Vec::new();

    if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        params.push(TursoValue::Text(format!("%{}%", q.to_lowercase())));
        let n = params.len();
        conditions.push(format!(
            "(LOWER(articles.title) LIKE ?{n} OR LOWER(articles.writer) LIKE ?{n} \
             OR LOWER(articles.short_title) LIKE ?{n})"
        ));
    }
    if let Some(article_type) = filter.article_type {
        params.push(TursoValue::Text(article_type.code().to_string()));
        conditions.push(format!("articles.article_type = ?{}", params.len()));
    }
    if let Some(current) = filter.is_current_issue {
        params.push(TursoValue::Integer(current as i64));
        conditions.push(format!("articles.is_current_issue = ?{}", params.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    let sql = format!(
        "SELECT {} FROM articles {where_clause} ORDER BY articles.updated_at DESC, articles.id DESC",
        sql::ARTICLE_COLUMNS
    );
    debug!(sql = %sql, "Searching articles");
    query_articles(conn, &sql, params).await
}

/// Moves the given articles into or out of the current issue.
///
/// A bulk flag flip: `updated_at` is not touched. Unknown ids are ignored. Returns the
/// number of rows changed.
pub async fn set_current_issue(
    conn: &Connection,
    ids: &[i64],
    is_current_issue: bool,
) -> Result<u64, StoreError> {
    let mut updated = 0;
    for id in ids {
        updated += conn
            .execute(
                "UPDATE articles SET is_current_issue = ?1 WHERE id = ?2",
                vec![
                    TursoValue::Integer(is_current_issue as i64),
                    TursoValue::Integer(*id),
                ],
            )
            .await?;
    }
    info!(
        "Marked {updated} article(s) as {}.",
        if is_current_issue { "current" } else { "past" }
    );
    Ok(updated)
}

/// Replaces the author credits of an article. Duplicate ids are collapsed.
pub async fn set_article_authors(
    conn: &Connection,
    article_id: i64,
    author_ids: &[i64],
) -> Result<(), StoreError> {
    if get_article(conn, article_id).await?.is_none() {
        return Err(StoreError::NotFound(format!("article {article_id}")));
    }

    let mut unique_ids: Vec<i64> = Vec::with_capacity(author_ids.len());
    for id in author_ids {
        if !unique_ids.contains(id) {
            unique_ids.push(*id);
        }
    }
    for id in &unique_ids {
        let mut rows = conn
            .query(
                "SELECT id FROM authors WHERE id = ?1",
                vec![TursoValue::Integer(*id)],
            )
            .await?;
        if rows.next().await?.is_none() {
            return Err(StoreError::NotFound(format!("author {id}")));
        }
    }

    conn.execute("BEGIN TRANSACTION", ()).await?;
    if let Err(e) = replace_links(conn, article_id, &unique_ids).await {
        conn.execute("ROLLBACK", ()).await?;
        return Err(e);
    }
    conn.execute("COMMIT", ()).await?;

    info!(
        "Article {article_id} now credits {} author(s).",
        unique_ids.len()
    );
    Ok(())
}

async fn replace_links(
    conn: &Connection,
    article_id: i64,
    author_ids: &[i64],
) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM article_authors WHERE article_id = ?1",
        vec![TursoValue::Integer(article_id)],
    )
    .await?;
    for author_id in author_ids {
        conn.execute(
            "INSERT INTO article_authors (article_id, author_id) VALUES (?1, ?2)",
            vec![
                TursoValue::Integer(article_id),
                TursoValue::Integer(*author_id),
            ],
        )
        .await?;
    }
    Ok(())
}

/// Authors credited on an article, by name.
pub async fn authors_for_article(
    conn: &Connection,
    article_id: i64,
) -> Result<Vec<Author>, StoreError> {
    let sql = format!(
        "SELECT {} FROM authors \
         JOIN article_authors ON article_authors.author_id = authors.id \
         WHERE article_authors.article_id = ?1 ORDER BY authors.name",
        sql::AUTHOR_COLUMNS
    );
    let mut rows = conn
        .query(&sql, vec![TursoValue::Integer(article_id)])
        .await?;
    let mut authors = Vec::new();
    while let Some(row) = rows.next().await? {
        authors.push(crate::authors::author_from_row(&row)?);
    }
    Ok(authors)
}
