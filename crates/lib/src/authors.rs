//! # Author Store

use crate::{
    articles::article_from_row,
    errors::StoreError,
    providers::db::sqlite::{conflict_or, integer_at, sql, text_at},
    types::{Article, Author, AuthorDraft, AuthorRole, AuthorSummary},
};
use tracing::info;
use turso::{Connection, Row, Value as TursoValue};

pub(crate) fn author_from_row(row: &Row) -> Result<Author, StoreError> {
    let role_code = text_at(row, 3)?;
    let role = AuthorRole::from_code(&role_code)
        .ok_or_else(|| StoreError::InvalidData(format!("unknown author role '{role_code}'")))?;
    Ok(Author {
        id: integer_at(row, 0)?,
        name: text_at(row, 1)?,
        slug: text_at(row, 2)?,
        role,
        bio: text_at(row, 4)?,
    })
}

/// Inserts a new author. Fails with `StoreError::Conflict` when the name or slug is taken.
pub async fn create_author(conn: &Connection, draft: AuthorDraft) -> Result<Author, StoreError> {
    let name = draft.name.trim().to_string();
    if name.is_empty() {
        return Err(StoreError::InvalidData("author name is required".to_string()));
    }
    let mut author = Author {
        id: 0,
        name,
        slug: draft.slug,
        role: draft.role,
        bio: draft.bio,
    };
    author.prepare_for_save();
    if author.slug.is_empty() {
        return Err(StoreError::InvalidData(format!(
            "cannot derive a slug from '{}'",
            author.name
        )));
    }

    let params = vec![
        TursoValue::Text(author.name.clone()),
        TursoValue::Text(author.slug.clone()),
        TursoValue::Text(author.role.code().to_string()),
        TursoValue::Text(author.bio.clone()),
    ];
    let mut rows = conn
        .query(
            "INSERT INTO authors (name, slug, role, bio) VALUES (?1, ?2, ?3, ?4) RETURNING id",
            params,
        )
        .await
        .map_err(|e| conflict_or(e, || format!("author '{}'", author.name)))?;
    author.id = match rows.next().await {
        Ok(Some(row)) => integer_at(&row, 0)?,
        Ok(None) => {
            return Err(StoreError::InvalidData(
                "insert did not return an id".to_string(),
            ))
        }
        Err(e) => return Err(conflict_or(e, || format!("author '{}'", author.name))),
    };

    info!("Created author {} ({})", author.id, author.slug);
    Ok(author)
}

/// All authors ordered by name.
pub async fn list_authors(conn: &Connection) -> Result<Vec<Author>, StoreError> {
    let sql = format!(
        "SELECT {} FROM authors ORDER BY authors.name",
        sql::AUTHOR_COLUMNS
    );
    let mut rows = conn.query(&sql, ()).await?;
    let mut authors = Vec::new();
    while let Some(row) = rows.next().await? {
        authors.push(author_from_row(&row)?);
    }
    Ok(authors)
}

pub async fn get_author_by_slug(
    conn: &Connection,
    slug: &str,
) -> Result<Option<Author>, StoreError> {
    let sql = format!(
        "SELECT {} FROM authors WHERE authors.slug = ?1",
        sql::AUTHOR_COLUMNS
    );
    let mut rows = conn
        .query(&sql, vec![TursoValue::Text(slug.to_string())])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(author_from_row(&row)?)),
        None => Ok(None),
    }
}

/// Authors with the number of articles credited to each, ordered by name.
pub async fn list_authors_with_counts(
    conn: &Connection,
) -> Result<Vec<AuthorSummary>, StoreError> {
    let sql = format!(
        "SELECT {}, COUNT(article_authors.article_id) FROM authors \
         LEFT JOIN article_authors ON article_authors.author_id = authors.id \
         GROUP BY authors.id, authors.name, authors.slug, authors.role, authors.bio \
         ORDER BY authors.name",
        sql::AUTHOR_COLUMNS
    );
    let mut rows = conn.query(&sql, ()).await?;
    let mut summaries = Vec::new();
    while let Some(row) = rows.next().await? {
        summaries.push(AuthorSummary {
            author: author_from_row(&row)?,
            article_count: integer_at(&row, 5)?,
        });
    }
    Ok(summaries)
}

/// Articles credited to an author, newest first.
///
/// Ordered by date descending with undated articles last, then volume and issue
/// descending, then title.
pub async fn articles_by_author(
    conn: &Connection,
    author_id: i64,
) -> Result<Vec<Article>, StoreError> {
    let sql = format!(
        "SELECT {} FROM articles \
         JOIN article_authors ON article_authors.article_id = articles.id \
         WHERE article_authors.author_id = ?1",
        sql::ARTICLE_COLUMNS
    );
    let mut rows = conn
        .query(&sql, vec![TursoValue::Integer(author_id)])
        .await?;
    let mut articles = Vec::new();
    while let Some(row) = rows.next().await? {
        articles.push(article_from_row(&row)?);
    }
    crate::presentation::sort_for_author_page(&mut articles);
    Ok(articles)
}
