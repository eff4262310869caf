//! # Document Import Tests
//!
//! Runs the importer against an in-memory store and a programmable fetcher.

mod common;

use crate::common::{exported_doc, setup_tracing};
use anyhow::Result;
use chrono::NaiveDate;
use newsletter::{
    articles::{create_article, get_article},
    ArticleDraft, ArticleType, DocImporter, FetchError, ImportError,
};
use newsletter_test_utils::{doc_url, MockFetcher, TestSetup};

#[tokio::test]
async fn test_import_article_end_to_end() -> Result<()> {
    setup_tracing();
    let setup = TestSetup::new().await?;
    let fetcher = MockFetcher::new();
    fetcher.add_document("abc123", &exported_doc("Hello", "Jane"));

    let id = setup.add_article("", &doc_url("abc123")).await?;
    let importer = DocImporter::new(&setup.store, &fetcher);
    let done = importer.import_article(id).await?;

    assert_eq!(done.title, "Hello");
    assert!(done.notes.is_empty());
    assert_eq!(fetcher.get_calls(), vec!["abc123".to_string()]);

    let article = get_article(&setup.conn()?, id).await?.expect("article exists");
    assert_eq!(article.title, "Hello");
    assert_eq!(article.writer, "Jane");
    assert_eq!(article.date, NaiveDate::from_ymd_opt(2024, 9, 3));
    assert_eq!(article.issue_number, 4);
    assert_eq!(article.article_type, ArticleType::Features);
    // The placeholder slug is replaced once the import supplies a title.
    assert_eq!(article.short_title, "hello");

    let body = &article.content_html;
    assert!(!body.contains("<html"));
    assert!(!body.contains("<style"));
    assert!(body.contains("<em>Once</em>"));
    assert!(body.contains(r##"<sup><a href="#ftnt1" id="ftnt_ref1">1</a></sup>"##));
    let footnotes = body.find(r#"<div class="footnotes"><hr>"#).expect("footnote wrapper");
    assert!(body[footnotes..].contains("A source."));
    assert!(body.ends_with("</div></div>"));
    Ok(())
}

#[tokio::test]
async fn test_import_batch_continues_after_missing_identifier() -> Result<()> {
    setup_tracing();
    let setup = TestSetup::new().await?;
    let fetcher = MockFetcher::new();
    fetcher.add_document("doc-one", &exported_doc("First", "Ann"));
    fetcher.add_document("doc-three", &exported_doc("Third", "Cy"));

    let first = setup.add_article("One", &doc_url("doc-one")).await?;
    let second = setup.add_article("No Doc", "").await?;
    let third = setup.add_article("Three", &doc_url("doc-three")).await?;

    let importer = DocImporter::new(&setup.store, &fetcher);
    let report = importer.import_batch(&[first, second, third]).await;

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);

    assert!(report.outcomes[0].success);
    assert_eq!(report.outcomes[0].message, "Fetched & updated First.");
    assert!(!report.outcomes[1].success);
    assert_eq!(
        report.outcomes[1].message,
        "Article No Doc (Vol 1, Issue 1) has no doc_id to fetch."
    );
    assert!(report.outcomes[2].success);
    assert_eq!(report.outcomes[2].message, "Fetched & updated Third.");

    assert_eq!(
        fetcher.get_calls(),
        vec!["doc-one".to_string(), "doc-three".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn test_failed_fetch_leaves_article_untouched() -> Result<()> {
    setup_tracing();
    let setup = TestSetup::new().await?;
    let fetcher = MockFetcher::new();
    fetcher.add_failure("locked", FetchError::Auth("403 Forbidden".to_string()));

    let id = setup.add_article("Keep Me", &doc_url("locked")).await?;
    let before = get_article(&setup.conn()?, id).await?.expect("article exists");

    let importer = DocImporter::new(&setup.store, &fetcher);
    let err = importer.import_article(id).await.unwrap_err();
    assert!(matches!(
        err,
        ImportError::Fetch {
            source: FetchError::Auth(_),
            ..
        }
    ));
    assert_eq!(
        err.to_string(),
        "Could not fetch doc locked: authorization failed: 403 Forbidden."
    );

    let after = get_article(&setup.conn()?, id).await?.expect("article exists");
    assert_eq!(before, after);
    Ok(())
}

#[tokio::test]
async fn test_import_unknown_article() -> Result<()> {
    setup_tracing();
    let setup = TestSetup::new().await?;
    let fetcher = MockFetcher::new();
    let importer = DocImporter::new(&setup.store, &fetcher);

    let report = importer.import_batch(&[42]).await;
    assert_eq!(report.outcomes[0].message, "Article 42 does not exist.");
    assert!(fetcher.get_calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_import_without_metadata_keeps_fields() -> Result<()> {
    setup_tracing();
    let setup = TestSetup::new().await?;
    let fetcher = MockFetcher::new();
    fetcher.add_document(
        "plain",
        "<html><body><p>Just prose, no labels.</p></body></html>",
    );

    let conn = setup.conn()?;
    let article = create_article(
        &conn,
        ArticleDraft {
            title: "Manual Title".to_string(),
            writer: "Manual Writer".to_string(),
            doc_url: doc_url("plain"),
            issue_number: 3,
            ..Default::default()
        },
    )
    .await?;

    let importer = DocImporter::new(&setup.store, &fetcher);
    let done = importer.import_article(article.id).await?;
    assert_eq!(done.notes, vec!["No metadata lines found.".to_string()]);

    let stored = get_article(&conn, article.id).await?.expect("article exists");
    assert_eq!(stored.title, "Manual Title");
    assert_eq!(stored.writer, "Manual Writer");
    assert_eq!(stored.issue_number, 3);
    assert_eq!(stored.content_html, "<p>Just prose, no labels.</p>");
    assert!(stored.updated_at >= article.updated_at);
    Ok(())
}
