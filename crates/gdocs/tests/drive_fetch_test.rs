//! # Drive Fetcher Integration Tests
//!
//! Points `DriveFetcher` at a wiremock server standing in for both the Drive API and
//! the OAuth token endpoint.

use anyhow::Result;
use newsletter::{
    articles::get_article, DocImporter, DocumentFetcher, DocumentId, FetchError,
};
use newsletter_gdocs::{auth::ServiceAccountKey, DriveConfig, DriveFetcher};
use newsletter_test_utils::{doc_url, TestSetup};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY_PEM: &str = include_str!("fixtures/test_service_account_key.pem");

fn token_fetcher(server: &MockServer) -> Result<DriveFetcher> {
    let config = DriveConfig::with_access_token("static-token").api_base_url(server.uri());
    Ok(DriveFetcher::new(config)?)
}

async fn mount_export(server: &MockServer, id: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/files/{id}/export")))
        .and(query_param("mimeType", "text/html"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_export_with_access_token() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/abc123/export"))
        .and(query_param("mimeType", "text/html"))
        .and(header("Authorization", "Bearer static-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>Title: Hello</p></body></html>")
                .insert_header("Content-Type", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = token_fetcher(&server)?;
    let html = fetcher.export_html(&DocumentId::new("abc123")).await?;
    assert!(html.contains("Title: Hello"));
    Ok(())
}

#[tokio::test]
async fn test_export_status_classification() -> Result<()> {
    let server = MockServer::start().await;
    mount_export(&server, "unauthorized", ResponseTemplate::new(401)).await;
    mount_export(&server, "forbidden", ResponseTemplate::new(403)).await;
    mount_export(&server, "missing", ResponseTemplate::new(404)).await;
    mount_export(&server, "broken", ResponseTemplate::new(500)).await;

    let fetcher = token_fetcher(&server)?;

    let result = fetcher.export_html(&DocumentId::new("unauthorized")).await;
    assert!(matches!(result, Err(FetchError::Auth(_))));
    let result = fetcher.export_html(&DocumentId::new("forbidden")).await;
    assert!(matches!(result, Err(FetchError::Auth(_))));
    let result = fetcher.export_html(&DocumentId::new("missing")).await;
    assert!(matches!(result, Err(FetchError::NotFound(_))));
    let result = fetcher.export_html(&DocumentId::new("broken")).await;
    assert!(matches!(result, Err(FetchError::Network(_))));
    Ok(())
}

#[tokio::test]
async fn test_export_unreachable_host_is_network_error() -> Result<()> {
    let config = DriveConfig::with_access_token("t")
        .api_base_url("http://127.0.0.1:1")
        .timeout(Duration::from_secs(2));
    let fetcher = DriveFetcher::new(config)?;
    let result = fetcher.export_html(&DocumentId::new("x")).await;
    assert!(matches!(result, Err(FetchError::Network(_))));
    Ok(())
}

#[tokio::test]
async fn test_export_replaces_invalid_utf8() -> Result<()> {
    let server = MockServer::start().await;
    mount_export(
        &server,
        "latin1",
        ResponseTemplate::new(200).set_body_bytes(vec![b'<', b'p', b'>', 0xE9, b'<', b'/', b'p', b'>']),
    )
    .await;

    let fetcher = token_fetcher(&server)?;
    let html = fetcher.export_html(&DocumentId::new("latin1")).await?;
    assert_eq!(html, "<p>\u{FFFD}</p>");
    Ok(())
}

#[tokio::test]
async fn test_service_account_token_is_exchanged_once() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "sa-token",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/doc-1/export"))
        .and(header("Authorization", "Bearer sa-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>ok</p>"))
        .expect(2)
        .mount(&server)
        .await;

    let key = ServiceAccountKey::from_json(
        &json!({
            "type": "service_account",
            "client_email": "newsletter-bot@test.iam.gserviceaccount.com",
            "private_key": TEST_KEY_PEM,
            "token_uri": format!("{}/token", server.uri()),
        })
        .to_string(),
    )?;
    let config = DriveConfig::with_service_account(key, Vec::new()).api_base_url(server.uri());
    let fetcher = DriveFetcher::new(config)?;

    let id = DocumentId::new("doc-1");
    assert_eq!(fetcher.export_html(&id).await?, "<p>ok</p>");
    assert_eq!(fetcher.export_html(&id).await?, "<p>ok</p>");
    Ok(())
}

#[tokio::test]
async fn test_rejected_token_exchange_is_auth_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;

    let key_file = tempfile::NamedTempFile::new()?;
    std::fs::write(
        key_file.path(),
        json!({
            "client_email": "newsletter-bot@test.iam.gserviceaccount.com",
            "private_key": TEST_KEY_PEM,
            "token_uri": format!("{}/token", server.uri()),
        })
        .to_string(),
    )?;
    let key = ServiceAccountKey::from_file(key_file.path()).await?;
    let fetcher = DriveFetcher::new(
        DriveConfig::with_service_account(key, Vec::new()).api_base_url(server.uri()),
    )?;

    let result = fetcher.export_html(&DocumentId::new("doc-1")).await;
    match result {
        Err(FetchError::Auth(msg)) => assert!(msg.contains("invalid_grant")),
        other => panic!("expected an auth error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_import_through_drive_fetcher() -> Result<()> {
    let server = MockServer::start().await;
    mount_export(
        &server,
        "abc123",
        ResponseTemplate::new(200).set_body_string(concat!(
            "<html><head><style>.c1{color:red}</style></head><body class=\"c0\">",
            "<p class=\"c1\"><span>Title: Hello</span></p>",
            "<p class=\"c1\"><span>Writer(s): Jane</span></p>",
            "<p class=\"c1\"><span>Body text</span></p>",
            "<hr><p><a id=\"ftnt1\" href=\"#ftnt_ref1\">[1]</a> Note</p></body></html>"
        )),
    )
    .await;

    let setup = TestSetup::new().await?;
    let id = setup.add_article("", &doc_url("abc123")).await?;
    let fetcher = token_fetcher(&server)?;

    let report = DocImporter::new(&setup.store, &fetcher).import_batch(&[id]).await;
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.outcomes[0].message, "Fetched & updated Hello.");

    let article = get_article(&setup.conn()?, id).await?.expect("article exists");
    assert_eq!(article.title, "Hello");
    assert_eq!(article.writer, "Jane");
    assert!(!article.content_html.contains("<html"));
    assert!(article
        .content_html
        .contains(r##"<div class="footnotes"><hr><p><a id="ftnt1" href="#ftnt_ref1">1</a> Note</p></div>"##));
    Ok(())
}
