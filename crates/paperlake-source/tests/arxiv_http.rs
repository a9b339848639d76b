//! HTTP-level behavior of the arXiv source against a mock server.

use std::time::Duration;

use httpmock::prelude::*;

use paperlake_source::{ArticleSource, ArxivSource, SourceError};

fn source_for(server: &MockServer) -> ArxivSource {
    ArxivSource::new()
        .unwrap()
        .with_base_url(format!("{}/search/", server.base_url()))
        .with_rate_limit_wait(Duration::ZERO)
}

#[tokio::test]
async fn rate_limit_status_maps_to_rate_limited() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/search/");
            then.status(429);
        })
        .await;

    let source = source_for(&server);
    let err = source.fetch("cs.CL", 50, 0).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, SourceError::RateLimited));
}

#[tokio::test]
async fn server_error_maps_to_http_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search/");
            then.status(503);
        })
        .await;

    let source = source_for(&server);
    let err = source.fetch("cs.CL", 50, 0).await.unwrap_err();

    assert!(matches!(err, SourceError::Http(503)));
}

#[tokio::test]
async fn pagination_params_are_forwarded() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search/")
                .query_param("query", "cs.CL")
                .query_param("size", "50")
                .query_param("start", "100");
            then.status(200)
                .body("<html><body><ol></ol></body></html>");
        })
        .await;

    let source = source_for(&server);
    let articles = source.fetch("cs.CL", 50, 100).await.unwrap();

    mock.assert_async().await;
    assert!(articles.is_empty());
}

#[tokio::test]
async fn result_items_come_back_as_articles() {
    let page = r#"
    <html><body><ol>
      <li class="arxiv-result">
        <p class="title">Mocked Paper</p>
        <a href="/abs/9999.00001">abs</a>
        <span class="abstract-full">Body text.</span>
        <span class="primary-subject">cs.LG</span>
        <span>Submitted 1 March, 2024</span>
      </li>
    </ol></body></html>
    "#;

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search/");
            then.status(200).body(page);
        })
        .await;

    let source = source_for(&server);
    let articles = source.fetch("cs.LG", 50, 0).await.unwrap();

    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].id, "9999.00001");
    assert_eq!(articles[0].title, "Mocked Paper");
    assert_eq!(source.source_name(), "arxiv_html");
    assert_eq!(source.page_size(), 50);
}
