// ABOUTME: End-to-end tests for MetadataService against a local mock HTTP server.
// ABOUTME: Covers extraction precedence, caching, retries, pass-through statuses and image persistence.

use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use linkcard::{LinkMetadata, MetadataService};
use pretty_assertions::assert_eq;
use url::Url;

const ARTICLE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Article Title</title>
    <meta property="og:title" content="OG Article Title">
    <meta property="og:description" content="OG description">
    <meta property="og:site_name" content="Example News">
    <meta property="og:image" content="/img/lead.webp">
    <meta name="twitter:title" content="Twitter Article Title">
    <link rel="icon" href="/static/icon.png">
</head>
<body><h1>Heading</h1></body>
</html>"#;

fn service() -> MetadataService {
    MetadataService::builder()
        .retry_delay(Duration::ZERO)
        .build()
}

#[tokio::test]
async fn resolves_article_metadata() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/article");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(ARTICLE);
    });

    let url = server.url("/article");
    let meta = service().get_metadata(&url).await.expect("lookup succeeds");
    mock.assert();

    let origin = server.url("");
    assert_eq!(
        meta,
        LinkMetadata {
            url: url.clone(),
            title: "Article Title".to_string(),
            description: Some("OG description".to_string()),
            site_name: Some("Example News".to_string()),
            host: Url::parse(&url).unwrap().host_str().map(str::to_string),
            favicon: Some(format!("{}/static/icon.png", origin)),
            image: Some(format!("{}/img/lead.webp", origin)),
            local_image: None,
            indent: 0,
        }
    );
}

#[tokio::test]
async fn cached_lookup_skips_network() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/cached");
        then.status(200).body("<title>Cached</title>");
    });

    let svc = service();
    let url = server.url("/cached");
    let first = svc.get_metadata(&url).await.unwrap();
    // Key normalization: surrounding whitespace and case do not matter.
    let second = svc
        .get_metadata(&format!("  {}  ", url.to_uppercase()))
        .await
        .unwrap();

    mock.assert();
    assert_eq!(first, second);
}

#[tokio::test]
async fn not_found_page_is_still_parsed() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/missing");
        then.status(404).body("<title>Page Not Found</title>");
    });

    let meta = service()
        .get_metadata(&server.url("/missing"))
        .await
        .expect("status codes are passed through");
    mock.assert();

    assert_eq!(meta.title, "Page Not Found");
}

#[tokio::test]
async fn unreachable_host_is_network_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = format!("http://127.0.0.1:{}/gone", port);

    let err = MetadataService::builder()
        .max_retries(1)
        .retry_delay(Duration::from_millis(10))
        .build()
        .get_metadata(&url)
        .await
        .expect_err("nothing is listening");

    assert!(err.is_network(), "unexpected error: {}", err);
    assert_eq!(err.url(), Some(url.as_str()));
}

#[tokio::test]
async fn slow_server_is_timeout_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/slow");
        then.status(200)
            .delay(Duration::from_millis(1500))
            .body("<title>Late</title>");
    });

    let err = MetadataService::builder()
        .timeout(Duration::from_millis(100))
        .max_retries(0)
        .build()
        .get_metadata(&server.url("/slow"))
        .await
        .expect_err("request times out");

    assert!(err.is_timeout(), "unexpected error: {}", err);
}

#[tokio::test]
async fn image_is_persisted_through_saver() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/article");
        then.status(200).body(ARTICLE);
    });

    let saver = |source: String, name: String| async move {
        assert!(source.ends_with("/img/lead.webp"));
        Ok::<_, anyhow::Error>(format!("Attachments/{}", name))
    };
    let svc = MetadataService::builder()
        .image_saver(Arc::new(saver))
        .prefer_local_images(true)
        .build();

    let meta = svc.get_metadata(&server.url("/article")).await.unwrap();

    let local = meta.local_image.clone().expect("image was saved");
    assert!(local.starts_with("Attachments/"), "{}", local);
    assert!(local.ends_with(".webp"), "{}", local);
    assert_eq!(meta.image, Some(local));
}

#[tokio::test]
async fn failing_saver_keeps_remote_image() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/article");
        then.status(200).body(ARTICLE);
    });

    let saver = |_source: String, _name: String| async move {
        Err::<String, _>(anyhow::anyhow!("vault is read-only"))
    };
    let svc = MetadataService::builder()
        .image_saver(Arc::new(saver))
        .prefer_local_images(true)
        .build();

    let meta = svc
        .get_metadata(&server.url("/article"))
        .await
        .expect("image failures are swallowed");

    assert_eq!(meta.image, Some(server.url("/img/lead.webp")));
    assert_eq!(meta.local_image, None);
}
