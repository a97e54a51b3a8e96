// ABOUTME: Integration tests for the linkcard CLI binary.
// ABOUTME: Tests HTML file parsing, URL resolution and argument validation.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn linkcard_cmd() -> Command {
    Command::cargo_bin("linkcard").unwrap()
}

#[test]
fn parse_html_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = temp_dir.path().join("page.html");

    let html_content = r#"<!DOCTYPE html>
<html>
<head>
<title>Test Page</title>
<meta name="description" content="A test page">
</head>
<body></body>
</html>"#;

    fs::write(&html_path, html_content).unwrap();

    linkcard_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--url")
        .arg("https://example.com")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""title": "Test Page""#))
        .stdout(predicate::str::contains(r#""description": "A test page""#))
        .stdout(predicate::str::contains(
            r#""favicon": "https://example.com/favicon.ico""#,
        ));
}

#[test]
fn multiple_urls_output_json_array() {
    let server = MockServer::start();

    let mock1 = server.mock(|when, then| {
        when.method(GET).path("/page1");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body("<html><head><title>Page One</title></head></html>");
    });

    let mock2 = server.mock(|when, then| {
        when.method(GET).path("/page2");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body("<html><body><h1>Page Two</h1></body></html>");
    });

    let output = linkcard_cmd()
        .arg(server.url("/page1"))
        .arg(server.url("/page2"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    mock1.assert();
    mock2.assert();

    let records: Vec<serde_json::Value> =
        serde_json::from_slice(&output).expect("stdout is a JSON array");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["title"], "Page One");
    assert_eq!(records[1]["title"], "Page Two");
}

#[test]
fn unreachable_url_fails() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    linkcard_cmd()
        .arg("--retries")
        .arg("0")
        .arg(format!("http://127.0.0.1:{}/", port))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error resolving"));
}

#[test]
fn html_requires_url() {
    linkcard_cmd()
        .arg("--html")
        .arg("page.html")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--url is required"));
}

#[test]
fn no_arguments_fails() {
    linkcard_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one URL is required"));
}
