mod common;

use common::write_sitemap;
use std::process::{Command, Output};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn judol_check(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_judol-check"))
        .args(args)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
}

#[test]
fn missing_sitemap_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let sitemap = dir.path().join("absent.xml");
    let out = judol_check(&["--sitemap", sitemap.to_str().unwrap(), "--quiet"]);

    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.starts_with("Error: "), "{stderr}");
    assert!(stderr.contains("absent.xml"));
}

#[test]
fn rejects_zero_concurrency() {
    let out = judol_check(&["--concurrency", "0"]);
    assert!(!out.status.success());
}

#[tokio::test(flavor = "multi_thread")]
async fn json_summary_and_fail_on_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/owned"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  Judol "))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let urls = vec![
        format!("{}/home", server.uri()),
        format!("{}/owned", server.uri()),
    ];
    let sitemap = write_sitemap(dir.path(), &urls);
    let report = dir.path().join("out").join("report.json");

    let args = vec![
        "-s".to_string(),
        sitemap.display().to_string(),
        "-o".to_string(),
        report.display().to_string(),
        "-c".to_string(),
        "2".to_string(),
        "-t".to_string(),
        "5".to_string(),
        "--json".to_string(),
        "--fail-on-match".to_string(),
    ];
    let out = tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        judol_check(&args)
    })
    .await
    .unwrap();

    assert_eq!(out.status.code(), Some(1));
    let summary: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(summary["count"], 2);
    assert_eq!(summary["matched"], 1);
    assert_eq!(summary["failed"], 0);
    assert_eq!(summary["exact"], serde_json::json!([urls[1]]));
    assert!(report.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn clean_run_exits_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("all good"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let sitemap = write_sitemap(dir.path(), &[format!("{}/", server.uri())]);
    let report = dir.path().join("report.json");

    let args = vec![
        "--sitemap".to_string(),
        sitemap.display().to_string(),
        "--output".to_string(),
        report.display().to_string(),
        "--fail-on-match".to_string(),
    ];
    let out = tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        judol_check(&args)
    })
    .await
    .unwrap();

    assert_eq!(out.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("URLs checked: 1"), "{stderr}");
    assert!(stderr.contains("Pages containing marker keywords: 0"));
}
