mod common;

use judol_check::acquisition::http_client::{FetchConfig, FetchError, HttpClient, RetryPolicy};
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(retries: u32, timeout: Duration) -> HttpClient {
    HttpClient::new(FetchConfig {
        timeout,
        retry: RetryPolicy {
            max_retries: retries,
            backoff_factor: 0.0,
            ..RetryPolicy::default()
        },
        ..FetchConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn retries_503_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("no markers here"))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(3, Duration::from_secs(5))
        .get(&format!("{}/flaky", server.uri()))
        .await
        .unwrap();
    assert_eq!(page.status, 200);
    assert_eq!(page.body, "no markers here");
}

#[tokio::test]
async fn exhausted_retries_become_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(502))
        .expect(4)
        .mount(&server)
        .await;

    let err = client(3, Duration::from_secs(5))
        .get(&format!("{}/down", server.uri()))
        .await
        .unwrap_err();
    match err {
        FetchError::RetriesExhausted { status, attempts } => {
            assert_eq!(status, 502);
            assert_eq!(attempts, 4);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn non_retryable_status_returned_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(3, Duration::from_secs(5))
        .get(&format!("{}/missing", server.uri()))
        .await
        .unwrap();
    assert_eq!(page.status, 404);
    assert_eq!(page.body, "not found");
}

#[tokio::test]
async fn sends_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "judol-checker/1.0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(0, Duration::from_secs(5))
        .get(&format!("{}/", server.uri()))
        .await
        .unwrap();
    assert_eq!(page.status, 200);
    assert_eq!(page.body, "");
}

#[tokio::test]
async fn decodes_declared_charset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"caf\xe9 JUDOL".to_vec(), "text/html; charset=iso-8859-1"),
        )
        .mount(&server)
        .await;

    let page = client(0, Duration::from_secs(5))
        .get(&server.uri())
        .await
        .unwrap();
    assert_eq!(page.body, "café JUDOL");
    assert_eq!(page.body.chars().count(), 10);
}

#[tokio::test]
async fn timeout_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let started = Instant::now();
    let err = client(0, Duration::from_millis(300))
        .get(&server.uri())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Transport { attempts: 1, .. }), "{err:?}");
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn connection_refused_is_retried_then_reported() {
    let url = common::refused_url();
    let err = client(2, Duration::from_secs(2)).get(&url).await.unwrap_err();
    match err {
        FetchError::Transport { attempts, message } => {
            assert_eq!(attempts, 3);
            assert!(!message.is_empty());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn retry_after_header_honoured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let started = Instant::now();
    let page = client(1, Duration::from_secs(5))
        .get(&server.uri())
        .await
        .unwrap();
    assert_eq!(page.status, 200);
    assert!(started.elapsed() >= Duration::from_secs(1));
}
