//! Integration tests for the retrying fetch client
//!
//! A local wiremock server plays the upstream; delays are millisecond-scale.

mod common;

use common::{fast_client, fast_policy};
use plan_aggregator::{PlanError, ResilientClient, RetryPolicy, Source};
use serde_json::{json, Value};
use std::time::Duration;
use test_log::test;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn statista() -> Source {
    Source::provider("statista")
}

#[test(tokio::test)]
async fn test_server_error_then_success_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/search", server.uri());
    let body: Value = assert_ok!(
        fast_client()
            .send_json(&statista(), |client| client.get(url.as_str()))
            .await
    );
    assert_eq!(body, json!({"items": []}));
}

#[test(tokio::test)]
async fn test_client_error_fails_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such category"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/search", server.uri());
    let err = assert_err!(
        fast_client()
            .send_json::<Value, _>(&statista(), |client| client.get(url.as_str()))
            .await
    );

    match err {
        PlanError::Source { origin, message } => {
            assert_eq!(origin, statista());
            assert!(message.contains("404"), "unexpected message: {}", message);
            assert!(message.contains("no such category"));
            assert!(!message.contains("attempts"));
        }
        other => panic!("expected source failure, got {:?}", other),
    }
}

#[test(tokio::test)]
async fn test_exhausted_retries_name_the_source() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .expect(4)
        .mount(&server)
        .await;

    let url = format!("{}/search", server.uri());
    let err = assert_err!(
        fast_client()
            .send_json::<Value, _>(&statista(), |client| client.get(url.as_str()))
            .await
    );

    let text = err.to_string();
    assert!(text.starts_with("provider:statista failed"), "{}", text);
    assert!(text.contains("HTTP 500"));
    assert!(text.contains("after 4 attempts"));
}

#[test(tokio::test)]
async fn test_post_is_not_retried_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/v1/chat/completions", server.uri());
    let err = assert_err!(
        fast_client()
            .send_json::<Value, _>(&Source::Analysis, |client| {
                client.post(url.as_str()).json(&json!({"model": "gpt-4"}))
            })
            .await
    );
    assert!(err.to_string().starts_with("analysis failed: HTTP 503"));
}

#[test(tokio::test)]
async fn test_timeout_is_retried_then_attributed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .expect(2)
        .mount(&server)
        .await;

    let policy = RetryPolicy {
        max_retries: 1,
        ..fast_policy()
    };
    let client = ResilientClient::with_policy(Duration::from_millis(50), policy).unwrap();

    let url = format!("{}/slow", server.uri());
    let err = assert_err!(
        client
            .send_json::<Value, _>(&Source::provider("crunchbase"), |c| c.get(url.as_str()))
            .await
    );
    let text = err.to_string();
    assert!(text.starts_with("provider:crunchbase failed: request timed out"), "{}", text);
    assert!(text.contains("after 2 attempts"));
}

#[test(tokio::test)]
async fn test_malformed_success_body_is_attributed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/search", server.uri());
    let err = assert_err!(
        fast_client()
            .send_json::<Value, _>(&statista(), |client| client.get(url.as_str()))
            .await
    );
    assert!(err.to_string().contains("malformed response body"));
}
