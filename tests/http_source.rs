//! HTTP source tests against a mock server
//!
//! Verifies the request shape (path, query parameters, headers) and the
//! decoding of the listing envelope, including failure classification.

use pagestream::source::{HttpPostSource, HttpSourceConfig};
use pagestream::{Error, PageDirection, PostSource};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn listing_body(ids: &[&str], before: Option<&str>, after: Option<&str>) -> serde_json::Value {
    let children: Vec<_> = ids
        .iter()
        .map(|id| {
            json!({
                "data": {
                    "name": format!("t3_{id}"),
                    "title": format!("post {id}"),
                    "author": "someone",
                    "score": 42,
                    "created_utc": 1_700_000_000.0
                }
            })
        })
        .collect();
    json!({
        "data": {
            "children": children,
            "before": before,
            "after": after
        }
    })
}

fn source_for(server: &MockServer) -> HttpPostSource {
    let config = HttpSourceConfig::builder()
        .base_url(server.uri())
        .user_agent("tester/1.0")
        .build();
    HttpPostSource::with_config(config)
}

#[tokio::test]
async fn test_fetch_top_decodes_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/rust/top.json"))
        .and(query_param("limit", "2"))
        .and(header("user-agent", "tester/1.0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing_body(&["a", "b"], None, Some("t3_b"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(&server);
    let page = source.fetch_top("rust", 2).await.unwrap();

    assert_eq!(page.posts.len(), 2);
    assert_eq!(page.posts[0].id, "t3_a");
    assert_eq!(page.posts[0].title, "post a");
    assert_eq!(page.posts[0].author, "someone");
    assert_eq!(page.posts[0].score, 42);
    assert_eq!(page.posts[0].collection, "rust");
    assert_eq!(page.posts[0].created_at.timestamp(), 1_700_000_000);
    assert_eq!(page.after.as_deref(), Some("t3_b"));
    assert!(page.before.is_none());
}

#[tokio::test]
async fn test_fetch_page_sends_cursor_for_direction() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/rust/top.json"))
        .and(query_param("limit", "5"))
        .and(query_param("after", "t3_xyz"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing_body(&["c"], None, None)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/rust/top.json"))
        .and(query_param("before", "t3_xyz"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing_body(&["z"], None, None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(&server);
    let forward = source
        .fetch_page("rust", 5, "t3_xyz", PageDirection::After)
        .await
        .unwrap();
    assert_eq!(forward.posts[0].id, "t3_c");

    let backward = source
        .fetch_page("rust", 5, "t3_xyz", PageDirection::Before)
        .await
        .unwrap();
    assert_eq!(backward.posts[0].id, "t3_z");
}

#[tokio::test]
async fn test_server_error_is_classified_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let source = source_for(&server);
    let err = source.fetch_top("rust", 2).await.unwrap_err();
    match &err {
        Error::HttpStatus { status, body } => {
            assert_eq!(*status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_client_error_is_not_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such listing"))
        .mount(&server)
        .await;

    let source = source_for(&server);
    let err = source.fetch_top("nope", 2).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_invalid_base_url_is_rejected_before_sending() {
    let config = HttpSourceConfig::builder()
        .base_url("not a base url")
        .build();
    let source = HttpPostSource::with_config(config);

    let err = source.fetch_top("rust", 2).await.unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_malformed_payload_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let source = source_for(&server);
    let err = source.fetch_top("rust", 2).await.unwrap_err();
    assert!(matches!(err, Error::Malformed { .. }));
    assert!(!err.is_retryable());
}
