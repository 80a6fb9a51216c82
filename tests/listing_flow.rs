//! End-to-end listing flow against a mock HTTP server
//!
//! Exercises the full path: HTTP source → paging engine → listing façade,
//! for both reconciliation strategies.

use pagestream::source::{HttpPostSource, HttpSourceConfig};
use pagestream::{
    build_repository, settled, MemoryPostStore, NetworkState, PageDirection, PostSource,
    PostStore, RepositoryKind,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
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
                    "score": 7,
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

fn source_for(server: &MockServer) -> Arc<dyn PostSource> {
    let config = HttpSourceConfig::builder()
        .base_url(server.uri())
        .timeout(Duration::from_secs(2))
        .build();
    Arc::new(HttpPostSource::with_config(config))
}

async fn assert_settles_loaded(watch: &mut pagestream::NetworkStateWatch) {
    let state = tokio::time::timeout(Duration::from_secs(2), settled(watch))
        .await
        .expect("state never settled");
    assert_eq!(state, NetworkState::Loaded);
}

#[tokio::test]
async fn test_db_engine_pages_through_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/rust/top.json"))
        .and(query_param("limit", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing_body(&["a", "b"], None, Some("t3_b"))),
        )
        .mount(&server)
        .await;

    let store: Arc<dyn PostStore> = Arc::new(MemoryPostStore::new());
    let repo = build_repository(RepositoryKind::Db, source_for(&server), Arc::clone(&store));

    let listing = repo.open("rust", 2);
    let mut state = listing.watch_network_state();
    assert_settles_loaded(&mut state).await;

    let posts = listing.feed().snapshot().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, "t3_a");
    assert_eq!(posts[0].position, 0);
    assert_eq!(posts[1].position, 1);

    // Approaching the end appends another page with contiguous positions.
    listing.on_approaching_edge(PageDirection::After);
    assert_settles_loaded(&mut state).await;

    let posts = listing.feed().snapshot().unwrap();
    assert_eq!(posts.len(), 4);
    assert_eq!(
        posts.iter().map(|p| p.position).collect::<Vec<_>>(),
        vec![0, 1, 2, 3]
    );
}

#[tokio::test]
async fn test_db_engine_refresh_resets_positions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/rust/top.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing_body(&["a", "b"], None, None)),
        )
        .mount(&server)
        .await;

    let store: Arc<dyn PostStore> = Arc::new(MemoryPostStore::new());
    let repo = build_repository(RepositoryKind::Db, source_for(&server), Arc::clone(&store));

    let listing = repo.open("rust", 2);
    let mut state = listing.watch_network_state();
    assert_settles_loaded(&mut state).await;
    listing.on_approaching_edge(PageDirection::After);
    assert_settles_loaded(&mut state).await;
    assert_eq!(listing.feed().snapshot().unwrap().len(), 4);

    let mut refresh_state = listing.watch_refresh_state();
    listing.refresh();
    let state = tokio::time::timeout(Duration::from_secs(2), settled(&mut refresh_state))
        .await
        .expect("refresh never settled");
    assert_eq!(state, NetworkState::Loaded);

    let posts = listing.feed().snapshot().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(
        posts.iter().map(|p| p.position).collect::<Vec<_>>(),
        vec![0, 1]
    );
}

#[tokio::test]
async fn test_mem_engine_follows_cursors_until_exhausted() {
    let server = MockServer::start().await;

    // Page keyed off the cursor returned by the initial load. Mounted before
    // the generic mock so the cursor match is attempted first.
    Mock::given(method("GET"))
        .and(path("/r/rust/top.json"))
        .and(query_param("after", "t3_abc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing_body(&["c", "d"], None, None)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/rust/top.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing_body(&["a", "b"], None, Some("t3_abc"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store: Arc<dyn PostStore> = Arc::new(MemoryPostStore::new());
    let repo = build_repository(RepositoryKind::InMemory, source_for(&server), store);

    let listing = repo.open("rust", 2);
    let mut state = listing.watch_network_state();
    assert_settles_loaded(&mut state).await;
    assert_eq!(listing.feed().snapshot().unwrap().len(), 2);

    listing.on_approaching_edge(PageDirection::After);
    assert_settles_loaded(&mut state).await;

    let posts = listing.feed().snapshot().unwrap();
    assert_eq!(
        posts.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
        vec!["t3_a", "t3_b", "t3_c", "t3_d"]
    );

    // The second page carried no cursor: further triggers never hit the
    // server again (enforced by the expect(1) mock counts on drop).
    listing.on_approaching_edge(PageDirection::After);
    listing.on_approaching_edge(PageDirection::After);
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_error_surfaces_on_state_stream_and_retry_recovers() {
    let server = MockServer::start().await;

    // First request fails, the retried one succeeds.
    Mock::given(method("GET"))
        .and(path("/r/rust/top.json"))
        .respond_with(ResponseTemplate::new(503).set_body_string("over capacity"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/rust/top.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing_body(&["a", "b"], None, None)),
        )
        .mount(&server)
        .await;

    let store: Arc<dyn PostStore> = Arc::new(MemoryPostStore::new());
    let repo = build_repository(RepositoryKind::Db, source_for(&server), store);

    let listing = repo.open("rust", 2);
    let mut state = listing.watch_network_state();
    let failed = tokio::time::timeout(Duration::from_secs(2), settled(&mut state))
        .await
        .expect("state never settled");
    match failed {
        NetworkState::Error { message } => assert!(message.contains("503")),
        other => panic!("expected error state, got {other:?}"),
    }
    assert!(listing.feed().snapshot().unwrap().is_empty());

    listing.retry();
    assert_settles_loaded(&mut state).await;
    assert_eq!(listing.feed().snapshot().unwrap().len(), 2);
}
