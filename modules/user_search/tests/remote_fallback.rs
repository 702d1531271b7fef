//! Backend adapter and fallback behaviour against a mock HTTP server

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use httpmock::prelude::*;
use serde_json::json;

use user_search::{
    contract::{
        client::UserSearchApi,
        error::UserSearchError,
        model::{SearchOptions, SearchOutcome, SearchResult, UserId},
    },
    domain::{
        error::DomainError,
        ports::{LocalSearchPort, RemoteSearchPort},
    },
    gateways::SearchGateway,
    infra::remote::HttpSearchClient,
    UserSearch, UserSearchConfig,
};

fn config_for(base_url: String) -> UserSearchConfig {
    UserSearchConfig {
        api_url: base_url,
        mock_delay_ms: 0,
        ..UserSearchConfig::default()
    }
}

struct BrokenLocal;

#[async_trait]
impl LocalSearchPort for BrokenLocal {
    async fn search_local(&self, _query: &str, _limit: usize) -> Result<SearchResult, DomainError> {
        Err(DomainError::mock_search("dataset unavailable"))
    }
}

#[tokio::test]
async fn backend_results_are_committed_as_is() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/users/search")
                .query_param("q", "emi")
                .query_param("limit", "50");
            then.status(200).json_body(json!({
                "users": [
                    { "id": 101, "firstName": "Remote", "lastName": "Emison", "age": 41, "role": "admin" }
                ],
                "total": 7
            }));
        })
        .await;

    let search = UserSearch::from_config(config_for(server.base_url())).unwrap();
    assert!(search.has_backend());

    let coordinator = search.coordinator();
    let outcome = coordinator
        .perform_search("emi", SearchOptions::default())
        .await;

    mock.assert_async().await;
    assert!(matches!(outcome, SearchOutcome::Committed(_)));
    let state = coordinator.snapshot();
    assert_eq!(state.total, 7);
    assert_eq!(state.users.len(), 1);
    assert_eq!(state.users[0].id, UserId::Number(101));
    assert_eq!(state.users[0].first_name, "Remote");
    assert_eq!(state.users[0].age, Some(41));
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn explicit_limit_is_forwarded() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/users/search")
                .query_param("q", "ann marie")
                .query_param("limit", "5");
            then.status(200).json_body(json!({ "users": [] }));
        })
        .await;

    let client = HttpSearchClient::new(&server.base_url(), Duration::from_secs(2)).unwrap();
    let result = client.search_remote("ann marie", 5).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result, SearchResult::empty());
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/gateway/api/v1/users/search");
            then.status(200).json_body(json!({ "users": [], "total": 0 }));
        })
        .await;

    let client =
        HttpSearchClient::new(&format!("{}/gateway", server.base_url()), Duration::from_secs(2))
            .unwrap();
    client.search_remote("abc", 10).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn server_error_falls_back_to_mock_results() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/users/search");
            then.status(500).body("boom");
        })
        .await;

    let search = UserSearch::from_config(config_for(server.base_url())).unwrap();
    let coordinator = search.coordinator();
    let outcome = coordinator
        .perform_search("emily", SearchOptions::default())
        .await;

    assert_eq!(mock.hits_async().await, 1);
    assert!(matches!(outcome, SearchOutcome::Committed(_)));
    let state = coordinator.snapshot();
    assert_eq!(state.error, None);
    assert!(!state.loading);
    assert!(!state.users.is_empty());
    assert!(state.users.iter().all(|u| u.first_name == "Emily"));
}

#[tokio::test]
async fn slow_backend_times_out_and_falls_back() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/users/search");
            then.status(200)
                .delay(Duration::from_secs(2))
                .json_body(json!({ "users": [{ "id": 999, "firstName": "Too", "lastName": "Late" }] }));
        })
        .await;

    let config = UserSearchConfig {
        timeout_ms: 100,
        ..config_for(server.base_url())
    };
    let search = UserSearch::from_config(config).unwrap();
    let coordinator = search.coordinator();

    let started = std::time::Instant::now();
    let outcome = coordinator
        .perform_search("hall", SearchOptions::default())
        .await;

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(100), "backend was not awaited: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "request was not cut short: {elapsed:?}");
    assert!(matches!(outcome, SearchOutcome::Committed(_)));
    let state = coordinator.snapshot();
    assert_eq!(state.error, None);
    assert!(!state.loading);
    assert_eq!(state.users.len(), 1);
    assert_eq!(state.users[0].last_name, "Hall");
}

#[tokio::test]
async fn non_object_body_falls_back_to_mock_results() {
    for body in ["null", "[]", "\"users\"", "<html></html>"] {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/users/search");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(body);
            })
            .await;

        let search = UserSearch::from_config(config_for(server.base_url())).unwrap();
        let result = search
            .api()
            .search("hall", SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(result.users.len(), 1, "body {body}");
        assert_eq!(result.users[0].last_name, "Hall", "body {body}");
    }
}

#[tokio::test]
async fn partial_payload_is_repaired_without_fallback() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/users/search");
            then.status(200).json_body(json!({
                "users": [
                    { "id": "a1", "firstName": "Kim", "lastName": "Park", "age": "forty" },
                    42,
                    { "firstName": "No", "lastName": "Id" },
                    { "id": 7, "lastName": "Solo", "address": "not an object" }
                ]
            }));
        })
        .await;

    let client = HttpSearchClient::new(&server.base_url(), Duration::from_secs(2)).unwrap();
    let result = client.search_remote("kim", 50).await.unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.users[0].id, UserId::Text("a1".into()));
    assert_eq!(result.users[0].age, None);
    assert_eq!(result.users[1].id, UserId::Number(7));
    assert_eq!(result.users[1].first_name, "");
    assert_eq!(result.users[1].address, None);
}

#[tokio::test]
async fn unreachable_backend_falls_back() {
    // nothing listens on the discard port
    let search = UserSearch::from_config(config_for("http://127.0.0.1:9".into())).unwrap();
    let result = search
        .api()
        .search("emily", SearchOptions::default())
        .await
        .unwrap();
    assert!(!result.is_empty());
}

#[tokio::test]
async fn double_failure_reports_backend_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/users/search");
            then.status(500);
        })
        .await;

    let remote: Arc<dyn RemoteSearchPort> =
        Arc::new(HttpSearchClient::new(&server.base_url(), Duration::from_secs(2)).unwrap());
    let gateway = Arc::new(SearchGateway::new(Some(remote), Arc::new(BrokenLocal)));
    let search = UserSearch::with_gateway(config_for(server.base_url()), gateway);

    let coordinator = search.coordinator();
    let outcome = coordinator
        .perform_search("emily", SearchOptions::default())
        .await;

    let expected = "Remote search failed: HTTP 500 Internal Server Error";
    assert_eq!(outcome, SearchOutcome::Failed(expected.to_string()));
    let state = coordinator.snapshot();
    assert_eq!(state.error.as_deref(), Some(expected));
    assert!(!state.loading);
}

#[tokio::test]
async fn load_posts_to_backend() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/users/load");
            then.status(200);
        })
        .await;

    let search = UserSearch::from_config(config_for(server.base_url())).unwrap();
    search.api().load().await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn load_failure_is_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/users/load");
            then.status(503);
        })
        .await;

    let search = UserSearch::from_config(config_for(server.base_url())).unwrap();
    let err = search.api().load().await.unwrap_err();
    assert_eq!(err, UserSearchError::remote_load("HTTP 503 Service Unavailable"));
    assert_eq!(
        err.to_string(),
        "Failed to load users: HTTP 503 Service Unavailable"
    );
}
