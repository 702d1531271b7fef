use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::contract::{
    client::UserSearchApi,
    error::UserSearchError,
    model::{SearchOptions, SearchResult},
};
use crate::domain::error::DomainError;
use crate::domain::ports::{LocalSearchPort, RemoteSearchPort};

/// Result size used when the caller does not pass a limit.
pub const DEFAULT_LIMIT: usize = 50;

/// Implementation of the UserSearchApi that prefers the backend and falls back
/// to the local search engine.
///
/// Without a backend every search goes to the local engine and `load` is a
/// no-op. With a backend, any remote failure (transport, HTTP status, payload
/// shape) triggers exactly one local search; if that fails too the original
/// remote error is returned.
#[derive(Clone)]
pub struct SearchGateway {
    remote: Option<Arc<dyn RemoteSearchPort>>,
    local: Arc<dyn LocalSearchPort>,
    default_limit: usize,
}

impl SearchGateway {
    pub fn new(remote: Option<Arc<dyn RemoteSearchPort>>, local: Arc<dyn LocalSearchPort>) -> Self {
        Self {
            remote,
            local,
            default_limit: DEFAULT_LIMIT,
        }
    }

    /// Mock-only gateway.
    pub fn local_only(local: Arc<dyn LocalSearchPort>) -> Self {
        Self::new(None, local)
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn has_backend(&self) -> bool {
        self.remote.is_some()
    }

    async fn fall_back(
        &self,
        query: &str,
        limit: usize,
        remote_err: DomainError,
    ) -> Result<SearchResult, UserSearchError> {
        match &remote_err {
            DomainError::MalformedPayload { message } => {
                warn!(%message, "Unexpected response shape from backend, falling back to mock");
            }
            other => {
                warn!(error = %other, "Backend search failed, falling back to mock data");
            }
        }

        match self.local.search_local(query, limit).await {
            Ok(result) => Ok(result),
            Err(mock_err) => {
                error!(error = %mock_err, "Mock search failed after backend failure");
                Err(map_domain_error(remote_err))
            }
        }
    }
}

#[async_trait]
impl UserSearchApi for SearchGateway {
    #[instrument(
        name = "user_search.gateway.search",
        skip(self, opts),
        fields(backend = self.remote.is_some())
    )]
    async fn search(
        &self,
        query: &str,
        opts: SearchOptions,
    ) -> Result<SearchResult, UserSearchError> {
        if query.trim().is_empty() {
            return Ok(SearchResult::empty());
        }

        let limit = opts.limit.unwrap_or(self.default_limit);

        let Some(remote) = &self.remote else {
            return self
                .local
                .search_local(query, limit)
                .await
                .map_err(map_domain_error);
        };

        match remote.search_remote(query, limit).await {
            Ok(result) => {
                debug!(returned = result.users.len(), total = result.total, "Backend search ok");
                Ok(result)
            }
            Err(remote_err) => self.fall_back(query, limit, remote_err).await,
        }
    }

    #[instrument(name = "user_search.gateway.load", skip(self))]
    async fn load(&self) -> Result<(), UserSearchError> {
        let Some(remote) = &self.remote else {
            info!("No backend configured, skipping load request");
            return Ok(());
        };

        match remote.load_remote().await {
            Ok(()) => {
                info!("Users loaded into memory successfully");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to load users into memory");
                Err(map_domain_error(e))
            }
        }
    }
}

/// Map domain errors to contract errors
fn map_domain_error(domain_error: DomainError) -> UserSearchError {
    match domain_error {
        DomainError::RemoteSearch { .. }
        | DomainError::MalformedPayload { .. }
        | DomainError::InvalidBaseUrl { .. } => {
            UserSearchError::remote_search(domain_error.to_string())
        }
        DomainError::RemoteLoad { message } => UserSearchError::remote_load(message),
        DomainError::MockSearch { message } => UserSearchError::mock_search(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::User;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tracing_test::traced_test;

    /// Scripted remote: returns the queued outcome and counts calls.
    struct FakeRemote {
        search: Mutex<Option<Result<SearchResult, DomainError>>>,
        load: Result<(), DomainError>,
        calls: AtomicUsize,
    }

    impl FakeRemote {
        fn new(search: Result<SearchResult, DomainError>) -> Self {
            Self {
                search: Mutex::new(Some(search)),
                load: Ok(()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RemoteSearchPort for FakeRemote {
        async fn search_remote(
            &self,
            _query: &str,
            _limit: usize,
        ) -> Result<SearchResult, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.search
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(DomainError::remote_search("exhausted")))
        }

        async fn load_remote(&self) -> Result<(), DomainError> {
            self.load.clone()
        }
    }

    struct FakeLocal {
        outcome: Result<SearchResult, DomainError>,
        calls: AtomicUsize,
        seen_limit: AtomicUsize,
    }

    impl FakeLocal {
        fn ok(result: SearchResult) -> Self {
            Self {
                outcome: Ok(result),
                calls: AtomicUsize::new(0),
                seen_limit: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                outcome: Err(DomainError::mock_search("dataset corrupted")),
                calls: AtomicUsize::new(0),
                seen_limit: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LocalSearchPort for FakeLocal {
        async fn search_local(&self, _query: &str, limit: usize) -> Result<SearchResult, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_limit.store(limit, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn result_of(names: &[&str], total: u64) -> SearchResult {
        SearchResult {
            users: names
                .iter()
                .enumerate()
                .map(|(i, n)| User::new(i as u64 + 1, n, "Doe"))
                .collect(),
            total,
        }
    }

    #[tokio::test]
    async fn blank_query_short_circuits() {
        let local = Arc::new(FakeLocal::ok(result_of(&["Jane"], 1)));
        let remote = Arc::new(FakeRemote::new(Ok(result_of(&["Remote"], 1))));
        let gw = SearchGateway::new(Some(remote.clone()), local.clone());

        for q in ["", "   ", "\t\n"] {
            assert_eq!(gw.search(q, SearchOptions::default()).await.unwrap(), SearchResult::empty());
        }
        assert_eq!(local.calls.load(Ordering::SeqCst), 0);
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn mock_only_delegates_with_default_limit() {
        let local = Arc::new(FakeLocal::ok(result_of(&["Jane"], 1)));
        let gw = SearchGateway::local_only(local.clone());

        let r = gw.search("jan", SearchOptions::default()).await.unwrap();
        assert_eq!(r.total, 1);
        assert_eq!(local.seen_limit.load(Ordering::SeqCst), DEFAULT_LIMIT);

        gw.search("jan", SearchOptions::with_limit(5)).await.unwrap();
        assert_eq!(local.seen_limit.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn mock_only_propagates_mock_error() {
        let gw = SearchGateway::local_only(Arc::new(FakeLocal::failing()));
        let err = gw.search("jan", SearchOptions::default()).await.unwrap_err();
        assert_eq!(err, UserSearchError::mock_search("dataset corrupted"));
    }

    #[tokio::test]
    async fn remote_success_is_returned_as_is() {
        let local = Arc::new(FakeLocal::ok(result_of(&["Local"], 1)));
        let remote = Arc::new(FakeRemote::new(Ok(result_of(&["Remote"], 99))));
        let gw = SearchGateway::new(Some(remote), local.clone());

        let r = gw.search("rem", SearchOptions::default()).await.unwrap();
        assert_eq!(r.total, 99);
        assert_eq!(r.users[0].first_name, "Remote");
        assert_eq!(local.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn remote_failure_falls_back_once() {
        let local = Arc::new(FakeLocal::ok(result_of(&["Local"], 1)));
        let remote = Arc::new(FakeRemote::new(Err(DomainError::remote_search("HTTP 500"))));
        let gw = SearchGateway::new(Some(remote.clone()), local.clone());

        let r = gw.search("loc", SearchOptions::default()).await.unwrap();
        assert_eq!(r.users[0].first_name, "Local");
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
        assert_eq!(local.calls.load(Ordering::SeqCst), 1);
    }

    #[traced_test]
    #[tokio::test]
    async fn fallback_is_logged_as_warning() {
        let local = Arc::new(FakeLocal::ok(result_of(&["Local"], 1)));
        let remote = Arc::new(FakeRemote::new(Err(DomainError::remote_search("HTTP 502"))));
        let gw = SearchGateway::new(Some(remote), local);

        gw.search("loc", SearchOptions::default()).await.unwrap();
        assert!(logs_contain("falling back to mock data"));
        assert!(logs_contain("HTTP 502"));
    }

    #[tokio::test]
    async fn malformed_payload_falls_back() {
        let local = Arc::new(FakeLocal::ok(result_of(&["Local"], 1)));
        let remote = Arc::new(FakeRemote::new(Err(DomainError::malformed_payload("null"))));
        let gw = SearchGateway::new(Some(remote), local.clone());

        let r = gw.search("loc", SearchOptions::default()).await.unwrap();
        assert_eq!(r.users[0].first_name, "Local");
    }

    #[tokio::test]
    async fn double_failure_surfaces_original_remote_error() {
        let remote = Arc::new(FakeRemote::new(Err(DomainError::remote_search("connection refused"))));
        let gw = SearchGateway::new(Some(remote), Arc::new(FakeLocal::failing()));

        let err = gw.search("abc", SearchOptions::default()).await.unwrap_err();
        assert_eq!(
            err,
            UserSearchError::remote_search("Remote search failed: connection refused")
        );
    }

    #[tokio::test]
    async fn load_without_backend_is_noop() {
        let gw = SearchGateway::local_only(Arc::new(FakeLocal::failing()));
        assert!(gw.load().await.is_ok());
        assert!(!gw.has_backend());
    }

    #[tokio::test]
    async fn load_failure_propagates() {
        let mut remote = FakeRemote::new(Ok(SearchResult::empty()));
        remote.load = Err(DomainError::remote_load("HTTP 503 Service Unavailable"));
        let gw = SearchGateway::new(Some(Arc::new(remote)), Arc::new(FakeLocal::failing()));

        let err = gw.load().await.unwrap_err();
        assert_eq!(err, UserSearchError::remote_load("HTTP 503 Service Unavailable"));
    }
}
