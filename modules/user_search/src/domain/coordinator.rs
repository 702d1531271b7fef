use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, field::Empty, instrument, warn, Span};

use crate::contract::{
    client::UserSearchApi,
    error::UserSearchError,
    model::{SearchOptions, SearchOutcome, SearchResult, User},
};

/// Observable search state consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchState {
    pub query: String,
    pub users: Vec<User>,
    pub total: u64,
    pub loading: bool,
    pub error: Option<String>,
}

/// Sequence number of a coordinated request. Strictly increasing per
/// coordinator; the highest issued one is the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestSeq(u64);

impl RequestSeq {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Owns the search state and serializes every mutation through a watch
/// channel. Issuing a sequence number and the stale check at commit time both
/// run under the channel's lock, so the last request to start always wins.
pub struct SearchCoordinator {
    api: Arc<dyn UserSearchApi>,
    state: watch::Sender<SearchState>,
    seq: AtomicU64,
}

impl SearchCoordinator {
    pub fn new(api: Arc<dyn UserSearchApi>) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            api,
            state,
            seq: AtomicU64::new(0),
        }
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Sequence number of the most recently started request.
    pub fn current_seq(&self) -> RequestSeq {
        RequestSeq(self.seq.load(Ordering::SeqCst))
    }

    /// Run a search and commit its result unless a newer request started
    /// meanwhile. An empty (after trim) query resets the result state.
    #[instrument(
        name = "user_search.coordinator.perform_search",
        skip(self, opts),
        fields(seq = Empty)
    )]
    pub async fn perform_search(&self, query: &str, opts: SearchOptions) -> SearchOutcome {
        let trimmed = query.trim().to_string();

        let mut seq = RequestSeq(0);
        self.state.send_modify(|s| {
            // Every call supersedes whatever is still in flight, a reset included.
            seq = RequestSeq(self.seq.fetch_add(1, Ordering::SeqCst) + 1);
            s.query = trimmed.clone();
            if trimmed.is_empty() {
                s.users.clear();
                s.total = 0;
                s.loading = false;
            } else {
                s.loading = true;
            }
            s.error = None;
        });
        Span::current().record("seq", seq.get());

        if trimmed.is_empty() {
            return SearchOutcome::Cleared;
        }

        let outcome = self.api.search(&trimmed, opts).await;
        self.commit(seq, outcome)
    }

    fn commit(
        &self,
        seq: RequestSeq,
        outcome: Result<SearchResult, UserSearchError>,
    ) -> SearchOutcome {
        let mut committed = SearchOutcome::Stale;
        self.state.send_if_modified(|s| {
            if self.seq.load(Ordering::SeqCst) != seq.get() {
                return false;
            }
            match outcome {
                Ok(result) => {
                    s.users = result.users.clone();
                    s.total = result.total;
                    s.error = None;
                    committed = SearchOutcome::Committed(result);
                }
                Err(e) => {
                    // keep the last known users/total visible next to the error
                    let message = e.to_string();
                    warn!(error = %message, "Search failed");
                    s.error = Some(message.clone());
                    committed = SearchOutcome::Failed(message);
                }
            }
            s.loading = false;
            true
        });

        if committed == SearchOutcome::Stale {
            debug!(seq = seq.get(), current = self.current_seq().get(), "Dropping stale response");
        }
        committed
    }

    // --- direct setters, no side effects beyond the state change ---

    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.state.send_modify(|s| s.query = query);
    }

    pub fn set_results(&self, users: Vec<User>, total: u64) {
        self.state.send_modify(|s| {
            s.users = users;
            s.total = total;
        });
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.send_modify(|s| s.loading = loading);
    }

    pub fn set_error(&self, error: Option<String>) {
        self.state.send_modify(|s| s.error = error);
    }

    pub fn clear(&self) {
        self.state.send_modify(|s| *s = SearchState::default());
    }
}
