use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

use super::MockDataset;
use crate::contract::model::{SearchResult, User};
use crate::domain::error::DomainError;
use crate::domain::normalize::{digits_only, normalize};
use crate::domain::ports::LocalSearchPort;

/// Simulated network latency of the mock engine.
pub const DEFAULT_MOCK_DELAY: Duration = Duration::from_millis(200);

/// In-memory linear scan over a [`MockDataset`] that mimics a free-text
/// backend search.
#[derive(Debug, Clone)]
pub struct MockSearchEngine {
    dataset: MockDataset,
    delay: Duration,
}

impl MockSearchEngine {
    pub fn new(dataset: MockDataset) -> Self {
        Self {
            dataset,
            delay: DEFAULT_MOCK_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn dataset(&self) -> &MockDataset {
        &self.dataset
    }

    /// Matching without the artificial delay. `total` is the number of records
    /// returned after truncation, not the number of matches.
    pub fn scan(&self, query: &str, limit: usize) -> SearchResult {
        let needle = normalize(query);
        let users: Vec<User> = self
            .dataset
            .users()
            .iter()
            .filter(|u| matches(u, &needle))
            .take(limit)
            .cloned()
            .collect();
        let total = users.len() as u64;
        SearchResult { users, total }
    }
}

/// Partial, case- and punctuation-insensitive match on first name, last name
/// or SSN digits. Empty fields never match.
fn matches(user: &User, needle: &str) -> bool {
    let first = normalize(&user.first_name);
    let last = normalize(&user.last_name);
    let ssn = user.ssn.as_deref().map(digits_only).unwrap_or_default();

    [first, last, ssn]
        .iter()
        .any(|field| !field.is_empty() && field.contains(needle))
}

#[async_trait]
impl LocalSearchPort for MockSearchEngine {
    #[instrument(
        name = "user_search.mock.search",
        skip(self),
        fields(delay_ms = self.delay.as_millis() as u64)
    )]
    async fn search_local(&self, query: &str, limit: usize) -> Result<SearchResult, DomainError> {
        let result = self.scan(query, limit);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        debug!(returned = result.users.len(), "Mock search done");
        Ok(result)
    }
}
