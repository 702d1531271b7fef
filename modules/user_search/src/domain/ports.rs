use async_trait::async_trait;

use crate::contract::model::SearchResult;
use crate::domain::error::DomainError;

/// Backend search endpoint (GET search + POST load).
/// Only constructed when a backend base URL is configured.
#[async_trait]
pub trait RemoteSearchPort: Send + Sync {
    async fn search_remote(&self, query: &str, limit: usize) -> Result<SearchResult, DomainError>;
    async fn load_remote(&self) -> Result<(), DomainError>;
}

/// In-process search over a local dataset, used directly in mock mode and as
/// the fallback when the backend fails.
#[async_trait]
pub trait LocalSearchPort: Send + Sync {
    async fn search_local(&self, query: &str, limit: usize) -> Result<SearchResult, DomainError>;
}
