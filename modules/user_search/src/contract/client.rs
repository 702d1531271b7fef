use async_trait::async_trait;

use crate::contract::{
    error::UserSearchError,
    model::{SearchOptions, SearchResult},
};

/// Public API trait for user search that presentation layers can use
#[async_trait]
pub trait UserSearchApi: Send + Sync {
    /// Search users by free text (first name, last name or SSN digits)
    async fn search(
        &self,
        query: &str,
        opts: SearchOptions,
    ) -> Result<SearchResult, UserSearchError>;

    /// Ask the backend to load its user set into memory.
    /// A no-op when no backend is configured.
    async fn load(&self) -> Result<(), UserSearchError>;
}
