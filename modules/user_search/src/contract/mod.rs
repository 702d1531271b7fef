pub mod client;
pub mod error;
pub mod model;

pub use client::UserSearchApi;
pub use error::UserSearchError;
pub use model::{Address, Company, SearchOptions, SearchOutcome, SearchResult, User, UserId};
