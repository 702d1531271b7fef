mod client;

pub use client::{HttpSearchClient, DEFAULT_REMOTE_TIMEOUT, LOAD_PATH, SEARCH_PATH};
