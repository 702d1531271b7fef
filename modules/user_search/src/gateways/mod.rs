pub mod search;

pub use search::{SearchGateway, DEFAULT_LIMIT};
