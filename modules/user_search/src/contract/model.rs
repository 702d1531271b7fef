use std::fmt;

/// User identifier as delivered by the data source. Backends may send either
/// numbers or strings; uniqueness is assumed, not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserId {
    Number(u64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{n}"),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for UserId {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

/// Pure user model shared between layers (wire DTOs live in `infra::dto`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<u32>,
    pub role: Option<String>,
    pub ssn: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
    pub company: Option<Company>,
    pub image: Option<String>,
}

impl User {
    /// Minimal record, mostly useful for fixtures
    pub fn new(id: impl Into<UserId>, first_name: &str, last_name: &str) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            age: None,
            role: None,
            ssn: None,
            email: None,
            phone: None,
            address: None,
            company: None,
            image: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Address {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Company {
    pub name: Option<String>,
    pub department: Option<String>,
    pub title: Option<String>,
}

/// One search answer. `users` keeps source order; `total` is whatever the
/// source reported and is not guaranteed to equal `users.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchResult {
    pub users: Vec<User>,
    pub total: u64,
}

impl SearchResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Per-call search options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    /// Maximum number of records; `None` uses the configured default (50).
    pub limit: Option<usize>,
}

impl SearchOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self { limit: Some(limit) }
    }
}

/// What happened to a coordinated search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Latest request; its result is now the visible state
    Committed(SearchResult),
    /// Query was empty after trimming; state was reset
    Cleared,
    /// A newer request started before this one completed; nothing was touched
    Stale,
    /// Latest request failed; the message is now the visible error
    Failed(String),
}
