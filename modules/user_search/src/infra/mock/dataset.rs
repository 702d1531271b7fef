use anyhow::Context;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

use crate::contract::model::User;
use crate::infra::dto::decode_users;

static EMBEDDED_JSON: &str = include_str!("../../../data/users.json");

static EMBEDDED: Lazy<MockDataset> = Lazy::new(|| MockDataset::from_json_str(EMBEDDED_JSON));

/// Immutable, shareable collection of user records backing the mock engine.
#[derive(Debug, Clone)]
pub struct MockDataset {
    users: Arc<[User]>,
}

impl MockDataset {
    /// Dataset compiled into the binary (`data/users.json`), parsed once.
    pub fn embedded() -> Self {
        EMBEDDED.clone()
    }

    pub fn from_users(users: Vec<User>) -> Self {
        Self {
            users: users.into(),
        }
    }

    /// Parse `{"users": [...]}`. A malformed document yields an empty dataset.
    pub fn from_json_str(raw: &str) -> Self {
        let parsed: Result<Value, _> = serde_json::from_str(raw);
        let users = match parsed {
            Ok(doc) => match doc.get("users").and_then(Value::as_array) {
                Some(entries) => decode_users(entries),
                None => {
                    warn!("Mock dataset has no 'users' array; search will return no matches");
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(error = %e, "Mock dataset is not valid JSON; search will return no matches");
                Vec::new()
            }
        };
        Self::from_users(users)
    }

    /// Read a dataset file. I/O failures are errors; bad content degrades to empty.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read mock dataset {}", path.display()))?;
        Ok(Self::from_json_str(&raw))
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
