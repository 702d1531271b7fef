use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the user_search module (`modules.user_search`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UserSearchConfig {
    /// Backend base URL; empty means mock-only mode.
    #[serde(default)]
    pub api_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_mock_delay_ms")]
    pub mock_delay_ms: u64,
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Optional JSON file replacing the embedded mock dataset.
    #[serde(default)]
    pub dataset_path: Option<String>,
}

impl Default for UserSearchConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            timeout_ms: default_timeout_ms(),
            default_limit: default_limit(),
            mock_delay_ms: default_mock_delay_ms(),
            min_query_len: default_min_query_len(),
            debounce_ms: default_debounce_ms(),
            dataset_path: None,
        }
    }
}

impl UserSearchConfig {
    /// Deserialize from the module's configuration bag entry; a missing entry
    /// yields the defaults.
    pub fn from_module_value(value: Option<&serde_json::Value>) -> anyhow::Result<Self> {
        match value {
            None | Some(serde_json::Value::Null) => Ok(Self::default()),
            Some(v) => serde_json::from_value(v.clone())
                .context("Invalid configuration for module 'user_search'"),
        }
    }

    /// Backend base URL, `None` when unset or blank.
    pub fn backend_url(&self) -> Option<&str> {
        let url = self.api_url.trim();
        (!url.is_empty()).then_some(url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn mock_delay(&self) -> Duration {
        Duration::from_millis(self.mock_delay_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_timeout_ms() -> u64 {
    8_000
}

fn default_limit() -> usize {
    50
}

fn default_mock_delay_ms() -> u64 {
    200
}

fn default_min_query_len() -> usize {
    3
}

fn default_debounce_ms() -> u64 {
    300
}
