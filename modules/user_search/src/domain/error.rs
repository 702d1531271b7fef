use thiserror::Error;

/// Domain-specific errors raised by the search ports
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Remote search failed: {message}")]
    RemoteSearch { message: String },

    #[error("Unexpected response shape from backend: {message}")]
    MalformedPayload { message: String },

    #[error("Remote load failed: {message}")]
    RemoteLoad { message: String },

    #[error("Mock search failed: {message}")]
    MockSearch { message: String },

    #[error("Invalid backend base URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },
}

impl DomainError {
    pub fn remote_search(message: impl Into<String>) -> Self {
        Self::RemoteSearch {
            message: message.into(),
        }
    }

    pub fn malformed_payload(message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }

    pub fn remote_load(message: impl Into<String>) -> Self {
        Self::RemoteLoad {
            message: message.into(),
        }
    }

    pub fn mock_search(message: impl Into<String>) -> Self {
        Self::MockSearch {
            message: message.into(),
        }
    }

    pub fn invalid_base_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidBaseUrl {
            url: url.into(),
            message: message.into(),
        }
    }
}
