use thiserror::Error;

/// Errors that are safe to expose to presentation layers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserSearchError {
    #[error("{message}")]
    RemoteSearch { message: String },

    #[error("Failed to load users: {message}")]
    RemoteLoad { message: String },

    #[error("Mock search failed: {message}")]
    MockSearch { message: String },

    #[error("Internal error")]
    Internal,
}

impl UserSearchError {
    pub fn remote_search(message: impl Into<String>) -> Self {
        Self::RemoteSearch {
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

    pub fn internal() -> Self {
        Self::Internal
    }
}
