//! Unified error handling for the client runtime.

use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::remote::RemoteError;

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("{0}")]
    Engine(#[from] justdo_engine::Error),

    #[error("Remote store error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Whether the error came from a task id that is not in the list.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ClientError::Engine(justdo_engine::Error::TaskNotFound(_))
        )
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
