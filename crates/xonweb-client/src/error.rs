//! Error types for xonweb-client

use thiserror::Error;
use xonweb_core::error::{ErrorCode, ErrorDetails};
use xonweb_core::{ErrorSeverity, ValidationError};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Non-success response; `detail` is the server's `detail` field when present
    #[error("Server returned {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Request failed: {message}")]
    Transport { message: String },

    #[error("Unexpected response body: {message}")]
    Decode { message: String },

    #[error("Session storage error: {message}")]
    Session { message: String },

    /// Some requests of a bulk operation failed
    #[error("{failed} of {total} requests failed")]
    PartialFailure { failed: usize, total: usize },
}

impl ClientError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ClientError::Validation(_) => ErrorCode::ValidationError,
            ClientError::Decode { .. } => ErrorCode::InvalidFormat,
            _ => ErrorCode::InternalError,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ClientError::Validation(_) | ClientError::Unauthorized => ErrorSeverity::Warning,
            ClientError::Session { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Message shown to the user in place of the raw error
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(error) => error.to_string(),
            ClientError::Api { detail, .. } if !detail.is_empty() => detail.clone(),
            ClientError::Api { status, .. } => format!("Request failed with status {}", status),
            ClientError::Unauthorized => "Your session has expired, please log in again".to_string(),
            ClientError::Transport { .. } => "Cannot reach the server".to_string(),
            ClientError::Decode { .. } => "The server sent an unexpected response".to_string(),
            ClientError::Session { .. } => "Could not access the saved session".to_string(),
            ClientError::PartialFailure { .. } => "Failed to delete some transactions".to_string(),
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        let details = ErrorDetails::new(self.code(), self.user_message());
        match self {
            ClientError::Unauthorized => details.with_suggestion("Run `xonweb login` again.".to_string()),
            ClientError::Transport { .. } => {
                details.with_suggestion("Check api.base_url in the configuration.".to_string())
            }
            ClientError::PartialFailure { failed, total } => details
                .with_detail(serde_json::json!({ "failed": failed, "total": total }))
                .with_suggestion("Reload the list and retry the remaining items.".to_string()),
            _ => details,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ClientError::Decode {
                message: error.to_string(),
            }
        } else {
            ClientError::Transport {
                message: error.to_string(),
            }
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(error: std::io::Error) -> Self {
        ClientError::Session {
            message: error.to_string(),
        }
    }
}

/// Result type with ClientError
pub type ClientResult<T> = Result<T, ClientError>;
