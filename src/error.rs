use thiserror::Error;

/// Message used when the server gives no reason for a failure
pub const GENERIC_FAILURE: &str = "Something went wrong!";

/// Errors raised at the REST boundary
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Broker identity is required")]
    MissingBroker,

    #[error("{field} {message}")]
    Validation { field: String, message: String },

    /// Non-success status; `message` is taken from the `{ message }` body when present
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Text shown to the user, falling back when the failure carries no message
    pub fn user_message(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
