//! The single failure type returned by every API call.

use std::collections::BTreeMap;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// HTTP 401: the token is missing, invalid or expired.
    #[error("Session expired or not authorized")]
    Unauthorized,

    /// HTTP 404.
    #[error("Record not found")]
    NotFound,

    /// HTTP 5xx.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(String),

    /// Any other 4xx. `errors` holds per-field messages when the server sent them.
    #[error("Request rejected ({status}): {message}")]
    Validation {
        status: u16,
        message: String,
        errors: BTreeMap<String, Vec<String>>,
    },

    /// Login or registration answered with `success: false`.
    #[error("{0}")]
    Rejected(String),

    /// A success status whose body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Transient failures the user may simply try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Server { .. } | ApiError::Network(_))
    }

    /// Text suitable for a user-facing notice.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            ApiError::NotFound => "Record not found.".to_string(),
            ApiError::Server { .. } => {
                "The server had a problem handling the request. Please try again.".to_string()
            }
            ApiError::Network(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            ApiError::Validation { message, .. } => message.clone(),
            ApiError::Rejected(message) => message.clone(),
            ApiError::InvalidResponse(_) => "The server sent an unexpected response.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ApiError::InvalidResponse(error.to_string())
        } else {
            ApiError::Network(error.to_string())
        }
    }
}
