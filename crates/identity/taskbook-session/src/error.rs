//! Session and storage error types.

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;
pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Storage location unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to persist session: {0}")]
    Persist(#[from] StorageError),

    #[error("Invalid user profile: {0}")]
    Profile(#[from] serde_json::Error),

    #[error("Login returned an empty token")]
    EmptyToken,
}
