//! Client-side session management for taskbook.
//!
//! [`SessionStore`] owns the token and user profile; [`SessionStorage`]
//! implementations persist them across restarts.

pub mod error;
pub mod storage;
pub mod store;

pub use error::{SessionError, SessionResult, StorageError, StorageResult};
pub use storage::{FileSessionStorage, InMemorySessionStorage, SessionStorage, TOKEN_KEY, USER_KEY};
pub use store::{SessionStore, SessionTicket};
