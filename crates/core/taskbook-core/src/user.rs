//! Signed-in user profile and the combined session record.

use serde::{Deserialize, Serialize};

/// Profile returned by a successful login. Persisted as JSON next to the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub token: String,
}

/// A token together with the profile it belongs to.
///
/// The two halves only ever exist together: there is no way to build a
/// `Session` without both, and the user's token always matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    user: User,
}

impl Session {
    pub fn new(token: impl Into<String>, mut user: User) -> Self {
        let token = token.into();
        user.token = token.clone();
        Self { token, user }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user(&self) -> &User {
        &self.user
    }
}
