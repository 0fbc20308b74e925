//! Request and response bodies for the task API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use taskbook_core::User;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub npm: String,
    pub email: String,
    pub password: String,
}

/// Payload of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginData {
    pub token: String,
    pub name: String,
    pub email: String,
}

impl LoginData {
    pub fn into_user(self) -> (String, User) {
        let user = User {
            name: self.name,
            email: self.email,
            token: self.token.clone(),
        };
        (self.token, user)
    }
}

/// The `{ success, message, data }` wrapper every endpoint answers with.
/// Task endpoints omit `success`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Error body shape: `{ "message": "...", "errors": { "field": ["..."] } }`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: BTreeMap<String, FieldMessages>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum FieldMessages {
    Many(Vec<String>),
    One(String),
}

impl FieldMessages {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            FieldMessages::Many(messages) => messages,
            FieldMessages::One(message) => vec![message],
        }
    }
}
