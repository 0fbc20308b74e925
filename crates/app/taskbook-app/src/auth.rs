//! Login and sign-up screens.

use crate::gateway::SessionGateway;
use crate::navigation::{Notice, Route};
use std::sync::Arc;
use taskbook_rest_client::{ApiError, LoginRequest, RegisterRequest};
use tracing::{error, info, instrument, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Names of the fields left blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        missing(&[("email", &self.email), ("password", &self.password)])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    pub name: String,
    pub npm: String,
    pub email: String,
    pub password: String,
}

impl SignUpForm {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        missing(&[
            ("name", &self.name),
            ("npm", &self.npm),
            ("email", &self.email),
            ("password", &self.password),
        ])
    }
}

fn missing(fields: &[(&'static str, &String)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    SignedIn,
    Registered,
    /// Required fields were blank; nothing was sent.
    Invalid(Vec<&'static str>),
    /// The server said no, with the message it gave.
    Rejected(String),
    Failed(ApiError),
    /// Login succeeded but the session could not be saved.
    NotPersisted,
}

pub struct AuthController {
    gateway: Arc<SessionGateway>,
}

impl AuthController {
    pub fn new(gateway: Arc<SessionGateway>) -> Self {
        Self { gateway }
    }

    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn login(&self, form: &LoginForm) -> AuthOutcome {
        let missing = form.missing_fields();
        if !missing.is_empty() {
            return AuthOutcome::Invalid(missing);
        }

        let request = LoginRequest {
            email: form.email.trim().to_string(),
            password: form.password.clone(),
        };
        let data = match self.gateway.client().login(request).await {
            Ok(data) => data,
            Err(ApiError::Rejected(message)) => {
                info!("Login rejected");
                self.gateway.notify(Notice::error("Error", message.clone()));
                return AuthOutcome::Rejected(message);
            }
            Err(e) => {
                warn!("Login failed: {}", e);
                self.gateway.report("Login failed", &e);
                return AuthOutcome::Failed(e);
            }
        };

        let (token, user) = data.into_user();
        if let Err(e) = self.gateway.session().login(token, user).await {
            error!("Failed to persist session: {}", e);
            self.gateway.notify(Notice::error(
                "Error",
                "Signed in, but the session could not be saved. Please try again.",
            ));
            return AuthOutcome::NotPersisted;
        }

        self.gateway
            .notify(Notice::success("Success", "Signed in successfully!"));
        self.gateway.navigate(Route::Home);
        AuthOutcome::SignedIn
    }

    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: &SignUpForm) -> AuthOutcome {
        let missing = form.missing_fields();
        if !missing.is_empty() {
            return AuthOutcome::Invalid(missing);
        }

        let request = RegisterRequest {
            name: form.name.trim().to_string(),
            npm: form.npm.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.password.clone(),
        };
        match self.gateway.client().register(request).await {
            Ok(()) => {
                info!("Account created");
                self.gateway
                    .notify(Notice::success("Success", "Account created successfully!"));
                self.gateway.navigate(Route::Login);
                AuthOutcome::Registered
            }
            Err(ApiError::Rejected(message)) => {
                self.gateway.notify(Notice::error("Error", message.clone()));
                AuthOutcome::Rejected(message)
            }
            Err(e) => {
                warn!("Registration failed: {}", e);
                self.gateway.report("Sign up failed", &e);
                AuthOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_form_missing_fields() {
        assert_eq!(
            LoginForm::default().missing_fields(),
            vec!["email", "password"]
        );
        assert_eq!(
            LoginForm::new("a@b.com", " ").missing_fields(),
            vec!["password"]
        );
        assert!(LoginForm::new("a@b.com", "x").missing_fields().is_empty());
    }

    #[test]
    fn test_signup_form_reports_in_field_order() {
        let form = SignUpForm {
            name: "A".to_string(),
            email: "a@b.com".to_string(),
            ..Default::default()
        };
        assert_eq!(form.missing_fields(), vec!["npm", "password"]);
    }
}
