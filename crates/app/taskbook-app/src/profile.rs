use crate::gateway::SessionGateway;
use crate::navigation::Route;
use std::sync::Arc;
use taskbook_core::User;

/// Profile screen: shows who is signed in and offers logout.
pub struct ProfileController {
    gateway: Arc<SessionGateway>,
}

impl ProfileController {
    pub fn new(gateway: Arc<SessionGateway>) -> Self {
        Self { gateway }
    }

    /// Returns the signed-in user, or `None` after redirecting to login.
    pub fn mount(&self) -> Option<User> {
        self.gateway.require_session()?;
        self.user()
    }

    pub fn user(&self) -> Option<User> {
        self.gateway.session().current_user()
    }

    pub async fn logout(&self) {
        self.gateway.session().logout().await;
        self.gateway.navigate(Route::Login);
    }
}
