//! The guard between screens and the API.
//!
//! [`SessionGateway`] is handed to every controller that needs the session. It
//! performs the mount-time check, attaches the current token to each call, and
//! turns a 401 into exactly one logout and one redirect to the login route no
//! matter how many requests fail at once.

use crate::navigation::{Navigator, Notice, Notifier, Route, ScreenScope};
use std::future::Future;
use std::sync::Arc;
use taskbook_rest_client::{ApiError, ApiResult, TaskApiClient};
use taskbook_session::{SessionStore, SessionTicket};
use tracing::{debug, info, warn};

/// Result of a session-guarded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
    Ok(T),
    /// The session is gone (never present, or torn down by a 401).
    SignedOut,
    /// The session changed or the screen was dismissed while the call was in
    /// flight; the result must not be applied.
    Stale,
    Failed(ApiError),
}

impl<T> Guarded<T> {
    pub fn is_signed_out(&self) -> bool {
        matches!(self, Guarded::SignedOut)
    }
}

pub struct SessionGateway {
    session: Arc<SessionStore>,
    client: TaskApiClient,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl SessionGateway {
    pub fn new(
        session: Arc<SessionStore>,
        client: TaskApiClient,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session,
            client,
            navigator,
            notifier,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn client(&self) -> &TaskApiClient {
        &self.client
    }

    pub fn navigate(&self, route: Route) {
        debug!(%route, "Navigating");
        self.navigator.navigate(route);
    }

    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    /// Surface a failed call to the user.
    pub fn report(&self, title: &str, error: &ApiError) {
        self.notify(Notice::error(title, error.user_message()));
    }

    /// Mount-time check for screens that need a session. With no token the
    /// user is told and sent to the login route; no request is made.
    pub fn require_session(&self) -> Option<SessionTicket> {
        let ticket = self.session.ticket();
        if ticket.token.is_some() {
            return Some(ticket);
        }

        info!("No session at mount, redirecting to login");
        self.notify(Notice::error("Not signed in", "Please log in to continue."));
        self.navigate(Route::Login);
        None
    }

    /// Run `op` with the current token.
    ///
    /// Without a session this returns [`Guarded::SignedOut`] silently: whoever
    /// ended the session already redirected.
    pub async fn call<T, F, Fut>(&self, scope: &ScreenScope, op: F) -> Guarded<T>
    where
        F: FnOnce(TaskApiClient, String) -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let ticket = self.session.ticket();
        let Some(token) = ticket.token else {
            debug!("Call skipped, no session");
            return Guarded::SignedOut;
        };

        let result = op(self.client.clone(), token).await;

        if let Err(ApiError::Unauthorized) = result {
            self.handle_unauthorized(ticket.epoch).await;
            return Guarded::SignedOut;
        }

        if !self.session.is_current(ticket.epoch) {
            debug!("Session changed during call, dropping result");
            return Guarded::Stale;
        }
        if !scope.is_active() {
            debug!("Screen dismissed during call, dropping result");
            return Guarded::Stale;
        }

        match result {
            Ok(value) => Guarded::Ok(value),
            Err(error) => Guarded::Failed(error),
        }
    }

    /// Tear down the session a 401 was observed on. Only the first caller for
    /// a given session does anything; returns whether this call did.
    pub async fn handle_unauthorized(&self, epoch: u64) -> bool {
        if !self.session.invalidate(epoch).await {
            debug!("Session already torn down, ignoring 401");
            return false;
        }

        warn!("Server rejected the session token, signing out");
        self.notify(Notice::error(
            "Session expired",
            ApiError::Unauthorized.user_message(),
        ));
        self.navigate(Route::Login);
        true
    }
}
