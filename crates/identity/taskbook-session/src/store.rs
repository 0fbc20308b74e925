//! The session store: the single owner of the signed-in token and profile.
//!
//! Reads are synchronous and served from memory. Writes go to the backing
//! [`SessionStorage`] first and only then flip the in-memory state, so the
//! session is either fully established or absent.
//!
//! Every transition bumps an epoch counter. Callers snapshot it with
//! [`SessionStore::ticket`] before a request and compare afterwards; a changed
//! epoch means the result belongs to a session that no longer exists.

use crate::error::{SessionError, SessionResult};
use crate::storage::{SessionStorage, TOKEN_KEY, USER_KEY};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use taskbook_core::{Session, User};
use tracing::{debug, info, instrument, warn};

/// Snapshot of the session taken when a request is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTicket {
    pub epoch: u64,
    pub token: Option<String>,
}

#[derive(Debug, Default)]
struct SessionState {
    session: Option<Session>,
    epoch: u64,
}

pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    state: RwLock<SessionState>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            state: RwLock::new(SessionState::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the persisted session into memory.
    ///
    /// Storage failures, a token without a profile (or the reverse), and an
    /// unreadable profile all count as "no session". Returns whether a session
    /// was restored.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> bool {
        let restored = match self.load_persisted().await {
            Ok(session) => session,
            Err(e) => {
                warn!("Could not read persisted session: {}", e);
                None
            }
        };

        let found = restored.is_some();
        let mut state = self.write();
        if state.session != restored {
            state.session = restored;
            state.epoch += 1;
        }
        drop(state);

        if found {
            info!("Restored persisted session");
        } else {
            debug!("No persisted session");
        }
        found
    }

    async fn load_persisted(&self) -> SessionResult<Option<Session>> {
        let token = self.storage.get(TOKEN_KEY).await?;
        let user = self.storage.get(USER_KEY).await?;

        match (token, user) {
            (Some(token), Some(user)) if !token.is_empty() => {
                let user: User = serde_json::from_str(&user)?;
                Ok(Some(Session::new(token, user)))
            }
            (None, None) => Ok(None),
            _ => {
                warn!("Persisted session is incomplete, ignoring it");
                Ok(None)
            }
        }
    }

    /// Establish a session. Both entries are persisted in one write before the
    /// in-memory state changes; if persisting fails nothing changes.
    #[instrument(skip(self, token, user), fields(email = %user.email))]
    pub async fn login(&self, token: impl Into<String>, user: User) -> SessionResult<()> {
        let token = token.into();
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }

        let session = Session::new(token, user);
        let profile = serde_json::to_string(session.user())?;
        self.storage
            .set_many(&[(TOKEN_KEY, session.token().to_string()), (USER_KEY, profile)])
            .await?;

        let mut state = self.write();
        state.session = Some(session);
        state.epoch += 1;
        drop(state);

        info!("Session established");
        Ok(())
    }

    /// Clear the session. The in-memory state is cleared first and
    /// unconditionally; failing to erase the persisted copy is only logged.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        {
            let mut state = self.write();
            state.session = None;
            state.epoch += 1;
        }
        self.erase_persisted().await;
        info!("Session cleared");
    }

    /// Clear the session only if it is still the one `epoch` was taken from.
    ///
    /// Of several callers holding the same epoch exactly one gets `true`; the
    /// rest see the bumped epoch and get `false`.
    pub async fn invalidate(&self, epoch: u64) -> bool {
        {
            let mut state = self.write();
            if state.epoch != epoch || state.session.is_none() {
                return false;
            }
            state.session = None;
            state.epoch += 1;
        }
        self.erase_persisted().await;
        info!("Session invalidated by server");
        true
    }

    async fn erase_persisted(&self) {
        if let Err(e) = self.storage.remove_many(&[TOKEN_KEY, USER_KEY]).await {
            warn!("Failed to erase persisted session: {}", e);
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.read().session.clone()
    }

    pub fn current_token(&self) -> Option<String> {
        self.read().session.as_ref().map(|s| s.token().to_string())
    }

    pub fn current_user(&self) -> Option<User> {
        self.read().session.as_ref().map(|s| s.user().clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().session.is_some()
    }

    pub fn ticket(&self) -> SessionTicket {
        let state = self.read();
        SessionTicket {
            epoch: state.epoch,
            token: state.session.as_ref().map(|s| s.token().to_string()),
        }
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        self.read().epoch == epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileSessionStorage, InMemorySessionStorage};
    use tempfile::TempDir;

    fn user() -> User {
        User {
            name: "A".to_string(),
            email: "a@b.com".to_string(),
            token: "abc".to_string(),
        }
    }

    #[tokio::test]
    async fn test_restore_from_empty_storage() {
        let store = SessionStore::new(Arc::new(InMemorySessionStorage::new()));

        assert!(!store.restore().await);
        assert_eq!(store.current_token(), None);
        assert_eq!(store.current_user(), None);
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_persists_token_and_profile() {
        let storage = Arc::new(InMemorySessionStorage::new());
        let store = SessionStore::new(storage.clone());

        store.login("abc", user()).await.unwrap();

        assert_eq!(store.current_token().as_deref(), Some("abc"));
        assert_eq!(store.current_user().unwrap().name, "A");

        let persisted = storage.snapshot().await;
        assert_eq!(persisted.get(TOKEN_KEY).map(String::as_str), Some("abc"));
        let profile: User = serde_json::from_str(&persisted[USER_KEY]).unwrap();
        assert_eq!(profile, user());
    }

    #[tokio::test]
    async fn test_login_fails_cleanly_when_storage_unavailable() {
        let storage = Arc::new(InMemorySessionStorage::new());
        storage.set_unavailable(true);
        let store = SessionStore::new(storage);

        let result = store.login("abc", user()).await;
        assert!(matches!(result, Err(SessionError::Persist(_))));
        assert_eq!(store.current_token(), None);
        assert_eq!(store.current_user(), None);
    }

    #[tokio::test]
    async fn test_login_rejects_empty_token() {
        let store = SessionStore::new(Arc::new(InMemorySessionStorage::new()));
        assert!(matches!(
            store.login("", user()).await,
            Err(SessionError::EmptyToken)
        ));
    }

    #[tokio::test]
    async fn test_logout_succeeds_without_storage() {
        let storage = Arc::new(InMemorySessionStorage::new());
        let store = SessionStore::new(storage.clone());
        store.login("abc", user()).await.unwrap();

        storage.set_unavailable(true);
        store.logout().await;

        assert_eq!(store.current_token(), None);
        assert_eq!(store.current_user(), None);
    }

    #[tokio::test]
    async fn test_restore_survives_restart() {
        let temp_dir = TempDir::new().unwrap();

        let first = SessionStore::new(Arc::new(FileSessionStorage::in_dir(temp_dir.path())));
        first.login("abc", user()).await.unwrap();

        let second = SessionStore::new(Arc::new(FileSessionStorage::in_dir(temp_dir.path())));
        assert!(second.restore().await);
        assert_eq!(second.current_token().as_deref(), Some("abc"));
        assert_eq!(second.current_user().unwrap().email, "a@b.com");

        // Idempotent.
        let epoch = second.ticket().epoch;
        assert!(second.restore().await);
        assert_eq!(second.ticket().epoch, epoch);

        second.logout().await;
        let third = SessionStore::new(Arc::new(FileSessionStorage::in_dir(temp_dir.path())));
        assert!(!third.restore().await);
    }

    #[tokio::test]
    async fn test_restore_ignores_half_written_session() {
        let storage = Arc::new(InMemorySessionStorage::new());
        storage
            .set_many(&[(TOKEN_KEY, "abc".to_string())])
            .await
            .unwrap();
        let store = SessionStore::new(storage.clone());
        assert!(!store.restore().await);

        storage
            .set_many(&[(USER_KEY, "{broken".to_string())])
            .await
            .unwrap();
        assert!(!store.restore().await);
        assert_eq!(store.current_user(), None);
    }

    #[tokio::test]
    async fn test_invalidate_fires_once_per_epoch() {
        let store = SessionStore::new(Arc::new(InMemorySessionStorage::new()));
        store.login("abc", user()).await.unwrap();
        let ticket = store.ticket();

        let (first, second) = tokio::join!(
            store.invalidate(ticket.epoch),
            store.invalidate(ticket.epoch)
        );
        assert!(first ^ second);
        assert!(!store.is_authenticated());
        assert!(!store.is_current(ticket.epoch));
    }

    #[tokio::test]
    async fn test_invalidate_ignores_older_epoch() {
        let store = SessionStore::new(Arc::new(InMemorySessionStorage::new()));
        store.login("old", user()).await.unwrap();
        let stale = store.ticket();
        store.login("new", user()).await.unwrap();

        assert!(!store.invalidate(stale.epoch).await);
        assert_eq!(store.current_token().as_deref(), Some("new"));
    }
}
