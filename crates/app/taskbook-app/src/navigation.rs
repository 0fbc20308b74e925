//! Routes and the UI-facing seams the controllers drive.
//!
//! The host application implements [`Navigator`], [`Notifier`] and
//! [`Confirmer`]; controllers never render anything themselves.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use taskbook_core::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Splash,
    Login,
    SignUp,
    Home,
    AddTask,
    EditTask(TaskId),
    Profile,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Splash => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::SignUp => "/signup".to_string(),
            Route::Home => "/home".to_string(),
            Route::AddTask => "/add".to_string(),
            Route::EditTask(id) => format!("/edit/{id}"),
            Route::Profile => "/profile".to_string(),
        }
    }

    pub fn requires_session(&self) -> bool {
        matches!(
            self,
            Route::Home | Route::AddTask | Route::EditTask(_) | Route::Profile
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A blocking message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Asks the user a yes/no question.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Liveness of one mounted screen. Results arriving after the screen is
/// dismissed are dropped instead of being written into its state.
#[derive(Debug, Clone)]
pub struct ScreenScope {
    active: Arc<AtomicBool>,
}

impl Default for ScreenScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenScope {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// A detached handle the host keeps to dismiss the screen while a
    /// request is still in flight.
    pub fn handle(&self) -> ScreenHandle {
        ScreenHandle {
            active: Arc::clone(&self.active),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScreenHandle {
    active: Arc<AtomicBool>,
}

impl ScreenHandle {
    pub fn dismiss(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}
