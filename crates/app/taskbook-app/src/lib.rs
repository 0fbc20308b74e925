//! Screen controllers for the taskbook client.
//!
//! The host UI implements [`Navigator`], [`Notifier`] and [`Confirmer`], starts
//! an [`AppShell`], and drives one controller per screen. Every controller that
//! talks to the API goes through a shared [`SessionGateway`], which owns the
//! rules for missing and expired sessions.

pub mod auth;
pub mod config;
pub mod form;
pub mod gateway;
pub mod list;
pub mod navigation;
pub mod profile;
pub mod shell;
pub mod telemetry;

pub use auth::{AuthController, AuthOutcome, LoginForm, SignUpForm};
pub use config::{ApiConfig, AppConfig, LoggingConfig, StorageConfig};
pub use form::{
    FieldErrors, FieldUpdate, FormError, FormField, FormMode, FormPhase, LoadOutcome,
    SubmitOutcome, TaskFormController,
};
pub use gateway::{Guarded, SessionGateway};
pub use list::{DeleteOutcome, RefreshOutcome, TaskListController};
pub use navigation::{
    Confirmer, Navigator, Notice, NoticeKind, Notifier, Route, ScreenHandle, ScreenScope,
};
pub use profile::ProfileController;
pub use shell::AppShell;
