//! Application bootstrap.
//!
//! [`AppShell::start`] wires configuration, tracing, session storage and the
//! API client together, restores any saved session, and routes to the first
//! screen. Controllers for each screen are created from the shell so they all
//! share one session.

use crate::auth::AuthController;
use crate::config::AppConfig;
use crate::form::{FormMode, TaskFormController};
use crate::gateway::SessionGateway;
use crate::list::TaskListController;
use crate::navigation::{Confirmer, Navigator, Notifier, Route};
use crate::profile::ProfileController;
use crate::telemetry;
use anyhow::{Context, Result};
use std::sync::Arc;
use taskbook_core::{Clock, SystemClock, TaskId};
use taskbook_rest_client::TaskApiClientBuilder;
use taskbook_session::{FileSessionStorage, SessionStorage, SessionStore};
use tracing::info;

pub struct AppShell {
    config: AppConfig,
    gateway: Arc<SessionGateway>,
    confirmer: Arc<dyn Confirmer>,
    clock: Arc<dyn Clock>,
    initial_route: Route,
}

impl AppShell {
    /// Start with file-backed session storage.
    pub async fn start(
        config: AppConfig,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Result<Self> {
        let storage: Arc<dyn SessionStorage> = match &config.storage.dir {
            Some(dir) => Arc::new(FileSessionStorage::in_dir(dir)),
            None => Arc::new(
                FileSessionStorage::default_location()
                    .context("Failed to locate session storage")?,
            ),
        };
        Self::start_with_storage(config, storage, navigator, notifier, confirmer).await
    }

    pub async fn start_with_storage(
        config: AppConfig,
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Result<Self> {
        config.validate()?;
        telemetry::init(&config.logging)?;

        let mut builder = TaskApiClientBuilder::new(config.api.base_url.clone());
        if let Some(timeout) = config.api.timeout() {
            builder = builder.with_timeout(timeout);
        }
        let client = builder.build().context("Failed to build API client")?;

        let session = Arc::new(SessionStore::new(storage));
        let restored = session.restore().await;

        let initial_route = if restored { Route::Home } else { Route::Login };
        info!(base_url = %config.api.base_url, %initial_route, "Application started");

        let gateway = Arc::new(SessionGateway::new(session, client, navigator, notifier));
        gateway.navigate(initial_route);

        Ok(Self {
            config,
            gateway,
            confirmer,
            clock: Arc::new(SystemClock),
            initial_route,
        })
    }

    /// Replace the clock used for dates and completion.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn initial_route(&self) -> Route {
        self.initial_route
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.gateway.session()
    }

    pub fn gateway(&self) -> &Arc<SessionGateway> {
        &self.gateway
    }

    pub fn auth(&self) -> AuthController {
        AuthController::new(Arc::clone(&self.gateway))
    }

    pub fn profile(&self) -> ProfileController {
        ProfileController::new(Arc::clone(&self.gateway))
    }

    pub fn task_list(&self) -> TaskListController {
        TaskListController::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.clock),
            Arc::clone(&self.confirmer),
        )
    }

    pub fn add_task(&self) -> TaskFormController {
        TaskFormController::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.clock),
            FormMode::Create,
        )
    }

    pub fn edit_task(&self, id: TaskId) -> TaskFormController {
        TaskFormController::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.clock),
            FormMode::Edit(id),
        )
    }
}
