//! Home screen: the task collection split into completed and incomplete.

use crate::gateway::{Guarded, SessionGateway};
use crate::navigation::{Confirmer, Notice, ScreenScope};
use std::sync::Arc;
use taskbook_core::{Clock, Partition, Task, TaskId, partition};
use taskbook_rest_client::ApiError;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Number of tasks now held.
    Loaded(usize),
    NoSession,
    SignedOut,
    Failed(ApiError),
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
    SignedOut,
    Failed(ApiError),
    Stale,
}

pub struct TaskListController {
    gateway: Arc<SessionGateway>,
    clock: Arc<dyn Clock>,
    confirmer: Arc<dyn Confirmer>,
    scope: ScreenScope,
    tasks: Vec<Task>,
}

impl TaskListController {
    pub fn new(
        gateway: Arc<SessionGateway>,
        clock: Arc<dyn Clock>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        Self {
            gateway,
            clock,
            confirmer,
            scope: ScreenScope::new(),
            tasks: Vec::new(),
        }
    }

    pub fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    /// Tasks in server order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Split against today's date. Evaluated on every call so a task moves
    /// to completed once its end date has passed.
    pub fn partition(&self) -> Partition<'_> {
        partition(&self.tasks, self.clock.today())
    }

    pub fn completed(&self) -> Vec<&Task> {
        self.partition().completed
    }

    pub fn incomplete(&self) -> Vec<&Task> {
        self.partition().incomplete
    }

    pub async fn mount(&mut self) -> RefreshOutcome {
        if self.gateway.require_session().is_none() {
            return RefreshOutcome::NoSession;
        }
        self.refresh().await
    }

    pub async fn refresh(&mut self) -> RefreshOutcome {
        let result = self
            .gateway
            .call(&self.scope, |client, token| async move {
                client.list_tasks(Some(&token)).await
            })
            .await;

        match result {
            Guarded::Ok(tasks) => {
                debug!(count = tasks.len(), "Task list refreshed");
                self.tasks = tasks;
                RefreshOutcome::Loaded(self.tasks.len())
            }
            Guarded::SignedOut => RefreshOutcome::SignedOut,
            Guarded::Stale => RefreshOutcome::Stale,
            Guarded::Failed(error) => {
                self.gateway.report("Failed to load tasks", &error);
                RefreshOutcome::Failed(error)
            }
        }
    }

    /// Ask for confirmation, delete on the server, then drop the local copy.
    /// Local state only changes after the server confirms.
    pub async fn delete(&mut self, id: TaskId) -> DeleteOutcome {
        let confirmed = self
            .confirmer
            .confirm("Delete task", "Are you sure you want to delete this task?")
            .await;
        if !confirmed {
            debug!(%id, "Delete cancelled");
            return DeleteOutcome::Cancelled;
        }

        let result = self
            .gateway
            .call(&self.scope, move |client, token| async move {
                client.delete_task(Some(&token), id).await
            })
            .await;

        match result {
            Guarded::Ok(()) => {
                info!(%id, "Task deleted");
                self.remove_local(id);
                self.gateway
                    .notify(Notice::success("Success", "Task deleted successfully!"));
                DeleteOutcome::Deleted
            }
            Guarded::SignedOut => DeleteOutcome::SignedOut,
            Guarded::Stale => DeleteOutcome::Stale,
            Guarded::Failed(error) => {
                self.gateway.report("Failed to delete task", &error);
                DeleteOutcome::Failed(error)
            }
        }
    }

    /// Drop the task with `id` if present. Returns whether anything was removed.
    pub fn remove_local(&mut self, id: TaskId) -> bool {
        match self.tasks.iter().position(|task| task.id == id) {
            Some(index) => {
                self.tasks.remove(index);
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }
}
