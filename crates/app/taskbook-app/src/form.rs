//! Add/Edit task form.
//!
//! One controller serves both screens; [`FormMode`] decides whether a submit
//! creates or updates. The draft belongs to the controller alone and is
//! dropped on success.

use crate::gateway::{Guarded, SessionGateway};
use crate::navigation::{Notice, ScreenScope};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use taskbook_core::{Clock, TaskDraft, TaskId};
use taskbook_rest_client::ApiError;
use thiserror::Error;
use tracing::{debug, info};

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(TaskId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    /// Fresh create form, nothing typed yet.
    Empty,
    /// Edit form waiting for the record.
    Loading,
    Editing,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

impl FormPhase {
    pub fn accepts_input(&self) -> bool {
        matches!(self, FormPhase::Empty | FormPhase::Editing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Name,
    Course,
    Description,
    Lecturer,
    StartDate,
    EndDate,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FormField::Name => "Name",
            FormField::Course => "Course",
            FormField::Description => "Description",
            FormField::Lecturer => "Lecturer",
            FormField::StartDate => "Start date",
            FormField::EndDate => "End date",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Name(String),
    Course(String),
    Description(String),
    Lecturer(String),
    Finished(bool),
    ToggleFinished,
    StartDate(NaiveDate),
    EndDate(NaiveDate),
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }
}

/// Check a draft without touching the network.
pub fn validate(draft: &TaskDraft) -> FieldErrors {
    let mut errors = FieldErrors::default();

    for (field, value) in [
        (FormField::Name, &draft.name),
        (FormField::Course, &draft.course),
        (FormField::Description, &draft.description),
        (FormField::Lecturer, &draft.lecturer),
    ] {
        if value.trim().is_empty() {
            errors.insert(field, format!("{field} is required"));
        }
    }

    if draft.end_date < draft.start_date {
        errors.insert(FormField::EndDate, "End date cannot be before start date");
    }

    errors
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("The form cannot be edited while {0:?}")]
    NotEditable(FormPhase),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Ready,
    /// No session at mount; the user was redirected.
    NoSession,
    SignedOut,
    NotFound,
    Failed(ApiError),
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved,
    Invalid(FieldErrors),
    SignedOut,
    Failed(ApiError),
    Stale,
    /// Submit was not possible in the current phase.
    NotReady(FormPhase),
}

pub struct TaskFormController {
    gateway: Arc<SessionGateway>,
    clock: Arc<dyn Clock>,
    scope: ScreenScope,
    mode: FormMode,
    phase: FormPhase,
    draft: TaskDraft,
    errors: FieldErrors,
    error_message: Option<String>,
}

impl TaskFormController {
    pub fn new(gateway: Arc<SessionGateway>, clock: Arc<dyn Clock>, mode: FormMode) -> Self {
        let draft = TaskDraft::blank(clock.today());
        let phase = match mode {
            FormMode::Create => FormPhase::Empty,
            FormMode::Edit(_) => FormPhase::Loading,
        };
        Self {
            gateway,
            clock,
            scope: ScreenScope::new(),
            mode,
            phase,
            draft,
            errors: FieldErrors::default(),
            error_message: None,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Message from the last failed submit or load, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    /// Guard the screen and, for edits, fetch the record.
    pub async fn mount(&mut self) -> LoadOutcome {
        if self.gateway.require_session().is_none() {
            self.phase = FormPhase::Failed;
            return LoadOutcome::NoSession;
        }

        match self.mode {
            FormMode::Create => LoadOutcome::Ready,
            FormMode::Edit(id) => self.load(id).await,
        }
    }

    async fn load(&mut self, id: TaskId) -> LoadOutcome {
        self.phase = FormPhase::Loading;
        let result = self
            .gateway
            .call(&self.scope, move |client, token| async move {
                client.get_task(Some(&token), id).await
            })
            .await;

        match result {
            Guarded::Ok(task) => {
                debug!(%id, "Loaded task for editing");
                self.draft = task.to_draft();
                self.phase = FormPhase::Editing;
                LoadOutcome::Ready
            }
            Guarded::SignedOut => {
                self.phase = FormPhase::Failed;
                LoadOutcome::SignedOut
            }
            Guarded::Stale => LoadOutcome::Stale,
            Guarded::Failed(ApiError::NotFound) => {
                self.phase = FormPhase::Failed;
                self.error_message = Some(ApiError::NotFound.user_message());
                self.gateway.report("Task unavailable", &ApiError::NotFound);
                LoadOutcome::NotFound
            }
            Guarded::Failed(error) => {
                self.phase = FormPhase::Failed;
                self.error_message = Some(error.user_message());
                self.gateway.report("Failed to fetch task details", &error);
                LoadOutcome::Failed(error)
            }
        }
    }

    pub fn update(&mut self, update: FieldUpdate) -> Result<(), FormError> {
        if !self.phase.accepts_input() {
            return Err(FormError::NotEditable(self.phase));
        }

        match update {
            FieldUpdate::Name(value) => self.draft.name = value,
            FieldUpdate::Course(value) => self.draft.course = value,
            FieldUpdate::Description(value) => self.draft.description = value,
            FieldUpdate::Lecturer(value) => self.draft.lecturer = value,
            FieldUpdate::Finished(value) => self.draft.is_finished = value,
            FieldUpdate::ToggleFinished => self.draft.is_finished = !self.draft.is_finished,
            FieldUpdate::StartDate(value) => self.draft.start_date = value,
            FieldUpdate::EndDate(value) => self.draft.end_date = value,
        }
        self.phase = FormPhase::Editing;
        Ok(())
    }

    /// Validate, then create or update. Invalid drafts never reach the network.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if !self.phase.accepts_input() {
            return SubmitOutcome::NotReady(self.phase);
        }

        self.phase = FormPhase::Validating;
        let errors = validate(&self.draft);
        if !errors.is_empty() {
            self.errors = errors.clone();
            self.phase = FormPhase::Editing;
            return SubmitOutcome::Invalid(errors);
        }
        self.errors = FieldErrors::default();
        self.error_message = None;

        self.phase = FormPhase::Submitting;
        let draft = self.draft.clone();
        let mode = self.mode;
        let result = self
            .gateway
            .call(&self.scope, move |client, token| async move {
                match mode {
                    FormMode::Create => client.create_task(Some(&token), &draft).await,
                    FormMode::Edit(id) => client.update_task(Some(&token), id, &draft).await,
                }
            })
            .await;

        match result {
            Guarded::Ok(()) => {
                info!(mode = ?self.mode, "Task saved");
                self.phase = FormPhase::Succeeded;
                self.draft = TaskDraft::blank(self.clock.today());
                let message = match self.mode {
                    FormMode::Create => "Task created successfully!",
                    FormMode::Edit(_) => "Task updated successfully!",
                };
                self.gateway.notify(Notice::success("Success", message));
                SubmitOutcome::Saved
            }
            Guarded::SignedOut => {
                self.phase = FormPhase::Failed;
                SubmitOutcome::SignedOut
            }
            Guarded::Stale => SubmitOutcome::Stale,
            Guarded::Failed(error) => {
                self.phase = FormPhase::Editing;
                self.error_message = Some(error.user_message());
                let title = match self.mode {
                    FormMode::Create => "Failed to create task",
                    FormMode::Edit(_) => "Failed to update task",
                };
                self.gateway.report(title, &error);
                SubmitOutcome::Failed(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn filled() -> TaskDraft {
        let mut draft = TaskDraft::blank(date(2024, 1, 1));
        draft.name = "Essay".to_string();
        draft.course = "Ethics".to_string();
        draft.description = "Two pages".to_string();
        draft.lecturer = "Dr. Rahma".to_string();
        draft
    }

    #[test]
    fn test_blank_draft_reports_every_required_field() {
        let errors = validate(&TaskDraft::blank(date(2024, 1, 1)));

        assert_eq!(errors.len(), 4);
        for field in [
            FormField::Name,
            FormField::Course,
            FormField::Description,
            FormField::Lecturer,
        ] {
            assert!(errors.contains(field), "missing error for {field}");
        }
        assert_eq!(errors.get(FormField::Name), Some("Name is required"));
    }

    #[test]
    fn test_whitespace_only_counts_as_missing() {
        let mut draft = filled();
        draft.lecturer = "   ".to_string();

        let errors = validate(&draft);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains(FormField::Lecturer));
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let mut draft = filled();
        draft.start_date = date(2024, 1, 10);
        draft.end_date = date(2024, 1, 5);

        let errors = validate(&draft);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(FormField::EndDate),
            Some("End date cannot be before start date")
        );
    }

    #[test]
    fn test_same_day_range_is_valid() {
        let draft = filled();
        assert_eq!(draft.start_date, draft.end_date);
        assert!(validate(&draft).is_empty());
    }

    #[test]
    fn test_phase_input_rules() {
        assert!(FormPhase::Empty.accepts_input());
        assert!(FormPhase::Editing.accepts_input());
        assert!(!FormPhase::Loading.accepts_input());
        assert!(!FormPhase::Submitting.accepts_input());
        assert!(!FormPhase::Succeeded.accepts_input());
        assert!(!FormPhase::Failed.accepts_input());
    }
}
