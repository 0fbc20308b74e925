#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use taskbook_app::{AppConfig, AppShell, Confirmer, Navigator, Notice, NoticeKind, Notifier, Route};
use taskbook_core::FixedClock;
use taskbook_session::{InMemorySessionStorage, SessionStorage, TOKEN_KEY, USER_KEY};
use wiremock::MockServer;

pub const TODAY: (i32, u32, u32) = (2024, 1, 10);

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }

    pub fn count(&self, route: Route) -> usize {
        self.routes().into_iter().filter(|r| *r == route).count()
    }

    pub fn last(&self) -> Option<Route> {
        self.routes().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn titled(&self, title: &str) -> usize {
        self.notices().iter().filter(|n| n.title == title).count()
    }

    pub fn errors(&self) -> usize {
        self.notices()
            .iter()
            .filter(|n| n.kind == NoticeKind::Error)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Answers confirmations from a script; says no once the script runs out.
#[derive(Default)]
pub struct ScriptedConfirmer {
    answers: Mutex<VecDeque<bool>>,
    asked: AtomicUsize,
}

impl ScriptedConfirmer {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            asked: AtomicUsize::new(0),
        }
    }

    pub fn asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, _title: &str, _message: &str) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answers.lock().unwrap().pop_front().unwrap_or(false)
    }
}

pub struct Harness {
    pub server: MockServer,
    pub storage: Arc<InMemorySessionStorage>,
    pub navigator: Arc<RecordingNavigator>,
    pub notifier: Arc<RecordingNotifier>,
    pub confirmer: Arc<ScriptedConfirmer>,
    pub shell: AppShell,
}

impl Harness {
    /// Fresh install: nothing persisted.
    pub async fn signed_out(answers: &[bool]) -> Self {
        Self::start(Arc::new(InMemorySessionStorage::new()), answers).await
    }

    /// A session for token `abc` is already persisted.
    pub async fn signed_in(answers: &[bool]) -> Self {
        let storage = Arc::new(InMemorySessionStorage::new());
        let user = json!({"name": "A", "email": "a@b.com", "token": "abc"}).to_string();
        storage
            .set_many(&[(TOKEN_KEY, "abc".to_string()), (USER_KEY, user)])
            .await
            .unwrap();
        Self::start(storage, answers).await
    }

    async fn start(storage: Arc<InMemorySessionStorage>, answers: &[bool]) -> Self {
        let server = MockServer::start().await;
        let navigator = Arc::new(RecordingNavigator::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let confirmer = Arc::new(ScriptedConfirmer::answering(answers));

        let mut config = AppConfig::default();
        config.api.base_url = format!("{}/api", server.uri());
        config.logging.level = "warn".to_string();

        let (y, m, d) = TODAY;
        let shell = AppShell::start_with_storage(
            config,
            storage.clone(),
            navigator.clone(),
            notifier.clone(),
            confirmer.clone(),
        )
        .await
        .unwrap()
        .with_clock(Arc::new(FixedClock(date(y, m, d))));

        Self {
            server,
            storage,
            navigator,
            notifier,
            confirmer,
            shell,
        }
    }

    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}

pub fn task_json(id: i64, end_date: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("Task {id}"),
        "course": "Mobile Programming",
        "description": "Chapter exercises",
        "lecturer": "Dr. Rahma",
        "is_finished": 0,
        "start_date": "2024-01-01",
        "end_date": end_date
    })
}
