//! Test doubles and common utilities for engine contract tests
//!
//! These mocks count calls and capture payloads so tests can assert on the
//! engine's orchestration without any real portal or push endpoint.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use sinuwatch_core::error::{Error, Result};
use sinuwatch_core::record::GradeRecord;
use sinuwatch_core::traits::{Credentials, GradeSource, Notifier, SnapshotStore};

/// Build a grade record with defaults for the descriptive fields
pub fn record(subject: &str, year: &str, semester: &str, grade: &str) -> GradeRecord {
    GradeRecord {
        year: year.into(),
        semester: semester.into(),
        subject: subject.into(),
        kind: "Examen".into(),
        date: "2024-01-10".into(),
        grade: grade.into(),
    }
}

/// Canned per-user response for the scripted source
enum CannedResponse {
    Grades(Vec<GradeRecord>),
    Failure(Box<dyn Fn() -> Error + Send + Sync>),
}

/// A grade source serving canned results per username
pub struct ScriptedGradeSource {
    responses: HashMap<String, CannedResponse>,
    /// usernames in the order they were fetched
    fetched_usernames: Arc<std::sync::Mutex<Vec<String>>>,
    fetch_call_count: Arc<AtomicUsize>,
}

impl ScriptedGradeSource {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            fetched_usernames: Arc::new(std::sync::Mutex::new(Vec::new())),
            fetch_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Serve these records for this username
    pub fn with_grades(mut self, username: &str, records: Vec<GradeRecord>) -> Self {
        self.responses
            .insert(username.to_string(), CannedResponse::Grades(records));
        self
    }

    /// Serve a fresh error from this factory for this username
    pub fn with_failure(
        mut self,
        username: &str,
        make_error: impl Fn() -> Error + Send + Sync + 'static,
    ) -> Self {
        self.responses.insert(
            username.to_string(),
            CannedResponse::Failure(Box::new(make_error)),
        );
        self
    }

    /// Handles to the call log that survive moving the source into the engine
    pub fn call_log(&self) -> (Arc<AtomicUsize>, Arc<std::sync::Mutex<Vec<String>>>) {
        (
            Arc::clone(&self.fetch_call_count),
            Arc::clone(&self.fetched_usernames),
        )
    }
}

#[async_trait::async_trait]
impl GradeSource for ScriptedGradeSource {
    async fn fetch_grades(&self, credentials: &Credentials) -> Result<Vec<GradeRecord>> {
        self.fetch_call_count.fetch_add(1, Ordering::SeqCst);
        self.fetched_usernames
            .lock()
            .unwrap()
            .push(credentials.username.clone());

        match self.responses.get(&credentials.username) {
            Some(CannedResponse::Grades(records)) => Ok(records.clone()),
            Some(CannedResponse::Failure(make_error)) => Err(make_error()),
            None => Err(Error::auth(401, "unknown test user")),
        }
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// A notifier that records every delivered message
pub struct RecordingNotifier {
    messages: Arc<std::sync::Mutex<Vec<(String, String, Vec<String>)>>>,
    /// When true, every delivery fails (engine must shrug it off)
    fail_all: bool,
    notify_call_count: Arc<AtomicUsize>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(std::sync::Mutex::new(Vec::new())),
            fail_all: false,
            notify_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::new()
        }
    }

    pub fn messages_handle(&self) -> Arc<std::sync::Mutex<Vec<(String, String, Vec<String>)>>> {
        Arc::clone(&self.messages)
    }

    pub fn call_count_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.notify_call_count)
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str, title: &str, tags: &[&str]) -> Result<()> {
        self.notify_call_count.fetch_add(1, Ordering::SeqCst);
        self.messages.lock().unwrap().push((
            message.to_string(),
            title.to_string(),
            tags.iter().map(|t| t.to_string()).collect(),
        ));
        if self.fail_all {
            return Err(Error::notify("scripted delivery failure"));
        }
        Ok(())
    }

    fn notifier_name(&self) -> &'static str {
        "recording"
    }
}

/// A snapshot store that counts loads and saves around an in-memory map
pub struct CountingSnapshotStore {
    inner: sinuwatch_core::MemorySnapshotStore,
    load_call_count: Arc<AtomicUsize>,
    save_call_count: Arc<AtomicUsize>,
    /// When true, every save fails
    fail_saves: bool,
}

impl CountingSnapshotStore {
    pub fn new() -> Self {
        Self {
            inner: sinuwatch_core::MemorySnapshotStore::new(),
            load_call_count: Arc::new(AtomicUsize::new(0)),
            save_call_count: Arc::new(AtomicUsize::new(0)),
            fail_saves: false,
        }
    }

    pub fn failing_saves() -> Self {
        Self {
            fail_saves: true,
            ..Self::new()
        }
    }

    /// Seed a previous snapshot for an account
    pub async fn seed(&self, account_id: &str, records: &[GradeRecord]) {
        self.inner.save(account_id, records).await.unwrap();
    }

    pub fn save_count_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.save_call_count)
    }

    /// A second store view over the same underlying map and counters
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            inner: other.inner.clone(),
            load_call_count: Arc::clone(&other.load_call_count),
            save_call_count: Arc::clone(&other.save_call_count),
            fail_saves: other.fail_saves,
        }
    }
}

#[async_trait::async_trait]
impl SnapshotStore for CountingSnapshotStore {
    async fn load(&self, account_id: &str) -> Result<Vec<GradeRecord>> {
        self.load_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.load(account_id).await
    }

    async fn save(&self, account_id: &str, records: &[GradeRecord]) -> Result<()> {
        self.save_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves {
            return Err(Error::snapshot("scripted write failure"));
        }
        self.inner.save(account_id, records).await
    }
}

/// Engine config with pacing disabled, for fast tests
pub fn fast_engine_config() -> sinuwatch_core::EngineConfig {
    sinuwatch_core::EngineConfig {
        account_delay_secs: 0,
        event_channel_capacity: 100,
    }
}

/// Drain all buffered engine events after a finished run
pub fn drain_events(
    rx: &mut tokio::sync::mpsc::Receiver<sinuwatch_core::EngineEvent>,
) -> Vec<sinuwatch_core::EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
