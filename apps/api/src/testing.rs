//! In-process fakes for the inference backend and the durable stores.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::subscriber::DefaultGuard;

use crate::briefing::orchestrator::{BriefingPipeline, Stage};
use crate::llm_client::{BackendError, FixedBackoff, InferenceClient, ModelBackend, SamplingParams};
use crate::memory::MemoryStore;
use crate::models::interview::{Debrief, IntervieweeResponse, InterviewRecord, InterviewStatus};
use crate::models::memory::{MemoryRecord, MemorySource};
use crate::storage::{artifact_key, ArtifactStore, InterviewStore, PersistenceError};

type Responder = dyn Fn(&str, &str) -> Result<String, BackendError> + Send + Sync;

/// Backend whose answers come from a closure of `(model, prompt)`.
pub struct ScriptedBackend {
    respond: Box<Responder>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedBackend {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&str, &str) -> Result<String, BackendError> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Models called, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
    }

    /// Distinct prompts, in the order first seen.
    pub fn prompts(&self) -> Vec<String> {
        let mut prompts: Vec<String> = Vec::new();
        for (_, prompt) in self.calls.lock().unwrap().iter() {
            if !prompts.contains(prompt) {
                prompts.push(prompt.clone());
            }
        }
        prompts
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        _params: SamplingParams,
    ) -> Result<String, BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));
        (self.respond)(model, prompt)
    }
}

/// Which stage a filled prompt belongs to, by its opening line.
pub fn stage_of(prompt: &str) -> Stage {
    Stage::ALL
        .into_iter()
        .find(|stage| {
            let opening = stage.template().lines().next().unwrap_or_default();
            prompt.starts_with(opening)
        })
        .expect("prompt does not match any stage template")
}

#[derive(Default)]
pub struct InMemoryArtifactStore {
    blobs: Mutex<HashMap<String, String>>,
    fail: bool,
}

impl InMemoryArtifactStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.blobs.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn put_artifact(
        &self,
        interview_id: &str,
        name: &str,
        content: &str,
    ) -> Result<String, PersistenceError> {
        if self.fail {
            return Err(PersistenceError::Blob("bucket unavailable".to_string()));
        }
        let key = artifact_key(interview_id, name);
        self.blobs
            .lock()
            .unwrap()
            .insert(key.clone(), content.to_string());
        Ok(key)
    }

    async fn get_artifact(&self, key: &str) -> Result<String, PersistenceError> {
        self.blobs
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| PersistenceError::Blob(format!("no such key {key}")))
    }
}

#[derive(Default)]
pub struct InMemoryInterviewStore {
    records: Mutex<HashMap<String, InterviewRecord>>,
    fail: bool,
}

impl InMemoryInterviewStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn get(&self, interview_id: &str) -> Option<InterviewRecord> {
        self.records.lock().unwrap().get(interview_id).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }

    fn check(&self) -> Result<(), PersistenceError> {
        if self.fail {
            return Err(PersistenceError::Record(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn update<F>(&self, interview_id: &str, apply: F) -> Result<(), PersistenceError>
    where
        F: FnOnce(&mut InterviewRecord),
    {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(interview_id)
            .ok_or_else(|| PersistenceError::MissingRecord(interview_id.to_string()))?;
        apply(record);
        Ok(())
    }
}

#[async_trait]
impl InterviewStore for InMemoryInterviewStore {
    async fn put_record(&self, record: &InterviewRecord) -> Result<(), PersistenceError> {
        self.check()?;
        self.records
            .lock()
            .unwrap()
            .insert(record.interview_id.clone(), record.clone());
        Ok(())
    }

    async fn get_record(
        &self,
        interview_id: &str,
    ) -> Result<Option<InterviewRecord>, PersistenceError> {
        self.check()?;
        Ok(self.get(interview_id))
    }

    async fn record_response(
        &self,
        interview_id: &str,
        response: &IntervieweeResponse,
    ) -> Result<(), PersistenceError> {
        let corrections = serde_json::to_value(&response.corrections)?;
        let selected = serde_json::to_value(&response.selected_questions)?;
        self.update(interview_id, |record| {
            record.status = InterviewStatus::IntervieweeResponded.as_str().to_string();
            record.interviewee_corrections = corrections;
            record.interviewee_selected_questions = selected;
            record.interviewee_wildcard = Some(response.wildcard.clone());
            record.responded_at = Some(Utc::now());
        })
    }

    async fn record_debrief(
        &self,
        interview_id: &str,
        debrief: &Debrief,
    ) -> Result<(), PersistenceError> {
        let debrief = serde_json::to_value(debrief)?;
        self.update(interview_id, |record| {
            record.status = InterviewStatus::InterviewCompleted.as_str().to_string();
            record.post_interview_debrief = debrief;
            record.debrief_completed = true;
        })
    }
}

#[derive(Default)]
pub struct InMemoryMemoryStore {
    records: Mutex<Vec<MemoryRecord>>,
    fail: bool,
}

impl InMemoryMemoryStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn records(&self) -> Vec<MemoryRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl MemoryStore for InMemoryMemoryStore {
    async fn query(&self, sector: &str, limit: i64) -> Result<Vec<MemoryRecord>, PersistenceError> {
        if self.fail {
            return Err(PersistenceError::Record(sqlx::Error::PoolTimedOut));
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.sector == sector)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn append(&self, record: &MemoryRecord) -> Result<(), PersistenceError> {
        if self.fail {
            return Err(PersistenceError::Record(sqlx::Error::PoolTimedOut));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub fn memory_record(sector: &str, interview_id: &str) -> MemoryRecord {
    MemoryRecord {
        sector: sector.to_string(),
        interview_id: interview_id.to_string(),
        company_name: format!("Company {interview_id}"),
        source: MemorySource::Debrief.as_str().to_string(),
        themes: "supply chain reshoring".to_string(),
        effective_questions: "What surprised you most this year?".to_string(),
        surprises: "Heavy reliance on community colleges".to_string(),
        created_at: Utc::now(),
    }
}

/// Pipeline over the given fakes with a `primary` → `backup` chain and no backoff.
pub fn pipeline_with(
    backend: Arc<ScriptedBackend>,
    artifacts: Arc<dyn ArtifactStore>,
    interviews: Arc<dyn InterviewStore>,
    memory: Arc<dyn MemoryStore>,
) -> BriefingPipeline {
    let llm = InferenceClient::new(
        backend,
        vec!["primary".to_string(), "backup".to_string()],
        Arc::new(FixedBackoff(Duration::ZERO)),
    );
    BriefingPipeline::new(llm, artifacts, interviews, memory, 3)
}

/// Formatted log output collected while a `capture_logs` guard is alive.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Routes this thread's `tracing` events into a buffer until the guard drops.
///
/// Thread-scoped, so only use it from current-thread `#[tokio::test]`s.
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}
