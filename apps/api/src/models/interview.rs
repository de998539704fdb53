use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Lifecycle of an interview record. Only the pipeline creates records, and it
/// only ever creates them as `BriefReady`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    BriefReady,
    IntervieweeResponded,
    InterviewCompleted,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::BriefReady => "brief_ready",
            InterviewStatus::IntervieweeResponded => "interviewee_responded",
            InterviewStatus::InterviewCompleted => "interview_completed",
        }
    }
}

impl fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata row for one generated interview.
///
/// Artifact references are storage keys, never inline content. The artifact
/// keys are non-optional: a row exists only once every document was assembled.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRecord {
    pub interview_id: String,
    pub company_name: String,
    pub sector: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub elapsed_seconds: f64,
    pub brief_s3_key: String,
    pub email_s3_key: String,
    pub schema_s3_key: String,
    pub questions_s3_key: String,
    /// Small inline copy of the extracted schema for fast dashboard reads.
    pub schema_preview: Value,
    pub interviewee_facts: Vec<String>,
    pub interviewee_questions: Vec<String>,
    // Written later by the interviewee and debrief handlers.
    pub interviewee_corrections: Value,
    pub interviewee_selected_questions: Value,
    pub interviewee_wildcard: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    pub post_interview_debrief: Value,
    pub debrief_completed: bool,
}

/// Interviewee feedback captured from the microsite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntervieweeResponse {
    #[serde(default)]
    pub corrections: Vec<Value>,
    #[serde(default)]
    pub selected_questions: Vec<String>,
    #[serde(default)]
    pub wildcard: String,
}

/// Interviewer's notes after the conversation took place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Debrief {
    #[serde(default)]
    pub key_themes: String,
    #[serde(default)]
    pub effective_questions: String,
    #[serde(default)]
    pub surprises: String,
    #[serde(default)]
    pub notes: String,
}
