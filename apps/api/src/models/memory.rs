use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Where a memory record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemorySource {
    /// Written by the pipeline when a brief is generated.
    Brief,
    /// Written by the debrief handler once the interview took place.
    Debrief,
}

impl MemorySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemorySource::Brief => "brief",
            MemorySource::Debrief => "debrief",
        }
    }
}

/// One append-only insight record, partitioned by sector.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MemoryRecord {
    pub sector: String,
    pub interview_id: String,
    pub company_name: String,
    pub source: String,
    pub themes: String,
    pub effective_questions: String,
    pub surprises: String,
    pub created_at: DateTime<Utc>,
}
