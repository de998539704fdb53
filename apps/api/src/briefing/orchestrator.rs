//! Briefing Pipeline: orchestrates the chain of dependent inference stages.
//!
//! Flow: synthesis → sector resolution + memory recall → regional context →
//!       questions → gaps → assembly → schema → split/extract →
//!       persist artifacts → persist record → append memory → response.
//!
//! Stages run strictly in sequence because each prompt binds an earlier
//! stage's output. Retry lives inside `InferenceClient`; a stage whose fallback
//! chain is exhausted aborts the run. Nothing is persisted until every stage
//! has succeeded, so a failed run leaves no record behind.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::briefing::assembler::{
    extract_facts, extract_interviewee_questions, extract_schema, split_documents,
    PACKET_DELIMITER,
};
use crate::briefing::prompts::{
    ASSEMBLY_PROMPT, GAPS_PROMPT, QUESTIONS_PROMPT, REGIONAL_CONTEXT_PROMPT, SCHEMA_PROMPT,
    SYNTHESIS_PROMPT,
};
use crate::briefing::sector;
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, GROUNDING_INSTRUCTION, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{InferenceClient, SamplingParams};
use crate::memory::{self, MemoryStore};
use crate::models::interview::{InterviewRecord, InterviewStatus};
use crate::models::memory::{MemoryRecord, MemorySource};
use crate::storage::artifacts::{
    GAPS, INTERVIEWEE_EMAIL, INTERVIEWER_BRIEF, QUESTIONS, RAW_PROFILE, SCHEMA,
};
use crate::storage::{artifact_key, ArtifactStore, InterviewStore};

/// Notes placeholder used when the caller supplies none.
pub const DEFAULT_NOTES: &str = "No proprietary notes provided.";

/// Memory themes fall back to this many characters of the gap analysis.
const MEMORY_EXCERPT_CHARS: usize = 600;

// ────────────────────────────────────────────────────────────────────────────
// Stages
// ────────────────────────────────────────────────────────────────────────────

/// One inference call of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Synthesis,
    RegionalContext,
    Questions,
    Gaps,
    Assembly,
    Schema,
}

impl Stage {
    #[cfg(test)]
    pub const ALL: [Stage; 6] = [
        Stage::Synthesis,
        Stage::RegionalContext,
        Stage::Questions,
        Stage::Gaps,
        Stage::Assembly,
        Stage::Schema,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Synthesis => "synthesis",
            Stage::RegionalContext => "regional_context",
            Stage::Questions => "questions",
            Stage::Gaps => "gaps",
            Stage::Assembly => "assembly",
            Stage::Schema => "schema",
        }
    }

    pub fn template(&self) -> &'static str {
        match self {
            Stage::Synthesis => SYNTHESIS_PROMPT,
            Stage::RegionalContext => REGIONAL_CONTEXT_PROMPT,
            Stage::Questions => QUESTIONS_PROMPT,
            Stage::Gaps => GAPS_PROMPT,
            Stage::Assembly => ASSEMBLY_PROMPT,
            Stage::Schema => SCHEMA_PROMPT,
        }
    }

    /// Factual stages run cold; question writing runs hot; assembly sits between.
    pub fn params(&self) -> SamplingParams {
        let (temperature, max_tokens) = match self {
            Stage::Synthesis => (0.2, 3000),
            Stage::RegionalContext => (0.2, 2000),
            Stage::Questions => (0.7, 4000),
            Stage::Gaps => (0.2, 2000),
            Stage::Assembly => (0.4, 6000),
            Stage::Schema => (0.2, 2000),
        };
        SamplingParams {
            temperature,
            max_tokens,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request / response
// ────────────────────────────────────────────────────────────────────────────

/// Request body for brief generation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BriefRequest {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub scraped_content: Option<String>,
    #[serde(default)]
    pub tamu_notes: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone)]
pub struct BriefInput {
    pub company_name: String,
    pub scraped_content: String,
    pub proprietary_notes: String,
}

impl BriefRequest {
    pub fn validate(self) -> Result<BriefInput, AppError> {
        let company_name = self.company_name.unwrap_or_default().trim().to_string();
        if company_name.is_empty() {
            return Err(AppError::Validation("company_name is required".to_string()));
        }

        let proprietary_notes = self
            .tamu_notes
            .filter(|notes| !notes.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_NOTES.to_string());

        Ok(BriefInput {
            company_name,
            scraped_content: self.scraped_content.unwrap_or_default(),
            proprietary_notes,
        })
    }
}

/// Response from the briefing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefResponse {
    pub interview_id: String,
    pub company_name: String,
    pub sector: String,
    pub brief: String,
    pub interviewee_email: String,
    pub schema: Value,
    pub elapsed_seconds: f64,
}

/// Fresh 8-character uppercase alphanumeric interview id.
pub fn new_interview_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

fn round_tenths(seconds: f64) -> f64 {
    (seconds * 10.0).round() / 10.0
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// The briefing pipeline with its injected collaborators.
///
/// Holds no per-run state, so one instance serves concurrent requests.
#[derive(Clone)]
pub struct BriefingPipeline {
    llm: InferenceClient,
    artifacts: Arc<dyn ArtifactStore>,
    interviews: Arc<dyn InterviewStore>,
    memory: Arc<dyn MemoryStore>,
    memory_limit: i64,
}

impl BriefingPipeline {
    pub fn new(
        llm: InferenceClient,
        artifacts: Arc<dyn ArtifactStore>,
        interviews: Arc<dyn InterviewStore>,
        memory: Arc<dyn MemoryStore>,
        memory_limit: i64,
    ) -> Self {
        Self {
            llm,
            artifacts,
            interviews,
            memory,
            memory_limit,
        }
    }

    /// Runs every stage for `input` and persists the results.
    pub async fn run(&self, input: BriefInput) -> Result<BriefResponse, AppError> {
        let interview_id = new_interview_id();
        let span = info_span!("briefing", interview_id = %interview_id);
        self.execute(interview_id, input).instrument(span).await
    }

    async fn execute(
        &self,
        interview_id: String,
        input: BriefInput,
    ) -> Result<BriefResponse, AppError> {
        let started = Instant::now();
        let created_at = Utc::now();
        info!(company = %input.company_name, "Starting briefing pipeline");

        // Stage 1: Synthesis
        let profile = self
            .call(
                Stage::Synthesis,
                &[
                    ("COMPANY_NAME", input.company_name.as_str()),
                    ("SCRAPED_CONTENT", input.scraped_content.as_str()),
                    ("PROPRIETARY_NOTES", input.proprietary_notes.as_str()),
                ],
            )
            .await?;

        // Stage 2: Sector resolution + memory recall
        let sector = sector::classify(&profile);
        let memory_text = memory::recall(self.memory.as_ref(), sector, self.memory_limit).await;
        info!(sector, "Resolved sector");

        // Stage 3: Regional context
        let context = self
            .call(
                Stage::RegionalContext,
                &[
                    ("COMPANY_PROFILE", profile.as_str()),
                    ("INSTITUTIONAL_MEMORY", memory_text.as_str()),
                ],
            )
            .await?;

        // Stage 4: Questions
        let questions = self
            .call(
                Stage::Questions,
                &[
                    ("COMPANY_PROFILE", profile.as_str()),
                    ("REGIONAL_CONTEXT", context.as_str()),
                ],
            )
            .await?;

        // Stage 5: Gaps
        let gaps = self
            .call(
                Stage::Gaps,
                &[
                    ("COMPANY_PROFILE", profile.as_str()),
                    ("REGIONAL_CONTEXT", context.as_str()),
                ],
            )
            .await?;

        // Stage 6: Assembly
        let combined = self
            .call(
                Stage::Assembly,
                &[
                    ("COMPANY_PROFILE", profile.as_str()),
                    ("REGIONAL_CONTEXT", context.as_str()),
                    ("QUESTIONS", questions.as_str()),
                    ("KNOWLEDGE_GAPS", gaps.as_str()),
                    ("DELIMITER", PACKET_DELIMITER),
                ],
            )
            .await?;

        // Stage 7: Schema (independent of assembly; kept sequential)
        let schema_raw = self
            .call(
                Stage::Schema,
                &[
                    ("COMPANY_PROFILE", profile.as_str()),
                    ("REGIONAL_CONTEXT", context.as_str()),
                    ("KNOWLEDGE_GAPS", gaps.as_str()),
                ],
            )
            .await?;

        let documents = split_documents(&combined);
        let schema = extract_schema(&schema_raw);
        let interviewee_facts = extract_facts(&documents.interviewee);
        let interviewee_questions = extract_interviewee_questions(&questions);

        let schema_json = serde_json::to_string_pretty(&schema)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize schema: {e}")))?;

        self.store_artifacts(
            &interview_id,
            &[
                (INTERVIEWER_BRIEF, documents.interviewer.as_str()),
                (INTERVIEWEE_EMAIL, documents.interviewee.as_str()),
                (RAW_PROFILE, profile.as_str()),
                (QUESTIONS, questions.as_str()),
                (GAPS, gaps.as_str()),
                (SCHEMA, schema_json.as_str()),
            ],
        )
        .await;

        let elapsed_seconds = round_tenths(started.elapsed().as_secs_f64());

        let record = InterviewRecord {
            interview_id: interview_id.clone(),
            company_name: input.company_name.clone(),
            sector: sector.to_string(),
            status: InterviewStatus::BriefReady.as_str().to_string(),
            created_at,
            elapsed_seconds,
            brief_s3_key: artifact_key(&interview_id, INTERVIEWER_BRIEF),
            email_s3_key: artifact_key(&interview_id, INTERVIEWEE_EMAIL),
            schema_s3_key: artifact_key(&interview_id, SCHEMA),
            questions_s3_key: artifact_key(&interview_id, QUESTIONS),
            schema_preview: schema.clone(),
            interviewee_facts,
            interviewee_questions: interviewee_questions.clone(),
            interviewee_corrections: json!([]),
            interviewee_selected_questions: json!([]),
            interviewee_wildcard: None,
            responded_at: None,
            post_interview_debrief: json!({}),
            debrief_completed: false,
        };

        self.interviews.put_record(&record).await.map_err(|e| {
            error!("Interview record write failed: {e}");
            AppError::Persistence(e)
        })?;

        memory::remember(
            self.memory.as_ref(),
            &MemoryRecord {
                sector: sector.to_string(),
                interview_id: interview_id.clone(),
                company_name: input.company_name.clone(),
                source: MemorySource::Brief.as_str().to_string(),
                themes: memory_themes(&schema, &gaps),
                effective_questions: interviewee_questions.join("\n"),
                surprises: String::new(),
                created_at: Utc::now(),
            },
        )
        .await;

        info!(elapsed_seconds, "Briefing pipeline complete");

        Ok(BriefResponse {
            interview_id,
            company_name: input.company_name,
            sector: sector.to_string(),
            brief: documents.interviewer,
            interviewee_email: documents.interviewee,
            schema,
            elapsed_seconds,
        })
    }

    /// Fills the stage template and invokes the model chain.
    async fn call(&self, stage: Stage, bindings: &[(&str, &str)]) -> Result<String, AppError> {
        let mut all_bindings: Vec<(&str, &str)> = vec![
            ("GROUNDING", GROUNDING_INSTRUCTION),
            ("JSON_ONLY", JSON_ONLY_INSTRUCTION),
        ];
        all_bindings.extend_from_slice(bindings);
        let prompt = fill_template(stage.template(), &all_bindings);

        let span = info_span!("stage", stage = stage.name());
        async {
            info!(prompt_chars = prompt.chars().count(), "Running stage");
            self.llm.invoke(&prompt, stage.params()).await.map_err(|e| {
                error!("Stage failed, aborting pipeline: {e}");
                AppError::Inference(e)
            })
        }
        .instrument(span)
        .await
    }

    /// Writes each artifact independently. Failures are logged, not raised.
    async fn store_artifacts(&self, interview_id: &str, artifacts: &[(&str, &str)]) {
        for (name, content) in artifacts {
            if let Err(e) = self
                .artifacts
                .put_artifact(interview_id, name, content)
                .await
            {
                warn!(artifact = %name, "Artifact write failed: {e}");
            }
        }
    }
}

/// Themes for the memory record: the schema's `key_themes` when present,
/// otherwise a bounded excerpt of the gap analysis.
fn memory_themes(schema: &Value, gaps: &str) -> String {
    let themes: Vec<&str> = schema
        .get("key_themes")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    if themes.is_empty() {
        gaps.chars().take(MEMORY_EXCERPT_CHARS).collect()
    } else {
        themes.join("; ")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
