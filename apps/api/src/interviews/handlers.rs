use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::memory;
use crate::models::interview::{Debrief, IntervieweeResponse};
use crate::models::memory::{MemoryRecord, MemorySource};
use crate::state::AppState;

/// Interview data served to the interviewer dashboard and the interviewee microsite.
#[derive(Debug, Serialize)]
pub struct BriefDetailResponse {
    pub interview_id: String,
    pub company_name: String,
    pub sector: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub brief: String,
    pub facts: Vec<String>,
    pub interviewee_questions: Vec<String>,
    pub interviewee_corrections: Value,
    pub interviewee_selected_questions: Value,
    pub interviewee_wildcard: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct AcknowledgeResponse {
    pub success: bool,
    pub interview_id: String,
    pub message: String,
}

/// GET /api/v1/brief/:id
pub async fn handle_get_brief(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
) -> Result<Json<BriefDetailResponse>, AppError> {
    let record = state
        .interviews
        .get_record(&interview_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))?;

    let brief = match state.artifacts.get_artifact(&record.brief_s3_key).await {
        Ok(text) => text,
        Err(e) => {
            warn!(interview_id = %interview_id, "Could not load interviewer brief: {e}");
            String::new()
        }
    };

    Ok(Json(BriefDetailResponse {
        interview_id: record.interview_id,
        company_name: record.company_name,
        sector: record.sector,
        status: record.status,
        created_at: record.created_at,
        brief,
        facts: record.interviewee_facts,
        interviewee_questions: record.interviewee_questions,
        interviewee_corrections: record.interviewee_corrections,
        interviewee_selected_questions: record.interviewee_selected_questions,
        interviewee_wildcard: record.interviewee_wildcard,
        responded_at: record.responded_at,
    }))
}

/// POST /api/v1/interviewee/:id
pub async fn handle_interviewee_response(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
    Json(response): Json<IntervieweeResponse>,
) -> Result<Json<AcknowledgeResponse>, AppError> {
    state
        .interviews
        .record_response(&interview_id, &response)
        .await?;

    Ok(Json(AcknowledgeResponse {
        success: true,
        interview_id,
        message: "Response saved. The interviewer has been notified.".to_string(),
    }))
}

/// POST /api/v1/debrief/:id
///
/// Completes the interview and feeds its insights back into institutional memory.
/// The memory append is best-effort and never fails the request.
pub async fn handle_debrief(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
    Json(debrief): Json<Debrief>,
) -> Result<Json<AcknowledgeResponse>, AppError> {
    let record = state
        .interviews
        .get_record(&interview_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))?;

    state.interviews.record_debrief(&interview_id, &debrief).await?;
    info!(interview_id = %interview_id, sector = %record.sector, "Debrief recorded");

    memory::remember(
        state.memory.as_ref(),
        &MemoryRecord {
            sector: record.sector,
            interview_id: interview_id.clone(),
            company_name: record.company_name,
            source: MemorySource::Debrief.as_str().to_string(),
            themes: debrief.key_themes,
            effective_questions: debrief.effective_questions,
            surprises: debrief.surprises,
            created_at: Utc::now(),
        },
    )
    .await;

    Ok(Json(AcknowledgeResponse {
        success: true,
        interview_id,
        message: "Debrief saved to institutional memory.".to_string(),
    }))
}
