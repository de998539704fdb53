//! Interview record store: one metadata row per interview id.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::info;

use super::PersistenceError;
use crate::models::interview::{Debrief, IntervieweeResponse, InterviewRecord, InterviewStatus};

#[async_trait]
pub trait InterviewStore: Send + Sync {
    /// Writes or overwrites the record keyed by its interview id.
    async fn put_record(&self, record: &InterviewRecord) -> Result<(), PersistenceError>;

    async fn get_record(&self, interview_id: &str)
        -> Result<Option<InterviewRecord>, PersistenceError>;

    /// Stores interviewee feedback and moves the record to `interviewee_responded`.
    async fn record_response(
        &self,
        interview_id: &str,
        response: &IntervieweeResponse,
    ) -> Result<(), PersistenceError>;

    /// Stores the debrief and moves the record to `interview_completed`.
    async fn record_debrief(
        &self,
        interview_id: &str,
        debrief: &Debrief,
    ) -> Result<(), PersistenceError>;
}

#[derive(Clone)]
pub struct PgInterviewStore {
    pool: PgPool,
}

impl PgInterviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, PersistenceError> {
    Ok(serde_json::to_value(value)?)
}

#[async_trait]
impl InterviewStore for PgInterviewStore {
    async fn put_record(&self, record: &InterviewRecord) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            INSERT INTO interviews
                (interview_id, company_name, sector, status, created_at, elapsed_seconds,
                 brief_s3_key, email_s3_key, schema_s3_key, questions_s3_key,
                 schema_preview, interviewee_facts, interviewee_questions,
                 interviewee_corrections, interviewee_selected_questions,
                 interviewee_wildcard, responded_at, post_interview_debrief, debrief_completed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            ON CONFLICT (interview_id) DO UPDATE SET
                company_name = EXCLUDED.company_name,
                sector = EXCLUDED.sector,
                status = EXCLUDED.status,
                created_at = EXCLUDED.created_at,
                elapsed_seconds = EXCLUDED.elapsed_seconds,
                brief_s3_key = EXCLUDED.brief_s3_key,
                email_s3_key = EXCLUDED.email_s3_key,
                schema_s3_key = EXCLUDED.schema_s3_key,
                questions_s3_key = EXCLUDED.questions_s3_key,
                schema_preview = EXCLUDED.schema_preview,
                interviewee_facts = EXCLUDED.interviewee_facts,
                interviewee_questions = EXCLUDED.interviewee_questions,
                interviewee_corrections = EXCLUDED.interviewee_corrections,
                interviewee_selected_questions = EXCLUDED.interviewee_selected_questions,
                interviewee_wildcard = EXCLUDED.interviewee_wildcard,
                responded_at = EXCLUDED.responded_at,
                post_interview_debrief = EXCLUDED.post_interview_debrief,
                debrief_completed = EXCLUDED.debrief_completed
            "#,
        )
        .bind(&record.interview_id)
        .bind(&record.company_name)
        .bind(&record.sector)
        .bind(&record.status)
        .bind(record.created_at)
        .bind(record.elapsed_seconds)
        .bind(&record.brief_s3_key)
        .bind(&record.email_s3_key)
        .bind(&record.schema_s3_key)
        .bind(&record.questions_s3_key)
        .bind(&record.schema_preview)
        .bind(&record.interviewee_facts)
        .bind(&record.interviewee_questions)
        .bind(&record.interviewee_corrections)
        .bind(&record.interviewee_selected_questions)
        .bind(&record.interviewee_wildcard)
        .bind(record.responded_at)
        .bind(&record.post_interview_debrief)
        .bind(record.debrief_completed)
        .execute(&self.pool)
        .await?;

        info!("Persisted interview record {}", record.interview_id);
        Ok(())
    }

    async fn get_record(
        &self,
        interview_id: &str,
    ) -> Result<Option<InterviewRecord>, PersistenceError> {
        let record =
            sqlx::query_as::<_, InterviewRecord>("SELECT * FROM interviews WHERE interview_id = $1")
                .bind(interview_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(record)
    }

    async fn record_response(
        &self,
        interview_id: &str,
        response: &IntervieweeResponse,
    ) -> Result<(), PersistenceError> {
        let result = sqlx::query(
            r#"
            UPDATE interviews
            SET status = $2,
                interviewee_corrections = $3,
                interviewee_selected_questions = $4,
                interviewee_wildcard = $5,
                responded_at = $6
            WHERE interview_id = $1
            "#,
        )
        .bind(interview_id)
        .bind(InterviewStatus::IntervieweeResponded.as_str())
        .bind(to_json(&response.corrections)?)
        .bind(to_json(&response.selected_questions)?)
        .bind(&response.wildcard)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::MissingRecord(interview_id.to_string()));
        }
        info!("Recorded interviewee response for {interview_id}");
        Ok(())
    }

    async fn record_debrief(
        &self,
        interview_id: &str,
        debrief: &Debrief,
    ) -> Result<(), PersistenceError> {
        let result = sqlx::query(
            r#"
            UPDATE interviews
            SET status = $2,
                post_interview_debrief = $3,
                debrief_completed = TRUE
            WHERE interview_id = $1
            "#,
        )
        .bind(interview_id)
        .bind(InterviewStatus::InterviewCompleted.as_str())
        .bind(to_json(debrief)?)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::MissingRecord(interview_id.to_string()));
        }
        info!("Recorded debrief for {interview_id}");
        Ok(())
    }
}
