//! Axum route handler for brief generation.

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::briefing::orchestrator::{BriefRequest, BriefResponse};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/generate
///
/// Runs every briefing stage and returns both documents plus the extracted schema.
/// Validation happens before any stage is invoked.
pub async fn handle_generate(
    State(state): State<AppState>,
    payload: Result<Json<BriefRequest>, JsonRejection>,
) -> Result<Json<BriefResponse>, AppError> {
    let Json(request) =
        payload.map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))?;
    let input = request.validate()?;

    let response = state.pipeline.run(input).await?;
    Ok(Json(response))
}
