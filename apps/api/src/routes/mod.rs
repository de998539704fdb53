pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::briefing::handlers as briefing;
use crate::interviews::handlers as interviews;
use crate::state::AppState;

/// All routes. CORS is permissive on every response, errors included.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/generate", post(briefing::handle_generate))
        .route("/api/v1/brief/:id", get(interviews::handle_get_brief))
        .route(
            "/api/v1/interviewee/:id",
            post(interviews::handle_interviewee_response),
        )
        .route("/api/v1/debrief/:id", post(interviews::handle_debrief))
        .with_state(state)
        .layer(CorsLayer::permissive())
}
