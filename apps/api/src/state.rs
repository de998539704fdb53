use std::sync::Arc;

use crate::briefing::orchestrator::BriefingPipeline;
use crate::memory::MemoryStore;
use crate::storage::{ArtifactStore, InterviewStore};

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every external handle is built once in `main` and passed in here, so tests
/// can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<BriefingPipeline>,
    pub interviews: Arc<dyn InterviewStore>,
    pub artifacts: Arc<dyn ArtifactStore>,
    /// Institutional memory, written to by the debrief handler.
    pub memory: Arc<dyn MemoryStore>,
}
