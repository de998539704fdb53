// Persistence Layer: immutable blob artifacts plus the interview metadata record.
// Artifact writes are best-effort; the record write is the one that must succeed.

pub mod artifacts;
pub mod records;

use thiserror::Error;

pub use artifacts::{artifact_key, ArtifactStore, LocalArtifactStore, S3ArtifactStore};
pub use records::{InterviewStore, PgInterviewStore};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Blob store error: {0}")]
    Blob(String),

    #[error("Record store error: {0}")]
    Record(#[from] sqlx::Error),

    #[error("Interview {0} not found")]
    MissingRecord(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
