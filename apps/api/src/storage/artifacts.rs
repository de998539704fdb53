//! Artifact storage: one immutable blob per `{interview_id}/{name}` key.

use std::path::PathBuf;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;

use super::PersistenceError;

pub const INTERVIEWER_BRIEF: &str = "interviewer_brief.txt";
pub const INTERVIEWEE_EMAIL: &str = "interviewee_email.txt";
pub const RAW_PROFILE: &str = "raw_profile.json";
pub const QUESTIONS: &str = "questions.json";
pub const GAPS: &str = "gaps.json";
pub const SCHEMA: &str = "schema.json";

/// Deterministic storage key for an artifact.
pub fn artifact_key(interview_id: &str, name: &str) -> String {
    format!("{interview_id}/{name}")
}

/// Blob store for generated artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Writes one artifact and returns its key.
    async fn put_artifact(
        &self,
        interview_id: &str,
        name: &str,
        content: &str,
    ) -> Result<String, PersistenceError>;

    async fn get_artifact(&self, key: &str) -> Result<String, PersistenceError>;
}

fn content_type_for(name: &str) -> &'static str {
    if name.ends_with(".json") {
        "application/json"
    } else {
        "text/plain"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// S3 / MinIO
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct S3ArtifactStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ArtifactStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn put_artifact(
        &self,
        interview_id: &str,
        name: &str,
        content: &str,
    ) -> Result<String, PersistenceError> {
        let key = artifact_key(interview_id, name);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(content.as_bytes().to_vec()))
            .content_type(content_type_for(name))
            .send()
            .await
            .map_err(|e| PersistenceError::Blob(format!("S3 upload failed: {e}")))?;

        info!("Uploaded artifact to s3://{}/{}", self.bucket, key);
        Ok(key)
    }

    async fn get_artifact(&self, key: &str) -> Result<String, PersistenceError> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| PersistenceError::Blob(format!("S3 download failed: {e}")))?;

        let body: Bytes = object
            .body
            .collect()
            .await
            .map_err(|e| PersistenceError::Blob(format!("S3 body read failed: {e}")))?
            .into_bytes();

        String::from_utf8(body.to_vec())
            .map_err(|e| PersistenceError::Blob(format!("Artifact {key} is not UTF-8: {e}")))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Local filesystem (development without S3)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn put_artifact(
        &self,
        interview_id: &str,
        name: &str,
        content: &str,
    ) -> Result<String, PersistenceError> {
        let key = artifact_key(interview_id, name);
        let path = self.root.join(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, content).await?;

        info!("Wrote artifact to {}", path.display());
        Ok(key)
    }

    async fn get_artifact(&self, key: &str) -> Result<String, PersistenceError> {
        Ok(tokio::fs::read_to_string(self.root.join(key)).await?)
    }
}
