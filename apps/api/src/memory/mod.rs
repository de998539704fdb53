//! Institutional Memory: append-only insight records from past interviews,
//! partitioned by sector.
//!
//! Reads are bounded ("up to N for this sector"); callers must not rely on the
//! order of the returned records. Writes never update or delete.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::models::memory::MemoryRecord;
use crate::storage::PersistenceError;

/// Prompt text used when a sector has no usable memory yet.
pub const NO_PRIOR_DATA: &str = "No past interviews in this sector yet. This is a fresh start.";

#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Up to `limit` records for `sector`. An unknown sector is an empty result.
    async fn query(&self, sector: &str, limit: i64) -> Result<Vec<MemoryRecord>, PersistenceError>;

    async fn append(&self, record: &MemoryRecord) -> Result<(), PersistenceError>;
}

/// Renders the memory for `sector` as prompt text.
///
/// A failed read degrades to the "no prior data" placeholder; it never fails
/// the caller.
pub async fn recall(store: &dyn MemoryStore, sector: &str, limit: i64) -> String {
    match store.query(sector, limit).await {
        Ok(records) if records.is_empty() => NO_PRIOR_DATA.to_string(),
        Ok(records) => serde_json::to_string(&records).unwrap_or_else(|e| {
            warn!(sector, "Could not serialize institutional memory: {e}");
            NO_PRIOR_DATA.to_string()
        }),
        Err(e) => {
            warn!(sector, "Institutional memory read failed: {e}");
            NO_PRIOR_DATA.to_string()
        }
    }
}

/// Appends `record`, logging instead of failing.
pub async fn remember(store: &dyn MemoryStore, record: &MemoryRecord) {
    match store.append(record).await {
        Ok(()) => info!(
            sector = %record.sector,
            interview_id = %record.interview_id,
            "Appended institutional memory record"
        ),
        Err(e) => warn!(
            sector = %record.sector,
            interview_id = %record.interview_id,
            "Institutional memory append failed: {e}"
        ),
    }
}

#[derive(Clone)]
pub struct PgMemoryStore {
    pool: PgPool,
}

impl PgMemoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemoryStore for PgMemoryStore {
    async fn query(&self, sector: &str, limit: i64) -> Result<Vec<MemoryRecord>, PersistenceError> {
        let records = sqlx::query_as::<_, MemoryRecord>(
            r#"
            SELECT sector, interview_id, company_name, source,
                   themes, effective_questions, surprises, created_at
            FROM institutional_memory
            WHERE sector = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(sector)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn append(&self, record: &MemoryRecord) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            INSERT INTO institutional_memory
                (sector, interview_id, company_name, source,
                 themes, effective_questions, surprises, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&record.sector)
        .bind(&record.interview_id)
        .bind(&record.company_name)
        .bind(&record.source)
        .bind(&record.themes)
        .bind(&record.effective_questions)
        .bind(&record.surprises)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{memory_record, InMemoryMemoryStore};

    #[tokio::test]
    async fn test_recall_empty_sector_uses_placeholder() {
        let store = InMemoryMemoryStore::default();
        assert_eq!(recall(&store, "energy", 3).await, NO_PRIOR_DATA);
    }

    #[tokio::test]
    async fn test_recall_is_bounded_and_scoped_to_sector() {
        let store = InMemoryMemoryStore::default();
        for i in 0..5 {
            store
                .append(&memory_record("energy", &format!("EN00000{i}")))
                .await
                .unwrap();
        }
        store.append(&memory_record("retail", "RT000001")).await.unwrap();

        let records = store.query("energy", 3).await.unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.sector == "energy"));

        let text = recall(&store, "energy", 3).await;
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), 3);
        assert!(!text.contains("RT000001"));
    }

    #[tokio::test]
    async fn test_recall_degrades_on_read_failure() {
        let store = InMemoryMemoryStore::failing();
        assert_eq!(recall(&store, "energy", 3).await, NO_PRIOR_DATA);
    }

    #[tokio::test]
    async fn test_remember_swallows_append_failure() {
        let store = InMemoryMemoryStore::failing();
        remember(&store, &memory_record("energy", "EN000001")).await;
        assert!(store.records().is_empty());
    }
}
