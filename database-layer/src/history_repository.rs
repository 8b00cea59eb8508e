// Analyzer history persistence
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseResult;
use crate::models::{HistoryEntry, NewHistoryEntry};

/// Append-only store for history entries
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, entry: NewHistoryEntry) -> DatabaseResult<HistoryEntry>;

    /// Entries for one analyzer, oldest first
    async fn list_for_analyzer(&self, analyzer_id: Uuid) -> DatabaseResult<Vec<HistoryEntry>>;
}

#[derive(Clone)]
pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn append(&self, entry: NewHistoryEntry) -> DatabaseResult<HistoryEntry> {
        let entry = entry.into_entry();

        sqlx::query(
            r#"
            INSERT INTO analyzer_histories (
                id, analyzer_id, table_id, user_email, action, recorded_at, data, brief
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id)
        .bind(entry.analyzer_id)
        .bind(entry.table_id)
        .bind(&entry.user_email)
        .bind(&entry.action)
        .bind(entry.timestamp)
        .bind(&entry.data)
        .bind(entry.brief.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn list_for_analyzer(&self, analyzer_id: Uuid) -> DatabaseResult<Vec<HistoryEntry>> {
        let entries = sqlx::query_as::<_, HistoryEntry>(
            r#"
            SELECT id, analyzer_id, table_id, user_email, action, recorded_at, data, brief
            FROM analyzer_histories
            WHERE analyzer_id = $1
            ORDER BY recorded_at, id
            "#,
        )
        .bind(analyzer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
