// Analyzer persistence
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{types::Json, FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::error::DatabaseResult;
use crate::models::{Analyzer, AnalyzerFilter, AnalyzerPatch, NewAnalyzer};

/// Entity store for analyzers.
///
/// Every method is a single round-trip; nothing spans multiple entities
/// transactionally. "Not found" is `Ok(None)`, errors are store failures only.
#[async_trait]
pub trait AnalyzerStore: Send + Sync {
    async fn create(&self, analyzer: NewAnalyzer) -> DatabaseResult<Analyzer>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Analyzer>>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> DatabaseResult<Vec<Analyzer>>;

    /// Ordered by creation time
    async fn find_all(&self, filter: AnalyzerFilter) -> DatabaseResult<Vec<Analyzer>>;

    /// Apply `patch` and return the analyzer as it was *before* the update.
    async fn update_by_id(&self, id: Uuid, patch: &AnalyzerPatch) -> DatabaseResult<Option<Analyzer>>;

    /// Apply `patch` to every matching id, returning the number of rows changed.
    async fn update_by_ids(&self, ids: &[Uuid], patch: &AnalyzerPatch) -> DatabaseResult<u64>;

    /// Remove and return the analyzer
    async fn delete_by_id(&self, id: Uuid) -> DatabaseResult<Option<Analyzer>>;

    async fn is_healthy(&self) -> bool;
}

const COLUMNS: &[&str] = &[
    "id",
    "name",
    "actived",
    "performed_by",
    "enabled",
    "extra",
    "revision",
    "created_at",
    "updated_at",
];

fn columns(prefix: Option<&str>) -> String {
    COLUMNS
        .iter()
        .map(|column| match prefix {
            Some(prefix) => format!("{prefix}.{column}"),
            None => (*column).to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(FromRow)]
struct AnalyzerRow {
    id: Uuid,
    name: String,
    actived: bool,
    performed_by: String,
    enabled: bool,
    extra: Json<Map<String, Value>>,
    revision: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AnalyzerRow> for Analyzer {
    fn from(row: AnalyzerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            actived: row.actived,
            performed_by: row.performed_by,
            enabled: row.enabled,
            created_at: row.created_at,
            updated_at: row.updated_at,
            revision: row.revision,
            extra: row.extra.0,
        }
    }
}

/// PostgreSQL-backed analyzer store
#[derive(Clone)]
pub struct PgAnalyzerStore {
    pool: PgPool,
}

impl PgAnalyzerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `SET` list for a patch. The target table must be aliased `a`.
    fn push_assignments(builder: &mut QueryBuilder<'_, Postgres>, patch: &AnalyzerPatch) {
        let mut assignments = builder.separated(", ");

        if let Some(name) = &patch.name {
            assignments.push("name = ").push_bind_unseparated(name.clone());
        }
        if let Some(actived) = patch.actived {
            assignments.push("actived = ").push_bind_unseparated(actived);
        }
        if let Some(performed_by) = &patch.performed_by {
            assignments
                .push("performed_by = ")
                .push_bind_unseparated(performed_by.clone());
        }
        if let Some(enabled) = patch.enabled {
            assignments.push("enabled = ").push_bind_unseparated(enabled);
        }

        let extra = patch.mergeable_extra();
        if !extra.is_empty() {
            assignments
                .push("extra = a.extra || ")
                .push_bind_unseparated(Json(extra))
                .push_unseparated("::jsonb");
        }

        assignments.push("revision = a.revision + 1");
        assignments.push("updated_at = NOW()");
    }
}

#[async_trait]
impl AnalyzerStore for PgAnalyzerStore {
    async fn create(&self, analyzer: NewAnalyzer) -> DatabaseResult<Analyzer> {
        let record = analyzer.into_analyzer(Utc::now());

        let row = sqlx::query_as::<_, AnalyzerRow>(&format!(
            r#"
            INSERT INTO analyzers (id, name, actived, performed_by, enabled, extra, revision, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $7)
            RETURNING {}
            "#,
            columns(None)
        ))
        .bind(record.id)
        .bind(&record.name)
        .bind(record.actived)
        .bind(&record.performed_by)
        .bind(record.enabled)
        .bind(Json(&record.extra))
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await?;

        debug!(analyzer_id = %row.id, "Analyzer inserted");
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Analyzer>> {
        let row = sqlx::query_as::<_, AnalyzerRow>(&format!(
            "SELECT {} FROM analyzers WHERE id = $1",
            columns(None)
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Analyzer::from))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> DatabaseResult<Vec<Analyzer>> {
        let rows = sqlx::query_as::<_, AnalyzerRow>(&format!(
            "SELECT {} FROM analyzers WHERE id = ANY($1) ORDER BY created_at, id",
            columns(None)
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Analyzer::from).collect())
    }

    async fn find_all(&self, filter: AnalyzerFilter) -> DatabaseResult<Vec<Analyzer>> {
        let rows = sqlx::query_as::<_, AnalyzerRow>(&format!(
            r#"
            SELECT {} FROM analyzers
            WHERE ($1::boolean IS NULL OR enabled = $1)
            ORDER BY created_at, id
            "#,
            columns(None)
        ))
        .bind(filter.enabled)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Analyzer::from).collect())
    }

    async fn update_by_id(&self, id: Uuid, patch: &AnalyzerPatch) -> DatabaseResult<Option<Analyzer>> {
        // The CTE captures the pre-update row so the caller can diff against it
        let mut builder = QueryBuilder::<Postgres>::new("WITH previous AS (SELECT ");
        builder
            .push(columns(None))
            .push(" FROM analyzers WHERE id = ")
            .push_bind(id)
            .push(" FOR UPDATE) UPDATE analyzers AS a SET ");
        Self::push_assignments(&mut builder, patch);
        builder
            .push(" FROM previous WHERE a.id = previous.id RETURNING ")
            .push(columns(Some("previous")));

        let row = builder
            .build_query_as::<AnalyzerRow>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Analyzer::from))
    }

    async fn update_by_ids(&self, ids: &[Uuid], patch: &AnalyzerPatch) -> DatabaseResult<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE analyzers AS a SET ");
        Self::push_assignments(&mut builder, patch);
        builder.push(" WHERE a.id = ANY(").push_bind(ids.to_vec()).push(")");

        let result = builder.build().execute(&self.pool).await?;

        debug!(requested = ids.len(), updated = result.rows_affected(), "Bulk analyzer update");
        Ok(result.rows_affected())
    }

    async fn delete_by_id(&self, id: Uuid) -> DatabaseResult<Option<Analyzer>> {
        let row = sqlx::query_as::<_, AnalyzerRow>(&format!(
            "DELETE FROM analyzers WHERE id = $1 RETURNING {}",
            columns(None)
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Analyzer::from))
    }

    async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
