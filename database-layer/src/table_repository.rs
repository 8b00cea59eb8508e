// Table registry lookups
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::DatabaseResult;
use crate::models::Table;

/// Resolves a logical table name to the identifier that tags history entries
#[async_trait]
pub trait TableRegistry: Send + Sync {
    async fn find_by_name(&self, name: &str) -> DatabaseResult<Option<Table>>;
}

#[derive(Clone)]
pub struct PgTableRegistry {
    pool: PgPool,
}

impl PgTableRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TableRegistry for PgTableRegistry {
    async fn find_by_name(&self, name: &str) -> DatabaseResult<Option<Table>> {
        let table = sqlx::query_as::<_, Table>("SELECT id, name FROM audit_tables WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(table)
    }
}
