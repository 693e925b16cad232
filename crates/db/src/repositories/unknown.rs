use chrono::Utc;
use tracing::info;

use super::{RepositoryError, UnknownValueKind, UnknownValueRepository};
use crate::DbPool;

pub struct SqlUnknownValueRepository {
    pool: DbPool,
}

impl SqlUnknownValueRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UnknownValueRepository for SqlUnknownValueRepository {
    async fn record(&self, kind: UnknownValueKind, value: &str) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO unknown_values (kind, value, recorded_at) VALUES (?, ?, ?)")
            .bind(kind.as_str())
            .bind(value)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;

        info!(event_name = "unknown_value.recorded", kind = kind.as_str(), value, "recorded unknown value");
        Ok(())
    }
}
