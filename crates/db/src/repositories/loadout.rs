use chrono::Utc;
use sqlx::Row;
use warmind_core::domain::loadout::PersistedLoadout;

use super::{LoadoutRepository, RepositoryError};
use crate::DbPool;

pub struct SqlLoadoutRepository {
    pool: DbPool,
}

impl SqlLoadoutRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl LoadoutRepository for SqlLoadoutRepository {
    async fn select_loadout(
        &self,
        membership_id: &str,
        name: &str,
    ) -> Result<Option<PersistedLoadout>, RepositoryError> {
        let row = sqlx::query("SELECT loadout_json FROM loadouts WHERE membership_id = ? AND name = ?")
            .bind(membership_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| decode_loadout(name, &row.try_get::<String, _>("loadout_json")?))
            .transpose()
    }

    async fn save_loadout(
        &self,
        membership_id: &str,
        name: &str,
        loadout: &PersistedLoadout,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO loadouts (membership_id, name, loadout_json, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(membership_id)
        .bind(name)
        .bind(encode_loadout(loadout)?)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_loadout(
        &self,
        membership_id: &str,
        name: &str,
        loadout: &PersistedLoadout,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE loadouts
            SET loadout_json = ?, updated_at = ?
            WHERE membership_id = ? AND name = ?
            "#,
        )
        .bind(encode_loadout(loadout)?)
        .bind(Utc::now().to_rfc3339())
        .bind(membership_id)
        .bind(name)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_loadout_names(&self, membership_id: &str) -> Result<Vec<String>, RepositoryError> {
        let rows = sqlx::query("SELECT name FROM loadouts WHERE membership_id = ? ORDER BY name")
            .bind(membership_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(|row| row.try_get::<String, _>("name").map_err(RepositoryError::from)).collect()
    }
}

fn encode_loadout(loadout: &PersistedLoadout) -> Result<String, RepositoryError> {
    loadout.to_json().map_err(|error| RepositoryError::Decode(format!("cannot encode loadout: {error}")))
}

fn decode_loadout(name: &str, raw: &str) -> Result<PersistedLoadout, RepositoryError> {
    PersistedLoadout::from_json(raw)
        .map_err(|error| RepositoryError::Decode(format!("invalid loadout_json for `{name}`: {error}")))
}
