use sqlx::{sqlite::SqliteRow, Row};
use warmind_core::catalog::ItemDefinition;
use warmind_core::{ClassType, TierType};

use super::{ManifestRepository, RepositoryError};
use crate::DbPool;

/// Item definitions imported from the game manifest.
pub struct SqlManifestRepository {
    pool: DbPool,
}

impl SqlManifestRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ManifestRepository for SqlManifestRepository {
    async fn load_definitions(&self) -> Result<Vec<ItemDefinition>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT item_hash, item_name, tier_type, class_type, bucket_type_hash
            FROM item_definitions
            ORDER BY item_hash
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(definition_from_row).collect()
    }

    async fn upsert_definitions(&self, definitions: &[ItemDefinition]) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        for definition in definitions {
            sqlx::query(
                r#"
                INSERT INTO item_definitions (item_hash, item_name, tier_type, class_type, bucket_type_hash)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(item_hash) DO UPDATE SET
                    item_name = excluded.item_name,
                    tier_type = excluded.tier_type,
                    class_type = excluded.class_type,
                    bucket_type_hash = excluded.bucket_type_hash
                "#,
            )
            .bind(i64::from(definition.item_hash))
            .bind(&definition.name)
            .bind(definition.tier.code())
            .bind(definition.class_type.code())
            .bind(i64::from(definition.bucket_hash))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(definitions.len())
    }
}

fn definition_from_row(row: SqliteRow) -> Result<ItemDefinition, RepositoryError> {
    Ok(ItemDefinition {
        item_hash: parse_hash("item_hash", row.try_get("item_hash")?)?,
        name: row.try_get("item_name")?,
        tier: TierType::from_code(row.try_get("tier_type")?),
        class_type: ClassType::from_code(row.try_get("class_type")?),
        bucket_hash: parse_hash("bucket_type_hash", row.try_get("bucket_type_hash")?)?,
    })
}

/// Hashes are unsigned 32-bit; some exports write them as signed.
fn parse_hash(column: &str, value: i64) -> Result<u32, RepositoryError> {
    if let Ok(hash) = u32::try_from(value) {
        return Ok(hash);
    }
    i32::try_from(value)
        .map(|signed| signed as u32)
        .map_err(|_| RepositoryError::Decode(format!("invalid value for `{column}` (expected 32-bit hash): {value}")))
}
