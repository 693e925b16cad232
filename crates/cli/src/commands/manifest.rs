//! `warmind manifest import`: loads item definitions exported from the game
//! manifest into the definitions table the server builds its catalog from.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use warmind_core::catalog::ItemDefinition;
use warmind_core::config::{AppConfig, LoadOptions};
use warmind_core::{ClassType, TierType};
use warmind_db::repositories::{ManifestRepository, SqlManifestRepository};
use warmind_db::{connect_with_settings, migrations};

use crate::commands::{runtime, CommandResult, StepFailure};

/// One row of an exported `DestinyInventoryItemDefinition` table.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestEntry {
    item_hash: u32,
    item_name: String,
    #[serde(default)]
    tier_type: i64,
    #[serde(default = "unknown_class")]
    class_type: i64,
    #[serde(default)]
    bucket_type_hash: u32,
}

fn unknown_class() -> i64 {
    ClassType::Unknown.code()
}

/// Entries with a blank name are dropped; nothing could ever look them up.
pub fn parse_manifest(raw: &str) -> Result<Vec<ItemDefinition>, serde_json::Error> {
    let entries: Vec<ManifestEntry> = serde_json::from_str(raw)?;
    Ok(entries
        .into_iter()
        .filter(|entry| !entry.item_name.trim().is_empty())
        .map(|entry| ItemDefinition {
            item_hash: entry.item_hash,
            name: entry.item_name.trim().to_string(),
            tier: TierType::from_code(entry.tier_type),
            class_type: ClassType::from_code(entry.class_type),
            bucket_hash: entry.bucket_type_hash,
        })
        .collect())
}

pub fn import(path: &Path) -> CommandResult {
    CommandResult::from_steps("manifest_import", import_steps(path))
}

fn import_steps(path: &Path) -> Result<String, StepFailure> {
    let config = AppConfig::load(LoadOptions::default())
        .map_err(|error| ("config_validation", format!("configuration issue: {error}"), 2u8))?;

    let raw = fs::read_to_string(path).map_err(|error| {
        ("manifest_read", format!("could not read `{}`: {error}", path.display()), 6u8)
    })?;
    let definitions = parse_manifest(&raw).map_err(|error| {
        ("manifest_parse", format!("`{}` is not a manifest export: {error}", path.display()), 6u8)
    })?;

    runtime()?.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool).await.map_err(|error| ("migration", error.to_string(), 5u8))?;

        let written = SqlManifestRepository::new(pool.clone())
            .upsert_definitions(&definitions)
            .await
            .map_err(|error| ("manifest_write", error.to_string(), 7u8))?;
        pool.close().await;

        Ok::<String, StepFailure>(format!("imported {written} item definitions"))
    })
}
