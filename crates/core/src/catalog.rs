use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::taxonomy::{ClassType, EquipmentBucket, TierType};

/// Static definition of an item type, as loaded from the manifest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub item_hash: u32,
    pub name: String,
    pub tier: TierType,
    pub class_type: ClassType,
    pub bucket_hash: u32,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub bucket_hashes: Vec<(u32, EquipmentBucket)>,
    pub class_hashes: Vec<(u32, ClassType)>,
    pub vault_bucket_hash: u32,
    pub definitions: Vec<ItemDefinition>,
    pub engram_hashes: Vec<u32>,
    pub item_name_aliases: Vec<(String, String)>,
    pub class_name_aliases: Vec<(String, String)>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            bucket_hashes: vec![
                (1_498_876_634, EquipmentBucket::Kinetic),
                (2_465_295_065, EquipmentBucket::Energy),
                (953_998_645, EquipmentBucket::Power),
                (4_023_194_814, EquipmentBucket::Ghost),
                (3_448_274_439, EquipmentBucket::Helmet),
                (3_551_918_588, EquipmentBucket::Gauntlets),
                (14_239_492, EquipmentBucket::Chest),
                (20_886_954, EquipmentBucket::Legs),
                (1_585_787_867, EquipmentBucket::ClassArmor),
                (434_908_299, EquipmentBucket::Artifact),
                (3_284_755_031, EquipmentBucket::Subclass),
            ],
            class_hashes: vec![
                (3_655_393_761, ClassType::Titan),
                (671_679_327, ClassType::Hunter),
                (2_271_682_572, ClassType::Warlock),
            ],
            vault_bucket_hash: 138_197_802,
            definitions: Vec::new(),
            engram_hashes: Vec::new(),
            item_name_aliases: default_item_name_aliases(),
            class_name_aliases: vec![
                ("fault".to_string(), "vault".to_string()),
                ("tatum".to_string(), "titan".to_string()),
            ],
        }
    }
}

impl CatalogConfig {
    pub fn with_definitions(mut self, definitions: Vec<ItemDefinition>) -> Self {
        self.definitions = definitions;
        self
    }

    pub fn with_engram_hashes(mut self, engram_hashes: Vec<u32>) -> Self {
        self.engram_hashes = engram_hashes;
        self
    }

    /// Adds every definition whose name mentions an engram to the engram set.
    pub fn with_engrams_from_names(mut self) -> Self {
        let named = self
            .definitions
            .iter()
            .filter(|definition| definition.name.to_lowercase().contains("engram"))
            .map(|definition| definition.item_hash);
        let mut engram_hashes: Vec<u32> = self.engram_hashes.iter().copied().chain(named).collect();
        engram_hashes.sort_unstable();
        engram_hashes.dedup();
        self.engram_hashes = engram_hashes;
        self
    }
}

/// Speech recognisers split or mishear some item names.
fn default_item_name_aliases() -> Vec<(String, String)> {
    [
        ("spin metal", "spinmetal"),
        ("spin mental", "spinmetal"),
        ("spin middle", "spinmetal"),
        ("passage coins", "passage coin"),
        ("strange coins", "strange coin"),
        ("exotic shards", "exotic shard"),
        ("worm spore", "wormspore"),
        ("worms for", "wormspore"),
        ("worm for", "wormspore"),
        ("3 of coins", "three of coins"),
        ("motes", "mote of light"),
        ("motes of light", "mote of light"),
        ("e.d.z token", "edz token"),
        ("e.d.z tokens", "edz token"),
        ("edz tokens", "edz token"),
        ("edc token", "edz token"),
        ("edc tokens", "edz token"),
    ]
    .into_iter()
    .map(|(alias, name)| (alias.to_string(), name.to_string()))
    .collect()
}

/// Lookup tables built once at startup and shared read-only by every request.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    bucket_by_hash: HashMap<u32, EquipmentBucket>,
    hash_by_bucket: HashMap<EquipmentBucket, u32>,
    class_by_hash: HashMap<u32, ClassType>,
    vault_bucket_hash: u32,
    definitions: HashMap<u32, ItemDefinition>,
    hash_by_name: HashMap<String, u32>,
    engram_hashes: HashSet<u32>,
    item_name_aliases: HashMap<String, String>,
    class_name_aliases: HashMap<String, String>,
}

impl Catalog {
    pub fn new(config: CatalogConfig) -> Self {
        let mut hash_by_name = HashMap::new();
        let mut definitions = HashMap::with_capacity(config.definitions.len());
        for definition in config.definitions {
            hash_by_name.entry(normalize_name(&definition.name)).or_insert(definition.item_hash);
            definitions.insert(definition.item_hash, definition);
        }

        Self {
            hash_by_bucket: config.bucket_hashes.iter().map(|(hash, bucket)| (*bucket, *hash)).collect(),
            bucket_by_hash: config.bucket_hashes.into_iter().collect(),
            class_by_hash: config.class_hashes.into_iter().collect(),
            vault_bucket_hash: config.vault_bucket_hash,
            definitions,
            hash_by_name,
            engram_hashes: config.engram_hashes.into_iter().collect(),
            item_name_aliases: config
                .item_name_aliases
                .into_iter()
                .map(|(alias, name)| (normalize_name(&alias), normalize_name(&name)))
                .collect(),
            class_name_aliases: config
                .class_name_aliases
                .into_iter()
                .map(|(alias, name)| (normalize_name(&alias), normalize_name(&name)))
                .collect(),
        }
    }

    pub fn bucket_for_hash(&self, bucket_hash: u32) -> Option<EquipmentBucket> {
        self.bucket_by_hash.get(&bucket_hash).copied()
    }

    pub fn hash_for_bucket(&self, bucket: EquipmentBucket) -> Option<u32> {
        self.hash_by_bucket.get(&bucket).copied()
    }

    pub fn class_for_hash(&self, class_hash: u32) -> ClassType {
        self.class_by_hash.get(&class_hash).copied().unwrap_or_default()
    }

    pub fn vault_bucket_hash(&self) -> u32 {
        self.vault_bucket_hash
    }

    pub fn definition(&self, item_hash: u32) -> Option<&ItemDefinition> {
        self.definitions.get(&item_hash)
    }

    pub fn is_engram(&self, item_hash: u32) -> bool {
        self.engram_hashes.contains(&item_hash)
    }

    /// Resolves a user supplied item name (after alias translation) to an item hash.
    pub fn item_hash_for_name(&self, name: &str) -> Option<u32> {
        self.hash_by_name.get(&self.canonical_item_name(name)).copied()
    }

    pub fn canonical_item_name(&self, name: &str) -> String {
        let normalized = normalize_name(name);
        self.item_name_aliases.get(&normalized).cloned().unwrap_or(normalized)
    }

    pub fn canonical_class_name(&self, name: &str) -> String {
        let normalized = normalize_name(name);
        self.class_name_aliases.get(&normalized).cloned().unwrap_or(normalized)
    }

    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
