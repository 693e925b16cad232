use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::item::Item;
use crate::taxonomy::EquipmentBucket;

/// One item per bucket, either a target to equip or a snapshot of what is
/// equipped. Holds copies; it never owns the remote items.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    items: BTreeMap<EquipmentBucket, Item>,
}

impl Loadout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, bucket: EquipmentBucket) -> Option<&Item> {
        self.items.get(&bucket)
    }

    pub fn insert(&mut self, bucket: EquipmentBucket, item: Item) -> Option<Item> {
        self.items.insert(bucket, item)
    }

    pub fn remove(&mut self, bucket: EquipmentBucket) -> Option<Item> {
        self.items.remove(&bucket)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EquipmentBucket, &Item)> {
        self.items.iter()
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Mean power of the eight contributing buckets. Missing buckets count as zero.
    pub fn power_level(&self) -> f64 {
        let total: u64 = EquipmentBucket::POWER_CONTRIBUTING
            .iter()
            .filter_map(|bucket| self.items.get(bucket))
            .map(|item| u64::from(item.power))
            .sum();
        total as f64 / EquipmentBucket::POWER_CONTRIBUTING.len() as f64
    }

    pub fn exotic_count(&self, buckets: &[EquipmentBucket]) -> usize {
        buckets
            .iter()
            .filter_map(|bucket| self.items.get(bucket))
            .filter(|item| item.is_exotic())
            .count()
    }
}

impl FromIterator<(EquipmentBucket, Item)> for Loadout {
    fn from_iter<T: IntoIterator<Item = (EquipmentBucket, Item)>>(iter: T) -> Self {
        Self { items: iter.into_iter().collect() }
    }
}

/// Minimal durable reference to one loadout slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedItem {
    pub item_hash: u32,
    #[serde(default)]
    pub item_instance_id: Option<String>,
    pub bucket_hash: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedLoadout(pub BTreeMap<EquipmentBucket, PersistedItem>);

impl PersistedLoadout {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
