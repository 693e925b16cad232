use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::item::Item;
use crate::taxonomy::EquipmentBucket;

/// What one character holds in one bucket.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketContents {
    pub equipped: Option<Item>,
    pub unequipped: Vec<Item>,
}

impl BucketContents {
    pub fn len(&self) -> usize {
        usize::from(self.equipped.is_some()) + self.unequipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, item: &Item) -> bool {
        self.equipped.as_ref().is_some_and(|equipped| equipped.same_instance(item))
            || self.unequipped.iter().any(|candidate| candidate.same_instance(item))
    }

    /// Places an item, keeping the equipped slot distinct from the rest.
    pub fn push(&mut self, item: Item) {
        if item.is_equipped && self.equipped.is_none() {
            self.equipped = Some(item);
        } else {
            self.unequipped.push(item);
        }
    }
}

/// Per-bucket contents of a single character.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    buckets: BTreeMap<EquipmentBucket, BucketContents>,
}

impl Equipment {
    pub fn bucket(&self, bucket: EquipmentBucket) -> Option<&BucketContents> {
        self.buckets.get(&bucket)
    }

    pub fn bucket_mut(&mut self, bucket: EquipmentBucket) -> &mut BucketContents {
        self.buckets.entry(bucket).or_default()
    }

    pub fn unequipped(&self, bucket: EquipmentBucket) -> &[Item] {
        self.buckets.get(&bucket).map(|contents| contents.unequipped.as_slice()).unwrap_or(&[])
    }

    pub fn occupancy(&self, bucket: EquipmentBucket) -> usize {
        self.buckets.get(&bucket).map(BucketContents::len).unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EquipmentBucket, &BucketContents)> {
        self.buckets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::BucketContents;
    use crate::fixtures::ItemBuilder;

    #[test]
    fn equipped_item_is_kept_apart_from_unequipped_items() {
        let mut contents = BucketContents::default();
        contents.push(ItemBuilder::weapon(1, "a", 500).build());
        contents.push(ItemBuilder::weapon(2, "b", 510).equipped().build());
        contents.push(ItemBuilder::weapon(3, "c", 520).build());

        assert_eq!(contents.equipped.as_ref().map(|item| item.item_hash), Some(2));
        assert_eq!(contents.unequipped.len(), 2);
        assert_eq!(contents.len(), 3);
    }
}
