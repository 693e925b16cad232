//! Projection between in-memory loadouts and their stored form.

use serde::Serialize;
use tracing::warn;

use crate::domain::item::Item;
use crate::domain::loadout::{Loadout, PersistedItem, PersistedLoadout};
use crate::domain::profile::Profile;
use crate::taxonomy::EquipmentBucket;

pub fn to_persisted(loadout: &Loadout) -> PersistedLoadout {
    PersistedLoadout(
        loadout
            .iter()
            .map(|(bucket, item)| {
                (
                    *bucket,
                    PersistedItem {
                        item_hash: item.item_hash,
                        item_instance_id: item.instance_id.clone(),
                        bucket_hash: item.bucket_hash,
                    },
                )
            })
            .collect(),
    )
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RestoredLoadout {
    pub loadout: Loadout,
    /// Buckets whose item type is no longer anywhere in the profile.
    pub unresolved: Vec<EquipmentBucket>,
    /// Buckets restored from a different copy of the same item type.
    pub substituted: Vec<EquipmentBucket>,
}

/// Matches stored entries against the current profile. An exact instance is
/// preferred; otherwise the first item with the same hash stands in.
pub fn from_persisted(persisted: &PersistedLoadout, profile: &Profile) -> RestoredLoadout {
    let mut restored = RestoredLoadout::default();

    for (bucket, entry) in &persisted.0 {
        let mut same_hash = profile.all_items.iter().filter(|item| item.item_hash == entry.item_hash);
        let Some(first) = same_hash.next() else {
            warn!(
                event_name = "loadout.restore.item_missing",
                bucket = bucket.as_str(),
                item_hash = entry.item_hash,
                "stored item no longer in profile"
            );
            restored.unresolved.push(*bucket);
            continue;
        };

        let exact = exact_instance(first, same_hash, entry);
        match exact {
            Some(item) => {
                restored.loadout.insert(*bucket, item.clone());
            }
            None => {
                warn!(
                    event_name = "loadout.restore.instance_substituted",
                    bucket = bucket.as_str(),
                    item_hash = entry.item_hash,
                    "stored instance missing, using another copy"
                );
                restored.substituted.push(*bucket);
                restored.loadout.insert(*bucket, first.clone());
            }
        }
    }

    restored
}

fn exact_instance<'a>(
    first: &'a Item,
    rest: impl Iterator<Item = &'a Item>,
    entry: &PersistedItem,
) -> Option<&'a Item> {
    let wanted = entry.item_instance_id.as_deref()?;
    std::iter::once(first).chain(rest).find(|item| item.instance_id.as_deref() == Some(wanted))
}
