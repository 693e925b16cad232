//! Loadout selection: maximum power and randomized.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::catalog::Catalog;
use crate::domain::character::{Character, CharacterId};
use crate::domain::item::Item;
use crate::domain::loadout::Loadout;
use crate::domain::profile::Profile;
use crate::errors::DomainError;
use crate::filters::{retain_matching, sort_by_power_desc, ItemFilter};
use crate::taxonomy::{EquipmentBucket, TierType};

pub type GearByBucket<'a> = BTreeMap<EquipmentBucket, Vec<&'a Item>>;

pub struct AllocationEngine<'c> {
    catalog: &'c Catalog,
}

impl<'c> AllocationEngine<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    /// Groups items by equipment bucket, each list sorted by power descending.
    /// Items whose bucket hash is not an equipment bucket are dropped.
    pub fn group_and_sort_gear<'i>(&self, items: impl IntoIterator<Item = &'i Item>) -> GearByBucket<'i> {
        let mut grouped: GearByBucket<'i> = BTreeMap::new();
        for item in items {
            if let Some(bucket) = self.catalog.bucket_for_hash(item.bucket_hash) {
                grouped.entry(bucket).or_default().push(item);
            }
        }
        for list in grouped.values_mut() {
            sort_by_power_desc(list);
        }
        grouped
    }

    pub fn find_max_power_loadout(
        &self,
        profile: &Profile,
        destination: &CharacterId,
    ) -> Result<Loadout, DomainError> {
        let character = destination_character(profile, destination)?;

        let mut legendary: Vec<&Item> = profile.all_items.iter().collect();
        retain_matching(&mut legendary, &eligibility_filters(character, ItemFilter::NotTier(TierType::Exotic)));
        let legendary_by_bucket = self.group_and_sort_gear(legendary);

        let mut loadout = Loadout::new();
        for bucket in EquipmentBucket::ALL {
            if matches!(bucket, EquipmentBucket::Ghost | EquipmentBucket::Subclass) {
                continue;
            }
            let candidates = legendary_by_bucket.get(&bucket).map(Vec::as_slice).unwrap_or(&[]);
            if let Some(best) = find_best_item_for_bucket(candidates, destination) {
                loadout.insert(bucket, best.clone());
            }
        }

        let mut exotics: Vec<&Item> = profile.all_items.iter().collect();
        retain_matching(&mut exotics, &eligibility_filters(character, ItemFilter::Tier(TierType::Exotic)));
        let exotic_by_bucket = self.group_and_sort_gear(exotics);

        let exotic_pick = |bucket: EquipmentBucket, loadout: &Loadout| -> Option<Item> {
            let candidates = exotic_by_bucket.get(&bucket).map(Vec::as_slice).unwrap_or(&[]);
            let candidate = find_best_item_for_bucket(candidates, destination)?;
            let current_power = loadout.get(bucket).map_or(0, |item| item.power);
            (candidate.power > current_power).then(|| candidate.clone())
        };

        if let Some(exotic) = exotic_pick(EquipmentBucket::ClassArmor, &loadout) {
            debug!(bucket = "class_armor", item_hash = exotic.item_hash, "exotic override applied");
            loadout.insert(EquipmentBucket::ClassArmor, exotic);
        }

        for category in [&EquipmentBucket::WEAPONS[..], &EquipmentBucket::ARMOR[..]] {
            let mut best: Option<(EquipmentBucket, Item)> = None;
            for &bucket in category {
                if let Some(exotic) = exotic_pick(bucket, &loadout) {
                    let beats_best = best.as_ref().map_or(true, |(_, current)| exotic.power > current.power);
                    if beats_best {
                        best = Some((bucket, exotic));
                    }
                }
            }
            if let Some((bucket, exotic)) = best {
                debug!(bucket = bucket.as_str(), item_hash = exotic.item_hash, "exotic override applied");
                loadout.insert(bucket, exotic);
            }
        }

        debug!(
            character_id = %destination,
            power_level = loadout.power_level(),
            "max power loadout selected"
        );
        Ok(loadout)
    }

    pub fn find_random_loadout(
        &self,
        profile: &Profile,
        destination: &CharacterId,
        include_armor: bool,
    ) -> Result<Loadout, DomainError> {
        self.find_random_loadout_with(profile, destination, include_armor, &mut rand::thread_rng())
    }

    /// Starts from the character's current loadout and re-rolls weapon buckets
    /// (and armor buckets when asked) from unequipped items. Afterwards one
    /// random weapon bucket, and one random armor bucket when asked, may be
    /// swapped for an exotic. An exotic the re-roll could not replace keeps
    /// that category's exotic roll in its own bucket.
    pub fn find_random_loadout_with<R: Rng + ?Sized>(
        &self,
        profile: &Profile,
        destination: &CharacterId,
        include_armor: bool,
        rng: &mut R,
    ) -> Result<Loadout, DomainError> {
        let character = destination_character(profile, destination)?;
        let mut loadout = profile.loadout(destination).cloned().unwrap_or_default();
        let Some(equipment) = profile.equipment(destination) else {
            return Ok(loadout);
        };

        let mut buckets: Vec<EquipmentBucket> = EquipmentBucket::WEAPONS.to_vec();
        if include_armor {
            buckets.extend(EquipmentBucket::ARMOR);
        }

        let non_exotic = eligibility_filters(character, ItemFilter::NotTier(TierType::Exotic));
        for bucket in buckets {
            let mut candidates: Vec<&Item> = equipment.unequipped(bucket).iter().collect();
            retain_matching(&mut candidates, &non_exotic);
            if let Some(pick) = candidates.choose(rng) {
                loadout.insert(bucket, (*pick).clone());
            }
        }

        let exotic = eligibility_filters(character, ItemFilter::Tier(TierType::Exotic));
        let mut categories = vec![&EquipmentBucket::WEAPONS[..]];
        if include_armor {
            categories.push(&EquipmentBucket::ARMOR[..]);
        }
        for category in categories {
            // An exotic that survived the re-roll pins the category's roll to its bucket.
            let retained = category
                .iter()
                .copied()
                .find(|&bucket| loadout.get(bucket).is_some_and(Item::is_exotic));
            let Some(bucket) = retained.or_else(|| category.choose(rng).copied()) else {
                continue;
            };
            let mut candidates: Vec<&Item> = equipment.unequipped(bucket).iter().collect();
            retain_matching(&mut candidates, &exotic);
            if let Some(pick) = candidates.choose(rng) {
                debug!(bucket = bucket.as_str(), item_hash = pick.item_hash, "random exotic applied");
                loadout.insert(bucket, (*pick).clone());
            }
        }

        Ok(loadout)
    }
}

/// Picks among the highest-power items of a bucket (already sorted by power
/// descending). Ties prefer an item already on the destination, then the one
/// equipped there, then a vault item over one held by another character.
pub fn find_best_item_for_bucket<'i>(items: &[&'i Item], destination: &CharacterId) -> Option<&'i Item> {
    let (&first, rest) = items.split_first()?;
    let mut candidate = first;

    for &next in rest {
        if next.power < candidate.power || candidate.is_equipped_on(destination) {
            break;
        }

        let next_on_destination = next.is_owned_by(destination);
        let candidate_on_destination = candidate.is_owned_by(destination);
        let candidate_elsewhere = !candidate.is_in_vault() && !candidate_on_destination;

        if next_on_destination && candidate_elsewhere {
            candidate = next;
        } else if next_on_destination && candidate_on_destination {
            if next.is_equipped && !candidate.is_equipped {
                candidate = next;
            }
        } else if candidate_elsewhere && next.is_in_vault() {
            candidate = next;
        }
    }

    Some(candidate)
}

fn destination_character<'p>(profile: &'p Profile, destination: &CharacterId) -> Result<&'p Character, DomainError> {
    profile
        .character(destination)
        .ok_or_else(|| DomainError::CharacterNotFound(destination.to_string()))
}

fn eligibility_filters(character: &Character, tier_filter: ItemFilter) -> [ItemFilter; 4] {
    [
        ItemFilter::ClassCompatible(character.class_type),
        tier_filter,
        ItemFilter::MaxRequiredLevel(character.level),
        ItemFilter::Equippable(true),
    ]
}
