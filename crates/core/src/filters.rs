//! Composable predicates over item collections.
//!
//! Two application strategies are offered. [`filter_sequential`] allocates a
//! fresh list per filter and keeps the input order. [`retain_matching`] makes a
//! single in-place partition pass and truncates to the matched prefix, which
//! reorders the input. Both select the same set of items.

use std::borrow::Borrow;

use crate::domain::character::CharacterId;
use crate::domain::item::Item;
use crate::taxonomy::{ClassType, TierType};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemFilter {
    ItemHash(u32),
    BucketHash(u32),
    Tier(TierType),
    NotTier(TierType),
    /// Keeps items usable by the class; unrestricted items always pass.
    ClassCompatible(ClassType),
    MaxRequiredLevel(u32),
    /// `None` selects vault items.
    OwnedBy(Option<CharacterId>),
    InstanceId(String),
    Engram(bool),
    Equippable(bool),
}

impl ItemFilter {
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Self::ItemHash(hash) => item.item_hash == *hash,
            Self::BucketHash(hash) => item.bucket_hash == *hash,
            Self::Tier(tier) => item.tier == *tier,
            Self::NotTier(tier) => item.tier != *tier,
            Self::ClassCompatible(class) => item.class_type.accepts(*class),
            Self::MaxRequiredLevel(level) => item.required_level <= *level,
            Self::OwnedBy(owner) => item.owner == *owner,
            Self::InstanceId(id) => item.instance_id.as_deref() == Some(id.as_str()),
            Self::Engram(expected) => item.is_engram == *expected,
            Self::Equippable(expected) => item.can_equip == *expected,
        }
    }
}

pub fn matches_all(item: &Item, filters: &[ItemFilter]) -> bool {
    filters.iter().all(|filter| filter.matches(item))
}

/// Applies each filter in turn, producing a new list per step.
pub fn filter_sequential<T>(items: &[T], filters: &[ItemFilter]) -> Vec<T>
where
    T: Borrow<Item> + Clone,
{
    let mut current: Vec<T> = items.to_vec();
    for filter in filters {
        current = current.into_iter().filter(|item| filter.matches(item.borrow())).collect();
    }
    current
}

/// Moves every item matching all filters to the front and truncates the rest.
pub fn retain_matching<T>(items: &mut Vec<T>, filters: &[ItemFilter])
where
    T: Borrow<Item>,
{
    let mut matched = 0;
    for index in 0..items.len() {
        if matches_all(items[index].borrow(), filters) {
            items.swap(matched, index);
            matched += 1;
        }
    }
    items.truncate(matched);
}

pub fn sort_by_power_desc<T: Borrow<Item>>(items: &mut [T]) {
    items.sort_by(|left, right| right.borrow().power.cmp(&left.borrow().power));
}

pub fn sort_by_power_asc<T: Borrow<Item>>(items: &mut [T]) {
    items.sort_by(|left, right| left.borrow().power.cmp(&right.borrow().power));
}
