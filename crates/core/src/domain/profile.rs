use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::domain::character::{sort_by_last_played, Character, CharacterId};
use crate::domain::equipment::Equipment;
use crate::domain::item::Item;
use crate::domain::loadout::Loadout;
use crate::taxonomy::{ClassType, TierType, TransferStatus};

/// A platform membership that owns characters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub membership_id: String,
    pub membership_type: i32,
    pub display_name: String,
}

/// The resolved account behind an access token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account-level id used to key persisted loadouts.
    pub account_id: String,
    pub membership: Membership,
}

/// An item entry as reported by the remote inventory components.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawItem {
    pub item_hash: u32,
    pub instance_id: Option<String>,
    pub bucket_hash: u32,
    pub quantity: u32,
    pub transfer_status: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstanceData {
    pub power: u32,
    pub required_level: u32,
    pub can_equip: bool,
    pub is_equipped: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterSnapshot {
    pub character: Character,
    /// Items currently equipped; one per bucket.
    pub equipment: Vec<RawItem>,
    pub inventory: Vec<RawItem>,
}

/// Everything the remote profile call returned, before catalog resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileSnapshot {
    pub membership: Membership,
    pub characters: Vec<CharacterSnapshot>,
    /// Vault contents and account-wide items.
    pub profile_inventory: Vec<RawItem>,
    pub currencies: Vec<RawItem>,
    pub instances: HashMap<String, InstanceData>,
}

impl ProfileSnapshot {
    fn instance(&self, instance_id: Option<&str>) -> Option<&InstanceData> {
        instance_id.and_then(|id| self.instances.get(id))
    }
}

/// Aggregate root for one request. Built from a snapshot and dropped when the
/// request finishes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Profile {
    pub membership_id: String,
    pub membership_type: i32,
    /// Most recently played first.
    pub characters: Vec<Character>,
    pub all_items: Vec<Item>,
    pub loadouts: HashMap<CharacterId, Loadout>,
    pub equipments: HashMap<CharacterId, Equipment>,
}

impl Profile {
    /// Resolves a snapshot against the catalog. With `require_instance_data`
    /// only instanced items with instance details are kept in `all_items`,
    /// which drops currencies.
    pub fn assemble(snapshot: ProfileSnapshot, catalog: &Catalog, require_instance_data: bool) -> Self {
        let mut characters: Vec<Character> =
            snapshot.characters.iter().map(|entry| entry.character.clone()).collect();
        sort_by_last_played(&mut characters);

        let mut all_items = Vec::new();
        let mut loadouts = HashMap::new();
        let mut equipments = HashMap::new();

        if !require_instance_data {
            for raw in &snapshot.currencies {
                all_items.push(resolve_item(raw, None, None, false, catalog));
            }
        }

        for raw in &snapshot.profile_inventory {
            let instance = snapshot.instance(raw.instance_id.as_deref());
            if !require_instance_data || instance.is_some() {
                all_items.push(resolve_item(raw, instance, None, false, catalog));
            }
        }

        for entry in &snapshot.characters {
            let owner = &entry.character.id;
            let mut loadout = Loadout::new();
            let mut equipment = Equipment::default();

            for raw in &entry.equipment {
                let instance = snapshot.instance(raw.instance_id.as_deref());
                let item = resolve_item(raw, instance, Some(owner), true, catalog);
                if let Some(bucket) = catalog.bucket_for_hash(item.bucket_hash) {
                    loadout.insert(bucket, item.clone());
                    equipment.bucket_mut(bucket).push(item.clone());
                }
                if !require_instance_data || instance.is_some() {
                    all_items.push(item);
                }
            }

            for raw in &entry.inventory {
                let instance = snapshot.instance(raw.instance_id.as_deref());
                let item = resolve_item(raw, instance, Some(owner), false, catalog);
                if let Some(bucket) = catalog.bucket_for_hash(item.bucket_hash) {
                    equipment.bucket_mut(bucket).push(item.clone());
                }
                if !require_instance_data || instance.is_some() {
                    all_items.push(item);
                }
            }

            loadouts.insert(owner.clone(), loadout);
            equipments.insert(owner.clone(), equipment);
        }

        Self {
            membership_id: snapshot.membership.membership_id,
            membership_type: snapshot.membership.membership_type,
            characters,
            all_items,
            loadouts,
            equipments,
        }
    }

    pub fn current_character(&self) -> Option<&Character> {
        self.characters.first()
    }

    pub fn character(&self, id: &CharacterId) -> Option<&Character> {
        self.characters.iter().find(|character| &character.id == id)
    }

    /// Most recently played character of the given class.
    pub fn character_for_class(&self, class_type: ClassType) -> Option<&Character> {
        self.characters.iter().find(|character| character.class_type == class_type)
    }

    pub fn loadout(&self, id: &CharacterId) -> Option<&Loadout> {
        self.loadouts.get(id)
    }

    pub fn equipment(&self, id: &CharacterId) -> Option<&Equipment> {
        self.equipments.get(id)
    }
}

fn resolve_item(
    raw: &RawItem,
    instance: Option<&InstanceData>,
    owner: Option<&CharacterId>,
    from_equipment: bool,
    catalog: &Catalog,
) -> Item {
    let definition = catalog.definition(raw.item_hash);
    let bucket_hash = definition
        .map(|definition| definition.bucket_hash)
        .filter(|hash| *hash != 0)
        .unwrap_or(raw.bucket_hash);

    Item {
        item_hash: raw.item_hash,
        instance_id: raw.instance_id.clone(),
        bucket_hash,
        quantity: raw.quantity,
        power: instance.map(|instance| instance.power).unwrap_or(0),
        tier: definition.map(|definition| definition.tier).unwrap_or(TierType::Unknown),
        class_type: definition.map(|definition| definition.class_type).unwrap_or(ClassType::Unknown),
        required_level: instance.map(|instance| instance.required_level).unwrap_or(0),
        can_equip: instance.map(|instance| instance.can_equip).unwrap_or(false),
        is_equipped: from_equipment || instance.map(|instance| instance.is_equipped).unwrap_or(false),
        is_engram: catalog.is_engram(raw.item_hash),
        transfer_status: if from_equipment {
            TransferStatus::ItemIsEquipped
        } else {
            TransferStatus::from_flags(raw.transfer_status)
        },
        owner: owner.cloned(),
    }
}
