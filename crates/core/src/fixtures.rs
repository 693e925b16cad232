//! Builders shared by unit tests across the crate.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Mutex;

use crate::catalog::{Catalog, CatalogConfig};
use crate::domain::character::{Character, CharacterId};
use crate::domain::equipment::Equipment;
use crate::domain::item::Item;
use crate::domain::loadout::Loadout;
use crate::domain::profile::{Account, Membership, Profile, ProfileSnapshot};
use crate::domain::progression::ProgressionSnapshot;
use crate::gateway::{EquipItemsRequest, EquipRequest, GameApi, RemoteError, TransferRequest};
use crate::taxonomy::{ClassType, EquipmentBucket, TierType, TransferStatus, MAX_ITEMS_PER_BUCKET};

pub fn catalog() -> Catalog {
    Catalog::new(CatalogConfig::default())
}

pub fn bucket_hash(bucket: EquipmentBucket) -> u32 {
    catalog().hash_for_bucket(bucket).unwrap_or_default()
}

#[derive(Clone, Debug)]
pub struct ItemBuilder {
    item: Item,
}

impl ItemBuilder {
    pub fn new(item_hash: u32, bucket: EquipmentBucket) -> Self {
        Self {
            item: Item {
                item_hash,
                instance_id: Some(format!("{item_hash}")),
                bucket_hash: bucket_hash(bucket),
                quantity: 1,
                power: 0,
                tier: TierType::Legendary,
                class_type: ClassType::Unknown,
                required_level: 1,
                can_equip: true,
                is_equipped: false,
                is_engram: false,
                transfer_status: TransferStatus::CanTransfer,
                owner: None,
            },
        }
    }

    pub fn weapon(item_hash: u32, instance_id: &str, power: u32) -> Self {
        Self::new(item_hash, EquipmentBucket::Kinetic).instance(instance_id).power(power)
    }

    pub fn stack(item_hash: u32, quantity: u32) -> Self {
        let mut builder = Self::new(item_hash, EquipmentBucket::Kinetic);
        builder.item.instance_id = None;
        builder.item.bucket_hash = 0;
        builder.item.quantity = quantity;
        builder.item.tier = TierType::Currency;
        builder.item.can_equip = false;
        builder
    }

    pub fn instance(mut self, instance_id: &str) -> Self {
        self.item.instance_id = Some(instance_id.to_string());
        self
    }

    pub fn power(mut self, power: u32) -> Self {
        self.item.power = power;
        self
    }

    pub fn tier(mut self, tier: TierType) -> Self {
        self.item.tier = tier;
        self
    }

    pub fn exotic(self) -> Self {
        self.tier(TierType::Exotic)
    }

    pub fn class(mut self, class_type: ClassType) -> Self {
        self.item.class_type = class_type;
        self
    }

    pub fn required_level(mut self, level: u32) -> Self {
        self.item.required_level = level;
        self
    }

    pub fn owner(mut self, character_id: &str) -> Self {
        self.item.owner = Some(CharacterId::from(character_id));
        self
    }

    pub fn equipped(mut self) -> Self {
        self.item.is_equipped = true;
        self.item.transfer_status = TransferStatus::ItemIsEquipped;
        self
    }

    pub fn not_equippable(mut self) -> Self {
        self.item.can_equip = false;
        self
    }

    pub fn engram(mut self) -> Self {
        self.item.is_engram = true;
        self
    }

    pub fn build(self) -> Item {
        self.item
    }
}

pub fn character(id: &str, class_type: ClassType, level: u32, played_hour: u32) -> Character {
    Character {
        id: CharacterId::from(id),
        membership_id: "4611686018400000001".to_string(),
        membership_type: 2,
        class_type,
        level,
        light: 0,
        last_played: Utc
            .with_ymd_and_hms(2026, 5, 1, played_hour, 0, 0)
            .single()
            .expect("valid fixture timestamp"),
    }
}

/// Builds a profile whose loadouts and equipment are derived from the items'
/// owners and equipped flags, the same way remote assembly does.
#[derive(Clone, Debug, Default)]
pub struct ProfileBuilder {
    characters: Vec<Character>,
    items: Vec<Item>,
}

impl ProfileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn character(mut self, character: Character) -> Self {
        self.characters.push(character);
        self
    }

    pub fn item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn items(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.items.extend(items);
        self
    }

    pub fn build(self) -> Profile {
        let catalog = catalog();
        let mut characters = self.characters;
        crate::domain::character::sort_by_last_played(&mut characters);

        let mut profile = Profile {
            membership_id: "4611686018400000001".to_string(),
            membership_type: 2,
            characters,
            ..Profile::default()
        };

        for character in &profile.characters {
            profile.loadouts.insert(character.id.clone(), Loadout::new());
            profile.equipments.insert(character.id.clone(), Equipment::default());
        }

        for item in &self.items {
            let Some(owner) = item.owner.as_ref() else {
                continue;
            };
            let Some(bucket) = catalog.bucket_for_hash(item.bucket_hash) else {
                continue;
            };
            if item.is_equipped {
                profile.loadouts.entry(owner.clone()).or_default().insert(bucket, item.clone());
            }
            profile.equipments.entry(owner.clone()).or_default().bucket_mut(bucket).push(item.clone());
        }

        profile.all_items = self.items;
        profile
    }
}

#[derive(Default)]
struct SimulatedState {
    items: Vec<Item>,
    transfers: Vec<TransferRequest>,
    equips: Vec<Vec<i64>>,
    failing_hashes: HashSet<u32>,
}

/// In-memory stand-in for the remote API. Applies transfers and equips to its
/// own copy of the inventory and enforces bucket capacity the way the live
/// service does.
pub struct SimulatedGameApi {
    catalog: Catalog,
    membership: Membership,
    state: Mutex<SimulatedState>,
}

fn rejected(status: &str) -> RemoteError {
    RemoteError::Api { code: 1_623, status: status.to_string(), message: status.to_string() }
}

impl SimulatedGameApi {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            catalog: catalog(),
            membership: Membership {
                membership_id: profile.membership_id.clone(),
                membership_type: profile.membership_type,
                display_name: "simulated".to_string(),
            },
            state: Mutex::new(SimulatedState { items: profile.all_items.clone(), ..SimulatedState::default() }),
        }
    }

    /// Every call touching this item hash fails from now on.
    pub async fn fail_item(&self, item_hash: u32) {
        self.state.lock().await.failing_hashes.insert(item_hash);
    }

    pub async fn transfer_calls(&self) -> Vec<TransferRequest> {
        self.state.lock().await.transfers.clone()
    }

    pub async fn equip_calls(&self) -> Vec<Vec<i64>> {
        self.state.lock().await.equips.clone()
    }

    pub async fn quantity_held(&self, owner: Option<&CharacterId>, item_hash: u32) -> u32 {
        let state = self.state.lock().await;
        state
            .items
            .iter()
            .filter(|item| item.item_hash == item_hash && item.owner.as_ref() == owner)
            .map(|item| item.quantity)
            .sum()
    }

    pub async fn is_equipped_on(&self, instance_id: i64, character_id: &CharacterId) -> bool {
        let state = self.state.lock().await;
        state
            .items
            .iter()
            .any(|item| item.numeric_instance_id() == Some(instance_id) && item.is_equipped_on(character_id))
    }

    /// Largest item count seen in any character bucket right now.
    pub async fn max_bucket_occupancy(&self) -> usize {
        let state = self.state.lock().await;
        let mut counts: BTreeMap<(CharacterId, u32), usize> = BTreeMap::new();
        for item in &state.items {
            let Some(owner) = item.owner.as_ref() else {
                continue;
            };
            if self.catalog.bucket_for_hash(item.bucket_hash).is_some() {
                *counts.entry((owner.clone(), item.bucket_hash)).or_default() += 1;
            }
        }
        counts.values().copied().max().unwrap_or(0)
    }

    fn occupancy(items: &[Item], owner: &CharacterId, bucket_hash: u32) -> usize {
        items.iter().filter(|item| item.is_owned_by(owner) && item.bucket_hash == bucket_hash).count()
    }

    fn locate(items: &[Item], request: &TransferRequest, owner: Option<&CharacterId>) -> Option<usize> {
        items.iter().position(|item| {
            item.item_hash == request.item_hash
                && item.instance_id == request.item_id
                && item.owner.as_ref() == owner
                && item.quantity >= request.stack_size
        })
    }

    fn place(items: &mut Vec<Item>, index: usize, quantity: u32, owner: Option<CharacterId>) {
        let mut moved = if items[index].quantity > quantity {
            items[index].quantity -= quantity;
            let mut split = items[index].clone();
            split.quantity = quantity;
            split
        } else {
            items.remove(index)
        };
        moved.owner = owner;
        moved.is_equipped = false;

        if moved.instance_id.is_none() {
            if let Some(existing) = items
                .iter_mut()
                .find(|item| item.instance_id.is_none() && item.item_hash == moved.item_hash && item.owner == moved.owner)
            {
                existing.quantity += moved.quantity;
                return;
            }
        }
        items.push(moved);
    }
}

#[async_trait]
impl GameApi for SimulatedGameApi {
    async fn current_account(&self) -> Result<Account, RemoteError> {
        Ok(Account { account_id: "simulated-account".to_string(), membership: self.membership.clone() })
    }

    async fn load_profile(&self, _membership: &Membership) -> Result<ProfileSnapshot, RemoteError> {
        Err(RemoteError::Transport("profile loading is not simulated".to_string()))
    }

    async fn load_progressions(&self, _membership: &Membership) -> Result<ProgressionSnapshot, RemoteError> {
        Err(RemoteError::Transport("progressions are not simulated".to_string()))
    }

    async fn transfer_item(&self, request: &TransferRequest) -> Result<(), RemoteError> {
        let mut state = self.state.lock().await;
        state.transfers.push(request.clone());
        if state.failing_hashes.contains(&request.item_hash) {
            return Err(rejected("DestinyItemNotFound"));
        }

        if request.transfer_to_vault {
            let index = Self::locate(&state.items, request, Some(&request.character_id))
                .ok_or_else(|| rejected("DestinyItemNotFound"))?;
            if state.items[index].is_equipped {
                return Err(rejected("DestinyItemIsEquipped"));
            }
            Self::place(&mut state.items, index, request.stack_size, None);
            return Ok(());
        }

        let index = Self::locate(&state.items, request, None).ok_or_else(|| rejected("DestinyItemNotFound"))?;
        let bucket_hash = state.items[index].bucket_hash;
        if self.catalog.bucket_for_hash(bucket_hash).is_some()
            && Self::occupancy(&state.items, &request.character_id, bucket_hash) >= MAX_ITEMS_PER_BUCKET
        {
            return Err(rejected("DestinyNoRoomInDestination"));
        }
        Self::place(&mut state.items, index, request.stack_size, Some(request.character_id.clone()));
        Ok(())
    }

    async fn equip_item(&self, request: &EquipRequest) -> Result<(), RemoteError> {
        let id = request.item_id.parse::<i64>().map_err(|_| rejected("DestinyItemNotFound"))?;
        self.equip_items(&EquipItemsRequest {
            item_ids: vec![id],
            character_id: request.character_id.clone(),
            membership_type: request.membership_type,
        })
        .await
    }

    async fn equip_items(&self, request: &EquipItemsRequest) -> Result<(), RemoteError> {
        let mut state = self.state.lock().await;
        state.equips.push(request.item_ids.clone());

        for id in &request.item_ids {
            let index = state
                .items
                .iter()
                .position(|item| item.numeric_instance_id() == Some(*id) && item.is_owned_by(&request.character_id))
                .ok_or_else(|| rejected("DestinyItemNotFound"))?;
            if state.failing_hashes.contains(&state.items[index].item_hash) {
                return Err(rejected("DestinyItemActionForbidden"));
            }
            let bucket_hash = state.items[index].bucket_hash;
            for item in state.items.iter_mut() {
                if item.is_owned_by(&request.character_id) && item.bucket_hash == bucket_hash {
                    item.is_equipped = false;
                }
            }
            state.items[index].is_equipped = true;
        }
        Ok(())
    }
}
