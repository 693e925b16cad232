//! In-process game API double and a small scripted profile for service and
//! route tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Mutex;
use warmind_core::catalog::{Catalog, CatalogConfig, ItemDefinition};
use warmind_core::domain::character::Character;
use warmind_core::domain::profile::{CharacterSnapshot, InstanceData, RawItem};
use warmind_core::domain::progression::{Progression, ProgressionSnapshot};
use warmind_core::gateway::{EquipItemsRequest, EquipRequest, TransferRequest};
use warmind_core::{
    Account, CharacterId, ClassType, GameApi, Membership, ProfileSnapshot, RankTrack, RemoteError, TierType,
};

use crate::inventory::SessionFactory;

pub const WARLOCK: &str = "2305843009260000001";
pub const HUNTER: &str = "2305843009260000002";
pub const TITAN: &str = "2305843009260000003";

pub const SPINMETAL: u32 = 1_000;
pub const ENGRAM: u32 = 2_000;
pub const KINETIC_EQUIPPED: u32 = 3_001;
pub const KINETIC_BEST: u32 = 3_002;
pub const ENERGY: u32 = 3_003;
pub const POWER: u32 = 3_004;
pub const HELMET_LEGENDARY: u32 = 3_005;
pub const HELMET_EXOTIC: u32 = 3_006;
pub const GAUNTLETS: u32 = 3_007;
pub const CHEST: u32 = 3_008;
pub const LEGS: u32 = 3_009;
pub const CLASS_ITEM: u32 = 3_010;
pub const GHOST: u32 = 3_011;
pub const KINETIC_SPARE: u32 = 3_012;
pub const HUNTER_KINETIC: u32 = 3_013;

const KINETIC: u32 = 1_498_876_634;
const ENERGY_BUCKET: u32 = 2_465_295_065;
const POWER_BUCKET: u32 = 953_998_645;
const GHOST_BUCKET: u32 = 4_023_194_814;
const HELMET: u32 = 3_448_274_439;
const GAUNTLETS_BUCKET: u32 = 3_551_918_588;
const CHEST_BUCKET: u32 = 14_239_492;
const LEGS_BUCKET: u32 = 20_886_954;
const CLASS_ARMOR: u32 = 1_585_787_867;
const CONSUMABLES: u32 = 1_469_714_392;

fn definition(item_hash: u32, name: &str, tier: TierType, class_type: ClassType, bucket_hash: u32) -> ItemDefinition {
    ItemDefinition { item_hash, name: name.to_string(), tier, class_type, bucket_hash }
}

pub fn catalog() -> Catalog {
    use ClassType::Unknown;
    use TierType::{Common, Exotic, Legendary};

    Catalog::new(
        CatalogConfig::default()
            .with_definitions(vec![
                definition(SPINMETAL, "Spinmetal", Common, Unknown, CONSUMABLES),
                definition(ENGRAM, "Legendary Engram", Legendary, Unknown, CONSUMABLES),
                definition(KINETIC_EQUIPPED, "Service Revolver", Legendary, Unknown, KINETIC),
                definition(KINETIC_BEST, "Ace of Spades Replica", Legendary, Unknown, KINETIC),
                definition(ENERGY, "Sunshot Replica", Legendary, Unknown, ENERGY_BUCKET),
                definition(POWER, "Hammerhead", Legendary, Unknown, POWER_BUCKET),
                definition(HELMET_LEGENDARY, "Simple Hood", Legendary, ClassType::Warlock, HELMET),
                definition(HELMET_EXOTIC, "Nezarec's Sin", Exotic, ClassType::Warlock, HELMET),
                definition(GAUNTLETS, "Simple Gloves", Legendary, ClassType::Warlock, GAUNTLETS_BUCKET),
                definition(CHEST, "Simple Robes", Legendary, ClassType::Warlock, CHEST_BUCKET),
                definition(LEGS, "Simple Boots", Legendary, ClassType::Warlock, LEGS_BUCKET),
                definition(CLASS_ITEM, "Simple Bond", Legendary, ClassType::Warlock, CLASS_ARMOR),
                definition(GHOST, "Generalist Shell", Legendary, Unknown, GHOST_BUCKET),
                definition(KINETIC_SPARE, "Spare Rations", Legendary, Unknown, KINETIC),
                definition(HUNTER_KINETIC, "Hunter Only", Legendary, ClassType::Hunter, KINETIC),
            ])
            .with_engrams_from_names(),
    )
}

fn account() -> Account {
    Account {
        account_id: "bnet-1".to_string(),
        membership: Membership {
            membership_id: "4611686018400000001".to_string(),
            membership_type: 3,
            display_name: "guardian".to_string(),
        },
    }
}

fn character(id: &str, class_type: ClassType, played_hour: u32) -> Character {
    Character {
        id: CharacterId::from(id),
        membership_id: account().membership.membership_id,
        membership_type: 3,
        class_type,
        level: 50,
        light: 500,
        last_played: Utc.with_ymd_and_hms(2026, 10, 1, played_hour, 0, 0).single().unwrap_or_default(),
    }
}

fn stack(item_hash: u32, quantity: u32) -> RawItem {
    RawItem { item_hash, instance_id: None, bucket_hash: CONSUMABLES, quantity, transfer_status: 0 }
}

fn rank(
    track: RankTrack,
    level: u32,
    level_cap: u32,
    progress_to_next_level: u32,
    next_level_at: u32,
) -> (u32, Progression) {
    let progression = Progression {
        progression_hash: track.progression_hash(),
        current_progress: 0,
        level,
        level_cap,
        step_index: level,
        progress_to_next_level,
        next_level_at,
    };
    (track.progression_hash(), progression)
}

/// Scripted remote state: one profile snapshot, the character progressions,
/// and whether the token is linked.
#[derive(Clone)]
pub struct ProfileScript {
    linked: bool,
    snapshot: ProfileSnapshot,
    progressions: ProgressionSnapshot,
}

impl ProfileScript {
    /// Warlock (played last) with a full set of gear, a hunter and a titan.
    /// Spinmetal and engrams are spread over characters and the vault.
    pub fn standard() -> Self {
        let mut instances = HashMap::new();
        let mut next_instance = 6_917_529_000_000_000u64;
        let mut gear = |item_hash: u32, bucket_hash: u32, power: u32, equipped: bool| -> RawItem {
            next_instance += 1;
            let instance_id = next_instance.to_string();
            instances.insert(
                instance_id.clone(),
                InstanceData { power, required_level: 1, can_equip: true, is_equipped: equipped },
            );
            RawItem { item_hash, instance_id: Some(instance_id), bucket_hash, quantity: 1, transfer_status: 0 }
        };

        let warlock_equipment = vec![
            gear(KINETIC_EQUIPPED, KINETIC, 500, true),
            gear(ENERGY, ENERGY_BUCKET, 500, true),
            gear(POWER, POWER_BUCKET, 500, true),
            gear(HELMET_LEGENDARY, HELMET, 500, true),
            gear(GAUNTLETS, GAUNTLETS_BUCKET, 500, true),
            gear(CHEST, CHEST_BUCKET, 500, true),
            gear(LEGS, LEGS_BUCKET, 500, true),
            gear(CLASS_ITEM, CLASS_ARMOR, 500, true),
            gear(GHOST, GHOST_BUCKET, 0, true),
        ];
        let warlock_inventory = vec![
            gear(KINETIC_SPARE, KINETIC, 480, false),
            gear(HELMET_EXOTIC, HELMET, 530, false),
            stack(SPINMETAL, 150),
            stack(ENGRAM, 2),
        ];
        let hunter_equipment = vec![gear(HUNTER_KINETIC, KINETIC, 1_000, true)];
        let vault_best = gear(KINETIC_BEST, KINETIC, 520, false);

        let snapshot = ProfileSnapshot {
            membership: account().membership,
            characters: vec![
                CharacterSnapshot {
                    character: character(HUNTER, ClassType::Hunter, 2),
                    equipment: hunter_equipment,
                    inventory: vec![stack(ENGRAM, 1)],
                },
                CharacterSnapshot {
                    character: character(WARLOCK, ClassType::Warlock, 3),
                    equipment: warlock_equipment,
                    inventory: warlock_inventory,
                },
                CharacterSnapshot {
                    character: character(TITAN, ClassType::Titan, 1),
                    equipment: Vec::new(),
                    inventory: Vec::new(),
                },
            ],
            profile_inventory: vec![vault_best, stack(SPINMETAL, 100), stack(ENGRAM, 4)],
            currencies: Vec::new(),
            instances,
        };

        // Glory mid-climb, valor one step under the cap, infamy capped.
        let progressions = BTreeMap::from([(
            CharacterId::from(WARLOCK),
            HashMap::from([
                rank(RankTrack::Glory, 2, 5, 30, 100),
                rank(RankTrack::Valor, 4, 5, 0, 2_000),
                rank(RankTrack::Infamy, 16, 16, 0, 0),
            ]),
        )]);

        Self { linked: true, snapshot, progressions }
    }

    pub fn without_titan() -> Self {
        let mut script = Self::standard();
        script.snapshot.characters.retain(|entry| entry.character.class_type != ClassType::Titan);
        script
    }

    pub fn no_characters() -> Self {
        let mut script = Self::standard();
        script.snapshot.characters.clear();
        script
    }

    pub fn unlinked() -> Self {
        Self { linked: false, ..Self::standard() }
    }

    pub fn without_progressions() -> Self {
        Self { progressions: ProgressionSnapshot::new(), ..Self::standard() }
    }

    pub fn without_engrams(mut self) -> Self {
        for entry in &mut self.snapshot.characters {
            entry.inventory.retain(|raw| raw.item_hash != ENGRAM);
        }
        self.snapshot.profile_inventory.retain(|raw| raw.item_hash != ENGRAM);
        self
    }
}

#[derive(Default)]
struct Recorded {
    calls: Vec<&'static str>,
    transfers: Vec<TransferRequest>,
    equips: Vec<EquipItemsRequest>,
}

/// Answers from a fixed snapshot and accepts every move and equip.
pub struct FakeGameApi {
    script: ProfileScript,
    recorded: Mutex<Recorded>,
}

impl FakeGameApi {
    pub fn new(script: ProfileScript) -> Self {
        Self { script, recorded: Mutex::new(Recorded::default()) }
    }

    pub async fn calls(&self) -> Vec<&'static str> {
        self.recorded.lock().await.calls.clone()
    }

    pub async fn transfers(&self) -> Vec<TransferRequest> {
        self.recorded.lock().await.transfers.clone()
    }

    pub async fn equips(&self) -> Vec<EquipItemsRequest> {
        self.recorded.lock().await.equips.clone()
    }
}

#[async_trait]
impl GameApi for FakeGameApi {
    async fn current_account(&self) -> Result<Account, RemoteError> {
        self.recorded.lock().await.calls.push("current_account");
        if self.script.linked {
            Ok(account())
        } else {
            Err(RemoteError::NoLinkedAccount)
        }
    }

    async fn load_profile(&self, _membership: &Membership) -> Result<ProfileSnapshot, RemoteError> {
        self.recorded.lock().await.calls.push("load_profile");
        Ok(self.script.snapshot.clone())
    }

    async fn load_progressions(&self, _membership: &Membership) -> Result<ProgressionSnapshot, RemoteError> {
        self.recorded.lock().await.calls.push("load_progressions");
        Ok(self.script.progressions.clone())
    }

    async fn transfer_item(&self, request: &TransferRequest) -> Result<(), RemoteError> {
        let mut recorded = self.recorded.lock().await;
        recorded.calls.push("transfer_item");
        recorded.transfers.push(request.clone());
        Ok(())
    }

    async fn equip_item(&self, _request: &EquipRequest) -> Result<(), RemoteError> {
        self.recorded.lock().await.calls.push("equip_item");
        Ok(())
    }

    async fn equip_items(&self, request: &EquipItemsRequest) -> Result<(), RemoteError> {
        let mut recorded = self.recorded.lock().await;
        recorded.calls.push("equip_items");
        recorded.equips.push(request.clone());
        Ok(())
    }
}

/// Hands every token the same fake.
pub struct FakeSessions(pub Arc<FakeGameApi>);

impl SessionFactory for FakeSessions {
    fn open(&self, _access_token: &str) -> Arc<dyn GameApi> {
        self.0.clone()
    }
}
