//! Wire envelopes and payloads returned by the game API.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use warmind_core::catalog::Catalog;
use warmind_core::domain::character::{Character, CharacterId};
use warmind_core::domain::profile::{
    CharacterSnapshot, InstanceData, Membership, ProfileSnapshot, RawItem,
};
use warmind_core::domain::progression::{Progression, ProgressionSnapshot};
use warmind_core::taxonomy::ClassType;

pub const SUCCESS_CODE: i64 = 1;
pub const THROTTLE_CODE: i64 = 36;
pub const THROTTLE_STATUS: &str = "ThrottleLimitExceededMomentarily";

/// Error fields every response carries, whatever its payload.
pub trait StatusResponse {
    fn error_code(&self) -> i64;
    fn error_status(&self) -> &str;

    fn is_success(&self) -> bool {
        self.error_code() == SUCCESS_CODE
    }

    fn is_throttled(&self) -> bool {
        self.error_code() == THROTTLE_CODE || self.error_status() == THROTTLE_STATUS
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BaseResponse<T> {
    #[serde(rename = "Response")]
    pub response: Option<T>,
    #[serde(rename = "ErrorCode")]
    pub error_code: i64,
    #[serde(rename = "ThrottleSeconds")]
    pub throttle_seconds: i64,
    #[serde(rename = "ErrorStatus")]
    pub error_status: String,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "MessageData")]
    pub message_data: Value,
}

impl<T> Default for BaseResponse<T> {
    fn default() -> Self {
        Self {
            response: None,
            error_code: 0,
            throttle_seconds: 0,
            error_status: String::new(),
            message: String::new(),
            message_data: Value::Null,
        }
    }
}

impl<T> StatusResponse for BaseResponse<T> {
    fn error_code(&self) -> i64 {
        self.error_code
    }

    fn error_status(&self) -> &str {
        &self.error_status
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MembershipsPayload {
    pub destiny_memberships: Vec<WireMembership>,
    pub bungie_net_user: Option<BungieNetUser>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkedProfilesPayload {
    pub profiles: Vec<LinkedProfile>,
    pub bnet_membership: Option<BungieNetUser>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BungieNetUser {
    pub membership_id: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireMembership {
    pub display_name: String,
    pub membership_type: i32,
    pub membership_id: String,
}

impl From<WireMembership> for Membership {
    fn from(wire: WireMembership) -> Self {
        Self {
            membership_id: wire.membership_id,
            membership_type: wire.membership_type,
            display_name: wire.display_name,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedProfile {
    #[serde(default)]
    pub display_name: String,
    pub membership_type: i32,
    pub membership_id: String,
    pub date_last_played: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfilePayload {
    pub profile: Option<DataWrapper<ProfileData>>,
    pub profile_inventory: Option<DataWrapper<ItemList>>,
    pub profile_currencies: Option<DataWrapper<ItemList>>,
    pub characters: Option<DataWrapper<HashMap<String, WireCharacter>>>,
    pub character_inventories: Option<DataWrapper<HashMap<String, ItemList>>>,
    pub character_equipment: Option<DataWrapper<HashMap<String, ItemList>>>,
    pub item_components: Option<ItemComponents>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DataWrapper<T> {
    pub data: Option<T>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileData {
    pub user_info: Option<WireMembership>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ItemList {
    pub items: Vec<WireItem>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireItem {
    pub item_hash: u32,
    pub item_instance_id: Option<String>,
    pub bucket_hash: u32,
    pub transfer_status: i64,
    pub quantity: u32,
}

impl From<&WireItem> for RawItem {
    fn from(wire: &WireItem) -> Self {
        Self {
            item_hash: wire.item_hash,
            instance_id: wire.item_instance_id.clone().filter(|id| !id.is_empty()),
            bucket_hash: wire.bucket_hash,
            quantity: wire.quantity,
            transfer_status: wire.transfer_status,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireCharacter {
    pub character_id: String,
    pub membership_id: String,
    pub membership_type: i32,
    pub date_last_played: Option<DateTime<Utc>>,
    pub class_hash: u32,
    pub class_type: i64,
    pub light: u32,
    pub level_progression: Option<LevelProgression>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LevelProgression {
    pub level: u32,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ItemComponents {
    pub instances: Option<DataWrapper<HashMap<String, WireInstance>>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireInstance {
    pub is_equipped: bool,
    pub can_equip: bool,
    pub equip_required_level: u32,
    pub primary_stat: Option<PrimaryStat>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PrimaryStat {
    pub value: u32,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressionsPayload {
    pub character_progressions: Option<DataWrapper<HashMap<String, CharacterProgressions>>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CharacterProgressions {
    /// Keyed by the progression hash as a decimal string.
    pub progressions: HashMap<String, WireProgression>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireProgression {
    pub progression_hash: u32,
    pub current_progress: u32,
    pub level: u32,
    pub level_cap: u32,
    pub step_index: u32,
    pub progress_to_next_level: u32,
    pub next_level_at: u32,
}

impl From<WireProgression> for Progression {
    fn from(wire: WireProgression) -> Self {
        Self {
            progression_hash: wire.progression_hash,
            current_progress: wire.current_progress,
            level: wire.level,
            level_cap: wire.level_cap,
            step_index: wire.step_index,
            progress_to_next_level: wire.progress_to_next_level,
            next_level_at: wire.next_level_at,
        }
    }
}

impl ProgressionsPayload {
    /// Entries whose key is not a numeric hash are dropped.
    pub fn into_snapshot(self) -> ProgressionSnapshot {
        self.character_progressions
            .and_then(|wrapper| wrapper.data)
            .unwrap_or_default()
            .into_iter()
            .map(|(character_id, character)| {
                let progressions = character
                    .progressions
                    .into_iter()
                    .filter_map(|(hash, wire)| Some((hash.parse::<u32>().ok()?, Progression::from(wire))))
                    .collect();
                (CharacterId(character_id), progressions)
            })
            .collect()
    }
}

fn items(list: Option<&ItemList>) -> Vec<RawItem> {
    list.map(|list| list.items.iter().map(RawItem::from).collect()).unwrap_or_default()
}

impl ProfilePayload {
    /// Flattens the component maps into a snapshot. The character's class is
    /// resolved from its class hash, falling back to the numeric class type.
    pub fn into_snapshot(self, requested: &Membership, catalog: &Catalog) -> ProfileSnapshot {
        let membership = self
            .profile
            .and_then(|profile| profile.data)
            .and_then(|data| data.user_info)
            .map(Membership::from)
            .unwrap_or_else(|| requested.clone());

        let mut equipment = self.character_equipment.and_then(|wrapper| wrapper.data).unwrap_or_default();
        let mut inventories = self.character_inventories.and_then(|wrapper| wrapper.data).unwrap_or_default();

        let characters = self
            .characters
            .and_then(|wrapper| wrapper.data)
            .unwrap_or_default()
            .into_iter()
            .map(|(id, wire)| {
                let class_type = match catalog.class_for_hash(wire.class_hash) {
                    ClassType::Unknown => ClassType::from_code(wire.class_type),
                    known => known,
                };
                let character = Character {
                    id: CharacterId(if wire.character_id.is_empty() { id.clone() } else { wire.character_id }),
                    membership_id: wire.membership_id,
                    membership_type: wire.membership_type,
                    class_type,
                    level: wire.level_progression.map(|progression| progression.level).unwrap_or(0),
                    light: wire.light,
                    last_played: wire.date_last_played.unwrap_or_default(),
                };
                CharacterSnapshot {
                    character,
                    equipment: items(equipment.remove(&id).as_ref()),
                    inventory: items(inventories.remove(&id).as_ref()),
                }
            })
            .collect();

        let instances = self
            .item_components
            .and_then(|components| components.instances)
            .and_then(|wrapper| wrapper.data)
            .unwrap_or_default()
            .into_iter()
            .map(|(id, wire)| {
                (
                    id,
                    InstanceData {
                        power: wire.primary_stat.map(|stat| stat.value).unwrap_or(0),
                        required_level: wire.equip_required_level,
                        can_equip: wire.can_equip,
                        is_equipped: wire.is_equipped,
                    },
                )
            })
            .collect();

        ProfileSnapshot {
            membership,
            characters,
            profile_inventory: items(self.profile_inventory.and_then(|wrapper| wrapper.data).as_ref()),
            currencies: items(self.profile_currencies.and_then(|wrapper| wrapper.data).as_ref()),
            instances,
        }
    }
}
