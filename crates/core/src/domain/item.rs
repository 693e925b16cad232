use serde::{Deserialize, Serialize};

use crate::domain::character::CharacterId;
use crate::taxonomy::{ClassType, TierType, TransferStatus};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub item_hash: u32,
    /// Absent for stackable, non-instanced items such as currencies.
    pub instance_id: Option<String>,
    pub bucket_hash: u32,
    pub quantity: u32,
    /// Zero for non-instanced items.
    pub power: u32,
    pub tier: TierType,
    pub class_type: ClassType,
    pub required_level: u32,
    pub can_equip: bool,
    pub is_equipped: bool,
    pub is_engram: bool,
    pub transfer_status: TransferStatus,
    /// `None` means the item lives in the vault.
    pub owner: Option<CharacterId>,
}

impl Item {
    pub fn is_in_vault(&self) -> bool {
        self.owner.is_none()
    }

    pub fn is_owned_by(&self, character_id: &CharacterId) -> bool {
        self.owner.as_ref() == Some(character_id)
    }

    pub fn is_equipped_on(&self, character_id: &CharacterId) -> bool {
        self.is_equipped && self.is_owned_by(character_id)
    }

    pub fn is_exotic(&self) -> bool {
        self.tier == TierType::Exotic
    }

    /// Instance id as the numeric form the multi-equip call requires.
    pub fn numeric_instance_id(&self) -> Option<i64> {
        self.instance_id.as_deref().and_then(|id| id.parse::<i64>().ok())
    }

    pub fn same_instance(&self, other: &Item) -> bool {
        self.item_hash == other.item_hash && self.instance_id == other.instance_id
    }
}
