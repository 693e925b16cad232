//! Closed enumerations for equipment slots, rarity and character class.
//!
//! Hash values are owned by [`crate::catalog::Catalog`]; this module only
//! carries the enum shapes and the wire-level integer codes.

use serde::{Deserialize, Serialize};

/// Maximum number of items a character can hold in one equipment bucket,
/// counting the equipped item.
pub const MAX_ITEMS_PER_BUCKET: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EquipmentBucket {
    Kinetic,
    Energy,
    Power,
    Ghost,
    Helmet,
    Gauntlets,
    Chest,
    Legs,
    ClassArmor,
    Artifact,
    Subclass,
}

impl EquipmentBucket {
    pub const ALL: [EquipmentBucket; 11] = [
        Self::Kinetic,
        Self::Energy,
        Self::Power,
        Self::Ghost,
        Self::Helmet,
        Self::Gauntlets,
        Self::Chest,
        Self::Legs,
        Self::ClassArmor,
        Self::Artifact,
        Self::Subclass,
    ];

    pub const WEAPONS: [EquipmentBucket; 3] = [Self::Kinetic, Self::Energy, Self::Power];

    /// Armor slots that compete for the single exotic armor override.
    /// Class armor is handled on its own.
    pub const ARMOR: [EquipmentBucket; 4] =
        [Self::Helmet, Self::Gauntlets, Self::Chest, Self::Legs];

    /// Slots averaged into a loadout's power level.
    pub const POWER_CONTRIBUTING: [EquipmentBucket; 8] = [
        Self::Kinetic,
        Self::Energy,
        Self::Power,
        Self::Helmet,
        Self::Gauntlets,
        Self::Chest,
        Self::Legs,
        Self::ClassArmor,
    ];

    pub fn contributes_to_power(self) -> bool {
        Self::POWER_CONTRIBUTING.contains(&self)
    }

    pub fn is_weapon(self) -> bool {
        Self::WEAPONS.contains(&self)
    }

    pub fn is_armor(self) -> bool {
        Self::ARMOR.contains(&self) || self == Self::ClassArmor
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kinetic => "kinetic",
            Self::Energy => "energy",
            Self::Power => "power",
            Self::Ghost => "ghost",
            Self::Helmet => "helmet",
            Self::Gauntlets => "gauntlets",
            Self::Chest => "chest",
            Self::Legs => "legs",
            Self::ClassArmor => "class_armor",
            Self::Artifact => "artifact",
            Self::Subclass => "subclass",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierType {
    #[default]
    Unknown,
    Currency,
    Common,
    Uncommon,
    Rare,
    Legendary,
    Exotic,
}

impl TierType {
    /// Maps the remote API's numeric tier code.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Currency,
            2 => Self::Common,
            3 => Self::Uncommon,
            4 => Self::Rare,
            5 => Self::Legendary,
            6 => Self::Exotic,
            _ => Self::Unknown,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::Currency => 1,
            Self::Common => 2,
            Self::Uncommon => 3,
            Self::Rare => 4,
            Self::Legendary => 5,
            Self::Exotic => 6,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassType {
    Titan,
    Hunter,
    Warlock,
    #[default]
    Unknown,
}

impl ClassType {
    pub const PLAYABLE: [ClassType; 3] = [Self::Titan, Self::Hunter, Self::Warlock];

    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Titan,
            1 => Self::Hunter,
            2 => Self::Warlock,
            _ => Self::Unknown,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Titan => 0,
            Self::Hunter => 1,
            Self::Warlock => 2,
            Self::Unknown => 3,
        }
    }

    /// Parses a spoken or typed class name. Unrecognised names yield `None`
    /// rather than `Unknown`, which is reserved for unrestricted items.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "titan" => Some(Self::Titan),
            "hunter" => Some(Self::Hunter),
            "warlock" => Some(Self::Warlock),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Titan => "titan",
            Self::Hunter => "hunter",
            Self::Warlock => "warlock",
            Self::Unknown => "unknown",
        }
    }

    /// An item with an unknown class restriction can be used by anyone.
    pub fn accepts(self, character_class: ClassType) -> bool {
        self == Self::Unknown || self == character_class
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    #[default]
    CanTransfer,
    ItemIsEquipped,
    NotTransferrable,
    NoRoomInDestination,
}

impl TransferStatus {
    /// The remote value is a bit flag; equipped takes precedence.
    pub fn from_flags(flags: i64) -> Self {
        if flags & 1 != 0 {
            Self::ItemIsEquipped
        } else if flags & 2 != 0 {
            Self::NotTransferrable
        } else if flags & 4 != 0 {
            Self::NoRoomInDestination
        } else {
            Self::CanTransfer
        }
    }
}
