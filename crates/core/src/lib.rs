pub mod allocation;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod filters;
pub mod gateway;
pub mod orchestrator;
pub mod persistence;
pub mod taxonomy;

#[cfg(test)]
pub(crate) mod fixtures;

pub use allocation::AllocationEngine;
pub use catalog::{Catalog, CatalogConfig, ItemDefinition};
pub use domain::character::{Character, CharacterId};
pub use domain::item::Item;
pub use domain::loadout::{Loadout, PersistedItem, PersistedLoadout};
pub use domain::profile::{Account, Membership, Profile, ProfileSnapshot};
pub use domain::progression::{ProgressionSnapshot, RankTrack, Ranking};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use gateway::{GameApi, RemoteError};
pub use orchestrator::{EquipReport, Orchestrator, TransferReport};
pub use taxonomy::{ClassType, EquipmentBucket, TierType, TransferStatus, MAX_ITEMS_PER_BUCKET};
