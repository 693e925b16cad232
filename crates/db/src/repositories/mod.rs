use async_trait::async_trait;
use thiserror::Error;

use warmind_core::catalog::ItemDefinition;
use warmind_core::domain::loadout::PersistedLoadout;

pub mod loadout;
pub mod manifest;
pub mod memory;
pub mod unknown;

pub use loadout::SqlLoadoutRepository;
pub use manifest::SqlManifestRepository;
pub use memory::{InMemoryLoadoutRepository, InMemoryUnknownValueRepository};
pub use unknown::SqlUnknownValueRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Named loadouts, scoped to one game membership.
#[async_trait]
pub trait LoadoutRepository: Send + Sync {
    async fn select_loadout(
        &self,
        membership_id: &str,
        name: &str,
    ) -> Result<Option<PersistedLoadout>, RepositoryError>;

    /// Inserts a new named loadout. Fails if the name is already taken.
    async fn save_loadout(
        &self,
        membership_id: &str,
        name: &str,
        loadout: &PersistedLoadout,
    ) -> Result<(), RepositoryError>;

    /// Replaces an existing loadout. Returns `false` when no loadout has that name.
    async fn update_loadout(
        &self,
        membership_id: &str,
        name: &str,
        loadout: &PersistedLoadout,
    ) -> Result<bool, RepositoryError>;

    async fn list_loadout_names(&self, membership_id: &str) -> Result<Vec<String>, RepositoryError>;
}

#[async_trait]
pub trait ManifestRepository: Send + Sync {
    async fn load_definitions(&self) -> Result<Vec<ItemDefinition>, RepositoryError>;

    /// Inserts or replaces definitions by item hash. Returns how many were written.
    async fn upsert_definitions(&self, definitions: &[ItemDefinition]) -> Result<usize, RepositoryError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnknownValueKind {
    ItemName,
    ClassName,
    LoadoutName,
}

impl UnknownValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ItemName => "item_name",
            Self::ClassName => "class_name",
            Self::LoadoutName => "loadout_name",
        }
    }
}

/// Log of names users asked for that could not be resolved.
#[async_trait]
pub trait UnknownValueRepository: Send + Sync {
    async fn record(&self, kind: UnknownValueKind, value: &str) -> Result<(), RepositoryError>;
}
