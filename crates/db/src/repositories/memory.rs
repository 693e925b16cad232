use std::collections::{BTreeMap, HashMap};

use tokio::sync::RwLock;

use warmind_core::domain::loadout::PersistedLoadout;

use super::{LoadoutRepository, RepositoryError, UnknownValueKind, UnknownValueRepository};

#[derive(Default)]
pub struct InMemoryLoadoutRepository {
    loadouts: RwLock<HashMap<String, BTreeMap<String, PersistedLoadout>>>,
}

#[async_trait::async_trait]
impl LoadoutRepository for InMemoryLoadoutRepository {
    async fn select_loadout(
        &self,
        membership_id: &str,
        name: &str,
    ) -> Result<Option<PersistedLoadout>, RepositoryError> {
        let loadouts = self.loadouts.read().await;
        Ok(loadouts.get(membership_id).and_then(|named| named.get(name)).cloned())
    }

    async fn save_loadout(
        &self,
        membership_id: &str,
        name: &str,
        loadout: &PersistedLoadout,
    ) -> Result<(), RepositoryError> {
        let mut loadouts = self.loadouts.write().await;
        let named = loadouts.entry(membership_id.to_string()).or_default();
        if named.contains_key(name) {
            return Err(RepositoryError::Decode(format!("loadout `{name}` already exists")));
        }
        named.insert(name.to_string(), loadout.clone());
        Ok(())
    }

    async fn update_loadout(
        &self,
        membership_id: &str,
        name: &str,
        loadout: &PersistedLoadout,
    ) -> Result<bool, RepositoryError> {
        let mut loadouts = self.loadouts.write().await;
        match loadouts.get_mut(membership_id).and_then(|named| named.get_mut(name)) {
            Some(existing) => {
                *existing = loadout.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_loadout_names(&self, membership_id: &str) -> Result<Vec<String>, RepositoryError> {
        let loadouts = self.loadouts.read().await;
        Ok(loadouts.get(membership_id).map(|named| named.keys().cloned().collect()).unwrap_or_default())
    }
}

#[derive(Default)]
pub struct InMemoryUnknownValueRepository {
    values: RwLock<Vec<(UnknownValueKind, String)>>,
}

impl InMemoryUnknownValueRepository {
    pub async fn recorded(&self) -> Vec<(UnknownValueKind, String)> {
        self.values.read().await.clone()
    }
}

#[async_trait::async_trait]
impl UnknownValueRepository for InMemoryUnknownValueRepository {
    async fn record(&self, kind: UnknownValueKind, value: &str) -> Result<(), RepositoryError> {
        self.values.write().await.push((kind, value.to_string()));
        Ok(())
    }
}
