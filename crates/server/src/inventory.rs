//! User-facing inventory operations.
//!
//! Every operation resolves the caller's account from an access token, builds a
//! fresh [`Profile`], and either answers from it or drives the [`Orchestrator`].
//! Lookups that fail on user input (unknown item or class names, missing
//! characters, missing loadouts) are successful results with `found = false`.

use std::sync::Arc;

use secrecy::SecretString;
use serde::Serialize;
use tracing::{info, warn};
use warmind_core::allocation::AllocationEngine;
use warmind_core::domain::character::Character;
use warmind_core::domain::progression::find_ranking;
use warmind_core::filters::{retain_matching, ItemFilter};
use warmind_core::orchestrator::ItemTransferResult;
use warmind_core::persistence::{from_persisted, to_persisted, RestoredLoadout};
use warmind_core::{
    Account, ApplicationError, Catalog, CharacterId, ClassType, DomainError, EquipReport, GameApi,
    Item, Loadout, Orchestrator, Profile, ProgressionSnapshot, RankTrack, Ranking, RemoteError,
    TransferReport,
};
use warmind_db::repositories::{LoadoutRepository, RepositoryError, UnknownValueKind, UnknownValueRepository};
use warmind_remote::{ClientPool, Credentials, RemoteSession};

/// Opens a `GameApi` bound to one user's access token.
pub trait SessionFactory: Send + Sync {
    fn open(&self, access_token: &str) -> Arc<dyn GameApi>;
}

pub struct RemoteSessions {
    pool: Arc<ClientPool>,
    catalog: Arc<Catalog>,
    api_key: SecretString,
}

impl RemoteSessions {
    pub fn new(pool: Arc<ClientPool>, catalog: Arc<Catalog>, api_key: SecretString) -> Self {
        Self { pool, catalog, api_key }
    }
}

impl SessionFactory for RemoteSessions {
    fn open(&self, access_token: &str) -> Arc<dyn GameApi> {
        let credentials = Credentials {
            api_key: self.api_key.clone(),
            access_token: SecretString::from(access_token.to_string()),
        };
        Arc::new(RemoteSession::new(self.pool.clone(), self.catalog.clone(), credentials))
    }
}

/// Either a result or the reason the request matched nothing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T> Outcome<T> {
    pub fn found(result: T) -> Self {
        Self { found: true, explanation: None, result: Some(result) }
    }

    pub fn not_found(explanation: impl Into<String>) -> Self {
        Self { found: false, explanation: Some(explanation.into()), result: None }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    Character { character_id: CharacterId, class_type: ClassType },
    Vault,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Holding {
    pub location: Location,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ItemCount {
    pub item_name: String,
    pub item_hash: u32,
    pub holdings: Vec<Holding>,
    pub total: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferItemRequest {
    pub item_name: String,
    /// `None` or `-1` moves everything.
    pub count: Option<i64>,
    pub source_class: Option<String>,
    pub destination_class: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferSummary {
    pub item_name: String,
    pub destination: Location,
    pub requested: Option<u32>,
    pub planned_quantity: u32,
    pub confirmed_quantity: u32,
    /// Set when fewer items existed than were requested.
    pub only_had: Option<u32>,
    pub failures: Vec<ItemTransferResult>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EquippedLoadout {
    pub character_id: CharacterId,
    pub class_type: ClassType,
    pub loadout: Loadout,
    pub power_level: f64,
    pub report: EquipReport,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EngramUnload {
    pub found_quantity: u32,
    pub report: TransferReport,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    Created,
    Overwritten,
    /// A loadout with the name exists and overwriting was not requested.
    Conflict,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SavedLoadout {
    pub name: String,
    pub status: SaveStatus,
    pub buckets: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RestoredNamedLoadout {
    pub name: String,
    pub character_id: CharacterId,
    pub restored: RestoredLoadout,
    pub report: EquipReport,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CrucibleRanking {
    pub glory: Option<Ranking>,
    pub valor: Option<Ranking>,
}

/// Where a spoken class name points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ClassTarget {
    Class(ClassType),
    Vault,
}

pub struct InventoryService {
    sessions: Arc<dyn SessionFactory>,
    catalog: Arc<Catalog>,
    loadouts: Arc<dyn LoadoutRepository>,
    unknown_values: Arc<dyn UnknownValueRepository>,
}

impl InventoryService {
    pub fn new(
        sessions: Arc<dyn SessionFactory>,
        catalog: Arc<Catalog>,
        loadouts: Arc<dyn LoadoutRepository>,
        unknown_values: Arc<dyn UnknownValueRepository>,
    ) -> Self {
        Self { sessions, catalog, loadouts, unknown_values }
    }

    pub async fn count_item(
        &self,
        access_token: &str,
        item_name: &str,
    ) -> Result<Outcome<ItemCount>, ApplicationError> {
        let item_name = self.catalog.canonical_item_name(item_name);
        let Some(item_hash) = self.catalog.item_hash_for_name(&item_name) else {
            self.record_unknown(UnknownValueKind::ItemName, &item_name).await;
            return Ok(Outcome::not_found(format!("could not find any items named {item_name}")));
        };

        let api = self.sessions.open(access_token);
        let (_, profile) = self.load(api.as_ref(), false).await?;

        let mut matching: Vec<&Item> = profile.all_items.iter().collect();
        retain_matching(&mut matching, &[ItemFilter::ItemHash(item_hash)]);
        if matching.is_empty() {
            return Ok(Outcome::not_found(format!("you don't have any {item_name} on any of your characters")));
        }

        let mut holdings: Vec<Holding> = Vec::new();
        for item in matching {
            let location = location_of(&profile, item.owner.as_ref());
            match holdings.iter_mut().find(|holding| holding.location == location) {
                Some(holding) => holding.quantity += item.quantity,
                None => holdings.push(Holding { location, quantity: item.quantity }),
            }
        }
        let total = holdings.iter().map(|holding| holding.quantity).sum();

        Ok(Outcome::found(ItemCount { item_name, item_hash, holdings, total }))
    }

    pub async fn transfer_item(
        &self,
        access_token: &str,
        request: TransferItemRequest,
    ) -> Result<Outcome<TransferSummary>, ApplicationError> {
        let requested = match request.count {
            None | Some(-1) => None,
            Some(count) if count > 0 => Some(u32::try_from(count).unwrap_or(u32::MAX)),
            Some(count) => {
                return Err(DomainError::InvariantViolation(format!(
                    "transfer count must be positive or -1, got {count}"
                ))
                .into())
            }
        };

        let item_name = self.catalog.canonical_item_name(&request.item_name);
        let Some(item_hash) = self.catalog.item_hash_for_name(&item_name) else {
            self.record_unknown(UnknownValueKind::ItemName, &item_name).await;
            return Ok(Outcome::not_found(format!("could not find any items named {item_name}")));
        };

        let destination_target = match request.destination_class.as_deref() {
            None => ClassTarget::Vault,
            Some(name) => match self.resolve_class(name).await {
                Some(target) => target,
                None => return Ok(Outcome::not_found(format!("{name} is not a character class"))),
            },
        };
        let source_target = match request.source_class.as_deref() {
            None => None,
            Some(name) => match self.resolve_class(name).await {
                Some(target) => Some(target),
                None => return Ok(Outcome::not_found(format!("{name} is not a character class"))),
            },
        };

        let api = self.sessions.open(access_token);
        let (_, profile) = self.load(api.as_ref(), false).await?;

        let destination = match destination_target {
            ClassTarget::Vault => None,
            ClassTarget::Class(class_type) => match profile.character_for_class(class_type) {
                Some(character) => Some(character.id.clone()),
                None => {
                    self.record_unknown(UnknownValueKind::ClassName, class_type.as_str()).await;
                    return Ok(Outcome::not_found(format!(
                        "you do not have any {} characters",
                        class_type.as_str()
                    )));
                }
            },
        };

        let mut filters = vec![ItemFilter::ItemHash(item_hash)];
        match source_target {
            None => {}
            Some(ClassTarget::Vault) => filters.push(ItemFilter::OwnedBy(None)),
            Some(ClassTarget::Class(class_type)) => match profile.character_for_class(class_type) {
                Some(character) => filters.push(ItemFilter::OwnedBy(Some(character.id.clone()))),
                None => {
                    return Ok(Outcome::not_found(format!(
                        "you do not have any {} characters",
                        class_type.as_str()
                    )))
                }
            },
        }
        let matching: Vec<Item> =
            profile.all_items.iter().filter(|item| filters.iter().all(|filter| filter.matches(item))).cloned().collect();
        if matching.is_empty() {
            return Ok(Outcome::not_found(format!("you don't have any {item_name} on any of your characters")));
        }

        let orchestrator = Orchestrator::new(api);
        let report = orchestrator
            .transfer_items(&matching, destination.as_ref(), requested, profile.membership_type)
            .await;
        let planned_quantity = report.planned_quantity;
        let only_had = requested.filter(|wanted| planned_quantity < *wanted).map(|_| planned_quantity);

        info!(
            event_name = "inventory.transfer.completed",
            item_hash,
            planned_quantity,
            confirmed_quantity = report.confirmed_quantity(),
            "item transfer finished"
        );

        Ok(Outcome::found(TransferSummary {
            item_name,
            destination: location_of(&profile, destination.as_ref()),
            requested,
            planned_quantity,
            confirmed_quantity: report.confirmed_quantity(),
            only_had,
            failures: report.failures().cloned().collect(),
        }))
    }

    pub async fn equip_max_power(&self, access_token: &str) -> Result<EquippedLoadout, ApplicationError> {
        let api = self.sessions.open(access_token);
        let (_, profile) = self.load(api.as_ref(), true).await?;
        let character = current_character(&profile)?;

        let loadout = AllocationEngine::new(&self.catalog).find_max_power_loadout(&profile, &character.id)?;
        self.equip(api, loadout, &character, &profile).await
    }

    pub async fn randomize_loadout(
        &self,
        access_token: &str,
        include_armor: bool,
    ) -> Result<EquippedLoadout, ApplicationError> {
        let api = self.sessions.open(access_token);
        let (_, profile) = self.load(api.as_ref(), true).await?;
        let character = current_character(&profile)?;

        let loadout =
            AllocationEngine::new(&self.catalog).find_random_loadout(&profile, &character.id, include_armor)?;
        self.equip(api, loadout, &character, &profile).await
    }

    pub async fn unload_engrams(&self, access_token: &str) -> Result<Outcome<EngramUnload>, ApplicationError> {
        let api = self.sessions.open(access_token);
        let (_, profile) = self.load(api.as_ref(), false).await?;

        let engrams: Vec<Item> = profile
            .all_items
            .iter()
            .filter(|item| ItemFilter::Engram(true).matches(item) && !item.is_in_vault())
            .cloned()
            .collect();
        if engrams.is_empty() {
            return Ok(Outcome::not_found("you don't have any engrams on your characters"));
        }

        let found_quantity = engrams.iter().map(|item| item.quantity).sum();
        let report = Orchestrator::new(api).transfer_items(&engrams, None, None, profile.membership_type).await;
        info!(event_name = "inventory.engrams.unloaded", found_quantity, "engrams moved to vault");

        Ok(Outcome::found(EngramUnload { found_quantity, report }))
    }

    pub async fn loadout_exists(&self, access_token: &str, name: &str) -> Result<bool, ApplicationError> {
        let api = self.sessions.open(access_token);
        let account = resolve_account(api.as_ref()).await?;
        let existing = self.loadouts.select_loadout(&account.account_id, name).await.map_err(persistence)?;
        Ok(existing.is_some())
    }

    /// Stores the current character's equipped items under `name`.
    pub async fn save_loadout(
        &self,
        access_token: &str,
        name: &str,
        overwrite: bool,
    ) -> Result<SavedLoadout, ApplicationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvariantViolation("loadout name must not be empty".to_string()).into());
        }

        let api = self.sessions.open(access_token);
        let (account, profile) = self.load(api.as_ref(), false).await?;
        let character = current_character(&profile)?;
        let persisted = to_persisted(&profile.loadout(&character.id).cloned().unwrap_or_default());

        let status = if overwrite {
            let updated =
                self.loadouts.update_loadout(&account.account_id, name, &persisted).await.map_err(persistence)?;
            if !updated {
                self.loadouts.save_loadout(&account.account_id, name, &persisted).await.map_err(persistence)?;
            }
            SaveStatus::Overwritten
        } else if self.loadouts.select_loadout(&account.account_id, name).await.map_err(persistence)?.is_some() {
            SaveStatus::Conflict
        } else {
            self.loadouts.save_loadout(&account.account_id, name, &persisted).await.map_err(persistence)?;
            SaveStatus::Created
        };

        info!(event_name = "loadout.save", name, status = ?status, buckets = persisted.0.len(), "loadout save handled");
        Ok(SavedLoadout { name: name.to_string(), status, buckets: persisted.0.len() })
    }

    pub async fn equip_named_loadout(
        &self,
        access_token: &str,
        name: &str,
    ) -> Result<Outcome<RestoredNamedLoadout>, ApplicationError> {
        let api = self.sessions.open(access_token);
        let (account, profile) = self.load(api.as_ref(), false).await?;

        let Some(persisted) = self.loadouts.select_loadout(&account.account_id, name).await.map_err(persistence)?
        else {
            self.record_unknown(UnknownValueKind::LoadoutName, name).await;
            return Ok(Outcome::not_found(format!("you do not have a loadout named {name}")));
        };

        let character = current_character(&profile)?;
        let restored = from_persisted(&persisted, &profile);
        let report =
            Orchestrator::new(api).equip_loadout(&restored.loadout, &character.id, &profile).await?;

        Ok(Outcome::found(RestoredNamedLoadout {
            name: name.to_string(),
            character_id: character.id,
            restored,
            report,
        }))
    }

    pub async fn list_loadout_names(&self, access_token: &str) -> Result<Vec<String>, ApplicationError> {
        let api = self.sessions.open(access_token);
        let account = resolve_account(api.as_ref()).await?;
        self.loadouts.list_loadout_names(&account.account_id).await.map_err(persistence)
    }

    /// Glory and valor. Found when at least one of the two is reported.
    pub async fn crucible_ranking(&self, access_token: &str) -> Result<Outcome<CrucibleRanking>, ApplicationError> {
        let progressions = self.load_progressions(access_token).await?;
        let glory = ranking(&progressions, RankTrack::Glory);
        let valor = ranking(&progressions, RankTrack::Valor);
        if glory.is_none() && valor.is_none() {
            return Ok(Outcome::not_found("could not find your current crucible rankings"));
        }
        Ok(Outcome::found(CrucibleRanking { glory, valor }))
    }

    pub async fn gambit_ranking(&self, access_token: &str) -> Result<Outcome<Ranking>, ApplicationError> {
        let progressions = self.load_progressions(access_token).await?;
        Ok(match ranking(&progressions, RankTrack::Infamy) {
            Some(infamy) => Outcome::found(infamy),
            None => Outcome::not_found("could not find your current gambit ranking"),
        })
    }

    async fn load_progressions(&self, access_token: &str) -> Result<ProgressionSnapshot, ApplicationError> {
        let api = self.sessions.open(access_token);
        let account = resolve_account(api.as_ref()).await?;
        api.load_progressions(&account.membership)
            .await
            .map_err(|error| ApplicationError::ProfileFetch(error.to_string()))
    }

    async fn load(
        &self,
        api: &dyn GameApi,
        require_instance_data: bool,
    ) -> Result<(Account, Profile), ApplicationError> {
        let account = resolve_account(api).await?;
        let snapshot = api
            .load_profile(&account.membership)
            .await
            .map_err(|error| ApplicationError::ProfileFetch(error.to_string()))?;
        let profile = Profile::assemble(snapshot, &self.catalog, require_instance_data);
        Ok((account, profile))
    }

    async fn equip(
        &self,
        api: Arc<dyn GameApi>,
        loadout: Loadout,
        character: &Character,
        profile: &Profile,
    ) -> Result<EquippedLoadout, ApplicationError> {
        let report = Orchestrator::new(api).equip_loadout(&loadout, &character.id, profile).await?;
        Ok(EquippedLoadout {
            character_id: character.id.clone(),
            class_type: character.class_type,
            power_level: loadout.power_level(),
            loadout,
            report,
        })
    }

    async fn resolve_class(&self, name: &str) -> Option<ClassTarget> {
        let canonical = self.catalog.canonical_class_name(name);
        if canonical == "vault" {
            return Some(ClassTarget::Vault);
        }
        match ClassType::from_name(&canonical) {
            Some(class_type) => Some(ClassTarget::Class(class_type)),
            None => {
                self.record_unknown(UnknownValueKind::ClassName, &canonical).await;
                None
            }
        }
    }

    async fn record_unknown(&self, kind: UnknownValueKind, value: &str) {
        if let Err(error) = self.unknown_values.record(kind, value).await {
            warn!(
                event_name = "unknown_value.record_failed",
                kind = kind.as_str(),
                error = %error,
                "could not record unknown value"
            );
        }
    }
}

async fn resolve_account(api: &dyn GameApi) -> Result<Account, ApplicationError> {
    api.current_account().await.map_err(|error| match error {
        RemoteError::NoLinkedAccount => {
            ApplicationError::AccountResolution("no game account is linked to this token".to_string())
        }
        other => ApplicationError::AccountResolution(other.to_string()),
    })
}

fn ranking(progressions: &ProgressionSnapshot, track: RankTrack) -> Option<Ranking> {
    let ranking = find_ranking(progressions, track);
    match &ranking {
        Some(found) => info!(
            event_name = "inventory.ranking.read",
            track = track.as_str(),
            rank = found.rank,
            level = found.level,
            "rank progression read"
        ),
        None => warn!(event_name = "inventory.ranking.missing", track = track.as_str(), "rank progression missing"),
    }
    ranking
}

fn current_character(profile: &Profile) -> Result<Character, ApplicationError> {
    profile
        .current_character()
        .cloned()
        .ok_or_else(|| DomainError::CharacterNotFound("current".to_string()).into())
}

fn location_of(profile: &Profile, owner: Option<&CharacterId>) -> Location {
    match owner.and_then(|id| profile.character(id)) {
        Some(character) => Location::Character {
            character_id: character.id.clone(),
            class_type: character.class_type,
        },
        None => Location::Vault,
    }
}

fn persistence(error: RepositoryError) -> ApplicationError {
    ApplicationError::Persistence(error.to_string())
}
