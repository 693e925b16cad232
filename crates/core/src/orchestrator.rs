//! Realises a target loadout through remote transfer and equip calls.
//!
//! Phases run strictly in order: plan evictions, free items equipped on other
//! characters, evict to the vault, move to the destination, equip. Transfers
//! within a phase run concurrently and the phase waits for all of them.
//! Individual call failures never abort the plan; they are reported per item.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::domain::character::CharacterId;
use crate::domain::item::Item;
use crate::domain::loadout::Loadout;
use crate::domain::profile::Profile;
use crate::errors::DomainError;
use crate::filters::{retain_matching, sort_by_power_asc, ItemFilter};
use crate::gateway::{EquipItemsRequest, EquipRequest, GameApi, RemoteError, TransferRequest};
use crate::taxonomy::{EquipmentBucket, TierType, MAX_ITEMS_PER_BUCKET};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStage {
    ToVault,
    FromVault,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransferOutcome {
    Completed,
    Failed { stage: TransferStage, message: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ItemTransferResult {
    pub item_hash: u32,
    pub instance_id: Option<String>,
    pub quantity: u32,
    pub outcome: TransferOutcome,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TransferReport {
    /// Quantity the plan set out to move.
    pub planned_quantity: u32,
    /// One entry per item a transfer was issued for, in input order.
    pub results: Vec<ItemTransferResult>,
}

impl TransferReport {
    pub fn confirmed_quantity(&self) -> u32 {
        self.results
            .iter()
            .filter(|result| result.outcome == TransferOutcome::Completed)
            .map(|result| result.quantity)
            .sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemTransferResult> {
        self.results.iter().filter(|result| result.outcome != TransferOutcome::Completed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallOutcome {
    Completed,
    Failed { message: String },
}

impl From<Result<(), RemoteError>> for CallOutcome {
    fn from(value: Result<(), RemoteError>) -> Self {
        match value {
            Ok(()) => Self::Completed,
            Err(error) => Self::Failed { message: error.to_string() },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SwapResult {
    pub character_id: CharacterId,
    pub bucket: EquipmentBucket,
    pub displaced_item_hash: u32,
    /// `None` when the character had nothing eligible to wear instead.
    pub substitute_item_hash: Option<u32>,
    pub outcome: Option<CallOutcome>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EquipBatchResult {
    pub item_ids: Vec<i64>,
    pub outcome: CallOutcome,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EquipReport {
    pub evictions: TransferReport,
    pub swaps: Vec<SwapResult>,
    pub transfers: TransferReport,
    /// `None` when nothing needed equipping.
    pub equip: Option<EquipBatchResult>,
}

impl EquipReport {
    pub fn is_clean(&self) -> bool {
        self.evictions.failures().next().is_none()
            && self.transfers.failures().next().is_none()
            && self
                .swaps
                .iter()
                .all(|swap| !matches!(swap.outcome, Some(CallOutcome::Failed { .. })))
            && !matches!(self.equip, Some(EquipBatchResult { outcome: CallOutcome::Failed { .. }, .. }))
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    api: Arc<dyn GameApi>,
}

impl Orchestrator {
    pub fn new(api: Arc<dyn GameApi>) -> Self {
        Self { api }
    }

    pub async fn equip_loadout(
        &self,
        loadout: &Loadout,
        destination: &CharacterId,
        profile: &Profile,
    ) -> Result<EquipReport, DomainError> {
        if profile.character(destination).is_none() {
            return Err(DomainError::CharacterNotFound(destination.to_string()));
        }
        let membership_type = profile.membership_type;

        let evictions = self.plan_evictions(loadout, destination, profile);

        let mut swaps = Vec::new();
        for (bucket, item) in loadout.iter() {
            let Some(holder) = item.owner.as_ref() else {
                continue;
            };
            if item.is_equipped && holder != destination {
                swaps.push(self.swap_equipped_item(*bucket, item, holder, profile, membership_type).await);
            }
        }

        let eviction_report = if evictions.is_empty() {
            TransferReport::default()
        } else {
            debug!(count = evictions.len(), character_id = %destination, "evicting items to vault");
            self.transfer_items(&evictions, None, None, membership_type).await
        };

        let targets: Vec<Item> = loadout.items().cloned().collect();
        let transfers = self.transfer_items(&targets, Some(destination), None, membership_type).await;

        let equip = self.equip_items(&targets, destination, membership_type).await;

        let report = EquipReport { evictions: eviction_report, swaps, transfers, equip };
        info!(
            event_name = "loadout.equip.completed",
            character_id = %destination,
            planned = report.transfers.planned_quantity,
            confirmed = report.transfers.confirmed_quantity(),
            clean = report.is_clean(),
            "loadout equip finished"
        );
        Ok(report)
    }

    /// Chooses one occupant to send to the vault for every target bucket on
    /// the destination that is full and about to receive an item.
    fn plan_evictions(&self, loadout: &Loadout, destination: &CharacterId, profile: &Profile) -> Vec<Item> {
        let Some(equipment) = profile.equipment(destination) else {
            return Vec::new();
        };

        let mut evictions = Vec::new();
        for (bucket, incoming) in loadout.iter() {
            if incoming.is_owned_by(destination) || equipment.occupancy(*bucket) < MAX_ITEMS_PER_BUCKET {
                continue;
            }
            let victim = equipment
                .unequipped(*bucket)
                .iter()
                .rev()
                .find(|occupant| !loadout.items().any(|target| target.same_instance(occupant)));
            match victim {
                Some(victim) => evictions.push(victim.clone()),
                None => warn!(
                    event_name = "loadout.equip.no_eviction_candidate",
                    bucket = bucket.as_str(),
                    character_id = %destination,
                    "bucket is full and nothing can be evicted"
                ),
            }
        }
        evictions
    }

    /// Equips the lowest power non-exotic item of the same bucket on the
    /// character currently wearing `item`, so that `item` becomes movable.
    async fn swap_equipped_item(
        &self,
        bucket: EquipmentBucket,
        item: &Item,
        holder: &CharacterId,
        profile: &Profile,
        membership_type: i32,
    ) -> SwapResult {
        let mut candidates: Vec<&Item> = profile.all_items.iter().collect();
        retain_matching(
            &mut candidates,
            &[
                ItemFilter::OwnedBy(Some(holder.clone())),
                ItemFilter::BucketHash(item.bucket_hash),
                ItemFilter::NotTier(TierType::Exotic),
                ItemFilter::Equippable(true),
            ],
        );
        if let Some(class_type) = profile.character(holder).map(|character| character.class_type) {
            retain_matching(&mut candidates, &[ItemFilter::ClassCompatible(class_type)]);
        }
        candidates.retain(|candidate| !candidate.same_instance(item) && candidate.instance_id.is_some());
        sort_by_power_asc(&mut candidates);

        let mut result = SwapResult {
            character_id: holder.clone(),
            bucket,
            displaced_item_hash: item.item_hash,
            substitute_item_hash: None,
            outcome: None,
        };

        let Some((substitute, item_id)) =
            candidates.first().and_then(|candidate| Some((*candidate, candidate.instance_id.clone()?)))
        else {
            info!(
                event_name = "loadout.equip.swap_skipped",
                bucket = bucket.as_str(),
                character_id = %holder,
                item_hash = item.item_hash,
                "no substitute available, item stays equipped elsewhere"
            );
            return result;
        };

        let request = EquipRequest { item_id, character_id: holder.clone(), membership_type };
        let outcome = self.api.equip_item(&request).await;
        if let Err(error) = &outcome {
            warn!(
                event_name = "loadout.equip.swap_failed",
                character_id = %holder,
                item_hash = substitute.item_hash,
                error = %error,
                "substitute equip failed"
            );
        }
        result.substitute_item_hash = Some(substitute.item_hash);
        result.outcome = Some(outcome.into());
        result
    }

    /// Moves items to `destination`, or to the vault when it is `None`.
    ///
    /// Items already at the destination are skipped. With a `count`, quantities
    /// are taken from the items in list order until the count is met; the
    /// remaining items are left alone.
    pub async fn transfer_items(
        &self,
        items: &[Item],
        destination: Option<&CharacterId>,
        count: Option<u32>,
        membership_type: i32,
    ) -> TransferReport {
        let mut planned_quantity = 0u32;
        let mut tasks = JoinSet::new();

        for (index, item) in items.iter().enumerate() {
            if let Some(limit) = count {
                if planned_quantity >= limit {
                    break;
                }
            }
            if item.owner.as_ref() == destination {
                continue;
            }

            let quantity = match count {
                Some(limit) => item.quantity.min(limit - planned_quantity),
                None => item.quantity,
            };
            planned_quantity += quantity;

            let api = Arc::clone(&self.api);
            let item = item.clone();
            let destination = destination.cloned();
            tasks.spawn(async move {
                let outcome = move_item(api.as_ref(), &item, quantity, destination.as_ref(), membership_type).await;
                (
                    index,
                    ItemTransferResult {
                        item_hash: item.item_hash,
                        instance_id: item.instance_id,
                        quantity,
                        outcome,
                    },
                )
            });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => results.push(entry),
                Err(error) => warn!(
                    event_name = "loadout.transfer.task_failed",
                    error = %error,
                    "transfer task did not complete"
                ),
            }
        }
        results.sort_by_key(|(index, _)| *index);

        TransferReport {
            planned_quantity,
            results: results.into_iter().map(|(_, result)| result).collect(),
        }
    }

    /// Issues one batched equip for every target not already equipped on the
    /// destination. Items without a numeric instance id are skipped.
    pub async fn equip_items(
        &self,
        items: &[Item],
        destination: &CharacterId,
        membership_type: i32,
    ) -> Option<EquipBatchResult> {
        let item_ids: Vec<i64> = items
            .iter()
            .filter(|item| !item.is_equipped_on(destination))
            .filter_map(|item| {
                let parsed = item.numeric_instance_id();
                if parsed.is_none() {
                    debug!(item_hash = item.item_hash, "skipping equip for item without numeric instance id");
                }
                parsed
            })
            .collect();

        if item_ids.is_empty() {
            debug!(character_id = %destination, "nothing to equip");
            return None;
        }

        let request = EquipItemsRequest {
            item_ids: item_ids.clone(),
            character_id: destination.clone(),
            membership_type,
        };
        let outcome = self.api.equip_items(&request).await;
        if let Err(error) = &outcome {
            warn!(
                event_name = "loadout.equip.batch_failed",
                character_id = %destination,
                error = %error,
                "batched equip failed"
            );
        }
        Some(EquipBatchResult { item_ids, outcome: outcome.into() })
    }
}

/// Character to vault, then vault to destination. A vault item skips the first
/// hop and a vault destination skips the second.
async fn move_item(
    api: &dyn GameApi,
    item: &Item,
    quantity: u32,
    destination: Option<&CharacterId>,
    membership_type: i32,
) -> TransferOutcome {
    if let Some(holder) = item.owner.as_ref() {
        let request = TransferRequest {
            item_hash: item.item_hash,
            stack_size: quantity,
            transfer_to_vault: true,
            item_id: item.instance_id.clone(),
            character_id: holder.clone(),
            membership_type,
        };
        if let Err(error) = api.transfer_item(&request).await {
            warn!(
                event_name = "loadout.transfer.failed",
                stage = "to_vault",
                item_hash = item.item_hash,
                character_id = %holder,
                error = %error,
                "transfer to vault failed"
            );
            return TransferOutcome::Failed { stage: TransferStage::ToVault, message: error.to_string() };
        }
    }

    let Some(destination) = destination else {
        return TransferOutcome::Completed;
    };

    let request = TransferRequest {
        item_hash: item.item_hash,
        stack_size: quantity,
        transfer_to_vault: false,
        item_id: item.instance_id.clone(),
        character_id: destination.clone(),
        membership_type,
    };
    match api.transfer_item(&request).await {
        Ok(()) => TransferOutcome::Completed,
        Err(error) => {
            warn!(
                event_name = "loadout.transfer.failed",
                stage = "from_vault",
                item_hash = item.item_hash,
                character_id = %destination,
                error = %error,
                "transfer from vault failed"
            );
            TransferOutcome::Failed { stage: TransferStage::FromVault, message: error.to_string() }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{CallOutcome, Orchestrator, TransferOutcome, TransferStage};
    use crate::allocation::AllocationEngine;
    use crate::domain::character::CharacterId;
    use crate::domain::item::Item;
    use crate::domain::loadout::Loadout;
    use crate::fixtures::{catalog, character, ItemBuilder, ProfileBuilder, SimulatedGameApi};
    use crate::taxonomy::{ClassType, EquipmentBucket, MAX_ITEMS_PER_BUCKET};

    const HUNTER: &str = "100";
    const TITAN: &str = "200";

    fn id(raw: &str) -> CharacterId {
        CharacterId::from(raw)
    }

    fn orchestrator(api: &Arc<SimulatedGameApi>) -> Orchestrator {
        Orchestrator::new(api.clone())
    }

    fn gear(hash: u32, bucket: EquipmentBucket, instance: u32, power: u32) -> ItemBuilder {
        ItemBuilder::new(hash, bucket).instance(&instance.to_string()).power(power)
    }

    #[tokio::test]
    async fn partial_stack_transfer_moves_exactly_the_requested_count() {
        let stack = ItemBuilder::stack(777, 5).owner(TITAN).build();
        let profile = ProfileBuilder::new()
            .character(character(HUNTER, ClassType::Hunter, 50, 9))
            .character(character(TITAN, ClassType::Titan, 50, 1))
            .item(stack.clone())
            .build();
        let api = Arc::new(SimulatedGameApi::from_profile(&profile));

        let report = orchestrator(&api)
            .transfer_items(&[stack], Some(&id(HUNTER)), Some(3), profile.membership_type)
            .await;

        assert_eq!(report.planned_quantity, 3);
        assert_eq!(report.confirmed_quantity(), 3);
        assert_eq!(api.quantity_held(Some(&id(TITAN)), 777).await, 2);
        assert_eq!(api.quantity_held(Some(&id(HUNTER)), 777).await, 3);
        assert_eq!(api.quantity_held(None, 777).await, 0);
    }

    #[tokio::test]
    async fn count_accumulates_in_list_order_and_leaves_the_rest_untouched() {
        let first = ItemBuilder::stack(777, 2).owner(TITAN).build();
        let second = ItemBuilder::stack(777, 4).build();
        let third = ItemBuilder::stack(777, 6).owner(HUNTER).build();
        let profile = ProfileBuilder::new()
            .character(character(HUNTER, ClassType::Hunter, 50, 9))
            .character(character(TITAN, ClassType::Titan, 50, 1))
            .items([first.clone(), second.clone(), third.clone()])
            .build();
        let api = Arc::new(SimulatedGameApi::from_profile(&profile));

        let report = orchestrator(&api)
            .transfer_items(&[third, first, second], None, Some(5), profile.membership_type)
            .await;

        // hunter's 6 go first and already cover the count
        assert_eq!(report.planned_quantity, 5);
        assert_eq!(report.results.len(), 1);
        assert_eq!(api.quantity_held(Some(&id(HUNTER)), 777).await, 1);
        assert_eq!(api.quantity_held(Some(&id(TITAN)), 777).await, 2);
        assert_eq!(api.quantity_held(None, 777).await, 9);
    }

    #[tokio::test]
    async fn vault_items_skip_the_first_hop() {
        let weapon = gear(1, EquipmentBucket::Kinetic, 11, 600).build();
        let profile = ProfileBuilder::new()
            .character(character(HUNTER, ClassType::Hunter, 50, 9))
            .item(weapon.clone())
            .build();
        let api = Arc::new(SimulatedGameApi::from_profile(&profile));

        let report = orchestrator(&api)
            .transfer_items(&[weapon], Some(&id(HUNTER)), None, profile.membership_type)
            .await;

        assert_eq!(report.confirmed_quantity(), 1);
        let calls = api.transfer_calls().await;
        assert_eq!(calls.len(), 1);
        assert!(!calls[0].transfer_to_vault);
    }

    #[tokio::test]
    async fn failed_hops_are_reported_per_item_without_aborting_the_batch() {
        let doomed = gear(1, EquipmentBucket::Kinetic, 11, 600).owner(TITAN).build();
        let fine = gear(2, EquipmentBucket::Energy, 12, 600).owner(TITAN).build();
        let profile = ProfileBuilder::new()
            .character(character(HUNTER, ClassType::Hunter, 50, 9))
            .character(character(TITAN, ClassType::Titan, 50, 1))
            .items([doomed.clone(), fine.clone()])
            .build();
        let api = Arc::new(SimulatedGameApi::from_profile(&profile));
        api.fail_item(1).await;

        let report = orchestrator(&api)
            .transfer_items(&[doomed, fine], Some(&id(HUNTER)), None, profile.membership_type)
            .await;

        assert_eq!(report.planned_quantity, 2);
        assert_eq!(report.confirmed_quantity(), 1);
        assert!(matches!(
            report.results[0].outcome,
            TransferOutcome::Failed { stage: TransferStage::ToVault, .. }
        ));
        assert_eq!(report.results[1].outcome, TransferOutcome::Completed);
    }

    fn full_bucket_profile(target_on_other: bool) -> (crate::domain::profile::Profile, Item) {
        let mut builder = ProfileBuilder::new()
            .character(character(HUNTER, ClassType::Hunter, 50, 9))
            .character(character(TITAN, ClassType::Titan, 50, 1));

        builder = builder.item(gear(10, EquipmentBucket::Helmet, 1_000, 500).owner(HUNTER).equipped().build());
        for offset in 1..MAX_ITEMS_PER_BUCKET as u32 {
            builder = builder.item(gear(10 + offset, EquipmentBucket::Helmet, 1_000 + offset, 500).owner(HUNTER).build());
        }

        let target = if target_on_other {
            gear(99, EquipmentBucket::Helmet, 9_999, 650).owner(TITAN).equipped().build()
        } else {
            gear(99, EquipmentBucket::Helmet, 9_999, 650).build()
        };
        builder = builder
            .item(target.clone())
            .item(gear(98, EquipmentBucket::Helmet, 9_998, 640).owner(TITAN).build())
            .item(gear(97, EquipmentBucket::Helmet, 9_997, 300).owner(TITAN).build());
        (builder.build(), target)
    }

    #[tokio::test]
    async fn full_destination_bucket_is_evicted_before_moving_in() {
        let (profile, target) = full_bucket_profile(false);
        let api = Arc::new(SimulatedGameApi::from_profile(&profile));
        let loadout: Loadout = [(EquipmentBucket::Helmet, target)].into_iter().collect();

        let report = orchestrator(&api).equip_loadout(&loadout, &id(HUNTER), &profile).await.expect("equip");

        assert_eq!(report.evictions.results.len(), 1);
        // the back of the unequipped list goes first
        assert_eq!(report.evictions.results[0].item_hash, 10 + MAX_ITEMS_PER_BUCKET as u32 - 1);
        assert!(report.is_clean(), "report: {report:?}");
        assert!(api.max_bucket_occupancy().await <= MAX_ITEMS_PER_BUCKET);
        assert!(api.is_equipped_on(9_999, &id(HUNTER)).await);
    }

    #[tokio::test]
    async fn item_equipped_elsewhere_is_swapped_for_the_weakest_legendary() {
        let (profile, target) = full_bucket_profile(true);
        let api = Arc::new(SimulatedGameApi::from_profile(&profile));
        let loadout: Loadout = [(EquipmentBucket::Helmet, target)].into_iter().collect();

        let report = orchestrator(&api).equip_loadout(&loadout, &id(HUNTER), &profile).await.expect("equip");

        assert_eq!(report.swaps.len(), 1);
        assert_eq!(report.swaps[0].substitute_item_hash, Some(97));
        assert_eq!(report.swaps[0].outcome, Some(CallOutcome::Completed));
        assert!(api.is_equipped_on(9_997, &id(TITAN)).await);
        assert!(api.is_equipped_on(9_999, &id(HUNTER)).await);
        assert!(api.max_bucket_occupancy().await <= MAX_ITEMS_PER_BUCKET);
    }

    #[tokio::test]
    async fn swap_is_skipped_when_no_substitute_exists() {
        let target = gear(99, EquipmentBucket::Chest, 9_999, 650).owner(TITAN).equipped().build();
        let profile = ProfileBuilder::new()
            .character(character(HUNTER, ClassType::Hunter, 50, 9))
            .character(character(TITAN, ClassType::Titan, 50, 1))
            .item(target.clone())
            .item(gear(98, EquipmentBucket::Chest, 9_998, 640).owner(TITAN).exotic().build())
            .build();
        let api = Arc::new(SimulatedGameApi::from_profile(&profile));
        let loadout: Loadout = [(EquipmentBucket::Chest, target)].into_iter().collect();

        let report = orchestrator(&api).equip_loadout(&loadout, &id(HUNTER), &profile).await.expect("equip");

        assert_eq!(report.swaps.len(), 1);
        assert_eq!(report.swaps[0].substitute_item_hash, None);
        assert!(report.transfers.failures().next().is_some(), "equipped item cannot be moved");
    }

    #[tokio::test]
    async fn items_already_equipped_on_destination_are_neither_moved_nor_equipped() {
        let worn = gear(1, EquipmentBucket::Kinetic, 11, 600).owner(HUNTER).equipped().build();
        let profile = ProfileBuilder::new()
            .character(character(HUNTER, ClassType::Hunter, 50, 9))
            .item(worn.clone())
            .build();
        let api = Arc::new(SimulatedGameApi::from_profile(&profile));
        let loadout: Loadout = [(EquipmentBucket::Kinetic, worn)].into_iter().collect();

        let report = orchestrator(&api).equip_loadout(&loadout, &id(HUNTER), &profile).await.expect("equip");

        assert!(report.transfers.results.is_empty());
        assert!(report.equip.is_none());
        assert!(api.transfer_calls().await.is_empty());
        assert!(api.equip_calls().await.is_empty());
    }

    #[tokio::test]
    async fn max_power_loadout_ends_up_equipped_within_capacity() {
        let mut builder = ProfileBuilder::new()
            .character(character(HUNTER, ClassType::Hunter, 50, 9))
            .character(character(TITAN, ClassType::Titan, 50, 1));
        let mut instance = 5_000;
        for bucket in EquipmentBucket::POWER_CONTRIBUTING {
            for slot in 0..MAX_ITEMS_PER_BUCKET as u32 {
                instance += 1;
                let mut item = gear(instance, bucket, instance, 500).owner(HUNTER);
                if slot == 0 {
                    item = item.equipped();
                }
                builder = builder.item(item.build());
            }
            instance += 1;
            builder = builder.item(gear(instance, bucket, instance, 700).owner(TITAN).equipped().build());
            instance += 1;
            builder = builder.item(gear(instance, bucket, instance, 100).owner(TITAN).build());
        }
        let profile = builder.build();
        let api = Arc::new(SimulatedGameApi::from_profile(&profile));
        let catalog = catalog();
        let loadout = AllocationEngine::new(&catalog)
            .find_max_power_loadout(&profile, &id(HUNTER))
            .expect("loadout");

        let report = orchestrator(&api).equip_loadout(&loadout, &id(HUNTER), &profile).await.expect("equip");

        assert!(report.is_clean(), "report: {report:?}");
        assert_eq!(report.transfers.confirmed_quantity(), 8);
        assert!(api.max_bucket_occupancy().await <= MAX_ITEMS_PER_BUCKET);
        for item in loadout.items() {
            let instance = item.numeric_instance_id().expect("numeric id");
            assert!(api.is_equipped_on(instance, &id(HUNTER)).await);
        }
    }

    #[tokio::test]
    async fn unknown_destination_is_rejected_before_any_call() {
        let profile = ProfileBuilder::new().character(character(HUNTER, ClassType::Hunter, 50, 9)).build();
        let api = Arc::new(SimulatedGameApi::from_profile(&profile));

        let result = orchestrator(&api).equip_loadout(&Loadout::new(), &id("nobody"), &profile).await;

        assert!(result.is_err());
        assert!(api.transfer_calls().await.is_empty());
    }
}
