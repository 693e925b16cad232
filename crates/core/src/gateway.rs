//! The seam between orchestration and the remote game API.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::character::CharacterId;
use crate::domain::profile::{Account, Membership, ProfileSnapshot};
use crate::domain::progression::ProgressionSnapshot;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("remote transport failed: {0}")]
    Transport(String),
    #[error("remote response could not be decoded: {0}")]
    Decode(String),
    #[error("remote API rejected the request: {status} ({code}): {message}")]
    Api { code: i64, status: String, message: String },
    #[error("no game account is linked to this token")]
    NoLinkedAccount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferRequest {
    pub item_hash: u32,
    pub stack_size: u32,
    pub transfer_to_vault: bool,
    pub item_id: Option<String>,
    pub character_id: CharacterId,
    pub membership_type: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EquipRequest {
    pub item_id: String,
    pub character_id: CharacterId,
    pub membership_type: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EquipItemsRequest {
    pub item_ids: Vec<i64>,
    pub character_id: CharacterId,
    pub membership_type: i32,
}

/// Remote operations for one authenticated user.
#[async_trait]
pub trait GameApi: Send + Sync {
    async fn current_account(&self) -> Result<Account, RemoteError>;

    async fn load_profile(&self, membership: &Membership) -> Result<ProfileSnapshot, RemoteError>;

    async fn load_progressions(&self, membership: &Membership) -> Result<ProgressionSnapshot, RemoteError>;

    async fn transfer_item(&self, request: &TransferRequest) -> Result<(), RemoteError>;

    async fn equip_item(&self, request: &EquipRequest) -> Result<(), RemoteError>;

    async fn equip_items(&self, request: &EquipItemsRequest) -> Result<(), RemoteError>;
}
