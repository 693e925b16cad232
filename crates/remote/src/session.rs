//! `GameApi` for one authenticated user, spread over the client pool.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;
use warmind_core::catalog::Catalog;
use warmind_core::domain::profile::{Account, Membership, ProfileSnapshot};
use warmind_core::domain::progression::ProgressionSnapshot;
use warmind_core::gateway::{EquipItemsRequest, EquipRequest, GameApi, RemoteError, TransferRequest};

use crate::client::Credentials;
use crate::pool::ClientPool;
use crate::request::ApiRequest;
use crate::response::{
    BaseResponse, LinkedProfilesPayload, MembershipsPayload, ProfilePayload, ProgressionsPayload,
    StatusResponse,
};

pub struct RemoteSession {
    pool: Arc<ClientPool>,
    catalog: Arc<Catalog>,
    credentials: Credentials,
}

impl RemoteSession {
    pub fn new(pool: Arc<ClientPool>, catalog: Arc<Catalog>, credentials: Credentials) -> Self {
        Self { pool, catalog, credentials }
    }

    async fn call<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<BaseResponse<T>, RemoteError> {
        let client = self
            .pool
            .get()
            .ok_or_else(|| RemoteError::Transport("client pool is empty".to_string()))?;
        Ok(client.execute::<T>(request, &self.credentials).await?)
    }

    /// Like `call`, but a non-success envelope or a missing payload is an error.
    async fn fetch<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, RemoteError> {
        let response = ensure_success(self.call::<T>(request).await?)?;
        response
            .response
            .ok_or_else(|| RemoteError::Decode(format!("{} returned no payload", request.path)))
    }

    async fn act(&self, request: &ApiRequest) -> Result<(), RemoteError> {
        ensure_success(self.call::<Value>(request).await?).map(|_| ())
    }
}

fn ensure_success<T>(response: BaseResponse<T>) -> Result<BaseResponse<T>, RemoteError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(RemoteError::Api {
            code: response.error_code,
            status: response.error_status,
            message: response.message,
        })
    }
}

#[async_trait]
impl GameApi for RemoteSession {
    /// A single game membership is used directly. Otherwise the linked
    /// profile played most recently wins.
    async fn current_account(&self) -> Result<Account, RemoteError> {
        let memberships: MembershipsPayload = self.fetch(&ApiRequest::current_account()).await?;
        let account_id = memberships
            .bungie_net_user
            .map(|user| user.membership_id)
            .ok_or(RemoteError::NoLinkedAccount)?;

        let mut destiny = memberships.destiny_memberships;
        if destiny.len() == 1 {
            if let Some(only) = destiny.pop() {
                return Ok(Account { account_id, membership: Membership::from(only) });
            }
        }

        let linked: LinkedProfilesPayload = self.fetch(&ApiRequest::linked_profiles(&account_id)).await?;
        let latest = linked
            .profiles
            .into_iter()
            .max_by_key(|profile| profile.date_last_played)
            .ok_or(RemoteError::NoLinkedAccount)?;
        info!(
            event_name = "remote.account.linked_profile_selected",
            membership_type = latest.membership_type,
            "picked most recently played linked profile"
        );

        Ok(Account {
            account_id,
            membership: Membership {
                membership_id: latest.membership_id,
                membership_type: latest.membership_type,
                display_name: latest.display_name,
            },
        })
    }

    async fn load_profile(&self, membership: &Membership) -> Result<ProfileSnapshot, RemoteError> {
        let request = ApiRequest::user_profile(membership.membership_type, &membership.membership_id);
        let payload: ProfilePayload = self.fetch(&request).await?;
        Ok(payload.into_snapshot(membership, &self.catalog))
    }

    async fn load_progressions(&self, membership: &Membership) -> Result<ProgressionSnapshot, RemoteError> {
        let request = ApiRequest::progressions(membership.membership_type, &membership.membership_id);
        let payload: ProgressionsPayload = self.fetch(&request).await?;
        Ok(payload.into_snapshot())
    }

    async fn transfer_item(&self, request: &TransferRequest) -> Result<(), RemoteError> {
        self.act(&ApiRequest::transfer_item(request)).await
    }

    async fn equip_item(&self, request: &EquipRequest) -> Result<(), RemoteError> {
        self.act(&ApiRequest::equip_item(request)).await
    }

    async fn equip_items(&self, request: &EquipItemsRequest) -> Result<(), RemoteError> {
        self.act(&ApiRequest::equip_items(request)).await
    }
}
