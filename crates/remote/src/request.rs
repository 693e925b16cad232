//! Request descriptions for the game API endpoints this service uses.

use serde::Serialize;
use serde_json::Value;
use warmind_core::gateway::{EquipItemsRequest, EquipRequest, TransferRequest};

/// Membership type used to look up linked profiles by a bungie.net account id.
pub const BUNGIE_NEXT_MEMBERSHIP_TYPE: i32 = 254;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Profile components selectable on the profile endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    Profiles,
    ProfileInventories,
    ProfileCurrencies,
    Characters,
    CharacterInventories,
    CharacterEquipment,
    CharacterProgressions,
    ItemInstances,
}

impl Component {
    pub const FULL_PROFILE: [Component; 7] = [
        Self::Profiles,
        Self::ProfileInventories,
        Self::ProfileCurrencies,
        Self::Characters,
        Self::CharacterInventories,
        Self::CharacterEquipment,
        Self::ItemInstances,
    ];

    pub fn code(self) -> u16 {
        match self {
            Self::Profiles => 100,
            Self::ProfileInventories => 102,
            Self::ProfileCurrencies => 103,
            Self::Characters => 200,
            Self::CharacterInventories => 201,
            Self::CharacterProgressions => 202,
            Self::CharacterEquipment => 205,
            Self::ItemInstances => 300,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the configured base URL, with leading slash.
    pub path: String,
    pub components: Vec<Component>,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn get(path: String) -> Self {
        Self { method: Method::Get, path, components: Vec::new(), body: None }
    }

    fn post<B: Serialize>(path: &str, body: &B) -> Self {
        Self {
            method: Method::Post,
            path: path.to_string(),
            components: Vec::new(),
            body: serde_json::to_value(body).ok(),
        }
    }

    pub fn current_account() -> Self {
        Self::get("/User/GetMembershipsForCurrentUser/".to_string())
    }

    pub fn linked_profiles(bungie_net_membership_id: &str) -> Self {
        Self::get(format!(
            "/Destiny2/{BUNGIE_NEXT_MEMBERSHIP_TYPE}/Profile/{bungie_net_membership_id}/LinkedProfiles/"
        ))
    }

    pub fn user_profile(membership_type: i32, membership_id: &str) -> Self {
        Self {
            components: Component::FULL_PROFILE.to_vec(),
            ..Self::get(format!("/Destiny2/{membership_type}/Profile/{membership_id}/"))
        }
    }

    pub fn progressions(membership_type: i32, membership_id: &str) -> Self {
        Self {
            components: vec![Component::CharacterProgressions],
            ..Self::get(format!("/Destiny2/{membership_type}/Profile/{membership_id}/"))
        }
    }

    pub fn transfer_item(request: &TransferRequest) -> Self {
        Self::post("/Destiny2/Actions/Items/TransferItem/", &TransferItemBody::from(request))
    }

    pub fn equip_item(request: &EquipRequest) -> Self {
        Self::post(
            "/Destiny2/Actions/Items/EquipItem/",
            &EquipItemBody {
                item_id: &request.item_id,
                character_id: &request.character_id.0,
                membership_type: request.membership_type,
            },
        )
    }

    pub fn equip_items(request: &EquipItemsRequest) -> Self {
        Self::post(
            "/Destiny2/Actions/Items/EquipItems/",
            &EquipItemsBody {
                item_ids: &request.item_ids,
                character_id: &request.character_id.0,
                membership_type: request.membership_type,
            },
        )
    }

    /// Query string for the selected components, if any.
    pub fn query(&self) -> Option<String> {
        if self.components.is_empty() {
            return None;
        }
        let codes: Vec<String> = self.components.iter().map(|component| component.code().to_string()).collect();
        Some(format!("components={}", codes.join(",")))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransferItemBody<'a> {
    item_reference_hash: u32,
    stack_size: u32,
    transfer_to_vault: bool,
    /// Non-instanced items are addressed with instance id "0".
    item_id: &'a str,
    character_id: &'a str,
    membership_type: i32,
}

impl<'a> From<&'a TransferRequest> for TransferItemBody<'a> {
    fn from(request: &'a TransferRequest) -> Self {
        Self {
            item_reference_hash: request.item_hash,
            stack_size: request.stack_size,
            transfer_to_vault: request.transfer_to_vault,
            item_id: request.item_id.as_deref().unwrap_or("0"),
            character_id: &request.character_id.0,
            membership_type: request.membership_type,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EquipItemBody<'a> {
    item_id: &'a str,
    character_id: &'a str,
    membership_type: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EquipItemsBody<'a> {
    item_ids: &'a [i64],
    character_id: &'a str,
    membership_type: i32,
}
