//! JSON routes over [`InventoryService`].
//!
//! Every `/v1` route needs an `Authorization: Bearer <token>` header carrying
//! the caller's game OAuth access token.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use warmind_core::{ApplicationError, InterfaceError, Ranking};

use crate::inventory::{
    CrucibleRanking, EngramUnload, EquippedLoadout, InventoryService, ItemCount, Outcome,
    RestoredNamedLoadout, SavedLoadout, TransferItemRequest, TransferSummary,
};

#[derive(Clone)]
pub struct ApiState {
    service: Arc<InventoryService>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    pub correlation_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RandomLoadoutBody {
    #[serde(default)]
    pub include_armor: bool,
}

#[derive(Debug, Deserialize)]
pub struct SaveLoadoutBody {
    pub name: String,
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Deserialize)]
pub struct TransferBody {
    pub item_name: String,
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub source_class: Option<String>,
    #[serde(default)]
    pub destination_class: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoadoutNames {
    pub names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LoadoutPresence {
    pub name: String,
    pub exists: bool,
}

type ApiError = (StatusCode, Json<ErrorBody>);
type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn router(service: Arc<InventoryService>) -> Router {
    Router::new()
        .route("/v1/loadouts", get(list_loadouts).post(save_loadout))
        .route("/v1/loadouts/max-power", post(equip_max_power))
        .route("/v1/loadouts/random", post(randomize_loadout))
        .route("/v1/loadouts/{name}", get(loadout_exists))
        .route("/v1/loadouts/{name}/equip", post(equip_named_loadout))
        .route("/v1/items/{name}/count", get(count_item))
        .route("/v1/items/transfer", post(transfer_item))
        .route("/v1/engrams/unload", post(unload_engrams))
        .route("/v1/rankings/crucible", get(crucible_ranking))
        .route("/v1/rankings/gambit", get(gambit_ranking))
        .with_state(ApiState { service })
}

/// Per-request identity: the bearer token plus a fresh correlation id.
struct Caller {
    access_token: String,
    correlation_id: String,
}

impl Caller {
    fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let correlation_id = Uuid::new_v4().to_string();
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty());

        match token {
            Some(token) => Ok(Self { access_token: token.to_string(), correlation_id }),
            None => Err(reject(InterfaceError::Unauthorized {
                message: "missing bearer access token".to_string(),
                correlation_id,
            })),
        }
    }

    fn respond<T>(&self, result: Result<T, ApplicationError>) -> ApiResult<T> {
        result.map(Json).map_err(|error| reject(error.into_interface(self.correlation_id.as_str())))
    }

    fn body<T>(&self, payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
        payload.map(|Json(body)| body).map_err(|rejection| {
            reject(InterfaceError::BadRequest {
                message: rejection.body_text(),
                correlation_id: self.correlation_id.clone(),
            })
        })
    }
}

fn status_of(error: &InterfaceError) -> (StatusCode, &'static str) {
    match error {
        InterfaceError::BadRequest { .. } => (StatusCode::BAD_REQUEST, "bad_request"),
        InterfaceError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "unauthorized"),
        InterfaceError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
        InterfaceError::ServiceUnavailable { .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
        }
        InterfaceError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
    }
}

fn reject(error: InterfaceError) -> ApiError {
    let (status, kind) = status_of(&error);
    warn!(
        event_name = "api.request.failed",
        correlation_id = %error.correlation_id(),
        status = status.as_u16(),
        error = %error,
        "request failed"
    );
    (
        status,
        Json(ErrorBody {
            error: kind.to_string(),
            message: error.user_message().to_string(),
            correlation_id: error.correlation_id().to_string(),
        }),
    )
}

async fn equip_max_power(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> ApiResult<EquippedLoadout> {
    let caller = Caller::from_headers(&headers)?;
    info!(event_name = "api.loadouts.max_power", correlation_id = %caller.correlation_id);
    caller.respond(state.service.equip_max_power(&caller.access_token).await)
}

/// A request without a JSON body uses the defaults.
async fn randomize_loadout(
    State(state): State<ApiState>,
    headers: HeaderMap,
    payload: Result<Option<Json<RandomLoadoutBody>>, JsonRejection>,
) -> ApiResult<EquippedLoadout> {
    let caller = Caller::from_headers(&headers)?;
    let body = caller.body(payload.map(Option::unwrap_or_default))?;
    info!(
        event_name = "api.loadouts.random",
        correlation_id = %caller.correlation_id,
        include_armor = body.include_armor
    );
    caller.respond(state.service.randomize_loadout(&caller.access_token, body.include_armor).await)
}

async fn list_loadouts(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> ApiResult<LoadoutNames> {
    let caller = Caller::from_headers(&headers)?;
    let names = state.service.list_loadout_names(&caller.access_token).await;
    caller.respond(names.map(|names| LoadoutNames { names }))
}

async fn save_loadout(
    State(state): State<ApiState>,
    headers: HeaderMap,
    payload: Result<Json<SaveLoadoutBody>, JsonRejection>,
) -> ApiResult<SavedLoadout> {
    let caller = Caller::from_headers(&headers)?;
    let body = caller.body(payload)?;
    info!(
        event_name = "api.loadouts.save",
        correlation_id = %caller.correlation_id,
        overwrite = body.overwrite
    );
    caller.respond(state.service.save_loadout(&caller.access_token, &body.name, body.overwrite).await)
}

async fn loadout_exists(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> ApiResult<LoadoutPresence> {
    let caller = Caller::from_headers(&headers)?;
    let exists = state.service.loadout_exists(&caller.access_token, &name).await;
    caller.respond(exists.map(|exists| LoadoutPresence { name, exists }))
}

async fn equip_named_loadout(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> ApiResult<Outcome<RestoredNamedLoadout>> {
    let caller = Caller::from_headers(&headers)?;
    info!(event_name = "api.loadouts.equip", correlation_id = %caller.correlation_id);
    caller.respond(state.service.equip_named_loadout(&caller.access_token, &name).await)
}

async fn count_item(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> ApiResult<Outcome<ItemCount>> {
    let caller = Caller::from_headers(&headers)?;
    info!(event_name = "api.items.count", correlation_id = %caller.correlation_id);
    caller.respond(state.service.count_item(&caller.access_token, &name).await)
}

async fn transfer_item(
    State(state): State<ApiState>,
    headers: HeaderMap,
    payload: Result<Json<TransferBody>, JsonRejection>,
) -> ApiResult<Outcome<TransferSummary>> {
    let caller = Caller::from_headers(&headers)?;
    let body = caller.body(payload)?;
    info!(event_name = "api.items.transfer", correlation_id = %caller.correlation_id);
    let request = TransferItemRequest {
        item_name: body.item_name,
        count: body.count,
        source_class: body.source_class,
        destination_class: body.destination_class,
    };
    caller.respond(state.service.transfer_item(&caller.access_token, request).await)
}

async fn unload_engrams(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> ApiResult<Outcome<EngramUnload>> {
    let caller = Caller::from_headers(&headers)?;
    info!(event_name = "api.engrams.unload", correlation_id = %caller.correlation_id);
    caller.respond(state.service.unload_engrams(&caller.access_token).await)
}

async fn crucible_ranking(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> ApiResult<Outcome<CrucibleRanking>> {
    let caller = Caller::from_headers(&headers)?;
    info!(event_name = "api.rankings.crucible", correlation_id = %caller.correlation_id);
    caller.respond(state.service.crucible_ranking(&caller.access_token).await)
}

async fn gambit_ranking(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> ApiResult<Outcome<Ranking>> {
    let caller = Caller::from_headers(&headers)?;
    info!(event_name = "api.rankings.gambit", correlation_id = %caller.correlation_id);
    caller.respond(state.service.gambit_ranking(&caller.access_token).await)
}
