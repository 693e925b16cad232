use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use warmind_db::DbPool;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
    manifest_items: usize,
    remote_clients: usize,
}

impl HealthState {
    pub fn new(db_pool: DbPool, manifest_items: usize, remote_clients: usize) -> Self {
        Self { db_pool, manifest_items, remote_clients }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub database: HealthCheck,
    pub manifest: HealthCheck,
    pub remote: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// Ready only when the database answers and item definitions are loaded.
/// Without definitions no item name resolves, so the service reports degraded.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let manifest = if state.manifest_items > 0 {
        HealthCheck { status: "ready", detail: format!("{} item definitions loaded", state.manifest_items) }
    } else {
        HealthCheck {
            status: "degraded",
            detail: "no item definitions loaded; run `warmind manifest import`".to_string(),
        }
    };
    let remote = HealthCheck {
        status: "ready",
        detail: format!("{} outbound client(s) in rotation", state.remote_clients),
    };
    let ready = database.status == "ready" && manifest.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "warmind-server runtime initialized".to_string(),
        },
        database,
        manifest,
        remote,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> HealthCheck {
    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await {
        Ok(_) => HealthCheck { status: "ready", detail: "database query succeeded".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("database query failed: {error}") }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode, Json};
    use warmind_db::connect_with_settings;

    use crate::health::{health, HealthState};

    #[tokio::test]
    async fn health_returns_ready_when_database_and_manifest_are_available() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5)
            .await
            .expect("pool should connect");

        let (status, Json(payload)) = health(State(HealthState::new(pool.clone(), 12, 2))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.database.status, "ready");
        assert_eq!(payload.manifest.detail, "12 item definitions loaded");
        assert!(payload.remote.detail.starts_with("2 "));

        pool.close().await;
    }

    #[tokio::test]
    async fn empty_manifest_reports_degraded() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5)
            .await
            .expect("pool should connect");

        let (status, Json(payload)) = health(State(HealthState::new(pool.clone(), 0, 1))).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.database.status, "ready");
        assert_eq!(payload.manifest.status, "degraded");

        pool.close().await;
    }

    #[tokio::test]
    async fn health_returns_service_unavailable_when_database_is_unavailable() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5)
            .await
            .expect("pool should connect");
        pool.close().await;

        let (status, Json(payload)) = health(State(HealthState::new(pool, 5, 1))).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.database.status, "degraded");
        assert_eq!(payload.service.status, "ready");
    }
}
