use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use warmind_core::catalog::{Catalog, CatalogConfig};
use warmind_core::config::AppConfig;
use warmind_db::repositories::{
    ManifestRepository, RepositoryError, SqlLoadoutRepository, SqlManifestRepository,
    SqlUnknownValueRepository,
};
use warmind_db::{connect_with_settings, migrations, DbPool};
use warmind_remote::{ClientError, ClientPool};

use crate::health::HealthState;
use crate::inventory::{InventoryService, RemoteSessions};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub catalog: Arc<Catalog>,
    pub client_pool: Arc<ClientPool>,
    pub inventory: Arc<InventoryService>,
}

impl Application {
    pub fn health_state(&self) -> HealthState {
        HealthState::new(self.db_pool.clone(), self.catalog.definition_count(), self.client_pool.len())
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("item manifest could not be loaded: {0}")]
    Manifest(#[source] RepositoryError),
    #[error("remote client pool could not be built: {0}")]
    Remote(#[source] ClientError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let definitions = SqlManifestRepository::new(db_pool.clone())
        .load_definitions()
        .await
        .map_err(BootstrapError::Manifest)?;
    if definitions.is_empty() {
        warn!(
            event_name = "system.bootstrap.manifest_empty",
            correlation_id = "bootstrap",
            "no item definitions stored; item names will not resolve until a manifest is imported"
        );
    }
    let catalog = Arc::new(Catalog::new(
        CatalogConfig::default().with_definitions(definitions).with_engrams_from_names(),
    ));
    info!(
        event_name = "system.bootstrap.catalog_ready",
        correlation_id = "bootstrap",
        definitions = catalog.definition_count(),
        "item catalog built"
    );

    let client_pool = Arc::new(ClientPool::from_config(&config.remote).map_err(BootstrapError::Remote)?);
    let sessions =
        RemoteSessions::new(client_pool.clone(), catalog.clone(), config.remote.api_key.clone());
    let inventory = Arc::new(InventoryService::new(
        Arc::new(sessions),
        catalog.clone(),
        Arc::new(SqlLoadoutRepository::new(db_pool.clone())),
        Arc::new(SqlUnknownValueRepository::new(db_pool.clone())),
    ));

    Ok(Application { config, db_pool, catalog, client_pool, inventory })
}
