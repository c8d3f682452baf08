//! Gatehouse Server — application entry point.
//!
//! Wires the SurrealDB-backed repositories into the auth service and
//! runs the periodic revocation sweep. The HTTP edge lives in a
//! separate deployment component and talks to this service through
//! its library API.

use std::time::Duration;

use gatehouse_auth::{AuthConfig, AuthService};
use gatehouse_db::repository::{SurrealRevocationStore, SurrealUserRepository};
use gatehouse_db::{DbConfig, DbManager};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("gatehouse=info".parse().unwrap()),
        )
        .json()
        .init();

    info!("Starting Gatehouse server...");

    let db_config = DbConfig::from_env();
    let manager = match DbManager::connect(&db_config).await {
        Ok(manager) => manager,
        Err(e) => {
            error!(error = %e, "Failed to connect to SurrealDB");
            return;
        }
    };

    if let Err(e) = gatehouse_db::run_migrations(manager.client()).await {
        error!(error = %e, "Migrations failed");
        return;
    }

    let service = AuthService::new(
        SurrealUserRepository::new(manager.client().clone()),
        SurrealRevocationStore::new(manager.client().clone()),
        AuthConfig::from_env(),
    );

    // Periodic sweep of expired revocation entries. Expired entries
    // are already inert; the sweep only reclaims storage.
    let purge_interval = std::env::var("GATEHOUSE_PURGE_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(300u64);
    let purger = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(purge_interval));
        loop {
            ticker.tick().await;
            match service.purge_revoked().await {
                Ok(0) => {}
                Ok(purged) => info!(purged, "Purged expired revocation entries"),
                Err(e) => error!(error = %e, "Revocation purge failed"),
            }
        }
    });

    info!("Gatehouse ready");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    purger.abort();

    info!("Gatehouse server stopped.");
}
