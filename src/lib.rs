pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod controllers;
pub mod middleware;
pub mod policy;
pub mod services;

use std::sync::Arc;

// Shared state for the whole application.
pub struct AppState {
    pub db: database::Database,
    pub config: config::Config,
    pub notifier: services::notifier::Notifier,
}

impl AppState {
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let db = database::Database::new(&config.database.url, config.database.pool_size).await?;

        db.run_migrations().await?;

        let notifier = services::notifier::Notifier::from_config(&config.telegram);

        Ok(Arc::new(Self {
            db,
            config,
            notifier,
        }))
    }
}
