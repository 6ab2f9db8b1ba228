//! Lab Inventory Server
//!
//! REST JSON API for tracking department lab equipment: stock levels,
//! equipment issued to students and staff, and repair history.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire services on top of an open, migrated pool
    pub fn new(config: AppConfig, pool: sqlx::SqlitePool) -> AppResult<Self> {
        let repository = repository::Repository::new(pool);
        let services = services::Services::new(repository, &config.auth, config.email.clone())?;
        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }
}
