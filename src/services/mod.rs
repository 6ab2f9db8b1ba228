//! Business logic services

pub mod accounts;
pub mod credentials;
pub mod csv_io;
pub mod email;
pub mod equipment;
pub mod issues;
pub mod maintenance;
pub mod tokens;

use crate::{
    config::{AuthConfig, EmailConfig},
    error::AppResult,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    repository: Repository,
    pub tokens: tokens::TokenService,
    pub accounts: accounts::AccountsService,
    pub equipment: equipment::EquipmentService,
    pub issues: issues::IssuesService,
    pub maintenance: maintenance::MaintenanceService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: &AuthConfig, email_config: EmailConfig) -> AppResult<Self> {
        let credentials = credentials::CredentialStore::new(auth_config)?;
        let tokens = tokens::TokenService::new(auth_config);
        let email = email::EmailService::new(email_config);

        Ok(Self {
            accounts: accounts::AccountsService::new(
                repository.clone(),
                credentials,
                tokens.clone(),
                email,
            ),
            equipment: equipment::EquipmentService::new(repository.clone()),
            issues: issues::IssuesService::new(repository.clone()),
            maintenance: maintenance::MaintenanceService::new(repository.clone()),
            repository,
            tokens,
        })
    }

    /// Round-trip to the database
    pub async fn check_database(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.repository.pool).await?;
        Ok(())
    }
}
